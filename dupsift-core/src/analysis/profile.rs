//! Column profiling.
//!
//! Infers each column's type from a single pass of per-type parse counters
//! and collects null counts, distinct counts and sample values.

use std::collections::HashSet;

use crate::error::{DupSiftError, Result};
use crate::models::{CellValue, ColumnType, Dataset};

use super::models::ColumnProfile;
use super::normalize::{Normalizer, parse_date, parse_plain_number};

const TRUE_TOKENS: [&str; 2] = ["true", "yes"];
const FALSE_TOKENS: [&str; 2] = ["false", "no"];

/// Per-type parse-success counters for one column.
///
/// Each non-blank value counts toward the first type it parses as, tried
/// in the order number, date, boolean, text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct TypeTally {
    number: u64,
    date: u64,
    boolean: u64,
    text: u64,
}

impl TypeTally {
    fn observe(&mut self, value: &CellValue) {
        match classify(value) {
            Some(ColumnType::Number) => self.number += 1,
            Some(ColumnType::Date) => self.date += 1,
            Some(ColumnType::Boolean) => self.boolean += 1,
            Some(_) => self.text += 1,
            None => {}
        }
    }

    fn total(&self) -> u64 {
        self.number + self.date + self.boolean + self.text
    }

    /// Resolves to (inferred type, dominant type, mixed).
    fn resolve(&self) -> (ColumnType, Option<ColumnType>, bool) {
        let total = self.total();
        if total == 0 {
            return (ColumnType::Empty, None, false);
        }

        let counts = [
            (ColumnType::Number, self.number),
            (ColumnType::Date, self.date),
            (ColumnType::Boolean, self.boolean),
            (ColumnType::Text, self.text),
        ];
        let mixed = counts.iter().filter(|(_, count)| *count > 0).count() > 1;

        let majority = counts[..3]
            .iter()
            .find(|(_, count)| count * 2 > total)
            .map(|(column_type, _)| *column_type);

        match majority {
            Some(column_type) => (column_type, mixed.then_some(column_type), mixed),
            None => {
                // Plurality among parsed kinds; earlier kinds win ties
                let dominant = counts[..3]
                    .iter()
                    .filter(|(_, count)| *count > 0)
                    .fold(None::<(ColumnType, u64)>, |best, &(column_type, count)| {
                        match best {
                            Some((_, best_count)) if best_count >= count => best,
                            _ => Some((column_type, count)),
                        }
                    })
                    .map(|(column_type, _)| column_type);
                (ColumnType::Text, dominant.filter(|_| mixed), mixed)
            }
        }
    }
}

/// Classifies a single cell; `None` for blanks.
fn classify(value: &CellValue) -> Option<ColumnType> {
    if Normalizer::is_blank(value) {
        return None;
    }

    Some(match value {
        CellValue::Number(_) => ColumnType::Number,
        CellValue::Date(_) => ColumnType::Date,
        CellValue::Boolean(_) => ColumnType::Boolean,
        CellValue::Text(raw) => {
            let trimmed = raw.trim();
            if parse_plain_number(trimmed).is_some() {
                ColumnType::Number
            } else if parse_date(trimmed).is_some() {
                ColumnType::Date
            } else if parse_bool(trimmed).is_some() {
                ColumnType::Boolean
            } else {
                ColumnType::Text
            }
        }
        CellValue::Empty => return None,
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    if TRUE_TOKENS.iter().any(|t| value.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSE_TOKENS.iter().any(|t| value.eq_ignore_ascii_case(t)) {
        Some(false)
    } else {
        None
    }
}

/// Infers the type of a column by index.
pub fn infer_column_type(dataset: &Dataset, column: usize) -> ColumnType {
    let mut tally = TypeTally::default();
    for value in dataset.column_values(column) {
        tally.observe(value);
    }
    tally.resolve().0
}

/// Profiles a single column by name.
///
/// Fails with `InvalidSelection` if the column doesn't exist.
pub fn profile_column(
    dataset: &Dataset,
    column: &str,
    normalizer: &Normalizer,
    sample_size: usize,
) -> Result<ColumnProfile> {
    let index = dataset.column_index(column).ok_or_else(|| {
        DupSiftError::invalid_selection(format!("unknown columns: {}", column))
    })?;
    Ok(profile_index(dataset, index, normalizer, sample_size))
}

/// Profiles every column of the dataset, in column order.
pub fn profile_all(
    dataset: &Dataset,
    normalizer: &Normalizer,
    sample_size: usize,
) -> Vec<ColumnProfile> {
    (0..dataset.column_count())
        .map(|index| profile_index(dataset, index, normalizer, sample_size))
        .collect()
}

fn profile_index(
    dataset: &Dataset,
    index: usize,
    normalizer: &Normalizer,
    sample_size: usize,
) -> ColumnProfile {
    let column_name = dataset.columns().get(index).cloned().unwrap_or_default();

    let mut tally = TypeTally::default();
    let mut null_count: u64 = 0;
    let mut sample_values: Vec<CellValue> = Vec::with_capacity(sample_size);

    for value in dataset.column_values(index) {
        if Normalizer::is_blank(value) {
            null_count += 1;
            continue;
        }
        tally.observe(value);
        if sample_values.len() < sample_size && !sample_values.contains(value) {
            sample_values.push(value.clone());
        }
    }

    let (inferred_type, dominant_type, mixed) = tally.resolve();

    // Distinct counts depend on the inferred type (date coercion), so they
    // come from a second pass once the type is known.
    let mut seen = HashSet::new();
    let mut duplicate_count: u64 = 0;
    for value in dataset.column_values(index) {
        if !seen.insert(normalizer.normalize(value, inferred_type)) {
            duplicate_count += 1;
        }
    }
    let unique_count = seen.iter().filter(|v| !v.is_empty()).count() as u64;

    let total_rows = dataset.row_count() as u64;

    tracing::trace!(
        "Profiled column '{}': type={}, nulls={}, unique={}",
        column_name,
        inferred_type,
        null_count,
        unique_count
    );

    ColumnProfile {
        column_name,
        inferred_type,
        dominant_type,
        mixed,
        non_null_count: total_rows.saturating_sub(null_count),
        null_count,
        unique_count,
        duplicate_count,
        sample_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_column(values: Vec<CellValue>) -> Dataset {
        Dataset::new(
            vec!["col".to_string()],
            values.into_iter().map(|v| vec![v]).collect(),
        )
        .unwrap()
    }

    fn profile(values: Vec<CellValue>) -> ColumnProfile {
        profile_column(&single_column(values), "col", &Normalizer::default(), 5).unwrap()
    }

    #[test]
    fn test_numeric_column() {
        let p = profile(vec![
            CellValue::Number(1.0),
            CellValue::text("2.5"),
            CellValue::text(" 3 "),
        ]);
        assert_eq!(p.inferred_type, ColumnType::Number);
        assert!(!p.mixed);
        assert_eq!(p.dominant_type, None);
    }

    #[test]
    fn test_date_and_boolean_columns() {
        let dates = profile(vec![
            CellValue::text("2024-01-05"),
            CellValue::text("2024-02-01 10:00:00"),
        ]);
        assert_eq!(dates.inferred_type, ColumnType::Date);

        let flags = profile(vec![
            CellValue::text("yes"),
            CellValue::Boolean(false),
            CellValue::text("TRUE"),
        ]);
        assert_eq!(flags.inferred_type, ColumnType::Boolean);
    }

    #[test]
    fn test_majority_wins_and_marks_mixed() {
        let p = profile(vec![
            CellValue::Number(1.0),
            CellValue::Number(2.0),
            CellValue::text("n/a"),
        ]);
        assert_eq!(p.inferred_type, ColumnType::Number);
        assert!(p.mixed);
        assert_eq!(p.dominant_type, Some(ColumnType::Number));
    }

    #[test]
    fn test_mixed_without_majority_is_text() {
        let p = profile(vec![
            CellValue::Number(1.0),
            CellValue::Number(2.0),
            CellValue::text("2024-01-05"),
            CellValue::text("abc"),
            CellValue::text("def"),
        ]);
        assert_eq!(p.inferred_type, ColumnType::Text);
        assert!(p.mixed);
        assert_eq!(p.dominant_type, Some(ColumnType::Number));
    }

    #[test]
    fn test_plain_text_column() {
        let p = profile(vec![CellValue::text("Tom"), CellValue::text("Ann")]);
        assert_eq!(p.inferred_type, ColumnType::Text);
        assert!(!p.mixed);
        assert_eq!(p.dominant_type, None);
    }

    #[test]
    fn test_all_blank_column() {
        let p = profile(vec![
            CellValue::Empty,
            CellValue::text("  "),
            CellValue::text("null"),
        ]);
        assert_eq!(p.inferred_type, ColumnType::Empty);
        assert_eq!(p.null_count, 3);
        assert_eq!(p.non_null_count, 0);
        assert_eq!(p.unique_count, 0);
        assert_eq!(p.duplicate_count, 2);
        assert!(p.sample_values.is_empty());
    }

    #[test]
    fn test_counts() {
        let p = profile(vec![
            CellValue::text("Tom"),
            CellValue::text("tom "),
            CellValue::Empty,
            CellValue::text("Ann"),
            CellValue::Empty,
        ]);
        assert_eq!(p.null_count, 2);
        assert_eq!(p.non_null_count, 3);
        assert_eq!(p.unique_count, 2);
        // "tom " repeats "Tom", second blank repeats the first
        assert_eq!(p.duplicate_count, 2);
    }

    #[test]
    fn test_samples_keep_raw_formatting() {
        let p = profile(vec![
            CellValue::text("Tom"),
            CellValue::text("tom "),
            CellValue::text("Tom"),
            CellValue::Empty,
            CellValue::text("Ann"),
        ]);
        assert_eq!(
            p.sample_values,
            vec![
                CellValue::text("Tom"),
                CellValue::text("tom "),
                CellValue::text("Ann")
            ]
        );
    }

    #[test]
    fn test_numeric_spellings_are_distinct_samples() {
        let p = profile(vec![
            CellValue::text("7.0"),
            CellValue::text("7"),
            CellValue::text("+7"),
            CellValue::text("7"),
        ]);
        assert_eq!(p.inferred_type, ColumnType::Number);
        assert_eq!(p.unique_count, 1);
        assert_eq!(
            p.sample_values,
            vec![
                CellValue::text("7.0"),
                CellValue::text("7"),
                CellValue::text("+7")
            ]
        );
    }

    #[test]
    fn test_sample_size_limit() {
        let values = (0..10).map(|i| CellValue::Number(f64::from(i))).collect();
        let p = profile_column(&single_column(values), "col", &Normalizer::default(), 3).unwrap();
        assert_eq!(p.sample_values.len(), 3);
        assert_eq!(p.sample_values[0], CellValue::Number(0.0));
    }

    #[test]
    fn test_unknown_column() {
        let dataset = single_column(vec![CellValue::Empty]);
        let err = profile_column(&dataset, "missing", &Normalizer::default(), 5).unwrap_err();
        assert!(matches!(err, DupSiftError::InvalidSelection { .. }));
    }

    #[test]
    fn test_profile_all_and_infer() {
        let dataset = Dataset::new(
            vec!["n".to_string(), "id".to_string()],
            vec![
                vec![CellValue::text("Tom"), CellValue::Number(1.0)],
                vec![CellValue::text("Ann"), CellValue::Number(2.0)],
            ],
        )
        .unwrap();

        let profiles = profile_all(&dataset, &Normalizer::default(), 5);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].column_name, "n");
        assert_eq!(profiles[1].inferred_type, ColumnType::Number);
        assert_eq!(infer_column_type(&dataset, 1), ColumnType::Number);
    }

    #[test]
    fn test_date_column_unique_count_uses_coercion() {
        let p = profile(vec![
            CellValue::text("2024-01-05"),
            CellValue::text("2024-01-05 00:00:00"),
            CellValue::text("2024-01-06"),
        ]);
        assert_eq!(p.inferred_type, ColumnType::Date);
        assert_eq!(p.unique_count, 2);
        assert_eq!(p.duplicate_count, 1);
    }
}
