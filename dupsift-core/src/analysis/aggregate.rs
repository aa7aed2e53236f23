//! Dataset-wide quality metrics.
//!
//! This module aggregates blank-cell counts, a memory estimate and a
//! column type breakdown over the whole dataset.

use std::collections::BTreeMap;

use crate::models::{CellValue, Dataset};

use super::models::{ColumnProfile, QualityMetrics, round2};
use super::normalize::Normalizer;

/// Aggregates dataset-wide quality metrics.
///
/// Blank cells are those the normalizer maps to its blank marker, so
/// whitespace-only text and null tokens count alongside missing cells. The
/// memory figure is an estimate built from per-cell sizes and is advisory
/// only.
pub fn aggregate(dataset: &Dataset, profiles: &[ColumnProfile]) -> QualityMetrics {
    let total_rows = dataset.row_count() as u64;
    let total_columns = dataset.column_count() as u64;

    let mut blank_cells: u64 = 0;
    let mut estimated_memory_bytes: u64 = 0;

    for cell in dataset.rows().iter().flatten() {
        if Normalizer::is_blank(cell) {
            blank_cells += 1;
        }
        estimated_memory_bytes = estimated_memory_bytes.saturating_add(cell_size(cell));
    }

    let total_cells = total_rows.saturating_mul(total_columns);
    let blank_percentage = if total_cells == 0 {
        0.0
    } else {
        round2(blank_cells as f64 / total_cells as f64 * 100.0)
    };

    let mut column_types = BTreeMap::new();
    for profile in profiles {
        *column_types.entry(profile.inferred_type).or_insert(0) += 1;
    }

    tracing::debug!(
        "Aggregated {} rows x {} columns: {} blank cells ({}%)",
        total_rows,
        total_columns,
        blank_cells,
        blank_percentage
    );

    QualityMetrics {
        total_rows,
        total_columns,
        blank_cells,
        blank_percentage,
        estimated_memory_bytes,
        column_types,
    }
}

fn cell_size(cell: &CellValue) -> u64 {
    u64::try_from(cell.estimated_size()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::profile::profile_all;
    use crate::models::ColumnType;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["n".to_string(), "id".to_string()],
            vec![
                vec![CellValue::text("Tom"), CellValue::Number(1.0)],
                vec![CellValue::text("  "), CellValue::Number(2.0)],
                vec![CellValue::Empty, CellValue::text("null")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_aggregate_counts() {
        let dataset = dataset();
        let profiles = profile_all(&dataset, &Normalizer::default(), 5);
        let metrics = aggregate(&dataset, &profiles);

        assert_eq!(metrics.total_rows, 3);
        assert_eq!(metrics.total_columns, 2);
        assert_eq!(metrics.blank_cells, 3);
        assert_eq!(metrics.blank_percentage, 50.0);
        assert!(metrics.estimated_memory_bytes > 0);
    }

    #[test]
    fn test_column_type_breakdown() {
        let dataset = dataset();
        let profiles = profile_all(&dataset, &Normalizer::default(), 5);
        let metrics = aggregate(&dataset, &profiles);

        assert_eq!(metrics.column_types.get(&ColumnType::Text), Some(&1));
        assert_eq!(metrics.column_types.get(&ColumnType::Number), Some(&1));
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::new(vec!["n".to_string()], vec![]).unwrap();
        let metrics = aggregate(&dataset, &[]);

        assert_eq!(metrics.total_rows, 0);
        assert_eq!(metrics.total_columns, 1);
        assert_eq!(metrics.blank_cells, 0);
        assert_eq!(metrics.blank_percentage, 0.0);
        assert_eq!(metrics.estimated_memory_bytes, 0);
        assert!(metrics.column_types.is_empty());
    }

    #[test]
    fn test_memory_estimate_grows_with_text() {
        let short = Dataset::new(vec!["n".to_string()], vec![vec![CellValue::text("a")]]).unwrap();
        let long = Dataset::new(
            vec!["n".to_string()],
            vec![vec![CellValue::text("a".repeat(1000))]],
        )
        .unwrap();

        assert!(
            aggregate(&long, &[]).estimated_memory_bytes
                > aggregate(&short, &[]).estimated_memory_bytes
        );
    }
}
