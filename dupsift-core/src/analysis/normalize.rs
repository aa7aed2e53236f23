//! Cell normalization for duplicate comparison.
//!
//! Converts raw cells into canonical comparison values: whitespace is
//! trimmed and collapsed, case is folded, numeric-looking text is coerced
//! to a canonical number and every flavour of blank collapses into a single
//! `Empty` marker.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::models::{CellValue, ColumnType};

/// Text values treated as null after trimming, compared case-insensitively.
const NULL_TOKENS: [&str; 3] = ["nan", "none", "null"];

/// Decimal places kept when canonicalizing numbers.
const NUMBER_PRECISION: f64 = 1e6;

/// Above this magnitude an f64 has no fractional digits left to round.
const ROUNDING_LIMIT: f64 = 1e15;

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Canonical comparison form of a single cell.
///
/// `Empty` is its own variant so a blank cell never equals real text, even
/// text that would otherwise normalize to an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum NormalizedValue {
    /// Null, blank, whitespace-only or a null token
    Empty,
    /// Canonical decimal rendering of a number
    Number(String),
    /// Trimmed, whitespace-collapsed and (by default) case-folded text
    Text(String),
    /// Canonical date-time
    Date(NaiveDateTime),
}

impl NormalizedValue {
    /// Maps a normalized value back onto a raw cell.
    ///
    /// Normalizing the returned cell yields `self` again, which makes the
    /// normalization idempotent in the observable sense.
    pub fn to_cell(&self) -> CellValue {
        match self {
            Self::Empty => CellValue::Empty,
            Self::Number(n) | Self::Text(n) => CellValue::Text(n.clone()),
            Self::Date(d) => CellValue::Date(*d),
        }
    }

    /// True for the blank marker.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Normalized values of a row over the selected comparison columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedKey(Vec<NormalizedValue>);

impl NormalizedKey {
    /// Components in selected-column order.
    pub fn values(&self) -> &[NormalizedValue] {
        &self.0
    }

    /// True when every component is blank.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(NormalizedValue::is_empty)
    }
}

/// Stateless cell normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    case_sensitive: bool,
}

impl Normalizer {
    /// Creates a normalizer. Case is folded unless `case_sensitive` is set.
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    /// Whether text comparisons keep case.
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Normalizes a raw cell for comparison.
    ///
    /// Never fails: values that can't be coerced fall back to their trimmed
    /// text form. `column_type` only changes how text is read in `Date`
    /// columns, where date-looking text is coerced to a date.
    pub fn normalize(&self, value: &CellValue, column_type: ColumnType) -> NormalizedValue {
        match value {
            CellValue::Empty => NormalizedValue::Empty,
            CellValue::Number(n) => match canonical_number(*n) {
                Some(canonical) => NormalizedValue::Number(canonical),
                None => {
                    tracing::trace!("Non-finite number {} normalized as text", n);
                    self.normalize_text(&n.to_string(), column_type)
                }
            },
            CellValue::Boolean(b) => NormalizedValue::Text(b.to_string()),
            CellValue::Date(d) => NormalizedValue::Date(*d),
            CellValue::Text(s) => self.normalize_text(s, column_type),
        }
    }

    /// Builds the comparison key of a row over `columns`.
    ///
    /// Each entry pairs a column index with the column's inferred type.
    pub fn key(&self, row: &[CellValue], columns: &[(usize, ColumnType)]) -> NormalizedKey {
        NormalizedKey(
            columns
                .iter()
                .map(|&(index, column_type)| {
                    row.get(index).map_or(NormalizedValue::Empty, |cell| {
                        self.normalize(cell, column_type)
                    })
                })
                .collect(),
        )
    }

    /// Returns true when a cell normalizes to the blank marker.
    ///
    /// Blankness doesn't depend on case folding or column type.
    pub fn is_blank(value: &CellValue) -> bool {
        Self::default()
            .normalize(value, ColumnType::Text)
            .is_empty()
    }

    fn normalize_text(&self, raw: &str, column_type: ColumnType) -> NormalizedValue {
        let collapsed = collapse_whitespace(raw);

        if collapsed.is_empty() || is_null_token(&collapsed) {
            return NormalizedValue::Empty;
        }

        if let Some(canonical) = parse_plain_number(&collapsed).and_then(canonical_number) {
            return NormalizedValue::Number(canonical);
        }

        if column_type == ColumnType::Date
            && let Some(date) = parse_date(&collapsed)
        {
            return NormalizedValue::Date(date);
        }

        if self.case_sensitive {
            NormalizedValue::Text(collapsed)
        } else {
            NormalizedValue::Text(collapsed.to_lowercase())
        }
    }
}

/// Trims and collapses internal whitespace runs to a single space.
fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_null_token(value: &str) -> bool {
    NULL_TOKENS
        .iter()
        .any(|token| value.eq_ignore_ascii_case(token))
}

/// Rounds to six decimals and renders with shortest round-trip formatting.
///
/// Returns `None` for NaN and infinities.
fn canonical_number(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let rounded = if value.abs() < ROUNDING_LIMIT {
        (value * NUMBER_PRECISION).round() / NUMBER_PRECISION
    } else {
        value
    };

    // Fold -0 into 0
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };

    Some(rounded.to_string())
}

/// Parses an unambiguous ASCII decimal literal.
///
/// Accepts an optional sign, digits, an optional fraction and an optional
/// exponent. Thousands separators, decimal commas, leading zeros (`007`),
/// `inf` and `nan` are rejected so locale-formatted values and identifiers
/// stay text.
pub(crate) fn parse_plain_number(value: &str) -> Option<f64> {
    let bytes = value.as_bytes();
    let unsigned = match bytes.split_first() {
        Some((b'+' | b'-', rest)) => rest,
        Some(_) => bytes,
        None => return None,
    };

    let (mantissa, exponent) = match unsigned.iter().position(|b| matches!(b, b'e' | b'E')) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };

    let (int_part, frac_part) = match mantissa.iter().position(|&b| b == b'.') {
        Some(pos) => (&mantissa[..pos], Some(&mantissa[pos + 1..])),
        None => (mantissa, None),
    };

    let all_digits = |part: &[u8]| part.iter().all(u8::is_ascii_digit);

    if !all_digits(int_part) || !frac_part.is_none_or(all_digits) {
        return None;
    }
    if int_part.is_empty() && frac_part.is_none_or(<[u8]>::is_empty) {
        return None;
    }
    if int_part.len() > 1 && int_part.first() == Some(&b'0') {
        return None;
    }
    if let Some(exp) = exponent {
        let digits = match exp.split_first() {
            Some((b'+' | b'-', rest)) => rest,
            _ => exp,
        };
        if digits.is_empty() || !all_digits(digits) {
            return None;
        }
    }

    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses ISO-style dates and date-times.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDateTime> {
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}
