//! Core data models for tabular datasets.
//!
//! A [`Dataset`] is the immutable snapshot the analysis core works on. Cells
//! are a tagged variant so the normalizer and profiler dispatch on the tag
//! instead of inspecting values at runtime.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{DupSiftError, Result};

/// A single raw cell value as loaded from the input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Free text, kept exactly as read (no trimming)
    Text(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Boolean(bool),
    /// Date or date-time value
    Date(NaiveDateTime),
    /// Null or missing cell
    Empty,
}

impl CellValue {
    /// Creates a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns true for the `Empty` tag only.
    ///
    /// Whitespace-only text is still `Text` here; use the normalizer to decide
    /// whether a cell counts as blank.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Approximate number of bytes this cell occupies in memory.
    ///
    /// Counts the enum slot plus any heap allocation. Advisory only.
    pub fn estimated_size(&self) -> usize {
        let heap = match self {
            Self::Text(s) => s.capacity(),
            _ => 0,
        };
        std::mem::size_of::<Self>().saturating_add(heap)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Date(d) if d.num_seconds_from_midnight() == 0 && d.nanosecond() == 0 => {
                write!(f, "{}", d.format("%Y-%m-%d"))
            }
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            Self::Empty => Ok(()),
        }
    }
}

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Numeric values
    Number,
    /// Dates and date-times
    Date,
    /// True/false values
    Boolean,
    /// Free text, also used for mixed columns
    Text,
    /// Column holds no non-blank value
    Empty,
}

impl ColumnType {
    /// Lowercase name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
            ColumnType::Empty => "empty",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An in-memory tabular dataset.
///
/// Every row holds exactly one cell per column, in column order, and column
/// names are unique. Both are checked by [`Dataset::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    sheet_name: String,
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Sheet name reported for single-sheet sources.
    pub const DEFAULT_SHEET: &'static str = "Sheet1";

    /// Creates a dataset, rejecting duplicate column names and ragged rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut seen = std::collections::HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(DupSiftError::invalid_dataset(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
        }

        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(DupSiftError::invalid_dataset(format!(
                "row {} has {} cells, expected {}",
                index,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self {
            sheet_name: Self::DEFAULT_SHEET.to_string(),
            columns,
            rows,
        })
    }

    /// Sets the name of the sheet this dataset was read from.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Name of the sheet this dataset was read from.
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Ordered column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All rows in original order.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// A single row by index.
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Cells of one column in row order.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |row| row.get(column))
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
