//! Duplicate analysis result models.
//!
//! Every type here is a value object derived from a [`Dataset`]: safe to
//! drop and recompute at any time, with no back-references.
//!
//! [`Dataset`]: crate::models::Dataset

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{CellValue, ColumnType};

use super::config::DetectionMode;
use super::normalize::NormalizedKey;

/// Rounds a ratio or percentage to two decimals for reporting.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-column descriptive statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    /// Column name
    pub column_name: String,
    /// Inferred type; mixed columns without a majority type report `Text`
    pub inferred_type: ColumnType,
    /// Dominant parsed type when the column mixes kinds of values
    pub dominant_type: Option<ColumnType>,
    /// Column holds more than one kind of value
    pub mixed: bool,
    /// Count of non-blank cells
    pub non_null_count: u64,
    /// Count of blank cells (null, empty, whitespace or null tokens)
    pub null_count: u64,
    /// Distinct normalized non-blank values
    pub unique_count: u64,
    /// Rows repeating a value seen earlier in the column, blanks included
    pub duplicate_count: u64,
    /// First distinct raw values in row order
    pub sample_values: Vec<CellValue>,
}

impl ColumnProfile {
    /// Type name for display, noting the dominant kind of mixed columns.
    pub fn type_label(&self) -> String {
        match (self.mixed, self.dominant_type) {
            (true, Some(dominant)) if dominant != self.inferred_type => {
                format!("{} (mixed, mostly {})", self.inferred_type, dominant)
            }
            (true, _) => format!("{} (mixed)", self.inferred_type),
            (false, _) => self.inferred_type.to_string(),
        }
    }

    /// Sample values joined for display, truncated to `max_chars`.
    pub fn sample_summary(&self, max_chars: usize) -> String {
        let joined = self
            .sample_values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        if joined.chars().count() > max_chars {
            let truncated: String = joined.chars().take(max_chars).collect();
            format!("{}...", truncated)
        } else {
            joined
        }
    }
}

/// Dataset-wide quality summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityMetrics {
    /// Number of rows
    pub total_rows: u64,
    /// Number of columns
    pub total_columns: u64,
    /// Cells the normalizer treats as blank
    pub blank_cells: u64,
    /// Blank cells as a percentage of all cells (two decimals)
    pub blank_percentage: f64,
    /// Approximate in-memory size of the raw cells.
    ///
    /// Advisory only: a sum of per-cell estimates, not an allocator
    /// measurement.
    pub estimated_memory_bytes: u64,
    /// Number of columns per inferred type
    pub column_types: BTreeMap<ColumnType, u64>,
}

impl QualityMetrics {
    /// Memory estimate formatted in kilobytes.
    pub fn memory_usage_display(&self) -> String {
        format!("{:.2} KB", self.estimated_memory_bytes as f64 / 1024.0)
    }
}

/// Rows sharing one normalized key, in ascending row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Shared normalized key over the selected columns
    pub key: NormalizedKey,
    /// Row indices, ascending
    pub rows: Vec<usize>,
}

impl DuplicateGroup {
    /// First occurrence in original order.
    pub fn first(&self) -> Option<usize> {
        self.rows.first().copied()
    }

    /// Last occurrence in original order.
    pub fn last(&self) -> Option<usize> {
        self.rows.last().copied()
    }

    /// Number of rows in the group.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the group has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Only groups of two or more rows are duplicate groups.
    pub fn is_duplicate(&self) -> bool {
        self.rows.len() >= 2
    }
}

/// Outcome of duplicate detection for one (selection, mode) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionResult {
    /// Mode the views were derived with
    pub mode: DetectionMode,
    /// Comparison columns, in selection order
    pub selected_columns: Vec<String>,
    /// Rows in the analyzed dataset
    pub total_rows: usize,
    /// Duplicate groups (two or more rows) in first-seen key order
    pub groups: Vec<DuplicateGroup>,
    /// Rows whose key occurs exactly once
    pub singleton_count: usize,
    /// Flagged-view rows, ascending
    pub flagged: Vec<usize>,
    /// Cleaned-view rows, ascending
    pub cleaned: Vec<usize>,
}

impl DetectionResult {
    /// Result for a dataset without rows.
    pub fn empty(mode: DetectionMode, selected_columns: Vec<String>) -> Self {
        Self {
            mode,
            selected_columns,
            total_rows: 0,
            groups: Vec::new(),
            singleton_count: 0,
            flagged: Vec::new(),
            cleaned: Vec::new(),
        }
    }

    /// Number of duplicate groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of rows in the flagged view.
    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    /// Number of rows in the cleaned view.
    pub fn cleaned_count(&self) -> usize {
        self.cleaned.len()
    }

    /// Rows belonging to any duplicate group.
    pub fn duplicate_row_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }

    /// True when at least one duplicate group exists.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Whether a row is in the flagged view.
    pub fn is_flagged(&self, row: usize) -> bool {
        self.flagged.binary_search(&row).is_ok()
    }

    /// Flagged rows as a percentage of all rows (two decimals).
    pub fn removal_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            round2(self.flagged.len() as f64 / self.total_rows as f64 * 100.0)
        }
    }

    /// Maps each row in a duplicate group to its group index.
    pub fn group_index(&self) -> BTreeMap<usize, usize> {
        self.groups
            .iter()
            .enumerate()
            .flat_map(|(group, g)| g.rows.iter().map(move |&row| (row, group)))
            .collect()
    }
}

/// Presentation marker attached to each row of a view.
///
/// Exporters turn `Duplicate` into highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowMarker {
    /// Row is in the flagged view for the active mode
    Duplicate,
    /// Row is not flagged
    Unique,
}

/// One row of a report view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRow {
    /// Row index in the original dataset
    pub index: usize,
    /// Highlight marker
    pub marker: RowMarker,
    /// Index of the duplicate group the row belongs to, if any
    pub group: Option<usize>,
    /// Raw cells in column order
    pub cells: Vec<CellValue>,
}

/// A named tabular view over the original dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    /// View name, also used as the exported sheet name
    pub name: String,
    /// Column names
    pub columns: Vec<String>,
    /// Rows in original order
    pub rows: Vec<ViewRow>,
}

impl TableView {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the view has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Original row indices of the view.
    pub fn indices(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.index).collect()
    }

    /// First `limit` rows, for interactive previews.
    pub fn preview(&self, limit: usize) -> &[ViewRow] {
        &self.rows[..self.rows.len().min(limit)]
    }
}

/// Summary view of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    /// Sheet the dataset was read from
    pub sheet_name: String,
    /// Dataset-wide metrics
    pub metrics: QualityMetrics,
    /// Detection mode
    pub mode: DetectionMode,
    /// Comparison columns
    pub selected_columns: Vec<String>,
    /// Profiles of the comparison columns, in selection order
    pub column_profiles: Vec<ColumnProfile>,
    /// Number of duplicate groups
    pub group_count: u64,
    /// Rows in the flagged view
    pub flagged_row_count: u64,
    /// Rows in the cleaned view
    pub cleaned_row_count: u64,
    /// Flagged rows as a percentage of all rows
    pub removal_rate: f64,
}

/// The four report views of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Every row, marked per the active mode
    pub original: TableView,
    /// Flagged-view rows
    pub duplicates: TableView,
    /// Cleaned-view rows
    pub cleaned: TableView,
    /// Metrics, profiles and totals
    pub summary: ReportSummary,
    /// Profiles of every column, for the column analysis sheet
    pub profiles: Vec<ColumnProfile>,
}
