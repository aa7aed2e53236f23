//! Report assembly.
//!
//! Projects a [`DetectionResult`] onto the dataset to build the four report
//! views. Nothing here re-runs detection; flags and groups are read from
//! the result as-is.

use std::collections::BTreeMap;

use crate::models::Dataset;

use super::models::{
    AnalysisReport, ColumnProfile, DetectionResult, QualityMetrics, ReportSummary, RowMarker,
    TableView, ViewRow,
};

/// Sheet name of the full dataset view.
pub const ORIGINAL_VIEW: &str = "Original Data";
/// Sheet name of the flagged-rows view.
pub const DUPLICATES_VIEW: &str = "Duplicate Rows";
/// Sheet name of the deduplicated view.
pub const CLEANED_VIEW: &str = "Cleaned Data";

/// Builds the original-with-flags, duplicates-only, cleaned and summary
/// views.
///
/// `profiles` should cover every column; the summary keeps the profiles of
/// the selected columns in selection order.
pub fn assemble(
    dataset: &Dataset,
    detection: &DetectionResult,
    profiles: &[ColumnProfile],
    metrics: &QualityMetrics,
) -> AnalysisReport {
    let groups = detection.group_index();

    let original = build_view(
        ORIGINAL_VIEW,
        dataset,
        0..dataset.row_count(),
        &groups,
        |row| {
            if detection.is_flagged(row) {
                RowMarker::Duplicate
            } else {
                RowMarker::Unique
            }
        },
    );
    let duplicates = build_view(
        DUPLICATES_VIEW,
        dataset,
        detection.flagged.iter().copied(),
        &groups,
        |_| RowMarker::Duplicate,
    );
    let cleaned = build_view(
        CLEANED_VIEW,
        dataset,
        detection.cleaned.iter().copied(),
        &groups,
        |_| RowMarker::Unique,
    );

    let column_profiles = detection
        .selected_columns
        .iter()
        .filter_map(|name| profiles.iter().find(|p| &p.column_name == name).cloned())
        .collect();

    let summary = ReportSummary {
        sheet_name: dataset.sheet_name().to_string(),
        metrics: metrics.clone(),
        mode: detection.mode,
        selected_columns: detection.selected_columns.clone(),
        column_profiles,
        group_count: detection.group_count() as u64,
        flagged_row_count: detection.flagged_count() as u64,
        cleaned_row_count: detection.cleaned_count() as u64,
        removal_rate: detection.removal_rate(),
    };

    AnalysisReport {
        original,
        duplicates,
        cleaned,
        summary,
        profiles: profiles.to_vec(),
    }
}

fn build_view<I, F>(
    name: &str,
    dataset: &Dataset,
    rows: I,
    groups: &BTreeMap<usize, usize>,
    marker: F,
) -> TableView
where
    I: IntoIterator<Item = usize>,
    F: Fn(usize) -> RowMarker,
{
    let rows = rows
        .into_iter()
        .filter_map(|index| {
            dataset.row(index).map(|cells| ViewRow {
                index,
                marker: marker(index),
                group: groups.get(&index).copied(),
                cells: cells.to_vec(),
            })
        })
        .collect();

    TableView {
        name: name.to_string(),
        columns: dataset.columns().to_vec(),
        rows,
    }
}
