//! HTML preview of an analysis.
//!
//! Renders the first rows of the original data with flagged rows
//! highlighted, the first flagged rows on their own, and the headline
//! statistics.

use anyhow::{Context, Result};
use askama::Template;
use dupsift_core::{AnalysisReport, CellValue, ReportSummary, RowMarker, ViewRow};
use std::path::Path;

use crate::result_message;

/// Rows of the original data shown with highlighting.
pub const PREVIEW_ROWS: usize = 20;
/// Flagged rows shown in the duplicates table.
pub const DUPLICATE_ROWS: usize = 100;

/// One rendered table row.
struct PreviewRow {
    number: usize,
    highlighted: bool,
    cells: Vec<String>,
}

impl PreviewRow {
    fn from_view(row: &ViewRow) -> Self {
        Self {
            number: row.index + 1,
            highlighted: row.marker == RowMarker::Duplicate,
            cells: row.cells.iter().map(CellValue::to_string).collect(),
        }
    }
}

/// One headline statistic.
struct Stat {
    label: &'static str,
    value: String,
}

#[derive(Template)]
#[template(path = "preview.html")]
struct PreviewPage<'a> {
    source_name: &'a str,
    sheet_name: &'a str,
    message: String,
    has_duplicates: bool,
    mode_label: &'static str,
    selected_columns: String,
    stats: Vec<Stat>,
    columns: &'a [String],
    preview_rows: Vec<PreviewRow>,
    duplicate_rows: Vec<PreviewRow>,
    duplicate_total: usize,
    summary: &'a ReportSummary,
}

fn stats(summary: &ReportSummary) -> Vec<Stat> {
    let metrics = &summary.metrics;
    vec![
        Stat {
            label: "Total Rows",
            value: metrics.total_rows.to_string(),
        },
        Stat {
            label: "Total Columns",
            value: metrics.total_columns.to_string(),
        },
        Stat {
            label: "Blank Cells",
            value: format!("{} ({}%)", metrics.blank_cells, metrics.blank_percentage),
        },
        Stat {
            label: "Duplicate Rows",
            value: summary.flagged_row_count.to_string(),
        },
        Stat {
            label: "Duplicate Groups",
            value: summary.group_count.to_string(),
        },
        Stat {
            label: "Cleaned Rows",
            value: summary.cleaned_row_count.to_string(),
        },
        Stat {
            label: "Removal Rate",
            value: format!("{}%", summary.removal_rate),
        },
        Stat {
            label: "Memory Usage",
            value: metrics.memory_usage_display(),
        },
    ]
}

/// Renders the preview page for a report.
pub fn render_preview(report: &AnalysisReport, source_name: &str) -> Result<String> {
    let summary = &report.summary;
    let page = PreviewPage {
        source_name,
        sheet_name: &summary.sheet_name,
        message: result_message(summary),
        has_duplicates: !report.duplicates.is_empty(),
        mode_label: summary.mode.label(),
        selected_columns: summary.selected_columns.join(", "),
        stats: stats(summary),
        columns: &report.original.columns,
        preview_rows: report
            .original
            .preview(PREVIEW_ROWS)
            .iter()
            .map(PreviewRow::from_view)
            .collect(),
        duplicate_rows: report
            .duplicates
            .preview(DUPLICATE_ROWS)
            .iter()
            .map(PreviewRow::from_view)
            .collect(),
        duplicate_total: report.duplicates.len(),
        summary,
    };

    page.render().context("Failed to render preview template")
}

/// Renders the preview page and writes it to `path`.
pub fn write_preview(report: &AnalysisReport, source_name: &str, path: &Path) -> Result<()> {
    let html = render_preview(report, source_name)?;
    std::fs::write(path, html)
        .with_context(|| format!("Failed to write preview to {}", path.display()))?;
    tracing::info!("Wrote preview to {}", path.display());
    Ok(())
}
