//! Report output operations.
//!
//! Writes the four report workbooks and bundles them into a ZIP archive.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use dupsift_core::{AnalysisReport, CellValue, RowMarker, TableView};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Fill for rows marked as duplicates.
const DUPLICATE_FILL: &str = "#FFF3CD";
/// Fill for the duplicates workbook header.
const HEADER_FILL: &str = "#007BFF";
/// Sample text longer than this is cut and marked with `...`.
const SAMPLE_MAX_CHARS: usize = 50;

/// Where and how reports are written.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory receiving every file
    pub output_dir: PathBuf,
    /// Bundle the workbooks into a ZIP archive
    pub archive: bool,
    /// Analysis time, used in file names and the summary sheet
    pub generated_at: NaiveDateTime,
}

impl ExportOptions {
    /// Options writing to `output_dir` with an archive, stamped now.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            archive: true,
            generated_at: Local::now().naive_local(),
        }
    }

    /// Builder method to enable or disable the ZIP bundle.
    pub fn with_archive(mut self, archive: bool) -> Self {
        self.archive = archive;
        self
    }

    /// Builder method to fix the analysis time.
    pub fn with_generated_at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Timestamp suffix shared by every file of one export.
    pub fn timestamp(&self) -> String {
        self.generated_at.format("%Y%m%d_%H%M%S").to_string()
    }

    fn path(&self, stem: &str, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.{}", stem, self.timestamp(), extension))
    }
}

/// Files produced by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReport {
    /// Workbooks in bundle order
    pub workbooks: Vec<PathBuf>,
    /// ZIP bundle, when requested
    pub archive: Option<PathBuf>,
}

/// Writes the summary, original, duplicates and cleaned workbooks.
///
/// The duplicates workbook is skipped when no row was flagged.
pub fn export_report(report: &AnalysisReport, options: &ExportOptions) -> Result<ExportedReport> {
    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            options.output_dir.display()
        )
    })?;

    let mut workbooks = Vec::with_capacity(4);

    let summary_path = options.path("Analysis_Summary", "xlsx");
    write_summary_workbook(report, options.generated_at, &summary_path)?;
    workbooks.push(summary_path);

    let original_path = options.path("Original_Data", "xlsx");
    write_view_workbook(&report.original, &original_path, false)?;
    workbooks.push(original_path);

    if report.duplicates.is_empty() {
        tracing::debug!("No flagged rows; skipping the duplicates workbook");
    } else {
        let duplicates_path = options.path("Duplicates_Only", "xlsx");
        write_view_workbook(&report.duplicates, &duplicates_path, true)?;
        workbooks.push(duplicates_path);
    }

    let cleaned_path = options.path("Cleaned_Data", "xlsx");
    write_view_workbook(&report.cleaned, &cleaned_path, false)?;
    workbooks.push(cleaned_path);

    let archive = if options.archive {
        let archive_path = options.path("Duplicate_Analysis_Report", "zip");
        bundle_archive(&workbooks, &archive_path)?;
        Some(archive_path)
    } else {
        None
    };

    tracing::info!(
        "Wrote {} workbooks to {}",
        workbooks.len(),
        options.output_dir.display()
    );

    Ok(ExportedReport {
        workbooks,
        archive,
    })
}

/// Writes one table view as a single-sheet workbook.
///
/// Rows marked as duplicates are filled yellow. With `styled_header`, the
/// header is bold white on blue.
pub fn write_view_workbook(view: &TableView, path: &Path, styled_header: bool) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_fmt = if styled_header {
        Format::new()
            .set_bold()
            .set_font_color("#FFFFFF")
            .set_background_color(HEADER_FILL)
            .set_align(FormatAlign::Center)
    } else {
        Format::new().set_bold()
    };
    let duplicate_fmt = Format::new().set_background_color(DUPLICATE_FILL);

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&view.name)?;

        for (col, name) in view.columns.iter().enumerate() {
            sheet.write_string_with_format(0, column_number(col)?, name, &header_fmt)?;
        }

        for (i, row) in view.rows.iter().enumerate() {
            let row_number = row_number(i + 1)?;
            let row_fmt = (row.marker == RowMarker::Duplicate).then_some(&duplicate_fmt);
            for (col, cell) in row.cells.iter().enumerate() {
                write_cell(sheet, row_number, column_number(col)?, cell, row_fmt)?;
            }
        }

        sheet.set_freeze_panes(1, 0)?;
    }

    save(&mut workbook, path)
}

/// Writes the analysis summary workbook.
///
/// Sheet `Summary` lists the headline metrics; sheet `Column Analysis`
/// holds one row per column profile.
pub fn write_summary_workbook(
    report: &AnalysisReport,
    generated_at: NaiveDateTime,
    path: &Path,
) -> Result<()> {
    let summary = &report.summary;
    let metrics = &summary.metrics;
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let rows: Vec<(&str, CellValue)> = vec![
        (
            "Analysis Date",
            CellValue::text(generated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ),
        ("Total Rows", count(metrics.total_rows)),
        ("Total Columns", count(metrics.total_columns)),
        ("Duplicate Rows Found", count(summary.flagged_row_count)),
        ("Duplicate Groups", count(summary.group_count)),
        ("Cleaned Rows Remaining", count(summary.cleaned_row_count)),
        ("Removal Rate (%)", CellValue::Number(summary.removal_rate)),
        ("Blank Cells", count(metrics.blank_cells)),
        (
            "Blank Percentage (%)",
            CellValue::Number(metrics.blank_percentage),
        ),
        (
            "Analysis Columns",
            CellValue::text(summary.selected_columns.join(", ")),
        ),
        ("Duplicate Detection Type", CellValue::text(summary.mode.label())),
        ("Memory Usage", CellValue::text(metrics.memory_usage_display())),
    ];

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        sheet.write_string_with_format(0, 0, "Metric", &bold)?;
        sheet.write_string_with_format(0, 1, "Value", &bold)?;

        for (i, (metric, value)) in rows.iter().enumerate() {
            let row = row_number(i + 1)?;
            sheet.write_string(row, 0, *metric)?;
            write_cell(sheet, row, 1, value, None)?;
        }

        sheet.set_column_width(0, 26)?;
        sheet.set_column_width(1, 40)?;
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Column Analysis")?;

        let headers = [
            "Column Name",
            "Data Type",
            "Non-Null Count",
            "Null Count",
            "Unique Values",
            "Column Duplicates",
            "Sample Values",
        ];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, column_number(col)?, *header, &bold)?;
        }

        for (i, profile) in report.profiles.iter().enumerate() {
            let row = row_number(i + 1)?;
            sheet.write_string(row, 0, &profile.column_name)?;
            sheet.write_string(row, 1, profile.type_label())?;
            sheet.write_number(row, 2, profile.non_null_count as f64)?;
            sheet.write_number(row, 3, profile.null_count as f64)?;
            sheet.write_number(row, 4, profile.unique_count as f64)?;
            sheet.write_number(row, 5, profile.duplicate_count as f64)?;
            sheet.write_string(row, 6, profile.sample_summary(SAMPLE_MAX_CHARS))?;
        }

        sheet.set_column_width(0, 24)?;
        sheet.set_column_width(1, 28)?;
        sheet.set_column_width(6, 60)?;
    }

    save(&mut workbook, path)
}

/// Bundles files into a deflate-compressed ZIP archive.
///
/// Entries are stored flat under their file names, in the given order.
pub fn bundle_archive(files: &[PathBuf], archive_path: &Path) -> Result<()> {
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("Invalid file name: {}", path.display()))?;
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

        zip.start_file(name, options)
            .with_context(|| format!("Failed to add {name} to archive"))?;
        zip.write_all(&bytes)
            .with_context(|| format!("Failed to write {name} to archive"))?;
    }

    zip.finish()
        .with_context(|| format!("Failed to finish {}", archive_path.display()))?;

    tracing::debug!(
        "Bundled {} files into {}",
        files.len(),
        archive_path.display()
    );
    Ok(())
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: Option<&Format>,
) -> std::result::Result<(), XlsxError> {
    match (cell, format) {
        (CellValue::Text(text), Some(fmt)) => {
            sheet.write_string_with_format(row, col, text, fmt)?;
        }
        (CellValue::Text(text), None) => {
            sheet.write_string(row, col, text)?;
        }
        (CellValue::Number(n), Some(fmt)) => {
            sheet.write_number_with_format(row, col, *n, fmt)?;
        }
        (CellValue::Number(n), None) => {
            sheet.write_number(row, col, *n)?;
        }
        (CellValue::Boolean(b), Some(fmt)) => {
            sheet.write_boolean_with_format(row, col, *b, fmt)?;
        }
        (CellValue::Boolean(b), None) => {
            sheet.write_boolean(row, col, *b)?;
        }
        (CellValue::Date(_), Some(fmt)) => {
            sheet.write_string_with_format(row, col, cell.to_string(), fmt)?;
        }
        (CellValue::Date(_), None) => {
            sheet.write_string(row, col, cell.to_string())?;
        }
        (CellValue::Empty, Some(fmt)) => {
            sheet.write_blank(row, col, fmt)?;
        }
        (CellValue::Empty, None) => {}
    }
    Ok(())
}

fn count(value: u64) -> CellValue {
    CellValue::Number(value as f64)
}

fn row_number(index: usize) -> Result<u32> {
    u32::try_from(index).context("Row index exceeds worksheet limits")
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index).context("Column index exceeds worksheet limits")
}

fn save(workbook: &mut Workbook, path: &Path) -> Result<()> {
    workbook
        .save(path)
        .with_context(|| format!("Failed to save workbook {}", path.display()))
}
