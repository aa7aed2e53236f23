//! Dataset loading from delimited text, JSON and spreadsheets.
//!
//! Input arrives as raw bytes together with an [`InputFormat`]; the loader
//! builds an immutable [`Dataset`] that the analysis module borrows.

use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, DataType, Reader};
use serde_json::Value;

use crate::error::{DupSiftError, Result};
use crate::models::{CellValue, Dataset};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// JSON array of objects
    Json,
    /// Excel workbook (`.xlsx` or `.xls`)
    Spreadsheet,
}

impl InputFormat {
    /// Infers the format from a file extension.
    ///
    /// `.txt` files are read as CSV.
    ///
    /// # Errors
    /// Returns `UnsupportedFormat` for missing or unknown extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| DupSiftError::unsupported_format(path.display().to_string()))?;

        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            "xlsx" | "xls" => Ok(Self::Spreadsheet),
            other => Err(DupSiftError::unsupported_format(other)),
        }
    }

    /// Returns the format name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Loads a dataset from raw bytes.
///
/// Spreadsheets are read from the sheet named by `sheet`, or the first
/// sheet when no selector is given or the name is unknown. Delimited and
/// JSON sources hold a single sheet named `Sheet1`. Any selector that
/// doesn't match falls back with a warning.
///
/// # Errors
/// Returns `Parse` for malformed input and `InvalidDataset` when JSON is
/// not an array of objects or a workbook has no sheets.
pub fn load_dataset(bytes: &[u8], format: InputFormat, sheet: Option<&str>) -> Result<Dataset> {
    let dataset = match format {
        InputFormat::Csv => single_sheet(load_delimited(bytes, b',')?, sheet),
        InputFormat::Tsv => single_sheet(load_delimited(bytes, b'\t')?, sheet),
        InputFormat::Json => single_sheet(load_json(bytes)?, sheet),
        InputFormat::Spreadsheet => load_spreadsheet(bytes, sheet)?,
    };

    tracing::info!(
        "Loaded {} rows x {} columns from {} input (sheet '{}')",
        dataset.row_count(),
        dataset.column_count(),
        format,
        dataset.sheet_name()
    );

    Ok(dataset)
}

fn single_sheet(dataset: Dataset, sheet: Option<&str>) -> Dataset {
    if let Some(requested) = sheet
        && requested != dataset.sheet_name()
    {
        tracing::warn!(
            "Sheet '{}' not found, using '{}'",
            requested,
            dataset.sheet_name()
        );
    }
    dataset
}

/// Decodes bytes as UTF-8, falling back to Latin-1.
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::debug!("Input is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

fn load_delimited(bytes: &[u8], delimiter: u8) -> Result<Dataset> {
    let text = decode(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DupSiftError::parse_failed("Failed to read header row", e))?
        .iter()
        .map(ToString::to_string)
        .collect();
    let columns = clean_headers(&headers);
    let width = columns.len();

    let mut rows = Vec::new();
    let mut truncated = 0usize;
    for (index, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| DupSiftError::parse_failed(format!("Failed to read row {index}"), e))?;
        if record.len() > width {
            truncated += 1;
        }

        let mut row: Vec<CellValue> = record.iter().take(width).map(parse_cell).collect();
        row.resize(width, CellValue::Empty);
        rows.push(row);
    }

    if truncated > 0 {
        tracing::warn!(
            "{} rows had more fields than the header; extra fields were dropped",
            truncated
        );
    }

    Dataset::new(columns, rows)
}

/// Parses one delimited field.
///
/// Fields stay raw text; numeric text is recognized later by the
/// normalizer and the profiler.
fn parse_cell(raw: &str) -> CellValue {
    if raw.trim().is_empty() {
        CellValue::Empty
    } else {
        CellValue::text(raw)
    }
}

fn load_spreadsheet(bytes: &[u8], sheet: Option<&str>) -> Result<Dataset> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DupSiftError::parse_failed("Failed to open workbook", e))?;

    let sheet_names = workbook.sheet_names();
    let index = match sheet {
        Some(requested) => sheet_names
            .iter()
            .position(|name| name == requested)
            .unwrap_or_else(|| {
                tracing::warn!(
                    "Sheet '{}' not found, using the first sheet of [{}]",
                    requested,
                    sheet_names.join(", ")
                );
                0
            }),
        None => 0,
    };
    let sheet_name = sheet_names
        .get(index)
        .cloned()
        .ok_or_else(|| DupSiftError::invalid_dataset("Workbook has no sheets"))?;

    let range = workbook
        .worksheet_range_at(index)
        .ok_or_else(|| DupSiftError::invalid_dataset(format!("Sheet '{sheet_name}' is missing")))?
        .map_err(|e| DupSiftError::parse_failed(format!("Failed to read sheet '{sheet_name}'"), e))?;

    let mut records = range.rows();
    let headers: Vec<String> = records
        .next()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .unwrap_or_default();
    let columns = clean_headers(&headers);
    let width = columns.len();

    let rows = records
        .map(|record| {
            let mut row: Vec<CellValue> = record.iter().take(width).map(spreadsheet_cell).collect();
            row.resize(width, CellValue::Empty);
            row
        })
        .collect();

    Ok(Dataset::new(columns, rows)?.with_sheet_name(sheet_name))
}

/// Converts a workbook cell, keeping the type the workbook stores.
fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(text) if text.trim().is_empty() => CellValue::Empty,
        Data::String(text) => CellValue::text(text.as_str()),
        Data::Float(number) => CellValue::Number(*number),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(number) => CellValue::Number(*number as f64),
        Data::Bool(flag) => CellValue::Boolean(*flag),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map_or_else(|| CellValue::text(cell.to_string()), CellValue::Date),
        _ => CellValue::text(cell.to_string()),
    }
}

/// Trims header names, names blank ones and disambiguates repeats.
fn clean_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(raw.len());

    for (index, name) in raw.iter().enumerate() {
        let base = match name.trim() {
            "" => format!("Unnamed: {index}"),
            trimmed => trimmed.to_string(),
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }

        seen.insert(candidate.clone());
        columns.push(candidate);
    }

    columns
}

fn load_json(bytes: &[u8]) -> Result<Dataset> {
    let text = decode(bytes);
    let value: Value = serde_json::from_str(&text).map_err(|e| DupSiftError::Serialization {
        context: "Failed to parse JSON input".to_string(),
        source: e,
    })?;

    let Value::Array(records) = value else {
        return Err(DupSiftError::invalid_dataset(
            "JSON input must be an array of objects",
        ));
    };

    let mut columns: Vec<String> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let Value::Object(fields) = record else {
            return Err(DupSiftError::invalid_dataset(format!(
                "JSON record {index} is not an object"
            )));
        };
        for key in fields.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| match record.get(column) {
                    Some(value) => json_cell(value).unwrap_or_else(|err| {
                        tracing::debug!("{}; storing as JSON text", err);
                        CellValue::text(value.to_string())
                    }),
                    None => CellValue::Empty,
                })
                .collect()
        })
        .collect();

    Dataset::new(columns, rows)
}

/// Converts a scalar JSON value to a cell.
fn json_cell(value: &Value) -> Result<CellValue> {
    match value {
        Value::Null => Ok(CellValue::Empty),
        Value::Bool(flag) => Ok(CellValue::Boolean(*flag)),
        Value::Number(number) => number
            .as_f64()
            .map(CellValue::Number)
            .ok_or_else(|| DupSiftError::unsupported_type(format!("number {number}"))),
        Value::String(text) if text.trim().is_empty() => Ok(CellValue::Empty),
        Value::String(text) => Ok(CellValue::text(text.as_str())),
        Value::Array(_) => Err(DupSiftError::unsupported_type("nested array")),
        Value::Object(_) => Err(DupSiftError::unsupported_type("nested object")),
    }
}
