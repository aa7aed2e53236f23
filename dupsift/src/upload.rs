//! Input file validation and loading.
//!
//! Checks the extension and size of an input file before reading it into a
//! dataset.

use dupsift_core::{Dataset, DupSiftError, InputFormat, Result, load_dataset};
use std::path::{Path, PathBuf};

/// Largest accepted input file, in bytes (50 MB).
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// A validated input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Path as given on the command line
    pub path: PathBuf,
    /// Format inferred from the extension
    pub format: InputFormat,
    /// File size in bytes
    pub size: u64,
}

impl InputFile {
    /// File name without directories, for report headings.
    pub fn display_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }

    /// File size formatted in megabytes.
    pub fn size_display(&self) -> String {
        format!("{:.2} MB", self.size as f64 / (1024.0 * 1024.0))
    }
}

/// Validates an input file's extension and size.
///
/// # Errors
/// Returns `UnsupportedFormat` for unknown extensions, `Io` when the file
/// cannot be inspected and `Configuration` when it is not a regular file or
/// exceeds [`MAX_FILE_SIZE`].
pub fn validate_input(path: &Path) -> Result<InputFile> {
    let format = InputFormat::from_path(path)?;

    let metadata = std::fs::metadata(path).map_err(|e| DupSiftError::Io {
        context: format!("Failed to read {}", path.display()),
        source: e,
    })?;

    if !metadata.is_file() {
        return Err(DupSiftError::configuration(format!(
            "{} is not a regular file",
            path.display()
        )));
    }

    let size = metadata.len();
    if size > MAX_FILE_SIZE {
        return Err(DupSiftError::configuration(format!(
            "{} is {:.2} MB; the limit is {} MB",
            path.display(),
            size as f64 / (1024.0 * 1024.0),
            MAX_FILE_SIZE / (1024 * 1024)
        )));
    }

    Ok(InputFile {
        path: path.to_path_buf(),
        format,
        size,
    })
}

/// Validates and loads an input file.
pub fn read_input(path: &Path, sheet: Option<&str>) -> Result<(InputFile, Dataset)> {
    let input = validate_input(path)?;
    tracing::info!(
        "Reading {} ({}, {})",
        input.display_name(),
        input.format,
        input.size_display()
    );

    let bytes = std::fs::read(path).map_err(|e| DupSiftError::Io {
        context: format!("Failed to read {}", path.display()),
        source: e,
    })?;

    let dataset = load_dataset(&bytes, input.format, sheet)?;
    Ok((input, dataset))
}
