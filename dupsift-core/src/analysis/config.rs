//! Duplicate analysis configuration.
//!
//! This module provides the per-request configuration: which columns form
//! the comparison key, which detection mode applies, and how text and
//! samples are handled.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DupSiftError, Result};
use crate::models::Dataset;

use super::normalize::Normalizer;

/// Default number of sample values kept per column profile.
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Which rows of a duplicate group are flagged and which are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMode {
    /// Flag every row of every duplicate group
    #[default]
    #[serde(alias = "all-duplicates")]
    All,
    /// Flag every duplicate except the first occurrence
    #[serde(alias = "except_first")]
    KeepFirst,
    /// Flag every duplicate except the last occurrence
    #[serde(alias = "except_last")]
    KeepLast,
}

impl DetectionMode {
    /// Machine-readable mode name.
    pub fn name(&self) -> &'static str {
        match self {
            DetectionMode::All => "all",
            DetectionMode::KeepFirst => "keep-first",
            DetectionMode::KeepLast => "keep-last",
        }
    }

    /// Human-readable label used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            DetectionMode::All => "All Duplicates",
            DetectionMode::KeepFirst => "Keep First",
            DetectionMode::KeepLast => "Keep Last",
        }
    }
}

impl std::fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DetectionMode {
    type Err = DupSiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" | "all-duplicates" => Ok(DetectionMode::All),
            "keep-first" | "keep_first" | "except_first" => Ok(DetectionMode::KeepFirst),
            "keep-last" | "keep_last" | "except_last" => Ok(DetectionMode::KeepLast),
            other => Err(DupSiftError::configuration(format!(
                "unknown detection mode '{}' (expected all, keep-first or keep-last)",
                other
            ))),
        }
    }
}

/// Duplicate analysis configuration.
///
/// Built per request and passed explicitly; nothing is kept between
/// analyses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Columns forming the comparison key, in first-mention order
    pub selected_columns: Vec<String>,
    /// Detection mode
    pub mode: DetectionMode,
    /// Compare text with case preserved
    pub case_sensitive: bool,
    /// Number of distinct sample values per column profile
    pub sample_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            selected_columns: Vec::new(),
            mode: DetectionMode::All,
            case_sensitive: false,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl AnalysisConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the comparison columns.
    ///
    /// Repeated names are collapsed; the first mention keeps its position.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_columns.clear();
        for column in columns {
            let column = column.into();
            if !self.selected_columns.contains(&column) {
                self.selected_columns.push(column);
            }
        }
        self
    }

    /// Builder method to set the detection mode.
    pub fn with_mode(mut self, mode: DetectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder method to enable case-sensitive comparison.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Builder method to set the profile sample size.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        if sample_size == 0 {
            tracing::warn!("sample_size 0 raised to 1");
        }
        self.sample_size = sample_size.max(1);
        self
    }

    /// Normalizer matching this configuration.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.case_sensitive)
    }

    /// Validates the configuration against a dataset.
    ///
    /// Returns the column indices of the selection, in selection order.
    /// Fails with `InvalidSelection` when the selection is empty or names a
    /// column the dataset doesn't have.
    pub fn validate(&self, dataset: &Dataset) -> Result<Vec<usize>> {
        if self.sample_size == 0 {
            return Err(DupSiftError::configuration(
                "sample_size must be at least 1",
            ));
        }
        resolve_columns(dataset, &self.selected_columns)
    }
}

/// Resolves column names to indices, rejecting empty or unknown selections.
pub(crate) fn resolve_columns(dataset: &Dataset, selected: &[String]) -> Result<Vec<usize>> {
    if selected.is_empty() {
        return Err(DupSiftError::invalid_selection("no columns selected"));
    }

    let mut indices = Vec::with_capacity(selected.len());
    let mut unknown = Vec::new();

    for name in selected {
        match dataset.column_index(name) {
            Some(index) if !indices.contains(&index) => indices.push(index),
            Some(_) => {}
            None => unknown.push(name.as_str()),
        }
    }

    if !unknown.is_empty() {
        return Err(DupSiftError::invalid_selection(format!(
            "unknown columns: {}",
            unknown.join(", ")
        )));
    }

    Ok(indices)
}
