//! Duplicate analyzer facade.
//!
//! This module provides the `DuplicateAnalyzer` that runs profiling,
//! aggregation, detection and report assembly for one dataset.

use crate::Result;
use crate::models::{ColumnType, Dataset};

use super::aggregate::aggregate;
use super::config::AnalysisConfig;
use super::detection::{detect_with_types, selected_column_names};
use super::models::AnalysisReport;
use super::profile::profile_all;
use super::report::assemble;

/// Runs a complete duplicate analysis.
///
/// # Example
///
/// ```rust
/// use dupsift_core::analysis::{AnalysisConfig, DetectionMode, DuplicateAnalyzer};
/// use dupsift_core::models::{CellValue, Dataset};
///
/// let dataset = Dataset::new(
///     vec!["name".to_string()],
///     vec![
///         vec![CellValue::text("Tom")],
///         vec![CellValue::text("tom ")],
///     ],
/// )?;
///
/// let config = AnalysisConfig::new()
///     .with_columns(["name"])
///     .with_mode(DetectionMode::KeepFirst);
/// let report = DuplicateAnalyzer::new(config).analyze(&dataset)?;
///
/// assert_eq!(report.duplicates.indices(), vec![1]);
/// # Ok::<(), dupsift_core::DupSiftError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DuplicateAnalyzer {
    config: AnalysisConfig,
}

impl DuplicateAnalyzer {
    /// Creates a new analyzer with the given configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Returns a reference to the analyzer configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes a dataset and returns the four report views.
    ///
    /// Fails with `InvalidSelection` before doing any work if the
    /// configured columns are empty or unknown.
    pub fn analyze(&self, dataset: &Dataset) -> Result<AnalysisReport> {
        let indices = self.config.validate(dataset)?;
        let normalizer = self.config.normalizer();

        let profiles = profile_all(dataset, &normalizer, self.config.sample_size);
        let metrics = aggregate(dataset, &profiles);

        // Reuse the profiled types for the comparison columns
        let key_columns: Vec<(usize, ColumnType)> = indices
            .into_iter()
            .map(|index| {
                let column_type = profiles
                    .get(index)
                    .map_or(ColumnType::Text, |p| p.inferred_type);
                (index, column_type)
            })
            .collect();

        let detection = detect_with_types(
            dataset,
            selected_column_names(dataset, &key_columns),
            &key_columns,
            self.config.mode,
            &normalizer,
        );

        tracing::info!(
            "Analysis of '{}' complete: {} duplicate groups, {} flagged rows of {}",
            dataset.sheet_name(),
            detection.group_count(),
            detection.flagged_count(),
            detection.total_rows
        );

        Ok(assemble(dataset, &detection, &profiles, &metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::config::DetectionMode;
    use crate::error::DupSiftError;
    use crate::models::CellValue;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["email".to_string(), "joined".to_string()],
            vec![
                vec![CellValue::text("A@x.com"), CellValue::text("2024-01-05")],
                vec![
                    CellValue::text("a@x.com "),
                    CellValue::text("2024-01-05 00:00:00"),
                ],
                vec![CellValue::text("b@x.com"), CellValue::text("2024-01-06")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_analyzer_creation() {
        let config = AnalysisConfig::new().with_columns(["email"]);
        let analyzer = DuplicateAnalyzer::new(config.clone());
        assert_eq!(analyzer.config(), &config);
    }

    #[test]
    fn test_analyzer_full_analysis() {
        let analyzer = DuplicateAnalyzer::new(
            AnalysisConfig::new()
                .with_columns(["email"])
                .with_mode(DetectionMode::KeepLast),
        );
        let report = analyzer.analyze(&dataset()).unwrap();

        assert_eq!(report.duplicates.indices(), vec![0]);
        assert_eq!(report.cleaned.indices(), vec![1, 2]);
        assert_eq!(report.summary.metrics.total_rows, 3);
        assert_eq!(report.profiles.len(), 2);
    }

    #[test]
    fn test_analyzer_uses_profiled_date_type() {
        let analyzer = DuplicateAnalyzer::new(AnalysisConfig::new().with_columns(["joined"]));
        let report = analyzer.analyze(&dataset()).unwrap();

        assert_eq!(report.summary.group_count, 1);
        assert_eq!(report.duplicates.indices(), vec![0, 1]);
    }

    #[test]
    fn test_analyzer_invalid_selection() {
        let analyzer = DuplicateAnalyzer::new(AnalysisConfig::new().with_columns(["phone"]));
        let err = analyzer.analyze(&dataset()).unwrap_err();
        assert!(matches!(err, DupSiftError::InvalidSelection { .. }));
    }

    #[test]
    fn test_analyzer_empty_dataset() {
        let dataset = Dataset::new(vec!["email".to_string()], vec![]).unwrap();
        let analyzer = DuplicateAnalyzer::new(AnalysisConfig::new().with_columns(["email"]));
        let report = analyzer.analyze(&dataset).unwrap();

        assert!(report.original.is_empty());
        assert!(report.duplicates.is_empty());
        assert!(report.cleaned.is_empty());
        assert_eq!(report.summary.group_count, 0);
        assert_eq!(report.summary.removal_rate, 0.0);
    }
}
