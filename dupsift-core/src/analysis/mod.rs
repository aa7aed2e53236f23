//! Duplicate analysis module.
//!
//! This module provides the duplicate-detection engine and the statistics
//! that feed its reports:
//! - **Normalization**: canonical comparison values for raw cells
//! - **Profiling**: per-column type inference, null and distinct counts
//! - **Detection**: duplicate groups and flagged/cleaned rows per mode
//! - **Aggregation**: dataset-wide quality metrics
//! - **Reports**: the original, duplicates, cleaned and summary views
//!
//! Everything here is synchronous and pure: the dataset is borrowed, never
//! mutated, and no state survives between calls.
//!
//! # Example
//! ```rust,ignore
//! use dupsift_core::analysis::{AnalysisConfig, DetectionMode, DuplicateAnalyzer};
//!
//! let config = AnalysisConfig::new()
//!     .with_columns(["email"])
//!     .with_mode(DetectionMode::KeepFirst);
//! let report = DuplicateAnalyzer::new(config).analyze(&dataset)?;
//! println!("{} duplicate rows", report.summary.flagged_row_count);
//! ```

mod aggregate;
mod analyzer;
mod config;
mod detection;
mod models;
mod normalize;
mod profile;
mod report;

// Re-export public API
pub use aggregate::aggregate;
pub use analyzer::DuplicateAnalyzer;
pub use config::{AnalysisConfig, DEFAULT_SAMPLE_SIZE, DetectionMode};
pub use detection::{detect, detect_duplicates};
pub use models::{
    AnalysisReport, ColumnProfile, DetectionResult, DuplicateGroup, QualityMetrics,
    ReportSummary, RowMarker, TableView, ViewRow,
};
pub use normalize::{NormalizedKey, NormalizedValue, Normalizer};
pub use profile::{infer_column_type, profile_all, profile_column};
pub use report::{CLEANED_VIEW, DUPLICATES_VIEW, ORIGINAL_VIEW, assemble};
