//! Core data structures and analysis for DupSift.
//!
//! This crate provides the dataset model, the loaders and the duplicate
//! analysis engine used by the `dupsift` binary. It never touches the
//! filesystem or the network: input arrives as bytes and results leave as
//! plain values.
//!
//! # Guarantees
//! - The dataset is never mutated; every view is derived fresh
//! - Identical inputs always produce identical reports
//! - Invalid column selections fail before any work is done
//!
//! # Architecture
//! The core library follows these patterns:
//! - Tagged cell values with a dispatching normalizer
//! - Single-pass hash partitioning for duplicate groups
//! - Builder-style configuration passed explicitly to every entry point

pub mod analysis;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use analysis::{
    AnalysisConfig, AnalysisReport, ColumnProfile, DEFAULT_SAMPLE_SIZE, DetectionMode,
    DetectionResult, DuplicateAnalyzer, DuplicateGroup, NormalizedKey, NormalizedValue,
    Normalizer, QualityMetrics, ReportSummary, RowMarker, TableView, ViewRow,
};
pub use error::{DupSiftError, Result};
pub use loader::{InputFormat, load_dataset};
pub use logging::init_logging;
pub use models::{CellValue, ColumnType, Dataset};
