//! Library module for dupsift
//!
//! This module exposes the CLI definition, upload validation and report
//! writers so they can be exercised from tests. The binary entry point is
//! in main.rs.

pub mod output;
pub mod preview;
pub mod upload;

use clap::{Args, Parser, Subcommand};
use dupsift_core::{AnalysisConfig, DEFAULT_SAMPLE_SIZE, DetectionMode, ReportSummary};
use std::path::PathBuf;

/// CLI argument structure
#[derive(Parser)]
#[command(name = "dupsift")]
#[command(about = "Duplicate row detection and data quality reports")]
#[command(version)]
#[command(long_about = "
DupSift - Duplicate detection for tabular files

Finds rows that repeat across the columns you choose, after trimming
whitespace, folding case and unifying numbers and blank markers. Produces:
- Original data, duplicates-only and cleaned workbooks
- An analysis summary with per-column statistics
- A ZIP bundle of all reports and an optional HTML preview

All processing happens locally; nothing leaves the machine.

EXAMPLES:
  dupsift analyze customers.csv --columns email
  dupsift analyze orders.tsv --columns customer,date --mode keep-last
  dupsift analyze contacts.xlsx --sheet Customers --columns email
  dupsift profile customers.json --json
  dupsift columns customers.csv
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Command {
    /// Find duplicate rows and write reports
    Analyze(AnalyzeArgs),
    /// Show column profiles and data quality metrics
    Profile(ProfileArgs),
    /// List the columns of an input file
    Columns(ColumnsArgs),
}

/// Arguments for `dupsift analyze`
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input file
    #[arg(help = "Input file (.csv, .tsv, .txt, .json, .xlsx or .xls)")]
    pub input: PathBuf,

    /// Comparison columns
    #[arg(
        short,
        long,
        required = true,
        value_delimiter = ',',
        help = "Comma-separated list of columns to compare"
    )]
    pub columns: Vec<String>,

    /// Detection mode
    #[arg(
        short,
        long,
        default_value = "all",
        help = "Which rows to flag: all, keep-first or keep-last"
    )]
    pub mode: DetectionMode,

    /// Compare text case-sensitively
    #[arg(long, help = "Treat 'Tom' and 'tom' as different values")]
    pub case_sensitive: bool,

    /// Sample values per column profile
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE, help = "Sample values per column profile")]
    pub sample_size: usize,

    /// Sheet selector
    #[arg(long, help = "Sheet to analyze; defaults to the first sheet")]
    pub sheet: Option<String>,

    /// Report directory
    #[arg(
        short,
        long,
        env = "DUPSIFT_OUTPUT_DIR",
        default_value = "results",
        help = "Directory for the generated reports"
    )]
    pub output_dir: PathBuf,

    /// HTML preview path
    #[arg(long, value_name = "FILE", help = "Write an HTML preview of the results")]
    pub preview: Option<PathBuf>,

    /// Skip the ZIP bundle
    #[arg(long, help = "Write the workbooks without bundling them into a ZIP")]
    pub no_archive: bool,

    /// Print the summary as JSON
    #[arg(long, help = "Print the analysis summary as JSON")]
    pub json: bool,
}

impl AnalyzeArgs {
    /// Builds the analysis configuration from the arguments.
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::new()
            .with_columns(self.columns.iter().map(|c| c.trim().to_string()))
            .with_mode(self.mode)
            .with_case_sensitive(self.case_sensitive)
            .with_sample_size(self.sample_size)
    }
}

/// Arguments for `dupsift profile`
#[derive(Args)]
pub struct ProfileArgs {
    /// Input file
    #[arg(help = "Input file (.csv, .tsv, .txt, .json, .xlsx or .xls)")]
    pub input: PathBuf,

    /// Sheet selector
    #[arg(long, help = "Sheet to profile; defaults to the first sheet")]
    pub sheet: Option<String>,

    /// Sample values per column profile
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE, help = "Sample values per column profile")]
    pub sample_size: usize,

    /// Print as JSON
    #[arg(long, help = "Print profiles and metrics as JSON")]
    pub json: bool,
}

impl ProfileArgs {
    /// Builds the profiling configuration; no comparison columns are set.
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::new().with_sample_size(self.sample_size)
    }
}

/// Arguments for `dupsift columns`
#[derive(Args)]
pub struct ColumnsArgs {
    /// Input file
    #[arg(help = "Input file (.csv, .tsv, .txt, .json, .xlsx or .xls)")]
    pub input: PathBuf,

    /// Sheet selector
    #[arg(long, help = "Sheet to inspect; defaults to the first sheet")]
    pub sheet: Option<String>,
}

/// Global flags shared by every subcommand
#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(
        short,
        long,
        global = true,
        help = "Suppress all output except errors"
    )]
    pub quiet: bool,
}

/// One-line outcome of an analysis.
pub fn result_message(summary: &ReportSummary) -> String {
    match summary.flagged_row_count {
        0 => "No duplicates found with the selected columns".to_string(),
        1 => "Found 1 duplicate row".to_string(),
        n => format!("Found {n} duplicate rows"),
    }
}
