//! Duplicate detection tool for tabular files.
//!
//! This binary reads a CSV, TSV, JSON or Excel file, finds rows that repeat
//! across the chosen columns and writes styled workbooks, a ZIP bundle and an
//! optional HTML preview of the results.
//!
//! # Guarantees
//! - Input files are never modified
//! - All processing is local; no network access
//! - Reports are written only under the chosen output directory

use anyhow::{Context, Result};
use clap::Parser;
use dupsift::output::{ExportOptions, export_report};
use dupsift::preview::write_preview;
use dupsift::upload::read_input;
use dupsift::{AnalyzeArgs, Cli, ColumnsArgs, Command, ProfileArgs, result_message};
use dupsift_core::analysis::{aggregate, profile_all};
use dupsift_core::{DuplicateAnalyzer, init_logging};
use serde::Serialize;
use tracing::{error, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.global.verbose, cli.global.quiet)?;

    let outcome = match &cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Profile(args) => run_profile(args),
        Command::Columns(args) => run_columns(args),
    };

    outcome.map_err(|e| {
        error!("{:#}", e);
        e
    })
}

/// Analyzes an input file and writes the reports
fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let (input, dataset) = read_input(&args.input, args.sheet.as_deref())?;

    let config = args.analysis_config();
    info!(
        "Comparing [{}] in {} mode",
        config.selected_columns.join(", "),
        config.mode
    );

    let report = DuplicateAnalyzer::new(config)
        .analyze(&dataset)
        .context("Duplicate analysis failed")?;

    info!("✓ Analysis completed");
    println!("{}", result_message(&report.summary));

    if args.json {
        let json = serde_json::to_string_pretty(&report.summary)
            .context("Failed to serialize summary")?;
        println!("{json}");
    }

    let options = ExportOptions::new(&args.output_dir).with_archive(!args.no_archive);
    let exported = export_report(&report, &options)?;

    for workbook in &exported.workbooks {
        println!("Report: {}", workbook.display());
    }
    if let Some(archive) = &exported.archive {
        info!("✓ Reports bundled");
        println!("Archive: {}", archive.display());
    }

    if let Some(preview_path) = &args.preview {
        write_preview(&report, &input.display_name(), preview_path)?;
        println!("Preview: {}", preview_path.display());
    }

    Ok(())
}

#[derive(Serialize)]
struct ProfileOutput<'a> {
    sheet_name: &'a str,
    metrics: dupsift_core::QualityMetrics,
    profiles: Vec<dupsift_core::ColumnProfile>,
}

/// Prints column profiles and quality metrics
fn run_profile(args: &ProfileArgs) -> Result<()> {
    let (_, dataset) = read_input(&args.input, args.sheet.as_deref())?;

    let config = args.analysis_config();
    let profiles = profile_all(&dataset, &config.normalizer(), config.sample_size);
    let metrics = aggregate(&dataset, &profiles);

    if args.json {
        let output = ProfileOutput {
            sheet_name: dataset.sheet_name(),
            metrics,
            profiles,
        };
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialize profiles")?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "Rows: {}  Columns: {}  Blank cells: {} ({}%)  Memory: {}",
        metrics.total_rows,
        metrics.total_columns,
        metrics.blank_cells,
        metrics.blank_percentage,
        metrics.memory_usage_display()
    );
    println!();
    println!(
        "{:<24} {:<28} {:>9} {:>6} {:>7} {:>6}  Samples",
        "Column", "Type", "Non-null", "Null", "Unique", "Dups"
    );
    for profile in &profiles {
        println!(
            "{:<24} {:<28} {:>9} {:>6} {:>7} {:>6}  {}",
            profile.column_name,
            profile.type_label(),
            profile.non_null_count,
            profile.null_count,
            profile.unique_count,
            profile.duplicate_count,
            profile.sample_summary(50)
        );
    }

    Ok(())
}

/// Lists the columns of an input file
fn run_columns(args: &ColumnsArgs) -> Result<()> {
    let (_, dataset) = read_input(&args.input, args.sheet.as_deref())?;

    info!("Sheet '{}'", dataset.sheet_name());
    for column in dataset.columns() {
        println!("{column}");
    }

    Ok(())
}
