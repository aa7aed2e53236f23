//! End-to-end duplicate detection scenarios.
//!
//! This test suite covers:
//! - The three detection modes over a small people table
//! - Datasets without duplicates
//! - Loading delimited, JSON and spreadsheet input and analyzing it in one flow
//! - Selection errors surfacing before any work is done

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use dupsift_core::{
    AnalysisConfig, CellValue, ColumnType, Dataset, DetectionMode, DupSiftError,
    DuplicateAnalyzer, InputFormat, Result, RowMarker, analysis::detect_duplicates, load_dataset,
};

/// Rows `[{n:"Tom",id:1},{n:"tom ",id:2},{n:"Ann",id:3}]`
fn people() -> Dataset {
    Dataset::new(
        vec!["n".to_string(), "id".to_string()],
        vec![
            vec![CellValue::text("Tom"), CellValue::Number(1.0)],
            vec![CellValue::text("tom "), CellValue::Number(2.0)],
            vec![CellValue::text("Ann"), CellValue::Number(3.0)],
        ],
    )
    .unwrap()
}

fn config(columns: &[&str], mode: DetectionMode) -> AnalysisConfig {
    AnalysisConfig::new()
        .with_columns(columns.iter().copied())
        .with_mode(mode)
}

// =============================================================================
// Detection Modes
// =============================================================================

#[test]
fn test_scenario_all_duplicates() -> Result<()> {
    let result = detect_duplicates(&people(), &config(&["n"], DetectionMode::All))?;

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].rows, vec![0, 1]);
    assert_eq!(result.flagged, vec![0, 1]);
    assert_eq!(result.cleaned, vec![0, 2]);
    Ok(())
}

#[test]
fn test_scenario_keep_first() -> Result<()> {
    let result = detect_duplicates(&people(), &config(&["n"], DetectionMode::KeepFirst))?;

    assert_eq!(result.flagged, vec![1]);
    assert_eq!(result.cleaned, vec![0, 2]);
    Ok(())
}

#[test]
fn test_scenario_keep_last() -> Result<()> {
    let result = detect_duplicates(&people(), &config(&["n"], DetectionMode::KeepLast))?;

    assert_eq!(result.flagged, vec![0]);
    assert_eq!(result.cleaned, vec![1, 2]);
    Ok(())
}

#[test]
fn test_scenario_no_duplicates() -> Result<()> {
    let dataset = people();
    for mode in [
        DetectionMode::All,
        DetectionMode::KeepFirst,
        DetectionMode::KeepLast,
    ] {
        let report = DuplicateAnalyzer::new(config(&["id"], mode)).analyze(&dataset)?;

        assert_eq!(report.summary.group_count, 0);
        assert!(report.duplicates.is_empty());
        assert_eq!(report.cleaned.indices(), vec![0, 1, 2]);
        assert_eq!(report.cleaned.rows.len(), report.original.rows.len());
        for (cleaned, original) in report.cleaned.rows.iter().zip(&report.original.rows) {
            assert_eq!(cleaned.cells, original.cells);
        }
    }
    Ok(())
}

// =============================================================================
// Loader + Analyzer
// =============================================================================

#[test]
fn test_csv_end_to_end() -> Result<()> {
    let csv = "name,email,joined\n\
               Tom,TOM@example.com,2024-01-05\n\
               Ann,ann@example.com,2024-02-01\n\
               tom , tom@example.com ,2024-01-05 00:00:00\n\
               Bob,,2024-03-01\n\
               Bo,NULL,2024-03-02\n";
    let dataset = load_dataset(csv.as_bytes(), InputFormat::Csv, None)?;

    let report = DuplicateAnalyzer::new(config(&["email"], DetectionMode::KeepFirst))
        .analyze(&dataset)?;

    // Tom twice by email, and two blank emails
    assert_eq!(report.summary.group_count, 2);
    assert_eq!(report.duplicates.indices(), vec![2, 4]);
    assert_eq!(report.cleaned.indices(), vec![0, 1, 3]);
    assert_eq!(report.original.rows[2].marker, RowMarker::Duplicate);
    assert_eq!(report.original.rows[0].marker, RowMarker::Unique);
    assert_eq!(report.summary.removal_rate, 40.0);
    assert_eq!(report.summary.metrics.total_rows, 5);
    assert_eq!(report.summary.metrics.blank_cells, 2);
    Ok(())
}

#[test]
fn test_numeric_text_keeps_raw_formatting() -> Result<()> {
    let csv = "code\n7.0\n7\n1E5\n+7\n";
    let dataset = load_dataset(csv.as_bytes(), InputFormat::Csv, None)?;

    let report = DuplicateAnalyzer::new(config(&["code"], DetectionMode::KeepFirst))
        .analyze(&dataset)?;

    // 7.0, 7 and +7 compare equal but keep their own spelling
    assert_eq!(report.duplicates.indices(), vec![1, 3]);
    let cleaned: Vec<&CellValue> = report.cleaned.rows.iter().map(|r| &r.cells[0]).collect();
    assert_eq!(cleaned, [&CellValue::text("7.0"), &CellValue::text("1E5")]);

    let profile = &report.summary.column_profiles[0];
    assert_eq!(profile.inferred_type, ColumnType::Number);
    assert_eq!(
        profile.sample_values,
        vec![
            CellValue::text("7.0"),
            CellValue::text("7"),
            CellValue::text("1E5"),
            CellValue::text("+7"),
        ]
    );
    Ok(())
}

#[test]
fn test_spreadsheet_end_to_end() -> Result<()> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Contacts").unwrap();
    sheet.write_string(0, 0, "email").unwrap();
    sheet.write_string(1, 0, "TOM@example.com").unwrap();
    sheet.write_string(2, 0, "ann@example.com").unwrap();
    sheet.write_string(3, 0, " tom@example.com").unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let dataset = load_dataset(&bytes, InputFormat::Spreadsheet, Some("Contacts"))?;
    let report = DuplicateAnalyzer::new(config(&["email"], DetectionMode::All))
        .analyze(&dataset)?;

    assert_eq!(report.summary.sheet_name, "Contacts");
    assert_eq!(report.duplicates.indices(), vec![0, 2]);
    Ok(())
}

#[test]
fn test_multi_column_dates_end_to_end() -> Result<()> {
    let csv = "name,joined\n\
               Tom,2024-01-05\n\
               tom,2024-01-05 00:00:00\n\
               Tom,2024-01-06\n";
    let dataset = load_dataset(csv.as_bytes(), InputFormat::Csv, None)?;

    let report = DuplicateAnalyzer::new(config(&["name", "joined"], DetectionMode::All))
        .analyze(&dataset)?;

    assert_eq!(report.duplicates.indices(), vec![0, 1]);
    assert_eq!(report.summary.column_profiles.len(), 2);
    assert_eq!(report.summary.column_profiles[1].column_name, "joined");
    Ok(())
}

#[test]
fn test_json_end_to_end() -> Result<()> {
    let json = r#"[
        {"sku": "A-1", "qty": 7},
        {"sku": "a-1 ", "qty": 7.0},
        {"sku": "B-2", "qty": 3}
    ]"#;
    let dataset = load_dataset(json.as_bytes(), InputFormat::Json, None)?;

    let report = DuplicateAnalyzer::new(config(&["sku", "qty"], DetectionMode::KeepLast))
        .analyze(&dataset)?;

    assert_eq!(report.duplicates.indices(), vec![0]);
    assert_eq!(report.cleaned.indices(), vec![1, 2]);
    Ok(())
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_column_is_rejected() {
    let err = DuplicateAnalyzer::new(config(&["n", "email"], DetectionMode::All))
        .analyze(&people())
        .unwrap_err();

    assert!(matches!(err, DupSiftError::InvalidSelection { .. }));
    assert!(err.to_string().contains("email"));
}

#[test]
fn test_empty_selection_is_rejected() {
    let err = detect_duplicates(&people(), &AnalysisConfig::new()).unwrap_err();
    assert!(matches!(err, DupSiftError::InvalidSelection { .. }));
}
