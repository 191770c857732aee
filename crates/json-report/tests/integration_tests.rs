//! Integration tests for report generation.
//!
//! These tests run the full pipeline from a JSON file to a PDF on disk and
//! reload the result with lopdf.

use json_report::{
    PageRenderer, ReportConfig, ReportGenerator, classify_columns, generate_pdf_report,
    load_json_dataset, run_from_cli,
};
use pretty_assertions::assert_eq;
use regex::Regex;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> PathBuf {
    fixtures_path().join(name)
}

fn page_count(path: &Path) -> usize {
    lopdf::Document::load(path)
        .expect("Failed to reload generated PDF")
        .get_pages()
        .len()
}

fn report_name_pattern() -> Regex {
    Regex::new(r"^report_\d{8}_\d{6}\.pdf$").unwrap()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_value_category_scenario() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(
        &path,
        r#"[{"value": 1, "category": "A"}, {"value": 2, "category": "B"}]"#,
    )
    .unwrap();

    let dataset = load_json_dataset(&path).unwrap();
    assert_eq!(dataset.height(), 2);
    assert_eq!(dataset.column_names(), vec!["value", "category"]);

    let classification = classify_columns(&dataset);
    assert_eq!(classification.numeric, vec!["value"]);
    assert_eq!(classification.categorical, vec!["category"]);
}

#[test]
fn test_sample_fixture_columns() {
    let dataset = load_json_dataset(fixture("sample_data.json")).unwrap();

    assert_eq!(dataset.height(), 12);
    assert_eq!(
        dataset.column_names(),
        vec!["id", "age", "income", "department", "remote"]
    );

    let classification = classify_columns(&dataset);
    assert_eq!(classification.numeric, vec!["id", "age", "income"]);
    assert_eq!(classification.categorical, vec!["department", "remote"]);
}

#[test]
fn test_invalid_structure_is_validation_error() {
    let err = load_json_dataset(fixture("invalid_structure.json")).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.error_code(), "VALIDATION");
}

#[test]
fn test_empty_list_is_validation_error() {
    let err = load_json_dataset(fixture("empty_list.json")).unwrap_err();
    assert!(err.is_validation());
}

// ============================================================================
// Report Generation
// ============================================================================

#[test]
fn test_generate_report_with_title() {
    let dir = TempDir::new().unwrap();
    let report_dir = dir.path().join("reports");

    let config = ReportConfig::builder()
        .json_path(fixture("sample_data.json"))
        .report_dir(&report_dir)
        .title("Test Report")
        .build()
        .unwrap();

    let path = generate_pdf_report(&config).unwrap();

    assert!(path.exists());
    assert!(path.starts_with(&report_dir));
    assert!(std::fs::metadata(&path).unwrap().len() > 0);

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("report_"));
    assert!(report_name_pattern().is_match(&name), "unexpected name {name}");
}

#[test]
fn test_sample_report_page_sequence() {
    let dir = TempDir::new().unwrap();
    let config = ReportConfig::builder()
        .json_path(fixture("sample_data.json"))
        .report_dir(dir.path())
        .build()
        .unwrap();

    let outcome = ReportGenerator::generate(&config).unwrap();

    assert_eq!(
        outcome.pages,
        vec![
            PageRenderer::Title,
            PageRenderer::NumericColumn("id".into()),
            PageRenderer::NumericColumn("age".into()),
            PageRenderer::NumericColumn("income".into()),
            PageRenderer::Correlation(vec!["id".into(), "age".into(), "income".into()]),
            PageRenderer::CategoricalColumn("department".into()),
            PageRenderer::CategoricalColumn("remote".into()),
        ]
    );
    assert_eq!(outcome.rows, 12);
    assert_eq!(outcome.columns, 5);
    assert_eq!(outcome.title, "Data Report: Sample Data");
    assert_eq!(page_count(&outcome.report_path), 7);
}

#[test]
fn test_numeric_only_wrapped_dataset() {
    let dir = TempDir::new().unwrap();
    let config = ReportConfig::builder()
        .json_path(fixture("numeric_only.json"))
        .report_dir(dir.path())
        .build()
        .unwrap();

    let outcome = ReportGenerator::generate(&config).unwrap();

    assert!(outcome.classification.categorical.is_empty());
    assert_eq!(outcome.pages.len(), 4);
    assert_eq!(
        outcome.pages.last(),
        Some(&PageRenderer::Correlation(vec![
            "temperature".into(),
            "humidity".into()
        ]))
    );
    assert_eq!(page_count(&outcome.report_path), 4);
}

#[test]
fn test_all_null_dataset_gets_fallback_page() {
    let dir = TempDir::new().unwrap();
    let config = ReportConfig::builder()
        .json_path(fixture("all_null.json"))
        .report_dir(dir.path())
        .build()
        .unwrap();

    let outcome = ReportGenerator::generate(&config).unwrap();

    assert_eq!(
        outcome.pages,
        vec![PageRenderer::Title, PageRenderer::Fallback]
    );
    assert_eq!(page_count(&outcome.report_path), 2);
}

#[test]
fn test_extreme_magnitude_columns_still_render() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("extreme.json");
    std::fs::write(
        &path,
        r#"[{"v": -1e308, "w": 1.7976931348623157e308}, {"v": 1e308, "w": 1.7976931348623157e308}]"#,
    )
    .unwrap();

    let config = ReportConfig::builder()
        .json_path(&path)
        .report_dir(dir.path().join("reports"))
        .build()
        .unwrap();

    let outcome = ReportGenerator::generate(&config).unwrap();

    assert_eq!(
        outcome.pages,
        vec![
            PageRenderer::Title,
            PageRenderer::NumericColumn("v".into()),
            PageRenderer::NumericColumn("w".into()),
            PageRenderer::Correlation(vec!["v".into(), "w".into()]),
        ]
    );
    assert_eq!(page_count(&outcome.report_path), 4);
}

#[test]
fn test_report_dir_is_created() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b").join("c");

    let path = run_from_cli(fixture("numeric_only.json"), Some(nested.as_path()), None).unwrap();

    assert!(nested.is_dir());
    assert_eq!(path.parent(), Some(nested.as_path()));
}

#[test]
fn test_missing_file_is_not_found_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let report_dir = dir.path().join("reports");

    let err = run_from_cli(fixture("does_not_exist.json"), Some(report_dir.as_path()), None).unwrap_err();

    assert!(err.is_not_found());
    assert!(!report_dir.exists());
}

#[test]
fn test_invalid_dataset_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let report_dir = dir.path().join("reports");

    let err = run_from_cli(
        fixture("invalid_structure.json"),
        Some(report_dir.as_path()),
        Some("Broken"),
    )
    .unwrap_err();

    assert!(err.is_validation());
    assert!(!report_dir.exists());
}

#[test]
fn test_outcome_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let config = ReportConfig::builder()
        .json_path(fixture("numeric_only.json"))
        .report_dir(dir.path())
        .title("Sensors")
        .build()
        .unwrap();

    let outcome = ReportGenerator::generate(&config).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["title"], "Sensors");
    assert_eq!(json["rows"], 6);
    assert_eq!(json["pages"][0]["page"], "title");
    assert_eq!(json["pages"][1]["columns"], "temperature");
}
