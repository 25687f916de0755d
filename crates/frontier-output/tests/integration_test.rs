//! Integration tests for review rendering and export.

use chrono::NaiveDate;
use frontier_inputs::{
    AssetSelection, ConstraintDraft, ExpectedReturnMap, Relation, SectorMap, validate_drafts,
};
use frontier_output::{ExportError, ExportFormat, Exporter, MatrixExport, ReviewSummary};
use frontier_risk::CovarianceMatrix;
use ndarray::array;
use rstest::rstest;

fn review() -> ReviewSummary {
    let selected = AssetSelection::new(["SPY", "BUND", "CASH"]).unwrap();
    let returns = ExpectedReturnMap::parse(
        [("SPY", "0.065"), ("BUND", "0.025"), ("CASH", "0.01")],
        &selected,
    )
    .unwrap();
    let sectors = SectorMap::from_labels(
        [
            ("SPY", "Equities"),
            ("BUND", "Euro Government Core"),
            ("CASH", "Cash"),
        ],
        &selected,
    )
    .unwrap();
    let constraints = validate_drafts(
        &[
            ConstraintDraft::scalar("CASH", Relation::Ge, "0.05"),
            ConstraintDraft::assets("BUND", Relation::Ge, "CASH"),
        ],
        &selected,
    )
    .unwrap();

    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    ReviewSummary::new(&selected, &returns, &sectors, &constraints).with_period(start, end)
}

#[test]
fn test_full_review_workflow() {
    let review = review();

    let ascii = review.to_ascii_table();
    assert!(ascii.contains("Review: 3 assets"));
    assert!(ascii.contains("Euro Government Core"));
    assert!(ascii.contains("6.50%"));
    assert!(ascii.contains("1. CASH >= 0.05"));
    assert!(ascii.contains("2. BUND >= CASH"));

    let markdown = review.to_markdown();
    assert!(markdown.contains("**Period:** 2023-01-02 to 2024-12-31"));
    assert!(markdown.contains("| BUND | 2.50% | Euro Government Core |"));
}

#[rstest]
#[case(ExportFormat::Json)]
#[case(ExportFormat::PrettyJson)]
fn test_review_json_round_trip(#[case] format: ExportFormat) {
    let review = review();
    let json = review.export_to_string(format).unwrap();
    let back: ReviewSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, review);
}

#[test]
fn test_covariance_and_correlation_csv() {
    let cov = CovarianceMatrix::new(
        vec!["SPY".to_string(), "CASH".to_string()],
        array![[0.0225, 0.0], [0.0, 0.0]],
    )
    .unwrap();

    let csv = cov.export_to_string(ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().next(), Some("asset,SPY,CASH"));

    // Zero-variance asset: no defined correlation, reported as 0 off the diagonal
    let corr = MatrixExport::correlation(&cov);
    assert_eq!(corr.rows, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[test]
fn test_export_to_unwritable_path() {
    let cov = CovarianceMatrix::new(vec!["SPY".to_string()], array![[0.04]]).unwrap();
    let path = std::env::temp_dir()
        .join("frontier-missing-dir")
        .join("nested")
        .join("cov.csv");
    let err = cov.export_to_file(&path, ExportFormat::Csv).unwrap_err();
    assert!(matches!(err, ExportError::Io(_)));
}
