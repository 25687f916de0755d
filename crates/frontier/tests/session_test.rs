//! Integration tests running the whole wizard from files.

use approx::assert_relative_eq;
use frontier::inputs::{ConstraintDraft, Relation, Sector};
use frontier::output::{ExportFormat, Exporter};
use frontier::{Session, SessionError, WizardError, WizardState, WizardStep};
use std::fs;
use std::path::PathBuf;

const PRICES: &str = "\
date,SPY,LQD,HYG
2024-01-04,121.0,60.5,30.0
2024-01-02,100.0,50.0,30.0
2024-01-03,110.0,55.0,
";

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("frontier-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("prices.csv"), PRICES).unwrap();
    dir
}

#[test]
fn test_session_end_to_end() {
    let dir = scratch_dir("session");
    let session_path = dir.join("session.json");
    fs::write(
        &session_path,
        r#"{
            "prices": "prices.csv",
            "assets": ["LQD", "SPY"],
            "expected_returns": {"SPY": "0.07", "LQD": 0.04},
            "sectors": {"SPY": "Equities", "LQD": "corporate bonds"},
            "constraints": [
                {"left": "LQD", "relation": ">=", "right": "Value", "value": "0.2"},
                {}
            ],
            "decay": 0.5
        }"#,
    )
    .unwrap();

    let outcome = Session::load(&session_path).unwrap().run().unwrap();

    // Rows are sorted by date; HYG's gap does not cost a row since HYG is not selected
    let inputs = &outcome.inputs;
    assert_eq!(inputs.assets(), ["LQD", "SPY"]);
    assert_eq!(inputs.observations(), 2);
    assert_eq!(inputs.sectors().get("LQD"), Some(Sector::CorporateBonds));

    // Both assets grow 10% per day, so every return is ln(1.1)
    let r = 1.1_f64.ln();
    let cov = inputs.covariance();
    for i in 0..2 {
        for j in 0..2 {
            assert_relative_eq!(cov.values()[[i, j]], r * r, max_relative = 1e-12);
        }
    }

    assert_eq!(outcome.review.constraints.len(), 1);
    assert!(outcome.review.to_ascii_table().contains("LQD >= 0.2"));

    let json = inputs.export_to_string(ExportFormat::PrettyJson).unwrap();
    assert!(json.contains("\"decay\": 0.5"));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_session_reports_wizard_errors() {
    let dir = scratch_dir("bad-session");
    let session_path = dir.join("session.json");
    fs::write(
        &session_path,
        r#"{
            "prices": "prices.csv",
            "assets": ["SPY", "LQD"],
            "expected_returns": {"SPY": "seven", "LQD": "0.04", "TLT": "0.03"},
            "sectors": {"SPY": "Equities", "LQD": "Corporate Bonds"},
            "decay": 0.94
        }"#,
    )
    .unwrap();

    let err = Session::load(&session_path).unwrap().run().unwrap_err();
    match err {
        SessionError::Wizard(WizardError::ExpectedReturns(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("unexpected error: {other}"),
    }

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_joint_row_drop_among_selected_assets() {
    let dir = scratch_dir("joint");
    let mut wizard = WizardState::default();
    wizard.load_csv(dir.join("prices.csv")).unwrap();
    wizard.select_assets(["SPY", "HYG"]).unwrap();
    wizard
        .submit_expected_returns([("SPY", "0.07"), ("HYG", "0.05")])
        .unwrap();
    wizard.confirm_expected_returns().unwrap();
    wizard
        .submit_sectors([("SPY", "Equities"), ("HYG", "High Yield")])
        .unwrap();
    wizard.confirm_sectors().unwrap();
    wizard
        .submit_constraints(vec![ConstraintDraft::assets("HYG", Relation::Le, "SPY")])
        .unwrap();
    assert_eq!(wizard.step(), WizardStep::Review);

    // The HYG gap on 2024-01-03 invalidates both returns that touch it, for every asset
    let err = wizard.finish(0.94).unwrap_err();
    assert!(matches!(err, WizardError::Data(_)));
    assert_eq!(wizard.step(), WizardStep::Review);

    fs::remove_dir_all(dir).ok();
}
