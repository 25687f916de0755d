//! Property tests for the EWMA covariance estimator

use chrono::NaiveDate;
use frontier_data::ReturnMatrix;
use frontier_risk::covariance::outer_product;
use frontier_risk::{CovarianceError, ewma_covariance};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;

fn random_returns(seed: u64, n_rows: usize, n_assets: usize) -> ReturnMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
    let dates = (0..n_rows)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect();
    let assets = (0..n_assets).map(|i| format!("A{i}")).collect();
    let values = Array2::from_shape_fn((n_rows, n_assets), |_| rng.gen_range(-0.05..0.05));
    ReturnMatrix::new(dates, assets, values).unwrap()
}

#[rstest]
#[case(1, 1, 0.5)]
#[case(5, 3, 0.94)]
#[case(60, 8, 0.97)]
#[case(20, 20, 0.1)]
#[case(250, 15, 0.999)]
fn test_symmetric_and_psd(#[case] n_rows: usize, #[case] n_assets: usize, #[case] decay: f64) {
    let returns = random_returns(n_rows as u64 * 7 + n_assets as u64, n_rows, n_assets);
    let cov = ewma_covariance(&returns, decay).unwrap();

    let values = cov.values();
    for i in 0..n_assets {
        assert!(values[[i, i]] >= 0.0);
        for j in 0..n_assets {
            assert_eq!(values[[i, j]], values[[j, i]]);
        }
    }
    assert!(cov.is_positive_semidefinite(1e-10));
    assert_eq!(cov.assets(), returns.assets());
}

#[test]
fn test_deterministic() {
    let returns = random_returns(42, 40, 6);
    let a = ewma_covariance(&returns, 0.94).unwrap();
    let b = ewma_covariance(&returns, 0.94).unwrap();

    for (x, y) in a.values().iter().zip(b.values().iter()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
}

#[test]
fn test_single_row_is_exact_outer_product() {
    let returns = random_returns(7, 1, 4);
    let cov = ewma_covariance(&returns, 0.9).unwrap();
    let expected = outer_product(returns.values().row(0));
    assert_eq!(cov.values(), &expected);
}

#[test]
fn test_invalid_decay_is_reported() {
    let returns = random_returns(1, 10, 2);
    for decay in [0.0, 1.0, -0.5, 2.0, f64::NAN, f64::INFINITY] {
        let err = ewma_covariance(&returns, decay).unwrap_err();
        assert!(matches!(err, CovarianceError::InvalidDecay(_)));
    }
}

#[test]
fn test_empty_return_matrix_is_invalid_parameter() {
    let returns = ReturnMatrix::new(vec![], vec!["A".to_string()], Array2::zeros((0, 1))).unwrap();
    let err = ewma_covariance(&returns, 0.9).unwrap_err();
    assert!(err.is_invalid_parameter());
}
