//! Exponentially Weighted Moving Average (EWMA) Covariance Estimator
//!
//! EWMA gives more weight to recent observations, making the estimate
//! responsive to changing market conditions at the cost of some noise.
//!
//! The EWMA covariance between assets i and j is:
//! Cov_0(i,j) = r_{i,0} * r_{j,0}
//! Cov_t(i,j) = λ * Cov_{t-1}(i,j) + (1-λ) * r_{i,t} * r_{j,t}
//!
//! Returns are used as-is (no centering, no bias correction) and must be
//! processed in chronological order. λ is always chosen by the caller.

use super::matrix::CovarianceMatrix;
use super::{CovarianceError, CovarianceEstimator};
use frontier_data::ReturnMatrix;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// EWMA covariance estimator configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EwmaConfig {
    /// Decay factor λ in (0, 1)
    /// Higher values = more weight on past, slower adaptation
    /// Lower values = more weight on recent, faster adaptation
    pub decay: f64,

    /// Minimum number of observations required (default: 1)
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
}

const fn default_min_observations() -> usize {
    1
}

impl EwmaConfig {
    /// Configuration with the given decay and the minimum observation count of 1.
    pub const fn new(decay: f64) -> Self {
        Self {
            decay,
            min_observations: default_min_observations(),
        }
    }

    /// Require at least `min_observations` return rows.
    pub const fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations;
        self
    }
}

/// EWMA covariance estimator
#[derive(Debug, Clone)]
pub struct EwmaCovarianceEstimator {
    config: EwmaConfig,
}

impl EwmaCovarianceEstimator {
    /// Create a new EWMA estimator with the given configuration
    ///
    /// # Errors
    /// Returns [`CovarianceError::InvalidDecay`] if the decay is not strictly
    /// between 0 and 1, and [`CovarianceError::InvalidParameter`] if
    /// `min_observations` is zero.
    pub fn new(config: EwmaConfig) -> Result<Self, CovarianceError> {
        validate_decay(config.decay)?;
        if config.min_observations == 0 {
            return Err(CovarianceError::InvalidParameter(
                "min_observations must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Create an estimator with the given decay.
    ///
    /// # Errors
    /// Returns [`CovarianceError::InvalidDecay`] if the decay is out of range.
    pub fn with_decay(decay: f64) -> Result<Self, CovarianceError> {
        Self::new(EwmaConfig::new(decay))
    }

    /// The estimator's configuration
    pub const fn config(&self) -> &EwmaConfig {
        &self.config
    }

    /// Get the half-life of the EWMA (in periods)
    ///
    /// Half-life = ln(0.5) / ln(λ)
    pub fn half_life(&self) -> f64 {
        0.5_f64.ln() / self.config.decay.ln()
    }

    /// Estimate a labelled covariance matrix from a [`ReturnMatrix`].
    ///
    /// # Errors
    /// Returns an error if there are fewer rows than `min_observations`.
    pub fn estimate_returns(
        &self,
        returns: &ReturnMatrix,
    ) -> Result<CovarianceMatrix, CovarianceError> {
        let cov = self.estimate(returns.values())?;
        CovarianceMatrix::new(returns.assets().to_vec(), cov)
    }
}

impl CovarianceEstimator for EwmaCovarianceEstimator {
    fn estimate(&self, returns: &Array2<f64>) -> Result<Array2<f64>, CovarianceError> {
        let (n_periods, n_assets) = returns.dim();

        if n_periods == 0 {
            return Err(CovarianceError::InvalidParameter(
                "return matrix has no rows".to_string(),
            ));
        }
        if n_periods < self.config.min_observations {
            return Err(CovarianceError::InsufficientData {
                required: self.config.min_observations,
                actual: n_periods,
            });
        }

        tracing::debug!(
            periods = n_periods,
            assets = n_assets,
            decay = self.config.decay,
            "estimating EWMA covariance"
        );

        // Initialize with first observation's outer product
        let mut cov = Array2::<f64>::zeros((n_assets, n_assets));
        accumulate(&mut cov, returns.row(0), 0.0);

        for t in 1..n_periods {
            accumulate(&mut cov, returns.row(t), self.config.decay);
        }

        Ok(cov)
    }

    fn update(
        &self,
        current_cov: &Array2<f64>,
        new_returns: &Array2<f64>,
    ) -> Result<Array2<f64>, CovarianceError> {
        let n_assets = new_returns.ncols();
        let (cov_n, cov_m) = current_cov.dim();

        if cov_n != n_assets {
            return Err(CovarianceError::DimensionMismatch {
                expected: n_assets,
                actual: cov_n,
            });
        }
        if cov_m != n_assets {
            return Err(CovarianceError::DimensionMismatch {
                expected: n_assets,
                actual: cov_m,
            });
        }

        let mut cov = current_cov.clone();
        for row in new_returns.rows() {
            accumulate(&mut cov, row, self.config.decay);
        }

        Ok(cov)
    }
}

/// Estimate the EWMA covariance of a return matrix.
///
/// `decay` has no default: callers must choose how quickly old observations
/// are forgotten.
///
/// # Errors
/// Returns [`CovarianceError::InvalidDecay`] if `decay` is not strictly
/// between 0 and 1, or [`CovarianceError::InvalidParameter`] if the matrix has
/// no rows.
pub fn ewma_covariance(
    returns: &ReturnMatrix,
    decay: f64,
) -> Result<CovarianceMatrix, CovarianceError> {
    EwmaCovarianceEstimator::with_decay(decay)?.estimate_returns(returns)
}

fn validate_decay(decay: f64) -> Result<(), CovarianceError> {
    // NaN fails both comparisons
    if decay > 0.0 && decay < 1.0 {
        Ok(())
    } else {
        Err(CovarianceError::InvalidDecay(decay))
    }
}

/// cov = λ * cov + (1-λ) * r rᵀ, touching only the upper triangle and mirroring it.
fn accumulate(cov: &mut Array2<f64>, r: ArrayView1<'_, f64>, lambda: f64) {
    let n = r.len();
    let one_minus_lambda = 1.0 - lambda;

    for i in 0..n {
        for j in i..n {
            let value = lambda * cov[[i, j]] + one_minus_lambda * r[i] * r[j];
            cov[[i, j]] = value;
            cov[[j, i]] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(1.5)]
    #[case(-0.2)]
    #[case(f64::NAN)]
    fn test_invalid_decay(#[case] decay: f64) {
        let err = EwmaCovarianceEstimator::with_decay(decay).unwrap_err();
        assert!(matches!(err, CovarianceError::InvalidDecay(_)));
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_zero_min_observations() {
        let config = EwmaConfig::new(0.9).with_min_observations(0);
        assert!(EwmaCovarianceEstimator::new(config).is_err());
    }

    #[test]
    fn test_half_life() {
        let estimator = EwmaCovarianceEstimator::with_decay(0.95).unwrap();
        // For λ=0.95, half-life ≈ 13.5 periods
        assert_relative_eq!(estimator.half_life(), 13.51, epsilon = 0.1);
    }

    #[test]
    fn test_empty_returns() {
        let estimator = EwmaCovarianceEstimator::with_decay(0.9).unwrap();
        let returns = Array2::<f64>::zeros((0, 3));
        let err = estimator.estimate(&returns).unwrap_err();
        assert!(matches!(err, CovarianceError::InvalidParameter(_)));
    }

    #[test]
    fn test_insufficient_data() {
        let estimator =
            EwmaCovarianceEstimator::new(EwmaConfig::new(0.9).with_min_observations(60)).unwrap();
        let returns = Array2::<f64>::zeros((10, 3));
        assert!(matches!(
            estimator.estimate(&returns),
            Err(CovarianceError::InsufficientData {
                required: 60,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_single_row_is_outer_product() {
        let estimator = EwmaCovarianceEstimator::with_decay(0.94).unwrap();
        let returns = array![[0.01, -0.02, 0.03]];
        let cov = estimator.estimate(&returns).unwrap();

        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(cov[[i, j]], returns[[0, i]] * returns[[0, j]]);
            }
        }
    }

    #[test]
    fn test_two_rows_by_hand() {
        let estimator = EwmaCovarianceEstimator::with_decay(0.5).unwrap();
        let returns = array![[1.0, 2.0], [3.0, -1.0]];
        let cov = estimator.estimate(&returns).unwrap();

        // 0.5 * [[1,2],[2,4]] + 0.5 * [[9,-3],[-3,1]]
        assert_relative_eq!(cov[[0, 0]], 5.0);
        assert_relative_eq!(cov[[0, 1]], -0.5);
        assert_relative_eq!(cov[[1, 0]], -0.5);
        assert_relative_eq!(cov[[1, 1]], 2.5);
    }

    #[test]
    fn test_order_matters() {
        let estimator = EwmaCovarianceEstimator::with_decay(0.8).unwrap();
        let forward = array![[2.0, 0.0], [0.0, 1.0]];
        let backward = array![[0.0, 1.0], [2.0, 0.0]];
        let a = estimator.estimate(&forward).unwrap();
        let b = estimator.estimate(&backward).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_update_matches_full_estimate() {
        let estimator = EwmaCovarianceEstimator::with_decay(0.8).unwrap();
        let all = array![[0.01, 0.02], [-0.01, 0.015], [0.005, -0.02], [0.0, 0.01]];
        let head = all.slice(ndarray::s![..2, ..]).to_owned();
        let tail = all.slice(ndarray::s![2.., ..]).to_owned();

        let full = estimator.estimate(&all).unwrap();
        let partial = estimator.estimate(&head).unwrap();
        let updated = estimator.update(&partial, &tail).unwrap();

        for (a, b) in full.iter().zip(updated.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_update_dimension_mismatch() {
        let estimator = EwmaCovarianceEstimator::with_decay(0.8).unwrap();
        let cov = Array2::<f64>::eye(3);
        let new_rows = array![[0.1, 0.2]];
        assert!(matches!(
            estimator.update(&cov, &new_rows),
            Err(CovarianceError::DimensionMismatch { .. })
        ));
    }
}
