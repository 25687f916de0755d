//! Asset covariance estimation
//!
//! Provides the exponentially weighted estimator used to build the covariance
//! matrix handed to a mean-variance optimizer, along with the matrix checks
//! needed to confirm the estimate is usable.

pub mod ewma;
pub mod matrix;
pub mod utils;

pub use ewma::{EwmaConfig, EwmaCovarianceEstimator, ewma_covariance};
pub use matrix::CovarianceMatrix;
pub use utils::{
    EigenDecomposition, is_positive_semidefinite, is_symmetric, jacobi_eigendecomp, outer_product,
};

use ndarray::Array2;
use thiserror::Error;

/// Errors that can occur during covariance estimation
#[derive(Debug, Error)]
pub enum CovarianceError {
    /// Insufficient data for estimation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Invalid decay parameter
    #[error("Invalid decay parameter: {0} (must be strictly between 0 and 1)")]
    InvalidDecay(f64),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl CovarianceError {
    /// Whether the error stems from an out-of-domain argument rather than the data.
    pub const fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidDecay(_) | Self::InvalidParameter(_))
    }
}

/// Trait for covariance matrix estimators
pub trait CovarianceEstimator {
    /// Estimate the covariance matrix from asset returns
    ///
    /// # Arguments
    /// * `returns` - Matrix where each row is a time period and each column is an asset
    ///
    /// # Returns
    /// * Estimated covariance matrix (D x D where D is number of assets)
    fn estimate(&self, returns: &Array2<f64>) -> Result<Array2<f64>, CovarianceError>;

    /// Extend `current_cov` with `new_returns`, processed in row order
    fn update(
        &self,
        current_cov: &Array2<f64>,
        new_returns: &Array2<f64>,
    ) -> Result<Array2<f64>, CovarianceError>;
}
