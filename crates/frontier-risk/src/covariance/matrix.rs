//! Asset-labelled covariance matrices.

use super::CovarianceError;
use super::utils::{is_positive_semidefinite, is_symmetric};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Deserializer, Serialize};

/// A square covariance matrix with one row and column per asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CovarianceMatrix {
    assets: Vec<String>,
    values: Array2<f64>,
}

impl CovarianceMatrix {
    /// Label a `D x D` matrix with its `D` asset identifiers.
    ///
    /// # Errors
    /// Returns [`CovarianceError::DimensionMismatch`] if the matrix is not
    /// square or its size differs from the number of labels.
    pub fn new(assets: Vec<String>, values: Array2<f64>) -> Result<Self, CovarianceError> {
        let (n, m) = values.dim();
        if n != m {
            return Err(CovarianceError::DimensionMismatch {
                expected: n,
                actual: m,
            });
        }
        if n != assets.len() {
            return Err(CovarianceError::DimensionMismatch {
                expected: assets.len(),
                actual: n,
            });
        }
        Ok(Self { assets, values })
    }

    /// Asset identifiers in row/column order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// The raw matrix.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of assets.
    pub fn dim(&self) -> usize {
        self.assets.len()
    }

    /// Covariance between two assets, if both are present.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        Some(self.values[[i, j]])
    }

    /// Variance of a single asset.
    pub fn variance(&self, asset: &str) -> Option<f64> {
        self.get(asset, asset)
    }

    /// Per-asset volatilities (square roots of the diagonal).
    pub fn volatilities(&self) -> Array1<f64> {
        self.values.diag().mapv(f64::sqrt)
    }

    /// Correlation matrix implied by the covariance.
    ///
    /// An asset with zero variance has no defined correlation; its row and
    /// column are reported as 0 with 1 on the diagonal.
    pub fn correlation(&self) -> Array2<f64> {
        let vols = self.volatilities();
        let n = self.dim();
        Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                1.0
            } else if vols[i] > 0.0 && vols[j] > 0.0 {
                self.values[[i, j]] / (vols[i] * vols[j])
            } else {
                0.0
            }
        })
    }

    /// Whether the matrix is symmetric within `tolerance`.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        is_symmetric(&self.values, tolerance)
    }

    /// Whether the matrix is positive semidefinite within `tolerance`.
    pub fn is_positive_semidefinite(&self, tolerance: f64) -> bool {
        is_positive_semidefinite(&self.values, tolerance)
    }

    /// Consume the matrix, returning the raw values.
    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    fn position(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }
}

#[derive(Deserialize)]
struct CovarianceMatrixFields {
    assets: Vec<String>,
    values: Array2<f64>,
}

impl<'de> Deserialize<'de> for CovarianceMatrix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = CovarianceMatrixFields::deserialize(deserializer)?;
        Self::new(fields.assets, fields.values).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sample() -> CovarianceMatrix {
        CovarianceMatrix::new(
            vec!["A".to_string(), "B".to_string()],
            array![[0.04, 0.006], [0.006, 0.01]],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let cov = sample();
        assert_eq!(cov.get("A", "B"), Some(0.006));
        assert_eq!(cov.variance("B"), Some(0.01));
        assert_eq!(cov.get("A", "Z"), None);
    }

    #[test]
    fn test_volatilities_and_correlation() {
        let cov = sample();
        let vols = cov.volatilities();
        assert_relative_eq!(vols[0], 0.2);
        assert_relative_eq!(vols[1], 0.1);

        let corr = cov.correlation();
        assert_relative_eq!(corr[[0, 1]], 0.3, epsilon = 1e-12);
        assert_relative_eq!(corr[[1, 0]], 0.3, epsilon = 1e-12);
        assert_eq!(corr[[0, 0]], 1.0);
    }

    #[test]
    fn test_zero_variance_correlation() {
        let cov = CovarianceMatrix::new(
            vec!["A".to_string(), "B".to_string()],
            array![[0.04, 0.0], [0.0, 0.0]],
        )
        .unwrap();
        let corr = cov.correlation();
        assert_eq!(corr[[0, 1]], 0.0);
        assert_eq!(corr[[1, 1]], 1.0);
    }

    #[test]
    fn test_shape_checks() {
        assert!(CovarianceMatrix::new(vec!["A".to_string()], Array2::zeros((1, 2))).is_err());
        assert!(CovarianceMatrix::new(vec!["A".to_string()], Array2::zeros((2, 2))).is_err());
    }

    #[test]
    fn test_deserialize_checks_labels() {
        let json = r#"{
            "assets": ["A", "B", "C"],
            "values": {"v": 1, "dim": [2, 2], "data": [0.04, 0.006, 0.006, 0.01]}
        }"#;
        let err = serde_json::from_str::<CovarianceMatrix>(json).unwrap_err();
        assert!(err.to_string().contains("Dimension mismatch"), "{err}");

        let cov = sample();
        let back: CovarianceMatrix =
            serde_json::from_str(&serde_json::to_string(&cov).unwrap()).unwrap();
        assert_eq!(back, cov);
    }

    #[test]
    fn test_psd_check() {
        let cov = sample();
        assert!(cov.is_symmetric(0.0));
        assert!(cov.is_positive_semidefinite(1e-12));
    }
}
