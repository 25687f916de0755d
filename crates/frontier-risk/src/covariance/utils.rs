//! Utilities for covariance matrix inspection
//!
//! Symmetry and positive semidefiniteness checks, plus the symmetric
//! eigen-decomposition they rely on.

use super::CovarianceError;
use ndarray::{Array1, Array2, ArrayView1};

/// Result of eigenvalue decomposition
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues (sorted in descending order)
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors (columns are eigenvectors)
    pub eigenvectors: Array2<f64>,
}

impl EigenDecomposition {
    /// Smallest eigenvalue, or `None` for an empty matrix.
    pub fn min_eigenvalue(&self) -> Option<f64> {
        self.eigenvalues.iter().copied().reduce(f64::min)
    }
}

/// Outer product x xᵀ of a vector with itself.
pub fn outer_product(x: ArrayView1<'_, f64>) -> Array2<f64> {
    let n = x.len();
    Array2::from_shape_fn((n, n), |(i, j)| x[i] * x[j])
}

/// Check that a matrix is square and `|m[i][j] - m[j][i]| <= tolerance` everywhere.
pub fn is_symmetric(matrix: &Array2<f64>, tolerance: f64) -> bool {
    let (n, m) = matrix.dim();
    if n != m {
        return false;
    }

    (0..n).all(|i| ((i + 1)..n).all(|j| (matrix[[i, j]] - matrix[[j, i]]).abs() <= tolerance))
}

/// Check if a symmetric matrix is positive semidefinite
///
/// The smallest eigenvalue may be negative by at most `tolerance` scaled by
/// the largest diagonal entry, to absorb floating-point noise.
pub fn is_positive_semidefinite(matrix: &Array2<f64>, tolerance: f64) -> bool {
    if !is_symmetric(matrix, tolerance) {
        return false;
    }

    // Quick check: diagonal elements must be non-negative
    if matrix.diag().iter().any(|&d| d < -tolerance) {
        return false;
    }

    let scale = matrix.diag().iter().fold(1.0_f64, |acc, &d| acc.max(d.abs()));
    match jacobi_eigendecomp(matrix, 100, 1e-14) {
        Ok(decomp) => decomp
            .min_eigenvalue()
            .is_none_or(|min| min >= -tolerance * scale),
        Err(_) => false,
    }
}

/// Cyclic Jacobi eigenvalue decomposition for symmetric matrices
///
/// Each sweep rotates away every off-diagonal pair once. Iteration stops when
/// the off-diagonal Frobenius norm falls below `tolerance` times the matrix
/// norm or after `max_sweeps` sweeps.
///
/// # Arguments
/// * `matrix` - Symmetric matrix to decompose
/// * `max_sweeps` - Maximum number of full sweeps
/// * `tolerance` - Relative convergence tolerance for off-diagonal mass
///
/// # Returns
/// * Eigenvalues and eigenvectors
pub fn jacobi_eigendecomp(
    matrix: &Array2<f64>,
    max_sweeps: usize,
    tolerance: f64,
) -> Result<EigenDecomposition, CovarianceError> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(CovarianceError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        });
    }

    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);
    let norm = a.iter().map(|x| x * x).sum::<f64>().sqrt();

    for _sweep in 0..max_sweeps {
        if off_diagonal_norm(&a) <= tolerance * norm {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[[p, q]] == 0.0 {
                    continue;
                }
                let (cos_theta, sin_theta) = compute_rotation(a[[p, p]], a[[q, q]], a[[p, q]]);
                apply_jacobi_rotation(&mut a, &mut v, p, q, cos_theta, sin_theta);
            }
        }
    }

    let eigenvalues = a.diag().to_owned();

    // Sort eigenvalues and eigenvectors in descending order
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&i, &j| eigenvalues[j].total_cmp(&eigenvalues[i]));

    let sorted_eigenvalues = indices.iter().map(|&i| eigenvalues[i]).collect();
    let mut sorted_eigenvectors = Array2::<f64>::zeros((n, n));
    for (new_idx, &old_idx) in indices.iter().enumerate() {
        sorted_eigenvectors
            .column_mut(new_idx)
            .assign(&v.column(old_idx));
    }

    Ok(EigenDecomposition {
        eigenvalues: sorted_eigenvalues,
        eigenvectors: sorted_eigenvectors,
    })
}

fn off_diagonal_norm(matrix: &Array2<f64>) -> f64 {
    matrix
        .indexed_iter()
        .filter(|((i, j), _)| i != j)
        .map(|(_, x)| x * x)
        .sum::<f64>()
        .sqrt()
}

/// Compute the rotation (cos, sin) that zeroes a[p][q]
fn compute_rotation(app: f64, aqq: f64, apq: f64) -> (f64, f64) {
    let tau = (aqq - app) / (2.0 * apq);
    let t = if tau >= 0.0 {
        1.0 / (tau + (1.0 + tau * tau).sqrt())
    } else {
        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
    };

    let cos_theta = 1.0 / (1.0 + t * t).sqrt();
    (cos_theta, t * cos_theta)
}

/// Apply a Jacobi rotation to matrix A and eigenvector matrix V
fn apply_jacobi_rotation(
    a: &mut Array2<f64>,
    v: &mut Array2<f64>,
    p: usize,
    q: usize,
    cos_theta: f64,
    sin_theta: f64,
) {
    let n = a.nrows();
    let (c, s) = (cos_theta, sin_theta);

    let app = a[[p, p]];
    let aqq = a[[q, q]];
    let apq = a[[p, q]];

    a[[p, p]] = c * c * app - 2.0 * c * s * apq + s * s * aqq;
    a[[q, q]] = s * s * app + 2.0 * c * s * apq + c * c * aqq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    for i in 0..n {
        if i != p && i != q {
            let aip = a[[i, p]];
            let aiq = a[[i, q]];

            a[[i, p]] = c * aip - s * aiq;
            a[[p, i]] = a[[i, p]];

            a[[i, q]] = s * aip + c * aiq;
            a[[q, i]] = a[[i, q]];
        }
    }

    for i in 0..n {
        let vip = v[[i, p]];
        let viq = v[[i, q]];

        v[[i, p]] = c * vip - s * viq;
        v[[i, q]] = s * vip + c * viq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_outer_product() {
        let x = array![1.0, -2.0, 3.0];
        let m = outer_product(x.view());
        assert_eq!(m, array![[1.0, -2.0, 3.0], [-2.0, 4.0, -6.0], [3.0, -6.0, 9.0]]);
    }

    #[test]
    fn test_is_symmetric() {
        assert!(is_symmetric(&array![[1.0, 2.0], [2.0, 1.0]], 0.0));
        assert!(!is_symmetric(&array![[1.0, 2.0], [2.1, 1.0]], 1e-6));
        assert!(!is_symmetric(&Array2::<f64>::zeros((2, 3)), 1.0));
    }

    #[test]
    fn test_jacobi_eigendecomp_diagonal() {
        let matrix = array![[1.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 2.0]];
        let decomp = jacobi_eigendecomp(&matrix, 100, 1e-14).unwrap();

        // Eigenvalues should be 4, 2, 1 (in descending order)
        assert_abs_diff_eq!(decomp.eigenvalues[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(decomp.eigenvalues[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(decomp.eigenvalues[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_jacobi_eigendecomp_reconstructs() {
        let matrix = array![[2.0, 1.0, 1.0], [1.0, 2.0, 1.0], [1.0, 1.0, 2.0]];
        let decomp = jacobi_eigendecomp(&matrix, 100, 1e-14).unwrap();

        // Eigenvalues of this matrix are 4, 1, 1
        assert_abs_diff_eq!(decomp.eigenvalues[0], 4.0, epsilon = 1e-10);
        assert_abs_diff_eq!(decomp.eigenvalues[2], 1.0, epsilon = 1e-10);

        let v = &decomp.eigenvectors;
        let lambda = Array2::from_diag(&decomp.eigenvalues);
        let reconstructed = v.dot(&lambda).dot(&v.t());
        for (a, b) in matrix.iter().zip(reconstructed.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_rank_one_is_positive_semidefinite() {
        let x = array![0.01, -0.02, 0.005];
        assert!(is_positive_semidefinite(&outer_product(x.view()), 1e-10));
    }

    #[test]
    fn test_indefinite_matrix_detected() {
        // [[1, 2], [2, 1]] has eigenvalues 3 and -1
        let matrix = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(!is_positive_semidefinite(&matrix, 1e-10));
    }

    #[test]
    fn test_non_square_rejected() {
        let matrix = Array2::<f64>::zeros((2, 3));
        assert!(jacobi_eigendecomp(&matrix, 10, 1e-12).is_err());
    }
}
