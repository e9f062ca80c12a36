//! SVD-based pseudo-inverse for Hermitian overlap matrices.

use nalgebra::{DMatrix, DVector};

use crate::Complex64;

/// Default relative cut-off below which singular values are discarded.
pub const DEFAULT_RCOND: f64 = 1e-12;

const MAX_SVD_ITERATIONS: usize = 10_000;

/// Result of a pseudo-inversion.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoInverse {
    /// Least-squares inverse `V diag(1/s) U^H` over retained singular values.
    pub inverse: DMatrix<Complex64>,
    /// Ratio of largest to smallest singular value (`inf` when singular).
    pub condition: f64,
    /// Number of singular values retained.
    pub rank: usize,
}

/// Computes the Moore-Penrose pseudo-inverse and condition number of `matrix`.
///
/// Never fails: a singular or non-converging decomposition yields the best
/// available inverse (possibly the zero matrix) and an infinite condition
/// number.
pub fn pseudo_inverse(matrix: &DMatrix<Complex64>, rcond: f64) -> PseudoInverse {
    let (rows, cols) = matrix.shape();
    if rows == 0 || cols == 0 {
        return PseudoInverse {
            inverse: DMatrix::zeros(cols, rows),
            condition: 1.0,
            rank: 0,
        };
    }

    let Some(svd) = matrix.clone().try_svd(true, true, f64::EPSILON, MAX_SVD_ITERATIONS) else {
        log::warn!("svd failed to converge on {rows}x{cols} overlap block");
        return PseudoInverse {
            inverse: DMatrix::zeros(cols, rows),
            condition: f64::INFINITY,
            rank: 0,
        };
    };
    let (Some(u), Some(v_t)) = (svd.u.as_ref(), svd.v_t.as_ref()) else {
        return PseudoInverse {
            inverse: DMatrix::zeros(cols, rows),
            condition: f64::INFINITY,
            rank: 0,
        };
    };

    let singular = &svd.singular_values;
    let s_max = singular.iter().copied().fold(0.0_f64, f64::max);
    let s_min = singular.iter().copied().fold(f64::INFINITY, f64::min);
    let condition = if s_min > 0.0 && s_max.is_finite() {
        s_max / s_min
    } else {
        f64::INFINITY
    };

    let cutoff = rcond * s_max;
    let mut rank = 0;
    let reciprocal = DVector::from_iterator(
        singular.len(),
        singular.iter().map(|&s| {
            if s > cutoff && s > 0.0 {
                rank += 1;
                Complex64::new(1.0 / s, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            }
        }),
    );

    let v = v_t.adjoint();
    let u_h = u.adjoint();
    let inverse = v * DMatrix::from_diagonal(&reciprocal) * u_h;
    PseudoInverse {
        inverse,
        condition,
        rank,
    }
}

/// Condition number of `matrix` (largest over smallest singular value).
pub fn condition_number(matrix: &DMatrix<Complex64>) -> f64 {
    pseudo_inverse(matrix, DEFAULT_RCOND).condition
}
