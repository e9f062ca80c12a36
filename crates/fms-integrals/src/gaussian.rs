//! Overlap of two multidimensional frozen Gaussians.

use fms_core::{Complex64, Trajectory};

/// Nuclear overlap `<g_a|g_b>` of two normalised frozen Gaussians,
/// including the relative phase `exp(i(gamma_b - gamma_a))`.
///
/// Per dimension, with `A = a1 + a2` and `xc = (a1 x1 + a2 x2) / A`:
/// `sqrt(2 sqrt(a1 a2) / A) * exp(-(a1 a2 dx^2 + dp^2 / 4) / A + i((p1 x1 - p2 x2) - xc dp))`.
pub fn overlap(a: &Trajectory, b: &Trajectory) -> Complex64 {
    let mut total = Complex64::from_polar(1.0, b.phase - a.phase);
    for q in 0..a.dim().min(b.dim()) {
        total *= overlap_1d(
            (a.widths[q], a.position[q], a.momentum[q]),
            (b.widths[q], b.position[q], b.momentum[q]),
        );
    }
    total
}

/// One-dimensional factor of [`overlap`] for `(width, position, momentum)` pairs.
pub fn overlap_1d(bra: (f64, f64, f64), ket: (f64, f64, f64)) -> Complex64 {
    let (a1, x1, p1) = bra;
    let (a2, x2, p2) = ket;
    let sum = a1 + a2;
    let dx = x1 - x2;
    let dp = p1 - p2;
    let centre = (a1 * x1 + a2 * x2) / sum;
    let prefactor = (2.0 * (a1 * a2).sqrt() / sum).sqrt();
    let real = -(a1 * a2 * dx * dx + 0.25 * dp * dp) / sum;
    let imag = (p1 * x1 - p2 * x2) - centre * dp;
    prefactor * Complex64::new(real, imag).exp()
}
