//! Energy-conserving momentum adjustment of a freshly spawned child.

use fms_core::{IntegralProvider, Trajectory};

const TINY: f64 = 1e-14;

/// Rescales the component of `child`'s momentum parallel to `direction`
/// so that its classical energy on `child.state` equals the parent's energy
/// on `parent.state`.
///
/// The kinetic energy of `p_perp + s * p_par` is quadratic in `s`; of the
/// real roots the one closest to 1 is applied. A zero `direction` falls
/// back to the momentum direction. Returns the applied scale factor, or
/// `None` when the child cannot reach the target energy.
pub fn adjust_child(
    parent: &Trajectory,
    child: &mut Trajectory,
    direction: &[f64],
    provider: &dyn IntegralProvider,
) -> Option<f64> {
    let target = parent.kinetic_energy() + provider.potential(parent, parent.state)
        - provider.potential(child, child.state);
    if !target.is_finite() || target < 0.0 {
        return None;
    }

    let unit = unit_vector(direction).or_else(|| unit_vector(&child.momentum))?;
    let projection: f64 = child.momentum.iter().zip(&unit).map(|(p, d)| p * d).sum();
    let parallel: Vec<f64> = unit.iter().map(|d| projection * d).collect();
    let perpendicular: Vec<f64> = child
        .momentum
        .iter()
        .zip(&parallel)
        .map(|(p, par)| p - par)
        .collect();

    let mut a = 0.0;
    let mut b = 0.0;
    let mut c = -target;
    for q in 0..child.dim() {
        let m = child.masses[q];
        a += 0.5 * parallel[q] * parallel[q] / m;
        b += perpendicular[q] * parallel[q] / m;
        c += 0.5 * perpendicular[q] * perpendicular[q] / m;
    }
    if a < TINY {
        return None;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let candidates = [(-b + root) / (2.0 * a), (-b - root) / (2.0 * a)];
    let scale = if (candidates[0] - 1.0).abs() <= (candidates[1] - 1.0).abs() {
        candidates[0]
    } else {
        candidates[1]
    };

    for q in 0..child.dim() {
        child.momentum[q] = perpendicular[q] + scale * parallel[q];
    }
    Some(scale)
}

fn unit_vector(v: &[f64]) -> Option<Vec<f64>> {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm < TINY || !norm.is_finite() {
        return None;
    }
    Some(v.iter().map(|x| x / norm).collect())
}
