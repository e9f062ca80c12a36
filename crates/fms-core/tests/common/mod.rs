#![allow(dead_code)]

use fms_core::{BasisCollection, Complex64, IntegralProvider, Trajectory};

/// Frozen-Gaussian overlaps with orthogonal electronic states.
pub struct GaussProvider;

pub fn nuclear(a: &Trajectory, b: &Trajectory) -> Complex64 {
    let mut total = Complex64::from_polar(1.0, b.phase - a.phase);
    for q in 0..a.dim() {
        let (a1, a2) = (a.widths[q], b.widths[q]);
        let (x1, x2) = (a.position[q], b.position[q]);
        let (p1, p2) = (a.momentum[q], b.momentum[q]);
        let sum = a1 + a2;
        let dx = x1 - x2;
        let dp = p1 - p2;
        let centre = (a1 * x1 + a2 * x2) / sum;
        let prefactor = (2.0 * (a1 * a2).sqrt() / sum).sqrt();
        let real = -(a1 * a2 * dx * dx + 0.25 * dp * dp) / sum;
        let imag = (p1 * x1 - p2 * x2) - centre * dp;
        total *= prefactor * Complex64::new(real, imag).exp();
    }
    total
}

impl IntegralProvider for GaussProvider {
    fn overlap(&self, a: &Trajectory, b: &Trajectory, nuc_only: bool) -> Complex64 {
        if !nuc_only && a.state != b.state {
            return Complex64::new(0.0, 0.0);
        }
        nuclear(a, b)
    }

    fn traj_overlap(&self, a: &Trajectory, b: &Trajectory, nuc_only: bool) -> Complex64 {
        self.overlap(a, b, nuc_only)
    }

    fn eff_coup(&self, _traj: &Trajectory, _state: usize) -> f64 {
        0.0
    }

    fn derivative(&self, traj: &Trajectory, _a: usize, _b: usize) -> Vec<f64> {
        vec![0.0; traj.dim()]
    }

    fn potential(&self, _traj: &Trajectory, _state: usize) -> f64 {
        0.0
    }
}

pub fn traj(state: usize, x: f64, p: f64, amp: (f64, f64)) -> Trajectory {
    Trajectory::new(0, state, 2, vec![x], vec![1.0])
        .unwrap()
        .with_momentum(vec![p])
        .with_amplitude(Complex64::new(amp.0, amp.1))
}

pub fn collection(trajs: Vec<Trajectory>) -> BasisCollection {
    BasisCollection::from_trajectories(2, trajs, &GaussProvider).unwrap()
}
