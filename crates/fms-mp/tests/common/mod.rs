#![allow(dead_code)]

use fms_core::{BasisCollection, Complex64, Trajectory};
use fms_integrals::{BosonModel, IntegralBackend};

pub fn backend() -> IntegralBackend {
    IntegralBackend::Boson(BosonModel {
        omega: vec![1.0],
        coupling: vec![0.5],
        delta: 0.05,
    })
}

pub fn traj(state: usize, x: f64, p: f64, amp: (f64, f64)) -> Trajectory {
    Trajectory::new(0, state, 2, vec![x], vec![1.0])
        .unwrap()
        .with_momentum(vec![p])
        .with_amplitude(Complex64::new(amp.0, amp.1))
}

/// Normalised collection built with [`backend`].
pub fn normalised(trajs: Vec<Trajectory>) -> BasisCollection {
    let mut basis = BasisCollection::from_trajectories(2, trajs, &backend()).unwrap();
    basis.renormalize().unwrap();
    basis
}

pub fn amplitudes(basis: &BasisCollection) -> Vec<Complex64> {
    basis.alive_trajectories().map(|t| t.amplitude).collect()
}
