#![allow(dead_code)]

use fms_core::{
    BasisCollection, Complex64, FmsError, IntegralProvider, Propagator, Trajectory,
};
use fms_integrals::gaussian;

/// Coupling tabulated along the first coordinate: sample `k` applies at
/// `x = k * spacing`; positions past the table reuse its last entry.
pub struct ScriptedProvider {
    pub couplings: Vec<f64>,
    pub spacing: f64,
    pub offsets: Vec<f64>,
}

impl ScriptedProvider {
    pub fn new(couplings: Vec<f64>) -> Self {
        Self {
            couplings,
            spacing: 1.0,
            offsets: vec![0.0, 0.0],
        }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl IntegralProvider for ScriptedProvider {
    fn overlap(&self, a: &Trajectory, b: &Trajectory, nuc_only: bool) -> Complex64 {
        if !nuc_only && a.state != b.state {
            return Complex64::new(0.0, 0.0);
        }
        gaussian::overlap(a, b)
    }

    fn traj_overlap(&self, a: &Trajectory, b: &Trajectory, nuc_only: bool) -> Complex64 {
        self.overlap(a, b, nuc_only)
    }

    fn eff_coup(&self, traj: &Trajectory, _state: usize) -> f64 {
        let k = (traj.position[0] / self.spacing).round().max(0.0) as usize;
        let last = self.couplings.len() - 1;
        self.couplings[k.min(last)]
    }

    fn derivative(&self, traj: &Trajectory, _a: usize, _b: usize) -> Vec<f64> {
        vec![0.0; traj.dim()]
    }

    fn potential(&self, _traj: &Trajectory, state: usize) -> f64 {
        self.offsets[state]
    }
}

/// Moves every coordinate by `dt` per step, leaving momenta untouched.
pub struct Drift;

impl Propagator for Drift {
    fn step(&self, traj: &mut Trajectory, _time: f64, dt: f64) -> Result<(), FmsError> {
        for x in &mut traj.position {
            *x += dt;
        }
        Ok(())
    }
}

pub fn traj(state: usize, x: f64, amp: f64) -> Trajectory {
    Trajectory::new(0, state, 2, vec![x], vec![1.0])
        .unwrap()
        .with_momentum(vec![1.0])
        .with_amplitude(Complex64::new(amp, 0.0))
}

pub fn collection(provider: &ScriptedProvider, trajs: Vec<Trajectory>) -> BasisCollection {
    BasisCollection::from_trajectories(2, trajs, provider).unwrap()
}
