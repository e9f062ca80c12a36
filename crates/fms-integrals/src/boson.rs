//! Diabatic spin-boson style model with linear state-dependent shifts.

use fms_core::{ErrorInfo, FmsError, Trajectory};
use serde::{Deserialize, Serialize};

use crate::ModelSurface;

/// `V_s(x) = sum_k omega_k x_k^2 / 2 + sigma_s c_k x_k` with `sigma_s = 2s - 1`
/// and a constant diabatic coupling `delta` between the two states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BosonModel {
    /// Mode frequencies.
    pub omega: Vec<f64>,
    /// Linear system-bath couplings.
    pub coupling: Vec<f64>,
    /// Constant inter-state coupling.
    pub delta: f64,
}

impl BosonModel {
    fn sign(state: usize) -> f64 {
        -1.0 + 2.0 * state as f64
    }
}

impl ModelSurface for BosonModel {
    fn validate(&self, nstates: usize, dim: usize) -> Result<(), FmsError> {
        if nstates != 2 {
            return Err(FmsError::Config(
                ErrorInfo::new("boson-nstates", "the boson model has exactly two states")
                    .with_context("nstates", nstates),
            ));
        }
        if self.omega.len() != dim || self.coupling.len() != dim {
            return Err(FmsError::Config(
                ErrorInfo::new("boson-modes", "mode parameters must match the dimension")
                    .with_context("dim", dim)
                    .with_context("omega", self.omega.len())
                    .with_context("coupling", self.coupling.len()),
            ));
        }
        Ok(())
    }

    fn potential(&self, position: &[f64], state: usize) -> f64 {
        let sign = Self::sign(state);
        position
            .iter()
            .zip(self.omega.iter().zip(&self.coupling))
            .map(|(x, (w, c))| 0.5 * w * x * x + sign * c * x)
            .sum()
    }

    fn gradient(&self, position: &[f64], state: usize) -> Vec<f64> {
        let sign = Self::sign(state);
        position
            .iter()
            .zip(self.omega.iter().zip(&self.coupling))
            .map(|(x, (w, c))| w * x + sign * c)
            .collect()
    }

    fn electronic_overlap(&self, a: &Trajectory, b: &Trajectory) -> f64 {
        if a.state == b.state {
            1.0
        } else {
            0.0
        }
    }

    fn coupling(&self, traj: &Trajectory, state: usize) -> f64 {
        if traj.state == state {
            0.0
        } else {
            self.delta.abs()
        }
    }

    fn derivative(&self, position: &[f64], _state_a: usize, _state_b: usize) -> Vec<f64> {
        vec![0.0; position.len()]
    }
}
