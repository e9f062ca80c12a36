//! Configuration-selected integral backend.

use fms_core::{Complex64, FmsError, IntegralProvider, Trajectory};
use serde::{Deserialize, Serialize};

use crate::boson::BosonModel;
use crate::gaussian;
use crate::vibronic::VibronicModel;
use crate::ModelSurface;

/// Named integral backends; the variant is chosen in the run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IntegralBackend {
    /// Diabatic boson model.
    Boson(BosonModel),
    /// Crude-adiabatic two-state vibronic model.
    Vibronic(VibronicModel),
}

impl IntegralBackend {
    /// Stable backend name.
    pub fn name(&self) -> &'static str {
        match self {
            IntegralBackend::Boson(_) => "boson",
            IntegralBackend::Vibronic(_) => "vibronic",
        }
    }

    /// Model surface behind the backend.
    pub fn surface(&self) -> &dyn ModelSurface {
        match self {
            IntegralBackend::Boson(model) => model,
            IntegralBackend::Vibronic(model) => model,
        }
    }

    /// Checks model parameters against the simulation shape.
    pub fn validate(&self, nstates: usize, dim: usize) -> Result<(), FmsError> {
        self.surface().validate(nstates, dim)
    }

    /// Potential gradient on `state` at the trajectory's position.
    pub fn gradient(&self, traj: &Trajectory, state: usize) -> Vec<f64> {
        self.surface().gradient(&traj.position, state)
    }
}

impl IntegralProvider for IntegralBackend {
    fn overlap(&self, a: &Trajectory, b: &Trajectory, nuc_only: bool) -> Complex64 {
        if nuc_only {
            return gaussian::overlap(a, b);
        }
        if a.state != b.state {
            return Complex64::new(0.0, 0.0);
        }
        self.traj_overlap(a, b, false)
    }

    fn traj_overlap(&self, a: &Trajectory, b: &Trajectory, nuc_only: bool) -> Complex64 {
        let nuclear = gaussian::overlap(a, b);
        if nuc_only {
            nuclear
        } else {
            nuclear * self.surface().electronic_overlap(a, b)
        }
    }

    fn eff_coup(&self, traj: &Trajectory, state: usize) -> f64 {
        self.surface().coupling(traj, state)
    }

    fn derivative(&self, traj: &Trajectory, state_a: usize, state_b: usize) -> Vec<f64> {
        self.surface().derivative(&traj.position, state_a, state_b)
    }

    fn potential(&self, traj: &Trajectory, state: usize) -> f64 {
        self.surface().potential(&traj.position, state)
    }
}
