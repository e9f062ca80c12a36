//! A single frozen-Gaussian basis function.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, FmsError};
use crate::Complex64;

/// One trajectory basis function: phase-space centre, electronic label,
/// amplitude and spawn bookkeeping.
///
/// Liveness is not stored here; it belongs to the owning
/// [`BasisCollection`](crate::BasisCollection) slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Identity label, unique within a collection.
    pub label: usize,
    /// Electronic state index in `0..nstates`.
    pub state: usize,
    /// Number of electronic states in the model.
    pub nstates: usize,
    /// Complex expansion coefficient.
    pub amplitude: Complex64,
    /// Gaussian centre in position space.
    pub position: Vec<f64>,
    /// Gaussian centre in momentum space.
    pub momentum: Vec<f64>,
    /// Frozen Gaussian widths, one per dimension.
    pub widths: Vec<f64>,
    /// Nuclear masses, one per dimension.
    pub masses: Vec<f64>,
    /// Classical action phase.
    pub phase: f64,
    /// Time of the last spawn attempt towards each state.
    pub last_spawn: Vec<Option<f64>>,
    /// Time at which the last forward spawn search towards each state ended.
    pub exit_time: Vec<Option<f64>>,
    /// Label of the trajectory this one was spawned from.
    #[serde(default)]
    pub parent: Option<usize>,
}

impl Trajectory {
    /// Creates a trajectory with zero momentum, unit masses and zero phase.
    pub fn new(
        label: usize,
        state: usize,
        nstates: usize,
        position: Vec<f64>,
        widths: Vec<f64>,
    ) -> Result<Self, FmsError> {
        let dim = position.len();
        let traj = Self {
            label,
            state,
            nstates,
            amplitude: Complex64::new(0.0, 0.0),
            momentum: vec![0.0; dim],
            masses: vec![1.0; dim],
            position,
            widths,
            phase: 0.0,
            last_spawn: vec![None; nstates],
            exit_time: vec![None; nstates],
            parent: None,
        };
        traj.validate()?;
        Ok(traj)
    }

    /// Sets the momentum, consuming and returning the trajectory.
    pub fn with_momentum(mut self, momentum: Vec<f64>) -> Self {
        self.momentum = momentum;
        self
    }

    /// Sets the masses, consuming and returning the trajectory.
    pub fn with_masses(mut self, masses: Vec<f64>) -> Self {
        self.masses = masses;
        self
    }

    /// Sets the amplitude, consuming and returning the trajectory.
    pub fn with_amplitude(mut self, amplitude: Complex64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Number of nuclear degrees of freedom.
    pub fn dim(&self) -> usize {
        self.position.len()
    }

    /// Velocity `p / m` per dimension.
    pub fn velocity(&self) -> Vec<f64> {
        self.momentum
            .iter()
            .zip(&self.masses)
            .map(|(p, m)| p / m)
            .collect()
    }

    /// Classical kinetic energy `sum p^2 / 2m`.
    pub fn kinetic_energy(&self) -> f64 {
        self.momentum
            .iter()
            .zip(&self.masses)
            .map(|(p, m)| 0.5 * p * p / m)
            .sum()
    }

    /// Checks that all per-dimension and per-state arrays agree in length.
    pub fn validate(&self) -> Result<(), FmsError> {
        let dim = self.position.len();
        let shape_error = |field: &str, len: usize| {
            FmsError::Config(
                ErrorInfo::new("trajectory-shape", "trajectory arrays disagree in length")
                    .with_context("label", self.label)
                    .with_context("field", field)
                    .with_context("expected", dim)
                    .with_context("found", len),
            )
        };
        if self.momentum.len() != dim {
            return Err(shape_error("momentum", self.momentum.len()));
        }
        if self.widths.len() != dim {
            return Err(shape_error("widths", self.widths.len()));
        }
        if self.masses.len() != dim {
            return Err(shape_error("masses", self.masses.len()));
        }
        if self.widths.iter().any(|w| !(*w > 0.0)) || self.masses.iter().any(|m| !(*m > 0.0)) {
            return Err(FmsError::Config(
                ErrorInfo::new("trajectory-positive", "widths and masses must be positive")
                    .with_context("label", self.label),
            ));
        }
        if self.state >= self.nstates
            || self.last_spawn.len() != self.nstates
            || self.exit_time.len() != self.nstates
        {
            return Err(FmsError::Config(
                ErrorInfo::new("trajectory-state", "electronic state bookkeeping is inconsistent")
                    .with_context("label", self.label)
                    .with_context("state", self.state)
                    .with_context("nstates", self.nstates),
            ));
        }
        Ok(())
    }
}
