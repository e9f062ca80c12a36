#![deny(missing_docs)]
//! Integral evaluation and model dynamics for FMS trajectory bases.
//!
//! The basis algorithms only see [`fms_core::IntegralProvider`] and
//! [`fms_core::Propagator`]; this crate provides the concrete backends:
//! frozen-Gaussian nuclear overlaps combined with a model electronic
//! structure chosen through [`IntegralBackend`].

/// Diabatic boson model.
pub mod boson;
/// Configuration-selected backend enum.
pub mod backend;
/// Frozen-Gaussian nuclear overlaps.
pub mod gaussian;
/// Crude-adiabatic vibronic model.
pub mod vibronic;
/// Velocity-Verlet model propagator.
pub mod verlet;

use fms_core::{FmsError, Trajectory};

pub use backend::IntegralBackend;
pub use boson::BosonModel;
pub use verlet::VelocityVerlet;
pub use vibronic::VibronicModel;

/// Electronic-structure side of a model: surfaces, couplings and electronic
/// overlaps evaluated pointwise.
pub trait ModelSurface {
    /// Checks parameter shapes against the simulation.
    fn validate(&self, nstates: usize, dim: usize) -> Result<(), FmsError>;
    /// Potential energy of `state` at `position`.
    fn potential(&self, position: &[f64], state: usize) -> f64;
    /// Potential gradient of `state` at `position`.
    fn gradient(&self, position: &[f64], state: usize) -> Vec<f64>;
    /// Overlap of the electronic wavefunctions of two trajectories.
    fn electronic_overlap(&self, a: &Trajectory, b: &Trajectory) -> f64;
    /// Effective coupling magnitude of `traj` to `state`.
    fn coupling(&self, traj: &Trajectory, state: usize) -> f64;
    /// Derivative coupling vector `<state_a| d/dq |state_b>`.
    fn derivative(&self, position: &[f64], state_a: usize, state_b: usize) -> Vec<f64>;
}
