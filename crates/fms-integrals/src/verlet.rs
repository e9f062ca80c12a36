//! Velocity-Verlet stepper on a model surface.

use fms_core::{ErrorInfo, FmsError, Propagator, Trajectory};

use crate::backend::IntegralBackend;

/// Classical velocity-Verlet step on the trajectory's own adiabatic (or
/// diabatic) surface. The phase advances by the Lagrangian `(T - V) dt`.
/// The scheme is symmetric, so a negative `dt` retraces a forward step.
#[derive(Debug, Clone)]
pub struct VelocityVerlet {
    backend: IntegralBackend,
}

impl VelocityVerlet {
    /// Creates a stepper over `backend`.
    pub fn new(backend: IntegralBackend) -> Self {
        Self { backend }
    }

    /// Backend used for forces.
    pub fn backend(&self) -> &IntegralBackend {
        &self.backend
    }
}

impl Propagator for VelocityVerlet {
    fn step(&self, traj: &mut Trajectory, time: f64, dt: f64) -> Result<(), FmsError> {
        let surface = self.backend.surface();
        let state = traj.state;
        let v_start = surface.potential(&traj.position, state);
        let g_start = surface.gradient(&traj.position, state);

        for q in 0..traj.dim() {
            traj.momentum[q] -= 0.5 * dt * g_start[q];
        }
        let kinetic_half = traj.kinetic_energy();
        for q in 0..traj.dim() {
            traj.position[q] += dt * traj.momentum[q] / traj.masses[q];
        }

        let v_end = surface.potential(&traj.position, state);
        let g_end = surface.gradient(&traj.position, state);
        for q in 0..traj.dim() {
            traj.momentum[q] -= 0.5 * dt * g_end[q];
        }
        traj.phase += dt * (kinetic_half - 0.5 * (v_start + v_end));

        let finite = traj
            .position
            .iter()
            .chain(&traj.momentum)
            .all(|v| v.is_finite())
            && traj.phase.is_finite();
        if !finite {
            return Err(FmsError::Propagation(
                ErrorInfo::new("non-finite-step", "trajectory left the finite domain")
                    .with_context("label", traj.label)
                    .with_context("time", time)
                    .with_context("dt", dt),
            ));
        }
        Ok(())
    }
}
