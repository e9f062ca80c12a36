//! Narrow interfaces to the integral evaluator and time stepper.

use crate::collection::BasisCollection;
use crate::errors::FmsError;
use crate::trajectory::Trajectory;
use crate::Complex64;

/// Supplies pairwise overlaps, couplings and surface data for trajectories.
///
/// Implementations are opaque to the basis algorithms; they only rely on
/// `traj_overlap(a, a, false) == 1` and `traj_overlap(a, b, _) ==
/// conj(traj_overlap(b, a, _))`.
pub trait IntegralProvider {
    /// Basis-function overlap. With `nuc_only == false` the result is zero
    /// whenever `a` and `b` sit on different electronic states.
    fn overlap(&self, a: &Trajectory, b: &Trajectory, nuc_only: bool) -> Complex64;

    /// Trajectory overlap: the nuclear overlap, multiplied by the electronic
    /// overlap unless `nuc_only` is set.
    fn traj_overlap(&self, a: &Trajectory, b: &Trajectory, nuc_only: bool) -> Complex64;

    /// Magnitude of the effective coupling of `traj` to electronic `state`.
    fn eff_coup(&self, traj: &Trajectory, state: usize) -> f64;

    /// Derivative-coupling vector between `state_a` and `state_b` at the
    /// position of `traj`.
    fn derivative(&self, traj: &Trajectory, state_a: usize, state_b: usize) -> Vec<f64>;

    /// Potential energy of `traj`'s position on electronic `state`.
    fn potential(&self, traj: &Trajectory, state: usize) -> f64;

    /// Amplitude-weighted overlap `sum_j <traj|t_j> c_j` over the alive
    /// trajectories of `collection`.
    fn overlap_bundle(&self, traj: &Trajectory, collection: &BasisCollection) -> Complex64 {
        collection
            .alive_trajectories()
            .map(|other| self.traj_overlap(traj, other, false) * other.amplitude)
            .sum()
    }

    /// Wavefunction overlap `<bra|ket>` of two collections.
    fn collection_overlap(&self, bra: &BasisCollection, ket: &BasisCollection) -> Complex64 {
        bra.alive_trajectories()
            .map(|traj| traj.amplitude.conj() * self.overlap_bundle(traj, ket))
            .sum()
    }
}

/// Advances one trajectory's phase-space variables by a single increment.
pub trait Propagator {
    /// Steps `traj` from `time` to `time + dt` in place. Negative `dt`
    /// propagates backwards.
    fn step(&self, traj: &mut Trajectory, time: f64, dt: f64) -> Result<(), FmsError>;
}
