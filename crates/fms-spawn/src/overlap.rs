use fms_core::{BasisCollection, IntegralProvider, Trajectory};

/// Largest nuclear-only overlap magnitude between `traj` and any alive
/// trajectory of `collection` sitting on `state`. Zero when none does.
pub fn max_nuc_overlap(
    collection: &BasisCollection,
    traj: &Trajectory,
    state: usize,
    provider: &dyn IntegralProvider,
) -> f64 {
    collection
        .alive_trajectories()
        .filter(|other| other.state == state)
        .map(|other| provider.traj_overlap(traj, other, true).norm())
        .fold(0.0, f64::max)
}
