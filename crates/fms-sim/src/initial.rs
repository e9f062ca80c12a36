use std::fs;
use std::path::Path;

use fms_core::{
    BasisCollection, Complex64, ErrorInfo, FmsError, IntegralProvider, RngHandle, Trajectory,
};

use crate::config::{InitialConditions, SimConfig};

/// Builds the starting basis described by `config.initial` with normalised
/// amplitudes and current matrices.
pub fn initial_basis(
    config: &SimConfig,
    provider: &dyn IntegralProvider,
) -> Result<BasisCollection, FmsError> {
    let mut basis = match &config.initial {
        InitialConditions::Sampled {
            ntraj,
            state,
            position,
            momentum,
            widths,
            masses,
            position_sigma,
            momentum_sigma,
        } => {
            let amplitude = Complex64::new(1.0 / (*ntraj as f64).sqrt(), 0.0);
            let mut trajs = Vec::with_capacity(*ntraj);
            for i in 0..*ntraj {
                let mut rng = RngHandle::substream(config.seed_policy.master_seed, i as u64);
                let x = rng.jitter(position, *position_sigma)?;
                let p = rng.jitter(momentum, *momentum_sigma)?;
                let mut traj = Trajectory::new(i, *state, config.nstates, x, widths.clone())?
                    .with_momentum(p)
                    .with_amplitude(amplitude);
                if let Some(masses) = masses {
                    traj = traj.with_masses(masses.clone());
                }
                trajs.push(traj);
            }
            BasisCollection::from_trajectories(config.nstates, trajs, provider)?
        }
        InitialConditions::Snapshot { path } => {
            let contents = fs::read_to_string(path).map_err(|err| {
                FmsError::Serde(
                    ErrorInfo::new("snapshot-read", err.to_string())
                        .with_context("path", path.display()),
                )
            })?;
            let mut basis: BasisCollection = serde_json::from_str(&contents).map_err(|err| {
                FmsError::Serde(
                    ErrorInfo::new("snapshot-parse", err.to_string())
                        .with_context("path", path.display()),
                )
            })?;
            if basis.nstates() != config.nstates {
                return Err(FmsError::Config(
                    ErrorInfo::new("nstates-mismatch", "snapshot disagrees on state count")
                        .with_context("snapshot", basis.nstates())
                        .with_context("config", config.nstates),
                ));
            }
            basis.validate().map_err(|err| snapshot_error(err, path))?;
            for slot in basis.slots() {
                config
                    .backend
                    .validate(config.nstates, slot.trajectory.dim())
                    .map_err(|err| snapshot_error(err, path))?;
            }
            basis.rebuild_matrices(provider);
            basis
        }
    };
    basis.renormalize()?;
    log::info!(
        "initial basis: {} trajectories, overlap condition {:.3e}",
        basis.nalive(),
        basis.condition_number()
    );
    Ok(basis)
}

fn snapshot_error(err: FmsError, path: &Path) -> FmsError {
    log::error!("rejecting basis snapshot {}: {err}", path.display());
    err
}
