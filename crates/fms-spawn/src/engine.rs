use std::collections::{BTreeMap, BTreeSet};

use fms_core::{
    BasisCollection, CouplingWindow, ErrorInfo, EventKind, EventSink, FmsError, IntegralProvider,
    LogEvent, Propagator,
};

use crate::config::SpawnConfig;
use crate::forward::SpawnSearch;
use crate::overlap::max_nuc_overlap;
use crate::record::SpawnRecord;

/// Grows a basis by spawning children on coupled electronic states.
///
/// The engine owns the per-(trajectory, state) coupling history, keyed by
/// trajectory label so that reused slots start with a fresh window, and the
/// records of every inserted child.
#[derive(Debug, Clone, Default)]
pub struct SpawnEngine {
    config: SpawnConfig,
    history: BTreeMap<usize, Vec<CouplingWindow>>,
    records: Vec<SpawnRecord>,
}

impl SpawnEngine {
    /// Creates an engine with empty history.
    pub fn new(config: SpawnConfig) -> Self {
        Self {
            config,
            history: BTreeMap::new(),
            records: Vec::new(),
        }
    }

    /// Active thresholds.
    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// Children inserted so far, in insertion order.
    pub fn records(&self) -> &[SpawnRecord] {
        &self.records
    }

    /// Drains the spawn records.
    pub fn take_records(&mut self) -> Vec<SpawnRecord> {
        std::mem::take(&mut self.records)
    }

    /// Coupling window of trajectory `label` towards `state`.
    pub fn coupling_history(&self, label: usize, state: usize) -> Option<&CouplingWindow> {
        self.history.get(&label).and_then(|windows| windows.get(state))
    }

    /// True iff any alive trajectory couples to another state more strongly
    /// than the coupling threshold.
    pub fn in_coupled_regime(
        &self,
        collection: &BasisCollection,
        provider: &dyn IntegralProvider,
    ) -> bool {
        collection.alive_trajectories().any(|traj| {
            (0..collection.nstates())
                .filter(|&state| state != traj.state)
                .any(|state| provider.eff_coup(traj, state).abs() > self.config.coupling_threshold)
        })
    }

    /// Runs one spawning pass over the alive trajectories of `collection`
    /// at its current time. Returns whether at least one child was added.
    ///
    /// Coupling windows of trajectories that are no longer alive are dropped
    /// first.
    ///
    /// Children are inserted with [`BasisCollection::add`]; the caller is
    /// responsible for rebuilding the collection matrices afterwards.
    pub fn spawn(
        &mut self,
        collection: &mut BasisCollection,
        provider: &dyn IntegralProvider,
        propagator: &dyn Propagator,
        sink: &dyn EventSink,
        dt: f64,
    ) -> Result<bool, FmsError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(FmsError::Config(
                ErrorInfo::new("spawn-dt", "spawning needs a positive finite time step")
                    .with_context("dt", dt),
            ));
        }
        let live: BTreeSet<usize> = collection.alive_trajectories().map(|t| t.label).collect();
        self.history.retain(|label, _| live.contains(label));

        let current_time = collection.time();
        let nstates = collection.nstates();
        let parents = collection.alive_indices().to_vec();
        let mut grown = false;

        for idx in parents {
            for state in 0..nstates {
                let (label, own_state, coupling) = {
                    let traj = collection.trajectory(idx)?;
                    if traj.state == state {
                        continue;
                    }
                    (traj.label, traj.state, provider.eff_coup(traj, state).abs())
                };
                let windows = self
                    .history
                    .entry(label)
                    .or_insert_with(|| vec![CouplingWindow::new(); nstates]);
                windows[state].push(coupling);
                let window = windows[state];

                if !self.should_spawn(collection, idx, state, &window, provider)? {
                    continue;
                }

                let parent = collection.trajectory(idx)?.clone();
                let search = SpawnSearch::new(&self.config, provider, propagator, sink);
                let outcome = search.spawn_forward(parent, state, current_time, dt)?;
                {
                    let traj = collection.trajectory_mut(idx)?;
                    traj.last_spawn[state] = Some(outcome.spawn_time);
                    traj.exit_time[state] = Some(outcome.exit_time);
                }

                let Some(point) = outcome.spawn else {
                    continue;
                };
                let mut child = point.child.clone();
                search.spawn_backward(&mut child, point.spawn_time, current_time, -dt)?;

                let bundle_overlap = max_nuc_overlap(collection, &child, state, provider);
                if bundle_overlap >= self.config.bundle_overlap_threshold {
                    sink.emit(
                        LogEvent::new(EventKind::SpawnRejected)
                            .arg(label)
                            .arg(state)
                            .arg(bundle_overlap)
                            .arg("overlap with bundle too large"),
                    );
                    continue;
                }

                let slot = collection.add(child)?;
                let child_label = collection.trajectory(slot)?.label;
                log::info!(
                    "spawned trajectory {child_label} on state {state} from {label} (state {own_state}) at t={:.4}",
                    point.spawn_time
                );
                self.records.push(SpawnRecord {
                    parent_label: label,
                    child_label,
                    parent_state: own_state,
                    child_state: state,
                    trigger_time: current_time,
                    spawn_time: point.spawn_time,
                    exit_time: outcome.exit_time,
                    bundle_overlap,
                    child_position: point.child.position,
                    child_momentum: point.child.momentum,
                });
                grown = true;
            }
        }
        Ok(grown)
    }

    /// Spawn predicate for slot `idx` towards `state`, given the coupling
    /// window already updated with the current sample.
    pub fn should_spawn(
        &self,
        collection: &BasisCollection,
        idx: usize,
        state: usize,
        window: &CouplingWindow,
        provider: &dyn IntegralProvider,
    ) -> Result<bool, FmsError> {
        let traj = collection.trajectory(idx)?;
        if traj.amplitude.norm() < self.config.population_threshold {
            return Ok(false);
        }
        if let Some(exit) = traj.exit_time.get(state).copied().flatten() {
            if collection.time() <= exit {
                return Ok(false);
            }
        }
        if window.newest() < self.config.coupling_threshold {
            return Ok(false);
        }
        if !window.non_decreasing() {
            return Ok(false);
        }
        let duplicate = max_nuc_overlap(collection, traj, state, provider);
        Ok(duplicate < self.config.duplicate_overlap_threshold)
    }
}
