use fms_core::{BasisCollection, EventSink, FmsError, IntegralProvider, Propagator};
use fms_integrals::{IntegralBackend, VelocityVerlet};
use fms_mp::{MatchingPursuit, ReductionReport};
use fms_spawn::{SpawnEngine, SpawnRecord};
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::initial::initial_basis;
use crate::metrics::StepMetrics;

/// Aggregate result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Steps completed.
    pub steps: usize,
    /// Final simulation time.
    pub final_time: f64,
    /// Alive trajectories at the end of the run.
    pub final_nalive: usize,
    /// Final population per electronic state.
    pub final_populations: Vec<f64>,
    /// Largest overlap condition number observed after any step.
    pub max_condition: f64,
    /// Every inserted child.
    pub spawns: Vec<SpawnRecord>,
    /// Every basis re-expression, tagged with its step.
    pub reductions: Vec<(usize, ReductionReport)>,
    /// Per-step observables.
    pub metrics: Vec<StepMetrics>,
}

/// Basis, collaborators and per-run state of one simulation.
pub struct Simulation {
    config: SimConfig,
    backend: IntegralBackend,
    propagator: VelocityVerlet,
    reducer: MatchingPursuit,
    engine: SpawnEngine,
    basis: BasisCollection,
    step: usize,
    reductions: Vec<(usize, ReductionReport)>,
    metrics: Vec<StepMetrics>,
}

impl Simulation {
    /// Validates `config` and builds the initial basis.
    pub fn new(config: SimConfig) -> Result<Self, FmsError> {
        config.validate()?;
        let backend = config.backend.clone();
        let basis = initial_basis(&config, &backend)?;
        Ok(Self {
            propagator: VelocityVerlet::new(backend.clone()),
            reducer: MatchingPursuit::new(config.reduction.clone()),
            engine: SpawnEngine::new(config.spawning.clone()),
            backend,
            basis,
            config,
            step: 0,
            reductions: Vec::new(),
            metrics: Vec::new(),
        })
    }

    /// Current basis.
    pub fn basis(&self) -> &BasisCollection {
        &self.basis
    }

    /// Run configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Metrics recorded so far.
    pub fn metrics(&self) -> &[StepMetrics] {
        &self.metrics
    }

    /// Advances the basis by one time step.
    ///
    /// An ill-conditioned basis is re-expressed and the slots it discards are
    /// retired for reuse; otherwise, inside the coupled regime, the spawning
    /// pass runs. All alive trajectories are
    /// then propagated, matrices rebuilt and the amplitudes renormalised.
    pub fn step(&mut self, sink: &dyn EventSink) -> Result<StepMetrics, FmsError> {
        let dt = self.config.dt;
        let provider: &dyn IntegralProvider = &self.backend;
        self.step += 1;

        let mut reduced = false;
        let mut spawned = false;
        if self.reducer.needs_reduction(&self.basis) {
            let report = self
                .reducer
                .reduce(&mut self.basis, provider)
                .map_err(|err| self.abort("re-expression", err))?;
            // Discarded trajectories are never revived; free their slots for children.
            let retired = self.basis.retire_culled()?;
            log::debug!("retired {} discarded slots: {retired:?}", retired.len());
            self.reductions.push((self.step, report));
            reduced = true;
        } else if self.engine.in_coupled_regime(&self.basis, provider) {
            spawned = self
                .engine
                .spawn(&mut self.basis, provider, &self.propagator, sink, dt)
                .map_err(|err| self.abort("spawning", err))?;
            if spawned {
                self.basis.rebuild_matrices(provider);
            }
        }

        let time = self.basis.time();
        let alive = self.basis.alive_indices().to_vec();
        for idx in alive {
            self.propagator.step(self.basis.trajectory_mut(idx)?, time, dt)?;
        }
        self.basis.set_time(time + dt);
        self.basis.rebuild_matrices(provider);

        let observed = StepMetrics::observe(self.step, &self.basis, spawned, reduced)?;
        self.basis
            .renormalize()
            .map_err(|err| self.abort("renormalisation", err))?;
        log::debug!(
            "step {} t={:.4} nalive={} cond={:.3e} norm={:.8}",
            observed.step,
            observed.time,
            observed.nalive,
            observed.condition,
            observed.norm
        );
        self.metrics.push(observed.clone());
        Ok(observed)
    }

    /// Runs all configured steps.
    pub fn run(
        mut self,
        sink: &dyn EventSink,
    ) -> Result<(RunSummary, BasisCollection), FmsError> {
        log::info!(
            "running {} steps of dt={} with backend {}",
            self.config.steps,
            self.config.dt,
            self.backend.name()
        );
        for _ in 0..self.config.steps {
            self.step(sink)?;
        }
        let summary = RunSummary {
            steps: self.step,
            final_time: self.basis.time(),
            final_nalive: self.basis.nalive(),
            final_populations: self.basis.populations()?,
            max_condition: self
                .metrics
                .iter()
                .map(|m| m.condition)
                .fold(0.0, f64::max),
            spawns: self.engine.take_records(),
            reductions: self.reductions,
            metrics: self.metrics,
        };
        log::info!(
            "run finished at t={:.4}: {} trajectories, {} spawns, {} re-expressions",
            summary.final_time,
            summary.final_nalive,
            summary.spawns.len(),
            summary.reductions.len()
        );
        Ok((summary, self.basis))
    }

    fn abort(&self, phase: &str, err: FmsError) -> FmsError {
        if err.is_fatal() {
            log::error!("step {} aborted during {phase}: {err}", self.step);
        }
        err
    }
}

/// Builds and runs a simulation in one call.
pub fn run(
    config: &SimConfig,
    sink: &dyn EventSink,
) -> Result<(RunSummary, BasisCollection), FmsError> {
    Simulation::new(config.clone())?.run(sink)
}
