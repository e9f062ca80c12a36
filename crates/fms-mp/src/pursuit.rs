use fms_core::{
    pseudo_inverse, BasisCollection, Complex64, ErrorInfo, FmsError, IntegralProvider,
};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::config::ReductionConfig;

/// Why a pursuit stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    /// Every alive trajectory was selected; nothing could be discarded.
    Exhausted,
    /// The fidelity loss fell below the configured threshold.
    Fidelity,
}

/// Outcome of one re-expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionReport {
    /// Retained slot indices, ascending.
    pub selected: Vec<usize>,
    /// Fitted coefficients, parallel to `selected` (before the final renormalisation).
    pub coefficients: Vec<Complex64>,
    /// Number of pursuit iterations performed.
    pub iterations: usize,
    /// Termination criterion that fired.
    pub termination: Termination,
    /// Last computed fidelity loss `1 - Re<candidate|master>`, if any was computed.
    pub fidelity_loss: Option<f64>,
    /// Condition number of the last coefficient-fit submatrix.
    pub fit_condition: f64,
    /// Alive trajectories before re-expression.
    pub nalive_before: usize,
    /// Overlap condition number after re-expression.
    pub condition_after: f64,
}

/// Greedy matching-pursuit reducer.
///
/// Selects, one trajectory at a time, the basis function with the largest
/// overlap against the current residual wavefunction, refits all selected
/// coefficients against the original wavefunction, and stops once either
/// every trajectory is selected or the fitted subset reproduces the original
/// within the fidelity threshold. The discarded trajectories are culled from
/// the master collection.
#[derive(Debug, Clone, Default)]
pub struct MatchingPursuit {
    config: ReductionConfig,
}

/// Working state of a single `reduce` call.
struct ReductionContext {
    selected: Vec<usize>,
    coefficients: Vec<Complex64>,
    projections: Vec<Complex64>,
    converged: Option<Termination>,
    gamma: f64,
    rcond: f64,
    fidelity_loss: Option<f64>,
    fit_condition: f64,
}

impl MatchingPursuit {
    /// Creates a reducer with the supplied thresholds.
    pub fn new(config: ReductionConfig) -> Self {
        Self { config }
    }

    /// Active thresholds.
    pub fn config(&self) -> &ReductionConfig {
        &self.config
    }

    /// Whether the overlap condition number of `master` exceeds the trigger.
    pub fn needs_reduction(&self, master: &BasisCollection) -> bool {
        master.condition_number() > self.config.condition_threshold
    }

    /// Re-expresses `master` only if its overlap matrix is ill-conditioned.
    pub fn reexpress(
        &self,
        master: &mut BasisCollection,
        provider: &dyn IntegralProvider,
    ) -> Result<Option<ReductionReport>, FmsError> {
        let condition = master.condition_number();
        if condition <= self.config.condition_threshold {
            log::debug!(
                "overlap condition {condition:.3e} within threshold {:.3e}",
                self.config.condition_threshold
            );
            return Ok(None);
        }
        log::info!(
            "overlap condition {condition:.3e} exceeds {:.3e}; re-expressing {} trajectories",
            self.config.condition_threshold,
            master.nalive()
        );
        self.reduce(master, provider).map(Some)
    }

    /// Runs the pursuit unconditionally and commits the reduced basis into
    /// `master`.
    pub fn reduce(
        &self,
        master: &mut BasisCollection,
        provider: &dyn IntegralProvider,
    ) -> Result<ReductionReport, FmsError> {
        let target = master.nalive();
        if target == 0 {
            return Err(FmsError::DegenerateBasis(ErrorInfo::new(
                "empty-basis",
                "cannot re-express a basis without alive trajectories",
            )));
        }

        let mut residual = master.clone();
        if !residual.overlap_is_current() {
            residual.recompute_overlap(provider);
        }
        let mut ctx = ReductionContext::new(self.config.fidelity_threshold, self.config.pinv_rcond);
        let mut iterations = 0;

        while ctx.converged.is_none() && iterations < target {
            iterations += 1;

            let idx = ctx.select(&residual, provider).ok_or_else(|| {
                FmsError::InvariantViolation(
                    ErrorInfo::new("no-candidate", "no unselected alive trajectory remains")
                        .with_context("selected", ctx.selected.len())
                        .with_context("nalive", target),
                )
            })?;
            let trajectory = residual.trajectory(idx)?;
            ctx.selected.push(idx);
            ctx.coefficients.push(Complex64::new(0.0, 0.0));
            ctx.projections.push(provider.overlap_bundle(trajectory, master));

            ctx.fit(&residual, provider)?;

            if ctx.selected.len() == target {
                ctx.converged = Some(Termination::Exhausted);
                break;
            }
            if ctx.check_fidelity(&residual, master, provider)? {
                ctx.converged = Some(Termination::Fidelity);
                break;
            }
            ctx.update_residual(&mut residual)?;
        }

        let termination = ctx.converged.ok_or_else(|| {
            FmsError::InvariantViolation(
                ErrorInfo::new("pursuit-unterminated", "pursuit exceeded its iteration bound")
                    .with_context("iterations", iterations),
            )
        })?;
        log::debug!(
            "pursuit finished after {iterations} iterations ({termination:?}), keeping {} of {target}",
            ctx.selected.len()
        );

        let (selected, coefficients) = ctx.commit(master, provider)?;
        let condition_after = master.condition_number();
        log::info!(
            "basis re-expressed: {target} -> {} trajectories, condition {condition_after:.3e}",
            selected.len()
        );
        Ok(ReductionReport {
            selected,
            coefficients,
            iterations,
            termination,
            fidelity_loss: ctx.fidelity_loss,
            fit_condition: ctx.fit_condition,
            nalive_before: target,
            condition_after,
        })
    }
}

impl ReductionContext {
    fn new(gamma: f64, rcond: f64) -> Self {
        Self {
            selected: Vec::new(),
            coefficients: Vec::new(),
            projections: Vec::new(),
            converged: None,
            gamma,
            rcond,
            fidelity_loss: None,
            fit_condition: 1.0,
        }
    }

    /// Unselected alive slot with the largest `|<t|residual>|`; the first
    /// encountered wins ties.
    fn select(&self, residual: &BasisCollection, provider: &dyn IntegralProvider) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &idx in residual.alive_indices() {
            if self.selected.contains(&idx) {
                continue;
            }
            let Ok(traj) = residual.trajectory(idx) else {
                continue;
            };
            let magnitude = provider.overlap_bundle(traj, residual).norm();
            match best {
                Some((_, best_mag)) if magnitude <= best_mag => {}
                _ => best = Some((idx, magnitude)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Least-squares fit of the selected coefficients against the master
    /// wavefunction, using the state-orthogonal overlap block.
    fn fit(
        &mut self,
        residual: &BasisCollection,
        provider: &dyn IntegralProvider,
    ) -> Result<(), FmsError> {
        let n = self.selected.len();
        let mut smat = DMatrix::<Complex64>::zeros(n, n);
        for i in 0..n {
            let ti = residual.trajectory(self.selected[i])?;
            for j in 0..=i {
                let tj = residual.trajectory(self.selected[j])?;
                let value = provider.overlap(ti, tj, false);
                smat[(i, j)] = value;
                smat[(j, i)] = value.conj();
            }
        }
        let pinv = pseudo_inverse(&smat, self.rcond);
        self.fit_condition = pinv.condition;
        for i in 0..n {
            self.coefficients[i] = (0..n)
                .map(|j| pinv.inverse[(i, j)] * self.projections[j])
                .sum();
        }
        Ok(())
    }

    fn check_fidelity(
        &mut self,
        residual: &BasisCollection,
        master: &BasisCollection,
        provider: &dyn IntegralProvider,
    ) -> Result<bool, FmsError> {
        if self.selected.is_empty() {
            return Err(FmsError::InvariantViolation(ErrorInfo::new(
                "empty-selection",
                "fidelity check reached with no selected trajectories",
            )));
        }
        let mut candidate = residual.clone();
        candidate.zero_amplitudes();
        for (&idx, &coeff) in self.selected.iter().zip(&self.coefficients) {
            candidate.trajectory_mut(idx)?.amplitude = coeff;
        }
        candidate.renormalize()?;

        let eta = 1.0 - provider.collection_overlap(&candidate, master).re;
        self.fidelity_loss = Some(eta);
        log::debug!(
            "pursuit iteration {}: fidelity loss {eta:.3e} (gamma {:.1e})",
            self.selected.len(),
            self.gamma
        );
        Ok(eta < self.gamma)
    }

    fn update_residual(&self, residual: &mut BasisCollection) -> Result<(), FmsError> {
        for (&idx, &coeff) in self.selected.iter().zip(&self.coefficients) {
            residual.trajectory_mut(idx)?.amplitude -= coeff;
        }
        residual.renormalize()
    }

    /// Sorts the selection, culls everything else from `master` and installs
    /// the fitted coefficients.
    fn commit(
        &self,
        master: &mut BasisCollection,
        provider: &dyn IntegralProvider,
    ) -> Result<(Vec<usize>, Vec<Complex64>), FmsError> {
        let mut order: Vec<usize> = (0..self.selected.len()).collect();
        order.sort_by_key(|&k| self.selected[k]);
        let selected: Vec<usize> = order.iter().map(|&k| self.selected[k]).collect();
        let coefficients: Vec<Complex64> = order.iter().map(|&k| self.coefficients[k]).collect();

        let previously_alive = master.alive_indices().to_vec();
        for idx in previously_alive {
            master.kill(idx)?;
        }
        for &idx in &selected {
            master.revive(idx)?;
        }
        master.zero_amplitudes();
        for (&idx, &coeff) in selected.iter().zip(&coefficients) {
            master.trajectory_mut(idx)?.amplitude = coeff;
        }

        master.recompute_overlap(provider);
        master.renormalize()?;
        master.rebuild_matrices(provider);
        Ok((selected, coefficients))
    }
}
