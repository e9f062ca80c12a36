//! Forward search for a coupling maximum and backward re-propagation of
//! the accepted child.

use fms_core::{
    Complex64, CouplingWindow, EventKind, EventSink, FmsError, IntegralProvider, LogEvent,
    Propagator, Trajectory,
};

use crate::adjust::adjust_child;
use crate::config::SpawnConfig;

/// Verdict on a single forward-search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepVerdict {
    /// The step is the new best spawn point.
    Accepted,
    /// The child momentum could not be adjusted to conserve energy.
    MomentumAdjustFailed,
    /// Parent and child overlap too little.
    OverlapTooSmall,
    /// The coupling is no longer rising.
    DecreasingCoupling,
}

impl StepVerdict {
    /// Reason string attached to `spawn_step` events.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepVerdict::Accepted => "yes",
            StepVerdict::MomentumAdjustFailed => "no [momentum adjust fail]",
            StepVerdict::OverlapTooSmall => "no [overlap too small]",
            StepVerdict::DecreasingCoupling => "no [decreasing coupling]",
        }
    }
}

/// Accepted spawn point.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPoint {
    /// Child at the spawn point: zero amplitude, target state, adjusted momentum.
    pub child: Trajectory,
    /// Parent at the spawn point.
    pub parent: Trajectory,
    /// Time of the spawn point.
    pub spawn_time: f64,
}

/// Result of [`SpawnSearch::spawn_forward`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardOutcome {
    /// Last accepted spawn point, if any.
    pub spawn: Option<SpawnPoint>,
    /// Spawn time, or the initial time when nothing was accepted.
    pub spawn_time: f64,
    /// Time at which the search stopped.
    pub exit_time: f64,
    /// Number of coupling samples taken.
    pub steps: usize,
    /// Whether the search stopped on the step budget instead of a coupling maximum.
    pub exhausted: bool,
}

/// Collaborators of one spawn attempt.
pub struct SpawnSearch<'a> {
    config: &'a SpawnConfig,
    provider: &'a dyn IntegralProvider,
    propagator: &'a dyn Propagator,
    sink: &'a dyn EventSink,
}

impl<'a> SpawnSearch<'a> {
    /// Bundles the thresholds and collaborators used by a search.
    pub fn new(
        config: &'a SpawnConfig,
        provider: &'a dyn IntegralProvider,
        propagator: &'a dyn Propagator,
        sink: &'a dyn EventSink,
    ) -> Self {
        Self {
            config,
            provider,
            propagator,
            sink,
        }
    }

    /// Propagates `parent` forward from `initial_time` until its coupling to
    /// `child_state` passes a maximum, remembering the latest step at which a
    /// child could be spawned.
    pub fn spawn_forward(
        &self,
        mut parent: Trajectory,
        child_state: usize,
        initial_time: f64,
        dt: f64,
    ) -> Result<ForwardOutcome, FmsError> {
        let parent_state = parent.state;
        let mut current_time = initial_time;
        let mut window = CouplingWindow::new();
        let mut best: Option<SpawnPoint> = None;

        self.sink.emit(
            LogEvent::new(EventKind::SpawnStart)
                .arg(parent.label)
                .arg(parent_state)
                .arg(child_state),
        );

        for step in 1..=self.config.max_forward_steps {
            window.push(self.provider.eff_coup(&parent, child_state).abs());

            let mut attempt = parent.clone();
            attempt.state = child_state;
            let direction = self.provider.derivative(&parent, parent_state, child_state);
            let adjusted = adjust_child(&parent, &mut attempt, &direction, self.provider);
            let sij = self.provider.traj_overlap(&parent, &attempt, true).norm();

            if window.past_peak() {
                self.step_event(current_time, &window, sij, StepVerdict::DecreasingCoupling);
                return Ok(self.finish(best, initial_time, current_time, step, false));
            }

            let verdict = if adjusted.is_none() {
                StepVerdict::MomentumAdjustFailed
            } else if sij < self.config.spawn_overlap_threshold {
                StepVerdict::OverlapTooSmall
            } else if !window.rising() {
                StepVerdict::DecreasingCoupling
            } else {
                StepVerdict::Accepted
            };
            if verdict == StepVerdict::Accepted {
                attempt.last_spawn[parent_state] = Some(current_time);
                attempt.amplitude = Complex64::new(0.0, 0.0);
                attempt.parent = Some(parent.label);
                best = Some(SpawnPoint {
                    child: attempt,
                    parent: parent.clone(),
                    spawn_time: current_time,
                });
            }
            self.step_event(current_time, &window, sij, verdict);

            self.propagator.step(&mut parent, current_time, dt)?;
            current_time += dt;
        }

        log::warn!(
            "forward spawn search for trajectory {} -> state {child_state} hit its {} step budget",
            parent.label,
            self.config.max_forward_steps
        );
        Ok(self.finish(
            best,
            initial_time,
            current_time,
            self.config.max_forward_steps,
            true,
        ))
    }

    /// Re-propagates `child` from `spawn_time` to `end_time` in increments of
    /// `dt` (negative for backward propagation). Returns the number of steps.
    pub fn spawn_backward(
        &self,
        child: &mut Trajectory,
        spawn_time: f64,
        end_time: f64,
        dt: f64,
    ) -> Result<usize, FmsError> {
        let nstep = ((spawn_time - end_time) / dt).abs().round() as usize;
        let mut back_time = spawn_time;
        for _ in 0..nstep {
            self.propagator.step(child, back_time, dt)?;
            back_time += dt;
            self.sink.emit(LogEvent::new(EventKind::SpawnBack).arg(back_time));
        }
        Ok(nstep)
    }

    fn step_event(&self, time: f64, window: &CouplingWindow, sij: f64, verdict: StepVerdict) {
        self.sink.emit(
            LogEvent::new(EventKind::SpawnStep)
                .arg(time)
                .arg(window.newest())
                .arg(sij)
                .arg(verdict.as_str()),
        );
    }

    fn finish(
        &self,
        best: Option<SpawnPoint>,
        initial_time: f64,
        exit_time: f64,
        steps: usize,
        exhausted: bool,
    ) -> ForwardOutcome {
        match best {
            Some(mut point) => {
                let parent_state = point.parent.state;
                point.child.exit_time[parent_state] = Some(exit_time);
                self.sink
                    .emit(LogEvent::new(EventKind::SpawnSuccess).arg(point.spawn_time));
                ForwardOutcome {
                    spawn_time: point.spawn_time,
                    spawn: Some(point),
                    exit_time,
                    steps,
                    exhausted,
                }
            }
            None => {
                self.sink.emit(LogEvent::new(EventKind::SpawnFailure).arg(exit_time));
                ForwardOutcome {
                    spawn: None,
                    spawn_time: initial_time,
                    exit_time,
                    steps,
                    exhausted,
                }
            }
        }
    }
}
