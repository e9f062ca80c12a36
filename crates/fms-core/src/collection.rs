//! Slot arena of trajectories plus the overlap matrix over its alive subset.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, FmsError};
use crate::linalg;
use crate::provider::IntegralProvider;
use crate::trajectory::Trajectory;
use crate::Complex64;

/// Lifecycle state of an arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SlotStatus {
    /// Part of the wavefunction.
    Alive,
    /// Temporarily removed by [`BasisCollection::kill`]; revivable.
    Culled {
        /// Amplitude held when the slot was culled.
        stashed: Complex64,
    },
    /// Permanently removed; the slot may be reused by [`BasisCollection::add`].
    Retired,
}

/// One arena slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Trajectory occupying the slot.
    pub trajectory: Trajectory,
    /// Lifecycle state.
    pub status: SlotStatus,
}

/// Ordered, slot-reusable set of trajectories representing a multi-state
/// wavefunction.
///
/// Slot indices are stable handles: `kill`, `revive` and `retire` never move
/// other slots. The overlap matrix `S` is indexed by position within
/// [`alive_indices`](Self::alive_indices) and must be rebuilt after the alive
/// set changes. `Clone` produces a fully independent deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisCollection {
    nstates: usize,
    time: f64,
    slots: Vec<Slot>,
    alive: Vec<usize>,
    overlap: DMatrix<Complex64>,
    overlap_current: bool,
    condition: Option<f64>,
    next_label: usize,
}

impl BasisCollection {
    /// Creates an empty collection at time zero.
    pub fn new(nstates: usize) -> Self {
        Self {
            nstates,
            time: 0.0,
            slots: Vec::new(),
            alive: Vec::new(),
            overlap: DMatrix::zeros(0, 0),
            overlap_current: true,
            condition: None,
            next_label: 0,
        }
    }

    /// Builds a collection from trajectories and computes its matrices.
    pub fn from_trajectories(
        nstates: usize,
        trajectories: Vec<Trajectory>,
        provider: &dyn IntegralProvider,
    ) -> Result<Self, FmsError> {
        let mut collection = Self::new(nstates);
        for traj in trajectories {
            collection.add(traj)?;
        }
        collection.rebuild_matrices(provider);
        Ok(collection)
    }

    /// Number of electronic states.
    pub fn nstates(&self) -> usize {
        self.nstates
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Sets the simulation time.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Number of slots (alive, culled and retired).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of alive trajectories.
    pub fn nalive(&self) -> usize {
        self.alive.len()
    }

    /// Number of culled or retired slots.
    pub fn ndead(&self) -> usize {
        self.slots.len() - self.alive.len()
    }

    /// Alive slot indices in ascending order.
    pub fn alive_indices(&self) -> &[usize] {
        &self.alive
    }

    /// Whether slot `idx` is alive.
    pub fn is_alive(&self, idx: usize) -> bool {
        matches!(
            self.slots.get(idx).map(|slot| slot.status),
            Some(SlotStatus::Alive)
        )
    }

    /// Lifecycle state of slot `idx`.
    pub fn status(&self, idx: usize) -> Option<SlotStatus> {
        self.slots.get(idx).map(|slot| slot.status)
    }

    /// All slots in index order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Trajectory stored in slot `idx`, whatever its status.
    pub fn trajectory(&self, idx: usize) -> Result<&Trajectory, FmsError> {
        self.slots
            .get(idx)
            .map(|slot| &slot.trajectory)
            .ok_or_else(|| self.unknown_slot(idx))
    }

    /// Mutable trajectory stored in slot `idx`.
    pub fn trajectory_mut(&mut self, idx: usize) -> Result<&mut Trajectory, FmsError> {
        let err = self.unknown_slot(idx);
        self.slots
            .get_mut(idx)
            .map(|slot| &mut slot.trajectory)
            .ok_or(err)
    }

    /// Alive trajectories in ascending slot order.
    pub fn alive_trajectories(&self) -> impl Iterator<Item = &Trajectory> + '_ {
        self.alive.iter().map(|&idx| &self.slots[idx].trajectory)
    }

    /// Label that the next added trajectory will receive.
    pub fn next_label(&self) -> usize {
        self.next_label
    }

    /// Marks slot `idx` dead, stashing and zeroing its amplitude.
    pub fn kill(&mut self, idx: usize) -> Result<(), FmsError> {
        let slot = self.slot_in_state(idx, "kill", |s| matches!(s, SlotStatus::Alive))?;
        let stashed = slot.trajectory.amplitude;
        slot.trajectory.amplitude = Complex64::new(0.0, 0.0);
        slot.status = SlotStatus::Culled { stashed };
        self.alive.retain(|&i| i != idx);
        self.overlap_current = false;
        Ok(())
    }

    /// Marks a culled slot alive again, restoring its stashed amplitude.
    pub fn revive(&mut self, idx: usize) -> Result<(), FmsError> {
        let slot = self.slot_in_state(idx, "revive", |s| {
            matches!(s, SlotStatus::Culled { .. })
        })?;
        if let SlotStatus::Culled { stashed } = slot.status {
            slot.trajectory.amplitude = stashed;
        }
        slot.status = SlotStatus::Alive;
        let pos = self.alive.partition_point(|&i| i < idx);
        self.alive.insert(pos, idx);
        self.overlap_current = false;
        Ok(())
    }

    /// Permanently removes slot `idx`; the slot becomes free for reuse.
    pub fn retire(&mut self, idx: usize) -> Result<(), FmsError> {
        let slot = self.slot_in_state(idx, "retire", |s| !matches!(s, SlotStatus::Retired))?;
        let was_alive = matches!(slot.status, SlotStatus::Alive);
        slot.trajectory.amplitude = Complex64::new(0.0, 0.0);
        slot.status = SlotStatus::Retired;
        if was_alive {
            self.alive.retain(|&i| i != idx);
            self.overlap_current = false;
        }
        Ok(())
    }

    /// Retires every culled slot, returning their indices in ascending order.
    /// The alive set and `S` are unaffected.
    pub fn retire_culled(&mut self) -> Result<Vec<usize>, FmsError> {
        let culled: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot.status, SlotStatus::Culled { .. }))
            .map(|(idx, _)| idx)
            .collect();
        for &idx in &culled {
            self.retire(idx)?;
        }
        Ok(culled)
    }

    /// Inserts `traj` as alive into the first retired slot, or a new slot at
    /// the end. The trajectory receives a fresh label; the slot index is
    /// returned.
    pub fn add(&mut self, mut traj: Trajectory) -> Result<usize, FmsError> {
        if traj.nstates != self.nstates {
            return Err(FmsError::Config(
                ErrorInfo::new("nstates-mismatch", "trajectory disagrees on state count")
                    .with_context("collection", self.nstates)
                    .with_context("trajectory", traj.nstates),
            ));
        }
        traj.validate()?;
        traj.label = self.next_label;
        self.next_label += 1;

        let slot = Slot {
            trajectory: traj,
            status: SlotStatus::Alive,
        };
        let idx = match self
            .slots
            .iter()
            .position(|slot| matches!(slot.status, SlotStatus::Retired))
        {
            Some(free) => {
                self.slots[free] = slot;
                free
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };
        let pos = self.alive.partition_point(|&i| i < idx);
        self.alive.insert(pos, idx);
        self.overlap_current = false;
        Ok(idx)
    }

    /// Checks the bookkeeping of a collection built outside this API, such as
    /// a deserialised snapshot: the alive list is strictly ascending, in range
    /// and matches the slot statuses exactly; every trajectory is well formed,
    /// agrees on the state count and carries a label below `next_label`.
    pub fn validate(&self) -> Result<(), FmsError> {
        let bookkeeping = |message: &str| {
            ErrorInfo::new("collection-alive", message)
                .with_context("capacity", self.slots.len())
                .with_context("alive", format!("{:?}", self.alive))
        };
        if self.alive.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(FmsError::InvariantViolation(bookkeeping(
                "alive indices are not strictly ascending",
            )));
        }
        if let Some(&idx) = self.alive.iter().find(|&&idx| !self.is_alive(idx)) {
            return Err(FmsError::InvariantViolation(
                bookkeeping("alive index does not refer to an alive slot").with_context("index", idx),
            ));
        }
        let marked = self
            .slots
            .iter()
            .filter(|slot| matches!(slot.status, SlotStatus::Alive))
            .count();
        if marked != self.alive.len() {
            return Err(FmsError::InvariantViolation(
                bookkeeping("alive slots are missing from the alive list")
                    .with_context("marked", marked),
            ));
        }

        for slot in &self.slots {
            let traj = &slot.trajectory;
            if traj.nstates != self.nstates {
                return Err(FmsError::Config(
                    ErrorInfo::new("nstates-mismatch", "trajectory disagrees on state count")
                        .with_context("collection", self.nstates)
                        .with_context("trajectory", traj.nstates)
                        .with_context("label", traj.label),
                ));
            }
            traj.validate()?;
            if traj.label >= self.next_label {
                return Err(FmsError::InvariantViolation(
                    ErrorInfo::new("collection-label", "trajectory label was never issued")
                        .with_context("label", traj.label)
                        .with_context("next_label", self.next_label),
                ));
            }
        }
        Ok(())
    }

    /// Sets every slot amplitude (alive or not) to zero.
    pub fn zero_amplitudes(&mut self) {
        for slot in &mut self.slots {
            slot.trajectory.amplitude = Complex64::new(0.0, 0.0);
        }
    }

    /// Overlap matrix over the alive set.
    pub fn overlap_matrix(&self) -> &DMatrix<Complex64> {
        &self.overlap
    }

    /// Whether `S` reflects the current alive set.
    pub fn overlap_is_current(&self) -> bool {
        self.overlap_current && self.overlap.nrows() == self.alive.len()
    }

    /// Recomputes `S_ij = <t_i|t_j>` over the alive set, filling the lower
    /// triangle and mirroring its conjugate.
    pub fn recompute_overlap(&mut self, provider: &dyn IntegralProvider) {
        let n = self.alive.len();
        let mut s = DMatrix::<Complex64>::zeros(n, n);
        for i in 0..n {
            let ti = &self.slots[self.alive[i]].trajectory;
            for j in 0..=i {
                let tj = &self.slots[self.alive[j]].trajectory;
                let value = provider.traj_overlap(ti, tj, false);
                s[(i, j)] = value;
                s[(j, i)] = value.conj();
            }
        }
        self.overlap = s;
        self.overlap_current = true;
    }

    /// Recomputes all matrices held by the collection and caches the overlap
    /// condition number.
    pub fn rebuild_matrices(&mut self, provider: &dyn IntegralProvider) {
        self.recompute_overlap(provider);
        self.condition = Some(linalg::condition_number(&self.overlap));
    }

    /// Condition number of `S`, from the last rebuild when current.
    pub fn condition_number(&self) -> f64 {
        match self.condition {
            Some(cond) if self.overlap_is_current() => cond,
            _ => linalg::condition_number(&self.overlap),
        }
    }

    /// Wavefunction norm `sum_ij conj(c_i) S_ij c_j`.
    pub fn norm(&self) -> Result<f64, FmsError> {
        if !self.overlap_is_current() {
            return Err(FmsError::DegenerateBasis(
                ErrorInfo::new("stale-overlap", "overlap matrix does not match the alive set")
                    .with_context("nalive", self.alive.len())
                    .with_context("overlap_dim", self.overlap.nrows())
                    .with_hint("rebuild matrices after changing the alive set"),
            ));
        }
        let mut total = Complex64::new(0.0, 0.0);
        for (i, &ii) in self.alive.iter().enumerate() {
            let ci = self.slots[ii].trajectory.amplitude.conj();
            for (j, &jj) in self.alive.iter().enumerate() {
                total += ci * self.overlap[(i, j)] * self.slots[jj].trajectory.amplitude;
            }
        }
        Ok(total.re)
    }

    /// Rescales alive amplitudes so that the norm becomes one.
    pub fn renormalize(&mut self) -> Result<(), FmsError> {
        let norm = self.norm()?;
        if !(norm > 0.0) || !norm.is_finite() {
            return Err(FmsError::DegenerateBasis(
                ErrorInfo::new("non-positive-norm", "cannot renormalise a vanishing wavefunction")
                    .with_context("norm", norm)
                    .with_context("nalive", self.alive.len()),
            ));
        }
        let scale = 1.0 / norm.sqrt();
        for &idx in &self.alive {
            self.slots[idx].trajectory.amplitude *= scale;
        }
        Ok(())
    }

    /// Population on each electronic state, `sum_ij conj(c_i) S_ij c_j`
    /// restricted to pairs on that state.
    pub fn populations(&self) -> Result<Vec<f64>, FmsError> {
        self.norm()?;
        let mut pops = vec![0.0; self.nstates];
        for (i, &ii) in self.alive.iter().enumerate() {
            let ti = &self.slots[ii].trajectory;
            for (j, &jj) in self.alive.iter().enumerate() {
                let tj = &self.slots[jj].trajectory;
                if ti.state == tj.state {
                    pops[ti.state] +=
                        (ti.amplitude.conj() * self.overlap[(i, j)] * tj.amplitude).re;
                }
            }
        }
        Ok(pops)
    }

    fn unknown_slot(&self, idx: usize) -> FmsError {
        FmsError::Slot(
            ErrorInfo::new("unknown-slot", "slot index out of range")
                .with_context("slot", idx)
                .with_context("capacity", self.slots.len()),
        )
    }

    fn slot_in_state(
        &mut self,
        idx: usize,
        op: &str,
        allowed: impl Fn(&SlotStatus) -> bool,
    ) -> Result<&mut Slot, FmsError> {
        let capacity = self.slots.len();
        let slot = self.slots.get_mut(idx).ok_or_else(|| {
            FmsError::Slot(
                ErrorInfo::new("unknown-slot", "slot index out of range")
                    .with_context("slot", idx)
                    .with_context("capacity", capacity),
            )
        })?;
        if !allowed(&slot.status) {
            return Err(FmsError::Slot(
                ErrorInfo::new("slot-status", format!("cannot {op} slot in its current state"))
                    .with_context("slot", idx)
                    .with_context("status", format!("{:?}", slot.status)),
            ));
        }
        Ok(slot)
    }
}
