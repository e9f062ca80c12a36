#![deny(missing_docs)]

//! Adaptive basis growth: spawns new trajectories on coupled electronic
//! states at the point of maximum coupling.

/// Energy-conserving child momentum adjustment.
pub mod adjust;
/// Spawning thresholds.
pub mod config;
/// Spawn predicate, the per-step spawning pass and coupled-regime detection.
pub mod engine;
/// Forward coupling-maximum search and backward re-propagation.
pub mod forward;
/// Nuclear overlap screening against the existing basis.
pub mod overlap;
/// Serialisable spawn records.
pub mod record;

pub use adjust::adjust_child;
pub use config::SpawnConfig;
pub use engine::SpawnEngine;
pub use forward::{ForwardOutcome, SpawnPoint, SpawnSearch, StepVerdict};
pub use overlap::max_nuc_overlap;
pub use record::SpawnRecord;
