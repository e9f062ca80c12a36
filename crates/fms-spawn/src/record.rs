use serde::{Deserialize, Serialize};

/// Summary of one inserted child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    /// Label of the spawning trajectory.
    pub parent_label: usize,
    /// Label issued to the child by the collection.
    pub child_label: usize,
    /// Electronic state of the parent.
    pub parent_state: usize,
    /// Electronic state of the child.
    pub child_state: usize,
    /// Simulation time at which the spawn was triggered.
    pub trigger_time: f64,
    /// Time of the accepted spawn point.
    pub spawn_time: f64,
    /// Time at which the forward search ended.
    pub exit_time: f64,
    /// Largest nuclear overlap of the child with the basis on its state.
    pub bundle_overlap: f64,
    /// Child position at the spawn point.
    pub child_position: Vec<f64>,
    /// Child momentum at the spawn point.
    pub child_momentum: Vec<f64>,
}
