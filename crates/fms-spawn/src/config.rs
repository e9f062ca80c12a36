use fms_core::{ErrorInfo, FmsError};
use serde::{Deserialize, Serialize};

/// Thresholds controlling when and where children are spawned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Minimum parent amplitude magnitude.
    #[serde(default = "default_population_threshold")]
    pub population_threshold: f64,
    /// Minimum effective coupling magnitude.
    #[serde(default = "default_coupling_threshold")]
    pub coupling_threshold: f64,
    /// Minimum parent/child nuclear overlap for a step to be a spawn point.
    #[serde(default = "default_spawn_overlap_threshold")]
    pub spawn_overlap_threshold: f64,
    /// A trajectory already on the target state with at least this nuclear
    /// overlap suppresses spawning.
    #[serde(default = "default_duplicate_overlap_threshold")]
    pub duplicate_overlap_threshold: f64,
    /// Children overlapping the existing basis this much are discarded.
    #[serde(default = "default_bundle_overlap_threshold")]
    pub bundle_overlap_threshold: f64,
    /// Step budget of a single forward search.
    #[serde(default = "default_max_forward_steps")]
    pub max_forward_steps: usize,
}

fn default_population_threshold() -> f64 {
    0.1
}

fn default_coupling_threshold() -> f64 {
    0.03
}

fn default_spawn_overlap_threshold() -> f64 {
    0.8
}

fn default_duplicate_overlap_threshold() -> f64 {
    0.7
}

fn default_bundle_overlap_threshold() -> f64 {
    0.7
}

fn default_max_forward_steps() -> usize {
    5000
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            population_threshold: default_population_threshold(),
            coupling_threshold: default_coupling_threshold(),
            spawn_overlap_threshold: default_spawn_overlap_threshold(),
            duplicate_overlap_threshold: default_duplicate_overlap_threshold(),
            bundle_overlap_threshold: default_bundle_overlap_threshold(),
            max_forward_steps: default_max_forward_steps(),
        }
    }
}

impl SpawnConfig {
    /// Rejects negative or non-finite thresholds and an empty step budget.
    pub fn validate(&self) -> Result<(), FmsError> {
        let fields = [
            ("population_threshold", self.population_threshold),
            ("coupling_threshold", self.coupling_threshold),
            ("spawn_overlap_threshold", self.spawn_overlap_threshold),
            ("duplicate_overlap_threshold", self.duplicate_overlap_threshold),
            ("bundle_overlap_threshold", self.bundle_overlap_threshold),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FmsError::Config(
                    ErrorInfo::new("spawn-threshold", "threshold must be finite and non-negative")
                        .with_context("field", name)
                        .with_context("value", value),
                ));
            }
        }
        if self.max_forward_steps == 0 {
            return Err(FmsError::Config(
                ErrorInfo::new("spawn-budget", "forward search needs at least one step")
                    .with_hint("set max_forward_steps to a positive value"),
            ));
        }
        Ok(())
    }
}
