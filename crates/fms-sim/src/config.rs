use std::fs;
use std::path::{Path, PathBuf};

use fms_core::{ErrorInfo, FmsError};
use fms_integrals::IntegralBackend;
use fms_mp::ReductionConfig;
use fms_spawn::SpawnConfig;
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters of a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Time step.
    pub dt: f64,
    /// Number of steps to take.
    pub steps: usize,
    /// Number of electronic states.
    #[serde(default = "default_nstates")]
    pub nstates: usize,
    /// Model providing integrals and forces.
    pub backend: IntegralBackend,
    /// Basis re-expression thresholds.
    #[serde(default)]
    pub reduction: ReductionConfig,
    /// Spawning thresholds.
    #[serde(default)]
    pub spawning: SpawnConfig,
    /// Initial basis.
    pub initial: InitialConditions,
    /// Master seed for initial-condition sampling.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Output file names.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_nstates() -> usize {
    2
}

/// Source of the initial basis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InitialConditions {
    /// Trajectories jittered around a reference phase-space point.
    Sampled {
        /// Number of trajectories.
        ntraj: usize,
        /// Electronic state of every initial trajectory.
        #[serde(default)]
        state: usize,
        /// Reference position.
        position: Vec<f64>,
        /// Reference momentum.
        momentum: Vec<f64>,
        /// Gaussian widths.
        widths: Vec<f64>,
        /// Nuclear masses; unit masses when omitted.
        #[serde(default)]
        masses: Option<Vec<f64>>,
        /// Standard deviation of the position jitter.
        #[serde(default)]
        position_sigma: f64,
        /// Standard deviation of the momentum jitter.
        #[serde(default)]
        momentum_sigma: f64,
    },
    /// Basis restored from a `basis.json` snapshot.
    Snapshot {
        /// Snapshot path.
        path: PathBuf,
    },
}

/// Master seed and an optional label recorded in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed; trajectory `i` samples from substream `i`.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Free-form label.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x0F35_5EED_0000_0001
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Names of the files written into a run directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Per-step metrics CSV.
    #[serde(default = "default_metrics_file")]
    pub metrics_file: PathBuf,
    /// Run summary JSON.
    #[serde(default = "default_summary_file")]
    pub summary_file: PathBuf,
    /// Run manifest JSON.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: PathBuf,
    /// Final basis snapshot JSON.
    #[serde(default = "default_basis_file")]
    pub basis_file: PathBuf,
}

fn default_metrics_file() -> PathBuf {
    PathBuf::from("metrics.csv")
}

fn default_summary_file() -> PathBuf {
    PathBuf::from("summary.json")
}

fn default_manifest_file() -> PathBuf {
    PathBuf::from("manifest.json")
}

fn default_basis_file() -> PathBuf {
    PathBuf::from("basis.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            metrics_file: default_metrics_file(),
            summary_file: default_summary_file(),
            manifest_file: default_manifest_file(),
            basis_file: default_basis_file(),
        }
    }
}

impl SimConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, FmsError> {
        serde_yaml::from_str(contents)
            .map_err(|err| FmsError::Serde(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Reads and parses a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, FmsError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            FmsError::Serde(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            FmsError::Serde(info) => FmsError::Serde(info.with_context("path", path.display())),
            other => other,
        })
    }

    /// Checks the run shape and every nested threshold block.
    pub fn validate(&self) -> Result<(), FmsError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(FmsError::Config(
                ErrorInfo::new("sim-dt", "time step must be finite and positive")
                    .with_context("dt", self.dt),
            ));
        }
        if self.steps == 0 {
            return Err(FmsError::Config(
                ErrorInfo::new("sim-steps", "step budget must be positive")
                    .with_hint("set steps to at least 1"),
            ));
        }
        if self.nstates < 2 {
            return Err(FmsError::Config(
                ErrorInfo::new("sim-nstates", "spawning needs at least two electronic states")
                    .with_context("nstates", self.nstates),
            ));
        }
        self.reduction.validate()?;
        self.spawning.validate()?;
        if let InitialConditions::Sampled {
            ntraj,
            state,
            position,
            momentum,
            widths,
            masses,
            position_sigma,
            momentum_sigma,
        } = &self.initial
        {
            let dim = position.len();
            let masses_ok = masses.as_ref().map_or(true, |m| m.len() == dim);
            if *ntraj == 0 || dim == 0 || momentum.len() != dim || widths.len() != dim || !masses_ok
            {
                return Err(FmsError::Config(
                    ErrorInfo::new("initial-shape", "initial conditions are inconsistent")
                        .with_context("ntraj", ntraj)
                        .with_context("dim", dim)
                        .with_context("momentum", momentum.len())
                        .with_context("widths", widths.len()),
                ));
            }
            if *state >= self.nstates {
                return Err(FmsError::Config(
                    ErrorInfo::new("initial-state", "initial state out of range")
                        .with_context("state", state)
                        .with_context("nstates", self.nstates),
                ));
            }
            if !(*position_sigma >= 0.0 && *momentum_sigma >= 0.0) {
                return Err(FmsError::Config(ErrorInfo::new(
                    "initial-sigma",
                    "sampling widths must be non-negative",
                )));
            }
            self.backend.validate(self.nstates, dim)?;
        }
        Ok(())
    }
}
