#![deny(missing_docs)]

//! Simulation driver for FMS trajectory-basis dynamics: configuration,
//! initial conditions, the step loop and run artefacts.

/// YAML configuration schema and defaults.
pub mod config;
/// Step loop alternating re-expression, spawning and propagation.
pub mod driver;
/// Initial basis sampling and snapshot restore.
pub mod initial;
/// Run manifest and basis hashing.
pub mod manifest;
/// Per-step metrics and CSV export.
pub mod metrics;
/// Run directory layout.
pub mod output;

pub use config::{InitialConditions, OutputConfig, SeedPolicy, SimConfig};
pub use driver::{run, RunSummary, Simulation};
pub use initial::initial_basis;
pub use manifest::{hash_basis, RunManifest};
pub use metrics::{write_metrics_csv, StepMetrics};
pub use output::write_run_directory;
