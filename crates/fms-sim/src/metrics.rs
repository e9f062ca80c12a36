use std::fs;
use std::path::Path;

use fms_core::{BasisCollection, ErrorInfo, FmsError};
use serde::{Deserialize, Serialize};

/// Per-step observables of the basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMetrics {
    /// Step number, starting at 1.
    pub step: usize,
    /// Simulation time after the step.
    pub time: f64,
    /// Alive trajectories after the step.
    pub nalive: usize,
    /// Overlap condition number after the step.
    pub condition: f64,
    /// Wavefunction norm before renormalisation.
    pub norm: f64,
    /// Population per electronic state.
    pub populations: Vec<f64>,
    /// Whether the basis grew during the step.
    pub spawned: bool,
    /// Whether the basis was re-expressed during the step.
    pub reduced: bool,
}

impl StepMetrics {
    /// Snapshot of `basis` with rebuilt matrices.
    pub fn observe(
        step: usize,
        basis: &BasisCollection,
        spawned: bool,
        reduced: bool,
    ) -> Result<Self, FmsError> {
        Ok(Self {
            step,
            time: basis.time(),
            nalive: basis.nalive(),
            condition: basis.condition_number(),
            norm: basis.norm()?,
            populations: basis.populations()?,
            spawned,
            reduced,
        })
    }
}

/// Writes metrics as CSV with one `pop_<state>` column per electronic state.
pub fn write_metrics_csv(path: &Path, rows: &[StepMetrics], nstates: usize) -> Result<(), FmsError> {
    let csv_error = |code: &str, err: &dyn std::fmt::Display| {
        FmsError::Serde(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display()),
        )
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| csv_error("metrics-mkdir", &err))?;
        }
    }
    let mut writer = csv::Writer::from_path(path).map_err(|err| csv_error("metrics-open", &err))?;

    let mut header: Vec<String> = ["step", "time", "nalive", "condition", "norm"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    header.extend((0..nstates).map(|s| format!("pop_{s}")));
    header.push("spawned".into());
    header.push("reduced".into());
    writer
        .write_record(&header)
        .map_err(|err| csv_error("metrics-write", &err))?;

    for row in rows {
        let mut record = vec![
            row.step.to_string(),
            format!("{:.10}", row.time),
            row.nalive.to_string(),
            format!("{:.6e}", row.condition),
            format!("{:.12}", row.norm),
        ];
        record.extend((0..nstates).map(|s| {
            format!("{:.12}", row.populations.get(s).copied().unwrap_or(0.0))
        }));
        record.push(row.spawned.to_string());
        record.push(row.reduced.to_string());
        writer
            .write_record(&record)
            .map_err(|err| csv_error("metrics-write", &err))?;
    }
    writer.flush().map_err(|err| csv_error("metrics-flush", &err))
}
