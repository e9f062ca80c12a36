use std::path::Path;

use fms_core::{BasisCollection, FmsError};

use crate::config::SimConfig;
use crate::driver::RunSummary;
use crate::manifest::{write_json, RunManifest};
use crate::metrics::write_metrics_csv;

/// Writes metrics, summary, final basis and manifest into `out_dir`.
pub fn write_run_directory(
    out_dir: &Path,
    config: &SimConfig,
    summary: &RunSummary,
    basis: &BasisCollection,
) -> Result<RunManifest, FmsError> {
    let output = &config.output;
    write_metrics_csv(
        &out_dir.join(&output.metrics_file),
        &summary.metrics,
        config.nstates,
    )?;
    write_json(&out_dir.join(&output.summary_file), summary)?;
    write_json(&out_dir.join(&output.basis_file), basis)?;

    let manifest = RunManifest::new(config, basis)?;
    manifest.write(&out_dir.join(&output.manifest_file))?;
    log::info!("run artefacts written to {}", out_dir.display());
    Ok(manifest)
}
