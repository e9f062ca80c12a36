use std::fs;
use std::path::{Path, PathBuf};

use fms_core::{BasisCollection, ErrorInfo, FmsError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::SimConfig;

/// Provenance record written next to the run artefacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: SimConfig,
    /// Master seed of initial-condition sampling.
    pub master_seed: u64,
    /// Seed label copied from the configuration.
    pub seed_label: Option<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Crate version that produced the run.
    pub version: String,
    /// SHA-256 of the final basis snapshot.
    pub basis_hash: String,
    /// Metrics file relative to the run directory.
    pub metrics_file: PathBuf,
    /// Summary file relative to the run directory.
    pub summary_file: PathBuf,
    /// Final basis snapshot relative to the run directory.
    pub basis_file: PathBuf,
}

impl RunManifest {
    /// Builds the manifest for a finished run.
    pub fn new(config: &SimConfig, basis: &BasisCollection) -> Result<Self, FmsError> {
        Ok(Self {
            master_seed: config.seed_policy.master_seed,
            seed_label: config.seed_policy.label.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            basis_hash: hash_basis(basis)?,
            metrics_file: config.output.metrics_file.clone(),
            summary_file: config.output.summary_file.clone(),
            basis_file: config.output.basis_file.clone(),
            config: config.clone(),
        })
    }

    /// Writes the manifest as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<(), FmsError> {
        write_json(path, self)
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, FmsError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            FmsError::Serde(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            FmsError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }
}

/// Hex SHA-256 of the canonical JSON encoding of `basis`.
pub fn hash_basis(basis: &BasisCollection) -> Result<String, FmsError> {
    let json = serde_json::to_vec(basis)
        .map_err(|err| FmsError::Serde(ErrorInfo::new("basis-serialize", err.to_string())))?;
    let mut hasher = Sha256::new();
    hasher.update(json);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Serialises `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), FmsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                FmsError::Serde(
                    ErrorInfo::new("output-mkdir", err.to_string())
                        .with_context("path", parent.display()),
                )
            })?;
        }
    }
    let json = serde_json::to_string_pretty(value).map_err(|err| {
        FmsError::Serde(
            ErrorInfo::new("output-serialize", err.to_string())
                .with_context("path", path.display()),
        )
    })?;
    fs::write(path, json).map_err(|err| {
        FmsError::Serde(
            ErrorInfo::new("output-write", err.to_string()).with_context("path", path.display()),
        )
    })
}
