use fms_core::{ErrorInfo, FmsError, DEFAULT_RCOND};
use serde::{Deserialize, Serialize};

/// Thresholds governing basis re-expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionConfig {
    /// Overlap condition number above which the basis is re-expressed.
    #[serde(default = "default_condition_threshold")]
    pub condition_threshold: f64,
    /// Fidelity-loss threshold `gamma` ending the pursuit.
    #[serde(default = "default_fidelity_threshold")]
    pub fidelity_threshold: f64,
    /// Relative singular-value cut-off for the coefficient fit.
    #[serde(default = "default_pinv_rcond")]
    pub pinv_rcond: f64,
}

fn default_condition_threshold() -> f64 {
    1e7
}

fn default_fidelity_threshold() -> f64 {
    1e-4
}

fn default_pinv_rcond() -> f64 {
    DEFAULT_RCOND
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            condition_threshold: default_condition_threshold(),
            fidelity_threshold: default_fidelity_threshold(),
            pinv_rcond: default_pinv_rcond(),
        }
    }
}

impl ReductionConfig {
    /// Rejects non-finite or non-positive thresholds.
    pub fn validate(&self) -> Result<(), FmsError> {
        let fields = [
            ("condition_threshold", self.condition_threshold),
            ("fidelity_threshold", self.fidelity_threshold),
            ("pinv_rcond", self.pinv_rcond),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(FmsError::Config(
                    ErrorInfo::new("reduction-threshold", "threshold must be finite and positive")
                        .with_context("field", name)
                        .with_context("value", value),
                ));
            }
        }
        Ok(())
    }
}
