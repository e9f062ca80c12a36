//! Structured error types shared across FMS crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`FmsError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (slot indices, norms, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the FMS engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum FmsError {
    /// The basis cannot be normalised (zero, negative or non-finite norm, stale overlap).
    #[error("degenerate basis: {0}")]
    DegenerateBasis(ErrorInfo),
    /// An algorithmic invariant was broken.
    #[error("invariant violation: {0}")]
    InvariantViolation(ErrorInfo),
    /// A slot handle was unknown or in the wrong state for the operation.
    #[error("slot error: {0}")]
    Slot(ErrorInfo),
    /// The propagator could not advance a trajectory.
    #[error("propagation error: {0}")]
    Propagation(ErrorInfo),
    /// Configuration values are missing or out of range.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization, schema and I/O errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl FmsError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            FmsError::DegenerateBasis(info)
            | FmsError::InvariantViolation(info)
            | FmsError::Slot(info)
            | FmsError::Propagation(info)
            | FmsError::Config(info)
            | FmsError::Serde(info) => info,
        }
    }

    /// Whether the outer driver must abandon the current simulation step.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FmsError::DegenerateBasis(_) | FmsError::InvariantViolation(_)
        )
    }
}
