use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`BenchError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (sample indices, lengths, etc.).
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

/// Canonical error type for attribution benchmarks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum BenchError {
    /// Unrecognised modes, empty inputs and malformed plans.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(ErrorInfo),
    /// Disagreement between attribution, sample, mask and masker shapes.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(ErrorInfo),
    /// Failures raised by model, masker or explainer callables.
    #[error("external call failed: {0}")]
    External(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Filesystem access errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
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

impl BenchError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            BenchError::InvalidConfiguration(info)
            | BenchError::ShapeMismatch(info)
            | BenchError::External(info)
            | BenchError::Serde(info)
            | BenchError::Io(info) => info,
        }
    }

    /// Shorthand for an [`BenchError::InvalidConfiguration`] with no context.
    pub fn invalid(code: &str, message: impl Into<String>) -> Self {
        BenchError::InvalidConfiguration(ErrorInfo::new(code, message))
    }

    /// Shorthand for an [`BenchError::External`] with no context.
    pub fn external(code: &str, message: impl Into<String>) -> Self {
        BenchError::External(ErrorInfo::new(code, message))
    }

    /// Builds a shape mismatch describing an expected and an observed length.
    pub fn shape(code: &str, what: &str, expected: usize, actual: usize) -> Self {
        BenchError::ShapeMismatch(
            ErrorInfo::new(code, format!("{what} has length {actual}, expected {expected}"))
                .with_context("expected", expected)
                .with_context("actual", actual),
        )
    }
}
