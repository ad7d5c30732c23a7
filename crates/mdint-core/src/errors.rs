//! Structured error types shared across mdint crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`IntegratorError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (parameter names, offending values, etc.).
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
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for integrator construction and configuration.
///
/// Errors are only ever raised while building an integrator or loading its
/// configuration. Stepping never fails: non-finite energies inside a
/// Metropolis trial are a defined outcome (forced rejection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum IntegratorError {
    /// Splitting string is malformed.
    #[error("invalid scheme: {0}")]
    InvalidScheme(ErrorInfo),
    /// Construction parameter is out of its physical range.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// Serialization, parsing and file errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Statistical estimator could not be evaluated on the supplied data.
    #[error("statistics error: {0}")]
    Statistics(ErrorInfo),
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

impl IntegratorError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            IntegratorError::InvalidScheme(info)
            | IntegratorError::Configuration(info)
            | IntegratorError::Serde(info)
            | IntegratorError::Statistics(info) => info,
        }
    }

    /// Shorthand for a [`IntegratorError::Configuration`] naming the offending parameter.
    pub fn configuration(
        code: impl Into<String>,
        parameter: &str,
        value: impl Display,
        message: impl Into<String>,
    ) -> Self {
        IntegratorError::Configuration(
            ErrorInfo::new(code, message)
                .with_context("parameter", parameter)
                .with_context("value", value.to_string()),
        )
    }
}
