//! # Errors and Diagnostics
//!
//! Hard failures are reported through [`BpgaError`]. Everything the pipeline
//! can recover from (dangling links, malformed lines, unknown nodes) is
//! recorded as a [`Diagnostic`] instead and never stops the analysis.

use serde::Serialize;

/// Errors raised by the analyzer pipeline
#[derive(Debug, thiserror::Error)]
pub enum BpgaError {
    #[error("Input contains no Blueprint objects")]
    EmptyInput,

    #[error("Cannot leave the root scope")]
    ScopeUnderflow,

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BpgaError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A recoverable problem, attached to the nearest node when one is known
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_guid: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(node_guid: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            node_guid: node_guid.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn error(node_guid: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            node_guid: node_guid.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn info(node_guid: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            node_guid: node_guid.map(str::to_string),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.node_guid {
            Some(guid) => write!(f, "{}: {} (node {})", level, self.message, guid),
            None => write!(f, "{}: {}", level, self.message),
        }
    }
}
