use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// File-level failures. These are the only errors that abort a compile.
#[derive(Debug, Error)]
pub enum PpdExtError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Watch error: {0}")]
    Watch(String),
}

pub type Result<T> = std::result::Result<T, PpdExtError>;

/// Why a single PPDE line was dropped.
///
/// Line errors never abort a compile: the offending line is logged,
/// recorded as a diagnostic and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum LineError {
    /// Token count or keyword shape matches no directive.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// An attribute or choice that no known table holds.
    #[error("unknown reference: {0}")]
    Reference(String),

    /// A numeric or enumerated field failed validation.
    #[error("invalid value: {0}")]
    Value(String),
}

impl LineError {
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::Syntax(msg.into())
    }

    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference(msg.into())
    }

    pub fn value(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }
}
