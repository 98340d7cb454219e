//! Error types for the QA engine
//!
//! Data-quality problems are not errors: they are reported as findings.
//! `QaError` covers missing prerequisites, bad configuration, cancelled runs
//! and failures of the underlying store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QaError {
    #[error("layer '{0}' not found in project")]
    MissingLayer(String),

    #[error("group '{0}' not found in project")]
    MissingGroup(String),

    #[error("unknown group '{0}'")]
    UnknownGroup(String),

    #[error("layer '{layer}' has no field '{field}'")]
    MissingField { layer: String, field: String },

    #[error("layer '{layer}' has no feature {id}")]
    MissingFeature { layer: String, id: u64 },

    #[error("invalid rule table: {0}")]
    InvalidRuleTable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("run cancelled")]
    Cancelled,

    #[error("edit on layer '{layer}' failed: {reason}")]
    Edit { layer: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type QaResult<T> = Result<T, QaError>;
