//! Data fixes offered after a check
//!
//! Each action runs per layer inside an edit session. A failure on one
//! feature is recorded and selected for follow-up; the layer still commits
//! the edits that succeeded, and other layers are unaffected.
//!
//! # Submodules
//! - `rename` - Zone-based renaming of points and endpoint-based renaming of lines
//! - `fill` - Most-frequent-value fill of empty fillable attributes
//! - `delete` - Deletion of phantom features

mod delete;
mod fill;
mod rename;

pub use delete::delete_phantoms;
pub use fill::fill_missing;
pub use rename::{rename_all, CONNECTION_FIELDS, LINE_PREFIXES, POINT_PREFIXES};

use crate::model::FeatureId;
use crate::report::{Remediation, Selection};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemediationReport {
    pub action: Remediation,
    /// Committed edits per layer
    pub applied: BTreeMap<String, usize>,
    /// Features left for manual follow-up
    pub failed: Selection,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl RemediationReport {
    pub fn new(action: Remediation) -> Self {
        Self {
            action,
            applied: BTreeMap::new(),
            failed: Selection::default(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn record_applied(&mut self, layer: &str, count: usize) {
        *self.applied.entry(layer.to_string()).or_default() += count;
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("[Remediation] {}", message);
        self.warnings.push(message);
    }

    pub fn fail(&mut self, layer: &str, id: FeatureId, message: impl Into<String>) {
        self.failed.flag(layer, id);
        self.errors.push(message.into());
    }

    pub fn total_applied(&self) -> usize {
        self.applied.values().sum()
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
