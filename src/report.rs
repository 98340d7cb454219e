//! Check results: findings, per-layer selections and text rendering
//!
//! Checkers never touch the project's selection themselves. They return a
//! `CheckReport`; the caller applies its `Selection` to the project.

use crate::model::FeatureId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// What a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    ExactDuplicate,
    ForbiddenOverlap,
    TotalOverlap,
    PartialOverlap,
    MinDistance,
    DuplicateName,
    DuplicateId,
    MissingValue,
    PhantomGeometry,
    UnconnectedEndpoint,
    IsolatedPoint,
    OutsideTrench,
    ExcessTrench,
    DuctTypeMismatch,
    UnknownConnection,
    SupportTypeMismatch,
    UnknownSupportType,
    SupportNotAerial,
    IncompatibleChamber,
    UnknownCode,
    CpsMismatch,
    ChamberFunction,
}

/// A feature implicated by a finding
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureRef {
    pub layer: String,
    pub id: FeatureId,
}

impl FeatureRef {
    pub fn new(layer: &str, id: FeatureId) -> Self {
        Self {
            layer: layer.to_string(),
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    pub features: Vec<FeatureRef>,
}

impl Finding {
    pub fn new(severity: Severity, kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            attribute: None,
            features: Vec::new(),
        }
    }

    pub fn feature(mut self, layer: &str, id: FeatureId) -> Self {
        self.features.push(FeatureRef::new(layer, id));
        self
    }

    pub fn features(mut self, layer: &str, ids: impl IntoIterator<Item = FeatureId>) -> Self {
        self.features
            .extend(ids.into_iter().map(|id| FeatureRef::new(layer, id)));
        self
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.attribute = Some(name.to_string());
        self
    }
}

/// Flagged ids per layer. A layer present with an empty set is still
/// "touched": applying the selection clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    layers: BTreeMap<String, BTreeSet<FeatureId>>,
}

impl Selection {
    pub fn touch(&mut self, layer: &str) {
        self.layers.entry(layer.to_string()).or_default();
    }

    pub fn flag(&mut self, layer: &str, id: FeatureId) {
        self.layers.entry(layer.to_string()).or_default().insert(id);
    }

    pub fn ids(&self, layer: &str) -> Option<&BTreeSet<FeatureId>> {
        self.layers.get(layer)
    }

    pub fn contains(&self, layer: &str, id: FeatureId) -> bool {
        self.layers.get(layer).is_some_and(|ids| ids.contains(&id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<FeatureId>)> {
        self.layers.iter()
    }

    /// Number of flagged features over all layers
    pub fn total(&self) -> usize {
        self.layers.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn merge(&mut self, other: &Selection) {
        for (layer, ids) in &other.layers {
            self.layers
                .entry(layer.clone())
                .or_default()
                .extend(ids.iter().copied());
        }
    }
}

/// Follow-up data mutation a report makes available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remediation {
    RenameAll,
    FillMissing,
    DeletePhantoms,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub checker: String,
    pub findings: Vec<Finding>,
    pub selection: Selection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<Remediation>,
}

impl CheckReport {
    pub fn new(checker: &str) -> Self {
        Self {
            checker: checker.to_string(),
            findings: Vec::new(),
            selection: Selection::default(),
            remediation: None,
        }
    }

    /// Mark a layer as inspected so its previous selection gets replaced
    pub fn touch(&mut self, layer: &str) {
        self.selection.touch(layer);
    }

    /// Record a finding and select the features it implicates
    pub fn push(&mut self, finding: Finding) {
        for f in &finding.features {
            self.selection.flag(&f.layer, f.id);
        }
        self.findings.push(finding);
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }

    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    /// Human-readable summary, one finding per line
    pub fn render_text(&self) -> String {
        if self.findings.is_empty() {
            return format!("{}: no problem detected", self.checker);
        }
        let mut out = format!(
            "{}: {} finding(s), {} feature(s) selected\n",
            self.checker,
            self.findings.len(),
            self.selection.total()
        );
        for finding in &self.findings {
            let _ = writeln!(out, "[{}] {}", finding.severity.as_str(), finding.message);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_dedups_selected_ids() {
        let mut report = CheckReport::new("test");
        report.push(
            Finding::new(Severity::Error, FindingKind::CpsMismatch, "a")
                .feature("Canalisation", 1)
                .feature("Tranchee", 4),
        );
        report.push(
            Finding::new(Severity::Error, FindingKind::CpsMismatch, "a")
                .feature("Canalisation", 1)
                .feature("Tranchee", 5),
        );
        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.selection.ids("Canalisation").unwrap().len(), 1);
        assert_eq!(report.selection.total(), 3);
    }

    #[test]
    fn test_render_clean_report() {
        let report = CheckReport::new("phantom_geometry");
        assert!(report.is_clean());
        assert!(report.render_text().contains("no problem"));
    }
}
