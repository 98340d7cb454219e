//! Mode fill of empty fillable attributes

use super::RemediationReport;
use crate::config::QaConfig;
use crate::error::QaResult;
use crate::model::{AttrValue, FeatureId, Layer, Project};
use crate::report::{CheckReport, FindingKind, Remediation};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::info;

/// Most frequent non-empty value of `field`, compared on trimmed text;
/// ties go to the value seen first. The value keeps its type, text is
/// returned trimmed.
fn mode(layer: &Layer, field: &str) -> Option<AttrValue> {
    let mut counts: IndexMap<String, (AttrValue, usize)> = IndexMap::new();
    for f in layer.features() {
        let value = f.attr(field);
        if value.is_missing() {
            continue;
        }
        let Some(key) = value.as_trimmed() else { continue };
        let typed = match value {
            AttrValue::Text(_) => AttrValue::Text(key.clone()),
            other => other.clone(),
        };
        counts.entry(key).or_insert((typed, 0)).1 += 1;
    }
    let mut best: Option<(&AttrValue, usize)> = None;
    for (value, count) in counts.values() {
        if best.map_or(true, |(_, c)| *count > c) {
            best = Some((value, *count));
        }
    }
    best.map(|(v, _)| v.clone())
}

/// Fill the fillable attributes the null-value report found empty
pub fn fill_missing(
    project: &mut Project,
    config: &QaConfig,
    null_report: &CheckReport,
) -> QaResult<RemediationReport> {
    let mut report = RemediationReport::new(Remediation::FillMissing);

    // layer -> fields to fill, in report order
    let mut targets: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for finding in null_report.of_kind(FindingKind::MissingValue) {
        let Some(field) = finding.attribute.as_deref() else { continue };
        if !config.null_values.fillable.iter().any(|f| f == field) {
            continue;
        }
        let Some(layer) = finding.features.first().map(|r| r.layer.clone()) else {
            continue;
        };
        let fields = targets.entry(layer).or_default();
        if !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
    }

    for (layer_name, fields) in targets {
        let Some(layer) = project.layer(&layer_name) else {
            report.warn(format!("layer '{}' not found", layer_name));
            continue;
        };
        let mut planned: Vec<(FeatureId, String, AttrValue)> = Vec::new();
        for field in &fields {
            let Some(value) = mode(layer, field) else {
                report.warn(format!(
                    "no value to fill '{}' with in '{}'",
                    field, layer_name
                ));
                continue;
            };
            for f in layer.features() {
                if f.attr(field).is_missing() {
                    planned.push((f.id, field.clone(), value.clone()));
                }
            }
        }

        let mut session = project.edit(&layer_name)?;
        for (fid, field, value) in planned {
            if let Err(e) = session.set_attribute(fid, &field, value) {
                report.fail(&layer_name, fid, e.to_string());
            }
        }
        let applied = session.commit();
        report.record_applied(&layer_name, applied);
    }

    info!(
        "[Remediation] fill_missing: {} value(s) filled",
        report.total_applied()
    );
    Ok(report)
}
