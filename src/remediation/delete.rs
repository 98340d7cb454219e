//! Deletion of phantom features

use super::RemediationReport;
use crate::checks::is_phantom;
use crate::error::QaResult;
use crate::model::{FeatureId, Project};
use crate::report::{CheckReport, Remediation};
use tracing::{debug, info};

/// Delete the features a phantom report selected. Each one is checked
/// again first: a feature repaired since the report is kept.
pub fn delete_phantoms(
    project: &mut Project,
    phantom_report: &CheckReport,
) -> QaResult<RemediationReport> {
    let mut report = RemediationReport::new(Remediation::DeletePhantoms);

    for (layer_name, ids) in phantom_report.selection.iter() {
        if ids.is_empty() {
            continue;
        }
        let Some(layer) = project.layer(layer_name) else {
            report.warn(format!("layer '{}' not found", layer_name));
            continue;
        };
        let doomed: Vec<FeatureId> = ids
            .iter()
            .copied()
            .filter(|&id| layer.feature(id).is_some_and(is_phantom))
            .collect();
        let kept = ids.len() - doomed.len();
        if kept > 0 {
            debug!(
                "[Remediation] {}: {} selected feature(s) no longer phantom or gone",
                layer_name, kept
            );
        }

        let mut session = project.edit(layer_name)?;
        for id in doomed {
            if let Err(e) = session.delete_feature(id) {
                report.fail(layer_name, id, e.to_string());
            }
        }
        let applied = session.commit();
        report.record_applied(layer_name, applied);
    }

    info!(
        "[Remediation] delete_phantoms: {} feature(s) deleted",
        report.total_applied()
    );
    Ok(report)
}
