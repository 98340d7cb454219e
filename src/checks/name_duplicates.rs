//! Repeated NOM and business id values within a layer

use super::{CheckContext, Checker};
use crate::error::QaResult;
use crate::model::{FeatureId, Layer};
use crate::report::{CheckReport, Finding, FindingKind, Remediation, Severity};
use crate::rules::names::NOM;
use indexmap::IndexMap;
use std::time::Instant;
use tracing::info;

const NAME: &str = "name_duplicates";

/// Business id field names, first present wins
const ID_CANDIDATES: [&str; 3] = ["id", "ID", "Id"];

pub struct NameDuplicatesChecker;

/// Feature ids per trimmed value of `field`, nulls skipped
fn group_by_value(layer: &Layer, field: &str) -> IndexMap<String, Vec<FeatureId>> {
    let mut groups: IndexMap<String, Vec<FeatureId>> = IndexMap::new();
    for f in layer.features() {
        if let Some(value) = f.attr(field).as_trimmed() {
            groups.entry(value).or_default().push(f.id);
        }
    }
    groups
}

fn report_duplicates(
    layer: &Layer,
    field: &str,
    kind: FindingKind,
    report: &mut CheckReport,
) {
    for (value, ids) in group_by_value(layer, field) {
        if ids.len() < 2 {
            continue;
        }
        report.push(
            Finding::new(
                Severity::Error,
                kind,
                format!("'{}' x{} in {} ({})", value, ids.len(), layer.name, field),
            )
            .attribute(field)
            .features(&layer.name, ids),
        );
    }
}

impl Checker for NameDuplicatesChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, ctx: &CheckContext<'_>) -> QaResult<CheckReport> {
        let start = Instant::now();
        let mut report = CheckReport::new(NAME);

        for layer in ctx.project.layers() {
            let has_nom = layer.schema.has(NOM);
            let id_field = ID_CANDIDATES.into_iter().find(|c| layer.schema.has(c));
            if !has_nom && id_field.is_none() {
                continue;
            }
            report.touch(&layer.name);
            if has_nom {
                report_duplicates(layer, NOM, FindingKind::DuplicateName, &mut report);
            }
            if let Some(field) = id_field {
                report_duplicates(layer, field, FindingKind::DuplicateId, &mut report);
            }
        }

        if !report.is_clean() {
            report.remediation = Some(Remediation::RenameAll);
        }
        info!(
            "[Checks] {}: {} duplicated feature(s) in {:.2?}",
            NAME,
            report.selection.total(),
            start.elapsed()
        );
        Ok(report)
    }
}
