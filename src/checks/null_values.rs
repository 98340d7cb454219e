//! Empty attribute values in the infrastructure group
//!
//! A value is empty when null, blank, or the text "null" in any case. The
//! exempt layer may leave its exempt fields empty. One finding per
//! (layer, field) carries the field name and the features missing it.

use super::{CheckContext, Checker};
use crate::error::QaResult;
use crate::model::FeatureId;
use crate::report::{CheckReport, Finding, FindingKind, Remediation, Severity};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::info;

const NAME: &str = "null_values";

pub struct NullValuesChecker;

impl Checker for NullValuesChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, ctx: &CheckContext<'_>) -> QaResult<CheckReport> {
        let start = Instant::now();
        let settings = &ctx.config.null_values;
        let layers = ctx.project.group_layers(&ctx.config.infrastructure_group)?;
        let mut report = CheckReport::new(NAME);
        let mut incomplete: BTreeSet<(String, FeatureId)> = BTreeSet::new();
        let mut fillable_missing = false;

        for layer in layers {
            report.touch(&layer.name);
            let exempt_layer = layer.name.eq_ignore_ascii_case(&settings.exempt_layer);
            let checked: Vec<&str> = layer
                .schema
                .fields()
                .iter()
                .map(String::as_str)
                .filter(|field| !(exempt_layer && settings.exempt_fields.iter().any(|e| e == field)))
                .collect();

            let mut missing: IndexMap<&str, Vec<FeatureId>> = IndexMap::new();
            for f in layer.features() {
                for &field in &checked {
                    if f.attr(field).is_missing() {
                        missing.entry(field).or_default().push(f.id);
                        incomplete.insert((layer.name.clone(), f.id));
                    }
                }
            }

            for (field, ids) in missing {
                if settings.fillable.iter().any(|f| f == field) {
                    fillable_missing = true;
                }
                report.push(
                    Finding::new(
                        Severity::Warning,
                        FindingKind::MissingValue,
                        format!("{}: {} missing on {} feature(s)", layer.name, field, ids.len()),
                    )
                    .attribute(field)
                    .features(&layer.name, ids),
                );
            }
        }

        if fillable_missing {
            report.remediation = Some(Remediation::FillMissing);
        }
        info!(
            "[Checks] {}: {} incomplete feature(s) in {:.2?}",
            NAME,
            incomplete.len(),
            start.elapsed()
        );
        Ok(report)
    }
}
