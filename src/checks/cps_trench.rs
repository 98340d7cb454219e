//! Duct CPS code against the category of each trench it runs along

use super::{geometry_of, CheckContext, Checker};
use crate::error::QaResult;
use crate::geometry::{bounding_rect, overlap_length, SpatialIndex};
use crate::report::{CheckReport, Finding, FindingKind, Severity};
use crate::rules::cps::{categories_compatible, normalize_code};
use crate::rules::names::{CANALISATION, TRANCHEE, TYPE_CPS, TYPE_TRANC};
use std::time::Instant;
use tracing::info;

const NAME: &str = "duct_trench_cps";

pub struct CpsTrenchChecker;

impl Checker for CpsTrenchChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, ctx: &CheckContext<'_>) -> QaResult<CheckReport> {
        let start = Instant::now();
        let ducts = ctx.project.require_layer(CANALISATION)?;
        let trenches = ctx.project.require_layer(TRANCHEE)?;
        let mut report = CheckReport::new(NAME);
        report.touch(&ducts.name);
        report.touch(&trenches.name);

        let trench_index = SpatialIndex::from_layer(trenches);
        let total = ducts.len();

        for (done, duct) in ducts.features().iter().enumerate() {
            ctx.checkpoint(NAME, done + 1, total)?;
            let Some(dg) = geometry_of(duct) else { continue };
            let Some(rect) = bounding_rect(dg) else { continue };
            let duct_code = normalize_code(duct.text(TYPE_CPS).as_deref());

            for tid in trench_index.query(&rect) {
                let Some(trench) = trenches.feature(tid) else { continue };
                let Some(tg) = geometry_of(trench) else { continue };
                if overlap_length(dg, tg) <= 0.0 {
                    continue;
                }
                let trench_code = normalize_code(trench.text(TYPE_TRANC).as_deref());
                if categories_compatible(&duct_code, &trench_code) {
                    continue;
                }
                report.push(
                    Finding::new(
                        Severity::Error,
                        FindingKind::CpsMismatch,
                        format!(
                            "Duct '{}' / trench '{}': {} does not match {}",
                            duct.label(),
                            trench.label(),
                            duct_code,
                            trench_code
                        ),
                    )
                    .feature(&ducts.name, duct.id)
                    .feature(&trenches.name, trench.id),
                );
            }
        }

        info!(
            "[Checks] {}: {} mismatch(es) in {:.2?}",
            NAME,
            report.findings.len(),
            start.elapsed()
        );
        Ok(report)
    }
}
