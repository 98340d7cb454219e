//! Ducts must run inside trenches, and trenches must carry ducts
//!
//! Each duct must be covered by the union of the trenches whose bounding
//! box meets it, and symmetrically for trenches against ducts.

use super::{geometry_of, CheckContext, Checker};
use crate::error::QaResult;
use crate::geometry::{bounding_rect, covered_by_union, SpatialIndex};
use crate::model::{FeatureId, Layer};
use crate::report::{CheckReport, Finding, FindingKind, Severity};
use crate::rules::names::{CANALISATION, TRANCHEE};
use std::time::Instant;
use tracing::info;

const NAME: &str = "duct_trench_containment";

pub struct ContainmentChecker;

/// Features of `inner` not covered by the union of nearby `outer` features
fn uncovered(
    ctx: &CheckContext<'_>,
    inner: &Layer,
    outer: &Layer,
    outer_index: &SpatialIndex,
) -> QaResult<Vec<FeatureId>> {
    let mut bad = Vec::new();
    let total = inner.len();
    for (done, f) in inner.features().iter().enumerate() {
        ctx.checkpoint(NAME, done + 1, total)?;
        let Some(g) = geometry_of(f) else { continue };
        let Some(rect) = bounding_rect(g) else { continue };
        let covers: Vec<_> = outer_index
            .query(&rect)
            .into_iter()
            .filter_map(|id| outer.feature(id).and_then(geometry_of))
            .collect();
        if !covered_by_union(g, &covers) {
            bad.push(f.id);
        }
    }
    Ok(bad)
}

impl Checker for ContainmentChecker {
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

        let duct_index = SpatialIndex::from_layer(ducts);
        let trench_index = SpatialIndex::from_layer(trenches);

        let outside = uncovered(ctx, ducts, trenches, &trench_index)?;
        let excess = uncovered(ctx, trenches, ducts, &duct_index)?;

        for id in &outside {
            let label = ducts.feature(*id).map(|f| f.label()).unwrap_or_default();
            report.push(
                Finding::new(
                    Severity::Error,
                    FindingKind::OutsideTrench,
                    format!("Duct '{}' lies partly or wholly outside trenches", label),
                )
                .feature(&ducts.name, *id),
            );
        }
        for id in &excess {
            let label = trenches.feature(*id).map(|f| f.label()).unwrap_or_default();
            report.push(
                Finding::new(
                    Severity::Error,
                    FindingKind::ExcessTrench,
                    format!("Trench '{}' extends beyond its ducts", label),
                )
                .feature(&trenches.name, *id),
            );
        }

        info!(
            "[Checks] {}: {} duct(s) outside trenches, {} trench(es) in excess in {:.2?}",
            NAME,
            outside.len(),
            excess.len(),
            start.elapsed()
        );
        Ok(report)
    }
}
