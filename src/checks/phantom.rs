//! Phantom features: null, empty or invalid geometry

use super::{CheckContext, Checker};
use crate::error::QaResult;
use crate::geometry::{is_empty, is_valid};
use crate::model::{Feature, FeatureId};
use crate::report::{CheckReport, Finding, FindingKind, Remediation, Severity};
use std::time::Instant;
use tracing::{debug, info};

const NAME: &str = "phantom_geometry";

pub struct PhantomChecker;

pub(crate) fn is_phantom(feature: &Feature) -> bool {
    match &feature.geometry {
        None => true,
        Some(g) => is_empty(g) || !is_valid(g),
    }
}

impl Checker for PhantomChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, ctx: &CheckContext<'_>) -> QaResult<CheckReport> {
        let start = Instant::now();
        let mut report = CheckReport::new(NAME);

        for name in &ctx.config.phantom_layers {
            let Some(layer) = ctx.project.layer(name) else {
                debug!("[Checks] {}: layer {} absent, skipped", NAME, name);
                continue;
            };
            report.touch(&layer.name);
            let bad: Vec<FeatureId> = layer
                .features()
                .iter()
                .filter(|f| is_phantom(f))
                .map(|f| f.id)
                .collect();
            if bad.is_empty() {
                continue;
            }
            report.push(
                Finding::new(
                    Severity::Error,
                    FindingKind::PhantomGeometry,
                    format!("{} phantom feature(s) in {}", bad.len(), layer.name),
                )
                .features(&layer.name, bad),
            );
        }

        if !report.is_clean() {
            report.remediation = Some(Remediation::DeletePhantoms);
        }
        info!(
            "[Checks] {}: {} phantom feature(s) in {:.2?}",
            NAME,
            report.selection.total(),
            start.elapsed()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, Geometry, LineString};

    #[test]
    fn test_phantom_predicate() {
        assert!(is_phantom(&Feature::new(1, None)));
        assert!(is_phantom(&Feature::new(2, Some(Geometry::LineString(LineString::new(vec![]))))));
        assert!(is_phantom(&Feature::new(3, Some(Geometry::Point(point!(x: f64::INFINITY, y: 0.0))))));
        assert!(!is_phantom(&Feature::new(4, Some(Geometry::Point(point!(x: 1.0, y: 0.0))))));
    }
}
