//! Chamber FONCTION from the number of distribution ducts ending in it
//!
//! Departure chambers are exempt. Candidate ducts come from a buffered
//! bounding box around the chamber; a duct counts when its TYPE CANAL is
//! "Distribution" and one of its ends lies in the chamber geometry.

use super::{geometry_of, CheckContext, Checker};
use crate::error::QaResult;
use crate::geometry::{buffered_rect, endpoints, intersects, point_geometry, SpatialIndex};
use crate::model::FeatureId;
use crate::report::{CheckReport, Finding, FindingKind, Severity};
use crate::rules::chamber::{expected_function, DEPART};
use crate::rules::duct_type::DISTRIBUTION;
use crate::rules::names::{CANALISATION, CHAMBRE, FONCTION, TYPE_CANAL};
use std::time::Instant;
use tracing::info;

const NAME: &str = "chamber_function";

pub struct ChamberFunctionChecker;

impl Checker for ChamberFunctionChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, ctx: &CheckContext<'_>) -> QaResult<CheckReport> {
        let start = Instant::now();
        let chambers = ctx.project.require_layer(CHAMBRE)?;
        let ducts = ctx.project.require_layer(CANALISATION)?;
        let mut report = CheckReport::new(NAME);
        report.touch(&chambers.name);
        report.touch(&ducts.name);

        let duct_index = SpatialIndex::from_layer(ducts);
        let buffer = ctx.config.chamber_function_buffer;
        let total = chambers.len();

        for (done, chamber) in chambers.features().iter().enumerate() {
            ctx.checkpoint(NAME, done + 1, total)?;
            let current = chamber.attr(FONCTION).as_trimmed();
            if current.as_deref() == Some(DEPART) {
                continue;
            }
            let Some(cg) = geometry_of(chamber) else { continue };
            let Some(rect) = buffered_rect(cg, buffer) else { continue };

            let connected: Vec<FeatureId> = duct_index
                .query(&rect)
                .into_iter()
                .filter_map(|id| ducts.feature(id))
                .filter(|d| d.attr(TYPE_CANAL).as_trimmed().as_deref() == Some(DISTRIBUTION))
                .filter(|d| {
                    geometry_of(d).and_then(endpoints).is_some_and(|(a, b)| {
                        intersects(cg, &point_geometry(a)) || intersects(cg, &point_geometry(b))
                    })
                })
                .map(|d| d.id)
                .collect();

            let Some(expected) = expected_function(connected.len()) else {
                continue;
            };
            if current.as_deref() == Some(expected) {
                continue;
            }
            report.push(
                Finding::new(
                    Severity::Error,
                    FindingKind::ChamberFunction,
                    format!(
                        "Chamber '{}' has FONCTION '{}' but should be '{}' ({} distribution duct(s))",
                        chamber.name().unwrap_or_else(|| "(no NOM)".to_string()),
                        current.as_deref().unwrap_or("NULL"),
                        expected,
                        connected.len()
                    ),
                )
                .attribute(FONCTION)
                .feature(&chambers.name, chamber.id)
                .features(&ducts.name, connected),
            );
        }

        info!(
            "[Checks] {}: {} chamber(s) with a wrong function in {:.2?}",
            NAME,
            report.findings.len(),
            start.elapsed()
        );
        Ok(report)
    }
}
