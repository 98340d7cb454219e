//! Support TYPE against the technical points and poles at its ends
//!
//! End points are matched by exact coordinate equality, not tolerance.
//! On top of the per-type rule, any support running from a pole to a
//! technical point must be declared aerial.

use super::{CheckContext, Checker};
use crate::error::QaResult;
use crate::geometry::{endpoints, exact_key, is_present, point_coord};
use crate::model::{Feature, Layer};
use crate::report::{CheckReport, Finding, FindingKind, Severity};
use crate::rules::names::{POINT_TECHNIQUE, POTEAU, SUPPORT, TYPE};
use crate::rules::support::{support_rule, SupportRequirement, AERIEN};
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

const NAME: &str = "support_type";

pub struct SupportTypeChecker;

type ExactPoints<'a> = HashMap<(u64, u64), &'a Feature>;

/// Point features keyed by exact coordinate; the lowest id wins
fn exact_points(layer: &Layer) -> ExactPoints<'_> {
    let mut map = ExactPoints::new();
    for f in layer.features() {
        if let Some(c) = f.geometry.as_ref().and_then(point_coord) {
            map.entry(exact_key(c)).or_insert(f);
        }
    }
    map
}

fn type_contains(layer_has_type: bool, feature: Option<&Feature>, keyword: &str) -> bool {
    layer_has_type
        && feature
            .and_then(|f| f.text(TYPE))
            .is_some_and(|t| t.to_lowercase().contains(keyword))
}

impl Checker for SupportTypeChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, ctx: &CheckContext<'_>) -> QaResult<CheckReport> {
        let start = Instant::now();
        let supports = ctx.project.require_layer(SUPPORT)?;
        let technical = ctx.project.require_layer(POINT_TECHNIQUE)?;
        let poles = ctx.project.require_layer(POTEAU)?;

        let mut report = CheckReport::new(NAME);
        report.touch(&supports.name);

        let technical_at = exact_points(technical);
        let poles_at = exact_points(poles);
        let typed = technical.schema.has(TYPE);

        let total = supports.len();
        for (done, f) in supports.features().iter().enumerate() {
            ctx.checkpoint(NAME, done + 1, total)?;
            let Some((a, b)) = f
                .geometry
                .as_ref()
                .filter(|g| is_present(g))
                .and_then(endpoints)
            else {
                continue;
            };
            let (ka, kb) = (exact_key(a), exact_key(b));
            let pt1 = technical_at.get(&ka).copied();
            let pt2 = technical_at.get(&kb).copied();
            let pot1 = poles_at.get(&ka).is_some();
            let pot2 = poles_at.get(&kb).is_some();

            let name = f.label();
            let written = f.attr(TYPE).as_trimmed().unwrap_or_default();
            let declared = written.to_lowercase();

            match support_rule(&written) {
                Some(SupportRequirement::TechnicalPoints(keyword)) => {
                    if !(type_contains(typed, pt1, keyword) && type_contains(typed, pt2, keyword)) {
                        report.push(
                            Finding::new(
                                Severity::Error,
                                FindingKind::SupportTypeMismatch,
                                format!(
                                    "Support '{}' is of type '{}' but does not join two '{}' technical points",
                                    name, written, keyword
                                ),
                            )
                            .feature(&supports.name, f.id),
                        );
                    }
                }
                Some(SupportRequirement::Aerial) => {
                    let ok = (pot1 && pot2) || (pot1 && pt2.is_some()) || (pot2 && pt1.is_some());
                    if !ok {
                        report.push(
                            Finding::new(
                                Severity::Error,
                                FindingKind::SupportTypeMismatch,
                                format!(
                                    "Support '{}' is aerial but joins neither two poles nor a pole and a technical point",
                                    name
                                ),
                            )
                            .feature(&supports.name, f.id),
                        );
                    }
                }
                None => report.push(
                    Finding::new(
                        Severity::Warning,
                        FindingKind::UnknownSupportType,
                        format!("Support '{}' has an unknown type '{}'", name, written),
                    )
                    .feature(&supports.name, f.id),
                ),
            }

            let pole_to_technical = (pot1 && pt2.is_some()) || (pot2 && pt1.is_some());
            if pole_to_technical && declared != AERIEN {
                report.push(
                    Finding::new(
                        Severity::Error,
                        FindingKind::SupportNotAerial,
                        format!(
                            "Support '{}' runs from a pole to a technical point but is not of type '{}'",
                            name, AERIEN
                        ),
                    )
                    .feature(&supports.name, f.id),
                );
            }
        }

        info!(
            "[Checks] {}: {} faulty support(s) in {:.2?}",
            NAME,
            report.selection.total(),
            start.elapsed()
        );
        Ok(report)
    }
}
