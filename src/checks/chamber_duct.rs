//! Duct CPS code against the type of each chamber the duct touches

use super::{geometry_of, CheckContext, Checker};
use crate::error::QaResult;
use crate::geometry::{bounding_rect, touches, SpatialIndex};
use crate::report::{CheckReport, Finding, FindingKind, Severity};
use crate::rules::names::{CANALISATION, CHAMBRE, TYPE, TYPE_CPS};
use std::time::Instant;
use tracing::info;

const NAME: &str = "chamber_duct_cps";

pub struct ChamberDuctChecker;

impl Checker for ChamberDuctChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, ctx: &CheckContext<'_>) -> QaResult<CheckReport> {
        let start = Instant::now();
        let ducts = ctx.project.require_layer(CANALISATION)?;
        let chambers = ctx.project.require_layer(CHAMBRE)?;
        let mut report = CheckReport::new(NAME);
        report.touch(&ducts.name);
        report.touch(&chambers.name);

        let chamber_index = SpatialIndex::from_layer(chambers);
        let total = ducts.len();

        for (done, duct) in ducts.features().iter().enumerate() {
            ctx.checkpoint(NAME, done + 1, total)?;
            let Some(dg) = geometry_of(duct) else { continue };
            let Some(rect) = bounding_rect(dg) else { continue };
            let code = duct.attr(TYPE_CPS).as_trimmed().filter(|c| !c.is_empty());
            let allowed = code.as_deref().and_then(|c| ctx.rules.allowed_chambers(c));

            for cid in chamber_index.query(&rect) {
                let Some(chamber) = chambers.feature(cid) else { continue };
                let Some(cg) = geometry_of(chamber) else { continue };
                if !touches(dg, cg) {
                    continue;
                }
                let chamber_type = chamber.attr(TYPE).as_trimmed().unwrap_or_default();
                let code_text = code.as_deref().unwrap_or("NULL");

                let finding = match allowed {
                    Some(set) if set.contains(&chamber_type) => continue,
                    Some(_) => Finding::new(
                        Severity::Error,
                        FindingKind::IncompatibleChamber,
                        format!(
                            "{} does not fit {} ({} and {})",
                            code_text,
                            chamber_type,
                            chamber.label(),
                            duct.label()
                        ),
                    ),
                    None => Finding::new(
                        Severity::Error,
                        FindingKind::UnknownCode,
                        format!(
                            "{} ({}) -> {} ({}): unknown duct CPS type",
                            duct.label(),
                            code_text,
                            chamber.label(),
                            chamber_type
                        ),
                    )
                    .attribute(TYPE_CPS),
                };
                report.push(
                    finding
                        .feature(&ducts.name, duct.id)
                        .feature(&chambers.name, chamber.id),
                );
            }
        }

        info!(
            "[Checks] {}: {} invalid connection(s) in {:.2?}",
            NAME,
            report.findings.len(),
            start.elapsed()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QaConfig;
    use crate::model::{Feature, GeometryClass, Layer, LayerSchema, Project};
    use crate::rules::RuleTables;
    use geo::{line_string, point, Geometry};

    #[test]
    fn test_unknown_code_flags_both() {
        let project = Project::new()
            .with_layer(Layer::new(
                "Chambre",
                Some("Infrastructure"),
                GeometryClass::Point,
                LayerSchema::new(["NOM", "TYPE"]),
                vec![Feature::new(4, Some(Geometry::Point(point!(x: 1.0, y: 0.0)))).with_attr("TYPE", "PNS1")],
            ))
            .with_layer(Layer::new(
                "Canalisation",
                Some("Infrastructure"),
                GeometryClass::Line,
                LayerSchema::new(["NOM", "TYPE CPS"]),
                vec![Feature::new(
                    7,
                    Some(Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)])),
                )
                .with_attr("TYPE CPS", "CPS99")],
            ));
        let config = QaConfig::default();
        let rules = RuleTables::from_config(&config).unwrap();
        let report = ChamberDuctChecker
            .run(&CheckContext::new(&project, &config, &rules))
            .unwrap();
        assert_eq!(report.count(FindingKind::UnknownCode), 1);
        assert!(report.selection.contains("Canalisation", 7));
        assert!(report.selection.contains("Chambre", 4));
    }
}
