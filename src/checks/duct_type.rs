//! TYPE CANAL of each duct against the entities found at its two ends

use super::{geometry_of, CheckContext, Checker};
use crate::error::QaResult;
use crate::geometry::{endpoints, intersects, point_geometry, SpatialIndex};
use crate::model::Layer;
use crate::report::{CheckReport, Finding, FindingKind, Severity};
use crate::rules::duct_type::{expected_duct_category, Endpoint, EntityKind, CONNECTION_PRIORITY};
use crate::rules::names::{CANALISATION, SITE, TYPE, TYPE_CANAL};
use geo::Coord;
use std::time::Instant;
use tracing::info;

const NAME: &str = "duct_type";

pub struct DuctTypeChecker;

/// A connection layer with its index, in priority order
struct Connection<'a> {
    kind: EntityKind,
    layer: &'a Layer,
    index: SpatialIndex,
}

/// Entity at a duct end: the first layer in priority order with a feature
/// intersecting the point, lowest id first
fn resolve(c: Coord<f64>, connections: &[Connection]) -> Endpoint {
    let point = point_geometry(c);
    for conn in connections {
        let hit = conn
            .index
            .query_around(c, 0.0)
            .into_iter()
            .filter_map(|id| conn.layer.feature(id))
            .find(|f| geometry_of(f).is_some_and(|g| intersects(g, &point)));
        if let Some(f) = hit {
            let subtype = match conn.kind {
                EntityKind::TechnicalPoint => f.text(TYPE),
                _ => None,
            };
            return Endpoint::with_subtype(conn.kind, subtype);
        }
    }
    Endpoint::new(EntityKind::Unknown)
}

impl Checker for DuctTypeChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, ctx: &CheckContext<'_>) -> QaResult<CheckReport> {
        let start = Instant::now();
        let ducts = ctx.project.require_layer(CANALISATION)?;

        let mut connections = Vec::new();
        for &(kind, name) in CONNECTION_PRIORITY {
            // Sites are optional, every other connection layer is required
            let layer = if name == SITE {
                match ctx.project.layer(name) {
                    Some(layer) => layer,
                    None => continue,
                }
            } else {
                ctx.project.require_layer(name)?
            };
            connections.push(Connection {
                kind,
                layer,
                index: SpatialIndex::from_layer(layer),
            });
        }

        let mut report = CheckReport::new(NAME);
        report.touch(&ducts.name);

        let total = ducts.len();
        for (done, f) in ducts.features().iter().enumerate() {
            ctx.checkpoint(NAME, done + 1, total)?;
            let Some((a, b)) = geometry_of(f).and_then(endpoints) else {
                continue;
            };
            let start_end = resolve(a, &connections);
            let end_end = resolve(b, &connections);
            let name = f.name().unwrap_or_else(|| "Unknown".to_string());
            let current = f.attr(TYPE_CANAL).as_trimmed();

            match expected_duct_category(&start_end, &end_end) {
                Some(expected) if current.as_deref() == Some(expected) => {}
                Some(expected) => report.push(
                    Finding::new(
                        Severity::Error,
                        FindingKind::DuctTypeMismatch,
                        format!(
                            "{} between {} and {}: TYPE CANAL is '{}', expected '{}'",
                            name,
                            start_end.kind,
                            end_end.kind,
                            current.as_deref().unwrap_or("NULL"),
                            expected
                        ),
                    )
                    .attribute(TYPE_CANAL)
                    .feature(&ducts.name, f.id),
                ),
                None => report.push(
                    Finding::new(
                        Severity::Warning,
                        FindingKind::UnknownConnection,
                        format!(
                            "{}: unknown connection between {} and {} (TYPE CANAL = '{}')",
                            name,
                            start_end.kind,
                            end_end.kind,
                            current.as_deref().unwrap_or("NULL")
                        ),
                    )
                    .feature(&ducts.name, f.id),
                ),
            }
        }

        info!(
            "[Checks] {}: {} mismatch(es), {} unknown connection(s) in {:.2?}",
            NAME,
            report.count(FindingKind::DuctTypeMismatch),
            report.count(FindingKind::UnknownConnection),
            start.elapsed()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QaConfig;
    use crate::model::{Feature, GeometryClass, LayerSchema, Project};
    use crate::rules::RuleTables;
    use geo::{line_string, point, Geometry};

    fn points(name: &str, features: Vec<Feature>) -> Layer {
        Layer::new(
            name,
            Some("Infrastructure"),
            GeometryClass::Point,
            LayerSchema::new(["NOM", "TYPE"]),
            features,
        )
    }

    fn at(id: u64, x: f64, y: f64) -> Feature {
        Feature::new(id, Some(Geometry::Point(point!(x: x, y: y))))
    }

    fn duct(id: u64, x1: f64, x2: f64, kind: &str) -> Feature {
        Feature::new(
            id,
            Some(Geometry::LineString(line_string![(x: x1, y: 0.0), (x: x2, y: 0.0)])),
        )
        .with_attr("TYPE CANAL", kind)
    }

    #[test]
    fn test_expected_types_and_unknown_connections() {
        let project = Project::new()
            .with_layer(points("Chambre", vec![at(1, 0.0, 0.0), at(2, 10.0, 0.0)]))
            .with_layer(points(
                "Point Technique",
                vec![at(1, 20.0, 0.0).with_attr("TYPE", "Point façade")],
            ))
            .with_layer(points("Poteau", vec![at(1, 30.0, 0.0)]))
            .with_layer(Layer::new(
                "Canalisation",
                Some("Infrastructure"),
                GeometryClass::Line,
                LayerSchema::new(["NOM", "TYPE CANAL"]),
                vec![
                    duct(1, 0.0, 10.0, "Distribution"),
                    duct(2, 10.0, 20.0, "Distribution"),
                    duct(3, 20.0, 30.0, "Distribution"),
                ],
            ));
        let config = QaConfig::default();
        let rules = RuleTables::from_config(&config).unwrap();
        let report = DuctTypeChecker
            .run(&CheckContext::new(&project, &config, &rules))
            .unwrap();

        assert_eq!(report.count(FindingKind::DuctTypeMismatch), 1);
        assert!(report.findings[0].message.contains("Adduction Façade"));
        assert_eq!(report.count(FindingKind::UnknownConnection), 1);
        let ids: Vec<_> = report.selection.ids("Canalisation").unwrap().iter().copied().collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
