//! Line endpoint connectivity within a snapping group
//!
//! A line end is connected when an authorised point of the group lies
//! within the tolerance. Ducts may not end on GC points; trenches get the
//! tolerance multiplied by `trench_tolerance_factor`. The first matching
//! point (in layer then id order) is marked as used; points no line end
//! reaches are isolated.

use super::{CheckContext, Checker};
use crate::error::{QaError, QaResult};
use crate::geometry::{endpoints, is_present, planar_distance, point_coord, SpatialIndex};
use crate::model::{Feature, Layer};
use crate::report::{CheckReport, Finding, FindingKind, Severity};
use crate::rules::names::snap_group;
use geo::Coord;
use std::collections::HashSet;
use std::time::Instant;
use tracing::info;

const NAME: &str = "snapping";

pub struct SnappingChecker {
    group: Option<String>,
}

impl SnappingChecker {
    /// `None` checks the configured default group
    pub fn new(group: Option<&str>) -> Self {
        Self {
            group: group.map(str::to_string),
        }
    }
}

struct SnapPoint<'a> {
    layer: &'a Layer,
    feature: &'a Feature,
    coord: Coord<f64>,
    is_gc: bool,
}

fn label(layer: &Layer, feature: &Feature) -> String {
    feature
        .name()
        .unwrap_or_else(|| format!("{}_{}", layer.name, feature.id))
}

/// Index of the first authorised point within `tolerance` of `c`
fn first_match(
    c: Coord<f64>,
    points: &[SnapPoint],
    index: &SpatialIndex,
    tolerance: f64,
    allow_gc: bool,
) -> Option<usize> {
    index
        .query_around(c, tolerance)
        .into_iter()
        .map(|pos| pos as usize)
        .find(|&pos| {
            let p = &points[pos];
            (allow_gc || !p.is_gc) && planar_distance(c, p.coord) <= tolerance
        })
}

impl Checker for SnappingChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, ctx: &CheckContext<'_>) -> QaResult<CheckReport> {
        let start = Instant::now();
        let group_name = self.group.as_deref().unwrap_or(&ctx.config.snapping.group);
        let group = snap_group(group_name).ok_or_else(|| QaError::UnknownGroup(group_name.to_string()))?;

        let point_layers: Vec<&Layer> = group
            .points
            .iter()
            .filter_map(|n| ctx.project.layer(n))
            .collect();
        let line_layers: Vec<&Layer> = group
            .lines
            .iter()
            .filter_map(|n| ctx.project.layer(n))
            .collect();
        if point_layers.is_empty() && line_layers.is_empty() {
            return Err(QaError::MissingGroup(group_name.to_string()));
        }

        let mut report = CheckReport::new(NAME);
        let mut points: Vec<SnapPoint> = Vec::new();
        for &layer in &point_layers {
            report.touch(&layer.name);
            let is_gc = layer.name.to_lowercase().contains("point gc");
            for f in layer.features() {
                if let Some(coord) = f.geometry.as_ref().and_then(point_coord) {
                    points.push(SnapPoint {
                        layer,
                        feature: f,
                        coord,
                        is_gc,
                    });
                }
            }
        }
        // Ids are load positions so candidates come back in load order
        let index = SpatialIndex::from_coords(
            points
                .iter()
                .enumerate()
                .map(|(pos, p)| (pos as u64, p.coord)),
        );

        let total: usize = line_layers.iter().map(|l| l.len()).sum();
        let mut done = 0usize;
        let mut connected: HashSet<usize> = HashSet::new();
        let mut bad_lines = 0usize;

        for &layer in &line_layers {
            report.touch(&layer.name);
            let lower = layer.name.to_lowercase();
            let allow_gc = !lower.contains("canalisation");
            let tolerance = if lower.contains("tranchee") {
                ctx.config.snapping.tolerance * ctx.config.snapping.trench_tolerance_factor
            } else {
                ctx.config.snapping.tolerance
            };

            for f in layer.features() {
                done += 1;
                ctx.checkpoint(NAME, done, total)?;
                let Some((a, b)) = f
                    .geometry
                    .as_ref()
                    .filter(|g| is_present(g))
                    .and_then(endpoints)
                else {
                    continue;
                };

                let mut loose = Vec::new();
                for (end, c) in [("A", a), ("B", b)] {
                    match first_match(c, &points, &index, tolerance, allow_gc) {
                        Some(pos) => {
                            connected.insert(pos);
                        }
                        None => loose.push(end),
                    }
                }
                if loose.is_empty() {
                    continue;
                }
                bad_lines += 1;
                report.push(
                    Finding::new(
                        Severity::Error,
                        FindingKind::UnconnectedEndpoint,
                        format!("{} not snapped (end {})", label(layer, f), loose.join(" and ")),
                    )
                    .feature(&layer.name, f.id),
                );
            }
        }

        let mut isolated = 0usize;
        for (pos, p) in points.iter().enumerate() {
            if connected.contains(&pos) {
                continue;
            }
            isolated += 1;
            report.push(
                Finding::new(
                    Severity::Warning,
                    FindingKind::IsolatedPoint,
                    format!("Isolated point {}", label(p.layer, p.feature)),
                )
                .feature(&p.layer.name, p.feature.id),
            );
        }

        info!(
            "[Checks] {} ({}): {} badly snapped line(s), {} isolated point(s) in {:.2?}",
            NAME,
            group_name,
            bad_lines,
            isolated,
            start.elapsed()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QaConfig;
    use crate::model::{GeometryClass, LayerSchema, Project};
    use crate::rules::RuleTables;
    use geo::{line_string, point, Geometry};

    fn points(name: &str, pts: &[(u64, f64, f64)]) -> Layer {
        Layer::new(
            name,
            Some("Infrastructure"),
            GeometryClass::Point,
            LayerSchema::new(["NOM"]),
            pts.iter()
                .map(|&(id, x, y)| Feature::new(id, Some(Geometry::Point(point!(x: x, y: y)))))
                .collect(),
        )
    }

    fn lines(name: &str, ls: Vec<(u64, Geometry<f64>)>) -> Layer {
        Layer::new(
            name,
            Some("Infrastructure"),
            GeometryClass::Line,
            LayerSchema::new(["NOM"]),
            ls.into_iter().map(|(id, g)| Feature::new(id, Some(g))).collect(),
        )
    }

    fn run(project: &Project, config: &QaConfig) -> QaResult<CheckReport> {
        let rules = RuleTables::from_config(config).unwrap();
        SnappingChecker::new(None).run(&CheckContext::new(project, config, &rules))
    }

    #[test]
    fn test_ducts_may_not_end_on_gc_points() {
        let project = Project::new()
            .with_layer(points("Point GC", &[(1, 0.0, 0.0)]))
            .with_layer(points("Chambre", &[(1, 5.0, 0.0)]))
            .with_layer(lines(
                "Canalisation",
                vec![(1, Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 0.0)]))],
            ))
            .with_layer(lines(
                "Tranchee",
                vec![(1, Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 0.0)]))],
            ));
        let report = run(&project, &QaConfig::default()).unwrap();

        assert_eq!(report.count(FindingKind::UnconnectedEndpoint), 1);
        assert!(report.findings[0].message.ends_with("(end A)"));
        assert!(report.selection.contains("Canalisation", 1));
        assert!(!report.selection.contains("Tranchee", 1));
        // The trench reached the GC point
        assert_eq!(report.count(FindingKind::IsolatedPoint), 0);
    }

    #[test]
    fn test_trench_tolerance_factor() {
        let project = Project::new()
            .with_layer(points("Chambre", &[(1, 0.0, 0.0), (2, 10.0, 0.0)]))
            .with_layer(lines(
                "Tranchee",
                vec![(1, Geometry::LineString(line_string![(x: 0.15, y: 0.0), (x: 10.0, y: 0.0)]))],
            ));
        let mut config = QaConfig::default();
        config.snapping.tolerance = 0.1;
        let report = run(&project, &config).unwrap();
        assert!(report.is_clean());

        config.snapping.trench_tolerance_factor = 1.0;
        let report = run(&project, &config).unwrap();
        assert_eq!(report.count(FindingKind::UnconnectedEndpoint), 1);
        assert_eq!(report.count(FindingKind::IsolatedPoint), 1);
    }

    #[test]
    fn test_unknown_group() {
        let rules = RuleTables::from_config(&QaConfig::default()).unwrap();
        let project = Project::new();
        let config = QaConfig::default();
        let err = SnappingChecker::new(Some("Gaz"))
            .run(&CheckContext::new(&project, &config, &rules))
            .unwrap_err();
        assert!(matches!(err, QaError::UnknownGroup(_)));
    }
}
