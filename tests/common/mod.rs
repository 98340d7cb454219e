//! Shared fixture builder for the integration tests

#![allow(dead_code)]

use geo::{Coord, Geometry, LineString, Point, Polygon};
use verif_infra::{
    CheckContext, CheckReport, Checker, Feature, FeatureId, GeometryClass, Layer, LayerSchema,
    Project, QaConfig, RuleTables,
};

pub const GROUP: &str = "Infrastructure";

pub fn pt(id: FeatureId, x: f64, y: f64) -> Feature {
    Feature::new(id, Some(Geometry::Point(Point::new(x, y))))
}

pub fn line(id: FeatureId, coords: &[(f64, f64)]) -> Feature {
    let ls: LineString<f64> = coords.iter().map(|&(x, y)| Coord { x, y }).collect();
    Feature::new(id, Some(Geometry::LineString(ls)))
}

/// Axis-aligned square of half-size `half` centred on (cx, cy)
pub fn square(id: FeatureId, cx: f64, cy: f64, half: f64) -> Feature {
    let ring: LineString<f64> = vec![
        (cx - half, cy - half),
        (cx + half, cy - half),
        (cx + half, cy + half),
        (cx - half, cy + half),
        (cx - half, cy - half),
    ]
    .into();
    Feature::new(id, Some(Geometry::Polygon(Polygon::new(ring, vec![]))))
}

#[derive(Default)]
pub struct ProjectBuilder {
    project: Project,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer in the infrastructure group
    pub fn layer(
        self,
        name: &str,
        class: GeometryClass,
        fields: &[&str],
        features: Vec<Feature>,
    ) -> Self {
        self.grouped(name, Some(GROUP), class, fields, features)
    }

    pub fn grouped(
        mut self,
        name: &str,
        group: Option<&str>,
        class: GeometryClass,
        fields: &[&str],
        features: Vec<Feature>,
    ) -> Self {
        self.project.add_layer(Layer::new(
            name,
            group,
            class,
            LayerSchema::new(fields.iter().copied()),
            features,
        ));
        self
    }

    pub fn build(self) -> Project {
        self.project
    }
}

pub fn run_with(project: &Project, config: &QaConfig, checker: &dyn Checker) -> CheckReport {
    let rules = RuleTables::from_config(config).expect("default rules are valid");
    checker
        .run(&CheckContext::new(project, config, &rules))
        .expect("checker prerequisites present")
}

pub fn run(project: &Project, checker: &dyn Checker) -> CheckReport {
    run_with(project, &QaConfig::default(), checker)
}

pub fn ids(report: &CheckReport, layer: &str) -> Vec<FeatureId> {
    report
        .selection
        .ids(layer)
        .map(|s| s.iter().copied().collect())
        .unwrap_or_default()
}
