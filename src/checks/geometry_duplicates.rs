//! Geometric duplicates in the infrastructure group
//!
//! Four passes over the group's layers:
//! 1. exact duplicates: features of one layer sharing a rounded anchor
//!    coordinate (the point itself, or the start of a line);
//! 2. forbidden overlaps: point features of two different layers sharing a
//!    rounded coordinate, unless the layer pair is an allowed exception;
//! 3. line overlaps: collinear overlap ratio of each pair of lines of one
//!    layer, total when both ratios reach `total_ratio`, partial when
//!    either reaches `partial_ratio`;
//! 4. minimum spacing: geodesic distance between same-layer points under
//!    the configured distance rules.
//!
//! Every pair is evaluated once: candidate pairs are kept only when the
//! first id is lower than the second.

use super::{geometry_of, CheckContext, Checker};
use crate::error::QaResult;
use crate::geometry::{
    anchor, bounding_rect, geodesic_distance, is_present, length, metric_window, overlap_length,
    CoordKey, SpatialIndex,
};
use crate::model::{Feature, FeatureId, GeometryClass, Layer};
use crate::report::{CheckReport, Finding, FindingKind, Severity};
use crate::rules::names::TYPE;
use crate::rules::DistanceRule;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info};

const NAME: &str = "geometry_duplicates";

pub struct GeometryDuplicatesChecker;

/// Features of one layer grouped by rounded anchor coordinate
struct KeyedLayer<'a> {
    layer: &'a Layer,
    by_key: IndexMap<CoordKey, Vec<&'a Feature>>,
    duplicates: HashSet<FeatureId>,
}

fn labels(features: &[&Feature]) -> String {
    features
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Checker for GeometryDuplicatesChecker {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, ctx: &CheckContext<'_>) -> QaResult<CheckReport> {
        let start = Instant::now();
        let layers = ctx.project.group_layers(&ctx.config.infrastructure_group)?;
        let mut report = CheckReport::new(NAME);

        let keyed: Vec<KeyedLayer> = layers
            .iter()
            .filter(|l| l.geometry_class != GeometryClass::Polygon)
            .map(|l| key_layer(l, ctx.config.coordinate_precision))
            .collect();

        for k in &keyed {
            report.touch(&k.layer.name);
            exact_duplicates(k, &mut report);
        }

        let points: Vec<&KeyedLayer> = keyed
            .iter()
            .filter(|k| k.layer.geometry_class == GeometryClass::Point)
            .collect();
        forbidden_overlaps(ctx, &points, &mut report);

        for k in keyed
            .iter()
            .filter(|k| k.layer.geometry_class == GeometryClass::Line)
        {
            line_overlaps(ctx, k.layer, &mut report)?;
        }

        for rule in &ctx.rules.distance_rules {
            for k in points.iter().filter(|k| k.layer.name == rule.layer) {
                min_distance(ctx, k.layer, rule, &mut report)?;
            }
        }

        info!(
            "[Checks] {}: {} finding(s) in {:.2?}",
            NAME,
            report.findings.len(),
            start.elapsed()
        );
        Ok(report)
    }
}

fn key_layer(layer: &Layer, precision: u32) -> KeyedLayer<'_> {
    let mut by_key: IndexMap<CoordKey, Vec<&Feature>> = IndexMap::new();
    for f in layer.features() {
        let Some(c) = f.geometry.as_ref().filter(|g| is_present(g)).and_then(anchor) else {
            continue;
        };
        by_key.entry(CoordKey::new(c, precision)).or_default().push(f);
    }
    let duplicates = by_key
        .values()
        .filter(|feats| feats.len() > 1)
        .flat_map(|feats| feats.iter().map(|f| f.id))
        .collect();
    KeyedLayer {
        layer,
        by_key,
        duplicates,
    }
}

fn exact_duplicates(k: &KeyedLayer, report: &mut CheckReport) {
    for feats in k.by_key.values().filter(|feats| feats.len() > 1) {
        report.push(
            Finding::new(
                Severity::Error,
                FindingKind::ExactDuplicate,
                format!("Exact duplicates in {}: {}", k.layer.name, labels(feats)),
            )
            .features(&k.layer.name, feats.iter().map(|f| f.id)),
        );
    }
}

fn forbidden_overlaps(ctx: &CheckContext<'_>, points: &[&KeyedLayer], report: &mut CheckReport) {
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            if a.layer.name == b.layer.name
                || ctx.rules.overlap_allowed(&a.layer.name, &b.layer.name)
            {
                continue;
            }
            for (key, feats_a) in &a.by_key {
                let Some(feats_b) = b.by_key.get(key) else {
                    continue;
                };
                for fa in feats_a.iter().filter(|f| !a.duplicates.contains(&f.id)) {
                    for fb in feats_b.iter().filter(|f| !b.duplicates.contains(&f.id)) {
                        report.push(
                            Finding::new(
                                Severity::Error,
                                FindingKind::ForbiddenOverlap,
                                format!(
                                    "Overlap between '{}' ({}) and '{}' ({})",
                                    fa.label(),
                                    a.layer.name,
                                    fb.label(),
                                    b.layer.name
                                ),
                            )
                            .feature(&a.layer.name, fa.id)
                            .feature(&b.layer.name, fb.id),
                        );
                    }
                }
            }
        }
    }
}

fn line_overlaps(ctx: &CheckContext<'_>, layer: &Layer, report: &mut CheckReport) -> QaResult<()> {
    let lines: Vec<&Feature> = layer
        .features()
        .iter()
        .filter(|f| geometry_of(f).is_some())
        .collect();
    if lines.len() < 2 {
        return Ok(());
    }

    let mut index = SpatialIndex::new();
    for f in &lines {
        if let Some(g) = geometry_of(f) {
            index.insert(f.id, g);
        }
    }

    let total_ratio = ctx.config.overlap.total_ratio;
    let partial_ratio = ctx.config.overlap.partial_ratio;
    let mut pairs = 0usize;

    for (done, fa) in lines.iter().enumerate() {
        ctx.checkpoint(NAME, done + 1, lines.len())?;
        let Some(ga) = geometry_of(fa) else { continue };
        let Some(rect) = bounding_rect(ga) else {
            continue;
        };
        for nid in index.query(&rect) {
            if fa.id >= nid {
                continue;
            }
            let Some(fb) = layer.feature(nid) else { continue };
            let Some(gb) = geometry_of(fb) else { continue };
            pairs += 1;

            let shared = overlap_length(ga, gb);
            if shared <= 0.0 {
                continue;
            }
            let ratio_a = shared / length(ga);
            let ratio_b = shared / length(gb);

            let finding = if ratio_a >= total_ratio && ratio_b >= total_ratio {
                Finding::new(
                    Severity::Error,
                    FindingKind::TotalOverlap,
                    format!(
                        "{}: total overlap between '{}' and '{}'",
                        layer.name,
                        fa.label(),
                        fb.label()
                    ),
                )
            } else if ratio_a >= partial_ratio || ratio_b >= partial_ratio {
                Finding::new(
                    Severity::Warning,
                    FindingKind::PartialOverlap,
                    format!(
                        "{}: partial overlap between '{}' and '{}' ({:.1}% / {:.1}% covered)",
                        layer.name,
                        fa.label(),
                        fb.label(),
                        ratio_a * 100.0,
                        ratio_b * 100.0
                    ),
                )
            } else {
                continue;
            };
            report.push(finding.feature(&layer.name, fa.id).feature(&layer.name, fb.id));
        }
    }
    debug!("[Checks] {}: {} line pair(s) in {}", NAME, pairs, layer.name);
    Ok(())
}

fn matches_type(feature: &Feature, rule: &DistanceRule) -> bool {
    match &rule.type_value {
        Some(expected) => feature.text(TYPE).as_deref() == Some(expected.as_str()),
        None => true,
    }
}

fn min_distance(
    ctx: &CheckContext<'_>,
    layer: &Layer,
    rule: &DistanceRule,
    report: &mut CheckReport,
) -> QaResult<()> {
    let eligible: Vec<(&Feature, geo::Coord<f64>)> = layer
        .features()
        .iter()
        .filter(|f| matches_type(f, rule))
        .filter_map(|f| {
            let g = f.geometry.as_ref().filter(|g| is_present(g))?;
            anchor(g).map(|c| (f, c))
        })
        .collect();
    if eligible.len() < 2 {
        return Ok(());
    }

    let index = SpatialIndex::from_coords(eligible.iter().map(|(f, c)| (f.id, *c)));
    let position: HashMap<FeatureId, usize> = eligible
        .iter()
        .enumerate()
        .map(|(i, (f, _))| (f.id, i))
        .collect();

    for (done, (fa, ca)) in eligible.iter().enumerate() {
        ctx.checkpoint(NAME, done + 1, eligible.len())?;
        for nid in index.query(&metric_window(*ca, rule.min_distance_m)) {
            if fa.id >= nid {
                continue;
            }
            let Some(&(fb, cb)) = position.get(&nid).map(|&i| &eligible[i]) else {
                continue;
            };
            let distance = geodesic_distance(*ca, cb);
            if distance < rule.min_distance_m {
                report.push(
                    Finding::new(
                        Severity::Warning,
                        FindingKind::MinDistance,
                        format!(
                            "Minimum distance not met in {}: '{}' and '{}' are {:.2} m apart (minimum {} m)",
                            layer.name,
                            fa.label(),
                            fb.label(),
                            distance,
                            rule.min_distance_m
                        ),
                    )
                    .feature(&layer.name, fa.id)
                    .feature(&layer.name, fb.id),
                );
            }
        }
    }
    Ok(())
}
