//! Linear overlap between polylines
//!
//! Overlap is computed segment by segment from collinear intersections, so
//! `overlap_length(a, b) == overlap_length(b, a)`. Coverage by a union of
//! lines merges the covered parameter intervals of every target segment.

use super::ops::intersects;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Geometry, Line};

const EPS: f64 = 1e-9;

/// Segments of a linear geometry; empty for points and areas
pub fn segments(geom: &Geometry<f64>) -> Vec<Line<f64>> {
    match geom {
        Geometry::Line(l) => vec![*l],
        Geometry::LineString(ls) => ls.lines().collect(),
        Geometry::MultiLineString(ml) => ml.0.iter().flat_map(|ls| ls.lines()).collect(),
        _ => Vec::new(),
    }
}

fn segment_length(l: &Line<f64>) -> f64 {
    let d = l.delta();
    d.x.hypot(d.y)
}

/// Planar length of a linear geometry
pub fn length(geom: &Geometry<f64>) -> f64 {
    segments(geom).iter().map(segment_length).sum()
}

/// Total length shared by two linear geometries
pub fn overlap_length(a: &Geometry<f64>, b: &Geometry<f64>) -> f64 {
    let segs_a = segments(a);
    let segs_b = segments(b);
    let mut total = 0.0;
    for sa in &segs_a {
        for sb in &segs_b {
            if let Some(LineIntersection::Collinear { intersection }) = line_intersection(*sa, *sb) {
                total += segment_length(&intersection);
            }
        }
    }
    total
}

/// Parameter of `c` along segment `s` (0 at start, 1 at end)
fn param(s: &Line<f64>, c: Coord<f64>) -> f64 {
    let d = s.delta();
    let len2 = d.x * d.x + d.y * d.y;
    ((c.x - s.start.x) * d.x + (c.y - s.start.y) * d.y) / len2
}

fn segment_covered(target: &Line<f64>, covers: &[Line<f64>]) -> bool {
    if segment_length(target) < EPS {
        return true;
    }
    let mut intervals: Vec<(f64, f64)> = covers
        .iter()
        .filter_map(|c| match line_intersection(*target, *c) {
            Some(LineIntersection::Collinear { intersection }) => {
                let t0 = param(target, intersection.start).clamp(0.0, 1.0);
                let t1 = param(target, intersection.end).clamp(0.0, 1.0);
                Some((t0.min(t1), t0.max(t1)))
            }
            _ => None,
        })
        .collect();
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut reach = 0.0;
    for (start, end) in intervals {
        if start > reach + EPS {
            return false;
        }
        reach = f64::max(reach, end);
    }
    reach >= 1.0 - EPS
}

/// Whether the union of `covers` contains `target`.
///
/// Lines must be covered along their whole length by collinear pieces of
/// the covers; other geometries need a single cover that intersects them.
pub fn covered_by_union(target: &Geometry<f64>, covers: &[&Geometry<f64>]) -> bool {
    if covers.is_empty() {
        return false;
    }
    let target_segments = segments(target);
    if target_segments.is_empty() {
        return covers.iter().any(|c| intersects(c, target));
    }
    let cover_segments: Vec<Line<f64>> = covers.iter().flat_map(|c| segments(c)).collect();
    target_segments
        .iter()
        .all(|s| segment_covered(s, &cover_segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    fn ls(coords: &[(f64, f64)]) -> Geometry<f64> {
        Geometry::LineString(coords.iter().map(|&(x, y)| Coord { x, y }).collect())
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = ls(&[(0.0, 0.0), (10.0, 0.0)]);
        let b = ls(&[(5.0, 0.0), (20.0, 0.0)]);
        assert!((overlap_length(&a, &b) - 5.0).abs() < 1e-9);
        assert_eq!(overlap_length(&a, &b), overlap_length(&b, &a));
    }

    #[test]
    fn test_crossing_lines_have_no_overlap() {
        let a = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 2.0)]);
        let b = Geometry::LineString(line_string![(x: 0.0, y: 2.0), (x: 2.0, y: 0.0)]);
        assert_eq!(overlap_length(&a, &b), 0.0);
    }

    #[test]
    fn test_union_coverage() {
        let duct = ls(&[(0.0, 0.0), (10.0, 0.0)]);
        let t1 = ls(&[(-1.0, 0.0), (4.0, 0.0)]);
        let t2 = ls(&[(4.0, 0.0), (10.0, 0.0)]);
        assert!(covered_by_union(&duct, &[&t1, &t2]));
        assert!(!covered_by_union(&duct, &[&t1]));

        let gap = ls(&[(4.5, 0.0), (10.0, 0.0)]);
        assert!(!covered_by_union(&duct, &[&t1, &gap]));
    }

    #[test]
    fn test_coverage_follows_vertices() {
        let duct = ls(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)]);
        let trench = ls(&[(0.0, 0.0), (5.0, 0.0), (5.0, 6.0)]);
        assert!(covered_by_union(&duct, &[&trench]));
        assert!(!covered_by_union(&trench, &[&duct]));
    }
}
