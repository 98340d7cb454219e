//! Geometry predicates and measurements used by the checkers
//!
//! Thin layer over the `geo` crate: emptiness and validity tests, endpoint
//! extraction, coordinate keys, topological predicates and WGS84 distance.

use geo::{
    Area, BoundingRect, Coord, GeodesicDistance, Geometry, LineString, Point, Polygon, Rect,
    Relate,
};

/// Metres per degree of latitude, used for approximate search envelopes
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Rounded coordinate, hashable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey(pub i64, pub i64);

impl CoordKey {
    pub fn new(c: Coord<f64>, precision: u32) -> Self {
        let scale = 10f64.powi(precision as i32);
        CoordKey((c.x * scale).round() as i64, (c.y * scale).round() as i64)
    }
}

/// Bit-exact coordinate key (treats -0.0 as 0.0)
pub fn exact_key(c: Coord<f64>) -> (u64, u64) {
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

pub fn is_empty(geom: &Geometry<f64>) -> bool {
    match geom {
        Geometry::Point(_) | Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => false,
        Geometry::LineString(ls) => ls.0.is_empty(),
        Geometry::Polygon(p) => p.exterior().0.is_empty(),
        Geometry::MultiPoint(mp) => mp.0.is_empty(),
        Geometry::MultiLineString(ml) => ml.0.iter().all(|l| l.0.is_empty()),
        Geometry::MultiPolygon(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
        Geometry::GeometryCollection(gc) => gc.0.iter().all(is_empty),
    }
}

fn finite(c: &Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

fn line_string_valid(ls: &LineString<f64>) -> bool {
    if ls.0.len() < 2 || !ls.0.iter().all(finite) {
        return false;
    }
    let first = ls.0[0];
    ls.0.iter().any(|c| *c != first)
}

fn ring_valid(ring: &LineString<f64>) -> bool {
    ring.0.len() >= 4 && ring.is_closed() && ring.0.iter().all(finite)
}

fn polygon_valid(p: &Polygon<f64>) -> bool {
    ring_valid(p.exterior())
        && p.interiors().iter().all(ring_valid)
        && p.unsigned_area() > 0.0
}

/// Structural validity: finite coordinates, enough distinct vertices,
/// closed rings with non-zero area
pub fn is_valid(geom: &Geometry<f64>) -> bool {
    match geom {
        Geometry::Point(p) => finite(&p.0),
        Geometry::Line(l) => finite(&l.start) && finite(&l.end) && l.start != l.end,
        Geometry::LineString(ls) => line_string_valid(ls),
        Geometry::MultiLineString(ml) => !ml.0.is_empty() && ml.0.iter().all(line_string_valid),
        Geometry::Polygon(p) => polygon_valid(p),
        Geometry::MultiPolygon(mp) => !mp.0.is_empty() && mp.0.iter().all(polygon_valid),
        Geometry::MultiPoint(mp) => !mp.0.is_empty() && mp.0.iter().all(|p| finite(&p.0)),
        Geometry::Rect(r) => finite(&r.min()) && finite(&r.max()),
        Geometry::Triangle(t) => finite(&t.0) && finite(&t.1) && finite(&t.2),
        Geometry::GeometryCollection(gc) => !gc.0.is_empty() && gc.0.iter().all(is_valid),
    }
}

/// Non-empty geometry, safe to pass to bounding-box computations
pub fn is_present(geom: &Geometry<f64>) -> bool {
    !is_empty(geom)
}

/// Non-empty and valid: the only geometries handed to topological predicates
pub fn usable(geom: Option<&Geometry<f64>>) -> Option<&Geometry<f64>> {
    geom.filter(|g| !is_empty(g) && is_valid(g))
}

pub fn bounding_rect(geom: &Geometry<f64>) -> Option<Rect<f64>> {
    geom.bounding_rect()
}

/// Bounding box grown by `distance` on every side
pub fn buffered_rect(geom: &Geometry<f64>, distance: f64) -> Option<Rect<f64>> {
    bounding_rect(geom).map(|r| {
        Rect::new(
            Coord {
                x: r.min().x - distance,
                y: r.min().y - distance,
            },
            Coord {
                x: r.max().x + distance,
                y: r.max().y + distance,
            },
        )
    })
}

/// Lon/lat box reaching at least `meters` from `center` along both axes.
///
/// A degree of longitude shrinks with `cos(lat)`, so the box is wider than
/// tall away from the equator. The 1% margin covers the shorter meridian
/// degree near the equator; the cosine is floored near the poles.
pub fn metric_window(center: Coord<f64>, meters: f64) -> Rect<f64> {
    let dy = meters * 1.01 / METERS_PER_DEGREE;
    let dx = dy / center.y.to_radians().cos().max(0.01);
    Rect::new(
        Coord {
            x: center.x - dx,
            y: center.y - dy,
        },
        Coord {
            x: center.x + dx,
            y: center.y + dy,
        },
    )
}

/// Start and end of a polyline; for multi-part lines, those of the first part
pub fn endpoints(geom: &Geometry<f64>) -> Option<(Coord<f64>, Coord<f64>)> {
    let ls = match geom {
        Geometry::Line(l) => return Some((l.start, l.end)),
        Geometry::LineString(ls) => ls,
        Geometry::MultiLineString(ml) => ml.0.first()?,
        _ => return None,
    };
    if ls.0.len() < 2 {
        return None;
    }
    Some((ls.0[0], ls.0[ls.0.len() - 1]))
}

/// Coordinate standing for a feature: the point itself, the start of a
/// line, or the centre of the bounding box otherwise
pub fn anchor(geom: &Geometry<f64>) -> Option<Coord<f64>> {
    match geom {
        Geometry::Point(p) => Some(p.0),
        Geometry::MultiPoint(mp) => mp.0.first().map(|p| p.0),
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
            endpoints(geom).map(|(start, _)| start)
        }
        other => bounding_rect(other).map(|r| r.center()),
    }
}

/// Point coordinate of a point geometry
pub fn point_coord(geom: &Geometry<f64>) -> Option<Coord<f64>> {
    match geom {
        Geometry::Point(p) => Some(p.0),
        Geometry::MultiPoint(mp) if mp.0.len() == 1 => Some(mp.0[0].0),
        _ => None,
    }
}

pub fn point_geometry(c: Coord<f64>) -> Geometry<f64> {
    Geometry::Point(Point(c))
}

pub fn intersects(a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    a.relate(b).is_intersects()
}

/// `a` contains `b` (interior of `a` meets `b`, no part of `b` outside `a`)
pub fn contains(a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    a.relate(b).is_contains()
}

/// Boundaries meet, interiors don't
pub fn touches(a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    a.relate(b).is_touches()
}

/// Planar distance between two coordinates
pub fn planar_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Ellipsoidal (WGS84) distance in metres between lon/lat coordinates
pub fn geodesic_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Point(a).geodesic_distance(&Point(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, line_string, point, polygon, MultiLineString};

    #[test]
    fn test_metric_window_widens_with_latitude() {
        let equator = metric_window(coord! { x: 0.0, y: 0.0 }, 1.0);
        let north = metric_window(coord! { x: 2.0, y: 48.0 }, 1.0);
        assert!((equator.width() - equator.height()).abs() < 1e-12);
        assert!(north.width() > 1.4 * north.height());

        // An east-west neighbour 0.9 m away at 48 degrees lies inside
        let c = coord! { x: 2.0, y: 48.0 };
        let east = coord! { x: 2.0 + 0.9 / (METERS_PER_DEGREE * 48f64.to_radians().cos()), y: 48.0 };
        assert!(geodesic_distance(c, east) < 1.0);
        assert!(east.x < north.max().x);
    }

    #[test]
    fn test_coord_key_rounds_to_precision() {
        let a = CoordKey::new(coord! { x: 2.123454, y: 48.000001 }, 5);
        let b = CoordKey::new(coord! { x: 2.123451, y: 48.000004 }, 5);
        assert_eq!(a, b);
        let c = CoordKey::new(coord! { x: 2.12346, y: 48.0 }, 5);
        assert_ne!(a, c);
    }

    #[test]
    fn test_validity() {
        assert!(is_valid(&Geometry::Point(point!(x: 1.0, y: 1.0))));
        assert!(!is_valid(&Geometry::Point(point!(x: f64::NAN, y: 1.0))));
        assert!(!is_valid(&Geometry::LineString(line_string![(x: 1.0, y: 1.0), (x: 1.0, y: 1.0)])));
        let flat = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0), (x: 0.0, y: 0.0)];
        assert!(!is_valid(&Geometry::Polygon(flat)));
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        assert!(is_valid(&Geometry::Polygon(square)));
    }

    #[test]
    fn test_empty() {
        assert!(is_empty(&Geometry::LineString(LineString::new(vec![]))));
        assert!(is_empty(&Geometry::MultiLineString(MultiLineString::new(vec![]))));
        assert!(!is_empty(&Geometry::Point(point!(x: 0.0, y: 0.0))));
    }

    #[test]
    fn test_endpoints_of_multiline_use_first_part() {
        let ml = MultiLineString::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)],
            line_string![(x: 5.0, y: 5.0), (x: 6.0, y: 6.0)],
        ]);
        let (a, b) = endpoints(&Geometry::MultiLineString(ml)).unwrap();
        assert_eq!(a, coord! { x: 0.0, y: 0.0 });
        assert_eq!(b, coord! { x: 2.0, y: 0.0 });
    }

    #[test]
    fn test_point_touches_line_end_only() {
        let line = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0)]);
        assert!(touches(&line, &point_geometry(coord! { x: 4.0, y: 0.0 })));
        assert!(!touches(&line, &point_geometry(coord! { x: 2.0, y: 0.0 })));
        assert!(intersects(&line, &point_geometry(coord! { x: 2.0, y: 0.0 })));
    }

    #[test]
    fn test_geodesic_distance_one_degree_of_latitude() {
        let d = geodesic_distance(coord! { x: 0.0, y: 0.0 }, coord! { x: 0.0, y: 1.0 });
        assert!((d - 110_574.0).abs() < 5.0, "got {d}");
    }
}
