//! Geometry adapter for network features
//!
//! # Submodules
//! - `ops` - Emptiness, validity, endpoints, predicates, geodesic distance
//! - `overlap` - Collinear overlap lengths and coverage by unions of lines
//! - `spatial` - R-tree index for bounding-box neighbour queries

mod ops;
mod overlap;
mod spatial;

pub use ops::{
    anchor, bounding_rect, buffered_rect, contains, endpoints, exact_key, geodesic_distance,
    intersects, is_empty, is_present, is_valid, metric_window, planar_distance, point_coord, point_geometry,
    touches, usable, CoordKey, METERS_PER_DEGREE,
};

pub use overlap::{covered_by_union, length, overlap_length, segments};

pub use spatial::{IndexedFeature, SpatialIndex};
