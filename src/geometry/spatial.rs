//! Spatial indexing for neighbour queries
//!
//! R-tree over feature bounding boxes. Queries return candidate ids whose
//! envelope intersects the search box; callers apply exact predicates.

use super::ops::{bounding_rect, is_present};
use crate::model::{FeatureId, Layer};
use geo::{Coord, Geometry, Rect};
use rstar::{RTree, RTreeObject, AABB};

/// Object wrapper for R-tree spatial indexing
#[derive(Clone, Debug)]
pub struct IndexedFeature {
    pub id: FeatureId,
    pub bounds: AABB<[f64; 2]>,
}

impl IndexedFeature {
    pub fn new(id: FeatureId, rect: Rect<f64>) -> Self {
        let bounds = AABB::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        );
        Self { id, bounds }
    }
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<IndexedFeature>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every feature of a layer that has a non-empty geometry
    pub fn from_layer(layer: &Layer) -> Self {
        let objects: Vec<IndexedFeature> = layer
            .features()
            .iter()
            .filter_map(|f| {
                let geom = f.geometry.as_ref().filter(|g| is_present(g))?;
                bounding_rect(geom).map(|r| IndexedFeature::new(f.id, r))
            })
            .collect();
        Self {
            tree: RTree::bulk_load(objects),
        }
    }

    /// Index arbitrary `(id, coordinate)` pairs
    pub fn from_coords(items: impl IntoIterator<Item = (FeatureId, Coord<f64>)>) -> Self {
        let objects: Vec<IndexedFeature> = items
            .into_iter()
            .map(|(id, c)| IndexedFeature::new(id, Rect::new(c, c)))
            .collect();
        Self {
            tree: RTree::bulk_load(objects),
        }
    }

    pub fn insert(&mut self, id: FeatureId, geometry: &Geometry<f64>) -> bool {
        match bounding_rect(geometry) {
            Some(rect) => {
                self.tree.insert(IndexedFeature::new(id, rect));
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Candidate ids whose envelope intersects `rect`, ascending
    pub fn query(&self, rect: &Rect<f64>) -> Vec<FeatureId> {
        let search = AABB::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        );
        let mut ids: Vec<FeatureId> = self
            .tree
            .locate_in_envelope_intersecting(&search)
            .map(|o| o.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Candidate ids within a square of half-size `radius` around `center`
    pub fn query_around(&self, center: Coord<f64>, radius: f64) -> Vec<FeatureId> {
        let rect = Rect::new(
            Coord {
                x: center.x - radius,
                y: center.y - radius,
            },
            Coord {
                x: center.x + radius,
                y: center.y + radius,
            },
        );
        self.query(&rect)
    }
}
