//! Spatial index for boundary lookups.
//!
//! An R-tree over bounding boxes prefilters candidates; exact containment
//! runs against the candidates only. Administrative layers are expected to
//! partition the state, but the source data is not trusted to: when more
//! than one polygon contains a point, the earliest polygon in the layer's
//! document order wins. That also makes shared-edge points deterministic.

use geo::Coord;
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

use super::geometry::multi_polygon_contains;
use super::BoundaryPolygon;

/// Wrapper for R-tree indexing of boundary polygons
#[derive(Clone)]
pub struct IndexedBoundary {
    boundary: Arc<BoundaryPolygon>,
    ordinal: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedBoundary {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedBoundary {
    fn new(boundary: BoundaryPolygon, ordinal: usize) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = boundary.bbox()?;
        Some(Self {
            boundary: Arc::new(boundary),
            ordinal,
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// Per-layer spatial index with document-order tie-break.
pub struct BoundaryIndex {
    tree: RTree<IndexedBoundary>,
}

impl BoundaryIndex {
    /// Build the index, preserving document order as the tie-break ordinal
    pub fn build(boundaries: Vec<BoundaryPolygon>) -> Self {
        let indexed: Vec<IndexedBoundary> = boundaries
            .into_iter()
            .enumerate()
            .filter_map(|(ordinal, boundary)| IndexedBoundary::new(boundary, ordinal))
            .collect();

        let tree = RTree::bulk_load(indexed);

        info!("Spatial index built with {} entries", tree.size());

        Self { tree }
    }

    /// The polygon containing the point, earliest in document order when the
    /// source data overlaps.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<Arc<BoundaryPolygon>> {
        let point = Coord { x: lon, y: lat };
        let query_envelope = AABB::from_point([lon, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ib| multi_polygon_contains(&ib.boundary.geometry, point))
            .min_by_key(|ib| ib.ordinal)
            .map(|ib| Arc::clone(&ib.boundary))
    }

    /// Get total number of indexed boundaries
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundaryLayer;
    use geo::{LineString, MultiPolygon, Polygon};
    use geojson::JsonObject;
    use serde_json::json;

    fn square(name: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundaryPolygon {
        let ring = LineString::from(vec![
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
            (min_x, min_y),
        ]);
        let mut properties = JsonObject::new();
        properties.insert("NAME".to_string(), json!(name));
        BoundaryPolygon {
            layer: BoundaryLayer::County,
            label: name.to_string(),
            properties,
            geometry: MultiPolygon::new(vec![Polygon::new(ring, vec![])]),
        }
    }

    #[test]
    fn test_locate_inside_polygon() {
        let index = BoundaryIndex::build(vec![
            square("west", 0.0, 0.0, 1.0, 1.0),
            square("east", 1.0, 0.0, 2.0, 1.0),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.locate(0.5, 0.5).unwrap().label, "west");
        assert_eq!(index.locate(1.5, 0.5).unwrap().label, "east");
    }

    #[test]
    fn test_locate_outside_every_polygon() {
        let index = BoundaryIndex::build(vec![square("west", 0.0, 0.0, 1.0, 1.0)]);
        assert!(index.locate(5.0, 5.0).is_none());
    }

    #[test]
    fn test_shared_edge_resolves_to_first_in_document_order() {
        // Two adjacent squares share the edge x = 1.0. A point on it is
        // contained by both; the earlier layer entry wins.
        let index = BoundaryIndex::build(vec![
            square("west", 0.0, 0.0, 1.0, 1.0),
            square("east", 1.0, 0.0, 2.0, 1.0),
        ]);
        assert_eq!(index.locate(1.0, 0.5).unwrap().label, "west");

        let flipped = BoundaryIndex::build(vec![
            square("east", 1.0, 0.0, 2.0, 1.0),
            square("west", 0.0, 0.0, 1.0, 1.0),
        ]);
        assert_eq!(flipped.locate(1.0, 0.5).unwrap().label, "east");
    }

    #[test]
    fn test_overlapping_polygons_resolve_to_first() {
        let index = BoundaryIndex::build(vec![
            square("first", 0.0, 0.0, 2.0, 2.0),
            square("second", 1.0, 1.0, 3.0, 3.0),
        ]);
        assert_eq!(index.locate(1.5, 1.5).unwrap().label, "first");
    }

    #[test]
    fn test_empty_index() {
        let index = BoundaryIndex::build(vec![]);
        assert!(index.is_empty());
        assert!(index.locate(0.0, 0.0).is_none());
    }
}
