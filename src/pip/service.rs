//! Boundary join service: one lookup per layer for a vendor point.

use std::sync::Arc;
use tracing::debug;

use super::{BoundaryIndex, BoundaryPolygon};
use crate::models::BoundaryLayer;

/// Matches for one point, one slot per boundary layer. `None` is the explicit
/// unresolved state.
#[derive(Debug, Clone, Default)]
pub struct LayerMatches {
    pub esc_region: Option<Arc<BoundaryPolygon>>,
    pub county: Option<Arc<BoundaryPolygon>>,
    pub school_district: Option<Arc<BoundaryPolygon>>,
}

impl LayerMatches {
    pub fn get(&self, layer: BoundaryLayer) -> Option<&Arc<BoundaryPolygon>> {
        match layer {
            BoundaryLayer::EscRegion => self.esc_region.as_ref(),
            BoundaryLayer::County => self.county.as_ref(),
            BoundaryLayer::SchoolDistrict => self.school_district.as_ref(),
        }
    }

    fn set(&mut self, layer: BoundaryLayer, matched: Option<Arc<BoundaryPolygon>>) {
        match layer {
            BoundaryLayer::EscRegion => self.esc_region = matched,
            BoundaryLayer::County => self.county = matched,
            BoundaryLayer::SchoolDistrict => self.school_district = matched,
        }
    }
}

/// Point-in-polygon lookup across the three boundary layers.
pub struct BoundaryService {
    esc_region: BoundaryIndex,
    county: BoundaryIndex,
    school_district: BoundaryIndex,
}

impl BoundaryService {
    pub fn new(
        esc_region: BoundaryIndex,
        county: BoundaryIndex,
        school_district: BoundaryIndex,
    ) -> Self {
        Self {
            esc_region,
            county,
            school_district,
        }
    }

    fn index(&self, layer: BoundaryLayer) -> &BoundaryIndex {
        match layer {
            BoundaryLayer::EscRegion => &self.esc_region,
            BoundaryLayer::County => &self.county,
            BoundaryLayer::SchoolDistrict => &self.school_district,
        }
    }

    /// Resolve every layer independently; a point can sit inside a county
    /// polygon while falling outside every district polygon.
    pub fn lookup(&self, lon: f64, lat: f64) -> LayerMatches {
        let mut matches = LayerMatches::default();
        for layer in BoundaryLayer::all() {
            matches.set(*layer, self.index(*layer).locate(lon, lat));
        }

        debug!(
            "Boundary lookup at ({}, {}): esc={} county={} district={}",
            lon,
            lat,
            matches.esc_region.is_some(),
            matches.county.is_some(),
            matches.school_district.is_some()
        );

        matches
    }
}
