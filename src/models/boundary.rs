//! Boundary layer identifiers for the spatial join.

use serde::{Deserialize, Serialize};

/// The three TEA administrative boundary layers joined onto vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryLayer {
    /// Education Service Center region
    EscRegion,
    /// County
    County,
    /// Independent school district
    SchoolDistrict,
}

impl BoundaryLayer {
    /// All layers in join order
    pub fn all() -> &'static [BoundaryLayer] {
        &[
            BoundaryLayer::EscRegion,
            BoundaryLayer::County,
            BoundaryLayer::SchoolDistrict,
        ]
    }

    /// File stem for the cached GeoJSON layer
    pub fn cache_name(&self) -> &'static str {
        match self {
            BoundaryLayer::EscRegion => "esc_regions",
            BoundaryLayer::County => "counties",
            BoundaryLayer::SchoolDistrict => "school_districts",
        }
    }

    /// Property keys tried in order for a display label
    pub fn label_keys(&self) -> &'static [&'static str] {
        match self {
            BoundaryLayer::EscRegion => &["ESC_REGION"],
            BoundaryLayer::County => &["FENAME", "NAME"],
            BoundaryLayer::SchoolDistrict => &["NAME"],
        }
    }
}

impl std::fmt::Display for BoundaryLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryLayer::EscRegion => write!(f, "esc_region"),
            BoundaryLayer::County => write!(f, "county"),
            BoundaryLayer::SchoolDistrict => write!(f, "school_district"),
        }
    }
}
