//! Boundary polygon loading from cached GeoJSON layers.

use geo::{BoundingRect, MultiPolygon};
use geojson::{FeatureCollection, GeoJson, JsonObject};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};
use crate::models::BoundaryLayer;

/// A single boundary polygon with its source properties.
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    pub layer: BoundaryLayer,
    /// Display label pulled from the layer's naming properties
    pub label: String,
    /// Full property map of the source feature
    pub properties: JsonObject,
    pub geometry: MultiPolygon<f64>,
}

impl BoundaryPolygon {
    /// Get the bounding box of this boundary
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    /// Render a property for a table cell; absent keys render empty.
    pub fn property(&self, key: &str) -> String {
        self.properties
            .get(key)
            .map(crate::models::vendor::value_to_cell)
            .unwrap_or_default()
    }
}

/// Parse a cached GeoJSON layer into boundary polygons, preserving the
/// feature collection's document order.
pub fn parse_boundary_layer(
    layer: BoundaryLayer,
    raw: &str,
) -> PipelineResult<Vec<BoundaryPolygon>> {
    let geojson: GeoJson = raw.parse().map_err(|e: geojson::Error| malformed(layer, &e))?;
    let collection = FeatureCollection::try_from(geojson).map_err(|e| malformed(layer, &e))?;

    let mut boundaries = Vec::new();

    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            continue;
        };
        let geometry = match geo_types::Geometry::<f64>::try_from(geometry) {
            Ok(geo_types::Geometry::Polygon(polygon)) => MultiPolygon::new(vec![polygon]),
            Ok(geo_types::Geometry::MultiPolygon(multi)) => multi,
            Ok(other) => {
                debug!("Skipping non-polygonal {} feature: {:?}", layer, other);
                continue;
            }
            Err(e) => {
                debug!("Skipping unreadable {} geometry: {}", layer, e);
                continue;
            }
        };

        let properties = feature.properties.unwrap_or_default();
        let label = layer
            .label_keys()
            .iter()
            .find_map(|key| properties.get(*key).and_then(label_text))
            .unwrap_or_default();

        boundaries.push(BoundaryPolygon {
            layer,
            label,
            properties,
            geometry,
        });
    }

    if boundaries.is_empty() {
        return Err(PipelineError::MalformedBoundary {
            layer: layer.to_string(),
            detail: "no polygon features in layer".to_string(),
        });
    }

    info!("Loaded {} {} boundaries", boundaries.len(), layer);

    Ok(boundaries)
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn malformed(layer: BoundaryLayer, error: &dyn std::fmt::Display) -> PipelineError {
    PipelineError::MalformedBoundary {
        layer: layer.to_string(),
        detail: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTY_LAYER: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "FENAME": "TRAVIS", "FIPS": "48453" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-98.0, 30.0], [-97.0, 30.0], [-97.0, 31.0], [-98.0, 31.0], [-98.0, 30.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "POINTLESS" },
                "geometry": { "type": "Point", "coordinates": [-97.5, 30.5] }
            }
        ]
    }"#;

    #[test]
    fn test_parse_layer_keeps_polygons_only() {
        let boundaries = parse_boundary_layer(BoundaryLayer::County, COUNTY_LAYER).unwrap();
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].label, "TRAVIS");
        assert_eq!(boundaries[0].property("FIPS"), "48453");
        assert_eq!(boundaries[0].property("MISSING"), "");
    }

    #[test]
    fn test_parse_layer_rejects_garbage() {
        let result = parse_boundary_layer(BoundaryLayer::County, "not geojson");
        assert!(matches!(
            result,
            Err(PipelineError::MalformedBoundary { .. })
        ));
    }

    #[test]
    fn test_parse_layer_rejects_empty_collection() {
        let raw = r#"{ "type": "FeatureCollection", "features": [] }"#;
        let result = parse_boundary_layer(BoundaryLayer::EscRegion, raw);
        assert!(matches!(
            result,
            Err(PipelineError::MalformedBoundary { .. })
        ));
    }

    #[test]
    fn test_bbox_covers_geometry() {
        let boundaries = parse_boundary_layer(BoundaryLayer::County, COUNTY_LAYER).unwrap();
        let (min_x, min_y, max_x, max_y) = boundaries[0].bbox().unwrap();
        assert_eq!((min_x, min_y, max_x, max_y), (-98.0, 30.0, -97.0, 31.0));
    }
}
