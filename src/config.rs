//! Pipeline configuration.
//!
//! Endpoints ship as compiled-in defaults; a TOML file can override any
//! section for mirrors or test fixtures.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::models::BoundaryLayer;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub portal: PortalConfig,
    pub boundaries: BoundaryItems,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PortalConfig {
    pub base_url: String,
}

/// ArcGIS portal item ids for the three boundary layers.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoundaryItems {
    pub esc_regions: String,
    pub counties: String,
    pub school_districts: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://finder.educationfreedom.texas.gov/".to_string(),
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tea-texas.maps.arcgis.com".to_string(),
        }
    }
}

impl Default for BoundaryItems {
    fn default() -> Self {
        Self {
            esc_regions: "d273301a15b343a99d4c8211b7c112e0".to_string(),
            counties: "c71146b6426248a5a484d8b3c192b9fe".to_string(),
            school_districts: "edbb3c145304494382da3aa30c154b5e".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load the given file, or fall back to the compiled-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn boundary_item_id(&self, layer: BoundaryLayer) -> &str {
        match layer {
            BoundaryLayer::EscRegion => &self.boundaries.esc_regions,
            BoundaryLayer::County => &self.boundaries.counties,
            BoundaryLayer::SchoolDistrict => &self.boundaries.school_districts,
        }
    }
}
