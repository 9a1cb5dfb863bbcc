//! Mesquite - Texas ESA vendor directory pipeline
//!
//! This library provides shared types and modules for the scrape and build binaries.

pub mod config;
pub mod enrich;
pub mod error;
pub mod excel;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod output;
pub mod pip;
pub mod site;

pub use error::{PipelineError, PipelineResult};
pub use models::BoundaryLayer;
