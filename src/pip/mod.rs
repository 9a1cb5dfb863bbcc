//! Point-in-polygon boundary join.

pub mod boundary;
pub mod geometry;
pub mod index;
pub mod service;

pub use boundary::{parse_boundary_layer, BoundaryPolygon};
pub use index::BoundaryIndex;
pub use service::{BoundaryService, LayerMatches};
