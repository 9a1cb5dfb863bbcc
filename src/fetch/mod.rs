//! HTTP retrieval and snapshot caching.

pub mod arcgis;
pub mod cache;
pub mod client;
pub mod feed;

pub use arcgis::ArcGisClient;
pub use cache::SnapshotCache;
pub use client::build_client;
pub use feed::FeedFetcher;
