//! Finder feed retrieval with snapshot caching.
//!
//! Successful fetches snapshot the raw payload byte-identical under the
//! cache. A failed fetch falls back to an existing snapshot with a warning;
//! with no snapshot the run fails.

use reqwest::Client;
use serde_json::Value;
use tracing::warn;
use url::Url;

use super::cache::SnapshotCache;
use crate::config::FeedConfig;
use crate::error::{PipelineError, PipelineResult};

pub const VENDORS_SNAPSHOT: &str = "vendors.json";
pub const FILTER_OPTIONS_SNAPSHOT: &str = "filter-options.json";
pub const CONFIG_SNAPSHOT: &str = "config.js";

pub struct FeedFetcher<'a> {
    client: &'a Client,
    cache: &'a SnapshotCache,
    vendors_url: Url,
    filter_options_url: Url,
    config_url: Url,
}

impl<'a> FeedFetcher<'a> {
    pub fn new(
        client: &'a Client,
        cache: &'a SnapshotCache,
        config: &FeedConfig,
    ) -> PipelineResult<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| PipelineError::Config(format!("bad feed base URL: {e}")))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| PipelineError::Config(format!("bad feed URL {path}: {e}")))
        };

        Ok(Self {
            client,
            cache,
            vendors_url: join(&format!("data/tx/{VENDORS_SNAPSHOT}"))?,
            filter_options_url: join(&format!("data/tx/{FILTER_OPTIONS_SNAPSHOT}"))?,
            config_url: join(&format!("data/tx/{CONFIG_SNAPSHOT}"))?,
        })
    }

    pub fn vendors_url(&self) -> &Url {
        &self.vendors_url
    }

    pub fn filter_options_url(&self) -> &Url {
        &self.filter_options_url
    }

    pub fn config_url(&self) -> &Url {
        &self.config_url
    }

    /// The vendor entries, as raw JSON values for inventory and dedupe.
    pub async fn fetch_vendors(&self) -> PipelineResult<Vec<Value>> {
        let bytes = self.fetch_raw(&self.vendors_url, VENDORS_SNAPSHOT).await?;
        serde_json::from_slice(&bytes).map_err(|e| PipelineError::SchemaDrift {
            source_name: VENDORS_SNAPSHOT.to_string(),
            detail: format!("expected a JSON array of vendor entries: {e}"),
        })
    }

    pub async fn fetch_filter_options(&self) -> PipelineResult<Value> {
        let bytes = self
            .fetch_raw(&self.filter_options_url, FILTER_OPTIONS_SNAPSHOT)
            .await?;
        serde_json::from_slice(&bytes).map_err(|e| PipelineError::SchemaDrift {
            source_name: FILTER_OPTIONS_SNAPSHOT.to_string(),
            detail: e.to_string(),
        })
    }

    pub async fn fetch_config_js(&self) -> PipelineResult<String> {
        let bytes = self.fetch_raw(&self.config_url, CONFIG_SNAPSHOT).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn fetch_raw(&self, url: &Url, snapshot: &str) -> PipelineResult<Vec<u8>> {
        match self.fetch_bytes(url).await {
            Ok(bytes) => {
                self.cache.store(snapshot, &bytes)?;
                Ok(bytes)
            }
            Err(err) if self.cache.contains(snapshot) => {
                warn!("Fetch of {} failed ({}); using cached snapshot", url, err);
                self.cache.load(snapshot)
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_bytes(&self, url: &Url) -> PipelineResult<Vec<u8>> {
        let network = |e: reqwest::Error| PipelineError::Network {
            source_name: url.to_string(),
            detail: e.to_string(),
        };

        let response = self.client.get(url.clone()).send().await.map_err(network)?;
        let response = response.error_for_status().map_err(network)?;
        let bytes = response.bytes().await.map_err(network)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_join_against_base() {
        let client = Client::new();
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        let fetcher = FeedFetcher::new(
            &client,
            &cache,
            &FeedConfig {
                base_url: "https://finder.example.org/".to_string(),
            },
        )
        .unwrap();

        assert_eq!(
            fetcher.vendors_url().as_str(),
            "https://finder.example.org/data/tx/vendors.json"
        );
        assert_eq!(
            fetcher.config_url().as_str(),
            "https://finder.example.org/data/tx/config.js"
        );
    }

    #[test]
    fn test_bad_base_url_is_config_error() {
        let client = Client::new();
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        let result = FeedFetcher::new(
            &client,
            &cache,
            &FeedConfig {
                base_url: "not a url".to_string(),
            },
        );
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
