//! TEA ArcGIS portal retrieval for boundary layers.
//!
//! Portal item id -> feature service URL -> layer 0 -> object-id query ->
//! batched GeoJSON queries. Falls back to offset pagination when the service
//! refuses to enumerate object ids.

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::config::PortalConfig;
use crate::error::{PipelineError, PipelineResult};

const OUT_SR: &str = "4326";
const MAX_BATCH: u64 = 100;

pub struct ArcGisClient<'a> {
    client: &'a Client,
    portal: Url,
}

#[derive(Debug, Deserialize)]
struct ItemResponse {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayerMetadata {
    #[serde(default)]
    object_id_field: Option<String>,
    #[serde(default)]
    max_record_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectIdsResponse {
    #[serde(default)]
    object_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeaturePage {
    #[serde(default)]
    features: Vec<Value>,
    #[serde(default)]
    exceeded_transfer_limit: Option<bool>,
}

impl<'a> ArcGisClient<'a> {
    pub fn new(client: &'a Client, config: &PortalConfig) -> PipelineResult<Self> {
        let portal = Url::parse(&config.base_url)
            .map_err(|e| PipelineError::Config(format!("bad portal base URL: {e}")))?;
        Ok(Self { client, portal })
    }

    /// Resolve a portal item to its feature service URL.
    pub async fn item_service_url(&self, item_id: &str) -> PipelineResult<String> {
        let url = self
            .portal
            .join(&format!("sharing/rest/content/items/{item_id}"))
            .map_err(|e| PipelineError::Config(format!("bad portal item URL: {e}")))?;

        let item: ItemResponse = self
            .get_json(url.as_str(), &[("f", "json".to_string())])
            .await?;

        item.url.ok_or_else(|| PipelineError::MalformedBoundary {
            layer: item_id.to_string(),
            detail: "portal item has no service URL".to_string(),
        })
    }

    /// Download every feature of the item's layer 0 as one GeoJSON feature
    /// collection, serialized for the on-disk cache.
    pub async fn fetch_layer_geojson(&self, item_id: &str) -> PipelineResult<String> {
        let service_url = self.item_service_url(item_id).await?;
        let layer_url = format!("{service_url}/0");

        let metadata: LayerMetadata = self
            .get_json(&layer_url, &[("f", "json".to_string())])
            .await?;
        let object_id_field = metadata
            .object_id_field
            .unwrap_or_else(|| "OBJECTID".to_string());
        let batch_size = metadata.max_record_count.unwrap_or(2000).clamp(1, MAX_BATCH);

        let query_url = format!("{layer_url}/query");
        let ids: ObjectIdsResponse = self
            .get_json(
                &query_url,
                &[
                    ("where", "1=1".to_string()),
                    ("returnIdsOnly", "true".to_string()),
                    ("f", "json".to_string()),
                ],
            )
            .await?;

        let mut features: Vec<Value> = Vec::new();

        if let Some(mut object_ids) = ids.object_ids.filter(|ids| !ids.is_empty()) {
            object_ids.sort_unstable();
            let chunks: Vec<&[i64]> = object_ids.chunks(batch_size as usize).collect();

            let pb = ProgressBar::new(chunks.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }

            for chunk in chunks {
                let id_list = chunk
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                let page: FeaturePage = self
                    .get_json(
                        &query_url,
                        &[
                            ("objectIds", id_list),
                            ("outFields", "*".to_string()),
                            ("returnGeometry", "true".to_string()),
                            ("outSR", OUT_SR.to_string()),
                            ("f", "geojson".to_string()),
                        ],
                    )
                    .await?;
                features.extend(page.features);
                pb.inc(1);
            }
            pb.finish_and_clear();
        } else {
            let mut offset = 0usize;
            loop {
                let page: FeaturePage = self
                    .get_json(
                        &query_url,
                        &[
                            ("where", "1=1".to_string()),
                            ("outFields", "*".to_string()),
                            ("returnGeometry", "true".to_string()),
                            ("outSR", OUT_SR.to_string()),
                            ("f", "geojson".to_string()),
                            ("resultOffset", offset.to_string()),
                            ("resultRecordCount", batch_size.to_string()),
                            ("orderByFields", object_id_field.clone()),
                        ],
                    )
                    .await?;

                if page.features.is_empty() {
                    break;
                }
                offset += page.features.len();
                let exceeded = page.exceeded_transfer_limit.unwrap_or(false);
                features.extend(page.features);
                if !exceeded {
                    break;
                }
            }
        }

        info!("Fetched {} features for portal item {}", features.len(), item_id);

        let collection = serde_json::json!({
            "type": "FeatureCollection",
            "features": features,
        });
        serde_json::to_string(&collection).map_err(|e| PipelineError::MalformedBoundary {
            layer: item_id.to_string(),
            detail: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> PipelineResult<T> {
        let network = |detail: String| PipelineError::Network {
            source_name: url.to_string(),
            detail,
        };

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| network(e.to_string()))?;
        let response = response
            .error_for_status()
            .map_err(|e| network(e.to_string()))?;
        response.json().await.map_err(|e| network(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_page_parses_arcgis_shape() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{ "type": "Feature", "properties": {}, "geometry": null }],
            "exceededTransferLimit": true
        }"#;
        let page: FeaturePage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.features.len(), 1);
        assert_eq!(page.exceeded_transfer_limit, Some(true));
    }

    #[test]
    fn test_layer_metadata_defaults() {
        let metadata: LayerMetadata = serde_json::from_str("{}").unwrap();
        assert!(metadata.object_id_field.is_none());
        assert!(metadata.max_record_count.is_none());
    }
}
