//! Shared HTTP client construction.

use reqwest::Client;
use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};

const USER_AGENT: &str = "mesquite/0.1 (vendor directory pipeline)";

pub fn build_client() -> PipelineResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| PipelineError::Network {
            source_name: "http client".to_string(),
            detail: e.to_string(),
        })
}
