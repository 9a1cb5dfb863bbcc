//! Error kinds shared across the pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("network error fetching {source_name}: {detail}")]
    Network { source_name: String, detail: String },

    #[error("schema drift in {source_name}: {detail}")]
    SchemaDrift { source_name: String, detail: String },

    #[error("no cached snapshot for {source_name} at {}", path.display())]
    CacheMiss { source_name: String, path: PathBuf },

    #[error("malformed boundary layer {layer}: {detail}")]
    MalformedBoundary { layer: String, detail: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
