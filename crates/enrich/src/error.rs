use extract::{ResolveError, SummarizerError};
use registry::FetchError;
use store::StoreError;
use thiserror::Error;

/// Failure of a single record. Caught by the run loop and never fatal.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record {0} has no registry reference")]
    MissingReference(String),

    #[error("registry fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("graph resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Summarizer(#[from] SummarizerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode record output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure that stops a run before any record is processed.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("registry client could not be built: {0}")]
    Registry(#[from] FetchError),

    #[error("summarizer could not be built: {0}")]
    Summarizer(#[from] SummarizerError),

    #[error("invalid scoring rules: {0}")]
    Rules(#[from] regex::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
