//! Error types for the tap.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Malformed rows and invalid supplied catalogs are not errors:
/// they are compensated for where they are found.
#[derive(Debug, Error)]
pub enum TapError {
    /// Configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid JSON or misses a required key.
    #[error("invalid config: {0}")]
    Config(String),

    /// The query service could not be reached or answered with a non-2xx status.
    #[error("failed to fetch query results: {0}")]
    Retrieval(#[from] reqwest::Error),

    /// The query service answered, but not with the expected rows payload.
    #[error("unexpected query result payload: {0}")]
    PayloadShape(String),

    /// Writing to the output sink failed.
    #[error("failed to write output: {0}")]
    Sink(#[source] std::io::Error),

    /// A message could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tap operations.
pub type Result<T> = std::result::Result<T, TapError>;
