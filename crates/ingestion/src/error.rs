//! Error types for the ingestion crate.

use std::path::PathBuf;
use storage::CacheError;
use thiserror::Error;

/// Why a single remote request produced no value.
///
/// Per-point failures are expected (ocean cells, rate limits); callers log,
/// count and drop the point rather than aborting the pass.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },
}

impl FetchError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            FetchError::MalformedResponse {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    pub fn malformed(url: &str, message: impl Into<String>) -> Self {
        FetchError::MalformedResponse {
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// Metric label for this failure.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "timeout",
            FetchError::Transport { .. } => "transport",
            FetchError::MalformedResponse { .. } => "malformed",
        }
    }
}

/// Errors that abort a whole ingestion step.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
