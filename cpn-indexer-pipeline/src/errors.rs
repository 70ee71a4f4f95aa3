//! Error types for the indexer pipeline.

use cpn_indexer_repository::SearchError;
use cpn_indexer_shared::RecordError;
use thiserror::Error;

/// Errors that can occur in the indexer pipeline.
///
/// None of these are recovered from inside the pipeline; they abort the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid run parameters, detected before any I/O.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The content source could not be reached or rejected the request.
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// The content source returned a payload that could not be decoded.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The content source returned data that contradicts its own metadata.
    #[error("Upstream data anomaly: {0}")]
    DataAnomaly(String),

    /// A record could not be turned into a document.
    #[error("Transform error: {0}")]
    TransformError(String),

    /// Error from the store.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// IO error while reading local files.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a fetch error.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::FetchError(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Create a data anomaly error.
    pub fn anomaly(msg: impl Into<String>) -> Self {
        Self::DataAnomaly(msg.into())
    }

    /// Create a transform error.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::TransformError(msg.into())
    }
}

impl From<RecordError> for PipelineError {
    fn from(err: RecordError) -> Self {
        Self::DecodeError(err.to_string())
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::DecodeError(err.to_string())
        } else {
            Self::FetchError(err.to_string())
        }
    }
}
