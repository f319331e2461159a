//! Error types for the feed indexer ingest.

use feed_indexer_pipeline::PipelineError;
use feed_indexer_repository::SearchError;
use thiserror::Error;

/// Errors that can occur while extracting, decoding or rebuilding a feed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    /// The feed could not be fetched or decoded into records.
    #[error("Extraction failure: {0}")]
    ExtractionFailure(String),

    /// The dictionary could not be compiled into a pipeline.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// A search engine call failed or the engine could not be reached.
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(#[from] SearchError),
}

impl IngestError {
    /// Create an extraction failure.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::ExtractionFailure(msg.into())
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::ExtractionFailure(format!("malformed delimited data: {}", err))
    }
}

impl From<quick_xml::Error> for IngestError {
    fn from(err: quick_xml::Error) -> Self {
        Self::ExtractionFailure(format!("malformed XML: {}", err))
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        Self::ExtractionFailure(format!("malformed JSON: {}", err))
    }
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        Self::ExtractionFailure(err.to_string())
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::ExtractionFailure(err.to_string())
    }
}
