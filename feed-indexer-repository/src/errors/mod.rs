//! Error types for the feed indexer repository.

mod search_error;

pub use search_error::SearchError;
