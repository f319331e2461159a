//! Search engine client trait definition.
//!
//! This module defines the abstract interface for the search engine calls a
//! rebuild needs, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, in-memory test doubles).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::SearchError;
use feed_indexer_shared::{IndexedDocument, Pipeline};

/// Abstract interface for search engine operations.
///
/// Every call is a blocking network round trip. Callers await each call
/// before issuing any call that depends on it.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`: distinct data sources are
/// rebuilt concurrently against one shared client.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchError>` for consistent error handling.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Create an index with the data source settings and mappings.
    ///
    /// # Arguments
    ///
    /// * `index` - The index name
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchError::IndexCreationError)` - If creation fails, including
    ///   when the index already exists
    async fn create_index(&self, index: &str) -> Result<(), SearchError>;

    /// Delete an index. A missing index is not an error.
    ///
    /// # Arguments
    ///
    /// * `index` - The index name
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was deleted (or didn't exist)
    /// * `Err(SearchError)` - If the deletion fails
    async fn delete_index(&self, index: &str) -> Result<(), SearchError>;

    /// Register (or replace) an ingest pipeline.
    ///
    /// # Arguments
    ///
    /// * `id` - The pipeline id documents will reference
    /// * `pipeline` - The compiled pipeline descriptor
    async fn put_pipeline(&self, id: &str, pipeline: &Pipeline) -> Result<(), SearchError>;

    /// Delete an ingest pipeline. A missing pipeline is not an error.
    async fn delete_pipeline(&self, id: &str) -> Result<(), SearchError>;

    /// Index documents in one bulk request, routed through `pipeline`.
    ///
    /// Documents with an existing id are replaced.
    ///
    /// # Arguments
    ///
    /// * `index` - The target index
    /// * `pipeline` - The ingest pipeline id applied to every document
    /// * `documents` - Identity and body of each document
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every document was accepted
    /// * `Err(SearchError::BulkIndexError)` - If the request or any item failed
    async fn bulk_index(
        &self,
        index: &str,
        pipeline: &str,
        documents: &[IndexedDocument],
    ) -> Result<(), SearchError>;

    /// Delete every document whose `field` is strictly older than `cutoff`.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - The number of documents deleted
    /// * `Err(SearchError::DeleteByQueryError)` - If the query fails
    async fn delete_older_than(
        &self,
        index: &str,
        field: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, SearchError>;

    /// Make every acknowledged write visible to search.
    async fn refresh_index(&self, index: &str) -> Result<(), SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
