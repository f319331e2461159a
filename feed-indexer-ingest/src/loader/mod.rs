//! Loader module for the feed indexer ingest.
//!
//! Turns decoded records into identified, timestamped documents and bulk
//! loads them into an index through its ingest pipeline.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::IngestError;
use crate::identity::{missing_unique_fields, record_id};
use feed_indexer_pipeline::Schema;
use feed_indexer_repository::SearchEngineClient;
use feed_indexer_shared::{format_run_timestamp, IndexedDocument, Record, UPDATED_AT_FIELD};

/// Configuration for the bulk loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Number of documents submitted per bulk request.
    pub batch_size: usize,
    /// Maximum number of bulk requests in flight at once.
    pub max_concurrent_batches: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            max_concurrent_batches: 1,
        }
    }
}

/// Where a load writes to.
#[derive(Debug, Clone, Copy)]
pub struct LoadTarget<'a> {
    pub index: &'a str,
    pub pipeline: &'a str,
}

/// Loader that indexes documents into the search engine.
///
/// The loader is responsible for:
/// - Deriving each document's identity from the dictionary's unique fields
/// - Stamping every document of a run with the same `_updated_at`
/// - Batching documents for bulk indexing
pub struct BulkLoader {
    client: Arc<dyn SearchEngineClient>,
    config: LoaderConfig,
}

impl BulkLoader {
    /// Create a new bulk loader with the default configuration.
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self::with_config(client, LoaderConfig::default())
    }

    /// Create a new bulk loader with custom configuration.
    pub fn with_config(client: Arc<dyn SearchEngineClient>, config: LoaderConfig) -> Self {
        let config = LoaderConfig {
            batch_size: config.batch_size.max(1),
            max_concurrent_batches: config.max_concurrent_batches.max(1),
        };
        Self { client, config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Build the documents of one run from decoded records.
    pub fn documents(
        schema: &Schema,
        records: Vec<Record>,
        run_at: DateTime<Utc>,
    ) -> Vec<IndexedDocument> {
        let stamp = Value::String(format_run_timestamp(run_at));
        let mut incomplete = 0usize;
        let mut missing_fields: BTreeSet<String> = BTreeSet::new();

        let documents = records
            .into_iter()
            .map(|record| {
                let mut body = schema.transform(record);
                let missing = missing_unique_fields(&body, schema.unique_fields());
                if !missing.is_empty() {
                    incomplete += 1;
                    missing_fields.extend(missing.into_iter().map(str::to_string));
                }
                let id = record_id(&body, schema.unique_fields());
                body.insert(UPDATED_AT_FIELD.to_string(), stamp.clone());
                IndexedDocument::new(id, Value::Object(body))
            })
            .collect();

        // Unique fields name source columns; a renamed target never matches.
        if incomplete > 0 {
            warn!(
                records = incomplete,
                fields = ?missing_fields,
                "Records lack unique fields and may share a document id"
            );
        }

        documents
    }

    /// Bulk load documents, returning once every batch is acknowledged.
    ///
    /// The first failing batch aborts the load.
    #[instrument(skip(self, documents), fields(index = %target.index, count = documents.len()))]
    pub async fn load(
        &self,
        target: LoadTarget<'_>,
        documents: &[IndexedDocument],
    ) -> Result<usize, IngestError> {
        if documents.is_empty() {
            info!("No documents to load");
            return Ok(0);
        }

        let batches: Vec<&[IndexedDocument]> = documents.chunks(self.config.batch_size).collect();
        let batch_count = batches.len();

        debug!(
            batches = batch_count,
            batch_size = self.config.batch_size,
            max_concurrent = self.config.max_concurrent_batches,
            "Flushing documents to search index"
        );

        stream::iter(batches.into_iter().enumerate())
            .map(|(number, batch)| async move {
                self.client
                    .bulk_index(target.index, target.pipeline, batch)
                    .await
                    .map_err(|e| {
                        error!(batch = number, error = %e, "Bulk request failed");
                        IngestError::from(e)
                    })
            })
            .buffer_unordered(self.config.max_concurrent_batches)
            .try_collect::<Vec<()>>()
            .await?;

        info!(
            count = documents.len(),
            batches = batch_count,
            "Successfully indexed documents"
        );
        Ok(documents.len())
    }
}
