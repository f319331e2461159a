//! The re-ingestion engine.
//!
//! A data source moves between three states:
//!
//! ```text
//! Fresh --freshen (digest unchanged)--> Fresh      (only data_imported_at moves)
//! Fresh --freshen (digest changed)----> Dirty ----> Rebuilding --> Fresh
//!                                                        |
//!                                                        +--(error)--> Dirty
//! ```
//!
//! A rebuild drops and recreates the index and the pipeline, bulk loads every
//! record with one run timestamp, prunes documents older than that timestamp
//! and refreshes the index.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument};

use crate::decoder::decode_records;
use crate::errors::IngestError;
use crate::extractor::Extractor;
use crate::identity::content_digest;
use crate::loader::{BulkLoader, LoadTarget, LoaderConfig};
use feed_indexer_pipeline::{PipelineCompiler, Schema};
use feed_indexer_repository::SearchEngineClient;
use feed_indexer_shared::{DataSource, IngestState, ResourceNames, UPDATED_AT_FIELD};

/// What a freshen or ingest call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshenOutcome {
    /// The feed content was unchanged; only the check timestamp moved.
    Unchanged,
    /// The index was rebuilt with this many documents.
    Reingested { documents: usize },
    /// Consolidated sources hold no data of their own.
    Skipped,
}

/// Drives extraction, change detection and index rebuilds.
pub struct Reingester {
    client: Arc<dyn SearchEngineClient>,
    extractor: Arc<dyn Extractor>,
    compiler: PipelineCompiler,
    names: ResourceNames,
    loader: BulkLoader,
}

impl Reingester {
    pub fn new(
        client: Arc<dyn SearchEngineClient>,
        extractor: Arc<dyn Extractor>,
        names: ResourceNames,
        loader_config: LoaderConfig,
    ) -> Self {
        Self {
            loader: BulkLoader::with_config(client.clone(), loader_config),
            client,
            extractor,
            compiler: PipelineCompiler::new(),
            names,
        }
    }

    pub fn names(&self) -> &ResourceNames {
        &self.names
    }

    /// Re-extract the feed and rebuild the index if its content changed.
    ///
    /// A source left `Dirty` by an earlier failed rebuild is rebuilt even
    /// when the content is unchanged.
    #[instrument(skip(self, source), fields(api = %source.api, version = source.version_number))]
    pub async fn freshen(&self, source: &mut DataSource) -> Result<FreshenOutcome, IngestError> {
        if source.is_consolidated() {
            info!("Consolidated source has no feed, skipping");
            return Ok(FreshenOutcome::Skipped);
        }

        let data = self.extractor.extract(&source.url).await?;
        let digest = content_digest(&data);
        let now = Utc::now();

        let changed = source.message_digest.as_deref() != Some(digest.as_str());
        if !changed && source.ingest_state != IngestState::Dirty {
            source.data_imported_at = Some(now);
            info!("Feed unchanged");
            return Ok(FreshenOutcome::Unchanged);
        }

        if changed {
            info!(digest = %digest, bytes = data.len(), "Feed changed");
            source.data = data;
            source.message_digest = Some(digest);
            source.data_changed_at = Some(now);
        } else {
            info!("Retrying rebuild of dirty source");
        }
        source.data_imported_at = Some(now);
        source.ingest_state = IngestState::Dirty;

        self.ingest_and_prune(source).await
    }

    /// Republish the pipeline and reload the stored data, without pruning.
    ///
    /// Used when the dictionary changed but the feed did not.
    #[instrument(skip(self, source), fields(api = %source.api, version = source.version_number))]
    pub async fn ingest(&self, source: &mut DataSource) -> Result<FreshenOutcome, IngestError> {
        self.rebuild(source, false).await
    }

    /// Rebuild the index from the stored data, then prune documents the new
    /// run did not write.
    #[instrument(skip(self, source), fields(api = %source.api, version = source.version_number))]
    pub async fn ingest_and_prune(
        &self,
        source: &mut DataSource,
    ) -> Result<FreshenOutcome, IngestError> {
        self.rebuild(source, true).await
    }

    async fn rebuild(
        &self,
        source: &mut DataSource,
        prune: bool,
    ) -> Result<FreshenOutcome, IngestError> {
        if source.is_consolidated() {
            return Ok(FreshenOutcome::Skipped);
        }

        source.ingest_state = IngestState::Rebuilding;
        match self.run_rebuild(source, prune).await {
            Ok(documents) => {
                source.ingest_state = IngestState::Fresh;
                info!(documents = documents, "Rebuild complete");
                Ok(FreshenOutcome::Reingested { documents })
            }
            Err(e) => {
                source.ingest_state = IngestState::Dirty;
                error!(error = %e, "Rebuild failed, source left dirty");
                Err(e)
            }
        }
    }

    async fn run_rebuild(&self, source: &DataSource, prune: bool) -> Result<usize, IngestError> {
        let index = self.names.index_name(&source.api, source.version_number);
        let pipeline_id = self.names.pipeline_id(&source.api, source.version_number);

        // Everything that can fail without the engine runs before the old
        // index is dropped.
        let schema = Schema::from_yaml(&source.dictionary)?;
        let pipeline = self.compiler.compile(&pipeline_id, &schema)?;
        let records = decode_records(&source.data)?;

        let run_at = Utc::now();
        let documents = BulkLoader::documents(&schema, records, run_at);

        self.client.delete_index(&index).await?;
        self.client.delete_pipeline(&pipeline_id).await?;
        self.client.put_pipeline(&pipeline_id, &pipeline).await?;
        self.client.create_index(&index).await?;

        let target = LoadTarget {
            index: &index,
            pipeline: &pipeline_id,
        };
        let loaded = self.loader.load(target, &documents).await?;

        if prune {
            let deleted = self
                .client
                .delete_older_than(&index, UPDATED_AT_FIELD, run_at)
                .await?;
            info!(deleted = deleted, "Pruned documents absent from this run");
        }

        self.client.refresh_index(&index).await?;
        Ok(loaded)
    }
}
