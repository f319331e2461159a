//! Dependency initialization and wiring for the feed indexer.

use std::sync::Arc;
use tracing::info;

use super::Settings;
use crate::IndexingError;
use feed_indexer_ingest::{HttpExtractor, Reingester};
use feed_indexer_repository::{OpenSearchClient, SearchEngineClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The re-ingestion engine ready to freshen data sources.
    pub reingester: Reingester,
}

impl Dependencies {
    /// Initialize all dependencies from the given settings.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - `SearchError` if the client cannot be built or
    ///   reached, `ConfigError` if the cluster reports unhealthy
    pub async fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            environment = %settings.environment,
            namespace = %settings.namespace,
            batch_size = settings.batch_size,
            max_concurrent_batches = settings.max_concurrent_batches,
            "Initializing dependencies"
        );

        // Initialize OpenSearch client
        let search_client = OpenSearchClient::new(&settings.search_engine())?;

        // Verify OpenSearch is reachable
        let healthy = search_client.health_check().await?;

        if !healthy {
            return Err(IndexingError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        let extractor = HttpExtractor::new(settings.request_timeout)?;

        let reingester = Reingester::new(
            Arc::new(search_client),
            Arc::new(extractor),
            settings.resource_names(),
            settings.loader(),
        );

        Ok(Self { reingester })
    }
}
