//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opensearch::{
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesRefreshParts},
    ingest::{IngestDeletePipelineParts, IngestPutPipelineParts},
    params::Conflicts,
    BulkParts, DeleteByQueryParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::SearchEngineConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::opensearch::index_config::get_index_settings;
use crate::opensearch::queries::build_older_than_query;
use feed_indexer_shared::{IndexedDocument, Pipeline};

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// let config = SearchEngineConfig::with_url("http://localhost:9200");
/// let client = OpenSearchClient::new(&config)?;
///
/// client.delete_index("dev-feeds-api_models-jobs-v1").await?;
/// client.create_index("dev-feeds-api_models-jobs-v1").await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    number_of_replicas: u32,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client from the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Server URL, request timeout and index settings
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If connection setup fails
    pub fn new(config: &SearchEngineConfig) -> Result<Self, SearchError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %config.url,
            timeout_secs = config.request_timeout.as_secs(),
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            number_of_replicas: config.number_of_replicas,
        })
    }

    /// Turn a non-success response into an error, optionally tolerating 404.
    async fn ensure_success(
        response: Response,
        allow_not_found: bool,
        to_error: fn(String) -> SearchError,
    ) -> Result<Response, SearchError> {
        let status = response.status_code();
        if status.is_success() || (allow_not_found && status.as_u16() == 404) {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, "Search engine request failed");
        Err(to_error(format!(
            "Request failed with status {}: {}",
            status, error_body
        )))
    }

    /// Build the alternating action/source lines of a bulk request.
    fn bulk_body(documents: &[IndexedDocument]) -> Vec<JsonBody<Value>> {
        let mut body = Vec::with_capacity(documents.len() * 2);
        for document in documents {
            body.push(JsonBody::new(json!({ "index": { "_id": document.id } })));
            body.push(JsonBody::new(document.body.clone()));
        }
        body
    }

    /// Summarize the failed items of a bulk response carrying `"errors": true`.
    fn bulk_failures(response: &Value) -> Option<String> {
        if !response["errors"].as_bool().unwrap_or(false) {
            return None;
        }

        let failures: Vec<String> = response["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let action = &item["index"];
                        let reason = &action["error"];
                        if reason.is_null() {
                            return None;
                        }
                        Some(format!(
                            "{}: {}",
                            action["_id"].as_str().unwrap_or("?"),
                            reason["reason"].as_str().unwrap_or("unknown reason")
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(format!(
            "{} item(s) failed: {}",
            failures.len(),
            failures.into_iter().take(5).collect::<Vec<_>>().join("; ")
        ))
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    #[instrument(skip(self))]
    async fn create_index(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(get_index_settings(self.number_of_replicas))
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        Self::ensure_success(response, false, SearchError::IndexCreationError).await?;
        debug!(index = %index, "Index created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::index_deletion(e.to_string()))?;

        // 404 is acceptable - the index may not exist yet
        Self::ensure_success(response, true, SearchError::IndexDeletionError).await?;
        debug!(index = %index, "Index deleted");
        Ok(())
    }

    #[instrument(skip(self, pipeline), fields(processors = pipeline.len()))]
    async fn put_pipeline(&self, id: &str, pipeline: &Pipeline) -> Result<(), SearchError> {
        let response = self
            .client
            .ingest()
            .put_pipeline(IngestPutPipelineParts::Id(id))
            .body(pipeline.to_json())
            .send()
            .await
            .map_err(|e| SearchError::pipeline(e.to_string()))?;

        Self::ensure_success(response, false, SearchError::PipelineError).await?;
        debug!(pipeline = %id, "Pipeline registered");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_pipeline(&self, id: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .ingest()
            .delete_pipeline(IngestDeletePipelineParts::Id(id))
            .send()
            .await
            .map_err(|e| SearchError::pipeline(e.to_string()))?;

        Self::ensure_success(response, true, SearchError::PipelineError).await?;
        debug!(pipeline = %id, "Pipeline deleted");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn bulk_index(
        &self,
        index: &str,
        pipeline: &str,
        documents: &[IndexedDocument],
    ) -> Result<(), SearchError> {
        if documents.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .pipeline(pipeline)
            .body(Self::bulk_body(documents))
            .send()
            .await
            .map_err(|e| SearchError::bulk_index(e.to_string()))?;

        let response = Self::ensure_success(response, false, SearchError::BulkIndexError).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        if let Some(failures) = Self::bulk_failures(&body) {
            error!(index = %index, failures = %failures, "Bulk request had failures");
            return Err(SearchError::bulk_index(failures));
        }

        debug!(index = %index, count = documents.len(), "Bulk request acknowledged");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_older_than(
        &self,
        index: &str,
        field: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, SearchError> {
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&[index]))
            .conflicts(Conflicts::Proceed)
            .body(build_older_than_query(field, cutoff))
            .send()
            .await
            .map_err(|e| SearchError::delete_by_query(e.to_string()))?;

        let response =
            Self::ensure_success(response, false, SearchError::DeleteByQueryError).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let deleted = body["deleted"].as_u64().unwrap_or(0);
        debug!(index = %index, deleted = deleted, "Pruned stale documents");
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn refresh_index(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::refresh(e.to_string()))?;

        Self::ensure_success(response, false, SearchError::RefreshError).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(matches!(body["status"].as_str(), Some("green") | Some("yellow")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_body_pairs_action_with_source() {
        let documents = vec![
            IndexedDocument::new("a1", json!({ "title": "First" })),
            IndexedDocument::new("b2", json!({ "title": "Second" })),
        ];

        let body = OpenSearchClient::bulk_body(&documents);

        assert_eq!(body.len(), 4);
    }

    #[test]
    fn test_bulk_failures_none_when_clean() {
        let response = json!({ "errors": false, "items": [] });
        assert!(OpenSearchClient::bulk_failures(&response).is_none());
    }

    #[test]
    fn test_bulk_failures_reports_item_reasons() {
        let response = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "a1", "status": 201 } },
                { "index": { "_id": "b2", "status": 400, "error": { "reason": "failed to parse field [date]" } } }
            ]
        });

        let failures = OpenSearchClient::bulk_failures(&response).unwrap();

        assert!(failures.starts_with("1 item(s) failed"));
        assert!(failures.contains("b2: failed to parse field [date]"));
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let config = SearchEngineConfig::with_url("not a url");
        let result = OpenSearchClient::new(&config);

        assert!(matches!(result, Err(SearchError::ConnectionError(_))));
    }
}
