//! Command implementations behind the CLI.
//!
//! Data sources are persisted as JSON files. Freshen and ingest read the
//! file, run the engine and write the mutated record back, on failure too, so
//! a source left dirty is rebuilt by the next run.

use std::path::Path;

use tracing::{info, warn};

use crate::IndexingError;
use feed_indexer_ingest::{FreshenOutcome, Reingester};
use feed_indexer_pipeline::{PipelineCompiler, Schema};
use feed_indexer_shared::{DataSource, Pipeline};

/// Load a data source record from a JSON file.
pub async fn read_source(path: &Path) -> Result<DataSource, IndexingError> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}

/// Write a data source record back to its JSON file.
pub async fn write_source(path: &Path, source: &DataSource) -> Result<(), IndexingError> {
    let text = serde_json::to_string_pretty(source)?;
    tokio::fs::write(path, text).await?;
    Ok(())
}

/// Freshen the data source stored at `path`.
pub async fn freshen(
    reingester: &Reingester,
    path: &Path,
) -> Result<FreshenOutcome, IndexingError> {
    let mut source = read_source(path).await?;
    let result = reingester.freshen(&mut source).await;
    persist(path, &source, result).await
}

/// Republish the pipeline and reload the data source stored at `path`.
pub async fn ingest(reingester: &Reingester, path: &Path) -> Result<FreshenOutcome, IndexingError> {
    let mut source = read_source(path).await?;
    let result = reingester.ingest(&mut source).await;
    persist(path, &source, result).await
}

async fn persist(
    path: &Path,
    source: &DataSource,
    result: Result<FreshenOutcome, feed_indexer_ingest::IngestError>,
) -> Result<FreshenOutcome, IndexingError> {
    write_source(path, source).await?;
    match result {
        Ok(outcome) => {
            info!(source = %source.label(), outcome = ?outcome, "Data source saved");
            Ok(outcome)
        }
        Err(e) => {
            warn!(source = %source.label(), state = ?source.ingest_state, "Data source saved after failure");
            Err(e.into())
        }
    }
}

/// Compile a YAML dictionary into a pipeline.
pub fn compile_dictionary(name: &str, dictionary: &str) -> Result<Pipeline, IndexingError> {
    let schema = Schema::from_yaml(dictionary)?;
    Ok(PipelineCompiler::new().compile(name, &schema)?)
}

/// Render a compiled pipeline as engine JSON or as a readable listing.
pub fn render_pipeline(pipeline: &Pipeline, as_json: bool) -> Result<String, IndexingError> {
    if as_json {
        Ok(serde_json::to_string_pretty(&pipeline.to_json())?)
    } else {
        Ok(PipelineCompiler::describe(pipeline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use feed_indexer_ingest::{Extractor, IngestError, LoaderConfig};
    use feed_indexer_repository::{SearchEngineClient, SearchError};
    use feed_indexer_shared::{IndexedDocument, IngestState, ResourceNames};
    use std::path::PathBuf;
    use std::sync::Arc;

    struct AcceptingClient {
        fail_bulk: bool,
    }

    #[async_trait]
    impl SearchEngineClient for AcceptingClient {
        async fn create_index(&self, _index: &str) -> Result<(), SearchError> {
            Ok(())
        }

        async fn delete_index(&self, _index: &str) -> Result<(), SearchError> {
            Ok(())
        }

        async fn put_pipeline(&self, _id: &str, _pipeline: &Pipeline) -> Result<(), SearchError> {
            Ok(())
        }

        async fn delete_pipeline(&self, _id: &str) -> Result<(), SearchError> {
            Ok(())
        }

        async fn bulk_index(
            &self,
            _index: &str,
            _pipeline: &str,
            _documents: &[IndexedDocument],
        ) -> Result<(), SearchError> {
            if self.fail_bulk {
                return Err(SearchError::connection("connection refused"));
            }
            Ok(())
        }

        async fn delete_older_than(
            &self,
            _index: &str,
            _field: &str,
            _cutoff: DateTime<Utc>,
        ) -> Result<u64, SearchError> {
            Ok(0)
        }

        async fn refresh_index(&self, _index: &str) -> Result<(), SearchError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(true)
        }
    }

    struct FixedExtractor;

    #[async_trait]
    impl Extractor for FixedExtractor {
        async fn extract(&self, _url: &str) -> Result<String, IngestError> {
            Ok("id,title\n1,Engineer\n2,Analyst\n".to_string())
        }
    }

    fn reingester(fail_bulk: bool) -> Reingester {
        Reingester::new(
            Arc::new(AcceptingClient { fail_bulk }),
            Arc::new(FixedExtractor),
            ResourceNames::new("test", "feeds"),
            LoaderConfig::default(),
        )
    }

    async fn source_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let source = DataSource::new("jobs", 1, "http://example.com/jobs.csv", "unique_fields: [id]\n");
        write_source(&path, &source).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_freshen_persists_fresh_state() {
        let path = source_file("feed-indexer-commands-fresh.json").await;

        let outcome = freshen(&reingester(false), &path).await.unwrap();

        assert_eq!(outcome, FreshenOutcome::Reingested { documents: 2 });
        let saved = read_source(&path).await.unwrap();
        assert_eq!(saved.ingest_state, IngestState::Fresh);
        assert!(saved.message_digest.is_some());
        assert!(saved.data.starts_with("id,title"));
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_freshen_persists_dirty_state() {
        let path = source_file("feed-indexer-commands-dirty.json").await;

        let err = freshen(&reingester(true), &path).await.unwrap_err();

        assert!(matches!(err, IndexingError::IngestError(_)));
        let saved = read_source(&path).await.unwrap();
        assert_eq!(saved.ingest_state, IngestState::Dirty);
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[test]
    fn test_compile_dictionary_renders_json() {
        let pipeline = compile_dictionary(
            "jobs",
            "title:\n  source: job_title\n  transformations:\n    - upcase\n",
        )
        .unwrap();

        let rendered = render_pipeline(&pipeline, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["description"], "Pipeline for jobs");
        assert_eq!(value["processors"][0]["rename"]["field"], "job_title");
        assert_eq!(value["processors"][1]["uppercase"]["field"], "title");
    }

    #[test]
    fn test_compile_dictionary_rejects_unknown_transformation() {
        let err = compile_dictionary("jobs", "title:\n  transformations:\n    - reverse\n")
            .unwrap_err();

        assert!(matches!(err, IndexingError::PipelineError(_)));
    }
}
