//! Runtime settings read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::IndexingError;
use feed_indexer_ingest::LoaderConfig;
use feed_indexer_repository::config::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_URL};
use feed_indexer_repository::SearchEngineConfig;
use feed_indexer_shared::ResourceNames;

/// Default deployment environment, the first segment of every resource name.
const DEFAULT_ENVIRONMENT: &str = "development";

/// Default namespace, the second segment of every resource name.
const DEFAULT_NAMESPACE: &str = "feeds";

const DEFAULT_BATCH_SIZE: usize = 25;
const DEFAULT_MAX_CONCURRENT_BATCHES: usize = 1;
const DEFAULT_TIMEOUT_SECS: u64 = DEFAULT_REQUEST_TIMEOUT.as_secs();

/// Settings resolved from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub opensearch_url: String,
    pub environment: String,
    pub namespace: String,
    pub batch_size: usize,
    pub max_concurrent_batches: usize,
    pub request_timeout: Duration,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `FEED_INDEXER_ENV`: Resource name environment (default: development)
    /// - `FEED_INDEXER_NAMESPACE`: Resource name namespace (default: feeds)
    /// - `INGEST_BATCH_SIZE`: Documents per bulk request (default: 25)
    /// - `INGEST_MAX_CONCURRENT_BATCHES`: Bulk requests in flight (default: 1)
    /// - `OPENSEARCH_TIMEOUT_SECS`: Request timeout in seconds (default: 300)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            opensearch_url: text("OPENSEARCH_URL", DEFAULT_URL),
            environment: text("FEED_INDEXER_ENV", DEFAULT_ENVIRONMENT),
            namespace: text("FEED_INDEXER_NAMESPACE", DEFAULT_NAMESPACE),
            batch_size: number(&lookup, "INGEST_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            max_concurrent_batches: number(
                &lookup,
                "INGEST_MAX_CONCURRENT_BATCHES",
                DEFAULT_MAX_CONCURRENT_BATCHES,
            )?,
            request_timeout: Duration::from_secs(number(
                &lookup,
                "OPENSEARCH_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }

    pub fn search_engine(&self) -> SearchEngineConfig {
        SearchEngineConfig::with_url(&self.opensearch_url).timeout(self.request_timeout)
    }

    pub fn loader(&self) -> LoaderConfig {
        LoaderConfig {
            batch_size: self.batch_size,
            max_concurrent_batches: self.max_concurrent_batches,
        }
    }

    pub fn resource_names(&self) -> ResourceNames {
        ResourceNames::new(&self.environment, &self.namespace)
    }
}

fn number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, IndexingError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(IndexingError::config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();

        assert_eq!(settings.opensearch_url, "http://localhost:9200");
        assert_eq!(settings.environment, "development");
        assert_eq!(settings.namespace, "feeds");
        assert_eq!(settings.batch_size, 25);
        assert_eq!(settings.max_concurrent_batches, 1);
        assert_eq!(settings.request_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_defaults_match_search_engine_config() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        let engine = SearchEngineConfig::default();

        assert_eq!(settings.search_engine().url, engine.url);
        assert_eq!(settings.search_engine().request_timeout, engine.request_timeout);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("OPENSEARCH_URL", "http://search:9200"),
            ("FEED_INDEXER_ENV", "production"),
            ("INGEST_BATCH_SIZE", "100"),
            ("INGEST_MAX_CONCURRENT_BATCHES", "4"),
            ("OPENSEARCH_TIMEOUT_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(settings.search_engine().url, "http://search:9200");
        assert_eq!(settings.loader().batch_size, 100);
        assert_eq!(settings.loader().max_concurrent_batches, 4);
        assert_eq!(settings.request_timeout, Duration::from_secs(60));
        assert_eq!(
            settings.resource_names().index_name("jobs", 1),
            "production-feeds-api_models-jobs-v1"
        );
    }

    #[test]
    fn test_invalid_numbers_are_config_errors() {
        for value in ["zero", "0", "-3"] {
            let err = Settings::from_lookup(lookup(&[("INGEST_BATCH_SIZE", value)])).unwrap_err();
            assert!(matches!(err, IndexingError::ConfigError(_)));
        }
    }
}
