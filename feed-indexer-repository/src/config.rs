//! Configuration types for the search engine client.

use std::time::Duration;

/// Default OpenSearch URL.
pub const DEFAULT_URL: &str = "http://localhost:9200";

/// Default per-request timeout. Reindexing large feeds is slow.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for the search engine client.
#[derive(Debug, Clone)]
pub struct SearchEngineConfig {
    /// Search engine server URL.
    pub url: String,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// Replicas per index created for a data source.
    pub number_of_replicas: u32,
}

impl Default for SearchEngineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            number_of_replicas: 1,
        }
    }
}

impl SearchEngineConfig {
    /// Create a config for the given server URL with default settings.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Override the request timeout.
    pub fn timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Override the replica count.
    pub fn replicas(mut self, number_of_replicas: u32) -> Self {
        self.number_of_replicas = number_of_replicas;
        self
    }
}
