//! Fetches the raw feed content a data source points at.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::errors::IngestError;

/// Hands back the current content of a feed as one text blob.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Fetch the feed at `url`.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The raw feed content
    /// * `Err(IngestError::ExtractionFailure)` - If the feed is unreachable
    async fn extract(&self, url: &str) -> Result<String, IngestError>;
}

/// Extractor for `http(s)://` URLs and local files (`file://` or bare paths).
pub struct HttpExtractor {
    client: reqwest::Client,
}

impl HttpExtractor {
    pub fn new(timeout: Duration) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn local_path(url: &str) -> Option<PathBuf> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return None;
        }
        Some(PathBuf::from(url.strip_prefix("file://").unwrap_or(url)))
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    #[instrument(skip(self))]
    async fn extract(&self, url: &str) -> Result<String, IngestError> {
        if let Some(path) = Self::local_path(url) {
            let data = tokio::fs::read_to_string(&path).await.map_err(|e| {
                IngestError::extraction(format!("failed to read {}: {}", path.display(), e))
            })?;
            debug!(bytes = data.len(), "Read feed from disk");
            return Ok(data);
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::extraction(format!(
                "GET {} returned status {}",
                url, status
            )));
        }

        let data = response.text().await?;
        debug!(bytes = data.len(), status = %status, "Fetched feed");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_detection() {
        assert_eq!(
            HttpExtractor::local_path("file:///tmp/jobs.csv"),
            Some(PathBuf::from("/tmp/jobs.csv"))
        );
        assert_eq!(
            HttpExtractor::local_path("data/jobs.csv"),
            Some(PathBuf::from("data/jobs.csv"))
        );
        assert_eq!(HttpExtractor::local_path("https://example.com/jobs.csv"), None);
    }

    #[tokio::test]
    async fn test_extract_reads_local_file() {
        let path = std::env::temp_dir().join("feed-indexer-extractor-test.csv");
        tokio::fs::write(&path, "id,title\n1,Engineer\n").await.unwrap();

        let extractor = HttpExtractor::new(Duration::from_secs(5)).unwrap();
        let data = extractor
            .extract(&format!("file://{}", path.display()))
            .await
            .unwrap();

        assert_eq!(data, "id,title\n1,Engineer\n");
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_extraction_failure() {
        let extractor = HttpExtractor::new(Duration::from_secs(5)).unwrap();
        let err = extractor
            .extract("/definitely/not/here/feed.json")
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::ExtractionFailure(_)));
    }
}
