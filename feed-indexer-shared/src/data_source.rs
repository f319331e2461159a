//! The data source record mutated by the re-ingestion engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a data source stands relative to its search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestState {
    /// The index reflects the stored data.
    #[default]
    Fresh,
    /// The stored data changed (or a rebuild failed) and the index is stale.
    Dirty,
    /// A rebuild is in flight.
    Rebuilding,
}

/// A feed registered for ingestion, identified by `(api, version_number)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    /// API name, part of the identity.
    pub api: String,
    /// API version, part of the identity.
    pub version_number: u32,
    /// Display name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Where the extractor fetches the feed from.
    #[serde(default)]
    pub url: String,
    /// Raw extracted feed content.
    #[serde(default)]
    pub data: String,
    /// Content digest of `data`.
    #[serde(default)]
    pub message_digest: Option<String>,
    /// When `data` last changed.
    #[serde(default)]
    pub data_changed_at: Option<DateTime<Utc>>,
    /// When the feed was last checked.
    #[serde(default)]
    pub data_imported_at: Option<DateTime<Utc>>,
    #[serde(default = "default_published")]
    pub published: bool,
    /// Consolidated sources fan queries out to other sources and hold no data.
    #[serde(default)]
    pub consolidated: bool,
    /// YAML dictionary describing how records map onto indexed fields.
    #[serde(default)]
    pub dictionary: String,
    #[serde(default)]
    pub ingest_state: IngestState,
}

fn default_published() -> bool {
    true
}

impl DataSource {
    /// Create a published, never-ingested data source.
    pub fn new(
        api: impl Into<String>,
        version_number: u32,
        url: impl Into<String>,
        dictionary: impl Into<String>,
    ) -> Self {
        let api = api.into();
        Self {
            name: api.clone(),
            api,
            version_number,
            description: None,
            url: url.into(),
            data: String::new(),
            message_digest: None,
            data_changed_at: None,
            data_imported_at: None,
            published: true,
            consolidated: false,
            dictionary: dictionary.into(),
            ingest_state: IngestState::Fresh,
        }
    }

    pub fn is_consolidated(&self) -> bool {
        self.consolidated
    }

    /// Human readable identity, e.g. `jobs v2`.
    pub fn label(&self) -> String {
        format!("{} v{}", self.api, self.version_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_data_source_defaults() {
        let source = DataSource::new("jobs", 2, "http://example.com/jobs.csv", "");

        assert_eq!(source.name, "jobs");
        assert!(source.published);
        assert!(!source.is_consolidated());
        assert_eq!(source.ingest_state, IngestState::Fresh);
        assert!(source.message_digest.is_none());
        assert_eq!(source.label(), "jobs v2");
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let source: DataSource =
            serde_json::from_str(r#"{"api": "jobs", "version_number": 1}"#).unwrap();

        assert!(source.published);
        assert_eq!(source.ingest_state, IngestState::Fresh);
    }

    #[test]
    fn test_ingest_state_serializes_snake_case() {
        let value = serde_json::to_value(IngestState::Rebuilding).unwrap();
        assert_eq!(value, "rebuilding");
    }
}
