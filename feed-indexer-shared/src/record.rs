//! Decoded feed records and the documents built from them.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field stamped on every document with the timestamp of the ingestion run
/// that last wrote it. Pruning deletes documents whose stamp predates a run.
pub const UPDATED_AT_FIELD: &str = "_updated_at";

/// Render a run timestamp the way it is stored in `_updated_at` and compared
/// when pruning. Both sides must use the same precision.
pub fn format_run_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One row of a decoded feed, keyed by source column name.
///
/// Keys keep the order the decoder saw them in.
pub type Record = serde_json::Map<String, Value>;

/// A document ready for bulk submission: its deterministic identity and the
/// body the ingest pipeline will transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Document identity, stable across ingestion runs.
    pub id: String,
    /// Document body.
    pub body: Value,
}

impl IndexedDocument {
    /// Create a new document.
    pub fn new(id: impl Into<String>, body: Value) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }
}
