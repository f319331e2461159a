//! OpenSearch query builders.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use feed_indexer_shared::format_run_timestamp;

/// Build a query matching documents whose `field` is strictly before `cutoff`.
///
/// Documents written by the current run carry exactly `cutoff`, so they
/// never match.
pub fn build_older_than_query(field: &str, cutoff: DateTime<Utc>) -> Value {
    let mut range = serde_json::Map::new();
    range.insert(
        field.to_string(),
        json!({ "lt": format_run_timestamp(cutoff) }),
    );

    json!({
        "query": {
            "range": range
        }
    })
}
