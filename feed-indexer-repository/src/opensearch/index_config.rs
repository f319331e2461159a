//! OpenSearch index settings and mappings.
//!
//! This module defines the settings every data source index is created with.
//! Feed fields are mapped dynamically; only the run timestamp is pinned.

use serde_json::{json, Value};

use feed_indexer_shared::UPDATED_AT_FIELD;

/// Get the index settings and mappings for a data source index.
///
/// The configuration includes:
/// - **snowball_asciifolding_nostop**: stemmed, accent-folded full text
/// - **keyword_lowercase**: case-insensitive exact matching
/// - a `date` mapping for the run timestamp pruning queries rely on
pub fn get_index_settings(number_of_replicas: u32) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(UPDATED_AT_FIELD.to_string(), json!({ "type": "date" }));

    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": number_of_replicas,
            "analysis": {
                "analyzer": {
                    "snowball_asciifolding_nostop": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["asciifolding", "lowercase", "snowball"]
                    },
                    "keyword_lowercase": {
                        "type": "custom",
                        "tokenizer": "keyword",
                        "filter": ["lowercase"]
                    }
                }
            }
        },
        "mappings": {
            "dynamic": true,
            "properties": properties
        }
    })
}
