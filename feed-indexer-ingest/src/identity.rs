//! Deterministic record identities and feed content digests.

use serde_json::Value;
use sha3::{Digest, Sha3_256};

use feed_indexer_shared::Record;

/// Separates the hashed values so `("ab", "c")` and `("a", "bc")` differ.
const UNIT_SEPARATOR: char = '\u{1f}';

/// Derive a record's document id.
///
/// With `unique_fields` the identity is the hash of those fields' values in
/// declared order. Otherwise every field of the record contributes, as
/// `key=value` in sorted key order. Identical logical records map to the same
/// id on every run, and distinct records sharing all unique values collide.
pub fn record_id(record: &Record, unique_fields: &[String]) -> String {
    let parts: Vec<String> = if unique_fields.is_empty() {
        let mut keys: Vec<&String> = record.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| format!("{}={}", key, value_text(record.get(key))))
            .collect()
    } else {
        unique_fields
            .iter()
            .map(|field| value_text(record.get(field)))
            .collect()
    };

    let joined = parts.join(&UNIT_SEPARATOR.to_string());
    hex::encode(Sha3_256::digest(joined.as_bytes()))
}

/// Declared unique fields the record has no usable value for. Such fields
/// hash as empty, so records missing them can collide.
pub fn missing_unique_fields<'a>(record: &Record, unique_fields: &'a [String]) -> Vec<&'a str> {
    unique_fields
        .iter()
        .filter(|field| matches!(record.get(field.as_str()), None | Some(Value::Null)))
        .map(String::as_str)
        .collect()
}

/// Digest of a raw feed blob, compared across runs to detect changes.
pub fn content_digest(data: &str) -> String {
    hex::encode(Sha3_256::digest(data.as_bytes()))
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
