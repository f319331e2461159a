//! JSON feed decoding.
//!
//! Accepted shapes: an array of objects, an object whose first
//! array-of-objects member (in document order) holds the rows, or a single
//! object.

use serde_json::Value;

use crate::errors::IngestError;
use feed_indexer_shared::Record;

pub(crate) fn decode(data: &str) -> Result<Vec<Record>, IngestError> {
    let root: Value = serde_json::from_str(data)?;

    match root {
        Value::Array(rows) => Ok(objects(rows)),
        Value::Object(object) => {
            let rows = object.values().find_map(|value| match value {
                Value::Array(rows) if rows.iter().any(Value::is_object) => Some(rows.clone()),
                _ => None,
            });
            match rows {
                Some(rows) => Ok(objects(rows)),
                None => Ok(vec![object]),
            }
        }
        other => Err(IngestError::extraction(format!(
            "JSON feed must be an array or an object, found {}",
            kind(&other)
        ))),
    }
}

fn objects(rows: Vec<Value>) -> Vec<Record> {
    rows.into_iter()
        .filter_map(|row| match row {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_array_skips_non_objects() {
        let records = decode(r#"[{"id": 1, "tags": ["a", "b"]}, 5, {"id": 2}]"#).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_rows_wrapped_in_object() {
        let records =
            decode(r#"{"total": 2, "results": [{"id": "a"}, {"id": "b"}]}"#).unwrap();

        let ids: Vec<&Value> = records.iter().map(|record| &record["id"]).collect();
        assert_eq!(ids, vec![&json!("a"), &json!("b")]);
    }

    #[test]
    fn test_first_row_array_in_document_order_wins() {
        let records =
            decode(r#"{"results": [{"id": "r1"}], "facets": [{"id": "f1"}]}"#).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], "r1");
    }

    #[test]
    fn test_single_object_is_one_record() {
        let records = decode(r#"{"id": "a", "labels": ["x"]}"#).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], "a");
    }

    #[test]
    fn test_scalar_document_is_extraction_failure() {
        let err = decode("42").unwrap_err();
        assert!(matches!(err, IngestError::ExtractionFailure(_)));
    }

    #[test]
    fn test_malformed_json_is_extraction_failure() {
        let err = decode("[{\"id\": ").unwrap_err();
        assert!(matches!(err, IngestError::ExtractionFailure(_)));
    }
}
