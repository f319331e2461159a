//! XML feed decoding.
//!
//! Every child element of the document root is a record. Child elements of a
//! record become string fields and its attributes become fields too. A field
//! element repeated within one record collects into an array.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::Value;

use crate::errors::IngestError;
use feed_indexer_shared::Record;

const ROOT_DEPTH: usize = 1;
const RECORD_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

pub(crate) fn decode(data: &str) -> Result<Vec<Record>, IngestError> {
    let mut reader = Reader::from_str(data);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut record: Option<Record> = None;
    let mut field: Option<(String, String)> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                depth += 1;
                match depth {
                    RECORD_DEPTH => record = Some(attributes(&element)?),
                    FIELD_DEPTH => field = Some((name(&element), String::new())),
                    _ => {}
                }
            }
            Event::Empty(element) => match depth + 1 {
                RECORD_DEPTH => records.push(attributes(&element)?),
                FIELD_DEPTH => {
                    if let Some(record) = record.as_mut() {
                        insert_field(record, name(&element), String::new());
                    }
                }
                _ => {}
            },
            Event::Text(text) => {
                if let Some((_, value)) = field.as_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| IngestError::extraction(format!("malformed XML: {}", e)))?;
                    append_text(value, &text);
                }
            }
            Event::CData(cdata) => {
                if let Some((_, value)) = field.as_mut() {
                    append_text(value, String::from_utf8_lossy(&cdata.into_inner()).trim());
                }
            }
            Event::End(_) => {
                match depth {
                    FIELD_DEPTH => {
                        if let (Some(record), Some((key, value))) = (record.as_mut(), field.take())
                        {
                            insert_field(record, key, value);
                        }
                    }
                    RECORD_DEPTH => {
                        if let Some(record) = record.take() {
                            records.push(record);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth >= ROOT_DEPTH {
        return Err(IngestError::extraction("malformed XML: unclosed elements"));
    }

    Ok(records)
}

fn name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn attributes(element: &BytesStart<'_>) -> Result<Record, IngestError> {
    let mut record = Record::new();
    for attribute in element.attributes() {
        let attribute = attribute
            .map_err(|e| IngestError::extraction(format!("malformed XML attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| IngestError::extraction(format!("malformed XML attribute: {}", e)))?;
        record.insert(key, Value::String(value.into_owned()));
    }
    Ok(record)
}

fn append_text(value: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !value.is_empty() {
        value.push(' ');
    }
    value.push_str(text);
}

fn insert_field(record: &mut Record, key: String, value: String) {
    let value = Value::String(value);
    match record.get_mut(&key) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            record.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<jobs>
  <job id="j-1">
    <title>Trade &amp; Policy Analyst</title>
    <country>France</country>
    <country>Spain</country>
    <summary><![CDATA[<b>Remote</b> ok]]></summary>
  </job>
  <job id="j-2">
    <title>Economist</title>
    <notes/>
  </job>
</jobs>
"#;

    #[test]
    fn test_decode_records_and_fields() {
        let records = decode(FEED).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], "j-1");
        assert_eq!(records[0]["title"], "Trade & Policy Analyst");
        assert_eq!(records[0]["summary"], "<b>Remote</b> ok");
        assert_eq!(records[1]["title"], "Economist");
        assert_eq!(records[1]["notes"], "");
    }

    #[test]
    fn test_repeated_elements_become_array() {
        let records = decode(FEED).unwrap();

        assert_eq!(records[0]["country"], json!(["France", "Spain"]));
    }

    #[test]
    fn test_empty_record_element_keeps_attributes() {
        let records = decode(r#"<?xml version="1.0"?><rows><row code="FR"/></rows>"#).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["code"], "FR");
    }

    #[test]
    fn test_mismatched_tags_are_extraction_failure() {
        let err = decode(r#"<?xml version="1.0"?><rows><row><a>1</b></row></rows>"#).unwrap_err();

        assert!(matches!(err, IngestError::ExtractionFailure(_)));
    }
}
