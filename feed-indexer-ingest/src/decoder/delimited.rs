//! CSV and TSV decoding. The header row names the fields.

use serde_json::Value;

use crate::errors::IngestError;
use feed_indexer_shared::Record;

pub(crate) fn decode(data: &str, delimiter: u8) -> Result<Vec<Record>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        // Short rows leave trailing fields absent; surplus cells are dropped.
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.clone(), Value::String(cell.to_string())))
            .collect();
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_csv_with_quoted_cells() {
        let data = "id,title,city\n1,\"Engineer, Senior\",Austin\n2,Analyst,Boston\n";

        let records = decode(data, b',').unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["title"], "Engineer, Senior");
        assert_eq!(records[1]["city"], "Boston");
    }

    #[test]
    fn test_decode_tsv() {
        let data = "id\tname\n7\tAcme Corp\n";

        let records = decode(data, b'\t').unwrap();

        assert_eq!(records[0]["id"], "7");
        assert_eq!(records[0]["name"], "Acme Corp");
    }

    #[test]
    fn test_short_rows_and_blank_lines() {
        let data = "id,title,city\n1,Engineer\n\n,,\n2,Analyst,Boston\n";

        let records = decode(data, b',').unwrap();

        assert_eq!(records.len(), 2);
        assert!(!records[0].contains_key("city"));
        assert_eq!(records[1]["city"], "Boston");
    }

    #[test]
    fn test_header_only_feed_has_no_records() {
        assert!(decode("id,title\n", b',').unwrap().is_empty());
    }
}
