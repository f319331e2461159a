//! Format sniffing and row decoding.
//!
//! A feed arrives as one text blob. Its format is inferred from the content
//! and the matching decoder turns it into records keyed by source field name.

mod delimited;
mod json;
mod xml;

use tracing::debug;

use crate::errors::IngestError;
use feed_indexer_shared::Record;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Feed formats understood by the decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Xml,
    Json,
    Tsv,
    Csv,
}

impl DataFormat {
    /// Infer the format of a feed from its content.
    ///
    /// An XML declaration wins, then a leading `{` or `[`, then any tab
    /// character. Everything else is treated as CSV.
    pub fn sniff(data: &str) -> Self {
        let head = data.trim_start_matches(BYTE_ORDER_MARK);
        if head.starts_with("<?xml") {
            return Self::Xml;
        }
        if head.trim_start().starts_with(['{', '[']) {
            return Self::Json;
        }
        if data.contains('\t') {
            return Self::Tsv;
        }
        Self::Csv
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
            Self::Tsv => "tsv",
            Self::Csv => "csv",
        }
    }
}

/// Decode a feed into records using the sniffed format.
pub fn decode_records(data: &str) -> Result<Vec<Record>, IngestError> {
    let format = DataFormat::sniff(data);
    let body = data.trim_start_matches(BYTE_ORDER_MARK);

    let records = match format {
        DataFormat::Xml => xml::decode(body)?,
        DataFormat::Json => json::decode(body)?,
        DataFormat::Tsv => delimited::decode(body, b'\t')?,
        DataFormat::Csv => delimited::decode(body, b',')?,
    };

    debug!(format = format.name(), records = records.len(), "Decoded feed");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_formats() {
        assert_eq!(DataFormat::sniff("<?xml version=\"1.0\"?><rows/>"), DataFormat::Xml);
        assert_eq!(DataFormat::sniff("[{\"id\": 1}]"), DataFormat::Json);
        assert_eq!(DataFormat::sniff("{\"rows\": []}"), DataFormat::Json);
        assert_eq!(DataFormat::sniff("id\ttitle\n1\tEngineer\n"), DataFormat::Tsv);
        assert_eq!(DataFormat::sniff("id,title\n1,Engineer\n"), DataFormat::Csv);
    }

    #[test]
    fn test_sniff_skips_byte_order_mark_and_whitespace() {
        assert_eq!(DataFormat::sniff("\u{feff}<?xml version=\"1.0\"?>"), DataFormat::Xml);
        assert_eq!(DataFormat::sniff("\u{feff}\n  [ ]"), DataFormat::Json);
    }

    #[test]
    fn test_json_with_tabs_is_still_json() {
        assert_eq!(DataFormat::sniff("[\n\t{\"id\": 1}\n]"), DataFormat::Json);
    }

    #[test]
    fn test_decode_records_dispatches_on_format() {
        let records = decode_records("id\ttitle\n1\tEngineer\n").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "Engineer");
    }
}
