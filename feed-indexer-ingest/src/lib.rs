//! # Feed Indexer Ingest
//!
//! This crate provides the ingest components that turn a feed into a
//! searchable index.
//!
//! ## Architecture
//!
//! The ingest follows the Extract-Decode-Load pattern:
//!
//! 1. **Extractor**: Fetches the raw feed content
//! 2. **Decoder**: Sniffs the format and decodes rows into records
//! 3. **Loader**: Identifies, stamps and bulk indexes the records
//! 4. **Engine**: Detects content changes and drives index rebuilds

pub mod decoder;
pub mod engine;
pub mod errors;
pub mod extractor;
pub mod identity;
pub mod loader;

pub use decoder::{decode_records, DataFormat};
pub use engine::{FreshenOutcome, Reingester};
pub use errors::IngestError;
pub use extractor::{Extractor, HttpExtractor};
pub use identity::{content_digest, missing_unique_fields, record_id};
pub use loader::{BulkLoader, LoadTarget, LoaderConfig};
