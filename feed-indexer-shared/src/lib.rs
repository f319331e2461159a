//! # Feed Indexer Shared
//!
//! Types shared by every feed indexer crate: the processor steps a compiled
//! ingest pipeline is made of, decoded feed records, and the data source
//! record the re-ingestion engine mutates.

pub mod data_source;
pub mod names;
pub mod processor;
pub mod record;

pub use data_source::{DataSource, IngestState};
pub use names::ResourceNames;
pub use processor::{Pipeline, ProcessorStep, INGEST_VALUE_FIELD};
pub use record::{format_run_timestamp, IndexedDocument, Record, UPDATED_AT_FIELD};
