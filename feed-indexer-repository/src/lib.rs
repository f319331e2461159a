//! # Feed Indexer Repository
//!
//! This crate provides the narrow search engine interface the re-ingestion
//! engine is written against, and a concrete implementation for OpenSearch.
//! It includes definitions for errors, interfaces, and configuration.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use config::SearchEngineConfig;
pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use opensearch::OpenSearchClient;
