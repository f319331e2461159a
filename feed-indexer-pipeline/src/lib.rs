//! # Feed Indexer Pipeline
//!
//! Turns a field-level dictionary into an ordered ingest pipeline.
//!
//! ## Architecture
//!
//! 1. **Schema**: the typed dictionary, loaded from YAML and validated up front
//! 2. **Transformations**: a closed registry of named transformation kinds,
//!    each rendering itself as processor steps
//! 3. **Compiler**: walks the schema in field order and applies the
//!    structural rules (relocation, constants, foreach wrapping, coalescing)

pub mod compiler;
pub mod errors;
pub mod schema;
pub mod transformations;

pub use compiler::PipelineCompiler;
pub use errors::PipelineError;
pub use schema::{DirectiveArgs, FieldSpec, Schema, TransformationDirective};
pub use transformations::TransformationRegistry;
