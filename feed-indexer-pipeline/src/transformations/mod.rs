//! The closed set of transformation kinds a dictionary may name.
//!
//! Structured directives are dispatched by kind name through a static
//! registry. A kind with no dedicated renderer falls back to the string
//! operations, with its arguments passed positionally. Bare names always go
//! to the string operations.

mod external_mapping;
mod reformat_date;
mod string_transformation;

pub use external_mapping::ExternalMappingTransformation;
pub use reformat_date::ReformatDateTransformation;
pub use string_transformation::{StringTransformation, SUPPORTED_STRING_OPERATIONS};

use crate::errors::PipelineError;
use crate::schema::{DirectiveArgs, TransformationDirective};
use feed_indexer_shared::ProcessorStep;

/// A transformation kind able to render itself as processor steps.
pub trait Transformation: Send + Sync {
    /// Kind name as written in the dictionary.
    fn kind(&self) -> &'static str;

    /// Render the steps applying this transformation to `field`.
    fn render(&self, field: &str, args: &DirectiveArgs) -> Result<Vec<ProcessorStep>, PipelineError>;
}

static REFORMAT_DATE: ReformatDateTransformation = ReformatDateTransformation;
static EXTERNAL_MAPPING: ExternalMappingTransformation = ExternalMappingTransformation;

/// Static lookup from kind name to renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransformationRegistry;

impl TransformationRegistry {
    pub fn new() -> Self {
        Self
    }

    /// The dedicated renderer for a structured kind, if there is one.
    pub fn lookup(&self, kind: &str) -> Option<&'static dyn Transformation> {
        match kind {
            "reformat_date" => Some(&REFORMAT_DATE),
            "external_mapping" => Some(&EXTERNAL_MAPPING),
            _ => None,
        }
    }

    /// Render a directive against `field`.
    pub fn render(
        &self,
        field: &str,
        directive: &TransformationDirective,
    ) -> Result<Vec<ProcessorStep>, PipelineError> {
        match directive {
            TransformationDirective::Bare(name) => {
                StringTransformation::new(name.as_str()).render(field, &DirectiveArgs::None)
            }
            TransformationDirective::Structured { kind, args } => match self.lookup(kind) {
                Some(transformation) => transformation.render(field, args),
                None => StringTransformation::new(kind.as_str()).render(field, args),
            },
        }
    }
}
