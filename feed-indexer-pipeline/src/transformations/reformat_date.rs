//! Date reformatting.

use super::Transformation;
use crate::errors::PipelineError;
use crate::schema::{arg_text, DirectiveArgs};
use feed_indexer_shared::ProcessorStep;

/// `reformat_date: '<format>'` parses the field with the given format and
/// writes the normalized date back into the same field.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReformatDateTransformation;

impl Transformation for ReformatDateTransformation {
    fn kind(&self) -> &'static str {
        "reformat_date"
    }

    fn render(&self, field: &str, args: &DirectiveArgs) -> Result<Vec<ProcessorStep>, PipelineError> {
        let format = match args {
            DirectiveArgs::Keyed(_) => args.get("format"),
            _ => args.positional().into_iter().next(),
        }
        .and_then(arg_text)
        .ok_or_else(|| PipelineError::incomplete("reformat_date requires a date format"))?;

        Ok(vec![ProcessorStep::date_reformat(field, vec![format])])
    }
}
