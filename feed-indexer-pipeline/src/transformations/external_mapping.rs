//! Enrichment through an external JSON API.

use serde_json::Value;

use super::Transformation;
use crate::errors::PipelineError;
use crate::schema::{arg_text, DirectiveArgs};
use feed_indexer_shared::ProcessorStep;

/// `external_mapping: {url, result_path, multi_value}` replaces the field
/// with the value found at `result_path` in the response of `url + value`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExternalMappingTransformation;

impl ExternalMappingTransformation {
    fn required(args: &DirectiveArgs, key: &str) -> Result<String, PipelineError> {
        args.get(key).and_then(arg_text).ok_or_else(|| {
            PipelineError::incomplete(format!("external_mapping requires '{}'", key))
        })
    }
}

impl Transformation for ExternalMappingTransformation {
    fn kind(&self) -> &'static str {
        "external_mapping"
    }

    fn render(&self, field: &str, args: &DirectiveArgs) -> Result<Vec<ProcessorStep>, PipelineError> {
        let url = Self::required(args, "url")?;
        let result_path = Self::required(args, "result_path")?;
        let multi_value = match args.get("multi_value") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => {
                return Err(PipelineError::incomplete(
                    "external_mapping 'multi_value' must be true or false",
                ))
            }
        };

        Ok(vec![ProcessorStep::external_lookup(
            field,
            url,
            result_path,
            multi_value,
        )])
    }
}
