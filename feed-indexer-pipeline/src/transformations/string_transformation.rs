//! String operations: the whitelist reachable by bare name.

use serde_json::Value;

use super::Transformation;
use crate::errors::PipelineError;
use crate::schema::{arg_text, DirectiveArgs};
use feed_indexer_shared::ProcessorStep;

/// Operation names accepted as bare directives.
pub const SUPPORTED_STRING_OPERATIONS: &[&str] = &["downcase", "from", "gsub", "split", "upcase"];

/// One string operation, named by the dictionary.
#[derive(Debug, Clone, Copy)]
pub struct StringTransformation<'a> {
    operation: &'a str,
}

impl<'a> StringTransformation<'a> {
    pub fn new(operation: &'a str) -> Self {
        Self { operation }
    }

    pub fn operation(&self) -> &str {
        self.operation
    }

    /// A keyed argument named `name`, else the argument at `index`.
    fn arg<'v>(args: &'v DirectiveArgs, index: usize, name: &str) -> Option<&'v Value> {
        args.get(name)
            .or_else(|| args.positional().get(index).copied())
    }

    fn text_arg(&self, args: &DirectiveArgs, index: usize, name: &str) -> Result<String, PipelineError> {
        Self::arg(args, index, name)
            .and_then(arg_text)
            .ok_or_else(|| {
                PipelineError::incomplete(format!("{} requires a {} argument", self.operation, name))
            })
    }

    fn offset_arg(&self, args: &DirectiveArgs) -> Result<usize, PipelineError> {
        let offset = match Self::arg(args, 0, "offset") {
            Some(Value::Number(number)) => number.as_u64(),
            Some(Value::String(text)) => text.trim().parse::<u64>().ok(),
            _ => None,
        };

        offset
            .and_then(|offset| usize::try_from(offset).ok())
            .ok_or_else(|| {
                PipelineError::incomplete(format!(
                    "{} requires a non-negative integer offset",
                    self.operation
                ))
            })
    }
}

impl Transformation for StringTransformation<'_> {
    fn kind(&self) -> &'static str {
        "string"
    }

    fn render(&self, field: &str, args: &DirectiveArgs) -> Result<Vec<ProcessorStep>, PipelineError> {
        let step = match self.operation {
            "downcase" => ProcessorStep::lowercase(field),
            "upcase" => ProcessorStep::uppercase(field),
            "gsub" => ProcessorStep::gsub(
                field,
                self.text_arg(args, 0, "pattern")?,
                self.text_arg(args, 1, "replacement")?,
            ),
            "split" => ProcessorStep::split(field, self.text_arg(args, 0, "separator")?),
            "from" => ProcessorStep::substring_from(field, self.offset_arg(args)?),
            other => return Err(PipelineError::unsupported(other)),
        };

        Ok(vec![step])
    }
}
