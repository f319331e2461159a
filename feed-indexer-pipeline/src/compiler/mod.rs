//! Pipeline compiler.
//!
//! Walks a [`Schema`] in field order and emits the processor steps for each
//! field in directive order. That order is the execution order of the
//! resulting pipeline.

use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::schema::{FieldSpec, NestedPath, Schema, TransformationDirective};
use crate::transformations::TransformationRegistry;
use feed_indexer_shared::{Pipeline, ProcessorStep, INGEST_VALUE_FIELD};

/// Compiles dictionaries into ingest pipelines.
#[derive(Debug, Default, Clone)]
pub struct PipelineCompiler {
    registry: TransformationRegistry,
}

/// Per-field compilation state. Created fresh for every field.
#[derive(Debug)]
struct FieldContext<'a> {
    target: &'a str,
    spec: &'a FieldSpec,
    /// The field currently holds a collection.
    array_context: bool,
    steps: Vec<ProcessorStep>,
}

impl<'a> FieldContext<'a> {
    fn new(target: &'a str, spec: &'a FieldSpec) -> Self {
        Self {
            target,
            spec,
            array_context: spec.is_array,
            steps: Vec::new(),
        }
    }
}

impl PipelineCompiler {
    pub fn new() -> Self {
        Self {
            registry: TransformationRegistry::new(),
        }
    }

    /// Compile `schema` into the pipeline registered as `name`.
    ///
    /// Fails as a whole on the first unsupported or incomplete directive.
    #[instrument(skip(self, schema), fields(fields = schema.len()))]
    pub fn compile(&self, name: &str, schema: &Schema) -> Result<Pipeline, PipelineError> {
        let mut processors = Vec::new();

        for (target, spec) in schema.fields() {
            processors.extend(self.compile_field(target, spec)?);
        }

        debug!(processors = processors.len(), "Compiled pipeline");
        Ok(Pipeline::new(name, processors))
    }

    /// One line per processor, for logs and the CLI.
    pub fn describe(pipeline: &Pipeline) -> String {
        let mut lines = vec![pipeline.description.clone()];
        lines.extend(
            pipeline
                .processors
                .iter()
                .enumerate()
                .map(|(index, step)| format!("{:>3}. {}", index + 1, step.to_json())),
        );
        lines.join("\n")
    }

    fn compile_field(
        &self,
        target: &str,
        spec: &FieldSpec,
    ) -> Result<Vec<ProcessorStep>, PipelineError> {
        let mut context = FieldContext::new(target, spec);

        Self::relocate(&mut context);

        for directive in &spec.transformations {
            self.apply(&mut context, directive)?;
        }

        Ok(context.steps)
    }

    /// Rename/copy the source value into place, or assign the constant.
    fn relocate(context: &mut FieldContext<'_>) {
        let spec = context.spec;
        let target = context.target;

        if spec.source.is_some() || spec.copy_from.is_some() {
            if let Some(source) = spec.source.as_deref().filter(|source| *source != target) {
                context.steps.push(ProcessorStep::Rename {
                    field: source.to_string(),
                    target: target.to_string(),
                });
            }
            if let Some(copy_from) = spec.copy_from.as_deref().filter(|from| *from != target) {
                context.steps.push(ProcessorStep::Copy {
                    field: copy_from.to_string(),
                    target: target.to_string(),
                });
            }
        } else if let Some(value) = &spec.constant {
            context.steps.push(ProcessorStep::SetConstant {
                field: target.to_string(),
                value: value.clone(),
            });
        }
    }

    fn apply(
        &self,
        context: &mut FieldContext<'_>,
        directive: &TransformationDirective,
    ) -> Result<(), PipelineError> {
        let rendered = match &context.spec.nested_path {
            Some(NestedPath { container, inner }) => {
                let element_field = format!("{}.{}", INGEST_VALUE_FIELD, inner);
                self.registry
                    .render(&element_field, directive)?
                    .into_iter()
                    .map(|step| ProcessorStep::foreach(container.as_str(), step))
                    .collect::<Vec<_>>()
            }
            None if context.array_context => self
                .registry
                .render(INGEST_VALUE_FIELD, directive)?
                .into_iter()
                .map(|step| ProcessorStep::foreach(context.target, step))
                .collect(),
            None => self.registry.render(context.target, directive)?,
        };

        for step in rendered {
            let is_split = step.is_split();
            let coalesce = context.array_context && step.is_multi_value_lookup();

            context.steps.push(step);

            if coalesce {
                context.steps.push(ProcessorStep::CoalesceScript {
                    field: context.target.to_string(),
                });
            }
            if is_split {
                context.array_context = true;
            }
        }

        Ok(())
    }
}
