//! Processor steps and the pipeline descriptor they compose.
//!
//! A [`Pipeline`] serializes to the literal shape the search engine's
//! pipeline registration call expects:
//!
//! ```json
//! {"description": "Pipeline for <name>", "processors": [{"<kind>": {...}}]}
//! ```

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

/// Per-element scratch reference available to a processor nested in `foreach`.
pub const INGEST_VALUE_FIELD: &str = "_ingest._value";

/// One document transformation step of an ingest pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorStep {
    /// Move `field` to `target`.
    Rename { field: String, target: String },
    /// Copy `field` into `target`, leaving `field` in place. Rendered as `trim`.
    Copy { field: String, target: String },
    /// Assign a literal value.
    SetConstant { field: String, value: Value },
    Lowercase {
        field: String,
        ignore_missing: bool,
    },
    Uppercase {
        field: String,
        ignore_missing: bool,
    },
    Gsub {
        field: String,
        pattern: String,
        replacement: String,
        ignore_missing: bool,
    },
    /// Drop the first `offset` characters. Rendered as a `gsub`.
    SubstringFrom {
        field: String,
        offset: usize,
        ignore_missing: bool,
    },
    Split {
        field: String,
        separator: String,
        ignore_missing: bool,
    },
    DateReformat {
        field: String,
        target: String,
        formats: Vec<String>,
        ignore_failure: bool,
    },
    /// Enrich a field by looking its value up in an external JSON API.
    ExternalLookup {
        field: String,
        target: String,
        url_prefix: String,
        extract_path: String,
        multi_value: bool,
        ignore_missing: bool,
    },
    /// Apply `processor` to every element of the collection in `field`.
    Foreach {
        field: String,
        processor: Box<ProcessorStep>,
    },
    /// Flatten, de-duplicate and sort a collection-of-collections in place.
    CoalesceScript { field: String },
}

impl ProcessorStep {
    pub fn lowercase(field: impl Into<String>) -> Self {
        Self::Lowercase {
            field: field.into(),
            ignore_missing: true,
        }
    }

    pub fn uppercase(field: impl Into<String>) -> Self {
        Self::Uppercase {
            field: field.into(),
            ignore_missing: true,
        }
    }

    pub fn gsub(
        field: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self::Gsub {
            field: field.into(),
            pattern: pattern.into(),
            replacement: replacement.into(),
            ignore_missing: true,
        }
    }

    pub fn substring_from(field: impl Into<String>, offset: usize) -> Self {
        Self::SubstringFrom {
            field: field.into(),
            offset,
            ignore_missing: true,
        }
    }

    pub fn split(field: impl Into<String>, separator: impl Into<String>) -> Self {
        Self::Split {
            field: field.into(),
            separator: separator.into(),
            ignore_missing: true,
        }
    }

    /// Reformat a date in place: the field is also its own target.
    pub fn date_reformat(field: impl Into<String>, formats: Vec<String>) -> Self {
        let field = field.into();
        Self::DateReformat {
            target: field.clone(),
            field,
            formats,
            ignore_failure: true,
        }
    }

    /// Look a field up in place: the field is also its own target.
    pub fn external_lookup(
        field: impl Into<String>,
        url_prefix: impl Into<String>,
        extract_path: impl Into<String>,
        multi_value: bool,
    ) -> Self {
        let field = field.into();
        Self::ExternalLookup {
            target: field.clone(),
            field,
            url_prefix: url_prefix.into(),
            extract_path: extract_path.into(),
            multi_value,
            ignore_missing: true,
        }
    }

    pub fn foreach(field: impl Into<String>, processor: ProcessorStep) -> Self {
        Self::Foreach {
            field: field.into(),
            processor: Box::new(processor),
        }
    }

    /// The processor kind name used in the pipeline descriptor.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rename { .. } => "rename",
            Self::Copy { .. } => "trim",
            Self::SetConstant { .. } => "set",
            Self::Lowercase { .. } => "lowercase",
            Self::Uppercase { .. } => "uppercase",
            Self::Gsub { .. } | Self::SubstringFrom { .. } => "gsub",
            Self::Split { .. } => "split",
            Self::DateReformat { .. } => "date",
            Self::ExternalLookup { .. } => "json_api",
            Self::Foreach { .. } => "foreach",
            Self::CoalesceScript { .. } => "script",
        }
    }

    /// The field this step reads from.
    pub fn field(&self) -> &str {
        match self {
            Self::Rename { field, .. }
            | Self::Copy { field, .. }
            | Self::SetConstant { field, .. }
            | Self::Lowercase { field, .. }
            | Self::Uppercase { field, .. }
            | Self::Gsub { field, .. }
            | Self::SubstringFrom { field, .. }
            | Self::Split { field, .. }
            | Self::DateReformat { field, .. }
            | Self::ExternalLookup { field, .. }
            | Self::Foreach { field, .. }
            | Self::CoalesceScript { field } => field,
        }
    }

    /// The step doing the actual work, looking through `foreach` wrappers.
    pub fn innermost(&self) -> &ProcessorStep {
        match self {
            Self::Foreach { processor, .. } => processor.innermost(),
            other => other,
        }
    }

    /// Whether this step (or the step it wraps) turns its field into a collection.
    pub fn is_split(&self) -> bool {
        matches!(self.innermost(), Self::Split { .. })
    }

    /// Whether this step (or the step it wraps) is a multi-valued external lookup.
    pub fn is_multi_value_lookup(&self) -> bool {
        matches!(
            self.innermost(),
            Self::ExternalLookup {
                multi_value: true,
                ..
            }
        )
    }

    /// Render the step as a `{"<kind>": {...}}` processor descriptor.
    pub fn to_json(&self) -> Value {
        let body = match self {
            Self::Rename { field, target } | Self::Copy { field, target } => json!({
                "field": field,
                "target_field": target,
            }),
            Self::SetConstant { field, value } => json!({
                "field": field,
                "value": value,
            }),
            Self::Lowercase {
                field,
                ignore_missing,
            }
            | Self::Uppercase {
                field,
                ignore_missing,
            } => json!({
                "field": field,
                "ignore_missing": ignore_missing,
            }),
            Self::Gsub {
                field,
                pattern,
                replacement,
                ignore_missing,
            } => json!({
                "field": field,
                "pattern": pattern,
                "replacement": replacement,
                "ignore_missing": ignore_missing,
            }),
            Self::SubstringFrom {
                field,
                offset,
                ignore_missing,
            } => json!({
                "field": field,
                "pattern": format!("^.{{{}}}", offset),
                "replacement": "",
                "ignore_missing": ignore_missing,
            }),
            Self::Split {
                field,
                separator,
                ignore_missing,
            } => json!({
                "field": field,
                "separator": separator,
                "ignore_missing": ignore_missing,
            }),
            Self::DateReformat {
                field,
                target,
                formats,
                ignore_failure,
            } => json!({
                "field": field,
                "target_field": target,
                "formats": formats,
                "ignore_failure": ignore_failure,
            }),
            Self::ExternalLookup {
                field,
                target,
                url_prefix,
                extract_path,
                multi_value,
                ignore_missing,
            } => json!({
                "field": field,
                "target_field": target,
                "json_path": extract_path,
                "url_prefix": url_prefix,
                "multi_value": multi_value,
                "ignore_missing": ignore_missing,
            }),
            Self::Foreach { field, processor } => json!({
                "field": field,
                "processor": processor.to_json(),
                "ignore_failure": true,
            }),
            Self::CoalesceScript { field } => json!({
                "source": coalesce_script(field),
            }),
        };

        let mut processor = serde_json::Map::new();
        processor.insert(self.kind().to_string(), body);
        Value::Object(processor)
    }
}

impl Serialize for ProcessorStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Painless source that flattens the collection in `field`, drops duplicates
/// and sorts what is left. Scalars inside the collection are kept as-is.
fn coalesce_script(field: &str) -> String {
    let field = field.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "if (ctx['{field}'] instanceof List) {{ \
         def flat = new ArrayList(); \
         for (def value : ctx['{field}']) {{ \
         if (value instanceof List) {{ flat.addAll(value); }} \
         else if (value != null) {{ flat.add(value); }} }} \
         ctx['{field}'] = flat.stream().distinct().sorted().collect(Collectors.toList()); }}"
    )
}

/// A compiled ingest pipeline: ordered processor steps plus a description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pipeline {
    /// Always `Pipeline for <name>`.
    pub description: String,
    /// Steps in guaranteed execution order.
    pub processors: Vec<ProcessorStep>,
}

impl Pipeline {
    /// Create a pipeline for the fully-qualified pipeline identifier `name`.
    pub fn new(name: &str, processors: Vec<ProcessorStep>) -> Self {
        Self {
            description: format!("Pipeline for {}", name),
            processors,
        }
    }

    /// Render the descriptor submitted to the engine's pipeline registration call.
    pub fn to_json(&self) -> Value {
        json!({
            "description": self.description,
            "processors": self.processors.iter().map(ProcessorStep::to_json).collect::<Vec<_>>(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_renders_target_field() {
        let step = ProcessorStep::Rename {
            field: "foo".to_string(),
            target: "bar".to_string(),
        };

        assert_eq!(
            step.to_json(),
            json!({ "rename": { "field": "foo", "target_field": "bar" } })
        );
    }

    #[test]
    fn test_copy_renders_as_trim() {
        let step = ProcessorStep::Copy {
            field: "blat".to_string(),
            target: "bar".to_string(),
        };

        assert_eq!(
            step.to_json(),
            json!({ "trim": { "field": "blat", "target_field": "bar" } })
        );
    }

    #[test]
    fn test_substring_from_renders_as_gsub() {
        let step = ProcessorStep::substring_from("bar", 4);

        assert_eq!(
            step.to_json(),
            json!({
                "gsub": {
                    "field": "bar",
                    "pattern": "^.{4}",
                    "replacement": "",
                    "ignore_missing": true
                }
            })
        );
    }

    #[test]
    fn test_date_reformat_targets_itself() {
        let step = ProcessorStep::date_reformat("bar", vec!["%m/%d/%Y".to_string()]);

        assert_eq!(
            step.to_json(),
            json!({
                "date": {
                    "field": "bar",
                    "target_field": "bar",
                    "formats": ["%m/%d/%Y"],
                    "ignore_failure": true
                }
            })
        );
    }

    #[test]
    fn test_foreach_wraps_inner_processor() {
        let step = ProcessorStep::foreach("bar", ProcessorStep::uppercase(INGEST_VALUE_FIELD));

        assert_eq!(
            step.to_json(),
            json!({
                "foreach": {
                    "field": "bar",
                    "processor": {
                        "uppercase": { "field": "_ingest._value", "ignore_missing": true }
                    },
                    "ignore_failure": true
                }
            })
        );
        assert_eq!(step.innermost().kind(), "uppercase");
    }

    #[test]
    fn test_json_api_field_names() {
        let step = ProcessorStep::external_lookup("country", "http://geo/", "$.name", true);
        let rendered = step.to_json();

        assert_eq!(rendered["json_api"]["field"], "country");
        assert_eq!(rendered["json_api"]["target_field"], "country");
        assert_eq!(rendered["json_api"]["json_path"], "$.name");
        assert_eq!(rendered["json_api"]["url_prefix"], "http://geo/");
        assert_eq!(rendered["json_api"]["multi_value"], true);
        assert_eq!(rendered["json_api"]["ignore_missing"], true);
        assert!(step.is_multi_value_lookup());
    }

    #[test]
    fn test_coalesce_script_names_field() {
        let step = ProcessorStep::CoalesceScript {
            field: "tags".to_string(),
        };
        let source = step.to_json()["script"]["source"]
            .as_str()
            .unwrap()
            .to_string();

        assert!(source.contains("ctx['tags']"));
        assert!(source.contains("distinct()"));
        assert!(source.contains("sorted()"));
    }

    #[test]
    fn test_pipeline_descriptor_shape() {
        let pipeline = Pipeline::new("dev:feeds:pipelines:jobs:v1", vec![]);

        assert_eq!(
            pipeline.to_json(),
            json!({
                "description": "Pipeline for dev:feeds:pipelines:jobs:v1",
                "processors": []
            })
        );
        assert_eq!(serde_json::to_value(&pipeline).unwrap(), pipeline.to_json());
        assert!(pipeline.is_empty());
    }
}
