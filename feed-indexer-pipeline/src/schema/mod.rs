//! The typed field dictionary.
//!
//! A dictionary is YAML keyed by target field name, in emission order:
//!
//! ```yaml
//! unique_fields: [id]
//! title:
//!   source: job_title
//!   transformations:
//!     - upcase
//! tags:
//!   transformations:
//!     - split: ','
//!     - downcase
//! ```

mod directive;
mod sanitize;

pub use directive::{arg_text, DirectiveArgs, TransformationDirective};
pub use sanitize::sanitize_value;

use serde_json::Value;
use tracing::debug;

use crate::errors::PipelineError;
use directive::yaml_to_json;
use feed_indexer_shared::Record;

/// Root key listing the fields that make up a record's identity.
pub const UNIQUE_FIELDS_KEY: &str = "unique_fields";

/// Location of a field nested inside each element of an array-valued container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedPath {
    pub container: String,
    pub inner: String,
}

impl NestedPath {
    /// Parse `<container>.<inner>`.
    pub fn parse(path: &str) -> Result<Self, PipelineError> {
        match path.split_once('.') {
            Some((container, inner)) if !container.is_empty() && !inner.is_empty() => Ok(Self {
                container: container.to_string(),
                inner: inner.to_string(),
            }),
            _ => Err(PipelineError::incomplete(format!(
                "nested path '{}' must look like <container>.<inner>",
                path
            ))),
        }
    }
}

/// How one target field is produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSpec {
    /// Source field renamed into the target.
    pub source: Option<String>,
    /// Source field copied into the target.
    pub copy_from: Option<String>,
    /// Literal assigned to the target.
    pub constant: Option<Value>,
    /// The value is a collection; transformations apply per element.
    pub is_array: bool,
    /// Transformations target `inner` on each element of `container`.
    pub nested_path: Option<NestedPath>,
    pub transformations: Vec<TransformationDirective>,
}

impl FieldSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn copy_from(mut self, copy_from: impl Into<String>) -> Self {
        self.copy_from = Some(copy_from.into());
        self
    }

    pub fn constant(mut self, value: Value) -> Self {
        self.constant = Some(value);
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn nested(mut self, container: impl Into<String>, inner: impl Into<String>) -> Self {
        self.nested_path = Some(NestedPath {
            container: container.into(),
            inner: inner.into(),
        });
        self
    }

    pub fn transformation(mut self, directive: TransformationDirective) -> Self {
        self.transformations.push(directive);
        self
    }

    /// True when the field contributes no processor steps at all.
    pub fn is_passive(&self) -> bool {
        self.transformations.is_empty()
            && self.source.is_none()
            && self.copy_from.is_none()
            && self.constant.is_none()
    }

    fn from_yaml(name: &str, value: &serde_yaml::Value) -> Result<Self, PipelineError> {
        let mapping = match value {
            serde_yaml::Value::Null => return Ok(Self::default()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => {
                return Err(PipelineError::incomplete(format!(
                    "field '{}' must be a map",
                    name
                )))
            }
        };

        let text = |key: &str| -> Result<Option<String>, PipelineError> {
            match mapping.get(key) {
                None | Some(serde_yaml::Value::Null) => Ok(None),
                Some(serde_yaml::Value::String(text)) => Ok(Some(text.clone())),
                Some(_) => Err(PipelineError::incomplete(format!(
                    "field '{}': '{}' must be a string",
                    name, key
                ))),
            }
        };

        let is_array = match mapping.get("array").or_else(|| mapping.get("is_array")) {
            None | Some(serde_yaml::Value::Null) => false,
            Some(serde_yaml::Value::Bool(flag)) => *flag,
            Some(_) => {
                return Err(PipelineError::incomplete(format!(
                    "field '{}': 'array' must be true or false",
                    name
                )))
            }
        };

        let nested_path = match text("search_path")?.or(text("nested_path")?) {
            Some(path) => Some(NestedPath::parse(&path)?),
            None => None,
        };

        let constant = match mapping.get("constant") {
            None | Some(serde_yaml::Value::Null) => None,
            Some(value) => Some(yaml_to_json(value)?),
        };

        let transformations = match mapping.get("transformations") {
            None | Some(serde_yaml::Value::Null) => Vec::new(),
            Some(serde_yaml::Value::Sequence(entries)) => entries
                .iter()
                .map(TransformationDirective::from_yaml)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(PipelineError::incomplete(format!(
                    "field '{}': 'transformations' must be a list",
                    name
                )))
            }
        };

        Ok(Self {
            source: text("source")?,
            copy_from: text("copy_from")?,
            constant,
            is_array,
            nested_path,
            transformations,
        })
    }
}

/// Ordered dictionary of target fields plus the identity fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<(String, FieldSpec)>,
    unique_fields: Vec<String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Field order is processor emission order.
    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.push((name.into(), spec));
        self
    }

    pub fn with_unique_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Load a dictionary from YAML. An empty document is an empty schema.
    pub fn from_yaml(text: &str) -> Result<Self, PipelineError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let root: serde_yaml::Value = serde_yaml::from_str(text)?;
        let mapping = match root {
            serde_yaml::Value::Null => return Ok(Self::default()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => return Err(PipelineError::incomplete("dictionary must be a map")),
        };

        let mut schema = Self::default();
        for (key, value) in &mapping {
            let name = key
                .as_str()
                .ok_or_else(|| PipelineError::incomplete("field names must be strings"))?;

            if name == UNIQUE_FIELDS_KEY {
                schema.unique_fields = parse_unique_fields(value)?;
                continue;
            }

            schema
                .fields
                .push((name.to_string(), FieldSpec::from_yaml(name, value)?));
        }

        debug!(
            fields = schema.fields.len(),
            unique_fields = schema.unique_fields.len(),
            "Loaded dictionary"
        );

        Ok(schema)
    }

    /// Fields in declared order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, spec)| spec)
    }

    /// Fields whose values identify a record. Empty means "all fields".
    pub fn unique_fields(&self) -> &[String] {
        &self.unique_fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Prepare a decoded row for submission: every string value, including
    /// strings inside arrays, goes through [`sanitize_value`].
    pub fn transform(&self, record: Record) -> Record {
        record
            .into_iter()
            .map(|(key, value)| (key, clean(value)))
            .collect()
    }
}

fn parse_unique_fields(value: &serde_yaml::Value) -> Result<Vec<String>, PipelineError> {
    match value {
        serde_yaml::Value::Null => Ok(Vec::new()),
        serde_yaml::Value::Sequence(entries) => entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| PipelineError::incomplete("unique_fields must list strings"))
            })
            .collect(),
        _ => Err(PipelineError::incomplete("unique_fields must be a list")),
    }
}

fn clean(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(sanitize_value(&text)),
        Value::Array(values) => Value::Array(values.into_iter().map(clean).collect()),
        other => other,
    }
}
