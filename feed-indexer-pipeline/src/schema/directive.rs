//! Transformation directives as written in a dictionary.

use serde_json::Value;

use crate::errors::PipelineError;

/// Arguments attached to a structured directive.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DirectiveArgs {
    /// `- upcase: ~`
    #[default]
    None,
    /// `- split: '-'`
    Scalar(Value),
    /// `- gsub: ['å', 'a']`
    Positional(Vec<Value>),
    /// `- external_mapping: {url: ..., result_path: ...}`, in declared order.
    Keyed(Vec<(String, Value)>),
}

impl DirectiveArgs {
    /// Arguments in positional order. Keyed arguments contribute their values.
    pub fn positional(&self) -> Vec<&Value> {
        match self {
            Self::None => Vec::new(),
            Self::Scalar(value) => vec![value],
            Self::Positional(values) => values.iter().collect(),
            Self::Keyed(pairs) => pairs.iter().map(|(_, value)| value).collect(),
        }
    }

    /// Look up a keyed argument.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Keyed(pairs) => pairs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positional().is_empty()
    }

    fn from_yaml(value: &serde_yaml::Value) -> Result<Self, PipelineError> {
        Ok(match value {
            serde_yaml::Value::Null => Self::None,
            serde_yaml::Value::Sequence(items) => Self::Positional(
                items
                    .iter()
                    .map(yaml_to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            serde_yaml::Value::Mapping(mapping) => {
                let mut pairs = Vec::with_capacity(mapping.len());
                for (key, value) in mapping {
                    let key = key.as_str().ok_or_else(|| {
                        PipelineError::incomplete("directive argument keys must be strings")
                    })?;
                    pairs.push((key.to_string(), yaml_to_json(value)?));
                }
                Self::Keyed(pairs)
            }
            other => Self::Scalar(yaml_to_json(other)?),
        })
    }
}

/// One entry of a field's `transformations` list.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformationDirective {
    /// A bare operation name, e.g. `- downcase`.
    Bare(String),
    /// A kind name with arguments, e.g. `- reformat_date: '%m/%d/%Y'`.
    Structured { kind: String, args: DirectiveArgs },
}

impl TransformationDirective {
    pub fn bare(name: impl Into<String>) -> Self {
        Self::Bare(name.into())
    }

    pub fn structured(kind: impl Into<String>, args: DirectiveArgs) -> Self {
        Self::Structured {
            kind: kind.into(),
            args,
        }
    }

    /// Structured directive with positional arguments.
    pub fn with_args(kind: impl Into<String>, args: Vec<Value>) -> Self {
        Self::structured(kind, DirectiveArgs::Positional(args))
    }

    /// Structured directive with keyed configuration.
    pub fn keyed(kind: impl Into<String>, pairs: Vec<(&str, Value)>) -> Self {
        Self::structured(
            kind,
            DirectiveArgs::Keyed(
                pairs
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), value))
                    .collect(),
            ),
        )
    }

    /// The operation or kind name.
    pub fn name(&self) -> &str {
        match self {
            Self::Bare(name) => name,
            Self::Structured { kind, .. } => kind,
        }
    }

    pub(crate) fn from_yaml(value: &serde_yaml::Value) -> Result<Self, PipelineError> {
        match value {
            serde_yaml::Value::String(name) => Ok(Self::Bare(name.clone())),
            serde_yaml::Value::Mapping(mapping) if mapping.len() == 1 => {
                let (kind, args) = mapping
                    .iter()
                    .next()
                    .ok_or_else(|| PipelineError::incomplete("empty transformation"))?;
                let kind = kind.as_str().ok_or_else(|| {
                    PipelineError::incomplete("transformation kind must be a string")
                })?;
                Ok(Self::structured(kind, DirectiveArgs::from_yaml(args)?))
            }
            other => Err(PipelineError::incomplete(format!(
                "transformation must be a name or a single-key map, got {:?}",
                other
            ))),
        }
    }
}

/// Render a scalar argument as text. Collections and null have no text form.
pub fn arg_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub(crate) fn yaml_to_json(value: &serde_yaml::Value) -> Result<Value, PipelineError> {
    serde_json::to_value(value)
        .map_err(|e| PipelineError::incomplete(format!("unsupported value: {}", e)))
}
