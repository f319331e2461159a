//! Error types for schema loading and pipeline compilation.

use thiserror::Error;

/// Errors that abort loading a schema or compiling a pipeline.
///
/// Compilation never yields a partial pipeline: any of these fails the whole call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A bare operation name outside the supported whitelist.
    #[error("Unsupported transformation: {0}")]
    UnsupportedTransformation(String),

    /// A directive or field definition is missing something it needs.
    #[error("Schema incomplete: {0}")]
    SchemaIncomplete(String),

    /// The dictionary is not valid YAML.
    #[error("Schema parse error: {0}")]
    SchemaParse(String),
}

impl PipelineError {
    /// Create an unsupported transformation error.
    pub fn unsupported(name: impl Into<String>) -> Self {
        Self::UnsupportedTransformation(name.into())
    }

    /// Create a schema incomplete error.
    pub fn incomplete(msg: impl Into<String>) -> Self {
        Self::SchemaIncomplete(msg.into())
    }

    /// Create a schema parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::SchemaParse(msg.into())
    }
}

impl From<serde_yaml::Error> for PipelineError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_errors_become_parse_errors() {
        let err: PipelineError = serde_yaml::from_str::<serde_yaml::Value>("title: [unclosed")
            .unwrap_err()
            .into();

        assert!(matches!(err, PipelineError::SchemaParse(_)));
    }
}
