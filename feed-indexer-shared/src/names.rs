//! Deterministic search engine resource names.

/// Builds pipeline ids and index names from `(environment, api, version)`.
///
/// Two versions of one API never share a name, so they never contend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    environment: String,
    namespace: String,
}

impl ResourceNames {
    pub fn new(environment: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            namespace: namespace.into(),
        }
    }

    /// `<environment>:<namespace>:pipelines:<api>:v<version>`
    pub fn pipeline_id(&self, api: &str, version_number: u32) -> String {
        self.qualified("pipelines", api, version_number).join(":")
    }

    /// `<environment>-<namespace>-api_models-<api>-v<version>`, lowercased.
    ///
    /// Index names cannot contain `:`.
    pub fn index_name(&self, api: &str, version_number: u32) -> String {
        self.qualified("api_models", api, version_number)
            .join("-")
            .to_lowercase()
    }

    fn qualified(&self, kind: &str, api: &str, version_number: u32) -> Vec<String> {
        vec![
            self.environment.clone(),
            self.namespace.clone(),
            kind.to_string(),
            api.to_string(),
            format!("v{}", version_number),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_id() {
        let names = ResourceNames::new("production", "feeds");
        assert_eq!(
            names.pipeline_id("jobs", 3),
            "production:feeds:pipelines:jobs:v3"
        );
    }

    #[test]
    fn test_index_name_is_lowercase_and_colon_free() {
        let names = ResourceNames::new("Production", "feeds");
        let index = names.index_name("Jobs", 3);

        assert_eq!(index, "production-feeds-api_models-jobs-v3");
        assert!(!index.contains(':'));
    }

    #[test]
    fn test_versions_do_not_collide() {
        let names = ResourceNames::new("test", "feeds");
        assert_ne!(names.index_name("jobs", 1), names.index_name("jobs", 2));
        assert_ne!(names.pipeline_id("jobs", 1), names.pipeline_id("jobs", 2));
    }
}
