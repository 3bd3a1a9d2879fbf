//! Names the injector recognises.
//!
//! The defaults describe the OpenAI model provider and the `ballerina/ai`
//! annotation module. Override them with the builder methods, or load the
//! whole thing from JSON; every field falls back to its default.
//!
//! ```rust
//! use artificial_inject::config::{InjectorConfig, ModuleRef};
//!
//! let config = InjectorConfig::default()
//!     .with_provider_module(ModuleRef::new("ballerinax", "ai.anthropic"))
//!     .with_default_alias("llm");
//! assert_eq!(config.provider_module.to_string(), "ballerinax/ai.anthropic");
//! assert_eq!(config.generate_method, "generate");
//! ```
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::source::{ClassRef, ImportDecl};

/// `org/name` of a host module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRef {
    pub org: String,
    pub name: String,
}

impl ModuleRef {
    pub fn new(org: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
        }
    }
}

impl Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectorConfig {
    /// Module declaring the model-provider class.
    pub provider_module: ModuleRef,
    /// Required prefix of the provider module's resolved version.
    pub provider_version: String,
    /// Class whose instances (and subtypes) are model providers.
    pub provider_class: String,
    /// Remote method whose result type needs a schema.
    pub generate_method: String,
    /// Module owning the schema annotation.
    pub annotation_module: ModuleRef,
    pub annotation_identifier: String,
    /// Qualifier used when the annotation module is not imported under a
    /// usable prefix.
    pub default_alias: String,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            provider_module: ModuleRef::new("ballerinax", "ai.openai"),
            provider_version: "1".into(),
            provider_class: "ModelProvider".into(),
            generate_method: "generate".into(),
            annotation_module: ModuleRef::new("ballerina", "ai"),
            annotation_identifier: "JsonSchema".into(),
            default_alias: "ai".into(),
        }
    }
}

impl InjectorConfig {
    pub fn with_provider_module(mut self, module: ModuleRef) -> Self {
        self.provider_module = module;
        self
    }

    pub fn with_provider_version(mut self, version_prefix: impl Into<String>) -> Self {
        self.provider_version = version_prefix.into();
        self
    }

    pub fn with_provider_class(mut self, class: impl Into<String>) -> Self {
        self.provider_class = class.into();
        self
    }

    pub fn with_generate_method(mut self, method: impl Into<String>) -> Self {
        self.generate_method = method.into();
        self
    }

    pub fn with_annotation_module(mut self, module: ModuleRef) -> Self {
        self.annotation_module = module;
        self
    }

    pub fn with_default_alias(mut self, alias: impl Into<String>) -> Self {
        self.default_alias = alias.into();
        self
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> artificial_core::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Metadata key a runtime descriptor carries for an injected schema,
    /// e.g. `ballerina/ai:JsonSchema`.
    pub fn metadata_key(&self) -> String {
        format!("{}:{}", self.annotation_module, self.annotation_identifier)
    }

    pub(crate) fn is_provider_import(&self, import: &ImportDecl) -> bool {
        import.refers_to(&self.provider_module)
            && import
                .resolved_version
                .as_deref()
                .is_none_or(|version| version.starts_with(&self.provider_version))
    }

    pub(crate) fn is_provider_class(&self, class: &ClassRef) -> bool {
        class.name == self.provider_class
            && class.module.org == self.provider_module.org
            && class.module.name == self.provider_module.name
            && class.module.version.starts_with(&self.provider_version)
    }

    pub(crate) fn is_annotation_import(&self, import: &ImportDecl) -> bool {
        import.refers_to(&self.annotation_module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = InjectorConfig::from_json_str(
            r#"{"provider_class": "Client", "annotation_module": {"org": "acme", "name": "llm"}}"#,
        )
        .unwrap();
        assert_eq!(config.provider_class, "Client");
        assert_eq!(config.metadata_key(), "acme/llm:JsonSchema");
        assert_eq!(config.provider_module, ModuleRef::new("ballerinax", "ai.openai"));
    }

    #[test]
    fn default_metadata_key() {
        assert_eq!(
            InjectorConfig::default().metadata_key(),
            artificial_core::types::schema_metadata_key()
        );
    }
}
