//! Configuration types for the server and its compile capability

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::DocumentKind;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Server configuration
///
/// Every field has a default matching a standard Maven project using linkki,
/// so an empty YAML document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Annotation name prefix that marks binding annotations (`@UITextField`, `@UISection`)
    pub binding_annotation_prefix: String,

    /// Source root relative to the project root
    pub source_root: String,

    /// Resource root relative to the project root
    pub resource_root: String,

    /// Extension of annotated source files
    pub source_extension: String,

    /// Extension of resource bundle files
    pub resource_extension: String,

    /// Bundle base names that enable key completion (`messages`, `messages_de`, ...)
    pub bundle_base_names: Vec<String>,

    /// Compile capability settings
    pub compiler: CompilerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            binding_annotation_prefix: "UI".to_string(),
            source_root: "src/main/java".to_string(),
            resource_root: "src/main/resources".to_string(),
            source_extension: "java".to_string(),
            resource_extension: "properties".to_string(),
            bundle_base_names: vec!["linkki-messages".to_string(), "messages".to_string()],
            compiler: CompilerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Validate the server configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.binding_annotation_prefix.is_empty() {
            return Err(ConfigError::ValidationError(
                "Binding annotation prefix cannot be empty".to_string(),
            ));
        }

        for (name, root) in [
            ("source_root", &self.source_root),
            ("resource_root", &self.resource_root),
        ] {
            if root.trim_matches('/').is_empty() {
                return Err(ConfigError::ValidationError(format!("{} cannot be empty", name)));
            }
        }

        if self.source_root.trim_matches('/') == self.resource_root.trim_matches('/') {
            return Err(ConfigError::ValidationError(
                "source_root and resource_root must differ".to_string(),
            ));
        }

        if self.source_extension.is_empty() || self.resource_extension.is_empty() {
            return Err(ConfigError::ValidationError(
                "File extensions cannot be empty".to_string(),
            ));
        }

        if self.source_extension == self.resource_extension {
            return Err(ConfigError::ValidationError(format!(
                "Source and resource extension are both '{}'",
                self.source_extension
            )));
        }

        self.compiler.validate()
    }

    /// Classify a URI or path
    pub fn document_kind(&self, uri: &str) -> DocumentKind {
        DocumentKind::detect(uri, &self.source_extension, &self.resource_extension)
    }
}

/// Settings for the external `javac` invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Run the compiler at all; resource diagnostics work regardless
    pub enabled: bool,

    /// `javac` executable
    pub javac: String,

    /// Compile classpath entries
    pub classpath: Vec<String>,

    /// Annotation processor path entries (the linkki apt jar and its dependencies)
    pub processor_path: Vec<String>,

    /// Fully qualified processor class names
    pub processors: Vec<String>,

    /// Additional raw arguments
    pub extra_args: Vec<String>,

    /// Compiler codes dropped because they only reflect the missing project classpath
    pub suppressed_code_prefixes: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            javac: "javac".to_string(),
            classpath: Vec::new(),
            processor_path: Vec::new(),
            processors: vec!["org.linkki.tooling.apt.processor.LinkkiAnnotationProcessor".to_string()],
            extra_args: Vec::new(),
            suppressed_code_prefixes: vec![
                "compiler.err.cant.resolve".to_string(),
                "compiler.err.doesnt.exist".to_string(),
                "compiler.err.not.def.access.class.intf.cant.access".to_string(),
            ],
        }
    }
}

impl CompilerConfig {
    /// Validate the compiler configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.enabled && self.javac.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "javac executable cannot be empty".to_string(),
            ));
        }
        if self.processors.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "Processor class names cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a raw compiler code is denylisted
    pub fn is_suppressed(&self, code: &str) -> bool {
        self.suppressed_code_prefixes
            .iter()
            .any(|prefix| code.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let config = ServerConfig {
            binding_annotation_prefix: String::new(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_identical_roots_rejected() {
        let config = ServerConfig {
            resource_root: "src/main/java/".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_suppressed_codes() {
        let compiler = CompilerConfig::default();
        assert!(compiler.is_suppressed("compiler.err.cant.resolve.location"));
        assert!(compiler.is_suppressed("compiler.err.doesnt.exist"));
        assert!(!compiler.is_suppressed("compiler.err.proc.messager"));
    }
}
