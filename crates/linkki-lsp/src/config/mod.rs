//! Configuration module
//!
//! Loads the server configuration (project layout, annotation prefix, bundle
//! names, compiler invocation) from YAML or JSON, or falls back to defaults.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{CompilerConfig, ConfigError, ConfigResult, ServerConfig};
