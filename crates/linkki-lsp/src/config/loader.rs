//! Configuration loader for loading the server configuration from files

use super::types::{ConfigError, ConfigResult, ServerConfig};
use serde_json::Value;
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub fn load_yaml(path: &Path) -> ConfigResult<ServerConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a JSON file
    pub fn load_json(path: &Path) -> ConfigResult<ServerConfig> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file (auto-detect format)
    pub fn load(path: &Path) -> ConfigResult<ServerConfig> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::load_yaml(path),
            Some("json") => Self::load_json(path),
            _ => Err(ConfigError::ValidationError(
                "Unsupported configuration file format".to_string(),
            )),
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> ConfigResult<ServerConfig> {
        let config: ServerConfig = if content.trim().is_empty() {
            ServerConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Overlay client `initializationOptions` onto a base configuration
    ///
    /// Only keys present in `options` change; the result is validated as a whole.
    pub fn overlay(base: &ServerConfig, options: &Value) -> ConfigResult<ServerConfig> {
        let mut merged = serde_json::to_value(base)?;
        merge_json(&mut merged, options);
        let config: ServerConfig = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }
}

fn merge_json(target: &mut Value, overlay: &Value) {
    match (target, overlay) {
        (Value::Object(target), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match target.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, overlay) => *target = overlay.clone(),
    }
}
