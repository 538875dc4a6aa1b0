//! Configuration loader for restructuring runs

use std::path::Path;

use tracing::debug;

use crate::{
    config::types::RestructuringConfig,
    error::{RestructuringError, Result},
};

/// Loads restructuring configuration from files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub fn load_from_yaml(path: &Path) -> Result<RestructuringConfig> {
        let content = Self::read(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| RestructuringError::ConfigError(format!("Failed to parse YAML: {}", e)))
    }

    /// Load configuration from a JSON file
    pub fn load_from_json(path: &Path) -> Result<RestructuringConfig> {
        let content = Self::read(path)?;
        serde_json::from_str(&content)
            .map_err(|e| RestructuringError::ConfigError(format!("Failed to parse JSON: {}", e)))
    }

    /// Load and validate configuration from a file (format detected from the extension)
    pub fn load(path: &Path) -> Result<RestructuringConfig> {
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::load_from_yaml(path)?,
            Some("json") => Self::load_from_json(path)?,
            _ => {
                return Err(RestructuringError::ConfigError(format!(
                    "Unsupported configuration file format: {}",
                    path.display()
                )))
            }
        };

        config.validate()?;
        debug!(
            path = %path.display(),
            transformations = config.transformations.len(),
            "Loaded restructuring configuration"
        );
        Ok(config)
    }

    fn read(path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| {
            RestructuringError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })
    }
}
