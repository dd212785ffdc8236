//! Configuration loader with environment variable expansion

use super::{expand_env_vars, ConfigError, FileConfig};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<FileConfig, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from YAML text, expanding `${VAR}` placeholders first
    pub fn parse(content: &str) -> Result<FileConfig, ConfigError> {
        let expanded = expand_env_vars(content)?;
        // An empty document deserializes to unit, not a mapping
        if expanded.trim().is_empty() {
            return Ok(FileConfig::default());
        }
        let config: FileConfig = serde_yaml::from_str(&expanded)?;
        Ok(config)
    }
}
