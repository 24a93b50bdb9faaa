//! Configuration management for outfit.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`, so a missing file is
//! never an error.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for outfit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Processing settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Downscaling settings
    pub resize: ResizeConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Vision provider settings
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.outfit.outfit/config.toml
    /// - Linux: ~/.config/outfit/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\outfit\config\config.toml
    ///
    /// Falls back to ~/.outfit/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "outfit", "outfit")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".outfit").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.processing.batch_size, 10);
        assert_eq!(config.resize.threshold, 512);
        assert_eq!(config.limits.max_file_size_mb, 20);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.temperature, 0.0);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("[resize]"));
        assert!(toml.contains("[llm]"));
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[processing]\nbatch_size = 4\n\n[llm]\nprovider = \"anthropic\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.processing.batch_size, 4);
        assert_eq!(config.llm.provider, "anthropic");
        // Untouched sections keep defaults
        assert_eq!(config.resize.threshold, 512);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[processing]\nbatch_size = 0\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
