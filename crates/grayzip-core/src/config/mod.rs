//! Configuration management for grayzip.
//!
//! Configuration is loaded from the platform config directory with defaults
//! for every field, so an absent or partial file is always usable.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for grayzip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default directories
    pub general: GeneralConfig,

    /// Archive extraction settings
    pub extraction: ExtractionConfig,

    /// Image discovery settings
    pub discovery: DiscoveryConfig,

    /// Grayscale stage settings
    pub transform: TransformConfig,

    /// Logging settings
    pub logging: LoggingConfig,
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
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.grayzip.grayzip/config.toml
    /// - Linux: ~/.config/grayzip/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\grayzip\grayzip\config\config.toml
    ///
    /// Falls back to ~/.grayzip/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "grayzip", "grayzip")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".grayzip").join("config.toml")
            })
    }

    /// Resolved default extraction root (with ~ expansion).
    pub fn extraction_root(&self) -> PathBuf {
        expand_path(&self.general.extraction_root)
    }

    /// Resolved default output root (with ~ expansion).
    pub fn output_root(&self) -> PathBuf {
        expand_path(&self.general.output_root)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Expand a leading `~` in a path.
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}
