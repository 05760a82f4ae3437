//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Where archives are unpacked when no directory is given on the command line
    pub extraction_root: PathBuf,

    /// Where grayscale images are written when no directory is given
    pub output_root: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            extraction_root: PathBuf::from("./extracted"),
            output_root: PathBuf::from("./grayscale"),
        }
    }
}

/// Archive extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Subdirectory of the extraction root that receives archive contents
    pub unzipped_dir: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            unzipped_dir: "unzipped".to_string(),
        }
    }
}

/// Image discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Literal, case-sensitive file name suffix identifying images
    pub image_extension: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            image_extension: ".png".to_string(),
        }
    }
}

/// Grayscale stage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Cap on in-flight transforms. 0 means one task per image, uncapped.
    pub max_concurrent: usize,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    /// Log format (pretty, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
