//! Configuration for the engine, loaded from JSON.
//!
//! Every field has a default, so partial (or empty) documents are valid.

use crate::core::types::Number;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use valuable::Valuable;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Valuable)]
#[serde(default)]
pub struct EngineConfig {
    pub mesh: LoadOpts,
    pub camera: CameraConfig,
}

/// Options controlling how mesh files are loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Valuable)]
#[serde(default)]
pub struct LoadOpts {
    /// Whether to read and write the binary geometry cache next to the source file
    pub use_cache: bool,
    /// Name of the cache directory, created inside the directory of the source file
    pub cache_dir: String,
    /// Files with more lines than this log their parsing progress
    pub progress_line_threshold: usize,
}

impl Default for LoadOpts {
    fn default() -> Self {
        Self {
            use_cache: true,
            cache_dir: ".cache".to_string(),
            progress_line_threshold: 500_000,
        }
    }
}

/// Initial camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Valuable)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view, in degrees
    pub fov_degrees: Number,
    pub near_plane: Number,
    pub far_plane: Number,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.,
            near_plane: 0.01,
            far_plane: 1000.,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't read config file")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid")]
    Parse(#[from] serde_json::Error),
}

impl EngineConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> { serde_json::from_str(s) }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&text)?)
    }
}
