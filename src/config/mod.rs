//! TOML-based engine configuration.
//!
//! Example configuration:
//! ```toml
//! default_dialect = "postgres"
//! default_limit = 50
//! max_limit = 1000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sql::dialect::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Engine defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dialect used when a caller does not name one.
    pub default_dialect: Dialect,
    /// Page size applied when a request has no limit.
    pub default_limit: u64,
    /// Hard cap on any requested page size.
    pub max_limit: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_dialect: Dialect::MySql,
            default_limit: 20,
            max_limit: 1000,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
