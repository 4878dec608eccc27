//! Configuration loading
//!
//! Settings come from an optional TOML file in the user's config directory:
//! - Linux: ~/.config/reunion-form/config.toml
//! - macOS: ~/Library/Application Support/reunion-form/config.toml
//! - Windows: %APPDATA%\reunion-form\config.toml
//!
//! Every key is optional; missing keys fall back to compiled defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::imaging::CompressionLimits;
use crate::submission::SubmissionSettings;

const APP_DIR: &str = "reunion-form";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Document store collection submissions are written to
    pub collection: String,
    /// Key prefix for uploaded photos
    pub blob_prefix: String,
    /// Photo size limit after compression, in bytes
    pub max_upload_bytes: usize,
    /// Longest photo edge after compression, in pixels
    pub max_dimension_px: u32,
    /// Where blobs and the database live
    pub data_dir: PathBuf,
    /// Base URL the blob directory is served under, if any
    pub public_base_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let limits = CompressionLimits::default();
        let settings = SubmissionSettings::default();

        Self {
            collection: settings.collection,
            blob_prefix: settings.blob_prefix,
            max_upload_bytes: limits.max_bytes,
            max_dimension_px: limits.max_dimension_px,
            data_dir: default_data_dir(),
            public_base_url: None,
        }
    }
}

impl AppConfig {
    /// Load from the default location. A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn submission_settings(&self) -> SubmissionSettings {
        SubmissionSettings {
            collection: self.collection.clone(),
            blob_prefix: self.blob_prefix.clone(),
            limits: CompressionLimits {
                max_bytes: self.max_upload_bytes,
                max_dimension_px: self.max_dimension_px,
            },
        }
    }

    pub fn blob_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("reunion_form.db")
    }
}

/// Path of the config file, if the platform has a config directory
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// ~/.local/share/reunion-form on Linux, the platform equivalent elsewhere
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
}
