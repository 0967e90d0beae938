// SPDX-License-Identifier: MPL-2.0
//! This module handles the pipeline's configuration, including loading and saving
//! operator settings to a `settings.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use photo_variants::config::{self, Config};
//! use std::path::PathBuf;
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Point the colorizer at a custom model directory
//! config.model_dir = Some(PathBuf::from("/opt/models/colorization"));
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use defaults::DEFAULT_JPEG_QUALITY;

const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the three colorization artifacts.
    #[serde(default)]
    pub model_dir: Option<PathBuf>,
    /// Default output directory for the command-line tool.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// JPEG quality for written variants.
    #[serde(default)]
    pub jpeg_quality: Option<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: None,
            output_dir: None,
            jpeg_quality: Some(DEFAULT_JPEG_QUALITY),
        }
    }
}

impl Config {
    /// JPEG quality clamped to the encoder's accepted range.
    #[must_use]
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
            .unwrap_or(DEFAULT_JPEG_QUALITY)
            .clamp(defaults::MIN_JPEG_QUALITY, defaults::MAX_JPEG_QUALITY)
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    paths::get_app_config_dir().map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Loads settings from `path`, falling back to defaults if the TOML is invalid.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "invalid settings file, using defaults");
            Ok(Config::default())
        }
    }
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_fields() {
        let config = Config {
            model_dir: Some(PathBuf::from("/srv/models")),
            output_dir: Some(PathBuf::from("/srv/outputs")),
            jpeg_quality: Some(80),
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_path_returns_default_on_invalid_toml() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        let loaded = load_from_path(&config_path).expect("load should not error");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "jpeg_quality = 70\n").expect("failed to write toml");

        let loaded = load_from_path(&config_path).expect("load should not error");
        assert!(loaded.model_dir.is_none());
        assert_eq!(loaded.jpeg_quality(), 70);
    }

    #[test]
    fn jpeg_quality_is_clamped() {
        let config = Config {
            jpeg_quality: Some(0),
            ..Config::default()
        };
        assert_eq!(config.jpeg_quality(), defaults::MIN_JPEG_QUALITY);

        let config = Config {
            jpeg_quality: None,
            ..Config::default()
        };
        assert_eq!(config.jpeg_quality(), DEFAULT_JPEG_QUALITY);
    }
}
