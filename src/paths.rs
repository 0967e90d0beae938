// SPDX-License-Identifier: MPL-2.0
//! Centralized path management for model and settings directories.
//!
//! # Path Resolution Order
//!
//! Paths are resolved in the following priority order:
//! 1. **Explicit override** - parameter to `_with_override()` functions
//! 2. **CLI arguments** (`--model-dir`, `--config-dir`) - set via [`init_cli_overrides`]
//! 3. **Environment variables** (`PHOTO_VARIANTS_MODEL_DIR`, `PHOTO_VARIANTS_CONFIG_DIR`)
//! 4. **Settings file** - `model_dir` in `settings.toml` (model directory only)
//! 5. **Platform default** - via `dirs` crate
//!
//! # Usage
//!
//! CLI overrides should be initialized once at startup:
//! ```ignore
//! paths::init_cli_overrides(flags.model_dir, flags.config_dir);
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Application name used for directory naming.
const APP_NAME: &str = "PhotoVariants";

/// Model directory below the application data directory.
const MODEL_SUBDIR: [&str; 2] = ["models", "colorization"];

/// Environment variable to override the model directory.
pub const ENV_MODEL_DIR: &str = "PHOTO_VARIANTS_MODEL_DIR";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "PHOTO_VARIANTS_CONFIG_DIR";

/// Global CLI override for the model directory (set once at startup).
static CLI_MODEL_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Global CLI override for the config directory (set once at startup).
static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Initializes CLI overrides for model and config directories.
///
/// Only the first call has an effect; later calls are logged and ignored.
pub fn init_cli_overrides(model_dir: Option<String>, config_dir: Option<String>) {
    if CLI_MODEL_DIR.set(model_dir.map(PathBuf::from)).is_err() {
        tracing::warn!("CLI model dir override already initialized");
    }
    if CLI_CONFIG_DIR.set(config_dir.map(PathBuf::from)).is_err() {
        tracing::warn!("CLI config dir override already initialized");
    }
}

fn get_cli_model_dir() -> Option<PathBuf> {
    CLI_MODEL_DIR.get().and_then(Clone::clone)
}

fn get_cli_config_dir() -> Option<PathBuf> {
    CLI_CONFIG_DIR.get().and_then(Clone::clone)
}

fn non_empty_env(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Returns the directory holding the colorization artifacts.
///
/// # Resolution Order
///
/// 1. `override_path` parameter (if `Some`)
/// 2. CLI argument `--model-dir` (if set via [`init_cli_overrides`])
/// 3. `PHOTO_VARIANTS_MODEL_DIR` environment variable (if set and non-empty)
/// 4. `settings_model_dir` (the `model_dir` key of `settings.toml`)
/// 5. `<platform data dir>/PhotoVariants/models/colorization`
/// 6. `models/colorization` relative to the working directory
#[must_use]
pub fn get_model_dir_with_override(
    override_path: Option<PathBuf>,
    settings_model_dir: Option<&Path>,
) -> PathBuf {
    if let Some(path) = override_path {
        return path;
    }

    if let Some(path) = get_cli_model_dir() {
        return path;
    }

    if let Some(path) = non_empty_env(ENV_MODEL_DIR) {
        return path;
    }

    if let Some(path) = settings_model_dir {
        return path.to_path_buf();
    }

    let mut path = dirs::data_dir()
        .map(|mut data| {
            data.push(APP_NAME);
            data
        })
        .unwrap_or_default();
    path.extend(MODEL_SUBDIR);
    path
}

/// Returns the model directory without an explicit override or settings file.
#[must_use]
pub fn get_model_dir() -> PathBuf {
    get_model_dir_with_override(None, None)
}

/// Returns the application config directory path.
///
/// This directory holds `settings.toml`.
///
/// # Resolution Order
///
/// 1. CLI argument `--config-dir` (if set via [`init_cli_overrides`])
/// 2. `PHOTO_VARIANTS_CONFIG_DIR` environment variable (if set and non-empty)
/// 3. Platform-specific config directory:
///    - Linux: `~/.config/PhotoVariants/`
///    - macOS: `~/Library/Application Support/PhotoVariants/`
///    - Windows: `C:\Users\<User>\AppData\Roaming\PhotoVariants\`
///
/// Returns `None` if the config directory cannot be determined (rare edge case).
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

/// Returns the application config directory path with an optional override.
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Some(path) = get_cli_config_dir() {
        return Some(path);
    }

    if let Some(path) = non_empty_env(ENV_CONFIG_DIR) {
        return Some(path);
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}
