// SPDX-License-Identifier: MPL-2.0
//! Crate-level error type surfaced to callers of the variant pipeline.

use crate::application::port::AIError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// One or more colorization artifacts are absent or unreadable.
    #[error("Colorization model files missing in {}: {}", dir.display(), missing.join(", "))]
    ModelFilesMissing {
        /// Directory that was searched.
        dir: PathBuf,
        /// File names that could not be opened.
        missing: Vec<String>,
    },

    /// The input could not be decoded as a raster image.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The requested processing mode is not one of `enhance`, `colorize`, `both`.
    #[error("Invalid mode '{0}'. Use enhance, colorize, or both.")]
    InvalidMode(String),

    /// The model is installed but failed to load or run.
    #[error("Model Error: {0}")]
    Model(#[from] AIError),

    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Config Error: {0}")]
    Config(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
