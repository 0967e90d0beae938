// SPDX-License-Identifier: MPL-2.0
//! `photo_variants` turns one photo into three alternative renderings.
//!
//! Two engines back the [`VariantPipeline`]: a model-free enhancer
//! (denoise, local contrast, sharpen with a warm tint) and a colorizer that
//! predicts chroma for grayscale or faded photos with an ONNX network.
//!
//! # Example
//!
//! ```no_run
//! use photo_variants::{config, VariantPipeline};
//! use std::path::Path;
//!
//! let settings = config::load().unwrap_or_default();
//! let pipeline = VariantPipeline::new(&settings);
//! let outputs = pipeline
//!     .process(Path::new("photo.png"), Path::new("out"), "colorize")
//!     .expect("processing failed");
//! assert_eq!(outputs.len(), 3);
//! ```

#![doc(html_root_url = "https://docs.rs/photo_variants/0.1.0")]

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod media;
pub mod paths;

#[cfg(test)]
pub mod test_utils;

pub use application::pipeline::{Variant, VariantPipeline};
pub use domain::variant::ProcessingMode;
pub use error::{Error, Result};
