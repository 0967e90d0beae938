// SPDX-License-Identifier: MPL-2.0
//! Pixel processing: color conversion, filters, and the two variant engines.
//!
//! Everything here works on decoded [`RasterImage`](crate::domain::media::RasterImage)s
//! and has no file-system or model dependency, except [`image`] which handles
//! decoding and encoding.

pub mod clahe;
pub mod color;
pub mod colorize;
pub mod denoise;
pub mod enhance;
pub mod filter;
pub mod image;

pub use colorize::{ChromaPrediction, ColorizationEngine};
pub use enhance::EnhancementEngine;
pub use image::{load_image, save_jpeg};
