// SPDX-License-Identifier: MPL-2.0
//! Media domain types.
//!
//! This module contains the pixel buffer type that is independent of any
//! codec or inference concerns.

pub mod types;

// Re-export commonly used types
pub use types::{ColorEncoding, RasterImage};
