// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//! The pipeline only sees these traits, so the colorization network can be
//! swapped for a test double without touching the transform engines.
//!
//! # Available Ports
//!
//! - [`ai`]: chroma prediction and predictor lifecycle

pub mod ai;

// Re-export main types for convenience
pub use ai::{AIError, ChromaPredictor, PredictorProvider};
