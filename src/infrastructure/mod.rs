// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! Concrete implementations of the port traits defined in `application::port`,
//! wrapping external dependencies such as ONNX Runtime.
//!
//! - [`onnx`]: chroma prediction via ONNX Runtime (implements [`ChromaPredictor`])
//!
//! [`ChromaPredictor`]: crate::application::port::ChromaPredictor

pub mod onnx;

pub use onnx::{ColorModel, SharedColorModel};
