// SPDX-License-Identifier: MPL-2.0
//! ONNX Runtime adapter implementing the [`ChromaPredictor`] port trait.
//!
//! - [`ColorModel`]: the colorization network and its host-side lookup head
//! - [`SharedColorModel`]: lazily loaded, process-wide holder acting as the
//!   [`PredictorProvider`] for the pipeline
//!
//! [`ChromaPredictor`]: crate::application::port::ChromaPredictor
//! [`PredictorProvider`]: crate::application::port::PredictorProvider

pub mod colorization;
mod lookup_head;
mod shared;

pub use colorization::{ColorModel, QUANTIZATION_TABLE_FILE, REQUIRED_FILES, TOPOLOGY_FILE, WEIGHTS_FILE};
pub use lookup_head::LookupHead;
pub use shared::SharedColorModel;
