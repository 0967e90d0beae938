// SPDX-License-Identifier: MPL-2.0
//! AI processing port definition.
//!
//! This module defines the [`ChromaPredictor`] trait for models that predict
//! chrominance from a luminance plane, and [`PredictorProvider`] for the
//! components that own (and lazily load) such a model.
//!
//! # Design Notes
//!
//! - Predictors are `Send + Sync` and shared through `Arc`
//! - Artifact discovery and loading are implementation-specific
//! - Planes are `ndarray` arrays in row-major `(row, column[, channel])` order

use ndarray::{Array3, ArrayView2};
use std::sync::Arc;
use thiserror::Error;

use crate::error::Result;

// =============================================================================
// AIError
// =============================================================================

/// Errors that can occur while loading or running a model.
#[derive(Debug, Clone, Error)]
pub enum AIError {
    /// The model file could not be loaded.
    #[error("Failed to load model: {0}")]
    ModelLoadFailed(String),

    /// Inference failed during processing.
    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    /// The input plane does not match the model's fixed input size.
    #[error("Input has size {actual:?}, model expects {expected:?}")]
    InputSizeMismatch {
        /// Size the model was exported for (rows, columns).
        expected: (usize, usize),
        /// Size that was passed in.
        actual: (usize, usize),
    },
}

// =============================================================================
// ChromaPredictor Trait
// =============================================================================

/// Port for grayscale → chroma prediction.
///
/// # Example
///
/// ```ignore
/// use photo_variants::application::port::ChromaPredictor;
/// use ndarray::Array2;
///
/// fn predict_flat(predictor: &dyn ChromaPredictor) {
///     let (rows, cols) = predictor.input_size();
///     let luminance = Array2::<f32>::zeros((rows, cols));
///     let ab = predictor.predict(luminance.view()).unwrap();
///     assert_eq!(ab.shape()[2], 2);
/// }
/// ```
pub trait ChromaPredictor: Send + Sync {
    /// Predicts a/b chroma from a mean-centered L plane of [`input_size`].
    ///
    /// Returns an array of shape `(rows, cols, 2)`. The grid may be coarser
    /// than the input; callers upsample to the target resolution.
    ///
    /// # Errors
    ///
    /// Returns an [`AIError`] if the input has the wrong size or inference
    /// fails.
    ///
    /// [`input_size`]: ChromaPredictor::input_size
    fn predict(&self, luminance: ArrayView2<'_, f32>) -> std::result::Result<Array3<f32>, AIError>;

    /// Returns the fixed input size `(rows, cols)` of the network.
    fn input_size(&self) -> (usize, usize);
}

// =============================================================================
// PredictorProvider Trait
// =============================================================================

/// Source of a ready-to-use predictor.
///
/// Implementations may load the model on first access. Errors carry the
/// crate-level taxonomy so that missing artifacts surface as
/// [`Error::ModelFilesMissing`](crate::error::Error::ModelFilesMissing).
pub trait PredictorProvider: Send + Sync {
    /// Returns the shared predictor, loading it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the model artifacts are missing or unloadable.
    fn predictor(&self) -> Result<Arc<dyn ChromaPredictor>>;
}

impl<P> PredictorProvider for Arc<P>
where
    P: ChromaPredictor + 'static,
{
    fn predictor(&self) -> Result<Arc<dyn ChromaPredictor>> {
        let predictor: Arc<dyn ChromaPredictor> = Arc::clone(self) as Arc<dyn ChromaPredictor>;
        Ok(predictor)
    }
}
