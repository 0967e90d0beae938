// SPDX-License-Identifier: MPL-2.0
//! Test utilities: float assertions and a stand-in for the colorization network.
//!
//! This module re-exports the `approx` crate's assertion macros for float comparison,
//! which properly handle floating-point precision issues that `assert_eq!` cannot.

// Re-export approx macros for convenient use in tests
pub use approx::assert_abs_diff_eq;

use ndarray::{Array3, ArrayView2};

use crate::application::port::{AIError, ChromaPredictor};
use crate::config::defaults::MODEL_INPUT_SIZE;

/// Chroma grid edge of the reference network (input / 4).
pub const MOCK_GRID: usize = MODEL_INPUT_SIZE / 4;

/// Predictor returning the same a/b everywhere, on the reference grid size.
///
/// Panics if called with an input that is not `224×224`, so tests also catch
/// callers that skip the downscale.
#[derive(Debug, Clone, Copy)]
pub struct FixedChroma {
    pub a: f32,
    pub b: f32,
}

impl FixedChroma {
    /// A moderate warm tint that stays inside the sRGB gamut at mid lightness.
    pub const WARM: FixedChroma = FixedChroma { a: 20.0, b: 10.0 };
}

impl ChromaPredictor for FixedChroma {
    fn predict(&self, luminance: ArrayView2<'_, f32>) -> Result<Array3<f32>, AIError> {
        assert_eq!(luminance.dim(), self.input_size(), "predictor called with unscaled input");
        Ok(Array3::from_shape_fn((MOCK_GRID, MOCK_GRID, 2), |(_, _, c)| {
            if c == 0 {
                self.a
            } else {
                self.b
            }
        }))
    }

    fn input_size(&self) -> (usize, usize) {
        (MODEL_INPUT_SIZE, MODEL_INPUT_SIZE)
    }
}
