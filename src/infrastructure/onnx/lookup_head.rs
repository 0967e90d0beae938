// SPDX-License-Identifier: MPL-2.0
//! Final layers of the colorization network, evaluated on the host.
//!
//! The exported graph stops at the per-pixel logits over the quantized chroma
//! bins. Turning those into a/b takes two more layers:
//! - a per-channel rebalance that scales every logit by a constant factor,
//!   sharpening the distribution toward rarer, more saturated bins;
//! - a 1×1 "lookup" convolution whose kernel is the table of bin centers,
//!   applied to the softmax of the rebalanced logits.
//!
//! The result for one pixel is the probability-weighted mean of the bin
//! centers.

use ndarray::{Array1, Array2, Array3};

use crate::application::port::AIError;

/// Rebalance and lookup layers built from the quantization table.
#[derive(Debug, Clone)]
pub struct LookupHead {
    /// Bin centers, shape `(bins, 2)`, columns `a` then `b`.
    centers: Array2<f32>,
    /// Per-bin logit multiplier.
    rebalance: Array1<f32>,
}

impl LookupHead {
    /// Builds the head from `(bins, 2)` bin centers and a uniform rebalance factor.
    ///
    /// # Errors
    ///
    /// Returns [`AIError::ModelLoadFailed`] if the table is empty or does not
    /// have two columns.
    pub fn new(centers: Array2<f32>, rebalance_factor: f32) -> Result<Self, AIError> {
        let (bins, cols) = centers.dim();
        if bins == 0 || cols != 2 {
            return Err(AIError::ModelLoadFailed(format!(
                "quantization table must have shape (bins, 2), got ({bins}, {cols})"
            )));
        }
        Ok(Self {
            centers,
            rebalance: Array1::from_elem(bins, rebalance_factor),
        })
    }

    /// Number of chroma bins.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.centers.nrows()
    }

    /// Converts NCHW logits `[1, bins, rows, cols]` (flattened) to an a/b grid.
    ///
    /// # Errors
    ///
    /// Returns [`AIError::InferenceFailed`] if the shape is not 4-D, the batch
    /// is not 1, the channel count differs from [`bins`](Self::bins), or the
    /// data length does not match the shape.
    pub fn apply(&self, shape: &[i64], logits: &[f32]) -> Result<Array3<f32>, AIError> {
        let dims: Vec<usize> = shape
            .iter()
            .map(|&d| usize::try_from(d))
            .collect::<Result<_, _>>()
            .map_err(|_| AIError::InferenceFailed(format!("negative dimension in output shape {shape:?}")))?;

        let &[batch, channels, rows, cols] = dims.as_slice() else {
            return Err(AIError::InferenceFailed(format!(
                "expected 4-D logits, got {}-D",
                dims.len()
            )));
        };
        if batch != 1 || channels != self.bins() {
            return Err(AIError::InferenceFailed(format!(
                "expected logits of shape [1, {}, h, w], got {shape:?}",
                self.bins()
            )));
        }
        let plane = rows * cols;
        if logits.len() != channels * plane {
            return Err(AIError::InferenceFailed(format!(
                "output holds {} values, shape {shape:?} needs {}",
                logits.len(),
                channels * plane
            )));
        }

        let mut ab = Array3::<f32>::zeros((rows, cols, 2));
        let mut scaled = vec![0.0f32; channels];
        for pixel in 0..plane {
            let mut max = f32::NEG_INFINITY;
            for (q, value) in scaled.iter_mut().enumerate() {
                *value = logits[q * plane + pixel] * self.rebalance[q];
                max = max.max(*value);
            }

            let mut total = 0.0f32;
            let (mut a, mut b) = (0.0f32, 0.0f32);
            for (q, value) in scaled.iter().enumerate() {
                let weight = (value - max).exp();
                total += weight;
                a += weight * self.centers[[q, 0]];
                b += weight * self.centers[[q, 1]];
            }

            let (r, c) = (pixel / cols, pixel % cols);
            ab[[r, c, 0]] = a / total;
            ab[[r, c, 1]] = b / total;
        }
        Ok(ab)
    }
}
