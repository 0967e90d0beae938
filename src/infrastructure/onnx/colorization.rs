// SPDX-License-Identifier: MPL-2.0
//! Colorization network adapter implementing the [`ChromaPredictor`] trait.
//!
//! The model directory holds three artifacts:
//!
//! | File | Content |
//! |---|---|
//! | [`TOPOLOGY_FILE`] | ONNX graph ending at the chroma-bin logits |
//! | [`WEIGHTS_FILE`] | external initializers referenced by the graph |
//! | [`QUANTIZATION_TABLE_FILE`] | `(313, 2)` NumPy array of bin centers |
//!
//! ONNX Runtime resolves the weights file relative to the graph, so both must
//! sit side by side.
//!
//! [`ChromaPredictor`]: crate::application::port::ChromaPredictor

use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use ndarray::{Array2, Array3, Array4, ArrayView2};
use ndarray_npy::ReadNpyExt;
use ort::session::{builder::GraphOptimizationLevel, Session};

use super::lookup_head::LookupHead;
use crate::application::port::{AIError, ChromaPredictor};
use crate::config::defaults::{MODEL_INPUT_SIZE, QUANTIZATION_BINS, REBALANCE_FACTOR};
use crate::error::{Error, Result};

/// Network topology file name.
pub const TOPOLOGY_FILE: &str = "colorization_deploy_v2.onnx";

/// External weights file name.
pub const WEIGHTS_FILE: &str = "colorization_release_v2.onnx.data";

/// Quantization table file name.
pub const QUANTIZATION_TABLE_FILE: &str = "pts_in_hull.npy";

/// All artifacts that must be present before loading.
pub const REQUIRED_FILES: [&str; 3] = [TOPOLOGY_FILE, WEIGHTS_FILE, QUANTIZATION_TABLE_FILE];

/// Input tensor name used when the graph does not report one.
const DEFAULT_INPUT_NAME: &str = "data_l";

/// Checks that every artifact exists and can be opened.
///
/// # Errors
///
/// Returns [`Error::ModelFilesMissing`] listing every file that could not be
/// opened.
pub fn check_artifacts(dir: &Path) -> Result<()> {
    let missing: Vec<String> = REQUIRED_FILES
        .iter()
        .filter(|name| File::open(dir.join(name)).is_err())
        .map(|name| (*name).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::ModelFilesMissing {
            dir: dir.to_path_buf(),
            missing,
        })
    }
}

/// Reads the bin-center table, accepting integer or float storage.
///
/// # Errors
///
/// Returns [`AIError::ModelLoadFailed`] if the file cannot be read, is not a
/// 2-D NumPy array of a supported dtype, or does not have shape `(313, 2)`.
pub fn load_quantization_table(path: &Path) -> std::result::Result<Array2<f32>, AIError> {
    let bytes = fs::read(path).map_err(|e| AIError::ModelLoadFailed(format!("{}: {e}", path.display())))?;

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let table = Array2::<i64>::read_npy(bytes.as_slice())
        .map(|t| t.mapv(|v| v as f32))
        .or_else(|_| Array2::<f64>::read_npy(bytes.as_slice()).map(|t| t.mapv(|v| v as f32)))
        .or_else(|_| Array2::<f32>::read_npy(bytes.as_slice()))
        .map_err(|e| AIError::ModelLoadFailed(format!("{}: {e}", path.display())))?;

    if table.dim() != (QUANTIZATION_BINS, 2) {
        return Err(AIError::ModelLoadFailed(format!(
            "{}: expected shape ({QUANTIZATION_BINS}, 2), got {:?}",
            path.display(),
            table.shape()
        )));
    }
    Ok(table)
}

/// Loaded colorization network plus its host-side output head.
///
/// # Thread Safety
///
/// Running a session needs exclusive access, so the session sits behind a
/// mutex; everything else is immutable after [`load`](Self::load).
pub struct ColorModel {
    session: Mutex<Session>,
    input_name: String,
    head: LookupHead,
}

impl std::fmt::Debug for ColorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorModel")
            .field("input_name", &self.input_name)
            .field("bins", &self.head.bins())
            .finish_non_exhaustive()
    }
}

impl ColorModel {
    /// Loads the network from `dir`.
    ///
    /// # Errors
    ///
    /// - [`Error::ModelFilesMissing`] if any artifact is absent or unreadable
    /// - [`Error::Model`] if the table has the wrong shape or the graph fails
    ///   to load
    pub fn load(dir: &Path) -> Result<Self> {
        check_artifacts(dir)?;

        let table = load_quantization_table(&dir.join(QUANTIZATION_TABLE_FILE))?;
        let head = LookupHead::new(table, REBALANCE_FACTOR)?;

        let start = std::time::Instant::now();
        let session = Session::builder()
            .map_err(|e| AIError::ModelLoadFailed(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| AIError::ModelLoadFailed(e.to_string()))?
            .commit_from_file(dir.join(TOPOLOGY_FILE))
            .map_err(|e| AIError::ModelLoadFailed(e.to_string()))?;

        let input_name = session
            .inputs
            .first()
            .map_or_else(|| DEFAULT_INPUT_NAME.to_string(), |i| i.name.clone());

        tracing::info!(
            dir = %dir.display(),
            input = %input_name,
            elapsed_ms = start.elapsed().as_millis(),
            "colorization model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            head,
        })
    }
}

impl ChromaPredictor for ColorModel {
    fn predict(&self, luminance: ArrayView2<'_, f32>) -> std::result::Result<Array3<f32>, AIError> {
        let expected = self.input_size();
        if luminance.dim() != expected {
            return Err(AIError::InputSizeMismatch {
                expected,
                actual: luminance.dim(),
            });
        }

        let (rows, cols) = expected;
        let input = Array4::from_shape_fn((1, 1, rows, cols), |(_, _, r, c)| luminance[[r, c]]);
        let input_ref =
            ort::value::TensorRef::from_array_view(&input).map_err(|e| AIError::InferenceFailed(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AIError::InferenceFailed("Lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_ref])
            .map_err(|e| AIError::InferenceFailed(e.to_string()))?;

        let (_, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| AIError::InferenceFailed("No output tensor".to_string()))?;
        let (shape, logits) = output
            .try_extract_tensor::<f32>()
            .map_err(|e: ort::Error| AIError::InferenceFailed(e.to_string()))?;

        self.head.apply(&shape[..], logits)
    }

    fn input_size(&self) -> (usize, usize) {
        (MODEL_INPUT_SIZE, MODEL_INPUT_SIZE)
    }
}
