// SPDX-License-Identifier: MPL-2.0
//! Process-wide, lazily loaded colorization model.
//!
//! Loading the network is expensive, so it happens at most once per process
//! and the result is shared read-only between concurrent pipeline calls.
//! First-time loads are serialized; a failed load is not remembered, so a
//! later call retries after the operator installs the artifacts.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use super::colorization::ColorModel;
use crate::application::port::{AIError, ChromaPredictor, PredictorProvider};
use crate::error::Result;
use crate::paths;

static GLOBAL: OnceLock<Arc<SharedColorModel>> = OnceLock::new();

/// Lazily loaded, shareable [`ColorModel`] bound to one model directory.
#[derive(Debug)]
pub struct SharedColorModel {
    model_dir: PathBuf,
    slot: RwLock<Option<Arc<ColorModel>>>,
    /// Held while loading so concurrent first calls load only once.
    init: Mutex<()>,
}

impl SharedColorModel {
    /// Creates an empty holder for the model in `model_dir`.
    #[must_use]
    pub fn new(model_dir: PathBuf) -> Self {
        Self {
            model_dir,
            slot: RwLock::new(None),
            init: Mutex::new(()),
        }
    }

    /// Returns the process-wide holder, bound to [`paths::get_model_dir`]
    /// unless [`init_global`](Self::init_global) ran first.
    pub fn global() -> &'static Arc<SharedColorModel> {
        GLOBAL.get_or_init(|| Arc::new(Self::new(paths::get_model_dir())))
    }

    /// Binds the process-wide holder to `model_dir` and returns it.
    ///
    /// Only the first binding takes effect; a later call with a different
    /// directory is logged and ignored.
    pub fn init_global(model_dir: PathBuf) -> &'static Arc<SharedColorModel> {
        let global = GLOBAL.get_or_init(|| Arc::new(Self::new(model_dir.clone())));
        if global.model_dir != model_dir {
            tracing::warn!(
                bound = %global.model_dir.display(),
                requested = %model_dir.display(),
                "shared colorization model already bound to another directory"
            );
        }
        global
    }

    /// Directory the model is loaded from.
    #[must_use]
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Returns the loaded model, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::ModelFilesMissing`] if artifacts are
    /// absent, or [`crate::error::Error::Model`] if loading fails.
    pub fn get_or_load(&self) -> Result<Arc<ColorModel>> {
        if let Some(model) = self.loaded()? {
            return Ok(model);
        }

        let _guard = self
            .init
            .lock()
            .map_err(|_| AIError::ModelLoadFailed("Lock poisoned".to_string()))?;

        // Another caller may have finished loading while we waited
        if let Some(model) = self.loaded()? {
            return Ok(model);
        }

        let model = Arc::new(ColorModel::load(&self.model_dir)?);
        let mut slot = self
            .slot
            .write()
            .map_err(|_| AIError::ModelLoadFailed("Lock poisoned".to_string()))?;
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }

    /// Whether the model is currently loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.slot.read().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Drops the shared model. Callers still holding an `Arc` keep theirs.
    pub fn unload(&self) {
        match self.slot.write() {
            Ok(mut slot) => {
                if slot.take().is_some() {
                    tracing::info!(dir = %self.model_dir.display(), "colorization model unloaded");
                }
            }
            Err(_) => tracing::warn!("shared colorization model lock poisoned during unload"),
        }
    }

    fn loaded(&self) -> Result<Option<Arc<ColorModel>>> {
        let slot = self
            .slot
            .read()
            .map_err(|_| AIError::ModelLoadFailed("Lock poisoned".to_string()))?;
        Ok(slot.clone())
    }
}

impl PredictorProvider for SharedColorModel {
    fn predictor(&self) -> Result<Arc<dyn ChromaPredictor>> {
        let model: Arc<dyn ChromaPredictor> = self.get_or_load()?;
        Ok(model)
    }
}
