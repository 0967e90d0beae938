// SPDX-License-Identifier: MPL-2.0
//! Variant generation for a single input image.
//!
//! [`VariantPipeline`] turns one image file into three JPEG variants, chosen
//! by [`ProcessingMode`]:
//!
//! | Mode | Variants |
//! |---|---|
//! | `enhance` | denoise, clahe, sharp_warm |
//! | `colorize` | natural, soft, vivid colorizations of the input |
//! | `both` | natural, soft, vivid colorizations of the denoised input |
//!
//! Work is ordered so that cheap failures come first: the mode is validated,
//! then the model acquired (colorizing modes only), then the image decoded.
//! Nothing is written until every variant has been computed, and a failed
//! write removes the files this call already produced.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::port::{ChromaPredictor, PredictorProvider};
use crate::config::Config;
use crate::domain::media::RasterImage;
use crate::domain::variant::{variant_file_name, EnhancementKind, ProcessingMode, COLORIZE_VARIANTS};
use crate::error::{Error, Result};
use crate::infrastructure::onnx::SharedColorModel;
use crate::media::{load_image, save_jpeg, ColorizationEngine, EnhancementEngine};
use crate::paths;

/// Stem used when the input path has no file name.
const FALLBACK_STEM: &str = "image";

/// One computed, not yet written, output.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Label used in the output file name.
    pub label: &'static str,
    pub image: RasterImage,
}

/// Produces enhancement and colorization variants of image files.
///
/// Stateless between calls apart from the shared model, so one pipeline can
/// serve concurrent requests.
pub struct VariantPipeline {
    provider: Arc<dyn PredictorProvider>,
    enhancer: EnhancementEngine,
    colorizer: ColorizationEngine,
    jpeg_quality: u8,
}

impl std::fmt::Debug for VariantPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantPipeline")
            .field("enhancer", &self.enhancer)
            .field("colorizer", &self.colorizer)
            .field("jpeg_quality", &self.jpeg_quality)
            .finish_non_exhaustive()
    }
}

impl VariantPipeline {
    /// Creates a pipeline backed by the process-wide colorization model.
    ///
    /// The model directory is resolved through [`paths::get_model_dir_with_override`]
    /// with the settings' `model_dir`; the model itself loads on the first
    /// colorizing call.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let model_dir = paths::get_model_dir_with_override(None, config.model_dir.as_deref());
        let shared = SharedColorModel::init_global(model_dir);
        let provider: Arc<dyn PredictorProvider> = Arc::clone(shared) as Arc<dyn PredictorProvider>;
        Self::with_provider(provider, config.jpeg_quality())
    }

    /// Creates a pipeline with an explicit predictor source.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn PredictorProvider>, jpeg_quality: u8) -> Self {
        Self {
            provider,
            enhancer: EnhancementEngine::default(),
            colorizer: ColorizationEngine::default(),
            jpeg_quality,
        }
    }

    /// Replaces the engine parameters.
    #[must_use]
    pub fn with_engines(mut self, enhancer: EnhancementEngine, colorizer: ColorizationEngine) -> Self {
        self.enhancer = enhancer;
        self.colorizer = colorizer;
        self
    }

    /// JPEG quality used for written variants.
    #[must_use]
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Processes `image_path` and writes three variants into `output_dir`.
    ///
    /// `mode` is matched case-insensitively after trimming. Returns the
    /// written paths in variant order.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMode`] for an unknown mode, before any I/O
    /// - [`Error::ModelFilesMissing`] / [`Error::Model`] if the model cannot be
    ///   acquired, before the image is read
    /// - [`Error::InvalidImage`] if the input cannot be decoded
    /// - [`Error::Io`] if the output directory or a file cannot be written
    pub fn process(&self, image_path: &Path, output_dir: &Path, mode: &str) -> Result<Vec<PathBuf>> {
        let mode: ProcessingMode = mode.parse()?;
        let start = std::time::Instant::now();

        let variants = if mode.needs_model() {
            let predictor = self.provider.predictor()?;
            let image = load_image(image_path)?;
            self.colorize(predictor.as_ref(), &image, mode)?
        } else {
            let image = load_image(image_path)?;
            self.enhance(&image)
        };

        let stem = image_path
            .file_stem()
            .map_or_else(|| FALLBACK_STEM.into(), OsStr::to_string_lossy);
        let written = self.write_variants(&variants, &stem, mode, output_dir)?;

        tracing::info!(
            input = %image_path.display(),
            %mode,
            count = written.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "variants generated"
        );
        Ok(written)
    }

    /// Runs [`process`](Self::process) on tokio's blocking thread pool.
    ///
    /// # Errors
    ///
    /// Same as [`process`](Self::process), plus [`Error::Io`] if the blocking
    /// task panics or is cancelled.
    pub async fn process_async(
        self: Arc<Self>,
        image_path: PathBuf,
        output_dir: PathBuf,
        mode: String,
    ) -> Result<Vec<PathBuf>> {
        tokio::task::spawn_blocking(move || self.process(&image_path, &output_dir, &mode))
            .await
            .map_err(|e| Error::Io(format!("processing task failed: {e}")))?
    }

    /// Computes the variants for `mode` in memory without writing them.
    ///
    /// # Errors
    ///
    /// Returns model acquisition or inference errors for colorizing modes.
    pub fn generate(&self, image: &RasterImage, mode: ProcessingMode) -> Result<Vec<Variant>> {
        if mode.needs_model() {
            let predictor = self.provider.predictor()?;
            self.colorize(predictor.as_ref(), image, mode)
        } else {
            Ok(self.enhance(image))
        }
    }

    fn enhance(&self, image: &RasterImage) -> Vec<Variant> {
        EnhancementKind::ALL
            .into_iter()
            .zip(self.enhancer.enhance(image))
            .map(|(kind, image)| Variant {
                label: kind.label(),
                image,
            })
            .collect()
    }

    fn colorize(
        &self,
        predictor: &dyn ChromaPredictor,
        image: &RasterImage,
        mode: ProcessingMode,
    ) -> Result<Vec<Variant>> {
        let images = if mode == ProcessingMode::Both {
            let base = self.enhancer.apply(EnhancementKind::Denoise, image);
            self.colorizer.colorize_variants(predictor, &base, &COLORIZE_VARIANTS)?
        } else {
            self.colorizer.colorize_variants(predictor, image, &COLORIZE_VARIANTS)?
        };

        Ok(COLORIZE_VARIANTS
            .iter()
            .zip(images)
            .map(|(spec, image)| Variant {
                label: spec.label(),
                image,
            })
            .collect())
    }

    fn write_variants(
        &self,
        variants: &[Variant],
        stem: &str,
        mode: ProcessingMode,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)?;

        let mut written = Vec::with_capacity(variants.len());
        for (index, variant) in variants.iter().enumerate() {
            let path = output_dir.join(variant_file_name(stem, mode, index + 1, variant.label));
            if let Err(err) = save_jpeg(&variant.image, &path, self.jpeg_quality) {
                remove_partial(&written, &path);
                return Err(err);
            }
            tracing::debug!(path = %path.display(), "variant written");
            written.push(path);
        }
        Ok(written)
    }
}

/// Removes files written before a failure, including a truncated `failed` file.
fn remove_partial(written: &[PathBuf], failed: &Path) {
    for path in written.iter().map(PathBuf::as_path).chain(std::iter::once(failed)) {
        if !path.is_file() {
            continue;
        }
        if let Err(err) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), %err, "failed to remove partial output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FixedChroma;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Provider that never finds its artifacts and counts attempts.
    #[derive(Default)]
    struct MissingModel {
        calls: AtomicUsize,
    }

    impl PredictorProvider for MissingModel {
        fn predictor(&self) -> Result<Arc<dyn ChromaPredictor>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::ModelFilesMissing {
                dir: PathBuf::from("/models"),
                missing: vec!["pts_in_hull.npy".to_string()],
            })
        }
    }

    fn mock_pipeline() -> VariantPipeline {
        VariantPipeline::with_provider(Arc::new(Arc::new(FixedChroma { a: 18.0, b: 12.0 })), 90)
    }

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image_rs::RgbImage::from_fn(24, 16, |x, y| image_rs::Rgb([(x * 10) as u8, (y * 15) as u8, 100]))
            .save(&path)
            .expect("failed to write png");
        path
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn invalid_mode_fails_before_any_io() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let result = mock_pipeline().process(&dir.path().join("missing.png"), &out, "pastel");

        assert!(matches!(result, Err(Error::InvalidMode(m)) if m == "pastel"));
        assert!(!out.exists());
    }

    #[test]
    fn missing_model_fails_before_decode() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let provider = Arc::new(MissingModel::default());
        let pipeline = VariantPipeline::with_provider(provider.clone(), 90);

        // The input does not exist either; the model error must win
        let result = pipeline.process(&dir.path().join("missing.png"), &out, "colorize");
        assert!(matches!(result, Err(Error::ModelFilesMissing { .. })));
        assert!(!out.exists());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn enhance_does_not_touch_the_model() {
        let dir = tempdir().unwrap();
        let input = write_png(dir.path(), "photo.png");
        let provider = Arc::new(MissingModel::default());
        let pipeline = VariantPipeline::with_provider(provider.clone(), 90);

        let paths = pipeline.process(&input, &dir.path().join("out"), "enhance").unwrap();
        assert_eq!(
            file_names(&paths),
            ["photo_enhance1_denoise.jpg", "photo_enhance2_clahe.jpg", "photo_enhance3_sharp_warm.jpg"]
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn colorize_names_follow_recipes() {
        let dir = tempdir().unwrap();
        let input = write_png(dir.path(), "photo.png");
        let paths = mock_pipeline().process(&input, &dir.path().join("out"), " Colorize ").unwrap();

        assert_eq!(
            file_names(&paths),
            ["photo_colorize1_natural.jpg", "photo_colorize2_soft.jpg", "photo_colorize3_vivid.jpg"]
        );
        assert!(paths.iter().all(|p| p.is_file()));
    }

    #[test]
    fn both_mode_colorizes_the_denoised_image() {
        let dir = tempdir().unwrap();
        let input = write_png(dir.path(), "photo.png");
        let paths = mock_pipeline().process(&input, &dir.path().join("out"), "BOTH").unwrap();
        assert_eq!(
            file_names(&paths),
            ["photo_both1_natural.jpg", "photo_both2_soft.jpg", "photo_both3_vivid.jpg"]
        );

        let image = load_image(&input).unwrap();
        let pipeline = mock_pipeline();
        let colorized = pipeline.generate(&image, ProcessingMode::Colorize).unwrap();
        let both = pipeline.generate(&image, ProcessingMode::Both).unwrap();
        assert_ne!(colorized[0].image, both[0].image);
    }

    #[test]
    fn undecodable_input_is_invalid_image() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("broken.jpg");
        fs::write(&input, b"\xFF\xD8 truncated").unwrap();
        let out = dir.path().join("out");

        let result = mock_pipeline().process(&input, &out, "enhance");
        assert!(matches!(result, Err(Error::InvalidImage(_))));
        assert!(!out.exists());
    }

    #[test]
    fn failed_write_removes_earlier_outputs() {
        let dir = tempdir().unwrap();
        let input = write_png(dir.path(), "photo.png");
        let out = dir.path().join("out");
        // A directory where the second file should go makes that write fail
        fs::create_dir_all(out.join("photo_enhance2_clahe.jpg")).unwrap();

        let result = mock_pipeline().process(&input, &out, "enhance");
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!out.join("photo_enhance1_denoise.jpg").exists());
        assert!(!out.join("photo_enhance3_sharp_warm.jpg").exists());
    }

    #[test]
    fn output_dir_is_created() {
        let dir = tempdir().unwrap();
        let input = write_png(dir.path(), "photo.png");
        let out = dir.path().join("nested").join("deeper");

        let paths = mock_pipeline().process(&input, &out, "enhance").unwrap();
        assert!(paths.iter().all(|p| p.starts_with(&out)));
    }

    #[tokio::test]
    async fn async_processing_matches_sync() {
        let dir = tempdir().unwrap();
        let input = write_png(dir.path(), "photo.png");
        let pipeline = Arc::new(mock_pipeline());

        let paths = Arc::clone(&pipeline)
            .process_async(input.clone(), dir.path().join("async"), "colorize".to_string())
            .await
            .unwrap();
        let sync_paths = pipeline.process(&input, &dir.path().join("sync"), "colorize").unwrap();

        assert_eq!(file_names(&paths), file_names(&sync_paths));
        for (a, b) in paths.iter().zip(&sync_paths) {
            assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
        }
    }

    #[test]
    fn constructor_keeps_jpeg_quality() {
        let provider: Arc<dyn PredictorProvider> = Arc::new(MissingModel::default());
        assert_eq!(VariantPipeline::with_provider(provider, 72).jpeg_quality(), 72);
    }

    #[test]
    fn custom_engines_drive_generation() {
        let image = RasterImage::filled(16, 12, [128, 128, 128]).unwrap();
        let cool = EnhancementEngine {
            warm_red_offset: 0,
            ..EnhancementEngine::default()
        };
        let muted = ColorizationEngine {
            chroma_blur_sigma: 0.0,
            ..ColorizationEngine::default()
        };
        let pipeline = mock_pipeline().with_engines(cool, muted);

        let default_variants = mock_pipeline().generate(&image, ProcessingMode::Enhance).unwrap();
        let variants = pipeline.generate(&image, ProcessingMode::Enhance).unwrap();
        // Without the tint the sharpened gray stays gray
        let [r, g, b] = variants[2].image.pixel(8, 6);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_ne!(variants[2], default_variants[2]);
        assert_eq!(variants[0], default_variants[0]);
    }

    #[test]
    fn colorize_variants_are_distinct_renders() {
        let image = RasterImage::from_fn(32, 24, |x, y| {
            let v = (40 + x * 4 + y * 2) as u8;
            [v, v, v]
        })
        .unwrap();
        let variants = mock_pipeline().generate(&image, ProcessingMode::Colorize).unwrap();
        let labels: Vec<_> = variants.iter().map(|v| v.label).collect();
        assert_eq!(labels, ["natural", "soft", "vivid"]);
        assert_ne!(variants[0].image, variants[1].image);
        assert_ne!(variants[1].image, variants[2].image);
        assert_ne!(variants[0].image, variants[2].image);
    }
}
