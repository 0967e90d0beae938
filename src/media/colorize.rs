// SPDX-License-Identifier: MPL-2.0
//! Grayscale-to-color conversion driven by a chroma prediction model.
//!
//! The model only ever sees a downscaled, mean-centered lightness plane. The
//! full-resolution lightness of the input is kept as-is and recombined with
//! the upsampled, damped and smoothed chroma, so structural detail comes from
//! the photo and only color comes from the network.

use ndarray::{Array2, Axis};

use crate::application::port::{AIError, ChromaPredictor};
use crate::config::defaults;
use crate::domain::media::RasterImage;
use crate::domain::variant::VariantSpec;
use crate::error::Result;
use crate::media::color::{lab_to_rgb, rgb_to_lab, scale_saturation, LabPlanes};
use crate::media::filter::{bilateral_filter, gaussian_blur, resize_area, resize_bilinear};

/// Predicted chroma at full image resolution, before blending.
#[derive(Debug, Clone)]
pub struct ChromaPrediction {
    lab: LabPlanes,
    a: Array2<f32>,
    b: Array2<f32>,
}

impl ChromaPrediction {
    /// Lightness and chroma of the source image.
    #[must_use]
    pub fn source(&self) -> &LabPlanes {
        &self.lab
    }
}

/// Colorization post-processing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorizationEngine {
    /// Subtracted from the downscaled lightness before inference.
    pub l_mean: f32,
    /// Gaussian sigma applied to the chroma planes.
    pub chroma_blur_sigma: f32,
    pub bilateral_diameter: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
}

impl Default for ColorizationEngine {
    fn default() -> Self {
        Self {
            l_mean: defaults::MODEL_L_MEAN,
            chroma_blur_sigma: defaults::CHROMA_BLUR_SIGMA,
            bilateral_diameter: defaults::BILATERAL_DIAMETER,
            bilateral_sigma_color: defaults::BILATERAL_SIGMA_COLOR,
            bilateral_sigma_space: defaults::BILATERAL_SIGMA_SPACE,
        }
    }
}

impl ColorizationEngine {
    /// Colorizes `image` with one recipe.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Model`] if inference fails or the
    /// predictor returns a malformed chroma grid.
    pub fn colorize(
        &self,
        predictor: &dyn ChromaPredictor,
        image: &RasterImage,
        spec: &VariantSpec,
    ) -> Result<RasterImage> {
        let prediction = self.predict(predictor, image)?;
        Ok(self.render(&prediction, image, spec))
    }

    /// Colorizes `image` once per recipe, running the network a single time.
    ///
    /// # Errors
    ///
    /// Same as [`colorize`](Self::colorize).
    pub fn colorize_variants(
        &self,
        predictor: &dyn ChromaPredictor,
        image: &RasterImage,
        specs: &[VariantSpec],
    ) -> Result<Vec<RasterImage>> {
        let prediction = self.predict(predictor, image)?;
        Ok(specs
            .iter()
            .map(|spec| self.render(&prediction, image, spec))
            .collect())
    }

    /// Colorizes `image` with the recipe's blend only, skipping the
    /// saturation and edge-smoothing passes.
    ///
    /// The lightness of the result equals the input's up to 8-bit rounding.
    ///
    /// # Errors
    ///
    /// Same as [`colorize`](Self::colorize).
    pub fn colorize_lab(
        &self,
        predictor: &dyn ChromaPredictor,
        image: &RasterImage,
        spec: &VariantSpec,
    ) -> Result<RasterImage> {
        let prediction = self.predict(predictor, image)?;
        Ok(self.recombine(&prediction, image, spec.blend()))
    }

    /// Runs the network and upsamples its chroma to the image size.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Model`] if inference fails or the output
    /// is not a `(rows, cols, 2)` grid.
    pub fn predict(&self, predictor: &dyn ChromaPredictor, image: &RasterImage) -> Result<ChromaPrediction> {
        let lab = rgb_to_lab(image);
        let full_size = lab.dim();

        let mut small = resize_area(&lab.l, predictor.input_size());
        small -= self.l_mean;

        let start = std::time::Instant::now();
        let ab = predictor.predict(small.view())?;
        let (grid_rows, grid_cols, channels) = ab.dim();
        if channels != 2 || grid_rows == 0 || grid_cols == 0 {
            return Err(AIError::InferenceFailed(format!(
                "expected a (rows, cols, 2) chroma grid, got {:?}",
                ab.shape()
            ))
            .into());
        }
        tracing::debug!(
            grid_rows,
            grid_cols,
            elapsed_ms = start.elapsed().as_millis(),
            "chroma predicted"
        );

        let a = resize_bilinear(&ab.index_axis(Axis(2), 0).to_owned(), full_size);
        let b = resize_bilinear(&ab.index_axis(Axis(2), 1).to_owned(), full_size);
        Ok(ChromaPrediction { lab, a, b })
    }

    /// Applies one recipe to an existing prediction.
    #[must_use]
    pub fn render(&self, prediction: &ChromaPrediction, image: &RasterImage, spec: &VariantSpec) -> RasterImage {
        let mut result = self.recombine(prediction, image, spec.blend());

        if spec.adjusts_saturation() {
            result = scale_saturation(&result, spec.saturation());
        }
        if spec.edge_smooth() {
            result = bilateral_filter(
                &result,
                self.bilateral_diameter,
                self.bilateral_sigma_color,
                self.bilateral_sigma_space,
            );
        }

        tracing::debug!(
            label = spec.label(),
            blend = spec.blend(),
            saturation = spec.saturation(),
            edge_smooth = spec.edge_smooth(),
            "colorization variant rendered"
        );
        result
    }

    fn recombine(&self, prediction: &ChromaPrediction, image: &RasterImage, blend: f32) -> RasterImage {
        let a = gaussian_blur(&(&prediction.a * blend), self.chroma_blur_sigma);
        let b = gaussian_blur(&(&prediction.b * blend), self.chroma_blur_sigma);
        let planes = LabPlanes {
            l: prediction.lab.l.clone(),
            a,
            b,
        };
        lab_to_rgb(&planes, image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::variant::{COLORIZE_VARIANTS, NATURAL, SOFT};
    use crate::error::Error;
    use crate::test_utils::{assert_abs_diff_eq, FixedChroma};
    use ndarray::{Array3, ArrayView2};

    /// Encodes the mean input lightness into the `a` channel.
    struct EchoMean;

    impl ChromaPredictor for EchoMean {
        fn predict(&self, luminance: ArrayView2<'_, f32>) -> std::result::Result<Array3<f32>, AIError> {
            let mean = luminance.mean().unwrap_or_default();
            Ok(Array3::from_shape_fn((8, 8, 2), |(_, _, c)| if c == 0 { mean } else { 0.0 }))
        }

        fn input_size(&self) -> (usize, usize) {
            (224, 224)
        }
    }

    /// Returns a grid with three channels.
    struct Malformed;

    impl ChromaPredictor for Malformed {
        fn predict(&self, _: ArrayView2<'_, f32>) -> std::result::Result<Array3<f32>, AIError> {
            Ok(Array3::zeros((56, 56, 3)))
        }

        fn input_size(&self) -> (usize, usize) {
            (224, 224)
        }
    }

    fn gray(width: u32, height: u32) -> RasterImage {
        RasterImage::filled(width, height, [128, 128, 128]).unwrap()
    }

    fn warm() -> FixedChroma {
        FixedChroma::WARM
    }

    #[test]
    fn output_matches_input_dimensions() {
        let image = gray(300, 170);
        let out = ColorizationEngine::default()
            .colorize(&warm(), &image, &NATURAL)
            .unwrap();
        assert_eq!(out.dimensions(), (300, 170));
    }

    #[test]
    fn model_input_is_mean_centered() {
        let image = gray(64, 64);
        let prediction = ColorizationEngine::default().predict(&EchoMean, &image).unwrap();
        // Mid gray has L ≈ 53.59, so the network sees ≈ 3.59
        assert_abs_diff_eq!(prediction.a[[10, 10]], 3.585, epsilon = 0.05);
        // The full-resolution lightness is kept without centering
        assert_eq!(prediction.source().dim(), (64, 64));
        assert_abs_diff_eq!(prediction.source().l[[10, 10]], 53.585, epsilon = 0.05);
    }

    #[test]
    fn lightness_is_preserved() {
        let image = RasterImage::from_fn(48, 32, |x, y| {
            let v = (60 + x * 2 + y) as u8;
            [v, v, v]
        })
        .unwrap();
        let out = ColorizationEngine::default()
            .colorize_lab(&warm(), &image, &NATURAL)
            .unwrap();

        let before = rgb_to_lab(&image);
        let after = rgb_to_lab(&out);
        for (l0, l1) in before.l.iter().zip(after.l.iter()) {
            assert_abs_diff_eq!(*l0, *l1, epsilon = 1.0);
        }
        assert!(after.mean_chroma() > 5.0);
    }

    #[test]
    fn chroma_grows_with_blend() {
        let image = gray(40, 40);
        let engine = ColorizationEngine::default();
        let chroma_at = |blend: f32| {
            let spec = NATURAL.with_blend(blend);
            let out = engine.colorize_lab(&warm(), &image, &spec).unwrap();
            rgb_to_lab(&out).mean_chroma()
        };

        let levels: Vec<f32> = [0.0, 0.25, 0.5, 0.75, 1.0].into_iter().map(chroma_at).collect();
        for pair in levels.windows(2) {
            assert!(pair[1] + 0.5 >= pair[0], "chroma decreased: {levels:?}");
        }
        assert!(levels[0] < 1.0);
        assert!(levels[4] > levels[0] + 10.0);
    }

    #[test]
    fn zero_blend_is_neutral_regardless_of_model() {
        let image = gray(20, 20);
        let spec = NATURAL.with_blend(0.0).with_edge_smooth(false);
        let out = ColorizationEngine::default()
            .colorize(&FixedChroma { a: 80.0, b: -60.0 }, &image, &spec)
            .unwrap();
        assert!(out.pixels().all(|[r, g, b]| r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1));
    }

    #[test]
    fn zero_saturation_is_neutral() {
        let image = gray(20, 20);
        let spec = NATURAL.with_saturation(0.0).with_edge_smooth(false);
        let out = ColorizationEngine::default().colorize(&warm(), &image, &spec).unwrap();
        assert!(out.pixels().all(|[r, g, b]| r == g && g == b));
    }

    #[test]
    fn unit_saturation_without_smoothing_equals_lab_result() {
        let image = gray(20, 20);
        let engine = ColorizationEngine::default();
        let spec = NATURAL.with_edge_smooth(false);
        let full = engine.colorize(&warm(), &image, &spec).unwrap();
        let lab_only = engine.colorize_lab(&warm(), &image, &spec).unwrap();
        assert_eq!(full, lab_only);
    }

    #[test]
    fn soft_recipe_is_less_colorful_than_natural() {
        let image = gray(32, 32);
        let engine = ColorizationEngine::default();
        let natural = engine.colorize(&warm(), &image, &NATURAL).unwrap();
        let soft = engine.colorize(&warm(), &image, &SOFT).unwrap();
        assert!(rgb_to_lab(&soft).mean_chroma() < rgb_to_lab(&natural).mean_chroma());
    }

    #[test]
    fn batch_matches_individual_calls() {
        let image = RasterImage::from_fn(30, 20, |x, y| [(x * 8) as u8, (y * 12) as u8, 90]).unwrap();
        let engine = ColorizationEngine::default();
        let batch = engine.colorize_variants(&warm(), &image, &COLORIZE_VARIANTS).unwrap();
        assert_eq!(batch.len(), 3);
        for (spec, variant) in COLORIZE_VARIANTS.iter().zip(&batch) {
            assert_eq!(*variant, engine.colorize(&warm(), &image, spec).unwrap());
        }
    }

    #[test]
    fn malformed_prediction_is_an_inference_error() {
        let image = gray(10, 10);
        let result = ColorizationEngine::default().colorize(&Malformed, &image, &NATURAL);
        assert!(matches!(result, Err(Error::Model(AIError::InferenceFailed(_)))));
    }
}
