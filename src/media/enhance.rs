// SPDX-License-Identifier: MPL-2.0
//! Model-free enhancement recipes.
//!
//! [`EnhancementEngine`] produces three variants of a photo:
//! 1. **Denoise**: non-local means in L*a*b*, then a mild contrast and
//!    brightness lift.
//! 2. **CLAHE**: local contrast equalization on lightness only.
//! 3. **Sharp & warm**: unsharp mask, then a constant boost of the red channel.

use image_rs::imageops;

use crate::config::defaults;
use crate::domain::media::RasterImage;
use crate::domain::variant::EnhancementKind;
use crate::media::clahe::clahe;
use crate::media::color::{lab_to_rgb, lightness_from_u8, lightness_to_u8, rgb_to_lab, saturate_u8};
use crate::media::denoise::denoise_colored;
use crate::media::image::to_rgb_image;

/// Parameters for the three enhancement recipes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhancementEngine {
    pub denoise_h_luma: f32,
    pub denoise_h_color: f32,
    pub denoise_template_window: usize,
    pub denoise_search_window: usize,
    pub contrast_gain: f32,
    pub brightness_offset: f32,
    pub clahe_clip_limit: f32,
    pub clahe_tile_grid: usize,
    pub sharpen_sigma: f32,
    pub sharpen_original_weight: f32,
    pub sharpen_blur_weight: f32,
    pub warm_red_offset: u8,
}

impl Default for EnhancementEngine {
    fn default() -> Self {
        Self {
            denoise_h_luma: defaults::DENOISE_H_LUMA,
            denoise_h_color: defaults::DENOISE_H_COLOR,
            denoise_template_window: defaults::DENOISE_TEMPLATE_WINDOW,
            denoise_search_window: defaults::DENOISE_SEARCH_WINDOW,
            contrast_gain: defaults::DENOISE_CONTRAST_GAIN,
            brightness_offset: defaults::DENOISE_BRIGHTNESS_OFFSET,
            clahe_clip_limit: defaults::CLAHE_CLIP_LIMIT,
            clahe_tile_grid: defaults::CLAHE_TILE_GRID,
            sharpen_sigma: defaults::SHARPEN_BLUR_SIGMA,
            sharpen_original_weight: defaults::SHARPEN_ORIGINAL_WEIGHT,
            sharpen_blur_weight: defaults::SHARPEN_BLUR_WEIGHT,
            warm_red_offset: defaults::WARM_RED_OFFSET,
        }
    }
}

impl EnhancementEngine {
    /// Runs all three recipes, in [`EnhancementKind::ALL`] order.
    #[must_use]
    pub fn enhance(&self, image: &RasterImage) -> [RasterImage; 3] {
        EnhancementKind::ALL.map(|kind| self.apply(kind, image))
    }

    /// Runs one recipe.
    #[must_use]
    pub fn apply(&self, kind: EnhancementKind, image: &RasterImage) -> RasterImage {
        let start = std::time::Instant::now();
        let result = match kind {
            EnhancementKind::Denoise => self.denoise(image),
            EnhancementKind::Clahe => self.equalize(image),
            EnhancementKind::SharpWarm => self.sharpen_warm(image),
        };
        tracing::debug!(
            recipe = kind.label(),
            width = image.width(),
            height = image.height(),
            elapsed_ms = start.elapsed().as_millis(),
            "enhancement applied"
        );
        result
    }

    fn denoise(&self, image: &RasterImage) -> RasterImage {
        let clean = denoise_colored(
            image,
            self.denoise_h_luma,
            self.denoise_h_color,
            self.denoise_template_window,
            self.denoise_search_window,
        );
        let (gain, offset) = (self.contrast_gain, self.brightness_offset);
        clean.map_pixels(|pixel| pixel.map(|v| saturate_u8(f32::from(v) * gain + offset)))
    }

    fn equalize(&self, image: &RasterImage) -> RasterImage {
        let mut lab = rgb_to_lab(image);
        let equalized = clahe(&lightness_to_u8(&lab.l), self.clahe_clip_limit, self.clahe_tile_grid);
        lab.l = lightness_from_u8(&equalized);
        lab_to_rgb(&lab, image)
    }

    fn sharpen_warm(&self, image: &RasterImage) -> RasterImage {
        let original = to_rgb_image(image);
        let blurred = imageops::blur(&original, self.sharpen_sigma);

        let (wo, wb) = (self.sharpen_original_weight, self.sharpen_blur_weight);
        let red_offset = self.warm_red_offset;
        let rgb = original
            .as_raw()
            .chunks_exact(RasterImage::CHANNELS)
            .zip(blurred.as_raw().chunks_exact(RasterImage::CHANNELS))
            .flat_map(|(o, b)| {
                let mix = |i: usize| saturate_u8(wo * f32::from(o[i]) + wb * f32::from(b[i]));
                [mix(0).saturating_add(red_offset), mix(1), mix(2)]
            })
            .collect();
        image.with_rgb_bytes(rgb)
    }
}
