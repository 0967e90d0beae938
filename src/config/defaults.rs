// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all processing constants.
//!
//! This module serves as the single source of truth for the numeric
//! parameters of the enhancement and colorization engines.
//!
//! # Categories
//!
//! - **Colorization**: network input geometry and chroma post-processing
//! - **Denoise**: non-local-means strengths and windows
//! - **CLAHE**: clip limit and tile grid
//! - **Sharpen**: unsharp mask and warm tint
//! - **Output**: JPEG encoding

// ==========================================================================
// Colorization Defaults
// ==========================================================================

/// Side length of the square L plane fed to the network.
pub const MODEL_INPUT_SIZE: usize = 224;

/// Mean subtracted from L before inference (network training normalization).
pub const MODEL_L_MEAN: f32 = 50.0;

/// Number of quantized chroma bins predicted by the network.
pub const QUANTIZATION_BINS: usize = 313;

/// Constant written into every channel of the rebalance layer.
pub const REBALANCE_FACTOR: f32 = 2.606;

/// Gaussian sigma applied to the upsampled a/b planes.
pub const CHROMA_BLUR_SIGMA: f32 = 1.0;

/// Bilateral filter diameter for edge-preserving smoothing.
pub const BILATERAL_DIAMETER: u32 = 7;

/// Bilateral filter color sigma (8-bit RGB units).
pub const BILATERAL_SIGMA_COLOR: f32 = 50.0;

/// Bilateral filter spatial sigma (pixels).
pub const BILATERAL_SIGMA_SPACE: f32 = 50.0;

// ==========================================================================
// Denoise Defaults
// ==========================================================================

/// Filter strength for the lightness channel.
pub const DENOISE_H_LUMA: f32 = 7.0;

/// Filter strength for the chroma channels.
pub const DENOISE_H_COLOR: f32 = 7.0;

/// Side length of the patches compared by non-local means.
pub const DENOISE_TEMPLATE_WINDOW: usize = 7;

/// Side length of the search window around each pixel.
pub const DENOISE_SEARCH_WINDOW: usize = 21;

/// Contrast gain applied after denoising.
pub const DENOISE_CONTRAST_GAIN: f32 = 1.15;

/// Brightness offset applied after denoising.
pub const DENOISE_BRIGHTNESS_OFFSET: f32 = 5.0;

// ==========================================================================
// CLAHE Defaults
// ==========================================================================

/// Histogram clip limit, relative to a flat histogram.
pub const CLAHE_CLIP_LIMIT: f32 = 2.0;

/// Number of tiles along each axis.
pub const CLAHE_TILE_GRID: usize = 8;

// ==========================================================================
// Sharpen Defaults
// ==========================================================================

/// Gaussian sigma of the unsharp-mask blur.
pub const SHARPEN_BLUR_SIGMA: f32 = 2.0;

/// Weight of the original image in the unsharp mask.
pub const SHARPEN_ORIGINAL_WEIGHT: f32 = 1.5;

/// Weight of the blurred image in the unsharp mask.
pub const SHARPEN_BLUR_WEIGHT: f32 = -0.5;

/// Offset added to the red channel for the warm cast.
pub const WARM_RED_OFFSET: u8 = 15;

// ==========================================================================
// Output Defaults
// ==========================================================================

/// Default JPEG quality for written variants.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Minimum accepted JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum accepted JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(MODEL_INPUT_SIZE > 0);
    assert!(QUANTIZATION_BINS > 0);
    assert!(CHROMA_BLUR_SIGMA > 0.0);
    assert!(BILATERAL_DIAMETER % 2 == 1);

    // Windows must be odd so they have a center pixel
    assert!(DENOISE_TEMPLATE_WINDOW % 2 == 1);
    assert!(DENOISE_SEARCH_WINDOW % 2 == 1);
    assert!(DENOISE_SEARCH_WINDOW > DENOISE_TEMPLATE_WINDOW);

    assert!(CLAHE_CLIP_LIMIT >= 1.0);
    assert!(CLAHE_TILE_GRID > 0);

    // Unsharp weights must sum to one so flat regions are unchanged
    assert!(SHARPEN_ORIGINAL_WEIGHT + SHARPEN_BLUR_WEIGHT == 1.0);

    assert!(DEFAULT_JPEG_QUALITY >= MIN_JPEG_QUALITY);
    assert!(DEFAULT_JPEG_QUALITY <= MAX_JPEG_QUALITY);
};
