// SPDX-License-Identifier: MPL-2.0
//! Spatial filters and resamplers on floating-point planes and RGB images.
//!
//! Gaussian blur and bilinear upsampling go through `imageproc` and `image`
//! on `Luma<f32>` buffers. Area averaging and the bilateral filter work on
//! the planes directly.
//!
//! The hand-rolled filters use "reflect 101" borders (`dcb|abcd|cba`), which
//! keep flat regions flat up to the image edge.

use image_rs::imageops::{self, FilterType};
use image_rs::{ImageBuffer, Luma};
use imageproc::filter::gaussian_blur_f32;
use ndarray::Array2;

use crate::domain::media::RasterImage;
use crate::media::color::saturate_u8;

// ==========================================================================
// Border Handling
// ==========================================================================

/// Maps an out-of-range index back into `0..len` by mirror reflection
/// without repeating the edge sample.
#[must_use]
pub fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    #[allow(clippy::cast_possible_wrap)]
    let last = len as isize - 1;
    let mut i = index;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    #[allow(clippy::cast_sign_loss)]
    let i = i as usize;
    i
}

// ==========================================================================
// Plane Buffers
// ==========================================================================

/// Single-channel float image as used by `image` and `imageproc`.
pub type FloatPlane = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Copies a `(rows, cols)` plane into a `cols × rows` luma buffer.
#[must_use]
pub fn to_float_plane(plane: &Array2<f32>) -> FloatPlane {
    #[allow(clippy::cast_possible_truncation)]
    let (rows, cols) = (plane.nrows() as u32, plane.ncols() as u32);
    FloatPlane::from_fn(cols, rows, |x, y| Luma([plane[[y as usize, x as usize]]]))
}

/// Copies a luma buffer back into a `(rows, cols)` plane.
#[must_use]
pub fn from_float_plane(buffer: &FloatPlane) -> Array2<f32> {
    let (width, height) = buffer.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(r, c)| {
        #[allow(clippy::cast_possible_truncation)]
        let (x, y) = (c as u32, r as u32);
        buffer.get_pixel(x, y)[0]
    })
}

// ==========================================================================
// Gaussian Blur
// ==========================================================================

/// Gaussian blur of a single plane. A non-positive `sigma` returns a copy.
#[must_use]
pub fn gaussian_blur(plane: &Array2<f32>, sigma: f32) -> Array2<f32> {
    if sigma <= 0.0 || plane.is_empty() {
        return plane.clone();
    }
    from_float_plane(&gaussian_blur_f32(&to_float_plane(plane), sigma))
}

// ==========================================================================
// Resampling
// ==========================================================================

/// Per-output-sample source weights for area averaging along one axis.
fn area_weights(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f32)>> {
    #[allow(clippy::cast_precision_loss)]
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let start = i as f64 * scale;
            let end = start + scale;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let first = start.floor() as usize;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let last = (end.ceil() as usize).min(src_len);
            let mut taps: Vec<(usize, f32)> = (first..last)
                .filter_map(|j| {
                    #[allow(clippy::cast_precision_loss)]
                    let lo = (j as f64).max(start);
                    #[allow(clippy::cast_precision_loss)]
                    let hi = ((j + 1) as f64).min(end);
                    #[allow(clippy::cast_possible_truncation)]
                    let overlap = ((hi - lo) / scale) as f32;
                    (overlap > 0.0).then_some((j, overlap))
                })
                .collect();
            let total: f32 = taps.iter().map(|(_, w)| w).sum();
            for (_, weight) in &mut taps {
                *weight /= total;
            }
            taps
        })
        .collect()
}

/// Resizes a plane by averaging the source area covered by each output pixel.
///
/// `size` is `(rows, cols)`.
#[must_use]
pub fn resize_area(plane: &Array2<f32>, size: (usize, usize)) -> Array2<f32> {
    let (src_rows, src_cols) = plane.dim();
    let (dst_rows, dst_cols) = size;
    let col_taps = area_weights(src_cols, dst_cols);
    let row_taps = area_weights(src_rows, dst_rows);

    let mut horizontal = Array2::<f32>::zeros((src_rows, dst_cols));
    for r in 0..src_rows {
        for (c, taps) in col_taps.iter().enumerate() {
            horizontal[[r, c]] = taps.iter().map(|&(j, w)| w * plane[[r, j]]).sum();
        }
    }

    let mut out = Array2::<f32>::zeros((dst_rows, dst_cols));
    for (r, taps) in row_taps.iter().enumerate() {
        for c in 0..dst_cols {
            out[[r, c]] = taps.iter().map(|&(j, w)| w * horizontal[[j, c]]).sum();
        }
    }
    out
}

/// Resizes a plane with bilinear (triangle) interpolation.
///
/// `size` is `(rows, cols)`. The `image` resampler clamps float samples to
/// `[0, 1]`, so values are mapped into that range and back around the resize.
#[must_use]
pub fn resize_bilinear(plane: &Array2<f32>, size: (usize, usize)) -> Array2<f32> {
    let (lo, hi) = plane
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    if plane.is_empty() || span <= f32::EPSILON * hi.abs().max(1.0) {
        let fill = if plane.is_empty() { 0.0 } else { lo };
        return Array2::from_elem(size, fill);
    }

    let normalized = to_float_plane(&plane.mapv(|v| (v - lo) / span));
    #[allow(clippy::cast_possible_truncation)]
    let resized = imageops::resize(&normalized, size.1 as u32, size.0 as u32, FilterType::Triangle);
    from_float_plane(&resized).mapv(|v| v * span + lo)
}

// ==========================================================================
// Bilateral Filter
// ==========================================================================

/// Edge-preserving bilateral filter on an RGB image.
///
/// Neighbors within a disc of `diameter / 2` pixels are weighted by spatial
/// distance (`sigma_space`) and by the L1 color distance to the center pixel
/// (`sigma_color`), so strong edges are not averaged across.
#[must_use]
pub fn bilateral_filter(
    image: &RasterImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> RasterImage {
    #[allow(clippy::cast_possible_wrap)]
    let radius = (diameter / 2).max(1) as isize;
    let width = image.width() as usize;
    let height = image.height() as usize;
    let src = image.rgb_bytes();

    // Disc of offsets with precomputed spatial weights
    let space_denom = 2.0 * sigma_space * sigma_space;
    let mut offsets: Vec<(isize, isize, f32)> = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let dist_sq = dy * dy + dx * dx;
            if dist_sq > radius * radius {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let weight = (-(dist_sq as f32) / space_denom).exp();
            offsets.push((dy, dx, weight));
        }
    }

    // Color weights indexed by summed absolute channel difference
    let color_denom = 2.0 * sigma_color * sigma_color;
    let color_weights: Vec<f32> = (0..=3 * 255)
        .map(|d| {
            #[allow(clippy::cast_precision_loss)]
            let d = d as f32;
            (-(d * d) / color_denom).exp()
        })
        .collect();

    let mut out = Vec::with_capacity(src.len());
    for y in 0..height {
        for x in 0..width {
            let center = (y * width + x) * 3;
            let (cr, cg, cb) = (src[center], src[center + 1], src[center + 2]);

            let mut sum = [0.0f32; 3];
            let mut weight_sum = 0.0f32;
            for &(dy, dx, space_weight) in &offsets {
                #[allow(clippy::cast_possible_wrap)]
                let ny = reflect_101(y as isize + dy, height);
                #[allow(clippy::cast_possible_wrap)]
                let nx = reflect_101(x as isize + dx, width);
                let idx = (ny * width + nx) * 3;
                let (nr, ng, nb) = (src[idx], src[idx + 1], src[idx + 2]);

                let diff = usize::from(nr.abs_diff(cr))
                    + usize::from(ng.abs_diff(cg))
                    + usize::from(nb.abs_diff(cb));
                let weight = space_weight * color_weights[diff];

                sum[0] += weight * f32::from(nr);
                sum[1] += weight * f32::from(ng);
                sum[2] += weight * f32::from(nb);
                weight_sum += weight;
            }

            for channel in sum {
                out.push(saturate_u8(channel / weight_sum));
            }
        }
    }

    image.with_rgb_bytes(out)
}
