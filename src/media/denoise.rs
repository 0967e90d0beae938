// SPDX-License-Identifier: MPL-2.0
//! Non-local means denoising.
//!
//! Every pixel is replaced by a weighted average of the pixels in its search
//! window, weighted by how similar their surrounding patches are. Patch
//! distances for one search offset are computed for the whole image at once
//! and box-summed with an integral image, so the cost per offset is linear in
//! the pixel count regardless of the patch size.

use ndarray::Array2;

use crate::domain::media::RasterImage;
use crate::media::color::{
    lab_to_rgb, lightness_from_u8, lightness_to_u8, rgb_to_lab, saturate_u8, LabPlanes, AB_U8_OFFSET,
};
use crate::media::filter::reflect_101;

/// Neighbors whose weight falls below this are ignored.
const WEIGHT_THRESHOLD: f32 = 1e-3;

/// Filter strengths and window sizes for [`nl_means`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NlMeansParams {
    /// Filter strength. Larger values remove more noise and more detail.
    pub h: f32,
    /// Side of the square patch compared between pixels (odd).
    pub template_window: usize,
    /// Side of the square area searched for similar patches (odd).
    pub search_window: usize,
}

/// Denoises one or more 8-bit planes jointly.
///
/// All planes must share the same dimensions. Patch distances are summed over
/// the planes, so they receive identical weights; use separate calls to
/// filter channels independently.
///
/// # Panics
///
/// Panics if the planes have differing dimensions.
#[must_use]
pub fn nl_means(channels: &[&Array2<u8>], params: NlMeansParams) -> Vec<Array2<u8>> {
    let Some(first) = channels.first() else {
        return Vec::new();
    };
    let (rows, cols) = first.dim();
    assert!(
        channels.iter().all(|plane| plane.dim() == (rows, cols)),
        "planes must share dimensions"
    );
    if params.h <= 0.0 || rows == 0 || cols == 0 {
        return channels.iter().map(|plane| (*plane).clone()).collect();
    }

    let cn = channels.len();
    let tr = params.template_window / 2;
    let sr = params.search_window / 2;
    let pad = tr + sr;
    let padded_cols = cols + 2 * pad;
    let padded_rows = rows + 2 * pad;

    // Interleaved copy with mirrored borders
    let mut padded = vec![0i32; padded_rows * padded_cols * cn];
    for pr in 0..padded_rows {
        #[allow(clippy::cast_possible_wrap)]
        let src_r = reflect_101(pr as isize - pad as isize, rows);
        for pc in 0..padded_cols {
            #[allow(clippy::cast_possible_wrap)]
            let src_c = reflect_101(pc as isize - pad as isize, cols);
            let base = (pr * padded_cols + pc) * cn;
            for (ch, plane) in channels.iter().enumerate() {
                padded[base + ch] = i32::from(plane[[src_r, src_c]]);
            }
        }
    }

    let template_side = 2 * tr + 1;
    #[allow(clippy::cast_precision_loss)]
    let template_area = (template_side * template_side) as f32;
    #[allow(clippy::cast_precision_loss)]
    let h2cn = params.h * params.h * cn as f32;

    // Weight for every patch distance that survives the threshold
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_box = (template_area * h2cn * WEIGHT_THRESHOLD.recip().ln()).floor() as u64;
    let weights: Vec<f32> = (0..=max_box)
        .map(|ssd| {
            #[allow(clippy::cast_precision_loss)]
            let dist = ssd as f32 / template_area;
            (-dist / h2cn).exp()
        })
        .collect();

    // Distance domain covers every patch center plus the template radius
    let domain_rows = rows + 2 * tr;
    let domain_cols = cols + 2 * tr;
    let stride = domain_cols + 1;
    let mut integral = vec![0u64; (domain_rows + 1) * stride];

    let mut acc = vec![0.0f32; rows * cols * cn];
    let mut weight_sum = vec![0.0f32; rows * cols];

    #[allow(clippy::cast_possible_wrap)]
    let radius = sr as isize;
    for oy in -radius..=radius {
        for ox in -radius..=radius {
            #[allow(clippy::cast_sign_loss)]
            let shift_r = (radius + oy) as usize;
            #[allow(clippy::cast_sign_loss)]
            let shift_c = (radius + ox) as usize;

            for dr in 0..domain_rows {
                let mut row_acc = 0u64;
                let a_row = (dr + sr) * padded_cols;
                let b_row = (dr + shift_r) * padded_cols;
                for dc in 0..domain_cols {
                    let a = (a_row + dc + sr) * cn;
                    let b = (b_row + dc + shift_c) * cn;
                    let mut ssd = 0u64;
                    for ch in 0..cn {
                        let diff = padded[a + ch] - padded[b + ch];
                        #[allow(clippy::cast_sign_loss)]
                        let sq = (diff * diff) as u64;
                        ssd += sq;
                    }
                    row_acc += ssd;
                    integral[(dr + 1) * stride + dc + 1] = integral[dr * stride + dc + 1] + row_acc;
                }
            }

            for r in 0..rows {
                let top = r * stride;
                let bottom = (r + template_side) * stride;
                let neighbor_row = (r + tr + shift_r) * padded_cols;
                for c in 0..cols {
                    let box_ssd = integral[bottom + c + template_side] + integral[top + c]
                        - integral[top + c + template_side]
                        - integral[bottom + c];
                    if box_ssd > max_box {
                        continue;
                    }
                    #[allow(clippy::cast_possible_truncation)]
                    let weight = weights[box_ssd as usize];
                    let pixel = r * cols + c;
                    let neighbor = (neighbor_row + c + tr + shift_c) * cn;
                    for ch in 0..cn {
                        #[allow(clippy::cast_precision_loss)]
                        let value = padded[neighbor + ch] as f32;
                        acc[pixel * cn + ch] += weight * value;
                    }
                    weight_sum[pixel] += weight;
                }
            }
        }
    }

    (0..cn)
        .map(|ch| {
            Array2::from_shape_fn((rows, cols), |(r, c)| {
                let pixel = r * cols + c;
                saturate_u8(acc[pixel * cn + ch] / weight_sum[pixel])
            })
        })
        .collect()
}

/// Denoises a color image in L*a*b*.
///
/// Lightness is filtered with `h_luma`; the two chroma planes are filtered
/// together with `h_color`.
#[must_use]
pub fn denoise_colored(
    image: &RasterImage,
    h_luma: f32,
    h_color: f32,
    template_window: usize,
    search_window: usize,
) -> RasterImage {
    let lab = rgb_to_lab(image);
    let l8 = lightness_to_u8(&lab.l);
    let a8 = lab.a.mapv(|value| saturate_u8(value + AB_U8_OFFSET));
    let b8 = lab.b.mapv(|value| saturate_u8(value + AB_U8_OFFSET));

    let luma = nl_means(
        &[&l8],
        NlMeansParams {
            h: h_luma,
            template_window,
            search_window,
        },
    );
    let chroma = nl_means(
        &[&a8, &b8],
        NlMeansParams {
            h: h_color,
            template_window,
            search_window,
        },
    );

    let from_ab = |plane: &Array2<u8>| plane.mapv(|value| f32::from(value) - AB_U8_OFFSET);
    let planes = LabPlanes {
        l: lightness_from_u8(&luma[0]),
        a: from_ab(&chroma[0]),
        b: from_ab(&chroma[1]),
    };
    lab_to_rgb(&planes, image)
}
