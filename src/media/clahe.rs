// SPDX-License-Identifier: MPL-2.0
//! Contrast-limited adaptive histogram equalization on an 8-bit plane.
//!
//! The plane is split into a grid of tiles. Each tile gets its own clipped
//! histogram and equalization table; every pixel is then mapped by bilinear
//! interpolation between the tables of the four nearest tile centers, which
//! avoids visible tile seams.

use ndarray::Array2;

use crate::media::color::saturate_u8;
use crate::media::filter::reflect_101;

const BINS: usize = 256;

/// Builds the equalization table for one tile histogram.
fn tile_lut(hist: &mut [u32; BINS], tile_area: u32, clip_limit: f32) -> [u8; BINS] {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let limit = ((clip_limit * tile_area as f32 / BINS as f32) as u32).max(1);

    let mut excess = 0u32;
    for count in hist.iter_mut() {
        if *count > limit {
            excess += *count - limit;
            *count = limit;
        }
    }

    // Spread clipped counts evenly, then hand out the remainder at a fixed stride
    #[allow(clippy::cast_possible_truncation)]
    let batch = excess / BINS as u32;
    #[allow(clippy::cast_possible_truncation)]
    let residual = (excess % BINS as u32) as usize;
    for count in hist.iter_mut() {
        *count += batch;
    }
    if residual > 0 {
        let step = (BINS / residual).max(1);
        for count in hist.iter_mut().step_by(step).take(residual) {
            *count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let scale = 255.0 / tile_area as f32;
    let mut lut = [0u8; BINS];
    let mut cumulative = 0u32;
    for (entry, count) in lut.iter_mut().zip(hist.iter()) {
        cumulative += count;
        #[allow(clippy::cast_precision_loss)]
        let value = cumulative as f32 * scale;
        *entry = saturate_u8(value);
    }
    lut
}

/// Interpolation neighbors and weight for one axis position.
fn axis_taps(len: usize, tile: usize, tiles: usize) -> Vec<(usize, usize, f32)> {
    (0..len)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let pos = i as f32 / tile as f32 - 0.5;
            let lower = pos.floor();
            let frac = pos - lower;
            #[allow(clippy::cast_possible_truncation)]
            let lower = lower as isize;
            #[allow(clippy::cast_possible_wrap)]
            let last = tiles as isize - 1;
            #[allow(clippy::cast_sign_loss)]
            let t1 = lower.clamp(0, last) as usize;
            #[allow(clippy::cast_sign_loss)]
            let t2 = (lower + 1).clamp(0, last) as usize;
            (t1, t2, frac)
        })
        .collect()
}

/// Applies CLAHE to an 8-bit plane.
///
/// `clip_limit` is expressed relative to a uniform histogram (OpenCV
/// convention); `grid` is the number of tiles along each axis. The grid is
/// reduced for planes smaller than it, and partial tiles at the border are
/// filled by mirror reflection.
#[must_use]
pub fn clahe(plane: &Array2<u8>, clip_limit: f32, grid: usize) -> Array2<u8> {
    let (rows, cols) = plane.dim();
    if rows == 0 || cols == 0 {
        return plane.clone();
    }
    let tiles_y = grid.clamp(1, rows);
    let tiles_x = grid.clamp(1, cols);
    let tile_h = rows.div_ceil(tiles_y);
    let tile_w = cols.div_ceil(tiles_x);
    #[allow(clippy::cast_possible_truncation)]
    let tile_area = (tile_h * tile_w) as u32;

    let mut luts = Vec::with_capacity(tiles_y * tiles_x);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0u32; BINS];
            for r in ty * tile_h..(ty + 1) * tile_h {
                #[allow(clippy::cast_possible_wrap)]
                let sr = reflect_101(r as isize, rows);
                for c in tx * tile_w..(tx + 1) * tile_w {
                    #[allow(clippy::cast_possible_wrap)]
                    let sc = reflect_101(c as isize, cols);
                    hist[usize::from(plane[[sr, sc]])] += 1;
                }
            }
            luts.push(tile_lut(&mut hist, tile_area, clip_limit));
        }
    }

    let row_taps = axis_taps(rows, tile_h, tiles_y);
    let col_taps = axis_taps(cols, tile_w, tiles_x);

    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let (ty1, ty2, fy) = row_taps[r];
        let (tx1, tx2, fx) = col_taps[c];
        let v = usize::from(plane[[r, c]]);
        let lut = |ty: usize, tx: usize| f32::from(luts[ty * tiles_x + tx][v]);

        let top = lut(ty1, tx1) * (1.0 - fx) + lut(ty1, tx2) * fx;
        let bottom = lut(ty2, tx1) * (1.0 - fx) + lut(ty2, tx2) * fx;
        saturate_u8(top * (1.0 - fy) + bottom * fy)
    })
}
