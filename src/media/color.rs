// SPDX-License-Identifier: MPL-2.0
//! Color-space conversions between 8-bit RGB, CIE L*a*b* and HSV.
//!
//! L*a*b* uses the D65 white point, so `L` spans `0..=100` and `a`/`b` are
//! roughly `-128..=127`. Pixels are decoded with the transfer curve of the
//! image's [`ColorEncoding`] and written back with the same one. Planes are stored as
//! `ndarray` arrays indexed `(row, column)`.

use ndarray::Array2;
use palette::{FromColor, Hsv, Lab, LinSrgb, Srgb};

use crate::domain::media::{ColorEncoding, RasterImage};

/// Scale from L (0..=100) to the 8-bit lightness range (0..=255).
pub const L_TO_U8: f32 = 255.0 / 100.0;

/// Offset applied to a/b when stored in 8-bit form.
pub const AB_U8_OFFSET: f32 = 128.0;

/// Floating-point L*a*b* planes of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct LabPlanes {
    /// Lightness, `0..=100`.
    pub l: Array2<f32>,
    /// Green–red axis.
    pub a: Array2<f32>,
    /// Blue–yellow axis.
    pub b: Array2<f32>,
}

impl LabPlanes {
    /// Returns `(rows, cols)`.
    #[must_use]
    pub fn dim(&self) -> (usize, usize) {
        self.l.dim()
    }

    /// Mean of `sqrt(a² + b²)` over all pixels.
    #[must_use]
    pub fn mean_chroma(&self) -> f32 {
        let count = self.a.len().max(1) as f32;
        let sum: f32 = self
            .a
            .iter()
            .zip(self.b.iter())
            .map(|(a, b)| a.hypot(*b))
            .sum();
        sum / count
    }
}

#[inline]
fn to_unit(value: u8) -> f32 {
    f32::from(value) / 255.0
}

/// Clips a unit-range value and quantizes it to 8 bits.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantize_unit(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Clips a 0..=255 value and rounds it to `u8`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn saturate_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Converts one 8-bit sRGB pixel to L*a*b*.
#[must_use]
pub fn srgb8_to_lab([r, g, b]: [u8; 3]) -> Lab {
    let srgb: Srgb<f32> = Srgb::new(to_unit(r), to_unit(g), to_unit(b));
    let lin: LinSrgb<f32> = srgb.into_linear();
    Lab::from_color(lin)
}

/// Converts one L*a*b* color to 8-bit sRGB, clipping out-of-gamut values.
#[must_use]
pub fn lab_to_srgb8(lab: Lab) -> [u8; 3] {
    let lin = LinSrgb::from_color(lab);
    let srgb: Srgb<f32> = Srgb::from_linear(lin);
    [
        quantize_unit(srgb.red),
        quantize_unit(srgb.green),
        quantize_unit(srgb.blue),
    ]
}

/// Converts one 8-bit linear-light pixel to L*a*b*.
#[must_use]
pub fn linear8_to_lab([r, g, b]: [u8; 3]) -> Lab {
    Lab::from_color(LinSrgb::new(to_unit(r), to_unit(g), to_unit(b)))
}

/// Converts one L*a*b* color to 8-bit linear light, clipping out-of-gamut values.
#[must_use]
pub fn lab_to_linear8(lab: Lab) -> [u8; 3] {
    let lin = LinSrgb::from_color(lab);
    [quantize_unit(lin.red), quantize_unit(lin.green), quantize_unit(lin.blue)]
}

fn pixel_to_lab(pixel: [u8; 3], encoding: ColorEncoding) -> Lab {
    match encoding {
        ColorEncoding::Srgb => srgb8_to_lab(pixel),
        ColorEncoding::LinearSrgb => linear8_to_lab(pixel),
    }
}

fn lab_to_pixel(lab: Lab, encoding: ColorEncoding) -> [u8; 3] {
    match encoding {
        ColorEncoding::Srgb => lab_to_srgb8(lab),
        ColorEncoding::LinearSrgb => lab_to_linear8(lab),
    }
}

/// Re-encodes the stored values with another transfer curve.
#[must_use]
pub fn convert_encoding(image: &RasterImage, target: ColorEncoding) -> RasterImage {
    match (image.encoding(), target) {
        (from, to) if from == to => image.clone(),
        (ColorEncoding::LinearSrgb, _) => image
            .map_pixels(|[r, g, b]| {
                let srgb: Srgb<f32> = Srgb::from_linear(LinSrgb::new(to_unit(r), to_unit(g), to_unit(b)));
                [quantize_unit(srgb.red), quantize_unit(srgb.green), quantize_unit(srgb.blue)]
            })
            .with_encoding(target),
        (ColorEncoding::Srgb, _) => image
            .map_pixels(|[r, g, b]| {
                let lin: LinSrgb<f32> = Srgb::new(to_unit(r), to_unit(g), to_unit(b)).into_linear();
                [quantize_unit(lin.red), quantize_unit(lin.green), quantize_unit(lin.blue)]
            })
            .with_encoding(target),
    }
}

/// Splits an image into L*a*b* planes.
#[must_use]
pub fn rgb_to_lab(image: &RasterImage) -> LabPlanes {
    let rows = image.height() as usize;
    let cols = image.width() as usize;
    let mut l = Array2::<f32>::zeros((rows, cols));
    let mut a = Array2::<f32>::zeros((rows, cols));
    let mut b = Array2::<f32>::zeros((rows, cols));

    let encoding = image.encoding();
    for (idx, pixel) in image.pixels().enumerate() {
        let lab = pixel_to_lab(pixel, encoding);
        let pos = (idx / cols, idx % cols);
        l[pos] = lab.l;
        a[pos] = lab.a;
        b[pos] = lab.b;
    }

    LabPlanes { l, a, b }
}

/// Recombines L*a*b* planes into an image with the size and encoding of `like`.
///
/// # Panics
///
/// Panics if the planes do not match the dimensions of `like`.
#[must_use]
pub fn lab_to_rgb(planes: &LabPlanes, like: &RasterImage) -> RasterImage {
    assert_eq!(
        planes.dim(),
        (like.height() as usize, like.width() as usize),
        "L*a*b* planes do not match target dimensions"
    );
    let encoding = like.encoding();
    let mut rgb = Vec::with_capacity(like.pixel_count() * RasterImage::CHANNELS);
    for ((l, a), b) in planes.l.iter().zip(planes.a.iter()).zip(planes.b.iter()) {
        rgb.extend_from_slice(&lab_to_pixel(Lab::new(*l, *a, *b), encoding));
    }
    like.with_rgb_bytes(rgb)
}

/// Converts lightness to the 8-bit `0..=255` scale.
#[must_use]
pub fn lightness_to_u8(l: &Array2<f32>) -> Array2<u8> {
    l.mapv(|value| saturate_u8(value * L_TO_U8))
}

/// Converts 8-bit lightness back to `0..=100`.
#[must_use]
pub fn lightness_from_u8(l: &Array2<u8>) -> Array2<f32> {
    l.mapv(|value| f32::from(value) / L_TO_U8)
}

/// Multiplies HSV saturation of every pixel by `factor`.
///
/// The factor is floored at zero and the result is clamped to the channel
/// maximum, so `0.0` yields a fully neutral image.
#[must_use]
pub fn scale_saturation(image: &RasterImage, factor: f32) -> RasterImage {
    let factor = factor.max(0.0);
    image.map_pixels(|[r, g, b]| {
        let srgb: Srgb<f32> = Srgb::new(to_unit(r), to_unit(g), to_unit(b));
        let mut hsv: Hsv = Hsv::from_color(srgb);
        hsv.saturation = (hsv.saturation * factor).clamp(0.0, 1.0);
        let out = Srgb::from_color(hsv);
        [
            quantize_unit(out.red),
            quantize_unit(out.green),
            quantize_unit(out.blue),
        ]
    })
}
