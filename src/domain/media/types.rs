// SPDX-License-Identifier: MPL-2.0
//! Core raster type for the domain layer.
//!
//! These types represent pure pixel data without any codec dependencies.

use crate::error::{Error, Result};

/// Transfer curve the stored 8-bit channel values are encoded with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ColorEncoding {
    /// Device sRGB with the standard transfer curve, as decoded from files.
    #[default]
    Srgb,
    /// Linear-light sRGB primaries.
    LinearSrgb,
}

/// Owned 8-bit RGB image, three interleaved channels per pixel, with a
/// declared [`ColorEncoding`].
///
/// Dimensions and encoding are fixed at construction. Transforms never mutate a
/// `RasterImage` in place across color-space boundaries; they build a new one.
///
/// # Example
///
/// ```
/// use photo_variants::domain::media::RasterImage;
///
/// let image = RasterImage::filled(4, 3, [128, 128, 128]).unwrap();
/// assert_eq!(image.width(), 4);
/// assert_eq!(image.pixel(3, 2), [128, 128, 128]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    encoding: ColorEncoding,
    /// RGB pixel data (3 bytes per pixel, row-major).
    rgb: Vec<u8>,
}

impl RasterImage {
    /// Number of interleaved channels.
    pub const CHANNELS: usize = 3;

    /// Creates a new sRGB `RasterImage` from dimensions and RGB pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if either dimension is zero or the
    /// buffer length is not `width * height * 3`.
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!(
                "image has empty dimensions {width}x{height}"
            )));
        }
        let expected_len = (width as usize) * (height as usize) * Self::CHANNELS;
        if rgb.len() != expected_len {
            return Err(Error::InvalidImage(format!(
                "RGB data length mismatch: expected {expected_len}, got {}",
                rgb.len()
            )));
        }
        Ok(Self {
            width,
            height,
            encoding: ColorEncoding::Srgb,
            rgb,
        })
    }

    /// Declares the encoding of the stored values without converting them.
    #[must_use]
    pub fn with_encoding(mut self, encoding: ColorEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Creates an image where every pixel has the same color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if either dimension is zero.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Result<Self> {
        let pixels = (width as usize) * (height as usize);
        let rgb = color.iter().copied().cycle().take(pixels * Self::CHANNELS).collect();
        Self::new(width, height, rgb)
    }

    /// Creates an image by evaluating `f(x, y)` for every pixel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if either dimension is zero.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Result<Self> {
        let mut rgb = Vec::with_capacity((width as usize) * (height as usize) * Self::CHANNELS);
        for y in 0..height {
            for x in 0..width {
                rgb.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, rgb)
    }

    /// Returns the image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the declared color encoding.
    #[must_use]
    pub fn encoding(&self) -> ColorEncoding {
        self.encoding
    }

    /// Returns the total number of pixels.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns a reference to the interleaved RGB bytes.
    #[must_use]
    pub fn rgb_bytes(&self) -> &[u8] {
        &self.rgb
    }

    /// Returns the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let idx = ((y as usize) * (self.width as usize) + x as usize) * Self::CHANNELS;
        [self.rgb[idx], self.rgb[idx + 1], self.rgb[idx + 2]]
    }

    /// Iterates over pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.rgb.chunks_exact(Self::CHANNELS).map(|p| [p[0], p[1], p[2]])
    }

    /// Builds a new image of the same size and encoding from interleaved RGB bytes.
    ///
    /// # Panics
    ///
    /// Panics if the pixel data length doesn't match this image's size.
    #[must_use]
    pub fn with_rgb_bytes(&self, rgb: Vec<u8>) -> Self {
        assert_eq!(
            rgb.len(),
            self.rgb.len(),
            "RGB data length mismatch: expected {}, got {}",
            self.rgb.len(),
            rgb.len()
        );
        Self {
            width: self.width,
            height: self.height,
            encoding: self.encoding,
            rgb,
        }
    }

    /// Builds a new image of the same size by mapping every pixel.
    #[must_use]
    pub fn map_pixels(&self, mut f: impl FnMut([u8; 3]) -> [u8; 3]) -> Self {
        let rgb = self.pixels().flat_map(|p| f(p)).collect();
        Self {
            width: self.width,
            height: self.height,
            encoding: self.encoding,
            rgb,
        }
    }
}
