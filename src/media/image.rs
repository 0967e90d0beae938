// SPDX-License-Identifier: MPL-2.0
//! Image decoding and JPEG encoding.
//!
//! Everything is normalized to 8-bit sRGB on load: alpha is dropped, 16-bit
//! and grayscale sources are converted. JPEG output is always sRGB.

use crate::domain::media::{ColorEncoding, RasterImage};
use crate::media::color::convert_encoding;
use crate::error::{Error, Result};
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::{ImageReader, RgbImage};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Decodes the image at `path` into an 8-bit RGB raster.
///
/// The format is detected from the file contents, not the extension.
///
/// # Errors
///
/// Returns [`Error::InvalidImage`] if the file cannot be read, its format is
/// not recognized, or decoding fails.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RasterImage> {
    let path = path.as_ref();
    let invalid = |reason: String| Error::InvalidImage(format!("{}: {reason}", path.display()));

    let bytes = fs::read(path).map_err(|e| invalid(e.to_string()))?;
    let reader = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| invalid(e.to_string()))?;
    if reader.format().is_none() {
        return Err(invalid("unrecognized image format".into()));
    }
    let decoded = reader.decode().map_err(|e| invalid(e.to_string()))?;

    from_rgb_image(decoded.to_rgb8())
}

/// Wraps an `image` buffer as an sRGB [`RasterImage`].
///
/// # Errors
///
/// Returns [`Error::InvalidImage`] for zero-sized buffers.
pub fn from_rgb_image(buffer: RgbImage) -> Result<RasterImage> {
    let (width, height) = buffer.dimensions();
    Ok(RasterImage::new(width, height, buffer.into_raw())?.with_encoding(ColorEncoding::Srgb))
}

/// Copies a [`RasterImage`] into an `image` buffer.
#[must_use]
pub fn to_rgb_image(image: &RasterImage) -> RgbImage {
    let mut buffer = RgbImage::new(image.width(), image.height());
    buffer.copy_from_slice(image.rgb_bytes());
    buffer
}

/// Encodes `image` as a baseline JPEG at `path`, converting it to sRGB first.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be created or encoding fails.
pub fn save_jpeg(image: &RasterImage, path: &Path, quality: u8) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    let srgb = convert_encoding(image, ColorEncoding::Srgb);
    to_rgb_image(&srgb).write_with_encoder(encoder)?;
    writer.flush()?;
    Ok(())
}
