//! Profile photo preparation.

use std::borrow::Cow;
use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use tracing::{debug, warn};

use crate::render::Block;

/// Largest edge of the embedded thumbnail, in pixels.
const MAX_EDGE_PX: u32 = 150;

/// Decodes an uploaded JPEG/PNG, shrinks it to fit `MAX_EDGE_PX`, and re-encodes
/// it as PNG. Returns `None` (and logs) when the bytes cannot be decoded.
pub fn prepare(bytes: &[u8], width_mm: f32) -> Option<Block> {
    match thumbnail_png(bytes) {
        Ok(data) => {
            debug!(bytes = data.len(), "Prepared profile photo");
            Some(Block::Image { data, width_mm })
        }
        Err(e) => {
            warn!("Skipping profile photo that could not be decoded: {e}");
            None
        }
    }
}

fn thumbnail_png(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    // `thumbnail` also enlarges, so only call it on oversized images.
    let img = if img.width() > MAX_EDGE_PX || img.height() > MAX_EDGE_PX {
        img.thumbnail(MAX_EDGE_PX, MAX_EDGE_PX)
    } else {
        img
    };
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

/// Pixel dimensions of an encoded image, without decoding the pixel data.
pub fn dimensions(bytes: &[u8]) -> Result<(u32, u32), image::ImageError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}

/// PNG bytes and pixel size for `bytes`, transcoding other formats to PNG.
pub fn as_png(bytes: &[u8]) -> Result<(Cow<'_, [u8]>, u32, u32), image::ImageError> {
    if image::guess_format(bytes)? == ImageFormat::Png {
        let (w, h) = dimensions(bytes)?;
        return Ok((Cow::Borrowed(bytes), w, h));
    }
    let img = image::load_from_memory(bytes)?;
    let (w, h) = (img.width(), img.height());
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok((Cow::Owned(out), w, h))
}

/// Solid-color PNG used by tests across the crate.
#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}
