//! HEIC/HEIF decoder backed by libheif.
//!
//! Only the primary image of a container is decoded; auxiliary sub-images
//! (thumbnails, live-photo variants) are ignored.

use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
use crate::processing::buffer::PixelBuffer;
use crate::utils::error::DecodeError;

/// Reads the primary image dimensions without decoding pixel data.
pub fn peek_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let ctx = HeifContext::read_from_bytes(bytes)
        .map_err(|e| DecodeError::Codec(e.to_string()))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| DecodeError::Codec(e.to_string()))?;
    Ok((handle.width(), handle.height()))
}

/// Decodes the primary image to an RGBA8 buffer.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let lib_heif = LibHeif::new();

    let ctx = HeifContext::read_from_bytes(bytes)
        .map_err(|e| DecodeError::Codec(e.to_string()))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| DecodeError::Codec(e.to_string()))?;

    let width = handle.width();
    let height = handle.height();

    let image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
        .map_err(|e| DecodeError::Codec(e.to_string()))?;

    let planes = image.planes();
    let interleaved = planes
        .interleaved
        .ok_or_else(|| DecodeError::Codec("HEIF decode returned no interleaved plane".into()))?;

    // Rows may be padded; copy exactly width*4 bytes per row.
    let stride = interleaved.stride;
    let row_bytes = width as usize * 4;
    let mut rgba = Vec::with_capacity(row_bytes * height as usize);
    for y in 0..height as usize {
        let start = y * stride;
        rgba.extend_from_slice(&interleaved.data[start..start + row_bytes]);
    }

    PixelBuffer::new(width, height, rgba).ok_or(DecodeError::ZeroDimension)
}
