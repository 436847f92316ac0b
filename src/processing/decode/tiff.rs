//! Dedicated TIFF decoder.
//!
//! Decodes the first IFD (page) only; additional pages are ignored. Sample
//! layouts outside 8/16-bit gray/gray-alpha/RGB/RGBA, and compression schemes
//! the underlying codec does not know, surface as unsupported-variant errors.

use std::io::Cursor;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::{ColorType, TiffError};
use crate::processing::buffer::PixelBuffer;
use crate::utils::error::DecodeError;

fn map_tiff_error(err: TiffError) -> DecodeError {
    match err {
        TiffError::UnsupportedError(e) => DecodeError::UnsupportedVariant(e.to_string()),
        TiffError::LimitsExceeded => DecodeError::Codec("TIFF decoding limits exceeded".into()),
        other => DecodeError::Codec(other.to_string()),
    }
}

/// Reads the first page's dimensions without decoding pixel data.
pub fn peek_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let mut decoder = Decoder::new(Cursor::new(bytes)).map_err(map_tiff_error)?;
    decoder.dimensions().map_err(map_tiff_error)
}

/// Decodes the first page to an RGBA8 buffer.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let mut decoder = Decoder::new(Cursor::new(bytes)).map_err(map_tiff_error)?;

    let (width, height) = decoder.dimensions().map_err(map_tiff_error)?;
    let color = decoder.colortype().map_err(map_tiff_error)?;
    let result = decoder.read_image().map_err(map_tiff_error)?;

    let rgba = expand_to_rgba(result, color)?;

    PixelBuffer::new(width, height, rgba).ok_or(DecodeError::ZeroDimension)
}

/// Expands decoded samples to interleaved RGBA8.
fn expand_to_rgba(result: DecodingResult, color: ColorType) -> Result<Vec<u8>, DecodeError> {
    match (result, color) {
        (DecodingResult::U8(data), ColorType::RGBA(8)) => Ok(data),
        (DecodingResult::U8(data), ColorType::RGB(8)) => Ok(rgb_to_rgba(&data)),
        (DecodingResult::U8(data), ColorType::GrayA(8)) => Ok(graya_to_rgba(&data)),
        (DecodingResult::U8(data), ColorType::Gray(8)) => Ok(gray_to_rgba(&data)),
        (DecodingResult::U16(data), ColorType::RGBA(16)) => Ok(downshift(&data)),
        (DecodingResult::U16(data), ColorType::RGB(16)) => Ok(rgb_to_rgba(&downshift(&data))),
        (DecodingResult::U16(data), ColorType::GrayA(16)) => Ok(graya_to_rgba(&downshift(&data))),
        (DecodingResult::U16(data), ColorType::Gray(16)) => Ok(gray_to_rgba(&downshift(&data))),
        (_, color) => Err(DecodeError::UnsupportedVariant(format!(
            "TIFF sample layout {:?} is not supported",
            color
        ))),
    }
}

fn downshift(data: &[u16]) -> Vec<u8> {
    data.iter().map(|&v| (v >> 8) as u8).collect()
}

fn rgb_to_rgba(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 3 * 4);
    for px in data.chunks_exact(3) {
        out.extend_from_slice(px);
        out.push(255);
    }
    out
}

fn gray_to_rgba(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 4);
    for &v in data {
        out.extend_from_slice(&[v, v, v, 255]);
    }
    out
}

fn graya_to_rgba(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    for px in data.chunks_exact(2) {
        out.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
    }
    out
}
