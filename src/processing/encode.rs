//! Format-specific encoders.
//!
//! One arm per output format, exhaustively matched. Quality (0,1] maps
//! linearly to the codec's 1-100 scale for lossy formats and is ignored for
//! lossless ones. HEIC/HEIF requests delegate to the PNG arm; the pipeline
//! reports PNG as the effective format for them.

use std::io::Cursor;
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tiff::encoder::{colortype, TiffEncoder};
use crate::processing::buffer::PixelBuffer;
use crate::utils::error::EncodeError;
use crate::utils::formats::OutputFormat;

/// Encodes `buffer` into the effective encoding of `format`.
pub fn encode(
    buffer: &PixelBuffer,
    format: OutputFormat,
    quality: f32,
) -> Result<Vec<u8>, EncodeError> {
    if buffer.data().is_empty() {
        return Err(EncodeError::EmptyBuffer);
    }

    match format.effective() {
        OutputFormat::Jpg => encode_jpeg(buffer, quality),
        OutputFormat::Png => encode_png(buffer),
        OutputFormat::Webp => encode_webp(buffer, quality),
        OutputFormat::Bmp => encode_bmp(buffer),
        OutputFormat::Tiff => encode_tiff(buffer),
        OutputFormat::Heic | OutputFormat::Heif => {
            unreachable!("effective() substitutes PNG for HEIC/HEIF")
        }
    }
}

/// Maps quality in (0,1] to the 1-100 codec scale.
fn quality_scale(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// JPEG: lossy; alpha was already flattened to white by the rasterizer, so
/// the channel is simply dropped here.
fn encode_jpeg(buffer: &PixelBuffer, quality: f32) -> Result<Vec<u8>, EncodeError> {
    let rgb = drop_alpha(buffer.data());
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality_scale(quality))
        .write_image(
            &rgb,
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| EncodeError::Codec(format!("JPEG encode failed: {}", e)))?;
    Ok(out.into_inner())
}

/// PNG: lossless, quality ignored.
fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out)
        .write_image(
            buffer.data(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::Codec(format!("PNG encode failed: {}", e)))?;
    Ok(out.into_inner())
}

/// WEBP: lossy, quality passed through on the 0-100 scale.
fn encode_webp(buffer: &PixelBuffer, quality: f32) -> Result<Vec<u8>, EncodeError> {
    let encoder = webp::Encoder::from_rgba(buffer.data(), buffer.width(), buffer.height());
    let encoded = encoder.encode(quality_scale(quality) as f32);
    if encoded.is_empty() {
        return Err(EncodeError::Codec("WEBP encoder returned no output".into()));
    }
    Ok(encoded.to_vec())
}

/// BMP: lossless; stored without alpha (flattened upstream).
fn encode_bmp(buffer: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    let rgb = drop_alpha(buffer.data());
    let mut out = Cursor::new(Vec::new());
    BmpEncoder::new(&mut out)
        .write_image(
            &rgb,
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| EncodeError::Codec(format!("BMP encode failed: {}", e)))?;
    Ok(out.into_inner())
}

/// TIFF: written straight from the RGBA8 buffer with the codec-default
/// writer; quality ignored.
fn encode_tiff(buffer: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    let mut out = Cursor::new(Vec::new());
    let mut encoder = TiffEncoder::new(&mut out)
        .map_err(|e| EncodeError::Codec(format!("TIFF encoder init failed: {}", e)))?;
    encoder
        .write_image::<colortype::RGBA8>(buffer.width(), buffer.height(), buffer.data())
        .map_err(|e| EncodeError::Codec(format!("TIFF encode failed: {}", e)))?;
    Ok(out.into_inner())
}

fn drop_alpha(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::new(width, height, vec![64; (width * height * 4) as usize]).unwrap()
    }

    #[test]
    fn quality_maps_to_codec_scale() {
        assert_eq!(quality_scale(1.0), 100);
        assert_eq!(quality_scale(0.92), 92);
        assert_eq!(quality_scale(0.005), 1);
    }

    #[test]
    fn every_format_produces_output() {
        let buf = buffer(4, 4);
        for format in [
            OutputFormat::Jpg,
            OutputFormat::Png,
            OutputFormat::Webp,
            OutputFormat::Bmp,
            OutputFormat::Tiff,
            OutputFormat::Heic,
            OutputFormat::Heif,
        ] {
            let bytes = encode(&buf, format, 0.9).unwrap();
            assert!(!bytes.is_empty(), "{:?} produced no bytes", format);
        }
    }

    #[test]
    fn heic_request_encodes_as_png() {
        let buf = buffer(2, 2);
        let heic = encode(&buf, OutputFormat::Heic, 0.9).unwrap();
        // PNG signature
        assert_eq!(&heic[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn png_round_trips_through_decoder() {
        let buf = buffer(5, 3);
        let bytes = encode(&buf, OutputFormat::Png, 1.0).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
    }

    #[test]
    fn bmp_and_jpeg_drop_alpha() {
        assert_eq!(drop_alpha(&[1, 2, 3, 255, 4, 5, 6, 0]), vec![1, 2, 3, 4, 5, 6]);
    }
}
