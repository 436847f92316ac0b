//! General-purpose raster decoder for JPEG, PNG, WEBP, BMP and GIF input.
//!
//! GIF input is decoded as its first frame only; animation is not carried
//! through the pipeline.

use std::io::Cursor;
use image::ImageReader;
use crate::processing::buffer::PixelBuffer;
use crate::utils::error::DecodeError;

/// Reads the image dimensions from the header without a full decode.
pub fn peek_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Codec(format!("Cannot inspect image header: {}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| DecodeError::Codec(format!("Cannot read image dimensions: {}", e)))
}

/// Decodes the payload to an RGBA8 buffer.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Codec(format!("Cannot detect image encoding: {}", e)))?;

    let decoded = reader
        .decode()
        .map_err(|e| DecodeError::Codec(e.to_string()))?;

    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();

    PixelBuffer::new(width, height, rgba.into_raw()).ok_or(DecodeError::ZeroDimension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_to_rgba() {
        let bytes = png_fixture(3, 2);
        let buffer = decode(&bytes).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (3, 2));
        assert_eq!(buffer.data().len(), 3 * 2 * 4);
        assert_eq!(&buffer.data()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn peeks_dimensions_without_decoding() {
        let bytes = png_fixture(7, 5);
        assert_eq!(peek_dimensions(&bytes).unwrap(), (7, 5));
    }

    #[test]
    fn corrupt_payload_is_a_codec_error() {
        let err = decode(&[0u8; 32]).unwrap_err();
        assert!(matches!(err, DecodeError::Codec(_)));
    }
}
