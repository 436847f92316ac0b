//! Format-specific decoders producing a uniform RGBA8 [`PixelBuffer`].
//!
//! Dispatch is a closed match over [`InputFamily`]: standard raster codecs go
//! through the general decoder, TIFF and HEIC/HEIF through dedicated ones.

#[cfg(feature = "heif")]
mod heif;
mod raster;
mod tiff;

use crate::processing::buffer::PixelBuffer;
use crate::utils::error::DecodeError;
use crate::utils::formats::InputFamily;

/// Reads the image dimensions from headers, without a full decode.
///
/// Used to enforce the pixel budget before any large allocation.
pub fn peek_dimensions(family: InputFamily, bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    match family {
        InputFamily::Tiff => tiff::peek_dimensions(bytes),
        InputFamily::Heif => peek_heif_dimensions(bytes),
        _ => raster::peek_dimensions(bytes),
    }
}

/// Decodes the payload to RGBA8 using the decoder for its family.
pub fn decode(family: InputFamily, bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }
    match family {
        InputFamily::Tiff => tiff::decode(bytes),
        InputFamily::Heif => decode_heif(bytes),
        _ => raster::decode(bytes),
    }
}

#[cfg(feature = "heif")]
fn peek_heif_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    heif::peek_dimensions(bytes)
}

#[cfg(feature = "heif")]
fn decode_heif(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    heif::decode(bytes)
}

#[cfg(not(feature = "heif"))]
fn peek_heif_dimensions(_bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    Err(heif_disabled())
}

#[cfg(not(feature = "heif"))]
fn decode_heif(_bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    Err(heif_disabled())
}

#[cfg(not(feature = "heif"))]
fn heif_disabled() -> DecodeError {
    DecodeError::UnsupportedVariant(
        "HEIC/HEIF input requires this build to include the `heif` feature".into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_its_own_error() {
        let err = decode(InputFamily::Png, &[]).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyInput));
    }

    #[cfg(not(feature = "heif"))]
    #[test]
    fn heif_without_feature_reports_unsupported_variant() {
        let err = decode(InputFamily::Heif, &[0u8; 16]).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedVariant(_)));
    }
}
