//! Core types for conversion settings, requests and results.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::utils::error::ValidationError;
use crate::utils::formats::OutputFormat;

/// Fixed aspect-ratio choices for cropping.
///
/// Drawn from a closed set rather than arbitrary values so dispatch stays
/// exhaustively matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "4:3")]
    Classic,
    #[serde(rename = "3:4")]
    Portrait,
}

impl AspectRatio {
    /// Reduced width:height pair.
    pub fn as_pair(self) -> (u32, u32) {
        match self {
            Self::Square => (1, 1),
            Self::Wide => (16, 9),
            Self::Tall => (9, 16),
            Self::Classic => (4, 3),
            Self::Portrait => (3, 4),
        }
    }

    /// Width divided by height.
    pub fn ratio(self) -> f64 {
        let (w, h) = self.as_pair();
        w as f64 / h as f64
    }
}

impl FromStr for AspectRatio {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1:1" => Ok(Self::Square),
            "16:9" => Ok(Self::Wide),
            "9:16" => Ok(Self::Tall),
            "4:3" => Ok(Self::Classic),
            "3:4" => Ok(Self::Portrait),
            other => Err(ValidationError::settings(format!(
                "Unsupported aspect ratio: {}",
                other
            ))),
        }
    }
}

/// Crop settings for forcing a fixed aspect ratio.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSettings {
    /// Whether cropping is applied at all
    pub enabled: bool,
    /// Target aspect ratio; required when enabled
    pub aspect_ratio: Option<AspectRatio>,
}

/// Resize settings for the output dimensions.
///
/// With only one dimension given the other follows the (cropped) aspect
/// ratio; with both given the image is stretched to fit exactly.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeSettings {
    /// Whether resizing is applied at all
    pub enabled: bool,
    /// Target width in pixels
    pub width: Option<u32>,
    /// Target height in pixels
    pub height: Option<u32>,
}

/// Settings controlling one conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSettings {
    /// Requested output format (HEIC/HEIF fall back to PNG at encode time)
    pub target_format: OutputFormat,
    /// Quality in (0, 1]; mapped to the codec scale for lossy formats
    pub quality: f32,
    /// Resize settings
    pub resize: ResizeSettings,
    /// Crop settings
    pub crop: CropSettings,
}

impl ConversionSettings {
    /// Settings that convert to `target_format` unchanged at quality 0.92.
    pub fn for_format(target_format: OutputFormat) -> Self {
        Self {
            target_format,
            quality: 0.92,
            resize: ResizeSettings::default(),
            crop: CropSettings::default(),
        }
    }

    /// Checks the settings invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.quality.is_finite() || self.quality <= 0.0 || self.quality > 1.0 {
            return Err(ValidationError::settings(format!(
                "Invalid quality value: {}. Must be in (0, 1]",
                self.quality
            )));
        }

        if self.crop.enabled && self.crop.aspect_ratio.is_none() {
            return Err(ValidationError::settings(
                "Crop is enabled but no aspect ratio was given",
            ));
        }

        if let Some(width) = self.resize.width {
            if width == 0 {
                return Err(ValidationError::settings("Width cannot be 0"));
            }
        }

        if let Some(height) = self.resize.height {
            if height == 0 {
                return Err(ValidationError::settings("Height cannot be 0"));
            }
        }

        Ok(())
    }
}

/// A single conversion request. Immutable and single-use; resubmitting a
/// failed file is a fresh request.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Raw bytes of the source file
    pub source_bytes: Vec<u8>,
    /// Original filename, used for format detection and extension derivation
    pub filename: String,
    /// Declared content type, when the caller has one
    pub content_type: Option<String>,
    /// Conversion settings
    pub settings: ConversionSettings,
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// Encoded output bytes
    pub bytes: Vec<u8>,
    /// Size of the encoded output in bytes
    pub byte_size: u64,
    /// The encoding actually used (PNG when HEIC/HEIF was requested)
    pub effective_format: OutputFormat,
    /// Recommended file extension, derived from the effective format
    pub extension: String,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_bounds_are_enforced() {
        let mut settings = ConversionSettings::for_format(OutputFormat::Png);
        assert!(settings.validate().is_ok());

        settings.quality = 0.0;
        assert!(settings.validate().is_err());
        settings.quality = 1.0;
        assert!(settings.validate().is_ok());
        settings.quality = 1.01;
        assert!(settings.validate().is_err());
        settings.quality = f32::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn crop_requires_aspect_ratio() {
        let mut settings = ConversionSettings::for_format(OutputFormat::Png);
        settings.crop.enabled = true;
        assert!(settings.validate().is_err());

        settings.crop.aspect_ratio = Some(AspectRatio::Square);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_resize_dimensions_are_rejected() {
        let mut settings = ConversionSettings::for_format(OutputFormat::Png);
        settings.resize = ResizeSettings {
            enabled: true,
            width: Some(0),
            height: None,
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn aspect_ratio_parses_and_reduces() {
        let ratio: AspectRatio = "16:9".parse().unwrap();
        assert_eq!(ratio.as_pair(), (16, 9));
        assert!((AspectRatio::Square.ratio() - 1.0).abs() < f64::EPSILON);
        assert!("2:1".parse::<AspectRatio>().is_err());
    }
}
