use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use crate::utils::error::DecodeError;
use crate::utils::ConverterError;

/// Output format selectable by the caller.
///
/// HEIC/HEIF are accepted as selections but no HEIC encoder is assumed to be
/// available, so [`OutputFormat::effective`] substitutes PNG for them. The
/// substitution is surfaced in the conversion result, never applied silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpg,
    Png,
    Webp,
    Bmp,
    Tiff,
    Heic,
    Heif,
}

impl OutputFormat {
    /// The format actually used for encoding (HEIC/HEIF fall back to PNG).
    pub fn effective(self) -> OutputFormat {
        match self {
            Self::Heic | Self::Heif => Self::Png,
            other => other,
        }
    }

    /// Whether the encoded output can carry an alpha channel.
    ///
    /// JPG and BMP cannot; the rasterizer flattens those onto opaque white.
    pub fn supports_alpha(self) -> bool {
        !matches!(self.effective(), Self::Jpg | Self::Bmp)
    }

    /// Whether the `quality` setting affects the encoder for this format.
    pub fn is_lossy(self) -> bool {
        matches!(self.effective(), Self::Jpg | Self::Webp)
    }

    /// Primary file extension for the effective encoding.
    pub fn primary_extension(self) -> &'static str {
        match self.effective() {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Heic | Self::Heif => unreachable!("effective() never yields HEIC/HEIF"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            "bmp" => Ok(Self::Bmp),
            "tif" | "tiff" => Ok(Self::Tiff),
            "heic" => Ok(Self::Heic),
            "heif" => Ok(Self::Heif),
            other => Err(ConverterError::Validation(
                crate::utils::error::ValidationError::settings(format!(
                    "Unsupported output format: {}",
                    other
                )),
            )),
        }
    }
}

/// Input encoding family, one variant per decoder path.
///
/// Everything except TIFF and HEIF goes through the general raster decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFamily {
    Jpeg,
    Png,
    Webp,
    Gif,
    Bmp,
    Tiff,
    Heif,
}

impl InputFamily {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "heic" | "heif" => Some(Self::Heif),
            _ => None,
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            "image/bmp" | "image/x-bmp" => Some(Self::Bmp),
            "image/tiff" => Some(Self::Tiff),
            "image/heic" | "image/heif" | "image/heic-sequence" | "image/heif-sequence" => {
                Some(Self::Heif)
            }
            _ => None,
        }
    }
}

/// Lowercased extension of `filename`, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Filename stem (without extension), falling back to the whole name.
pub fn file_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string()
}

/// Detects the input family for dispatching to a decoder.
///
/// Checked in order: file extension, declared content type, then magic-byte
/// sniffing of the payload. All three are tried before the input is reported
/// as unsupported.
pub fn detect_input_family(
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<InputFamily, DecodeError> {
    if let Some(ext) = file_extension(filename) {
        if let Some(family) = InputFamily::from_extension(&ext) {
            return Ok(family);
        }
    }

    if let Some(mime) = content_type {
        if let Some(family) = InputFamily::from_mime(&mime.to_lowercase()) {
            return Ok(family);
        }
    }

    // Last resort: sniff the payload itself.
    if let Some(kind) = infer::get(bytes) {
        if let Some(family) = InputFamily::from_mime(kind.mime_type()) {
            return Ok(family);
        }
    }

    Err(DecodeError::UnsupportedFormat(format!(
        "'{}' (content type: {})",
        filename,
        content_type.unwrap_or("none")
    )))
}

/// Returns the extension for the output file.
///
/// Derived from the *effective* encoding, with one special case: when the
/// target is TIFF and the source already used `.tif`, that spelling is kept.
pub fn output_extension(target: OutputFormat, original_filename: &str) -> String {
    if target == OutputFormat::Tiff {
        if let Some(ext) = file_extension(original_filename) {
            if ext == "tif" {
                return "tif".to_string();
            }
        }
    }
    target.primary_extension().to_string()
}
