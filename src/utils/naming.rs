//! Output filename construction.
//!
//! The naming convention is owned by the calling layer; the pipeline only
//! reports the effective format. This module composes the two: original
//! filename + strategy + effective extension.

use serde::{Deserialize, Serialize};
use crate::utils::formats::{file_stem, output_extension, OutputFormat};

/// How the output filename is derived from the original one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "strategy", content = "value")]
pub enum NamingStrategy {
    /// Keep the original stem unchanged
    Preserve,
    /// Prepend a fixed string to the stem
    Prefix(String),
    /// Append a fixed string to the stem
    Suffix(String),
}

impl Default for NamingStrategy {
    fn default() -> Self {
        Self::Preserve
    }
}

/// Builds the output filename for a converted file.
///
/// The extension always reflects the *effective* encoding: HEIC/HEIF targets
/// produce `.png`, and a TIFF target keeps the source's `.tif` spelling when
/// it had one.
pub fn output_filename(
    original: &str,
    target: OutputFormat,
    strategy: &NamingStrategy,
) -> String {
    let stem = file_stem(original);
    let stem = match strategy {
        NamingStrategy::Preserve => stem,
        NamingStrategy::Prefix(p) => format!("{}{}", p, stem),
        NamingStrategy::Suffix(s) => format!("{}{}", stem, s),
    };
    format!("{}.{}", stem, output_extension(target, original))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn preserve_keeps_stem() {
        assert_eq!(
            output_filename("holiday.jpg", OutputFormat::Webp, &NamingStrategy::Preserve),
            "holiday.webp"
        );
    }

    #[test]
    fn prefix_and_suffix_wrap_stem() {
        assert_eq!(
            output_filename(
                "holiday.jpg",
                OutputFormat::Png,
                &NamingStrategy::Prefix("converted-".into())
            ),
            "converted-holiday.png"
        );
        assert_eq!(
            output_filename(
                "holiday.jpg",
                OutputFormat::Png,
                &NamingStrategy::Suffix("_small".into())
            ),
            "holiday_small.png"
        );
    }

    #[test]
    fn tif_spelling_survives_renaming() {
        assert_eq!(
            output_filename("scan.tif", OutputFormat::Tiff, &NamingStrategy::Preserve),
            "scan.tif"
        );
        assert_eq!(
            output_filename("scan.png", OutputFormat::Tiff, &NamingStrategy::Preserve),
            "scan.tiff"
        );
    }

    #[test]
    fn heic_target_gets_png_extension() {
        assert_eq!(
            output_filename("photo.jpg", OutputFormat::Heic, &NamingStrategy::Preserve),
            "photo.png"
        );
    }
}
