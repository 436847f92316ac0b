//! Crop and resize geometry.
//!
//! Pure math, no pixel access: computes which source rectangle to sample and
//! which destination size to produce. Crop runs first (centered, to the
//! requested aspect ratio), then resize uses the *cropped* dimensions as the
//! base aspect ratio.

use crate::core::{CropSettings, ResizeSettings};

/// Source rectangle and destination size for one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Left edge of the source rectangle
    pub src_x: u32,
    /// Top edge of the source rectangle
    pub src_y: u32,
    /// Width of the source rectangle
    pub src_w: u32,
    /// Height of the source rectangle
    pub src_h: u32,
    /// Destination width
    pub dst_w: u32,
    /// Destination height
    pub dst_h: u32,
}

/// Computes the source crop rectangle and destination dimensions.
///
/// Crop: the largest centered rectangle with the requested ratio. When the
/// image is relatively wider than the target ratio the sides are cut; when
/// taller, the top and bottom.
///
/// Resize: with both width and height given they are used verbatim (explicit
/// stretch); with one given the other follows the cropped aspect ratio; with
/// neither, the cropped size is kept.
///
/// All results are rounded to the nearest integer, clamped to at least 1 and
/// the crop rectangle is clamped into the image bounds.
pub fn compute_geometry(
    src_w: u32,
    src_h: u32,
    crop: &CropSettings,
    resize: &ResizeSettings,
) -> Geometry {
    let image_w = src_w as f64;
    let image_h = src_h as f64;

    // 1. Crop stage
    let (mut crop_x, mut crop_y) = (0.0f64, 0.0f64);
    let (mut crop_w, mut crop_h) = (image_w, image_h);

    if crop.enabled {
        if let Some(aspect) = crop.aspect_ratio {
            let target_ratio = aspect.ratio();
            let image_ratio = image_w / image_h;

            if image_ratio > target_ratio {
                // Relatively wider: cut the sides
                crop_w = image_h * target_ratio;
                crop_x = (image_w - crop_w) / 2.0;
            } else if image_ratio < target_ratio {
                // Relatively taller: cut top and bottom
                crop_h = image_w / target_ratio;
                crop_y = (image_h - crop_h) / 2.0;
            }
        }
    }

    // 2. Resize stage, on the cropped dimensions
    let (mut dst_w, mut dst_h) = (crop_w, crop_h);

    if resize.enabled && (resize.width.is_some() || resize.height.is_some()) {
        let cropped_ratio = crop_w / crop_h;
        match (resize.width, resize.height) {
            (Some(w), Some(h)) => {
                // Explicit stretch, aspect ratio not preserved
                dst_w = w as f64;
                dst_h = h as f64;
            }
            (Some(w), None) => {
                dst_w = w as f64;
                dst_h = w as f64 / cropped_ratio;
            }
            (None, Some(h)) => {
                dst_h = h as f64;
                dst_w = h as f64 * cropped_ratio;
            }
            (None, None) => unreachable!(),
        }
    }

    // Round, clamp to >= 1 and keep the crop rectangle inside the image.
    let out_w = (crop_w.round() as u32).clamp(1, src_w);
    let out_h = (crop_h.round() as u32).clamp(1, src_h);
    let mut out_x = crop_x.round() as u32;
    let mut out_y = crop_y.round() as u32;
    if out_x + out_w > src_w {
        out_x = src_w - out_w;
    }
    if out_y + out_h > src_h {
        out_y = src_h - out_h;
    }

    Geometry {
        src_x: out_x,
        src_y: out_y,
        src_w: out_w,
        src_h: out_h,
        dst_w: (dst_w.round() as u32).max(1),
        dst_h: (dst_h.round() as u32).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AspectRatio;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn crop(aspect: AspectRatio) -> CropSettings {
        CropSettings {
            enabled: true,
            aspect_ratio: Some(aspect),
        }
    }

    fn resize(width: Option<u32>, height: Option<u32>) -> ResizeSettings {
        ResizeSettings {
            enabled: true,
            width,
            height,
        }
    }

    #[test]
    fn identity_when_everything_disabled() {
        let g = compute_geometry(
            640,
            480,
            &CropSettings::default(),
            &ResizeSettings::default(),
        );
        assert_eq!(
            g,
            Geometry {
                src_x: 0,
                src_y: 0,
                src_w: 640,
                src_h: 480,
                dst_w: 640,
                dst_h: 480,
            }
        );
    }

    #[test]
    fn wide_image_cropped_square_then_scaled() {
        // 1000x500, crop 1:1, resize width=200: crop yields a centered
        // 500x500, resize yields 200x200.
        let g = compute_geometry(
            1000,
            500,
            &crop(AspectRatio::Square),
            &resize(Some(200), None),
        );
        assert_eq!(
            g,
            Geometry {
                src_x: 250,
                src_y: 0,
                src_w: 500,
                src_h: 500,
                dst_w: 200,
                dst_h: 200,
            }
        );
    }

    #[test]
    fn tall_image_cropped_vertically() {
        let g = compute_geometry(
            500,
            1000,
            &crop(AspectRatio::Square),
            &ResizeSettings::default(),
        );
        assert_eq!((g.src_x, g.src_y), (0, 250));
        assert_eq!((g.src_w, g.src_h), (500, 500));
    }

    #[test]
    fn matching_ratio_is_not_cropped() {
        let g = compute_geometry(
            1600,
            900,
            &crop(AspectRatio::Wide),
            &ResizeSettings::default(),
        );
        assert_eq!((g.src_x, g.src_y, g.src_w, g.src_h), (0, 0, 1600, 900));
    }

    #[test]
    fn both_dimensions_stretch() {
        let g = compute_geometry(
            640,
            480,
            &CropSettings::default(),
            &resize(Some(100), Some(300)),
        );
        assert_eq!((g.dst_w, g.dst_h), (100, 300));
    }

    #[test]
    fn single_dimension_preserves_ratio() {
        let g = compute_geometry(
            1000,
            500,
            &CropSettings::default(),
            &resize(Some(200), None),
        );
        assert_eq!((g.dst_w, g.dst_h), (200, 100));

        let g = compute_geometry(
            1000,
            500,
            &CropSettings::default(),
            &resize(None, Some(100)),
        );
        assert_eq!((g.dst_w, g.dst_h), (200, 100));
    }

    #[test]
    fn resize_enabled_without_dimensions_is_identity() {
        let g = compute_geometry(320, 200, &CropSettings::default(), &resize(None, None));
        assert_eq!((g.dst_w, g.dst_h), (320, 200));
    }

    #[test]
    fn dimensions_never_round_to_zero() {
        let g = compute_geometry(
            10000,
            1,
            &CropSettings::default(),
            &resize(Some(1), None),
        );
        assert_eq!((g.dst_w, g.dst_h), (1, 1));
    }

    proptest! {
        #[test]
        fn crop_rectangle_stays_in_bounds_and_matches_ratio(
            src_w in 1u32..4000,
            src_h in 1u32..4000,
            aspect_idx in 0usize..5,
        ) {
            let aspect = [
                AspectRatio::Square,
                AspectRatio::Wide,
                AspectRatio::Tall,
                AspectRatio::Classic,
                AspectRatio::Portrait,
            ][aspect_idx];

            let g = compute_geometry(src_w, src_h, &crop(aspect), &ResizeSettings::default());

            prop_assert!(g.src_x + g.src_w <= src_w);
            prop_assert!(g.src_y + g.src_h <= src_h);
            prop_assert!(g.src_w >= 1 && g.src_h >= 1);

            // One cropped dimension is exact, the other rounded: the deviation
            // from the target ratio is bounded by half a pixel on that side.
            let r = aspect.ratio();
            let tolerance = 0.5 * r.max(1.0) + 1e-9;
            prop_assert!(
                (g.src_w as f64 - r * g.src_h as f64).abs() <= tolerance,
                "{}x{} crop {:?} -> {:?}", src_w, src_h, aspect, g
            );
        }
    }
}
