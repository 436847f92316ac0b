//! Rasterizer: samples the source crop rectangle onto the destination size.
//!
//! Sampling is bilinear convolution via `fast_image_resize`; alpha is
//! premultiplied around resampling (the resizer's default for U8x4) so
//! semi-transparent edges scale correctly. Formats without alpha support get
//! the result composited over opaque white.

use fast_image_resize as fr;
use crate::processing::buffer::PixelBuffer;
use crate::processing::geometry::Geometry;
use crate::utils::error::ConverterError;
use crate::utils::formats::OutputFormat;
use crate::utils::ConverterResult;

/// Draws the source rectangle described by `geometry` into a fresh buffer of
/// exactly `(dst_w, dst_h)` pixels.
///
/// The source rectangle is clamped into the image bounds before sampling, so
/// rounding overshoot from the geometry stage cannot read out of range.
pub fn rasterize(
    source: &PixelBuffer,
    geometry: &Geometry,
    target: OutputFormat,
) -> ConverterResult<PixelBuffer> {
    // Clamp the crop rectangle into the source bounds.
    let src_x = geometry.src_x.min(source.width().saturating_sub(1));
    let src_y = geometry.src_y.min(source.height().saturating_sub(1));
    let src_w = geometry.src_w.min(source.width() - src_x);
    let src_h = geometry.src_h.min(source.height() - src_y);

    if src_w == 0 || src_h == 0 || geometry.dst_w == 0 || geometry.dst_h == 0 {
        return Err(ConverterError::rasterize(format!(
            "Degenerate geometry: {}x{} -> {}x{}",
            src_w, src_h, geometry.dst_w, geometry.dst_h
        )));
    }

    let src_view = fr::images::ImageRef::new(
        source.width(),
        source.height(),
        source.data(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| ConverterError::rasterize(format!("Source buffer rejected: {}", e)))?;

    let mut dst_image = fr::images::Image::new(geometry.dst_w, geometry.dst_h, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear))
        .crop(src_x as f64, src_y as f64, src_w as f64, src_h as f64);

    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .map_err(|e| ConverterError::rasterize(format!("Resize failed: {}", e)))?;

    let mut data = dst_image.into_vec();

    if !target.supports_alpha() {
        flatten_onto_white(&mut data);
    }

    PixelBuffer::new(geometry.dst_w, geometry.dst_h, data)
        .ok_or_else(|| ConverterError::rasterize("Rasterizer produced a malformed buffer"))
}

/// Composites straight-alpha RGBA pixels over opaque white in place.
fn flatten_onto_white(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        }
        px[3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, px: [u8; 4]) -> PixelBuffer {
        let data = px
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        PixelBuffer::new(width, height, data).unwrap()
    }

    fn identity(w: u32, h: u32) -> Geometry {
        Geometry {
            src_x: 0,
            src_y: 0,
            src_w: w,
            src_h: h,
            dst_w: w,
            dst_h: h,
        }
    }

    #[test]
    fn output_dimensions_match_geometry() {
        let source = solid(8, 8, [200, 100, 50, 255]);
        let geometry = Geometry {
            src_x: 2,
            src_y: 2,
            src_w: 4,
            src_h: 4,
            dst_w: 2,
            dst_h: 6,
        };
        let out = rasterize(&source, &geometry, OutputFormat::Png).unwrap();
        assert_eq!((out.width(), out.height()), (2, 6));
        // Solid input stays solid through resampling
        assert_eq!(&out.data()[..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn transparency_is_kept_for_png() {
        let source = solid(4, 4, [10, 20, 30, 0]);
        let out = rasterize(&source, &identity(4, 4), OutputFormat::Png).unwrap();
        assert_eq!(out.data()[3], 0);
    }

    #[test]
    fn transparency_is_flattened_to_white_for_jpg() {
        let source = solid(4, 4, [10, 20, 30, 0]);
        let out = rasterize(&source, &identity(4, 4), OutputFormat::Jpg).unwrap();
        assert_eq!(&out.data()[..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn half_transparent_red_blends_toward_white_for_bmp() {
        let source = solid(2, 2, [255, 0, 0, 128]);
        let out = rasterize(&source, &identity(2, 2), OutputFormat::Bmp).unwrap();
        let px = &out.data()[..4];
        assert_eq!(px[3], 255);
        assert!(px[0] >= 250, "red stays saturated, got {:?}", px);
        // Green/blue pulled up by the white background
        assert!(px[1] > 120 && px[1] < 135, "expected ~127, got {:?}", px);
    }

    #[test]
    fn out_of_range_rectangle_is_clamped() {
        let source = solid(4, 4, [1, 2, 3, 255]);
        let geometry = Geometry {
            src_x: 3,
            src_y: 3,
            src_w: 10,
            src_h: 10,
            dst_w: 2,
            dst_h: 2,
        };
        let out = rasterize(&source, &geometry, OutputFormat::Png).unwrap();
        assert_eq!((out.width(), out.height()), (2, 2));
    }
}
