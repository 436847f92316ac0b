//! Conversion orchestrator: decode → geometry → rasterize → encode for one
//! file, with progress milestones and a single error per failure.
//!
//! Each call is pure given its inputs aside from the progress side-channel;
//! nothing is shared between calls.

use tracing::debug;
use crate::core::{
    ConversionOutput, ConversionRequest, ConversionStage, ProgressReporter, PROGRESS_DECODED,
    PROGRESS_DECODE_START, PROGRESS_DONE, PROGRESS_PRE_DECODED, PROGRESS_RASTERIZED,
    PROGRESS_TRANSFORM_START,
};
use crate::processing::decode;
use crate::processing::geometry::compute_geometry;
use crate::processing::raster::rasterize;
use crate::processing::encode::encode;
use crate::utils::error::{ConverterError, DecodeError};
use crate::utils::formats::{detect_input_family, output_extension, InputFamily};
use crate::utils::ConverterResult;

/// Practical decode ceiling: 100 megapixels (~400 MB as RGBA8).
pub const MAX_PIXELS: u64 = 100_000_000;

/// Rejects dimensions whose pixel count exceeds `max_pixels`.
pub fn ensure_pixel_budget(width: u32, height: u32, max_pixels: u64) -> ConverterResult<()> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| ConverterError::resource("Pixel count overflows"))?;

    if pixels > max_pixels {
        return Err(ConverterError::resource(format!(
            "{}x{} is {} pixels (limit: {})",
            width, height, pixels, max_pixels
        )));
    }
    Ok(())
}

/// Converts one file according to its request.
///
/// Progress milestones: 10 before decoding, 20 when a dedicated container
/// decoder (TIFF, HEIC/HEIF) has produced its intermediate, 25 when the
/// uniform pixel buffer exists, 50 when the transform starts, 75 when
/// rasterization is done, and 100 exactly once on success. The reported
/// sequence is always non-decreasing.
pub fn convert(
    request: &ConversionRequest,
    on_progress: impl FnMut(u8),
) -> ConverterResult<ConversionOutput> {
    let mut progress = ProgressReporter::new(on_progress);
    let settings = &request.settings;

    settings.validate()?;

    if request.source_bytes.is_empty() {
        return Err(DecodeError::EmptyInput.into());
    }

    debug!("'{}' -> {:?}", request.filename, ConversionStage::Decoding);
    progress.report(PROGRESS_DECODE_START);
    let family = detect_input_family(
        &request.filename,
        request.content_type.as_deref(),
        &request.source_bytes,
    )?;

    let (src_w, src_h) = decode::peek_dimensions(family, &request.source_bytes)?;
    ensure_pixel_budget(src_w, src_h, MAX_PIXELS)?;

    let source = decode::decode(family, &request.source_bytes)?;
    if matches!(family, InputFamily::Tiff | InputFamily::Heif) {
        progress.report(PROGRESS_PRE_DECODED);
    }
    progress.report(PROGRESS_DECODED);
    debug!(
        "Decoded '{}': {}x{} ({:?})",
        request.filename,
        source.width(),
        source.height(),
        family
    );

    debug!("'{}' -> {:?}", request.filename, ConversionStage::Transforming);
    progress.report(PROGRESS_TRANSFORM_START);
    let geometry = compute_geometry(source.width(), source.height(), &settings.crop, &settings.resize);
    ensure_pixel_budget(geometry.dst_w, geometry.dst_h, MAX_PIXELS)?;

    let raster = rasterize(&source, &geometry, settings.target_format)?;
    progress.report(PROGRESS_RASTERIZED);

    debug!("'{}' -> {:?}", request.filename, ConversionStage::Encoding);
    let effective_format = settings.target_format.effective();
    let bytes = encode(&raster, settings.target_format, settings.quality)?;
    debug!(
        "Encoded '{}' as {:?}: {}x{}, {} bytes",
        request.filename,
        effective_format,
        raster.width(),
        raster.height(),
        bytes.len()
    );

    let output = ConversionOutput {
        byte_size: bytes.len() as u64,
        bytes,
        effective_format,
        extension: output_extension(settings.target_format, &request.filename),
        width: raster.width(),
        height: raster.height(),
    };

    progress.report(PROGRESS_DONE);
    Ok(output)
}
