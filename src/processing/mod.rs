mod batch;
mod buffer;
mod decode;
mod encode;
mod geometry;
mod pipeline;
mod raster;

pub use batch::{BatchProcessor, FileOutcome};
pub use buffer::PixelBuffer;
pub use encode::encode;
pub use geometry::{compute_geometry, Geometry};
pub use pipeline::{convert, ensure_pixel_budget, MAX_PIXELS};
pub use raster::rasterize;
