//! Error types for the image converter.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use thiserror::Error;
use serde::Serialize;

/// Validation errors for incoming files and conversion settings.
#[derive(Error, Debug, Clone, Serialize)]
pub enum ValidationError {
    /// File rejected by the upload allow-list
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
    /// File exceeds the configured size limit
    #[error("File too large: {actual} bytes (limit: {limit} bytes)")]
    FileTooLarge { actual: u64, limit: u64 },
    /// Invalid settings error
    #[error("Settings error: {0}")]
    Settings(String),
}

/// Decoding errors, one variant per failure condition.
#[derive(Error, Debug, Clone, Serialize)]
pub enum DecodeError {
    /// Extension/MIME/magic bytes matched no known decoder
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
    /// Input had no bytes at all
    #[error("Input is empty")]
    EmptyInput,
    /// Decoder produced an image with a zero dimension
    #[error("Decoded image has a zero dimension")]
    ZeroDimension,
    /// Container parsed but uses a sub-variant the decoder cannot process
    #[error("Unsupported container variant: {0}")]
    UnsupportedVariant(String),
    /// Codec-reported decode error (corrupt or truncated data)
    #[error("Decode failed: {0}")]
    Codec(String),
}

/// Encoding errors.
#[derive(Error, Debug, Clone, Serialize)]
pub enum EncodeError {
    /// Encoder was handed a zero-sized pixel buffer
    #[error("Cannot encode an empty pixel buffer")]
    EmptyBuffer,
    /// Codec-reported encode error
    #[error("Encode failed: {0}")]
    Codec(String),
}

/// Main error type for the converter.
///
/// Every stage failure is converted to exactly one of these per file
/// before being returned to the calling layer.
#[derive(Error, Debug, Clone, Serialize)]
pub enum ConverterError {
    /// File or settings validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Decoding stage failed
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Rasterization stage failed (degenerate geometry or drawing failure)
    #[error("Rasterization error: {0}")]
    Rasterize(String),

    /// Encoding stage failed
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Image dimensions/memory exceed the practical limit
    #[error("Resource limit exceeded: {0}")]
    ResourceExhausted(String),

    /// File IO error (calling layer only; the core is in-memory)
    #[error("IO error: {0}")]
    Io(String),

    /// Worker pool or task join error
    #[error("Worker error: {0}")]
    Worker(String),
}

/// Convenience result type for converter operations.
pub type ConverterResult<T> = Result<T, ConverterError>;

// Helper methods for error creation
impl ConverterError {
    pub fn rasterize<T: Into<String>>(msg: T) -> Self {
        Self::Rasterize(msg.into())
    }

    pub fn resource<T: Into<String>>(msg: T) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    pub fn worker<T: Into<String>>(msg: T) -> Self {
        Self::Worker(msg.into())
    }
}

impl ValidationError {
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

// Convert std::io::Error to ConverterError
impl From<io::Error> for ConverterError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ConverterError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(format!("Conversion task failed: {}", err))
    }
}

impl From<tokio::sync::AcquireError> for ConverterError {
    fn from(err: tokio::sync::AcquireError) -> Self {
        Self::Worker(format!("Failed to acquire worker: {}", err))
    }
}
