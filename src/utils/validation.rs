use crate::utils::error::ValidationError;
use crate::utils::formats::file_extension;

/// Default upload size limit: 100 MB.
pub const MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Extensions accepted by the upload layer.
const ALLOWED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff", "heic", "heif",
];

/// MIME types accepted by the upload layer.
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/bmp",
    "image/x-bmp",
    "image/tiff",
    "image/heic",
    "image/heif",
];

/// Upload-layer policy. Files failing these checks never reach the pipeline.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Maximum accepted file size in bytes
    pub max_size_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: MAX_FILE_SIZE_BYTES,
        }
    }
}

/// Validates an incoming file against the allow-list and size limit.
///
/// A file passes when either its extension or its declared content type is on
/// the allow-list; declared types are optional (drag-and-drop sources do not
/// always provide one).
pub fn validate_upload(
    filename: &str,
    content_type: Option<&str>,
    size_bytes: u64,
    policy: &UploadPolicy,
) -> Result<(), ValidationError> {
    if size_bytes > policy.max_size_bytes {
        return Err(ValidationError::FileTooLarge {
            actual: size_bytes,
            limit: policy.max_size_bytes,
        });
    }

    let ext_ok = file_extension(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);

    let mime_ok = content_type
        .map(|m| ALLOWED_MIME_TYPES.contains(&m.to_lowercase().as_str()))
        .unwrap_or(false);

    if !ext_ok && !mime_ok {
        return Err(ValidationError::UnsupportedFileType(format!(
            "{} (content type: {})",
            filename,
            content_type.unwrap_or("none")
        )));
    }

    Ok(())
}
