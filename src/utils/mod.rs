pub mod error;
pub mod formats;
pub mod naming;
pub mod validation;

pub use error::{ConverterError, ConverterResult, DecodeError, EncodeError, ValidationError};
pub use formats::{detect_input_family, output_extension, InputFamily, OutputFormat};
pub use naming::{output_filename, NamingStrategy};
pub use validation::{validate_upload, UploadPolicy, MAX_FILE_SIZE_BYTES};
