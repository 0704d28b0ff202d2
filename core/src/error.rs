//! # Error Handling
//!
//! Provides the unified `AppError` enum returned by loading and saving.
//! Validation and resolution failures carry a [`PathError`] that locates the
//! offending value inside the document.

use crate::errpath::PathError;
use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Decode errors from the codecs and I/O errors are wrapped unchanged.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Malformed JSON, or a JSON value that does not fit the document model.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// Malformed YAML.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// A `$ref` that could not be bound to a target.
    /// Ignored for `From<PathError>` so that conversions default to `Validation`.
    #[from(ignore)]
    #[display("{_0}")]
    Resolve(PathError),

    /// A structural rule violation found by `Validate`.
    #[display("{_0}")]
    Validation(PathError),

    /// A file extension the loader does not know how to decode.
    #[from(ignore)]
    #[display("unknown file extension: {_0}")]
    UnknownExtension(String),

    /// A file extension the saver cannot encode to.
    #[from(ignore)]
    #[display("unsupported file extension: {_0}")]
    UnsupportedExtension(String),

    /// The input contained no document at all.
    #[from(ignore)]
    #[display("empty input")]
    EmptyInput,

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::NotFound, "missing");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let app_err: AppError = String::from("something wrong").into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_path_error_defaults_to_validation() {
        let app_err: AppError = PathError::Required.field("openapi").into();
        assert!(matches!(app_err, AppError::Validation(_)));
        assert_eq!(app_err.to_string(), "openapi is required");
    }

    #[test]
    fn test_extension_messages() {
        assert_eq!(
            AppError::UnknownExtension(".txt".into()).to_string(),
            "unknown file extension: .txt"
        );
        assert_eq!(
            AppError::UnsupportedExtension(".yaml".into()).to_string(),
            "unsupported file extension: .yaml"
        );
    }
}
