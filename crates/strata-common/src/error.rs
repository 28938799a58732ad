//! Error types for Strata.

use thiserror::Error;

/// Result type alias using StrataError.
pub type Result<T> = std::result::Result<T, StrataError>;

/// Errors that can occur in Strata operations.
///
/// Not-found outcomes of searches and deletes are ordinary values, never errors.
#[derive(Debug, Error)]
pub enum StrataError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Record store errors
    #[error("Duplicate key: {id}")]
    DuplicateKey { id: i64 },

    #[error("Parse error on line {line}: {reason}")]
    ParseError { line: usize, reason: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter { name: String, value: String },

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StrataError {
    /// Builds an `InvalidParameter` error from any displayable value.
    pub fn invalid_parameter(name: &str, value: impl std::fmt::Display) -> Self {
        StrataError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let strata_err: StrataError = io_err.into();
        assert!(matches!(strata_err, StrataError::Io(_)));
        assert!(strata_err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_duplicate_key_display() {
        let err = StrataError::DuplicateKey { id: 42 };
        assert_eq!(err.to_string(), "Duplicate key: 42");
    }

    #[test]
    fn test_parse_error_display() {
        let err = StrataError::ParseError {
            line: 7,
            reason: "expected 3 fields, found 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parse error on line 7: expected 3 fields, found 2"
        );
    }

    #[test]
    fn test_config_errors_display() {
        let err = StrataError::ConfigError("fan-out below 2".to_string());
        assert_eq!(err.to_string(), "Configuration error: fan-out below 2");

        let err = StrataError::invalid_parameter("block_size_bytes", 16);
        assert_eq!(err.to_string(), "Invalid parameter: block_size_bytes = 16");
    }

    #[test]
    fn test_internal_error_display() {
        let err = StrataError::Internal("level pointer out of range".to_string());
        assert_eq!(err.to_string(), "Internal error: level pointer out of range");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StrataError>();
    }
}
