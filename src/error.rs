//! Error types for filevault.

use thiserror::Error;

/// Common error type for filevault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Malformed or missing input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Bad credentials or missing session.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A uniquely named resource is already present.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Upload exceeds the size ceiling.
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Declared or observed upload size.
        size: u64,
        /// Configured ceiling.
        limit: u64,
    },

    /// Object storage fault (transport or service error).
    #[error("object storage error: {0}")]
    Storage(String),

    /// Database fault.
    ///
    /// Errors from sqlx are converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for VaultError {
    fn from(e: sqlx::Error) -> Self {
        VaultError::Database(e.to_string())
    }
}

/// Result type alias for filevault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = VaultError::NotFound("user".to_string());
        assert_eq!(err.to_string(), "user not found");
    }

    #[test]
    fn test_already_exists_display() {
        let err = VaultError::AlreadyExists("user 'alice'".to_string());
        assert_eq!(err.to_string(), "user 'alice' already exists");
    }

    #[test]
    fn test_too_large_display() {
        let err = VaultError::TooLarge {
            size: 11,
            limit: 10,
        };
        assert_eq!(
            err.to_string(),
            "upload of 11 bytes exceeds the 10 byte limit"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VaultError = io_err.into();
        assert!(matches!(err, VaultError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: VaultError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, VaultError::Database(_)));
    }
}
