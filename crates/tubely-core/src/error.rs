//! Error types module
//!
//! This module provides the core error type used throughout Tubely. Every failure
//! the ingestion pipeline, the signer, or the metadata store can produce is folded
//! into `AppError`, and each variant self-describes how it is presented over HTTP
//! through the `ErrorMetadata` trait.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like unreadable uploads
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PROCESSING_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {size_limit} byte limit exceeded")]
    PayloadTooLarge { size_limit: u64 },

    #[error("IO error: {0}")]
    Io(#[source] io::Error),

    #[error("Unreadable media: {0}")]
    UnreadableMedia(String),

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Signing unavailable: {0}")]
    SigningUnavailable(String),

    #[error("Request cancelled: {0}")]
    Cancelled(String),

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidArgument(format!("Invalid ID: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidArgument(_) => (
            400,
            "INVALID_ARGUMENT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check the bearer token and resource ownership"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge { .. } => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and upload again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Io(_) => (
            500,
            "IO_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::UnreadableMedia(_) => (
            422,
            "UNREADABLE_MEDIA",
            false,
            Some("Check that the file is a valid media container"),
            false,
            LogLevel::Warn,
        ),
        AppError::ProcessingFailed(_) => (
            500,
            "PROCESSING_FAILED",
            false,
            Some("Check that the file is a valid MP4 and try again"),
            true,
            LogLevel::Error,
        ),
        AppError::StorageUnavailable(_) => (
            503,
            "STORAGE_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::SigningUnavailable(_) => (
            503,
            "SIGNING_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Cancelled(_) => (
            408,
            "REQUEST_CANCELLED",
            true,
            Some("Retry the upload"),
            false,
            LogLevel::Warn,
        ),
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidArgument(_) => "InvalidArgument",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::Io(_) => "IOError",
            AppError::UnreadableMedia(_) => "UnreadableMedia",
            AppError::ProcessingFailed(_) => "ProcessingFailed",
            AppError::StorageUnavailable(_) => "StorageUnavailable",
            AppError::SigningUnavailable(_) => "SigningUnavailable",
            AppError::Cancelled(_) => "Cancelled",
            AppError::Database(_) => "Database",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidArgument(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge { size_limit } => {
                format!("File exceeds the maximum allowed size of {} bytes", size_limit)
            }
            AppError::Io(_) => "Failed to stage uploaded file".to_string(),
            AppError::UnreadableMedia(_) => "Could not read media stream information".to_string(),
            AppError::ProcessingFailed(_) => "Error processing video".to_string(),
            AppError::StorageUnavailable(_) => "Failed to access storage".to_string(),
            AppError::SigningUnavailable(_) => "Failed to create playback URL".to_string(),
            AppError::Cancelled(ref msg) => msg.clone(),
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_payload_too_large() {
        let err = AppError::PayloadTooLarge { size_limit: 1024 };
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("1024"));
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_processing_failed_hides_stderr() {
        let err = AppError::ProcessingFailed("moov atom not found".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "PROCESSING_FAILED");
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("moov"));
    }

    #[test]
    fn test_error_metadata_storage_unavailable() {
        let err = AppError::StorageUnavailable("connection reset".to_string());
        assert_eq!(err.http_status_code(), 503);
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access storage");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_io_error_conversion() {
        let err: AppError = io::Error::new(io::ErrorKind::Other, "disk full").into();
        assert_eq!(err.error_type(), "IOError");
        assert!(err.detailed_message().contains("disk full"));
    }

    #[test]
    fn test_uuid_error_is_invalid_argument() {
        let err: AppError = uuid::Uuid::parse_str("not-a-uuid").unwrap_err().into();
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err1 = AppError::NotFound("test".to_string());
        assert_eq!(err1.suggested_action(), Some("Verify the resource ID exists"));

        let err2 = AppError::InvalidArgument("test".to_string());
        assert_eq!(
            err2.suggested_action(),
            Some("Check request parameters and try again")
        );
    }
}
