//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;
use tubely_core::models::{StoredObjectLocation, StoredObjectReference};
use tubely_core::AppError;

pub use tubely_core::MAX_PRESIGN_TTL;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Unknown bucket '{requested}', this backend serves '{served}'")]
    UnknownBucket { requested: String, served: String },

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid or expired signature")]
    InvalidSignature,

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked object body returned by [`Storage::download_stream`].
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Object not found: {}", key)),
            StorageError::InvalidKey(msg) => AppError::InvalidArgument(msg),
            e @ StorageError::UnknownBucket { .. } => AppError::InvalidArgument(e.to_string()),
            StorageError::InvalidSignature => {
                AppError::Unauthorized("Invalid or expired signature".to_string())
            }
            StorageError::SigningFailed(msg) => AppError::SigningUnavailable(msg),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            e @ (StorageError::UploadFailed(_)
            | StorageError::DownloadFailed(_)
            | StorageError::DeleteFailed(_)
            | StorageError::BackendError(_)
            | StorageError::IoError(_)) => AppError::StorageUnavailable(e.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// ingestion pipeline and the playback signer never depend on a concrete store.
/// A backend serves exactly one bucket; operations addressed to another bucket
/// fail with [`StorageError::UnknownBucket`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket this backend writes to.
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Longest TTL [`Storage::presigned_get_url`] accepts.
    fn max_presign_ttl(&self) -> Duration {
        MAX_PRESIGN_TTL
    }

    /// Stream `reader` to the store under `key` with the declared content type.
    ///
    /// The reader is consumed until EOF without buffering the whole object.
    /// On failure no object is visible under `key`.
    async fn upload_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<StoredObjectReference>;

    /// Generate a presigned/temporary URL for direct access (GET)
    async fn presigned_get_url(
        &self,
        location: &StoredObjectLocation,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check a signature produced by [`Storage::presigned_get_url`].
    ///
    /// Only backends that serve their own objects (local) support this; remote
    /// stores verify their signatures themselves.
    fn verify_signed_url(&self, _key: &str, _expires: i64, _signature: &str) -> StorageResult<()> {
        Err(StorageError::ConfigError(format!(
            "{} backend does not serve objects directly",
            self.backend_type()
        )))
    }

    /// Check if a file exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete a file by its storage key. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Download a file as a stream of `Bytes` chunks
    async fn download_stream(&self, key: &str) -> StorageResult<ByteStream>;
}

/// Fail unless `location` addresses the bucket this backend serves.
pub(crate) fn ensure_bucket(served: &str, location: &StoredObjectLocation) -> StorageResult<()> {
    if location.bucket != served {
        return Err(StorageError::UnknownBucket {
            requested: location.bucket.clone(),
            served: served.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_core::ErrorMetadata;

    #[test]
    fn test_storage_error_maps_to_app_error() {
        let err: AppError = StorageError::UploadFailed("connection reset".to_string()).into();
        assert_eq!(err.http_status_code(), 503);

        let err: AppError = StorageError::SigningFailed("no credentials".to_string()).into();
        assert!(matches!(err, AppError::SigningUnavailable(_)));

        let err: AppError = StorageError::UnknownBucket {
            requested: "old".to_string(),
            served: "new".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let err: AppError = StorageError::InvalidSignature.into();
        assert_eq!(err.http_status_code(), 401);
    }
}
