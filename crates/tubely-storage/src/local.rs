use crate::keys::validate_key;
use crate::traits::{ensure_bucket, ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tubely_core::models::{StoredObjectLocation, StoredObjectReference};

type HmacSha256 = Hmac<Sha256>;

/// Local filesystem storage implementation
///
/// Objects live under `{base_path}/{bucket}/{key}` and are served by the API's
/// asset route. Playback URLs carry an expiry and an HMAC-SHA256 signature over
/// `(bucket, key, expiry)`, checked by [`Storage::verify_signed_url`].
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    bucket: String,
    base_url: String,
    signing_key: Vec<u8>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/tubely/assets")
    /// * `bucket` - Logical bucket name recorded in stored references
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8091/assets")
    /// * `signing_key` - HMAC key for playback URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        bucket: String,
        base_url: String,
        signing_key: impl Into<Vec<u8>>,
    ) -> StorageResult<Self> {
        let root = base_path.into().join(&bucket);

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            root,
            bucket,
            base_url,
            signing_key: signing_key.into(),
        })
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        let path = self.root.join(key);
        if path.strip_prefix(&self.root).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }
        Ok(path)
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    fn signature(&self, key: &str, expires: i64) -> StorageResult<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(self.bucket.as_bytes());
        mac.update(b"\n");
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

/// Temp path next to the final object; renamed into place once complete.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn upload_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<StoredObjectReference> {
        let path = self.key_to_path(key)?;
        let partial = partial_path(&path);
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        let write_result: StorageResult<u64> = async {
            let mut file = fs::File::create(&partial).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    partial.display(),
                    e
                ))
            })?;

            let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write stream to file {}: {}",
                    partial.display(),
                    e
                ))
            })?;

            file.flush().await?;
            file.sync_all().await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to sync file {}: {}",
                    partial.display(),
                    e
                ))
            })?;

            fs::rename(&partial, &path).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to move {} into place: {}",
                    path.display(),
                    e
                ))
            })?;

            Ok(bytes_copied)
        }
        .await;

        let bytes_copied = match write_result {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                tracing::error!(
                    error = %e,
                    path = %path.display(),
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage stream upload failed"
                );
                return Err(e);
            }
        };

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes_copied,
            declared_bytes = content_length,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );

        Ok(StoredObjectReference {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            content_type: content_type.to_string(),
        })
    }

    async fn presigned_get_url(
        &self,
        location: &StoredObjectLocation,
        expires_in: Duration,
    ) -> StorageResult<String> {
        ensure_bucket(&self.bucket, location)?;
        validate_key(&location.key)?;

        let expires = Utc::now().timestamp().saturating_add(expires_in.as_secs() as i64);
        let signature = hex::encode(self.signature(&location.key, expires)?);

        Ok(format!(
            "{}?expires={}&signature={}",
            self.object_url(&location.key),
            expires,
            signature
        ))
    }

    fn verify_signed_url(&self, key: &str, expires: i64, signature: &str) -> StorageResult<()> {
        validate_key(key)?;

        if Utc::now().timestamp() > expires {
            return Err(StorageError::InvalidSignature);
        }

        let provided = hex::decode(signature).map_err(|_| StorageError::InvalidSignature)?;
        let expected = self.signature(key, expires)?;

        if provided.ct_eq(&expected).into() {
            Ok(())
        } else {
            Err(StorageError::InvalidSignature)
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn download_stream(&self, key: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let key = key.to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(key = %key, error = %e, "Local storage stream download error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }
}
