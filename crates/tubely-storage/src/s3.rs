use crate::keys::validate_key;
use crate::traits::{ensure_bucket, ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStoreExt, Result as ObjectResult};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tubely_core::models::{StoredObjectLocation, StoredObjectReference};

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<AmazonS3>,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// Credentials come from the standard AWS environment variables.
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        Self::from_builder(builder, bucket)
    }

    pub(crate) fn from_builder(builder: AmazonS3Builder, bucket: String) -> StorageResult<Self> {
        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store: Arc::new(store),
            bucket,
        })
    }
}

#[async_trait]
impl Storage for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }

    async fn upload_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<StoredObjectReference> {
        validate_key(key)?;
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );

        // Switches to a multipart upload once the body outgrows one part.
        let store: Arc<dyn object_store::ObjectStore> = self.store.clone();
        let mut writer = BufWriter::new(store, location).with_attributes(attributes);

        let copied = match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(n) => n,
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(
                        error = %abort_err,
                        bucket = %self.bucket,
                        key = %key,
                        "Failed to abort S3 multipart upload"
                    );
                }
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 stream upload failed"
                );
                return Err(StorageError::UploadFailed(e.to_string()));
            }
        };

        if let Err(e) = writer.shutdown().await {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = copied,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 stream upload failed to complete"
            );
            return Err(StorageError::UploadFailed(e.to_string()));
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = copied,
            declared_bytes = content_length,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 stream upload successful"
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

        let path = Path::from(location.key.clone());
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &path, expires_in)
            .await;

        let url = url_result
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %location.key,
                    "S3 presign failed"
                );
                StorageError::SigningFailed(e.to_string())
            })?
            .to_string();

        Ok(url)
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn download_stream(&self, key: &str) -> StorageResult<ByteStream> {
        validate_key(key)?;
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        let bucket = self.bucket.clone();
        let key = key.to_string();

        let stream = result.into_stream().map(move |res| match res {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!(
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 stream download error"
                );
                Err(StorageError::DownloadFailed(e.to_string()))
            }
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_storage() -> S3Storage {
        let builder = AmazonS3Builder::new()
            .with_region("us-east-1")
            .with_bucket_name("tubely-test")
            .with_access_key_id("AKIDEXAMPLE")
            .with_secret_access_key("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY");
        S3Storage::from_builder(builder, "tubely-test".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_presign_is_local_and_scoped_to_key() {
        let storage = offline_storage();
        let location = StoredObjectLocation {
            bucket: "tubely-test".to_string(),
            key: "landscape/abc.mp4".to_string(),
        };

        let url = storage
            .presigned_get_url(&location, Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.contains("landscape/abc.mp4"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_presign_rejects_foreign_bucket() {
        let storage = offline_storage();
        let location = StoredObjectLocation {
            bucket: "someone-else".to_string(),
            key: "abc.mp4".to_string(),
        };

        let result = storage
            .presigned_get_url(&location, Duration::from_secs(60))
            .await;
        assert!(matches!(result, Err(StorageError::UnknownBucket { .. })));
    }
}
