//! Playback URL signing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tubely_core::models::{SignedPlaybackUrl, StoredObjectLocation, StoredObjectReference, Video};
use tubely_core::AppError;
use tubely_storage::Storage;

/// Turns stored object references into time-bounded playback URLs.
///
/// Signing is pure with respect to the video record: nothing is persisted.
#[derive(Clone)]
pub struct PlaybackUrlSigner {
    storage: Arc<dyn Storage>,
}

impl PlaybackUrlSigner {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Sign a GET URL for `location` that stops working after `ttl`.
    #[tracing::instrument(skip(self), fields(bucket = %location.bucket, key = %location.key))]
    pub async fn sign(
        &self,
        location: &StoredObjectLocation,
        ttl: Duration,
    ) -> Result<SignedPlaybackUrl, AppError> {
        let max = self.storage.max_presign_ttl();
        if ttl.is_zero() || ttl > max {
            return Err(AppError::InvalidArgument(format!(
                "Playback URL lifetime must be between 1 and {} seconds",
                max.as_secs()
            )));
        }
        let ttl_chrono = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::InvalidArgument(format!("Invalid lifetime: {}", e)))?;

        let issued_at = Utc::now();
        let url = self.storage.presigned_get_url(location, ttl).await?;

        Ok(SignedPlaybackUrl {
            url,
            expires_at: issued_at + ttl_chrono,
        })
    }

    /// Replace the persisted references on `video` with signed URLs.
    ///
    /// Fields holding something other than a decodable reference are left as is.
    pub async fn sign_record(&self, mut video: Video, ttl: Duration) -> Result<Video, AppError> {
        video.video_url = self.sign_field(video.video_url.take(), ttl).await?;
        video.thumbnail_url = self.sign_field(video.thumbnail_url.take(), ttl).await?;
        Ok(video)
    }

    async fn sign_field(
        &self,
        value: Option<String>,
        ttl: Duration,
    ) -> Result<Option<String>, AppError> {
        let Some(value) = value else {
            return Ok(None);
        };
        match StoredObjectReference::decode(&value) {
            Some(location) => Ok(Some(self.sign(&location, ttl).await?.url)),
            None => {
                tracing::debug!(value = %value, "Stored reference is not signable, returning as is");
                Ok(Some(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tubely_storage::LocalStorage;
    use uuid::Uuid;

    const BASE_URL: &str = "http://localhost:8091/assets";

    async fn local_signer(dir: &std::path::Path) -> (PlaybackUrlSigner, Arc<LocalStorage>) {
        let storage = Arc::new(
            LocalStorage::new(
                dir,
                "tubely".to_string(),
                BASE_URL.to_string(),
                b"0123456789abcdef0123456789abcdef".to_vec(),
            )
            .await
            .unwrap(),
        );
        (PlaybackUrlSigner::new(storage.clone()), storage)
    }

    fn query_param<'a>(url: &'a str, name: &str) -> &'a str {
        let query = url.split_once('?').unwrap().1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{}=", name)))
            .unwrap()
    }

    fn location(key: &str) -> StoredObjectLocation {
        StoredObjectLocation {
            bucket: "tubely".to_string(),
            key: key.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_produces_verifiable_url() {
        let dir = tempdir().unwrap();
        let (signer, storage) = local_signer(dir.path()).await;
        let ttl = Duration::from_secs(3600);

        let before = Utc::now();
        let signed = signer.sign(&location("landscape/abc.mp4"), ttl).await.unwrap();
        let after = Utc::now();

        assert!(signed.url.starts_with(&format!("{}/landscape/abc.mp4?", BASE_URL)));
        assert!(signed.expires_at >= before + chrono::Duration::seconds(3600));
        assert!(signed.expires_at <= after + chrono::Duration::seconds(3600));

        let expires: i64 = query_param(&signed.url, "expires").parse().unwrap();
        let signature = query_param(&signed.url, "signature");
        storage
            .verify_signed_url("landscape/abc.mp4", expires, signature)
            .unwrap();
    }

    #[tokio::test]
    async fn test_signing_twice_grants_the_same_access() {
        let dir = tempdir().unwrap();
        let (signer, storage) = local_signer(dir.path()).await;
        let ttl = Duration::from_secs(600);
        let reference = location("portrait/xyz.mp4");

        let before = Utc::now();
        let first = signer.sign(&reference, ttl).await.unwrap();
        let second = signer.sign(&reference, ttl).await.unwrap();
        let after = Utc::now();

        for signed in [&first, &second] {
            assert!(signed.expires_at >= before);
            assert!(signed.expires_at <= after + chrono::Duration::seconds(600));

            let expires: i64 = query_param(&signed.url, "expires").parse().unwrap();
            assert!(expires <= (after + chrono::Duration::seconds(600)).timestamp());
            storage
                .verify_signed_url("portrait/xyz.mp4", expires, query_param(&signed.url, "signature"))
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_sign_rejects_bad_ttl() {
        let dir = tempdir().unwrap();
        let (signer, _) = local_signer(dir.path()).await;

        for ttl in [Duration::ZERO, Duration::from_secs(8 * 24 * 60 * 60)] {
            let err = signer.sign(&location("a.mp4"), ttl).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(_)));
        }
    }

    #[tokio::test]
    async fn test_sign_foreign_bucket_is_invalid_argument() {
        let dir = tempdir().unwrap();
        let (signer, _) = local_signer(dir.path()).await;

        let foreign = StoredObjectLocation {
            bucket: "someone-else".to_string(),
            key: "a.mp4".to_string(),
        };
        let err = signer
            .sign(&foreign, Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_sign_record_rewrites_references_only() {
        let dir = tempdir().unwrap();
        let (signer, _) = local_signer(dir.path()).await;

        let mut video = Video::new(Uuid::new_v4(), "Boots".to_string(), String::new());
        video.video_url = Some("tubely,portrait/xyz.mp4".to_string());
        video.thumbnail_url = Some("not-a-reference".to_string());

        let signed = signer
            .sign_record(video.clone(), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(signed
            .video_url
            .as_deref()
            .unwrap()
            .starts_with(&format!("{}/portrait/xyz.mp4?expires=", BASE_URL)));
        assert_eq!(signed.thumbnail_url.as_deref(), Some("not-a-reference"));
        assert_eq!(signed.id, video.id);
        // The input record is never touched
        assert_eq!(video.video_url.as_deref(), Some("tubely,portrait/xyz.mp4"));
    }

    #[tokio::test]
    async fn test_sign_record_without_references() {
        let dir = tempdir().unwrap();
        let (signer, _) = local_signer(dir.path()).await;

        let video = Video::new(Uuid::new_v4(), "Empty".to_string(), String::new());
        let signed = signer
            .sign_record(video, Duration::from_secs(60))
            .await
            .unwrap();
        assert!(signed.video_url.is_none());
        assert!(signed.thumbnail_url.is_none());
    }
}
