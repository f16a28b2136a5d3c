//! Storage models: derived object keys and backend-agnostic references to stored objects.

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::video::Orientation;

/// Separator between bucket and key in the persisted reference form.
pub const REFERENCE_SEPARATOR: char = ',';

/// Storage key for an uploaded object: `[{orientation}/]{random}.{extension}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
    pub namespace: Option<Orientation>,
    pub random_component: String,
    pub extension: String,
}

impl ObjectKey {
    pub fn as_string(&self) -> String {
        self.to_string()
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if let Some(namespace) = self.namespace {
            write!(f, "{}/", namespace)?;
        }
        write!(f, "{}.{}", self.random_component, self.extension)
    }
}

/// Where an uploaded object lives. Produced by a storage backend, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObjectReference {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
}

impl StoredObjectReference {
    /// Persisted form written into a video record: `{bucket},{key}`.
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.bucket, REFERENCE_SEPARATOR, self.key)
    }

    /// Parse the persisted form. Splits at the first separator and requires
    /// both halves to be non-empty. The content type is not persisted.
    pub fn decode(encoded: &str) -> Option<StoredObjectLocation> {
        let (bucket, key) = encoded.split_once(REFERENCE_SEPARATOR)?;
        let bucket = bucket.trim();
        let key = key.trim();
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(StoredObjectLocation {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

/// Bucket and key recovered from a persisted reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl From<&StoredObjectReference> for StoredObjectLocation {
    fn from(reference: &StoredObjectReference) -> Self {
        StoredObjectLocation {
            bucket: reference.bucket.clone(),
            key: reference.key.clone(),
        }
    }
}

/// Time-bounded URL granting read access to a stored object. Derived on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPlaybackUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_display() {
        let key = ObjectKey {
            namespace: Some(Orientation::Portrait),
            random_component: "abc_-123".to_string(),
            extension: "mp4".to_string(),
        };
        assert_eq!(key.to_string(), "portrait/abc_-123.mp4");

        let bare = ObjectKey {
            namespace: None,
            random_component: "xyz".to_string(),
            extension: "png".to_string(),
        };
        assert_eq!(bare.as_string(), "xyz.png");
    }

    #[test]
    fn test_reference_encoding() {
        let reference = StoredObjectReference {
            bucket: "tubely-media".to_string(),
            key: "landscape/k.mp4".to_string(),
            content_type: "video/mp4".to_string(),
        };
        let encoded = reference.encode();
        assert_eq!(encoded, "tubely-media,landscape/k.mp4");

        let location = StoredObjectReference::decode(&encoded).unwrap();
        assert_eq!(location, StoredObjectLocation::from(&reference));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(StoredObjectReference::decode("https://cdn.example.com/k.mp4").is_none());
        assert!(StoredObjectReference::decode(",key").is_none());
        assert!(StoredObjectReference::decode("bucket,").is_none());
        assert!(StoredObjectReference::decode("").is_none());
    }
}
