//! Key validation shared by all storage backends.

use crate::traits::{StorageError, StorageResult};
use tubely_core::models::REFERENCE_SEPARATOR;

/// Reject keys that could escape a backend's root or break reference encoding.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    if key.contains(REFERENCE_SEPARATOR) {
        return Err(StorageError::InvalidKey(format!(
            "Storage key must not contain '{}'",
            REFERENCE_SEPARATOR
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("landscape/abc.mp4").is_ok());
        assert!(validate_key("abc.png").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("a,b.mp4").is_err());
    }
}
