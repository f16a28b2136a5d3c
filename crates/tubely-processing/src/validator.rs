use tubely_core::models::{DeclaredMediaType, MediaKind};
use tubely_core::AppError;

/// Validation errors for uploaded media
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid content type: {content_type} for {kind} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        kind: MediaKind,
        allowed: &'static [&'static str],
    },

    #[error("File too large: exceeds {max} bytes")]
    FileTooLarge { max: u64 },

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { max } => AppError::PayloadTooLarge { size_limit: max },
            other => AppError::InvalidArgument(other.to_string()),
        }
    }
}

/// Upload validator
///
/// Checks run before anything touches disk (content type) and right after
/// staging (size). The byte limit itself is enforced while copying.
#[derive(Debug, Clone, Copy)]
pub struct UploadValidator {
    kind: MediaKind,
    byte_limit: u64,
}

impl UploadValidator {
    pub fn new(kind: MediaKind, byte_limit: u64) -> Self {
        Self { kind, byte_limit }
    }

    /// Validate the declared content type, returning its normalized form.
    pub fn validate_content_type(
        &self,
        declared: Option<&str>,
    ) -> Result<DeclaredMediaType, ValidationError> {
        self.kind
            .accept(declared)
            .ok_or_else(|| ValidationError::InvalidContentType {
                content_type: declared.unwrap_or("<missing>").to_string(),
                kind: self.kind,
                allowed: self.kind.accepted_content_types(),
            })
    }

    /// Validate the size of a fully staged file
    pub fn validate_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }
        if size > self.byte_limit {
            return Err(ValidationError::FileTooLarge {
                max: self.byte_limit,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_validation() {
        let video = UploadValidator::new(MediaKind::Video, 1024);
        assert_eq!(
            video.validate_content_type(Some("video/mp4")).unwrap().as_str(),
            "video/mp4"
        );

        let err = video.validate_content_type(Some("video/webm")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidContentType { .. }));
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::InvalidArgument(_)));

        assert!(video.validate_content_type(None).is_err());
    }

    #[test]
    fn test_size_validation() {
        let thumb = UploadValidator::new(MediaKind::Thumbnail, 10);
        assert!(thumb.validate_size(10).is_ok());
        assert!(matches!(
            thumb.validate_size(0),
            Err(ValidationError::EmptyFile)
        ));

        let app_err: AppError = thumb.validate_size(11).unwrap_err().into();
        assert!(matches!(app_err, AppError::PayloadTooLarge { size_limit: 10 }));
    }
}
