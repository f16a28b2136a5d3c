//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into `AppError` (storage and validation errors included) becomes an
//! `HttpAppError` through `?` and renders with one body shape and one log line.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tubely_core::{AppError, ErrorMetadata, LogLevel};
use tubely_processing::ValidationError;
use tubely_storage::StorageError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper so `AppError` (defined in tubely-core) can implement `IntoResponse`.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// JSON body deserialization failures become a 400 in our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidArgument(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// `Json<T>` that rejects with [`HttpAppError`] instead of axum's plain-text 4xx.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.eq_ignore_ascii_case("production") || env.eq_ignore_ascii_case("prod"))
        .unwrap_or(false)
}

impl HttpAppError {
    fn to_error_response(&self, include_details: bool) -> ErrorResponse {
        let app_error = &self.0;
        ErrorResponse {
            error: app_error.client_message(),
            details: include_details.then(|| app_error.detailed_message()),
            error_type: include_details.then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        // Details never leave the process in production or for sensitive kinds.
        let include_details = !is_production_env() && !self.0.is_sensitive();
        (status, Json(self.to_error_response(include_details))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_map_through_app_error() {
        let HttpAppError(app_err) = StorageError::NotFound("a.mp4".to_string()).into();
        assert!(matches!(app_err, AppError::NotFound(_)));

        let HttpAppError(app_err) = StorageError::InvalidSignature.into();
        assert!(matches!(app_err, AppError::Unauthorized(_)));

        let HttpAppError(app_err) = StorageError::UploadFailed("reset".to_string()).into();
        assert!(matches!(app_err, AppError::StorageUnavailable(_)));
    }

    #[test]
    fn test_validation_error_maps_to_payload_too_large() {
        let HttpAppError(app_err) = ValidationError::FileTooLarge { max: 10 }.into();
        assert!(matches!(app_err, AppError::PayloadTooLarge { size_limit: 10 }));
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let err = HttpAppError(AppError::ProcessingFailed(
            "ffmpeg: moov atom not found".to_string(),
        ));
        let body = err.to_error_response(!err.0.is_sensitive());
        assert_eq!(body.code, "PROCESSING_FAILED");
        assert!(body.details.is_none());
        assert!(!body.error.contains("moov"));
    }

    #[test]
    fn test_error_response_shape() {
        let err = HttpAppError(AppError::NotFound("Video not found".to_string()));
        let json = serde_json::to_value(err.to_error_response(true)).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["recoverable"], false);
        assert_eq!(json["error_type"], "NotFound");
        assert!(json["details"].as_str().is_some());
    }
}
