use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tubely_core::{AppError, ErrorMetadata};

use super::jwt::JwtKeys;
use super::models::{AuthFailure, UserContext};

/// Read the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Couldn't find JWT".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".to_string()))
}

/// Verify the bearer token and record the outcome in request extensions.
///
/// The request always continues: handlers reject through the [`UserContext`]
/// extractor, which keeps a malformed path id reported before a bad token.
pub async fn auth_middleware(
    State(keys): State<Arc<JwtKeys>>,
    mut request: Request,
    next: Next,
) -> Response {
    let outcome = bearer_token(request.headers()).and_then(|token| keys.verify(token));
    match outcome {
        Ok(user_id) => {
            tracing::debug!(user_id = %user_id, "Request authenticated");
            request.extensions_mut().insert(UserContext { user_id });
        }
        Err(e) => {
            tracing::debug!(error = %e, "Request not authenticated");
            request
                .extensions_mut()
                .insert(AuthFailure(e.client_message()));
        }
    }

    next.run(request).await
}
