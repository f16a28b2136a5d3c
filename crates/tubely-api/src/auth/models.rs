use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use tubely_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // owner id
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller, placed in request extensions by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: Uuid,
}

/// Why the auth middleware did not produce a [`UserContext`].
#[derive(Debug, Clone)]
pub struct AuthFailure(pub String);

// Extracted from parts so handlers taking `Multipart` can use it, and so it
// runs after path extraction in handler argument order.
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<UserContext>() {
            return Ok(*user);
        }

        let reason = parts
            .extensions
            .get::<AuthFailure>()
            .map(|f| f.0.clone())
            .unwrap_or_else(|| "Couldn't find JWT".to_string());
        Err(HttpAppError(AppError::Unauthorized(reason)))
    }
}
