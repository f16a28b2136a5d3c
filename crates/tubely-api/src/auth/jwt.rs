//! HS256 JWT verification (and issuance for tooling and tests)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tubely_core::AppError;
use uuid::Uuid;

use super::models::JwtClaims;

/// Issuer written into and required from every token.
pub const TOKEN_ISSUER: &str = "tubely";

/// Keys derived once from `JWT_SECRET`.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate `token` and return the owner id carried in `sub`.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let token_data =
            decode::<JwtClaims>(token, &self.decoding, &self.validation).map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AppError::Unauthorized("Invalid token issuer".to_string())
                    }
                    _ => AppError::Unauthorized("Couldn't validate JWT".to_string()),
                }
            })?;

        Uuid::parse_str(&token_data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }

    /// Sign a token for `owner_id` valid for `expires_in`.
    pub fn issue(&self, owner_id: Uuid, expires_in: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: owner_id.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }
}
