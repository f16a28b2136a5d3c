//! Signed object serving for the local storage backend.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tubely_core::AppError;

use crate::constants::ASSET_CACHE_MAX_AGE_SECS;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignedAssetQuery {
    pub expires: Option<i64>,
    pub signature: Option<String>,
}

/// Content type from the key's extension. Keys always end in the stored subtype.
fn content_type_for_key(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "mp4" => "video/mp4",
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "jpeg" || ext == "jpg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// `GET /assets/{*key}?expires=&signature=`
#[tracing::instrument(skip_all, fields(key = %key, operation = "serve_asset"))]
pub async fn serve_asset(
    Path(key): Path<String>,
    Query(query): Query<SignedAssetQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let (Some(expires), Some(signature)) = (query.expires, query.signature) else {
        return Err(AppError::Unauthorized("Missing URL signature".to_string()).into());
    };

    state.storage.verify_signed_url(&key, expires, &signature)?;
    let stream = state.storage.download_stream(&key).await?;

    let max_age = (expires - Utc::now().timestamp()).clamp(0, ASSET_CACHE_MAX_AGE_SECS as i64);
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for_key(&key).to_string()),
            (header::CACHE_CONTROL, format!("private, max-age={}", max_age)),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
