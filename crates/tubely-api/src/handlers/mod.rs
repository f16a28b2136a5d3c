//! HTTP handlers

pub mod assets;
pub mod health;
pub mod thumbnail_upload;
pub mod video_upload;
pub mod videos;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use tubely_core::models::Video;
use tubely_core::AppError;
use uuid::Uuid;

use crate::auth::UserContext;
use crate::error::HttpAppError;
use crate::state::AppState;

/// `{video_id}` path segment parsed as a UUID.
///
/// Rejects with a JSON 400 before the caller's token is looked at.
#[derive(Debug, Clone, Copy)]
pub struct VideoId(pub Uuid);

impl<S> FromRequestParts<S> for VideoId
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidArgument(format!("Invalid ID: {}", e.body_text())))?;
        let id = Uuid::parse_str(&raw).map_err(AppError::from)?;
        Ok(VideoId(id))
    }
}

/// Load a video and make sure `user` owns it.
pub async fn owned_video(
    state: &AppState,
    video_id: Uuid,
    user: &UserContext,
) -> Result<Video, AppError> {
    let video = state
        .videos
        .get(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find the video".to_string()))?;

    if !video.is_owned_by(user.user_id) {
        return Err(AppError::Unauthorized(
            "Video doesn't belong to the current user".to_string(),
        ));
    }
    Ok(video)
}

/// Sign the record returned by an upload.
///
/// The upload is already committed at this point, so a signing failure is
/// logged and the stored references are returned unsigned.
pub async fn upload_response(state: &AppState, video: Video) -> Video {
    match state
        .signer
        .sign_record(video.clone(), state.config.playback_url_ttl())
        .await
    {
        Ok(signed) => signed,
        Err(e) => {
            tracing::warn!(
                error = %e,
                video_id = %video.id,
                "Failed to sign playback URLs after upload, returning stored references"
            );
            video
        }
    }
}
