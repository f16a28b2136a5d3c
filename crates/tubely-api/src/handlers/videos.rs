use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tubely_core::models::{CreateVideoRequest, Video};
use tubely_core::AppError;

use super::{owned_video, VideoId};
use crate::auth::UserContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

const MAX_TITLE_LENGTH: usize = 256;

#[tracing::instrument(skip_all, fields(user_id = %user.user_id, operation = "create_video"))]
pub async fn create_video(
    user: UserContext,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidArgument("Title is required".to_string()).into());
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::InvalidArgument(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        ))
        .into());
    }

    let video = Video::new(user.user_id, title.to_string(), request.description);
    let created = state.videos.create(&video).await?;

    tracing::info!(video_id = %created.id, "Video draft created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(skip_all, fields(user_id = %user.user_id, operation = "list_videos"))]
pub async fn list_videos(
    user: UserContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state.videos.list_by_owner(user.user_id).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list videos");
        HttpAppError::from(e)
    })?;

    let ttl = state.config.playback_url_ttl();
    let mut signed = Vec::with_capacity(videos.len());
    for video in videos {
        signed.push(state.signer.sign_record(video, ttl).await?);
    }

    Ok(Json(signed))
}

#[tracing::instrument(skip_all, fields(
    user_id = %user.user_id,
    video_id = %video_id.0,
    operation = "get_video"
))]
pub async fn get_video(
    video_id: VideoId,
    user: UserContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = owned_video(&state, video_id.0, &user).await?;
    let signed = state
        .signer
        .sign_record(video, state.config.playback_url_ttl())
        .await?;
    Ok(Json(signed))
}
