use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use tubely_core::models::MediaKind;

use super::{owned_video, upload_response, VideoId};
use crate::auth::UserContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::ingest_form_field;

/// `POST /api/video_upload/{video_id}`: multipart field `video`, MP4 only.
///
/// The file is remuxed for fast start before it is stored; the response is
/// the updated record with signed playback URLs.
#[tracing::instrument(skip_all, fields(
    user_id = %user.user_id,
    video_id = %video_id.0,
    operation = "upload_video"
))]
pub async fn upload_video(
    video_id: VideoId,
    user: UserContext,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    // Ownership is checked before any of the body is read.
    owned_video(&state, video_id.0, &user).await?;

    let outcome =
        ingest_form_field(&state, MediaKind::Video, user.user_id, video_id.0, multipart).await?;

    tracing::info!(
        key = %outcome.reference.key,
        orientation = ?outcome.orientation,
        orientation_fallback = outcome.orientation_fallback,
        "Video upload complete"
    );

    Ok(Json(upload_response(&state, outcome.video).await))
}
