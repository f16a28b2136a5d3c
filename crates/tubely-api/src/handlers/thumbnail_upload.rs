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

/// `POST /api/thumbnail_upload/{video_id}`: multipart field `thumbnail`, JPEG or PNG.
#[tracing::instrument(skip_all, fields(
    user_id = %user.user_id,
    video_id = %video_id.0,
    operation = "upload_thumbnail"
))]
pub async fn upload_thumbnail(
    video_id: VideoId,
    user: UserContext,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    owned_video(&state, video_id.0, &user).await?;

    let outcome = ingest_form_field(
        &state,
        MediaKind::Thumbnail,
        user.user_id,
        video_id.0,
        multipart,
    )
    .await?;

    tracing::info!(key = %outcome.reference.key, "Thumbnail upload complete");

    Ok(Json(upload_response(&state, outcome.video).await))
}
