//! Multipart upload plumbing shared by the video and thumbnail handlers

use std::io;
use std::pin::Pin;

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use futures::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use tubely_core::models::MediaKind;
use tubely_core::AppError;
use tubely_processing::{IngestOutcome, UploadRequest};
use uuid::Uuid;

use crate::state::AppState;

/// Adapt a multipart field into a byte reader without buffering it.
pub fn field_reader<'a>(field: Field<'a>) -> Pin<Box<dyn AsyncRead + Send + Unpin + 'a>> {
    let chunks = field.map_err(io::Error::other);
    Box::pin(StreamReader::new(Box::pin(chunks)))
}

/// Find the form field for `kind` and run it through the ingest pipeline.
///
/// Fields with other names are skipped. The cancellation token fires if the
/// handler future is dropped, e.g. when the client disconnects.
pub async fn ingest_form_field(
    state: &AppState,
    kind: MediaKind,
    owner_id: Uuid,
    video_id: Uuid,
    mut multipart: Multipart,
) -> Result<IngestOutcome, AppError> {
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let byte_limit = match kind {
        MediaKind::Video => state.config.max_video_size_bytes(),
        MediaKind::Thumbnail => state.config.max_thumbnail_size_bytes(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidArgument(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(kind.form_field()) {
            continue;
        }

        let request = UploadRequest {
            owner_id,
            video_id,
            declared_content_type: field.content_type().map(str::to_string),
            stream: field_reader(field),
            byte_limit,
        };

        return match kind {
            MediaKind::Video => state.pipeline.ingest_video(request, cancel).await,
            MediaKind::Thumbnail => state.pipeline.ingest_thumbnail(request, cancel).await,
        };
    }

    Err(AppError::InvalidArgument(format!(
        "Couldn't load file from the request: missing '{}' field",
        kind.form_field()
    )))
}
