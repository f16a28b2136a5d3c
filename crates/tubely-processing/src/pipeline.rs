//! Ingest pipeline: one upload from inbound stream to committed reference.
//!
//! Video: validate → stage → inspect → remux → derive key → upload → commit.
//! Thumbnail: validate → stage → derive key → upload → commit.
//!
//! Every scratch file is a [`StagedFile`] owned by the running future, so
//! dropping the future (client disconnect, deadline) removes them. The commit
//! step runs on its own task once the object is uploaded, so a cancelled
//! request never leaves an uploaded object without a metadata reference.

use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use tubely_core::models::{MediaKind, Orientation, StoredObjectReference, Video};
use tubely_core::{AppError, Config};
use tubely_db::VideoRepository;
use tubely_storage::Storage;
use uuid::Uuid;

use crate::inspector::ContainerInspector;
use crate::keys::{KeyDeriver, KeySource};
use crate::process::ProcessRunner;
use crate::remux::FastStartRemuxer;
use crate::stager::{StagedFile, StreamStager};
use crate::validator::UploadValidator;

/// Pipeline settings taken from [`Config`] at startup.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub scratch_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Deadline for a whole ingestion, staging through commit.
    pub upload_timeout: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            scratch_dir: config.scratch_dir(),
            ffmpeg_path: config.ffmpeg_path().to_string(),
            ffprobe_path: config.ffprobe_path().to_string(),
            upload_timeout: config.upload_timeout(),
        }
    }
}

/// One ingestion call. The stream may borrow from the inbound request.
pub struct UploadRequest<'a> {
    pub owner_id: Uuid,
    pub video_id: Uuid,
    pub declared_content_type: Option<String>,
    pub stream: Pin<Box<dyn AsyncRead + Send + Unpin + 'a>>,
    /// Streams longer than this fail; they are never truncated.
    pub byte_limit: u64,
}

impl std::fmt::Debug for UploadRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("owner_id", &self.owner_id)
            .field("video_id", &self.video_id)
            .field("declared_content_type", &self.declared_content_type)
            .field("byte_limit", &self.byte_limit)
            .finish_non_exhaustive()
    }
}

/// Result of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The record as committed, holding the encoded reference.
    pub video: Video,
    pub reference: StoredObjectReference,
    /// `None` for thumbnails and when inspection failed.
    pub orientation: Option<Orientation>,
    /// Inspection failed and the key was left unnamespaced.
    pub orientation_fallback: bool,
    pub key_source: KeySource,
}

#[derive(Clone)]
pub struct IngestPipeline {
    repository: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    stager: StreamStager,
    inspector: ContainerInspector,
    remuxer: FastStartRemuxer,
    keys: KeyDeriver,
    upload_timeout: Duration,
}

impl IngestPipeline {
    pub fn new(
        repository: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        runner: Arc<dyn ProcessRunner>,
        settings: PipelineSettings,
    ) -> Self {
        let stager = StreamStager::new(settings.scratch_dir);
        Self {
            repository,
            storage,
            inspector: ContainerInspector::new(runner.clone(), settings.ffprobe_path),
            remuxer: FastStartRemuxer::new(runner, settings.ffmpeg_path, stager.clone()),
            stager,
            keys: KeyDeriver::default(),
            upload_timeout: settings.upload_timeout,
        }
    }

    /// Replace the key deriver (tests force the fallback branch with this).
    pub fn with_key_deriver(mut self, keys: KeyDeriver) -> Self {
        self.keys = keys;
        self
    }

    /// Ingest an MP4 for `request.video_id` and point its `video_url` at it.
    pub async fn ingest_video(
        &self,
        request: UploadRequest<'_>,
        cancel: CancellationToken,
    ) -> Result<IngestOutcome, AppError> {
        self.run_bounded(MediaKind::Video, request, cancel).await
    }

    /// Ingest a JPEG or PNG and point the record's `thumbnail_url` at it.
    pub async fn ingest_thumbnail(
        &self,
        request: UploadRequest<'_>,
        cancel: CancellationToken,
    ) -> Result<IngestOutcome, AppError> {
        self.run_bounded(MediaKind::Thumbnail, request, cancel).await
    }

    async fn run_bounded(
        &self,
        kind: MediaKind,
        request: UploadRequest<'_>,
        cancel: CancellationToken,
    ) -> Result<IngestOutcome, AppError> {
        let video_id = request.video_id;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(video_id = %video_id, kind = %kind, "Ingestion cancelled");
                Err(AppError::Cancelled("Upload cancelled".to_string()))
            }
            result = tokio::time::timeout(self.upload_timeout, self.ingest(kind, request)) => {
                result.unwrap_or_else(|_| {
                    tracing::warn!(
                        video_id = %video_id,
                        kind = %kind,
                        timeout_secs = self.upload_timeout.as_secs(),
                        "Ingestion deadline exceeded"
                    );
                    Err(AppError::Cancelled(format!(
                        "Upload did not finish within {} seconds",
                        self.upload_timeout.as_secs()
                    )))
                })
            }
        }
    }

    #[tracing::instrument(skip(self, kind, request), fields(
        video_id = %request.video_id,
        owner_id = %request.owner_id,
        kind = %kind
    ))]
    async fn ingest(
        &self,
        kind: MediaKind,
        request: UploadRequest<'_>,
    ) -> Result<IngestOutcome, AppError> {
        let start = Instant::now();

        let video = self
            .repository
            .get(request.video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", request.video_id)))?;
        if !video.is_owned_by(request.owner_id) {
            return Err(AppError::Unauthorized(
                "Not authorized to update this video".to_string(),
            ));
        }

        let validator = UploadValidator::new(kind, request.byte_limit);
        let media_type = validator.validate_content_type(request.declared_content_type.as_deref())?;

        let staged = self
            .stager
            .stage(
                request.stream,
                request.byte_limit,
                &format!(".{}", media_type.extension()),
            )
            .await?;
        validator.validate_size(staged.size_bytes())?;

        let (upload_file, orientation, orientation_fallback) = match kind {
            MediaKind::Video => self.prepare_video(staged).await?,
            MediaKind::Thumbnail => (staged, None, false),
        };

        let derivation = self
            .keys
            .derive_key(media_type.extension(), orientation, video.id);
        let key = derivation.key.as_string();

        let reader = upload_file.open().await?;
        let reference = self
            .storage
            .upload_stream(
                &key,
                media_type.as_str(),
                Some(upload_file.size_bytes()),
                Box::pin(reader),
            )
            .await?;
        let size_bytes = upload_file.size_bytes();
        drop(upload_file);

        let video = self.commit(kind, &video, &reference).await?;

        tracing::info!(
            key = %reference.key,
            bucket = %reference.bucket,
            size_bytes,
            orientation_fallback,
            key_fallback = derivation.source.is_fallback(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Media ingested"
        );

        Ok(IngestOutcome {
            video,
            reference,
            orientation,
            orientation_fallback,
            key_source: derivation.source,
        })
    }

    /// Inspect then remux. Only remux failure is fatal.
    async fn prepare_video(
        &self,
        staged: StagedFile,
    ) -> Result<(StagedFile, Option<Orientation>, bool), AppError> {
        let (orientation, fallback) = match self.inspector.inspect_orientation(&staged).await {
            Ok(orientation) => (Some(orientation), false),
            Err(e) => {
                tracing::warn!(error = %e, "Orientation unavailable, storing without namespace");
                (None, true)
            }
        };

        let remuxed = self.remuxer.remux_for_streaming(&staged).await?;
        drop(staged);
        Ok((remuxed, orientation, fallback))
    }

    /// Record the reference on the video. Only the column for `kind` is
    /// written, so a concurrent upload of the other kind keeps its reference.
    /// If the update fails the uploaded object is deleted again.
    async fn commit(
        &self,
        kind: MediaKind,
        video: &Video,
        reference: &StoredObjectReference,
    ) -> Result<Video, AppError> {
        let repository = self.repository.clone();
        let storage = self.storage.clone();
        let (id, owner_id) = (video.id, video.owner_id);
        let encoded = reference.encode();
        let key = reference.key.clone();

        let task = tokio::spawn(async move {
            match repository.set_reference(id, owner_id, kind, &encoded).await {
                Ok(updated) => Ok(updated),
                Err(e) => {
                    tracing::error!(error = %e, key = %key, "Metadata update failed, removing uploaded object");
                    if let Err(delete_err) = storage.delete(&key).await {
                        tracing::error!(error = %delete_err, key = %key, "Failed to remove orphaned object");
                    }
                    Err(e)
                }
            }
        });

        task.await
            .map_err(|e| AppError::Internal(format!("Metadata commit task failed: {}", e)))?
    }
}
