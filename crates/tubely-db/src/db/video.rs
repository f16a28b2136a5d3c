//! Video repository: CRUD for the videos table.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tubely_core::models::{MediaKind, Video};
use tubely_core::AppError;
use uuid::Uuid;

/// Metadata store for video records.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Insert a new record and return it as stored.
    async fn create(&self, video: &Video) -> Result<Video, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// All records owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Video>, AppError>;

    /// Point the `kind` reference of a record at `encoded` and return the
    /// record as stored afterwards.
    ///
    /// Only that column and `updated_at` change. A row must match both `id`
    /// and `owner_id`; otherwise the call fails with `NotFound` and nothing
    /// changes.
    async fn set_reference(
        &self,
        id: Uuid,
        owner_id: Uuid,
        kind: MediaKind,
        encoded: &str,
    ) -> Result<Video, AppError>;
}

/// Postgres-backed repository
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const VIDEO_COLUMNS: &str =
    "id, owner_id, title, description, thumbnail_url, video_url, created_at, updated_at";

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.record_id = %video.id))]
    async fn create(&self, video: &Video) -> Result<Video, AppError> {
        let row: Video = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            INSERT INTO videos (id, owner_id, title, description, thumbnail_url, video_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(video.id)
        .bind(video.owner_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.created_at)
        .bind(video.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let row: Option<Video> = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", owner_id = %owner_id))]
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Video>, AppError> {
        let rows: Vec<Video> = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self, encoded), fields(db.table = "videos", db.record_id = %id, kind = %kind))]
    async fn set_reference(
        &self,
        id: Uuid,
        owner_id: Uuid,
        kind: MediaKind,
        encoded: &str,
    ) -> Result<Video, AppError> {
        let column = reference_column(kind);
        let row: Option<Video> = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            UPDATE videos
            SET {column} = $3, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(encoded)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))
    }
}

fn reference_column(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "video_url",
        MediaKind::Thumbnail => "thumbnail_url",
    }
}
