//! In-process repository used when no database is configured.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tubely_core::models::{MediaKind, Video};
use tubely_core::AppError;
use uuid::Uuid;

use super::video::VideoRepository;

#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<Uuid, Video>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create(&self, video: &Video) -> Result<Video, AppError> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(AppError::InvalidArgument(format!(
                "Video {} already exists",
                video.id
            )));
        }
        videos.insert(video.id, video.clone());
        Ok(video.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Video>, AppError> {
        let videos = self.videos.read().await;
        let mut owned: Vec<Video> = videos
            .values()
            .filter(|v| v.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn set_reference(
        &self,
        id: Uuid,
        owner_id: Uuid,
        kind: MediaKind,
        encoded: &str,
    ) -> Result<Video, AppError> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(&id) {
            Some(stored) if stored.owner_id == owner_id => {
                let slot = match kind {
                    MediaKind::Video => &mut stored.video_url,
                    MediaKind::Thumbnail => &mut stored.thumbnail_url,
                };
                *slot = Some(encoded.to_string());
                stored.updated_at = Utc::now();
                Ok(stored.clone())
            }
            _ => Err(AppError::NotFound(format!("Video {} not found", id))),
        }
    }
}
