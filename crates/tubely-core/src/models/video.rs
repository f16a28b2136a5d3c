use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;
const RATIO_TOLERANCE: f64 = 0.1;

/// Visual orientation of a video, derived from its first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Classify by aspect ratio. Landscape is tested before portrait.
    pub fn classify(width: u32, height: u32) -> Orientation {
        if width == 0 || height == 0 {
            return Orientation::Other;
        }
        let ratio = f64::from(width) / f64::from(height);
        if (ratio - LANDSCAPE_RATIO).abs() < RATIO_TOLERANCE {
            Orientation::Landscape
        } else if (ratio - PORTRAIT_RATIO).abs() < RATIO_TOLERANCE {
            Orientation::Portrait
        } else {
            Orientation::Other
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Other => write!(f, "other"),
        }
    }
}

/// Video metadata record.
///
/// `video_url` and `thumbnail_url` hold encoded stored-object references
/// (`{bucket},{key}`) at rest. Read paths replace them with signed URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Video {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn new(owner_id: Uuid, title: String, description: String) -> Self {
        let now = Utc::now();
        Video {
            id: Uuid::new_v4(),
            owner_id,
            title,
            description,
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, owner_id: Uuid) -> bool {
        self.owner_id == owner_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}
