use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// What an upload is for. Each kind accepts a fixed set of content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Thumbnail,
}

impl MediaKind {
    /// Multipart field name carrying the file for this kind.
    pub fn form_field(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Thumbnail => "thumbnail",
        }
    }

    pub fn accepted_content_types(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Video => &["video/mp4"],
            MediaKind::Thumbnail => &["image/jpeg", "image/png"],
        }
    }

    /// Normalize a declared content type and check it against this kind.
    ///
    /// Parameters such as `; charset=binary` are stripped and the comparison is
    /// case-insensitive. `None` when the type is missing or not accepted.
    pub fn accept(&self, declared: Option<&str>) -> Option<DeclaredMediaType> {
        let essence = essence(declared?);
        self.accepted_content_types()
            .contains(&essence.as_str())
            .then_some(DeclaredMediaType { essence })
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Thumbnail => write!(f, "thumbnail"),
        }
    }
}

/// A content type that passed [`MediaKind::accept`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredMediaType {
    essence: String,
}

impl DeclaredMediaType {
    pub fn as_str(&self) -> &str {
        &self.essence
    }

    /// Storage key extension: the media subtype (`mp4`, `jpeg`, `png`).
    pub fn extension(&self) -> &str {
        self.essence
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .unwrap_or(&self.essence)
    }
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_accepts_jpeg_and_png() {
        let jpeg = MediaKind::Thumbnail.accept(Some("image/jpeg")).unwrap();
        assert_eq!(jpeg.extension(), "jpeg");

        let png = MediaKind::Thumbnail.accept(Some("IMAGE/PNG")).unwrap();
        assert_eq!(png.as_str(), "image/png");
        assert_eq!(png.extension(), "png");
    }

    #[test]
    fn test_video_accepts_mp4_with_parameters() {
        let mp4 = MediaKind::Video
            .accept(Some("video/mp4; codecs=\"avc1.42E01E\""))
            .unwrap();
        assert_eq!(mp4.as_str(), "video/mp4");
        assert_eq!(mp4.extension(), "mp4");
    }

    #[test]
    fn test_rejects_other_types() {
        for declared in [Some("image/gif"), Some("video/quicktime"), Some(""), None] {
            assert!(MediaKind::Video.accept(declared).is_none());
        }
        assert!(MediaKind::Thumbnail.accept(Some("video/mp4")).is_none());
        assert!(MediaKind::Video.accept(Some("image/png")).is_none());
    }
}
