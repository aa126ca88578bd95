use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    /// Classifies a MIME content type by prefix.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            Self::Image
        } else if content_type.starts_with("video/") {
            Self::Video
        } else {
            Self::Other
        }
    }
}

/// One file of the remote collection.
///
/// Immutable once received, except for `tags`, which is replaced wholesale
/// after a successful edit.
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub id: String,
    pub filename: String,
    pub kind: MediaKind,
    pub content_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub url: String,
    pub tags: Vec<String>,
}

impl MediaItem {
    /// Check if this renders as a still image
    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }

    /// Check if this renders as a video
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

/// One entry of the server's tag list. Loaded wholesale, never paginated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagEntry {
    pub name: String,
    pub count: u64,
}
