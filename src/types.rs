use std::fmt;

use serde::{Deserialize, Serialize};

/// What a gallery item shows. Sources may hand back kinds this crate does not
/// know how to draw; those survive deserialization as `Other` and are rejected
/// at render time instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaKind {
    Image,
    Video,
    Other(String),
}

impl From<String> for MediaKind {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            _ => MediaKind::Other(s),
        }
    }
}

impl From<MediaKind> for String {
    fn from(kind: MediaKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => f.write_str("image"),
            MediaKind::Video => f.write_str("video"),
            MediaKind::Other(s) => f.write_str(s),
        }
    }
}

/// One unit of content as returned by a data source. `id` is opaque and only
/// used for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub kind: MediaKind,
    pub id: u64,
}

impl GalleryItem {
    pub fn image(id: u64) -> Self { Self { kind: MediaKind::Image, id } }
    pub fn video(id: u64) -> Self { Self { kind: MediaKind::Video, id } }
}
