//! Media library assets (images and documents uploaded through the admin panel).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::MediaAssetId;

/// An uploaded file hosted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: MediaAssetId,
    pub file_name: String,
    pub content_type: String,
    pub url: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl MediaAsset {
    /// Whether the asset can be shown inline as an `<img>`.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Size such as `512 B`, `14.2 KB` or `3.1 MB`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn human_size(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        match self.size_bytes {
            n if n < KB => format!("{n} B"),
            n if n < MB => format!("{:.1} KB", n as f64 / KB as f64),
            n => format!("{:.1} MB", n as f64 / MB as f64),
        }
    }
}

/// Upload/update payload for a media asset.
///
/// `data_base64` carries the file contents on upload and is `None` when only
/// metadata (the alt text) changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInput {
    pub file_name: String,
    pub content_type: String,
    pub alt_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_base64: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(content_type: &str, size_bytes: u64) -> MediaAsset {
        MediaAsset {
            id: MediaAssetId::new(1),
            file_name: "front.jpg".to_string(),
            content_type: content_type.to_string(),
            url: "https://cdn.example.com/front.jpg".to_string(),
            alt_text: String::new(),
            size_bytes,
            uploaded_at: None,
        }
    }

    #[test]
    fn test_is_image() {
        assert!(asset("image/jpeg", 1).is_image());
        assert!(!asset("application/pdf", 1).is_image());
    }

    #[test]
    fn test_human_size() {
        assert_eq!(asset("image/png", 512).human_size(), "512 B");
        assert_eq!(asset("image/png", 14_540).human_size(), "14.2 KB");
        assert_eq!(asset("image/png", 3_250_586).human_size(), "3.1 MB");
    }

    #[test]
    fn test_metadata_update_omits_data() {
        let input = MediaInput {
            file_name: "a.png".to_string(),
            content_type: "image/png".to_string(),
            alt_text: "Front view".to_string(),
            data_base64: None,
        };
        let json = serde_json::to_value(&input).unwrap_or_default();
        assert!(json.get("dataBase64").is_none());
        assert_eq!(json["altText"], "Front view");
    }
}
