//! Metadata for an uploaded product image.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// A single uploaded image attached to a draft.
///
/// The record stores metadata only; payload bytes live on disk under the
/// intake service's base path. Each payload is removed exactly once — on
/// explicit image delete, or when the owning draft is torn down.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Internal UUID, also the public handle in the content URL.
    pub id: Uuid,

    /// Draft this image belongs to.
    pub draft_id: Uuid,

    /// Original filename of the uploaded file.
    pub filename: String,

    /// Content type (MIME type) reported at upload.
    pub content_type: String,

    /// Size in bytes.
    pub size_bytes: i64,

    /// MD5 checksum of the payload.
    pub etag: String,

    /// Visual-keyword tags. Currently a stub: one tag naming the media
    /// type, standing in for real image-recognition output.
    pub visual_keywords: Json<Vec<String>>,

    /// Timestamp when the image was uploaded.
    pub created_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Dereferenceable content URL served by `GET /images/{id}`.
    pub fn url(&self) -> String {
        format!("/images/{}", self.id)
    }
}

/// Placeholder visual keywords for an upload, derived from its media type.
pub fn stub_visual_keywords(content_type: &str) -> Vec<String> {
    vec![format!("{} image", content_type)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_keywords_name_the_media_type() {
        assert_eq!(stub_visual_keywords("image/jpeg"), vec!["image/jpeg image"]);
    }

    #[test]
    fn url_points_at_the_image_route() {
        let id = Uuid::new_v4();
        let record = ImageRecord {
            id,
            draft_id: Uuid::new_v4(),
            filename: "chair.jpg".into(),
            content_type: "image/jpeg".into(),
            size_bytes: 1024,
            etag: "d41d8cd98f00b204e9800998ecf8427e".into(),
            visual_keywords: Json(stub_visual_keywords("image/jpeg")),
            created_at: Utc::now(),
        };
        assert_eq!(record.url(), format!("/images/{}", id));
    }
}
