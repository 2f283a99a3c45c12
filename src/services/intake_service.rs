//! src/services/intake_service.rs
//!
//! IntakeService — image upload handling backed by SQLite for metadata and
//! local disk for payload bytes, sharded beneath
//! `base_path/{shard}/{shard}/{id}`. Every stored payload is released
//! exactly once: the metadata row is the gate, and the file removal
//! follows the row deletion.

use crate::models::image::{ImageRecord, stub_visual_keywords};
use bytes::Bytes;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

const MAX_FILENAME_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("image `{0}` not found")]
    ImageNotFound(Uuid),
    #[error("invalid filename: {0}")]
    InvalidFilename(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type IntakeResult<T> = Result<T, IntakeError>;

/// IntakeService provides the image half of the listing workflow:
/// - Store an upload (write bytes to disk, insert metadata into SQLite)
/// - Open an image (metadata from SQLite, payload handle from disk)
/// - List a draft's images in upload order
/// - Delete an image (row first, then payload, exactly once)
#[derive(Clone)]
pub struct IntakeService {
    /// Shared SQLite connection pool used for metadata operations.
    pub db: Arc<SqlitePool>,

    /// Base directory on disk where image payloads are stored.
    pub base_path: PathBuf,
}

impl IntakeService {
    /// Create a new IntakeService backed by the provided SQLite pool and
    /// using `base_path` as the root directory for image payloads.
    pub fn new(db: Arc<SqlitePool>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            db,
            base_path: base_path.into(),
        }
    }

    /// Reject filenames that are empty, oversized, or carry path
    /// components. The filename is display metadata only — payloads are
    /// addressed by UUID — but a hostile name must never reach a header
    /// or an export.
    fn ensure_filename_safe(&self, filename: &str) -> IntakeResult<()> {
        if filename.is_empty() || filename.len() > MAX_FILENAME_LEN {
            return Err(IntakeError::InvalidFilename(filename.to_string()));
        }
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(IntakeError::InvalidFilename(filename.to_string()));
        }
        if filename.bytes().any(|b| b.is_ascii_control()) {
            return Err(IntakeError::InvalidFilename(filename.to_string()));
        }
        Ok(())
    }

    /// Generate two-level shard identifiers for an image id.
    ///
    /// Uses MD5(id) and returns the first two bytes as lowercase
    /// hexadecimal strings (00–ff). Reduces file count per directory.
    fn shards(id: &Uuid) -> (String, String) {
        let digest = md5::compute(id.to_string());
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    /// Construct a fully-qualified payload path:
    /// base_path/{shard}/{shard}/{id}.
    fn image_path(&self, id: &Uuid) -> PathBuf {
        let (shard_a, shard_b) = Self::shards(id);
        let mut path = self.base_path.clone();
        path.push(shard_a);
        path.push(shard_b);
        path.push(id.to_string());
        path
    }

    /// Store one uploaded image and return its metadata record.
    ///
    /// - Writes bytes to a temporary file, digesting while writing.
    /// - Syncs and atomically renames into the final sharded location.
    /// - Inserts the metadata row; removes the payload again if the
    ///   insert fails, so disk and metadata cannot drift apart.
    ///
    /// Visual keywords are the media-type stub until a real recognition
    /// backend exists.
    pub async fn store_image(
        &self,
        draft_id: Uuid,
        filename: &str,
        content_type: &str,
        payload: Bytes,
    ) -> IntakeResult<ImageRecord> {
        self.ensure_filename_safe(filename)?;

        let id = Uuid::new_v4();
        let file_path = self.image_path(&id);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            IntakeError::Io(io::Error::new(
                ErrorKind::Other,
                "image path missing parent directory",
            ))
        })?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", id));
        let mut file = File::create(&tmp_path).await?;
        let etag = format!("{:x}", md5::compute(&payload));
        let size_bytes = payload.len() as i64;
        if let Err(err) = file.write_all(&payload).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(IntakeError::Io(err));
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(IntakeError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(IntakeError::Io(err));
        }
        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(IntakeError::Io(err));
        }

        let record = ImageRecord {
            id,
            draft_id,
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            size_bytes,
            etag,
            visual_keywords: Json(stub_visual_keywords(content_type)),
            created_at: Utc::now(),
        };

        let insert_result = sqlx::query(
            "INSERT INTO images (id, draft_id, filename, content_type, size_bytes, etag, \
             visual_keywords, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.draft_id)
        .bind(&record.filename)
        .bind(&record.content_type)
        .bind(record.size_bytes)
        .bind(&record.etag)
        .bind(&record.visual_keywords)
        .bind(record.created_at)
        .execute(&*self.db)
        .await;

        match insert_result {
            Ok(_) => Ok(record),
            Err(err) => {
                let _ = fs::remove_file(&file_path).await;
                Err(IntakeError::Sqlx(err))
            }
        }
    }

    /// Fetch an image's metadata.
    pub async fn get_image(&self, id: Uuid) -> IntakeResult<ImageRecord> {
        sqlx::query_as::<_, ImageRecord>(
            "SELECT id, draft_id, filename, content_type, size_bytes, etag, \
             visual_keywords, created_at FROM images WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => IntakeError::ImageNotFound(id),
            other => IntakeError::Sqlx(other),
        })
    }

    /// Fetch an image for reading: metadata plus an opened file handle
    /// ready for streaming out. A metadata row whose payload is missing
    /// reports ImageNotFound rather than a bare I/O error.
    pub async fn open_image(&self, id: Uuid) -> IntakeResult<(ImageRecord, File)> {
        let record = self.get_image(id).await?;
        let file = File::open(self.image_path(&id)).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                IntakeError::ImageNotFound(id)
            } else {
                IntakeError::Io(err)
            }
        })?;
        Ok((record, file))
    }

    /// List a draft's images in upload order.
    pub async fn list_images(&self, draft_id: Uuid) -> IntakeResult<Vec<ImageRecord>> {
        Ok(sqlx::query_as::<_, ImageRecord>(
            "SELECT id, draft_id, filename, content_type, size_bytes, etag, \
             visual_keywords, created_at FROM images WHERE draft_id = ? \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(draft_id)
        .fetch_all(&*self.db)
        .await?)
    }

    /// Delete one image belonging to `draft_id`.
    ///
    /// The row deletion is the exactly-once gate: a second call for the
    /// same id reports ImageNotFound and touches nothing on disk. Payload
    /// removal is best-effort after the row is gone, then empty shard
    /// directories are pruned.
    pub async fn delete_image(&self, draft_id: Uuid, id: Uuid) -> IntakeResult<ImageRecord> {
        let record = self.get_image(id).await?;
        if record.draft_id != draft_id {
            return Err(IntakeError::ImageNotFound(id));
        }

        let result = sqlx::query("DELETE FROM images WHERE id = ? AND draft_id = ?")
            .bind(id)
            .bind(draft_id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(IntakeError::ImageNotFound(id));
        }

        self.remove_payload(&id).await?;
        Ok(record)
    }

    /// Release every image payload owned by a draft; called on draft
    /// teardown. Returns the number of images released.
    pub async fn delete_draft_images(&self, draft_id: Uuid) -> IntakeResult<usize> {
        let records = self.list_images(draft_id).await?;
        sqlx::query("DELETE FROM images WHERE draft_id = ?")
            .bind(draft_id)
            .execute(&*self.db)
            .await?;
        for record in &records {
            self.remove_payload(&record.id).await?;
        }
        Ok(records.len())
    }

    async fn remove_payload(&self, id: &Uuid) -> IntakeResult<()> {
        let file_path = self.image_path(id);
        match fs::remove_file(&file_path).await {
            Ok(_) => debug!("removed image payload {}", file_path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("payload {} already missing", file_path.display());
            }
            Err(err) => return Err(IntakeError::Io(err)),
        }
        if let Some(parent) = file_path.parent() {
            self.prune_empty_dirs(parent, &self.base_path).await;
        }
        Ok(())
    }

    /// Recursively remove empty shard directories up to the base path.
    ///
    /// Stops when:
    /// - directory not empty
    /// - directory not found
    /// - reached the base path
    /// - encountered unexpected I/O errors
    async fn prune_empty_dirs(&self, start: &Path, stop: &Path) {
        let mut current = start.to_path_buf();
        while current.starts_with(stop) && current != stop {
            match fs::remove_dir(&current).await {
                Ok(_) => {
                    if let Some(parent) = current.parent() {
                        current = parent.to_path_buf();
                    } else {
                        break;
                    }
                }
                Err(err) if err.kind() == ErrorKind::NotFound => break,
                Err(err) if err.kind() == ErrorKind::DirectoryNotEmpty => break,
                Err(err) => {
                    debug!("failed to prune directory {}: {}", current.display(), err);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::TempDir;

    async fn service() -> (IntakeService, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE images (id TEXT PRIMARY KEY, draft_id TEXT NOT NULL, \
             filename TEXT NOT NULL, content_type TEXT NOT NULL, size_bytes INTEGER NOT NULL, \
             etag TEXT NOT NULL, visual_keywords TEXT NOT NULL, created_at TEXT NOT NULL)",
        )
        .execute(&db)
        .await
        .unwrap();
        (
            IntakeService::new(Arc::new(db), dir.path().to_path_buf()),
            dir,
        )
    }

    #[tokio::test]
    async fn store_then_open_round_trips_payload_metadata() {
        let (intake, _dir) = service().await;
        let draft_id = Uuid::new_v4();
        let record = intake
            .store_image(draft_id, "front.jpg", "image/jpeg", Bytes::from_static(b"bytes"))
            .await
            .unwrap();
        assert_eq!(record.size_bytes, 5);
        assert_eq!(*record.visual_keywords, vec!["image/jpeg image"]);

        let (fetched, _file) = intake.open_image(record.id).await.unwrap();
        assert_eq!(fetched.filename, "front.jpg");
        assert_eq!(fetched.etag, record.etag);
    }

    #[tokio::test]
    async fn removing_one_of_two_preserves_the_other_in_order() {
        let (intake, _dir) = service().await;
        let draft_id = Uuid::new_v4();
        let first = intake
            .store_image(draft_id, "a.jpg", "image/jpeg", Bytes::from_static(b"a"))
            .await
            .unwrap();
        let second = intake
            .store_image(draft_id, "b.jpg", "image/jpeg", Bytes::from_static(b"b"))
            .await
            .unwrap();

        intake.delete_image(draft_id, first.id).await.unwrap();

        let remaining = intake.list_images(draft_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);
        assert!(!intake.image_path(&first.id).exists());
        assert!(intake.image_path(&second.id).exists());
    }

    #[tokio::test]
    async fn delete_is_exactly_once() {
        let (intake, _dir) = service().await;
        let draft_id = Uuid::new_v4();
        let record = intake
            .store_image(draft_id, "a.jpg", "image/jpeg", Bytes::from_static(b"a"))
            .await
            .unwrap();
        intake.delete_image(draft_id, record.id).await.unwrap();
        assert!(matches!(
            intake.delete_image(draft_id, record.id).await,
            Err(IntakeError::ImageNotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_rejects_an_image_from_another_draft() {
        let (intake, _dir) = service().await;
        let record = intake
            .store_image(Uuid::new_v4(), "a.jpg", "image/jpeg", Bytes::from_static(b"a"))
            .await
            .unwrap();
        assert!(matches!(
            intake.delete_image(Uuid::new_v4(), record.id).await,
            Err(IntakeError::ImageNotFound(_))
        ));
    }

    #[tokio::test]
    async fn draft_teardown_releases_every_payload() {
        let (intake, _dir) = service().await;
        let draft_id = Uuid::new_v4();
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            intake
                .store_image(draft_id, name, "image/jpeg", Bytes::from_static(b"x"))
                .await
                .unwrap();
        }
        let released = intake.delete_draft_images(draft_id).await.unwrap();
        assert_eq!(released, 3);
        assert!(intake.list_images(draft_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn hostile_filenames_are_rejected() {
        let (intake, _dir) = service().await;
        for name in ["", "../evil.jpg", "a/b.jpg", "a\\b.jpg"] {
            assert!(matches!(
                intake
                    .store_image(Uuid::new_v4(), name, "image/jpeg", Bytes::from_static(b"x"))
                    .await,
                Err(IntakeError::InvalidFilename(_))
            ));
        }
    }
}
