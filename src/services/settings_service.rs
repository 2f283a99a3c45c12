//! src/services/settings_service.rs
//!
//! Template/export settings persisted as one JSON blob under a single
//! namespaced key. A missing key means defaults; reset deletes the key.

use crate::models::settings::Settings;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

const SETTINGS_KEY: &str = "listing-assistant/settings";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Clone)]
pub struct SettingsService {
    pub db: Arc<SqlitePool>,
}

impl SettingsService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Load the stored settings, or defaults when the key is absent.
    pub async fn load(&self) -> SettingsResult<Settings> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
                .bind(SETTINGS_KEY)
                .fetch_optional(&*self.db)
                .await?;
        match value {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Settings::default()),
        }
    }

    /// Store settings wholesale under the namespaced key.
    pub async fn store(&self, settings: &Settings) -> SettingsResult<()> {
        let raw = serde_json::to_string(settings)?;
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(SETTINGS_KEY)
        .bind(raw)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    /// Reset to defaults by deleting the key. Idempotent.
    pub async fn reset(&self) -> SettingsResult<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(SETTINGS_KEY)
            .execute(&*self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn service() -> SettingsService {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
            .execute(&db)
            .await
            .unwrap();
        SettingsService::new(Arc::new(db))
    }

    #[tokio::test]
    async fn absent_key_yields_defaults() {
        let settings = service().await.load().await.unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn store_then_load_round_trips() {
        let service = service().await;
        let custom = Settings {
            default_template: "A {era} {category} of note.".into(),
            csv_format: "sku,title,price".into(),
        };
        service.store(&custom).await.unwrap();
        assert_eq!(service.load().await.unwrap(), custom);

        // Storing again overwrites rather than duplicating the key.
        let updated = Settings {
            csv_format: "sku,title".into(),
            ..custom
        };
        service.store(&updated).await.unwrap();
        assert_eq!(service.load().await.unwrap(), updated);
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let service = service().await;
        service
            .store(&Settings {
                default_template: "custom".into(),
                csv_format: "sku".into(),
            })
            .await
            .unwrap();
        service.reset().await.unwrap();
        assert_eq!(service.load().await.unwrap(), Settings::default());
        // A second reset is a no-op.
        service.reset().await.unwrap();
    }
}
