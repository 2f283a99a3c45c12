//! src/services/listing_service.rs
//!
//! ListingService — draft rows and the workflow around them. Every
//! workflow change loads the draft, applies a pure `DraftState`
//! transition, and persists the result; handlers never poke at state
//! directly. In-flight phases for the long-running calls (Generating,
//! Enhancing, Uploading) are persisted so concurrent readers see them.

use crate::models::{
    description::{DescriptionDocument, DocumentSection, SectionError},
    draft::Draft,
    form::ProductForm,
    seo::SeoMetadata,
    state::{DraftState, TransitionError},
};
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("draft `{0}` not found")]
    DraftNotFound(Uuid),
    #[error("no description document available to edit")]
    NoDocument,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Section(#[from] SectionError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type ListingResult<T> = Result<T, ListingError>;

/// ListingService owns draft rows: creation, lookup, workflow
/// transitions, section edits, and teardown. Image payloads belong to
/// the intake service; callers tearing down a draft release those first.
#[derive(Clone)]
pub struct ListingService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl ListingService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Create a draft in the Idle state from a validated form.
    pub async fn create(&self, form: ProductForm) -> ListingResult<Draft> {
        let now = Utc::now();
        let draft = Draft {
            id: Uuid::new_v4(),
            form: Json(form),
            state: Json(DraftState::Idle),
            seo: None,
            created_at: now,
            updated_at: now,
        };
        sqlx::query(
            "INSERT INTO drafts (id, form, state, seo, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(draft.id)
        .bind(&draft.form)
        .bind(&draft.state)
        .bind(&draft.seo)
        .bind(draft.created_at)
        .bind(draft.updated_at)
        .execute(&*self.db)
        .await?;
        Ok(draft)
    }

    /// Fetch a draft by id.
    pub async fn get(&self, id: Uuid) -> ListingResult<Draft> {
        sqlx::query_as::<_, Draft>(
            "SELECT id, form, state, seo, created_at, updated_at FROM drafts WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ListingError::DraftNotFound(id),
            other => ListingError::Sqlx(other),
        })
    }

    /// Delete the draft row. Image payloads must be released by the
    /// caller beforehand.
    pub async fn delete(&self, id: Uuid) -> ListingResult<()> {
        let result = sqlx::query("DELETE FROM drafts WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ListingError::DraftNotFound(id));
        }
        Ok(())
    }

    /// Persist a state (and optionally new SEO metadata) for a draft.
    async fn store_state(
        &self,
        id: Uuid,
        state: &DraftState,
        seo: Option<&SeoMetadata>,
    ) -> ListingResult<()> {
        let result = match seo {
            Some(seo) => {
                sqlx::query("UPDATE drafts SET state = ?, seo = ?, updated_at = ? WHERE id = ?")
                    .bind(Json(state))
                    .bind(Json(seo))
                    .bind(Utc::now())
                    .bind(id)
                    .execute(&*self.db)
                    .await?
            }
            None => {
                sqlx::query("UPDATE drafts SET state = ?, updated_at = ? WHERE id = ?")
                    .bind(Json(state))
                    .bind(Utc::now())
                    .bind(id)
                    .execute(&*self.db)
                    .await?
            }
        };
        if result.rows_affected() == 0 {
            return Err(ListingError::DraftNotFound(id));
        }
        Ok(())
    }

    /// Load, transition, persist. The transition runs on the loaded
    /// state; nothing is written when it is rejected.
    async fn transition(
        &self,
        id: Uuid,
        apply: impl FnOnce(DraftState) -> Result<DraftState, TransitionError>,
    ) -> ListingResult<Draft> {
        let mut draft = self.get(id).await?;
        let next = apply(draft.state.0.clone())?;
        self.store_state(id, &next, None).await?;
        draft.state = Json(next);
        Ok(draft)
    }

    pub async fn begin_upload(&self, id: Uuid) -> ListingResult<Draft> {
        self.transition(id, DraftState::begin_upload).await
    }

    pub async fn finish_upload(&self, id: Uuid) -> ListingResult<Draft> {
        self.transition(id, DraftState::finish_upload).await
    }

    pub async fn begin_generation(&self, id: Uuid) -> ListingResult<Draft> {
        self.transition(id, DraftState::begin_generation).await
    }

    /// Record a successful generation: the parsed document plus the SEO
    /// metadata derived alongside it land together.
    pub async fn complete_generation(
        &self,
        id: Uuid,
        document: DescriptionDocument,
        seo: SeoMetadata,
    ) -> ListingResult<Draft> {
        let mut draft = self.get(id).await?;
        let next = draft.state.0.clone().complete_generation(document)?;
        self.store_state(id, &next, Some(&seo)).await?;
        draft.state = Json(next);
        draft.seo = Some(Json(seo));
        Ok(draft)
    }

    /// Reset a failed generation so the caller may retry.
    pub async fn fail_generation(&self, id: Uuid) -> ListingResult<Draft> {
        self.transition(id, DraftState::fail_generation).await
    }

    /// Enter the enhancement pass; returns the document to rewrite.
    pub async fn begin_enhancement(&self, id: Uuid) -> ListingResult<(Draft, DescriptionDocument)> {
        let draft = self.transition(id, DraftState::begin_enhancement).await?;
        let document = draft
            .state
            .document()
            .cloned()
            .ok_or(ListingError::NoDocument)?;
        Ok((draft, document))
    }

    pub async fn complete_enhancement(
        &self,
        id: Uuid,
        enhanced: DescriptionDocument,
    ) -> ListingResult<Draft> {
        self.transition(id, move |state| state.complete_enhancement(enhanced))
            .await
    }

    pub async fn fail_enhancement(&self, id: Uuid) -> ListingResult<Draft> {
        self.transition(id, DraftState::fail_enhancement).await
    }

    /// Resolve a comparison: keep the enhanced version or fall back to
    /// the original.
    pub async fn resolve_enhancement(&self, id: Uuid, accept: bool) -> ListingResult<Draft> {
        self.transition(id, move |state| {
            if accept {
                state.accept_enhanced()
            } else {
                state.reject_enhanced()
            }
        })
        .await
    }

    /// Replace one named document section wholesale. Only a draft under
    /// review can be edited.
    pub async fn replace_section(
        &self,
        id: Uuid,
        section: DocumentSection,
        value: serde_json::Value,
    ) -> ListingResult<Draft> {
        let mut draft = self.get(id).await?;
        let next = match draft.state.0.clone() {
            DraftState::Reviewing { mut document } => {
                document.replace_section(section, value)?;
                DraftState::Reviewing { document }
            }
            other => {
                return Err(TransitionError::Invalid {
                    phase: other.phase(),
                    action: "edit the description",
                }
                .into());
            }
        };
        self.store_state(id, &next, None).await?;
        draft.state = Json(next);
        Ok(draft)
    }

    /// Fetch the document for an export or clipboard render. Walks the
    /// Exporting phase and back; the persisted state is unchanged, so a
    /// draft that is not reviewable fails here and nothing is written.
    pub async fn export_document(&self, id: Uuid) -> ListingResult<DescriptionDocument> {
        let draft = self.get(id).await?;
        let exporting = draft.state.0.clone().begin_export()?;
        let document = exporting
            .document()
            .cloned()
            .ok_or(ListingError::NoDocument)?;
        exporting.finish_export()?;
        Ok(document)
    }

    /// Start over: reset the workflow to Idle and drop derived SEO
    /// metadata in one write. Image payloads are released by the caller
    /// through the intake service.
    pub async fn clear(&self, id: Uuid) -> ListingResult<Draft> {
        let mut draft = self.get(id).await?;
        let next = draft.state.0.clone().clear();
        let result = sqlx::query(
            "UPDATE drafts SET state = ?, seo = NULL, updated_at = ? WHERE id = ?",
        )
        .bind(Json(&next))
        .bind(Utc::now())
        .bind(id)
        .execute(&*self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ListingError::DraftNotFound(id));
        }
        draft.state = Json(next);
        draft.seo = None;
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::Dimensions;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn service() -> ListingService {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE drafts (id TEXT PRIMARY KEY, form TEXT NOT NULL, \
             state TEXT NOT NULL, seo TEXT, created_at TEXT NOT NULL, updated_at TEXT NOT NULL)",
        )
        .execute(&db)
        .await
        .unwrap();
        ListingService::new(Arc::new(db))
    }

    fn form() -> ProductForm {
        ProductForm {
            title: "Victorian Walnut Side Chair".into(),
            category: "Antique Furniture".into(),
            details: "Original upholstery.".into(),
            dimensions: Dimensions {
                height: "36".into(),
                width: "18".into(),
                depth: "20".into(),
            },
            materials: "Walnut".into(),
            era: "Victorian".into(),
            price: "450".into(),
            item_number: "AF-1021".into(),
        }
    }

    fn document(title: &str) -> DescriptionDocument {
        DescriptionDocument {
            title: title.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn generation_workflow_persists_document_and_seo() {
        let listings = service().await;
        let draft = listings.create(form()).await.unwrap();
        assert_eq!(*draft.state, DraftState::Idle);

        listings.begin_generation(draft.id).await.unwrap();
        let seo = SeoMetadata {
            slug: "victorian-walnut-side-chair".into(),
            ..Default::default()
        };
        listings
            .complete_generation(draft.id, document("v1"), seo)
            .await
            .unwrap();

        let loaded = listings.get(draft.id).await.unwrap();
        assert_eq!(loaded.state.phase(), "reviewing");
        assert_eq!(loaded.state.document().unwrap().title, "v1");
        assert_eq!(loaded.seo.as_ref().unwrap().slug, "victorian-walnut-side-chair");
    }

    #[tokio::test]
    async fn failed_generation_leaves_no_document_behind() {
        let listings = service().await;
        let draft = listings.create(form()).await.unwrap();
        listings.begin_generation(draft.id).await.unwrap();
        listings.fail_generation(draft.id).await.unwrap();

        let loaded = listings.get(draft.id).await.unwrap();
        assert_eq!(*loaded.state, DraftState::Idle);
        assert!(loaded.seo.is_none());
    }

    #[tokio::test]
    async fn rejected_transition_writes_nothing() {
        let listings = service().await;
        let draft = listings.create(form()).await.unwrap();
        let err = listings.begin_enhancement(draft.id).await.unwrap_err();
        assert!(matches!(err, ListingError::Transition(_)));
        let loaded = listings.get(draft.id).await.unwrap();
        assert_eq!(*loaded.state, DraftState::Idle);
    }

    #[tokio::test]
    async fn enhancement_round_trip_keeps_both_versions_until_resolved() {
        let listings = service().await;
        let draft = listings.create(form()).await.unwrap();
        listings.begin_generation(draft.id).await.unwrap();
        listings
            .complete_generation(draft.id, document("v1"), SeoMetadata::default())
            .await
            .unwrap();

        let (_, original) = listings.begin_enhancement(draft.id).await.unwrap();
        assert_eq!(original.title, "v1");
        listings
            .complete_enhancement(draft.id, document("v2"))
            .await
            .unwrap();

        let rejected = listings.resolve_enhancement(draft.id, false).await.unwrap();
        assert_eq!(rejected.state.document().unwrap().title, "v1");
    }

    #[tokio::test]
    async fn section_edit_requires_review_phase() {
        let listings = service().await;
        let draft = listings.create(form()).await.unwrap();
        let err = listings
            .replace_section(
                draft.id,
                DocumentSection::Title,
                serde_json::json!("New Title"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ListingError::Transition(_)));

        listings.begin_generation(draft.id).await.unwrap();
        listings
            .complete_generation(draft.id, document("v1"), SeoMetadata::default())
            .await
            .unwrap();
        let updated = listings
            .replace_section(
                draft.id,
                DocumentSection::Title,
                serde_json::json!("New Title"),
            )
            .await
            .unwrap();
        assert_eq!(updated.state.document().unwrap().title, "New Title");
    }

    #[tokio::test]
    async fn export_document_requires_a_reviewed_draft() {
        let listings = service().await;
        let draft = listings.create(form()).await.unwrap();
        assert!(listings.export_document(draft.id).await.is_err());

        listings.begin_generation(draft.id).await.unwrap();
        listings
            .complete_generation(draft.id, document("v1"), SeoMetadata::default())
            .await
            .unwrap();
        let doc = listings.export_document(draft.id).await.unwrap();
        assert_eq!(doc.title, "v1");
        // Export is read-only: the draft is still under review.
        assert_eq!(listings.get(draft.id).await.unwrap().state.phase(), "reviewing");
    }

    #[tokio::test]
    async fn clear_resets_state_and_seo_together() {
        let listings = service().await;
        let draft = listings.create(form()).await.unwrap();
        listings.begin_generation(draft.id).await.unwrap();
        listings
            .complete_generation(draft.id, document("v1"), SeoMetadata::default())
            .await
            .unwrap();

        let cleared = listings.clear(draft.id).await.unwrap();
        assert_eq!(*cleared.state, DraftState::Idle);
        assert!(cleared.seo.is_none());

        let loaded = listings.get(draft.id).await.unwrap();
        assert_eq!(*loaded.state, DraftState::Idle);
        assert!(loaded.seo.is_none());
    }
}
