//! A listing draft row: one product form plus its workflow state.

use crate::models::{form::ProductForm, seo::SeoMetadata, state::DraftState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// A draft listing.
///
/// The form is immutable once the draft exists. The state column carries
/// the whole workflow position, including the current description document
/// when one exists; SEO metadata is recomputed on every (re)generation.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// Internal UUID, used as the public draft handle.
    pub id: Uuid,

    /// The product form captured at creation.
    pub form: Json<ProductForm>,

    /// Workflow state, serialized as a tagged value.
    pub state: Json<DraftState>,

    /// Derived SEO metadata; present once generation has completed.
    pub seo: Option<Json<SeoMetadata>>,

    /// When the draft was created.
    pub created_at: DateTime<Utc>,

    /// When the draft last changed.
    pub updated_at: DateTime<Utc>,
}
