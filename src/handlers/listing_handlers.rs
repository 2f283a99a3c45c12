//! HTTP handlers for the draft listing workflow: creation, generation,
//! enhancement, review edits, and teardown.

use crate::{
    AppState,
    errors::AppError,
    handlers::image_handlers::{ImageListResponse, ImageView},
    models::{description::DocumentSection, draft::Draft, form::ProductForm},
    services::seo_service,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use uuid::Uuid;

const API_KEY_HEADER: &str = "x-api-key";

/// A draft plus its image set, as presented to clients.
#[derive(Serialize)]
pub struct DraftResponse {
    #[serde(flatten)]
    pub draft: Draft,
    pub images: Vec<ImageView>,
}

async fn draft_response(state: &AppState, draft: Draft) -> Result<DraftResponse, AppError> {
    let images = state.intake.list_images(draft.id).await?;
    Ok(DraftResponse {
        draft,
        images: ImageListResponse::new(images).images,
    })
}

/// `POST /drafts` — create a draft from a product form.
///
/// Required-field violations come back 400 with every offending field
/// named, so a client can surface them inline at once.
pub async fn create_draft(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> Result<impl IntoResponse, AppError> {
    let issues = form.validate();
    if !issues.is_empty() {
        return Err(AppError::validation(&issues));
    }
    let draft = state.listings.create(form).await?;
    Ok((StatusCode::CREATED, Json(draft_response(&state, draft).await?)))
}

/// `GET /drafts/{id}` — fetch a draft with its images.
pub async fn get_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let draft = state.listings.get(id).await?;
    Ok(Json(draft_response(&state, draft).await?))
}

/// `DELETE /drafts/{id}` — tear down a draft, releasing every image
/// payload exactly once before the row goes away.
pub async fn delete_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.listings.get(id).await?;
    let released = state.intake.delete_draft_images(id).await?;
    state.listings.delete(id).await?;
    tracing::debug!("deleted draft {} and released {} image payloads", id, released);
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /drafts/{id}/clear` — start over: reset the workflow to Idle and
/// release every uploaded image, one explicit reset for all of it.
pub async fn clear_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let draft = state.listings.clear(id).await?;
    state.intake.delete_draft_images(id).await?;
    Ok(Json(draft_response(&state, draft).await?))
}

/// `POST /drafts/{id}/generate` — run the description request and the SEO
/// derivation concurrently; the draft is updated only once both are done.
///
/// A missing credential fails 401 before any network attempt. An upstream
/// failure resets the draft so the caller may retry; nothing of the failed
/// response is kept.
pub async fn generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let request_key = header_value(&headers, API_KEY_HEADER);
    let draft = state.listings.get(id).await?;
    let images = state.intake.list_images(id).await?;

    state.listings.begin_generation(id).await?;
    let generation = state
        .generation
        .generate(&draft.form, &images, request_key.as_deref());
    let seo = async { seo_service::derive_seo_metadata(&draft.form, &images) };
    let (document, seo) = tokio::join!(generation, seo);

    match document {
        Ok(document) => {
            let draft = state.listings.complete_generation(id, document, seo).await?;
            Ok(Json(draft_response(&state, draft).await?))
        }
        Err(err) => {
            state.listings.fail_generation(id).await?;
            Err(err.into())
        }
    }
}

/// `POST /drafts/{id}/enhance` — optional second pass rewriting the
/// accepted document. On success the draft holds both versions for
/// comparison; on failure the original stays in review untouched.
pub async fn enhance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let request_key = header_value(&headers, API_KEY_HEADER);
    let (_, document) = state.listings.begin_enhancement(id).await?;

    match state
        .generation
        .enhance(&document, request_key.as_deref())
        .await
    {
        Ok(enhanced) => {
            let draft = state.listings.complete_enhancement(id, enhanced).await?;
            Ok(Json(draft_response(&state, draft).await?))
        }
        Err(err) => {
            state.listings.fail_enhancement(id).await?;
            Err(err.into())
        }
    }
}

/// `POST /drafts/{id}/enhance/accept` — keep the enhanced version.
pub async fn accept_enhanced(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let draft = state.listings.resolve_enhancement(id, true).await?;
    Ok(Json(draft_response(&state, draft).await?))
}

/// `POST /drafts/{id}/enhance/reject` — fall back to the original.
pub async fn reject_enhanced(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let draft = state.listings.resolve_enhancement(id, false).await?;
    Ok(Json(draft_response(&state, draft).await?))
}

/// `PUT /drafts/{id}/document/{section}` — replace one named section of
/// the document under review, wholesale.
pub async fn replace_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
    Json(value): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let section: DocumentSection =
        serde_json::from_value(serde_json::Value::String(section.clone())).map_err(|_| {
            AppError::new(
                StatusCode::BAD_REQUEST,
                format!("unknown document section `{}`", section),
            )
        })?;
    let draft = state.listings.replace_section(id, section, value).await?;
    Ok(Json(draft_response(&state, draft).await?))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
