//! HTTP handlers for image intake and serving.
//!
//! Multipart uploads are read field-by-field, then stored as independent
//! concurrent tasks joined before responding. Payloads stream back out via
//! `ReaderStream` rather than buffering in memory.

use crate::{AppState, errors::AppError, models::image::ImageRecord};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::future::join_all;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// `POST /drafts/{id}/images` — attach one or more uploaded files.
///
/// The draft walks Uploading and back even when intake fails, so a failed
/// batch never wedges the workflow.
pub async fn upload_images(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    // Multipart fields arrive as a stream; collect them before fanning out.
    let mut uploads: Vec<(String, String, Bytes)> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::new(StatusCode::BAD_REQUEST, err.to_string()))?
    {
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::new(StatusCode::BAD_REQUEST, "file field without a name"))?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let payload = field
            .bytes()
            .await
            .map_err(|err| AppError::new(StatusCode::BAD_REQUEST, err.to_string()))?;
        uploads.push((filename, content_type, payload));
    }
    if uploads.is_empty() {
        return Err(AppError::new(StatusCode::BAD_REQUEST, "no files supplied"));
    }

    state.listings.begin_upload(draft_id).await?;

    // One independent intake task per file; every task runs to completion
    // before the batch outcome is decided.
    let results = join_all(uploads.iter().map(|(filename, content_type, payload)| {
        state
            .intake
            .store_image(draft_id, filename, content_type, payload.clone())
    }))
    .await;

    // Leave the Uploading phase regardless of the intake outcome.
    state.listings.finish_upload(draft_id).await?;

    let mut stored = Vec::with_capacity(results.len());
    for result in results {
        stored.push(result?);
    }

    Ok((StatusCode::CREATED, Json(ImageListResponse::new(stored))))
}

/// `GET /drafts/{id}/images` — list a draft's images in upload order.
pub async fn list_images(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    // Unknown drafts report 404 rather than an empty list.
    state.listings.get(draft_id).await?;
    let images = state.intake.list_images(draft_id).await?;
    Ok(Json(ImageListResponse::new(images)))
}

/// `DELETE /drafts/{id}/images/{image_id}` — remove one image and release
/// its payload exactly once.
pub async fn delete_image(
    State(state): State<AppState>,
    Path((draft_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    state.intake.delete_image(draft_id, image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /images/{id}` — stream an image payload with its stored content
/// type and etag.
pub async fn serve_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (record, file) = state.intake.open_image(id).await?;
    let stream = ReaderStream::new(file);

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&record.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&record.size_bytes.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    let quoted = format!("\"{}\"", record.etag);
    if let Ok(value) = HeaderValue::from_str(&quoted) {
        headers.insert(header::ETAG, value);
    }
    Ok(response)
}

#[derive(serde::Serialize)]
pub struct ImageListResponse {
    pub images: Vec<ImageView>,
}

/// Image metadata as presented to clients: the record plus its content URL.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub url: String,
    pub visual_keywords: Vec<String>,
}

impl ImageListResponse {
    pub fn new(records: Vec<ImageRecord>) -> Self {
        Self {
            images: records
                .into_iter()
                .map(|record| {
                    let url = record.url();
                    ImageView {
                        id: record.id,
                        filename: record.filename,
                        content_type: record.content_type,
                        url,
                        visual_keywords: record.visual_keywords.0,
                    }
                })
                .collect(),
        }
    }
}
