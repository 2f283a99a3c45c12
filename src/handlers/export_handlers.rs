//! HTTP handlers for export downloads and clipboard renders.
//!
//! Downloads carry an attachment disposition with a fixed filename per
//! format; renders return the same bytes inline for clipboard use.

use crate::{AppState, errors::AppError, services::export_service};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use serde::Deserialize;
use uuid::Uuid;

/// Downloadable export formats.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Html,
    Text,
}

impl ExportFormat {
    fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Html => "text/html",
            ExportFormat::Text => "text/plain",
        }
    }

    fn filename(self) -> &'static str {
        match self {
            ExportFormat::Csv => "product-description.csv",
            ExportFormat::Html => "product-description.html",
            ExportFormat::Text => "product-description.txt",
        }
    }
}

/// Clipboard render formats: plain text or HTML only.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    Html,
    Text,
}

/// `GET /drafts/{id}/export/{format}` — download the rendered document.
pub async fn export_draft(
    State(state): State<AppState>,
    Path((id, format)): Path<(Uuid, ExportFormat)>,
) -> Result<Response, AppError> {
    let document = state.listings.export_document(id).await?;

    let content = match format {
        ExportFormat::Csv => {
            let draft = state.listings.get(id).await?;
            let seo = draft
                .seo
                .as_ref()
                .map(|seo| seo.0.clone())
                .unwrap_or_default();
            let images = state.intake.list_images(id).await?;
            export_service::csv(&document, &seo, &images)
        }
        ExportFormat::Html => export_service::html(&document),
        ExportFormat::Text => export_service::plain_text(&document),
    };

    let disposition = format!("attachment; filename=\"{}\"", format.filename());
    let mut response = Response::new(Body::from(content));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(format.mime()));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );
    Ok(response)
}

/// `GET /drafts/{id}/render/{format}` — inline render for clipboard use.
pub async fn render_draft(
    State(state): State<AppState>,
    Path((id, format)): Path<(Uuid, RenderFormat)>,
) -> Result<Response, AppError> {
    let document = state.listings.export_document(id).await?;
    let (content, mime) = match format {
        RenderFormat::Html => (export_service::html(&document), "text/html"),
        RenderFormat::Text => (export_service::plain_text(&document), "text/plain"),
    };

    let mut response = Response::new(Body::from(content));
    *response.status_mut() = StatusCode::OK;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
    Ok(response)
}
