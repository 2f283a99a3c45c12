//! Defines routes for the listing workflow.
//!
//! ## Structure
//! - **Draft endpoints**
//!   - `POST   /drafts` — create a draft from a product form
//!   - `GET    /drafts/{id}` — fetch draft, state, and images
//!   - `DELETE /drafts/{id}` — tear down a draft and its image payloads
//!   - `POST   /drafts/{id}/clear` — start over (reset workflow, drop images)
//!
//! - **Image endpoints**
//!   - `POST   /drafts/{id}/images` — multipart upload, one or more files
//!   - `GET    /drafts/{id}/images` — list in upload order
//!   - `DELETE /drafts/{id}/images/{image_id}` — remove one image
//!   - `GET    /images/{id}` — stream the payload
//!
//! - **Workflow endpoints**
//!   - `POST /drafts/{id}/generate` — description + SEO generation
//!   - `POST /drafts/{id}/enhance` (+ `/accept`, `/reject`)
//!   - `PUT  /drafts/{id}/document/{section}` — replace one section
//!
//! - **Export endpoints**
//!   - `GET /drafts/{id}/export/{format}` — csv | html | text download
//!   - `GET /drafts/{id}/render/{format}` — html | text for the clipboard
//!
//! - **Settings**: `GET`/`PUT`/`DELETE /settings`

use crate::{
    AppState,
    handlers::{
        export_handlers::{export_draft, render_draft},
        health_handlers::{healthz, readyz},
        image_handlers::{delete_image, list_images, serve_image, upload_images},
        listing_handlers::{
            accept_enhanced, clear_draft, create_draft, delete_draft, enhance, generate,
            get_draft, reject_enhanced, replace_section,
        },
        settings_handlers::{get_settings, put_settings, reset_settings},
    },
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Build and return the router for the whole listing API.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Draft lifecycle
        .route("/drafts", post(create_draft))
        .route("/drafts/{id}", get(get_draft).delete(delete_draft))
        .route("/drafts/{id}/clear", post(clear_draft))
        // Images
        .route("/drafts/{id}/images", post(upload_images).get(list_images))
        .route("/drafts/{id}/images/{image_id}", delete(delete_image))
        .route("/images/{id}", get(serve_image))
        // Generation workflow
        .route("/drafts/{id}/generate", post(generate))
        .route("/drafts/{id}/enhance", post(enhance))
        .route("/drafts/{id}/enhance/accept", post(accept_enhanced))
        .route("/drafts/{id}/enhance/reject", post(reject_enhanced))
        .route("/drafts/{id}/document/{section}", put(replace_section))
        // Exports
        .route("/drafts/{id}/export/{format}", get(export_draft))
        .route("/drafts/{id}/render/{format}", get(render_draft))
        // Settings
        .route(
            "/settings",
            get(get_settings)
                .put(put_settings)
                .delete(reset_settings),
        )
}
