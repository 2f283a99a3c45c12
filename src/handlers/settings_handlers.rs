//! HTTP handlers for template/export settings.

use crate::{AppState, errors::AppError, models::settings::Settings};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// `GET /settings` — stored settings, or defaults when none were saved.
pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.settings.load().await?))
}

/// `PUT /settings` — replace the stored settings wholesale.
pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> Result<impl IntoResponse, AppError> {
    state.settings.store(&settings).await?;
    Ok(Json(settings))
}

/// `DELETE /settings` — reset to defaults by deleting the stored key.
pub async fn reset_settings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.settings.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}
