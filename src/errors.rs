use crate::models::form::FieldIssue;
use crate::services::{
    generation_service::GenerationError, intake_service::IntakeError,
    listing_service::ListingError, settings_service::SettingsError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for request errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Required form fields are missing; one message naming every field.
    pub fn validation(issues: &[FieldIssue]) -> Self {
        let detail = issues
            .iter()
            .map(|issue| format!("{}: {}", issue.field, issue.message))
            .collect::<Vec<_>>()
            .join("; ");
        Self::new(StatusCode::BAD_REQUEST, detail)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<ListingError> for AppError {
    fn from(err: ListingError) -> Self {
        let status = match &err {
            ListingError::DraftNotFound(_) | ListingError::NoDocument => StatusCode::NOT_FOUND,
            ListingError::Transition(_) => StatusCode::CONFLICT,
            ListingError::Section(_) => StatusCode::BAD_REQUEST,
            ListingError::Sqlx(_) | ListingError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        let status = match &err {
            IntakeError::ImageNotFound(_) => StatusCode::NOT_FOUND,
            IntakeError::InvalidFilename(_) => StatusCode::BAD_REQUEST,
            IntakeError::Sqlx(_) | IntakeError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        let status = match &err {
            // Surfaced before any network attempt.
            GenerationError::MissingCredential => StatusCode::UNAUTHORIZED,
            GenerationError::GenerationFailed { .. }
            | GenerationError::MalformedResponse(_)
            | GenerationError::Request(_) => StatusCode::BAD_GATEWAY,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        AppError::internal(err.to_string())
    }
}
