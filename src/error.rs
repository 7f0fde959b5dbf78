//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` enum for all error conditions and implements Axum's
//! `IntoResponse` to automatically convert errors to appropriate HTTP responses
//! with JSON error bodies.
//!
//! Error mappings:
//! - `InvalidInput`, `InvalidReference` → 400 (malformed JSON bodies included)
//! - `Shape` → 422
//! - `UpstreamUnavailable`, `Generation`, `Http` → 502
//! - `Internal` → 500
//!
//! Nothing here is retried. A failed upstream call surfaces once and the
//! caller decides whether to try again.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::shapes::ShapeDiffError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not parse GitHub URL: {0}")]
    InvalidReference(String),

    #[error("Invalid shape operations: {0}")]
    Shape(#[from] ShapeDiffError),

    #[error("Repository host unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::InvalidReference(_) => StatusCode::BAD_REQUEST,
            AppError::Shape(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UpstreamUnavailable(_) | AppError::Generation(_) | AppError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("rejected request: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(AppError::InvalidInput("mode".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidReference("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Shape(ShapeDiffError::UnknownReference { id: 9 }).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn upstream_errors_map_to_5xx() {
        assert_eq!(AppError::UpstreamUnavailable("404".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::Generation("empty".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::Internal("slot".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
