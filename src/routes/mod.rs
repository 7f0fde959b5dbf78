//! API route handlers - maps HTTP endpoints to summarizer, validator and model calls.
//!
//! Each submodule defines routes for one operation:
//! - `analyze`: Image analysis by mode (POST /api/analyze/{mode})
//! - `transform`: Sketch to shapes (POST /api/transform)
//! - `generate`: Free-form and incremental generation (POST /api/generate)
//! - `github`: Repository architecture (POST /api/github-analyze)
//! - `shapes`: Shape operation validation (POST /api/shapes/validate)
//! - `health`: Liveness and configured model (GET /api/health)

pub mod analyze;
pub mod generate;
pub mod github;
pub mod health;
pub mod shapes;
pub mod transform;

use std::sync::Arc;

use axum::Router;
use axum::extract::FromRequest;

use crate::error::AppError;
use crate::github::GitHubClient;
use crate::llm::GeminiClient;

/// Long-lived clients shared read-only by every request.
#[derive(Clone)]
pub struct AppState {
    pub github: Arc<GitHubClient>,
    pub gemini: Arc<GeminiClient>,
}

/// `Json` extractor whose rejections use the API's `{"error": ...}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(analyze::routes(state.clone()))
        .merge(transform::routes(state.clone()))
        .merge(generate::routes(state.clone()))
        .merge(github::routes(state.clone()))
        .merge(health::routes(state))
        .merge(shapes::routes())
}
