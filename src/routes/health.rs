//! Health check endpoint.
//!
//! GET /api/health
//!
//! Returns { status: "ok", model } without touching GitHub or the model.

use axum::{extract::State, routing::get, Json, Router};

use crate::models::HealthResponse;
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.gemini.model().to_string(),
    })
}
