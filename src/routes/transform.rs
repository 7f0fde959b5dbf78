//! Sketch-to-diagram endpoint.
//!
//! POST /api/transform { image_base64: string }
//!
//! Returns { result } holding the model's JSON shape array as raw text.

use axum::{extract::State, routing::post, Json, Router};

use crate::error::Result;
use crate::llm::ImagePayload;
use crate::models::{AnalyzeRequest, GenerationResponse};
use crate::routes::{AppJson, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/transform", post(transform))
        .with_state(state)
}

async fn transform(
    State(state): State<AppState>,
    AppJson(request): AppJson<AnalyzeRequest>,
) -> Result<Json<GenerationResponse>> {
    let image = ImagePayload::from_base64(&request.image_base64)?;
    let result = state.gemini.transform(&image).await?;
    Ok(Json(GenerationResponse { result }))
}
