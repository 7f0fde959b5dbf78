//! Diagram generation endpoint.
//!
//! POST /api/generate { prompt: string, image_base64?: string, existing_shapes?: Shape[] }
//!
//! With an empty `existing_shapes` the model is asked for a fresh shape array.
//! Otherwise the snapshot and its next free id go into the incremental prompt
//! and the model answers with add/edit/delete operations. Either way the reply
//! is returned verbatim as { result }.

use axum::{extract::State, routing::post, Json, Router};

use crate::error::{AppError, Result};
use crate::llm::ImagePayload;
use crate::models::{GenerateRequest, GenerationResponse};
use crate::routes::{AppJson, AppState};
use crate::shapes::ShapeSnapshot;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .with_state(state)
}

async fn generate(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerateRequest>,
) -> Result<Json<GenerationResponse>> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::InvalidInput("Prompt must not be empty".to_string()));
    }

    let image = request
        .image_base64
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(ImagePayload::from_base64)
        .transpose()?;
    let snapshot = ShapeSnapshot::new(request.existing_shapes)?;

    let result = state
        .gemini
        .generate_diagram(&request.prompt, image.as_ref(), &snapshot)
        .await?;
    Ok(Json(GenerationResponse { result }))
}
