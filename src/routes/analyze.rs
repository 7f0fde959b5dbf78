//! Image analysis endpoint.
//!
//! POST /api/analyze/{mode} { image_base64: string }
//!
//! `mode` is one of label, cleanup, suggest, explain, optimize. Unknown modes
//! are rejected with 400 before the image is decoded or the model is called.
//! Returns { result, mode } where `result` is the model's raw text.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use crate::error::Result;
use crate::llm::ImagePayload;
use crate::models::{AnalysisResponse, AnalyzeRequest};
use crate::prompts::AnalysisMode;
use crate::routes::{AppJson, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze/{mode}", post(analyze))
        .with_state(state)
}

async fn analyze(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    AppJson(request): AppJson<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>> {
    let mode: AnalysisMode = mode.parse()?;
    let image = ImagePayload::from_base64(&request.image_base64)?;

    let result = state.gemini.analyze(mode, &image).await?;
    Ok(Json(AnalysisResponse { result, mode }))
}
