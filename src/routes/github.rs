//! Repository architecture endpoint.
//!
//! POST /api/github-analyze { repo_url: string }
//!
//! Accepts a GitHub URL or `owner/name`. The repository is summarized into a
//! digest (metadata, depth-limited tree, key config files) which becomes the
//! context of the architecture prompt.
//!
//! - 400: the reference cannot be parsed (no GitHub call is made)
//! - 502: GitHub metadata/tree fetch or the model call failed

use axum::{extract::State, routing::post, Json, Router};

use crate::error::Result;
use crate::github::summarize;
use crate::models::{GenerationResponse, GithubAnalyzeRequest};
use crate::routes::{AppJson, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/github-analyze", post(github_analyze))
        .with_state(state)
}

async fn github_analyze(
    State(state): State<AppState>,
    AppJson(request): AppJson<GithubAnalyzeRequest>,
) -> Result<Json<GenerationResponse>> {
    let digest = summarize(state.github.as_ref(), &request.repo_url).await?;
    let result = state.gemini.generate_architecture(&digest).await?;
    Ok(Json(GenerationResponse { result }))
}
