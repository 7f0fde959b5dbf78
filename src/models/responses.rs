use serde::Serialize;

use crate::prompts::AnalysisMode;
use crate::shapes::layout::LayoutConflict;
use crate::shapes::model::{ShapeId, ShapeOperation};

/// Model output for an image analysis, passed through untouched.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub result: String,
    pub mode: AnalysisMode,
}

/// Model output for transform, generate and repository requests.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResponse {
    pub result: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResponse {
    pub operations: Vec<ShapeOperation>,
    pub next_id: ShapeId,
    pub layout_conflicts: Vec<LayoutConflict>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
}
