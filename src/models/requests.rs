//! Request bodies accepted by the API.
//!
//! Images travel as base64 strings (raw or data URL) and are decoded by the
//! handlers. Shape snapshots are sent whole on every request.

use serde::Deserialize;

use crate::shapes::Shape;
use crate::shapes::model::ShapeOperation;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub image_base64: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub existing_shapes: Vec<Shape>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubAnalyzeRequest {
    pub repo_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateShapesRequest {
    #[serde(default)]
    pub existing_shapes: Vec<Shape>,
    pub operations: Vec<ShapeOperation>,
}
