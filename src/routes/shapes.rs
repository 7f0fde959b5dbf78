//! Shape operation validation.
//!
//! POST /api/shapes/validate { existing_shapes: Shape[], operations: ShapeOperation[] }
//!
//! Checks a model reply against the snapshot it was generated from before the
//! canvas applies it. Rejections (duplicate ids, unknown targets, dangling
//! arrows) are 422. Layout conflicts are reported but never rejected.

use axum::{routing::post, Json, Router};

use crate::error::Result;
use crate::models::{ValidateShapesRequest, ValidationResponse};
use crate::routes::AppJson;
use crate::shapes::{validate, ShapeSnapshot};

pub fn routes() -> Router {
    Router::new().route("/api/shapes/validate", post(validate_operations))
}

async fn validate_operations(
    AppJson(request): AppJson<ValidateShapesRequest>,
) -> Result<Json<ValidationResponse>> {
    let snapshot = ShapeSnapshot::new(request.existing_shapes)?;
    let validated = validate(&snapshot, request.operations)?;
    let layout_conflicts = validated.layout_conflicts(&snapshot);

    Ok(Json(ValidationResponse {
        operations: validated.operations,
        next_id: validated.next_id,
        layout_conflicts,
    }))
}
