//! Incremental shape-diff validation.
//!
//! Checks a batch of model-proposed operations against the snapshot the caller
//! sent with the request. Ids are never renumbered here: a batch either obeys
//! the allocation rule or is rejected.
//!
//! Rules:
//! - `add` ids are unique within the batch, absent from the snapshot, and at
//!   least `snapshot.next_id()`
//! - `add` carries a shape type
//! - `edit` / `delete` target ids present in the snapshot
//! - arrow `from` / `to` reference the snapshot or this batch's `add` ids

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::shapes::layout::{self, LayoutConflict};
use crate::shapes::model::{
    Endpoint, ShapeAction, ShapeId, ShapeKind, ShapeOperation, ShapeSnapshot, SnapshotKind, endpoint,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeDiffError {
    #[error("shape id {id} is already in use")]
    DuplicateId { id: ShapeId },

    #[error("new shape id {id} is below the next free id {minimum}")]
    IdBelowMinimum { id: ShapeId, minimum: ShapeId },

    #[error("shape id {id} does not exist")]
    UnknownReference { id: ShapeId },

    #[error("arrow {arrow} points at missing shape {target}")]
    DanglingArrowReference { arrow: ShapeId, target: ShapeId },

    #[error("arrow {arrow} has a non-integer \"{field}\" endpoint")]
    InvalidEndpoint { arrow: ShapeId, field: &'static str },

    #[error("new shape {id} has no type")]
    MissingShapeType { id: ShapeId },
}

/// A batch that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedOperations {
    pub operations: Vec<ShapeOperation>,
    /// First id free after this batch is applied.
    pub next_id: ShapeId,
}

impl ValidatedOperations {
    /// Pairs of shapes that would sit closer than the grid spacing once the
    /// batch is applied. Advisory only.
    pub fn layout_conflicts(&self, snapshot: &ShapeSnapshot) -> Vec<LayoutConflict> {
        layout::find_conflicts(&layout::project_positions(snapshot, &self.operations))
    }
}

pub fn validate(
    snapshot: &ShapeSnapshot,
    operations: Vec<ShapeOperation>,
) -> Result<ValidatedOperations, ShapeDiffError> {
    let minimum = snapshot.next_id();
    let mut added: HashSet<ShapeId> = HashSet::new();

    for op in &operations {
        match op.action {
            ShapeAction::Add => {
                if snapshot.contains(op.id) || !added.insert(op.id) {
                    return Err(ShapeDiffError::DuplicateId { id: op.id });
                }
                if op.id < minimum {
                    return Err(ShapeDiffError::IdBelowMinimum { id: op.id, minimum });
                }
                if op.kind.is_none() {
                    return Err(ShapeDiffError::MissingShapeType { id: op.id });
                }
            }
            ShapeAction::Edit | ShapeAction::Delete => {
                if !snapshot.contains(op.id) {
                    return Err(ShapeDiffError::UnknownReference { id: op.id });
                }
            }
        }
    }

    // Second pass: arrows may point forward at shapes added later in the batch.
    for op in &operations {
        if !is_arrow(snapshot, op) {
            continue;
        }
        let Some(props) = &op.props else {
            continue;
        };
        for field in ["from", "to"] {
            match endpoint(props, field) {
                Endpoint::Missing => {}
                Endpoint::Malformed => {
                    return Err(ShapeDiffError::InvalidEndpoint { arrow: op.id, field });
                }
                Endpoint::Shape(target) => {
                    if !snapshot.contains(target) && !added.contains(&target) {
                        return Err(ShapeDiffError::DanglingArrowReference {
                            arrow: op.id,
                            target,
                        });
                    }
                }
            }
        }
    }

    let next_id = added
        .iter()
        .max()
        .map_or(minimum, |max| minimum.max(max.saturating_add(1)));

    Ok(ValidatedOperations {
        operations,
        next_id,
    })
}

fn is_arrow(snapshot: &ShapeSnapshot, op: &ShapeOperation) -> bool {
    match op.action {
        ShapeAction::Add => op.kind == Some(ShapeKind::Arrow),
        ShapeAction::Edit => snapshot
            .get(op.id)
            .is_some_and(|shape| shape.kind == SnapshotKind::Known(ShapeKind::Arrow)),
        ShapeAction::Delete => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::model::Shape;
    use serde_json::{Map, Value, json};

    fn shape(id: ShapeId, kind: ShapeKind) -> Shape {
        Shape {
            id,
            kind: kind.into(),
            x: None,
            y: None,
            label: None,
            props: Map::new(),
        }
    }

    /// Snapshot {0, 1, 2} where 2 is an arrow from 0 to 1.
    fn snapshot() -> ShapeSnapshot {
        let mut arrow = shape(2, ShapeKind::Arrow);
        arrow.props = json!({"from": 0, "to": 1}).as_object().cloned().unwrap_or_default();
        ShapeSnapshot::new(vec![shape(0, ShapeKind::Geo), shape(1, ShapeKind::Geo), arrow])
            .expect("snapshot")
    }

    fn ops(value: Value) -> Vec<ShapeOperation> {
        serde_json::from_value(value).expect("operations")
    }

    #[test]
    fn add_colliding_with_snapshot_is_duplicate() {
        let err = validate(&snapshot(), ops(json!([{"id": 1, "action": "add", "type": "geo"}])))
            .expect_err("should fail");
        assert_eq!(err, ShapeDiffError::DuplicateId { id: 1 });
    }

    #[test]
    fn add_colliding_within_batch_is_duplicate() {
        let err = validate(
            &snapshot(),
            ops(json!([
                {"id": 3, "action": "add", "type": "geo"},
                {"id": 3, "action": "add", "type": "note"}
            ])),
        )
        .expect_err("should fail");
        assert_eq!(err, ShapeDiffError::DuplicateId { id: 3 });
    }

    #[test]
    fn add_after_max_id_is_accepted() {
        let validated = validate(&snapshot(), ops(json!([{"id": 3, "action": "add", "type": "geo"}])))
            .expect("valid");
        assert_eq!(validated.operations.len(), 1);
        assert_eq!(validated.next_id, 4);
    }

    #[test]
    fn add_into_gap_below_next_id_is_rejected() {
        let snapshot = ShapeSnapshot::new(vec![shape(0, ShapeKind::Geo), shape(5, ShapeKind::Geo)])
            .expect("snapshot");
        let err = validate(&snapshot, ops(json!([{"id": 3, "action": "add", "type": "geo"}])))
            .expect_err("should fail");
        assert_eq!(err, ShapeDiffError::IdBelowMinimum { id: 3, minimum: 6 });
    }

    #[test]
    fn empty_snapshot_starts_at_zero() {
        let validated = validate(
            &ShapeSnapshot::default(),
            ops(json!([{"id": 0, "action": "add", "type": "text"}])),
        )
        .expect("valid");
        assert_eq!(validated.next_id, 1);
    }

    #[test]
    fn edit_of_unknown_id_is_rejected() {
        let err = validate(&snapshot(), ops(json!([{"id": 9, "action": "edit", "props": {"color": "red"}}])))
            .expect_err("should fail");
        assert_eq!(err, ShapeDiffError::UnknownReference { id: 9 });
    }

    #[test]
    fn delete_of_unknown_id_is_rejected() {
        let err = validate(&snapshot(), ops(json!([{"id": 7, "action": "delete"}])))
            .expect_err("should fail");
        assert_eq!(err, ShapeDiffError::UnknownReference { id: 7 });
    }

    #[test]
    fn arrow_may_reference_itself_and_earlier_shapes_in_batch() {
        let validated = validate(
            &snapshot(),
            ops(json!([{"id": 3, "action": "add", "type": "arrow", "props": {"from": 1, "to": 3}}])),
        )
        .expect("valid");
        assert_eq!(validated.next_id, 4);
    }

    #[test]
    fn arrow_may_reference_shape_added_later_in_batch() {
        validate(
            &snapshot(),
            ops(json!([
                {"id": 3, "action": "add", "type": "arrow", "props": {"from": 0, "to": 4}},
                {"id": 4, "action": "add", "type": "geo", "x": 1200, "y": 150}
            ])),
        )
        .expect("valid");
    }

    #[test]
    fn dangling_arrow_is_rejected() {
        let err = validate(
            &snapshot(),
            ops(json!([{"id": 3, "action": "add", "type": "arrow", "props": {"from": 0, "to": 42}}])),
        )
        .expect_err("should fail");
        assert_eq!(err, ShapeDiffError::DanglingArrowReference { arrow: 3, target: 42 });
    }

    #[test]
    fn editing_existing_arrow_endpoint_is_checked() {
        let err = validate(&snapshot(), ops(json!([{"id": 2, "action": "edit", "props": {"to": 8}}])))
            .expect_err("should fail");
        assert_eq!(err, ShapeDiffError::DanglingArrowReference { arrow: 2, target: 8 });
    }

    #[test]
    fn non_integer_endpoint_is_rejected() {
        let err = validate(
            &snapshot(),
            ops(json!([{"id": 3, "action": "add", "type": "arrow", "props": {"from": "A", "to": 1}}])),
        )
        .expect_err("should fail");
        assert_eq!(err, ShapeDiffError::InvalidEndpoint { arrow: 3, field: "from" });
    }

    #[test]
    fn add_without_type_is_rejected() {
        let err = validate(&snapshot(), ops(json!([{"id": 3, "action": "add", "props": {}}])))
            .expect_err("should fail");
        assert_eq!(err, ShapeDiffError::MissingShapeType { id: 3 });
    }

    #[test]
    fn edits_and_deletes_leave_next_id_unchanged() {
        let validated = validate(
            &snapshot(),
            ops(json!([
                {"id": 0, "action": "edit", "props": {"color": "red"}},
                {"id": 1, "action": "delete"}
            ])),
        )
        .expect("valid");
        assert_eq!(validated.next_id, 3);
    }
}
