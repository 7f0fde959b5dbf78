//! Canvas shapes and the incremental operations that change them.
//!
//! - `Shape`: one shape in the caller's snapshot
//! - `ShapeSnapshot`: the caller-supplied shapes, keyed by id
//! - `ShapeOperation`: add/edit/delete against a snapshot
//!
//! Arrows carry `from`/`to` shape ids in their props instead of coordinates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::shapes::ShapeDiffError;

pub type ShapeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Geo,
    Arrow,
    Text,
    Note,
}

/// Type of a shape already on the canvas.
///
/// The canvas may hold shapes the generator never emits (freehand `draw`,
/// `frame`, ...). Those are kept under their own name so the snapshot still
/// reaches the model intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotKind {
    Known(ShapeKind),
    Other(String),
}

impl From<ShapeKind> for SnapshotKind {
    fn from(kind: ShapeKind) -> Self {
        SnapshotKind::Known(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    #[serde(rename = "type")]
    pub kind: SnapshotKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeAction {
    Add,
    Edit,
    Delete,
}

/// One step of an incremental diagram edit.
///
/// `props` is the full prop set for `add`, the changed props for `edit`, and
/// absent for `delete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeOperation {
    pub id: ShapeId,
    pub action: ShapeAction,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
}

/// An arrow endpoint as written in props: missing, a shape id, or something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Missing,
    Shape(ShapeId),
    Malformed,
}

pub fn endpoint(props: &Map<String, Value>, field: &str) -> Endpoint {
    match props.get(field) {
        None | Some(Value::Null) => Endpoint::Missing,
        Some(value) => value
            .as_u64()
            .and_then(|id| ShapeId::try_from(id).ok())
            .map_or(Endpoint::Malformed, Endpoint::Shape),
    }
}

/// Shapes currently on the caller's canvas, unique by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeSnapshot {
    shapes: BTreeMap<ShapeId, Shape>,
}

impl ShapeSnapshot {
    pub fn new(shapes: Vec<Shape>) -> Result<Self, ShapeDiffError> {
        let mut map = BTreeMap::new();
        for shape in shapes {
            let id = shape.id;
            if map.insert(id, shape).is_some() {
                return Err(ShapeDiffError::DuplicateId { id });
            }
        }
        Ok(Self { shapes: map })
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    /// Lowest id a fresh `add` may use: one past the highest id, or 0 when empty.
    pub fn next_id(&self) -> ShapeId {
        self.shapes
            .keys()
            .next_back()
            .map_or(0, |max| max.saturating_add(1))
    }

    /// Compact JSON array of the snapshot, in id order, for prompt substitution.
    pub fn to_prompt_json(&self) -> String {
        let shapes: Vec<&Shape> = self.shapes().collect();
        serde_json::to_string(&shapes).unwrap_or_else(|_| "[]".to_string())
    }
}
