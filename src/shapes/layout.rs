//! Canonical grid layout used by every generation prompt.
//!
//! This is the single source for grid positions and spacing. The prompt
//! rule text is rendered from these values, and the overlap check below uses
//! the same spacing.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::shapes::model::{ShapeAction, ShapeId, ShapeOperation, ShapeSnapshot};

pub const COLUMNS: [i32; 4] = [100, 650, 1200, 1750];
pub const OVERFLOW_COLUMNS: [i32; 2] = [2300, 2850];
pub const ROWS: [i32; 4] = [150, 600, 1050, 1500];
pub const OVERFLOW_ROWS: [i32; 2] = [1950, 2400];

pub const TITLE_Y: i32 = 30;
pub const BOX_WIDTH: i32 = 300;
pub const BOX_HEIGHT: i32 = 130;

pub const MIN_HORIZONTAL_GAP: f64 = 550.0;
pub const MIN_VERTICAL_GAP: f64 = 450.0;

/// Two positioned shapes closer than the minimum gap on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutConflict {
    pub first: ShapeId,
    pub second: ShapeId,
    pub dx: f64,
    pub dy: f64,
}

/// Positions of every placed shape after `operations` are applied to `snapshot`.
///
/// Shapes without both coordinates (arrows) are skipped. Edits move a shape
/// only on the axes they specify.
pub fn project_positions(
    snapshot: &ShapeSnapshot,
    operations: &[ShapeOperation],
) -> BTreeMap<ShapeId, (f64, f64)> {
    let mut coords: BTreeMap<ShapeId, (Option<f64>, Option<f64>)> = snapshot
        .shapes()
        .map(|shape| (shape.id, (shape.x, shape.y)))
        .collect();

    for op in operations {
        match op.action {
            ShapeAction::Add => {
                coords.insert(op.id, (op.x, op.y));
            }
            ShapeAction::Edit => {
                if let Some((x, y)) = coords.get_mut(&op.id) {
                    *x = op.x.or(*x);
                    *y = op.y.or(*y);
                }
            }
            ShapeAction::Delete => {
                coords.remove(&op.id);
            }
        }
    }

    coords
        .into_iter()
        .filter_map(|(id, (x, y))| Some((id, (x?, y?))))
        .collect()
}

pub fn find_conflicts(positions: &BTreeMap<ShapeId, (f64, f64)>) -> Vec<LayoutConflict> {
    let placed: Vec<(ShapeId, (f64, f64))> = positions.iter().map(|(id, pos)| (*id, *pos)).collect();
    let mut conflicts = Vec::new();

    for (i, &(first, (x1, y1))) in placed.iter().enumerate() {
        for &(second, (x2, y2)) in &placed[i + 1..] {
            let dx = (x2 - x1).abs();
            let dy = (y2 - y1).abs();
            if dx < MIN_HORIZONTAL_GAP && dy < MIN_VERTICAL_GAP {
                conflicts.push(LayoutConflict { first, second, dx, dy });
            }
        }
    }

    conflicts
}

fn join(values: &[i32], axis: &str) -> String {
    values
        .iter()
        .map(|v| format!("{}={}", axis, v))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn columns_text() -> String {
    join(&COLUMNS, "x")
}

pub fn rows_text() -> String {
    join(&ROWS, "y")
}

pub fn overflow_columns_text() -> String {
    join(&OVERFLOW_COLUMNS, "x")
}

pub fn overflow_rows_text() -> String {
    join(&OVERFLOW_ROWS, "y")
}
