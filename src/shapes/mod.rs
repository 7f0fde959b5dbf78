//! Diagram shapes and the incremental add/edit/delete protocol.
//!
//! No shape state lives on the server: every request carries its own snapshot.

pub mod layout;
pub mod model;
pub mod validate;

pub use model::{Shape, ShapeSnapshot};
pub use validate::{ShapeDiffError, validate};
