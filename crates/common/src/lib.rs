//! Shared value types for the multiview workspace.
//!
//! Everything here is plain data: copyable, comparable, serializable. The
//! layout, scene and render crates exchange these types and nothing heavier.

mod types;

pub use types::{Color, Rect, SurfaceSize, Transform};
