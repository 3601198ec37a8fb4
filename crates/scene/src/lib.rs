//! Mini-scenes: the per-viewport (scene, camera) pairs the demos draw.
//!
//! # Invariants
//! - The arena owns every mini-scene by value; identity is the index.
//! - Camera aspect is derived from the current layout, never stored apart
//!   from it: every resize goes through `apply_*_layout`.
//! - Generation is seeded, so a demo is reproducible from its seed.

mod arena;
mod camera;
mod cube;
mod demo;
mod error;
mod rig;

pub use arena::{ArenaConfig, MiniScene, SceneArena};
pub use camera::PerspectiveCamera;
pub use cube::{Cube, Scene, random_color};
pub use demo::{Demo, DemoConfig};
pub use error::SceneError;
pub use rig::MultiCameraRig;

/// Rotation added to every cube on each animation tick, in radians.
pub const SPIN_STEP: f32 = 0.01;

pub fn crate_info() -> &'static str {
    "multiview-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
