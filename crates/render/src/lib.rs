//! Rendering Adapter: drives any renderer through one multi-viewport frame.
//!
//! # Invariants
//! - Renderers never see layout math: they receive finished rectangles.
//! - Every layout of a tick is recomputed before the first draw call of
//!   that tick.
//! - Rectangles handed to a [`Renderer`] use a top-left origin.
//!
//! The [`RecordingRenderer`] implements the same traits as the GPU backend
//! and captures the command stream, so compositing can be checked without
//! a device.

mod compositor;
mod demo;
mod plan;
mod recording;
mod renderer;

pub use compositor::{CompositeMode, GridCompositor, StackedCompositor};
pub use demo::{DemoCompositor, initial_mode};
pub use plan::{FramePlan, RegionPass};
pub use recording::{DebugTextRenderer, RecordingCanvas, RecordingRenderer, RenderCommand};
pub use renderer::{Canvas, CopyOut, RenderError, Renderer, copy_source_rect};

pub fn crate_info() -> &'static str {
    "multiview-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
