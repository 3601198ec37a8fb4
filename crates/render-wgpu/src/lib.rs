//! wgpu render backend for multi-viewport compositing.
//!
//! Draws every region into one offscreen frame through viewport + scissor,
//! copies regions out into dedicated canvas textures, and presents either
//! onto a window surface.
//!
//! # Invariants
//! - Clears are scissored quads, so a region clear never touches its neighbours.
//! - The frame and canvases share one unorm format; copies are bit-exact.
//! - Work is flushed before any resize or copy, so batches never overwrite
//!   pixels that have not been copied yet.

mod canvas;
mod gpu;
mod present;
mod shaders;

pub use canvas::CanvasTexture;
pub use gpu::{FRAME_FORMAT, WgpuRenderer};
pub use present::Presenter;
