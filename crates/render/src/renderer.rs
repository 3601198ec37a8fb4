use multiview_common::{Color, Rect, SurfaceSize};
use multiview_layout::LayoutError;
use multiview_scene::{PerspectiveCamera, Scene, SceneError};

/// Errors surfaced while compositing a frame. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("render backend failure: {0}")]
    Backend(String),
}

/// The drawing surface a compositor issues commands against.
///
/// Mirrors the small immediate-mode surface of a WebGL-style renderer:
/// state setters followed by `clear` and `render`. State persists between
/// calls until changed.
pub trait Renderer {
    /// Resize the shared drawing surface.
    fn set_size(&mut self, size: SurfaceSize) -> Result<(), RenderError>;

    fn size(&self) -> SurfaceSize;

    /// Tallest surface the renderer can allocate. Compositors split work
    /// into several frames rather than exceed it.
    fn max_surface_height(&self) -> u32 {
        u32::MAX
    }

    fn set_viewport(&mut self, rect: Rect);

    fn set_scissor(&mut self, rect: Rect);

    /// When enabled, `clear` and `render` only touch the scissor rectangle.
    fn set_scissor_test(&mut self, enabled: bool);

    fn set_clear_color(&mut self, color: Color);

    /// Clear color and depth (inside the scissor when the test is on).
    fn clear(&mut self);

    /// Draw a scene through a camera into the current viewport.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError>;
}

/// An independent 2-D surface that receives copied pixels.
pub trait Canvas {
    fn size(&self) -> SurfaceSize;

    fn resize(&mut self, size: SurfaceSize);
}

/// Renderers whose frame can be copied into separate canvases.
pub trait CopyOut: Renderer {
    type Canvas: Canvas;

    fn create_canvas(&mut self, size: SurfaceSize) -> Result<Self::Canvas, RenderError>;

    /// Draw the whole current frame into `canvas` with its top-left corner at
    /// `(dx, dy)`; whatever falls outside the canvas is dropped.
    fn copy_frame_to(
        &mut self,
        canvas: &mut Self::Canvas,
        dx: i32,
        dy: i32,
    ) -> Result<(), RenderError>;
}

/// The part of a `frame` that lands inside `canvas` when the frame is drawn
/// at `(dx, dy)`, in frame coordinates. `None` when nothing lands.
pub fn copy_source_rect(frame: SurfaceSize, canvas: SurfaceSize, dx: i32, dy: i32) -> Option<Rect> {
    let placed = Rect::new(dx, dy, frame.width, frame.height);
    placed
        .intersect(&canvas.bounds())
        .map(|hit| Rect::new(hit.x - dx, hit.y - dy, hit.width, hit.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_offset_selects_lower_band() {
        let frame = SurfaceSize::new(100, 175);
        let canvas = SurfaceSize::new(100, 50);
        assert_eq!(
            copy_source_rect(frame, canvas, 0, -100),
            Some(Rect::new(0, 100, 100, 50))
        );
    }

    #[test]
    fn zero_offset_selects_top_band() {
        let frame = SurfaceSize::new(100, 175);
        let canvas = SurfaceSize::new(100, 100);
        assert_eq!(
            copy_source_rect(frame, canvas, 0, 0),
            Some(Rect::new(0, 0, 100, 100))
        );
    }

    #[test]
    fn offset_past_frame_copies_nothing() {
        let frame = SurfaceSize::new(100, 100);
        let canvas = SurfaceSize::new(100, 50);
        assert_eq!(copy_source_rect(frame, canvas, 0, -100), None);
        assert_eq!(copy_source_rect(frame, SurfaceSize::new(0, 0), 0, 0), None);
    }
}
