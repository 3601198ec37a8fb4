use multiview_common::{Color, Rect, SurfaceSize};
use multiview_scene::{PerspectiveCamera, Scene};

use crate::plan::FramePlan;
use crate::renderer::{Canvas, CopyOut, RenderError, Renderer, copy_source_rect};

/// One call made against a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    SetSize(SurfaceSize),
    SetViewport(Rect),
    SetScissor(Rect),
    SetScissorTest(bool),
    SetClearColor(Color),
    Clear,
    Render { cubes: usize, aspect: f32 },
    CopyFrame {
        canvas: usize,
        dx: i32,
        dy: i32,
        copied: Option<Rect>,
    },
}

/// Renderer that draws nothing and remembers every call.
#[derive(Debug, Clone)]
pub struct RecordingRenderer {
    size: SurfaceSize,
    max_height: u32,
    next_canvas: usize,
    commands: Vec<RenderCommand>,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            size: SurfaceSize::default(),
            max_height: u32::MAX,
            next_canvas: 0,
            commands: Vec::new(),
        }
    }

    /// Pretend the surface cannot grow taller than `max_height`.
    pub fn with_max_height(max_height: u32) -> Self {
        Self {
            max_height,
            ..Self::new()
        }
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn render_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::Render { .. }))
            .count()
    }
}

impl Renderer for RecordingRenderer {
    fn set_size(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        if size.height > self.max_height {
            return Err(RenderError::Backend(format!(
                "surface height {} exceeds limit {}",
                size.height, self.max_height
            )));
        }
        self.size = size;
        self.commands.push(RenderCommand::SetSize(size));
        Ok(())
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn max_surface_height(&self) -> u32 {
        self.max_height
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.commands.push(RenderCommand::SetViewport(rect));
    }

    fn set_scissor(&mut self, rect: Rect) {
        self.commands.push(RenderCommand::SetScissor(rect));
    }

    fn set_scissor_test(&mut self, enabled: bool) {
        self.commands.push(RenderCommand::SetScissorTest(enabled));
    }

    fn set_clear_color(&mut self, color: Color) {
        self.commands.push(RenderCommand::SetClearColor(color));
    }

    fn clear(&mut self) {
        self.commands.push(RenderCommand::Clear);
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.commands.push(RenderCommand::Render {
            cubes: scene.len(),
            aspect: camera.aspect,
        });
        Ok(())
    }
}

/// Canvas that only tracks its size and which frame rows it received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingCanvas {
    pub id: usize,
    size: SurfaceSize,
    /// Source rectangles copied in, in frame coordinates.
    pub copies: Vec<Rect>,
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }
}

impl CopyOut for RecordingRenderer {
    type Canvas = RecordingCanvas;

    fn create_canvas(&mut self, size: SurfaceSize) -> Result<RecordingCanvas, RenderError> {
        let id = self.next_canvas;
        self.next_canvas += 1;
        Ok(RecordingCanvas {
            id,
            size,
            copies: Vec::new(),
        })
    }

    fn copy_frame_to(
        &mut self,
        canvas: &mut RecordingCanvas,
        dx: i32,
        dy: i32,
    ) -> Result<(), RenderError> {
        let copied = copy_source_rect(self.size, canvas.size, dx, dy);
        if let Some(rect) = copied {
            canvas.copies.push(rect);
        }
        self.commands.push(RenderCommand::CopyFrame {
            canvas: canvas.id,
            dx,
            dy,
            copied,
        });
        Ok(())
    }
}

/// Formats frame plans as human-readable text for the CLI and logs.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_plan(&self, plan: &FramePlan) -> String {
        let mut out = String::new();
        let surface = plan.surface();
        out.push_str(&format!(
            "=== Frame {}x{} ({} passes) ===\n",
            surface.width,
            surface.height,
            plan.len()
        ));
        for pass in plan.passes() {
            out.push_str(&format!(
                "  [{:>3}] viewport={} clip={} clear=#{:06x}\n",
                pass.index,
                format_rect(pass.viewport),
                format_rect(pass.clip),
                pass.clear_color.to_hex()
            ));
        }
        out
    }
}

fn format_rect(r: Rect) -> String {
    format!("({}, {}) {}x{}", r.x, r.y, r.width, r.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiview_layout::{ClearColorPolicy, compute_stacked_layout};

    #[test]
    fn debug_renderer_lists_passes() {
        let layout = compute_stacked_layout(1000, &[1.0, 0.5]).unwrap();
        let plan = FramePlan::stacked(&layout, &ClearColorPolicy::default());
        let output = DebugTextRenderer::new().render_plan(&plan);

        assert!(output.contains("Frame 1000x1500 (2 passes)"));
        assert!(output.contains("viewport=(0, 1000) 1000x500"));
        assert!(output.contains("clear=#c0c0c0"));
        assert!(output.contains("clear=#e0e0e0"));
    }

    #[test]
    fn debug_renderer_writes_one_line_per_pass() {
        let layout = compute_stacked_layout(200, &[0.5, 0.5, 0.5]).unwrap();
        let plan = FramePlan::stacked(&layout, &ClearColorPolicy::default());
        let output = DebugTextRenderer::new().render_plan(&plan);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "=== Frame 200x300 (3 passes) ===");
        assert_eq!(lines[3], "  [  2] viewport=(0, 200) 200x100 clip=(0, 200) 200x100 clear=#c0c0c0");
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn recording_renderer_enforces_height_limit() {
        let mut r = RecordingRenderer::with_max_height(100);
        assert!(r.set_size(SurfaceSize::new(10, 100)).is_ok());
        assert!(matches!(
            r.set_size(SurfaceSize::new(10, 101)),
            Err(RenderError::Backend(_))
        ));
        assert_eq!(r.size(), SurfaceSize::new(10, 100));
    }

    #[test]
    fn copy_records_visible_rows() {
        let mut r = RecordingRenderer::new();
        r.set_size(SurfaceSize::new(100, 300)).unwrap();
        let mut canvas = r.create_canvas(SurfaceSize::new(100, 50)).unwrap();
        r.copy_frame_to(&mut canvas, 0, -200).unwrap();
        assert_eq!(canvas.copies, vec![Rect::new(0, 200, 100, 50)]);
    }
}
