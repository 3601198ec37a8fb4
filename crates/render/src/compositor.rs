use multiview_common::{Color, SurfaceSize};
use multiview_layout::{
    ClearColorPolicy, GridLayout, GridPartitioner, Region, StackedLayout, StackedPartitioner,
};
use multiview_scene::{MultiCameraRig, SceneArena};

use crate::plan::{FramePlan, RegionPass};
use crate::renderer::{Canvas, CopyOut, RenderError, Renderer};

/// Where the bands of a stacked arena end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Every band is a scissored region of one shared surface.
    #[default]
    Scissored,
    /// Bands are drawn into a shared surface and copied into one dedicated
    /// canvas each.
    DedicatedCanvases,
}

impl CompositeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Scissored => Self::DedicatedCanvases,
            Self::DedicatedCanvases => Self::Scissored,
        }
    }
}

/// Issue the draw calls for one plan: full clear, then per pass clear
/// color, viewport, scissor, clear and render.
fn draw_passes<R, F>(renderer: &mut R, passes: &[RegionPass], mut draw: F) -> Result<(), RenderError>
where
    R: Renderer,
    F: FnMut(&mut R, usize) -> Result<(), RenderError>,
{
    renderer.set_scissor_test(false);
    renderer.clear();
    renderer.set_scissor_test(true);
    for pass in passes {
        renderer.set_clear_color(pass.clear_color);
        renderer.set_viewport(pass.viewport);
        renderer.set_scissor(pass.clip);
        renderer.clear();
        draw(renderer, pass.index)?;
    }
    Ok(())
}

/// Split consecutive bands into groups whose combined height fits `limit`.
/// A band taller than `limit` gets a group of its own.
fn batch_regions(regions: &[Region], limit: u32) -> Vec<&[Region]> {
    let mut batches = Vec::new();
    let mut start = 0;
    let mut height = 0u32;
    for (i, region) in regions.iter().enumerate() {
        if i > start && height.saturating_add(region.pixel_height) > limit {
            batches.push(&regions[start..i]);
            start = i;
            height = 0;
        }
        height = height.saturating_add(region.pixel_height);
    }
    if start < regions.len() {
        batches.push(&regions[start..]);
    }
    batches
}

/// A run of surface rows drawn as one frame, and the bands copied out of it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FrameWindow<'a> {
    top: u32,
    height: u32,
    regions: &'a [Region],
}

/// Frames needed to draw `regions` without exceeding `limit` rows. Batches
/// that fit become one frame each; a band taller than `limit` is cut into
/// slices of at most `limit` rows.
fn frame_windows(regions: &[Region], limit: u32) -> Vec<FrameWindow<'_>> {
    let limit = limit.max(1);
    let mut windows = Vec::new();
    for batch in batch_regions(regions, limit) {
        let top = batch[0].top;
        let height: u32 = batch.iter().map(|r| r.pixel_height).sum();
        if height <= limit {
            windows.push(FrameWindow {
                top,
                height,
                regions: batch,
            });
            continue;
        }
        let mut slice_top = top;
        while slice_top < top + height {
            let slice_height = limit.min(top + height - slice_top);
            windows.push(FrameWindow {
                top: slice_top,
                height: slice_height,
                regions: batch,
            });
            slice_top += slice_height;
        }
    }
    windows
}

/// Owns a scene arena and its stacked layout, and draws it either as
/// scissored bands or into dedicated canvases.
#[derive(Debug, Clone)]
pub struct StackedCompositor {
    arena: SceneArena,
    partitioner: StackedPartitioner,
    layout: StackedLayout,
    colors: ClearColorPolicy,
}

impl StackedCompositor {
    /// Build the compositor and compute the initial layout for `width`.
    pub fn new(
        arena: SceneArena,
        colors: ClearColorPolicy,
        width: u32,
    ) -> Result<Self, RenderError> {
        let partitioner = arena.partitioner()?;
        let mut compositor = Self {
            arena,
            partitioner,
            layout: StackedLayout::default(),
            colors,
        };
        compositor.relayout(width)?;
        Ok(compositor)
    }

    pub fn arena(&self) -> &SceneArena {
        &self.arena
    }

    pub fn layout(&self) -> &StackedLayout {
        &self.layout
    }

    pub fn colors(&self) -> &ClearColorPolicy {
        &self.colors
    }

    /// Replace the layout for a new surface width and re-aim every camera.
    pub fn relayout(&mut self, width: u32) -> Result<&StackedLayout, RenderError> {
        let layout = self.partitioner.compute(width)?;
        self.arena.apply_stacked_layout(&layout)?;
        self.layout = layout;
        Ok(&self.layout)
    }

    /// Start of a tick: relayout when the width changed, then animate.
    /// Runs before any draw call of the tick.
    pub fn prepare(&mut self, width: u32, spin_step: Option<f32>) -> Result<(), RenderError> {
        if width != self.layout.width() {
            self.relayout(width)?;
        }
        if let Some(step) = spin_step {
            self.arena.spin_all(step);
        }
        Ok(())
    }

    /// Plan for the whole stacked surface.
    pub fn plan(&self) -> FramePlan {
        FramePlan::stacked(&self.layout, &self.colors)
    }

    /// Draw the bands visible in rows `[scroll_top, scroll_top + view_height)`
    /// into a `width x view_height` surface.
    pub fn draw_scissored<R: Renderer>(
        &self,
        renderer: &mut R,
        scroll_top: u32,
        view_height: u32,
    ) -> Result<FramePlan, RenderError> {
        let _span = tracing::trace_span!("draw_scissored", scroll_top, view_height).entered();
        let plan = FramePlan::stacked_window(&self.layout, &self.colors, scroll_top, view_height);
        renderer.set_size(plan.surface())?;
        draw_passes(renderer, plan.passes(), |r, index| {
            let mini = &self.arena.scenes()[index];
            r.render(&mini.scene, &mini.camera)
        })?;
        Ok(plan)
    }

    /// Draw the whole stacked surface in one frame.
    pub fn draw_full<R: Renderer>(&self, renderer: &mut R) -> Result<FramePlan, RenderError> {
        self.draw_scissored(renderer, 0, self.layout.total_height())
    }

    /// Draw every band into the shared surface and copy band `i` into
    /// `canvases[i]`, which is created or resized to the band's size.
    ///
    /// When the stacked surface is taller than the renderer allows, bands are
    /// drawn in consecutive groups; each group is its own frame and a band's
    /// copy offset is measured from the top of its group. A band taller than
    /// the limit is drawn in slices, each copied to its own rows of the
    /// canvas.
    pub fn draw_to_canvases<R: CopyOut>(
        &self,
        renderer: &mut R,
        canvases: &mut Vec<R::Canvas>,
    ) -> Result<Vec<FramePlan>, RenderError> {
        let _span = tracing::trace_span!("draw_to_canvases", regions = self.layout.len()).entered();
        let regions = self.layout.regions();

        canvases.truncate(regions.len());
        for region in &regions[canvases.len()..] {
            canvases.push(renderer.create_canvas(region.canvas_size())?);
        }
        for (canvas, region) in canvases.iter_mut().zip(regions) {
            if canvas.size() != region.canvas_size() {
                canvas.resize(region.canvas_size());
            }
        }

        let mut plans = Vec::new();
        for window in frame_windows(regions, renderer.max_surface_height()) {
            let plan =
                FramePlan::stacked_window(&self.layout, &self.colors, window.top, window.height);
            renderer.set_size(plan.surface())?;
            draw_passes(renderer, plan.passes(), |r, index| {
                let mini = &self.arena.scenes()[index];
                r.render(&mini.scene, &mini.camera)
            })?;
            for region in window.regions {
                let dy = region.copy_offset() + window.top as i32;
                renderer.copy_frame_to(&mut canvases[region.index], 0, dy)?;
            }
            plans.push(plan);
        }
        tracing::trace!(frames = plans.len(), "canvases updated");
        Ok(plans)
    }

    /// Relayout, animate and draw in the given mode. Canvases are only
    /// touched in [`CompositeMode::DedicatedCanvases`].
    pub fn tick<R: CopyOut>(
        &mut self,
        renderer: &mut R,
        mode: CompositeMode,
        width: u32,
        spin_step: Option<f32>,
        canvases: &mut Vec<R::Canvas>,
    ) -> Result<(), RenderError> {
        self.prepare(width, spin_step)?;
        match mode {
            CompositeMode::Scissored => {
                self.draw_full(renderer)?;
            }
            CompositeMode::DedicatedCanvases => {
                self.draw_to_canvases(renderer, canvases)?;
            }
        }
        Ok(())
    }
}

/// Owns a multi-camera rig and draws camera `i` into grid cell `i`.
#[derive(Debug, Clone)]
pub struct GridCompositor {
    rig: MultiCameraRig,
    partitioner: GridPartitioner,
    layout: GridLayout,
    colors: ClearColorPolicy,
}

impl GridCompositor {
    pub fn new(
        rig: MultiCameraRig,
        rows: usize,
        cols: usize,
        background: Color,
        size: SurfaceSize,
    ) -> Result<Self, RenderError> {
        let partitioner = GridPartitioner::new(rows, cols, rig.len())?;
        let mut compositor = Self {
            rig,
            partitioner,
            layout: GridLayout::default(),
            colors: ClearColorPolicy::uniform(background),
        };
        compositor.relayout(size);
        Ok(compositor)
    }

    pub fn rig(&self) -> &MultiCameraRig {
        &self.rig
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn relayout(&mut self, size: SurfaceSize) -> &GridLayout {
        self.layout = self.partitioner.compute(size.width, size.height);
        self.rig.apply_grid_layout(&self.layout);
        &self.layout
    }

    pub fn prepare(&mut self, size: SurfaceSize, spin_step: Option<f32>) {
        if size != self.layout.surface() {
            self.relayout(size);
        }
        if let Some(step) = spin_step {
            self.rig.spin_all(step);
        }
    }

    pub fn plan(&self) -> FramePlan {
        FramePlan::grid(&self.layout, &self.colors)
    }

    pub fn draw<R: Renderer>(&self, renderer: &mut R) -> Result<FramePlan, RenderError> {
        let _span = tracing::trace_span!("draw_grid", cells = self.layout.len()).entered();
        let plan = self.plan();
        renderer.set_size(plan.surface())?;
        draw_passes(renderer, plan.passes(), |r, index| {
            r.render(&self.rig.scene, &self.rig.cameras[index])
        })?;
        Ok(plan)
    }

    pub fn tick<R: Renderer>(
        &mut self,
        renderer: &mut R,
        size: SurfaceSize,
        spin_step: Option<f32>,
    ) -> Result<FramePlan, RenderError> {
        self.prepare(size, spin_step);
        self.draw(renderer)
    }
}
