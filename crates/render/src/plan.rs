use multiview_common::{Color, Rect, SurfaceSize};
use multiview_layout::{ClearColorPolicy, GridLayout, StackedLayout};

/// Everything a renderer needs to draw one region: where, clipped to what,
/// and on which background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPass {
    pub index: usize,
    pub viewport: Rect,
    pub clip: Rect,
    pub clear_color: Color,
}

/// Ordered region passes for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FramePlan {
    surface: SurfaceSize,
    passes: Vec<RegionPass>,
}

impl FramePlan {
    /// One pass per band, top to bottom.
    pub fn stacked(layout: &StackedLayout, colors: &ClearColorPolicy) -> Self {
        Self::stacked_window(layout, colors, 0, layout.total_height())
    }

    /// Passes for the bands intersecting the rows `[top, top + height)` of the
    /// stacked surface, translated so that `top` becomes row 0 of a
    /// `width x height` frame. Bands cut by the window keep their full size
    /// and are clipped by the frame edge.
    pub fn stacked_window(
        layout: &StackedLayout,
        colors: &ClearColorPolicy,
        top: u32,
        height: u32,
    ) -> Self {
        let passes = layout
            .visible(top, height)
            .map(|region| {
                let mut rect = region.rect();
                rect.y -= top as i32;
                RegionPass {
                    index: region.index,
                    viewport: rect,
                    clip: rect,
                    clear_color: colors.color_for(region.index),
                }
            })
            .collect();
        Self {
            surface: SurfaceSize::new(layout.width(), height),
            passes,
        }
    }

    /// One pass per placed cell, row-major.
    pub fn grid(layout: &GridLayout, colors: &ClearColorPolicy) -> Self {
        let passes = layout
            .cells()
            .iter()
            .map(|cell| RegionPass {
                index: cell.index,
                viewport: cell.pixel_rect(),
                clip: cell.pixel_rect(),
                clear_color: colors.color_for(cell.index),
            })
            .collect();
        Self {
            surface: layout.surface(),
            passes,
        }
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn passes(&self) -> &[RegionPass] {
        &self.passes
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiview_layout::{compute_grid_layout, compute_stacked_layout};

    #[test]
    fn stacked_plan_follows_bands() {
        let layout = compute_stacked_layout(1000, &[1.0, 0.5]).unwrap();
        let plan = FramePlan::stacked(&layout, &ClearColorPolicy::default());
        assert_eq!(plan.surface(), SurfaceSize::new(1000, 1500));
        assert_eq!(plan.passes()[1].viewport, Rect::new(0, 1000, 1000, 500));
        assert_eq!(plan.passes()[1].clip, plan.passes()[1].viewport);
        assert_eq!(plan.passes()[0].clear_color, Color::from_hex(0xc0c0c0));
        assert_eq!(plan.passes()[1].clear_color, Color::from_hex(0xe0e0e0));
    }

    #[test]
    fn window_keeps_only_visible_bands() {
        let layout = compute_stacked_layout(100, &[1.0, 1.0, 1.0]).unwrap();
        let plan = FramePlan::stacked_window(&layout, &ClearColorPolicy::default(), 150, 100);
        assert_eq!(plan.surface(), SurfaceSize::new(100, 100));
        let indices: Vec<usize> = plan.passes().iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(plan.passes()[0].viewport, Rect::new(0, -50, 100, 100));
        assert_eq!(plan.passes()[1].viewport, Rect::new(0, 50, 100, 100));
    }

    #[test]
    fn grid_plan_uses_uniform_color() {
        let layout = compute_grid_layout(900, 600, 2, 3, 6).unwrap();
        let color = Color::from_hex(0xe0e0e0);
        let plan = FramePlan::grid(&layout, &ClearColorPolicy::uniform(color));
        assert_eq!(plan.len(), 6);
        assert!(plan.passes().iter().all(|p| p.clear_color == color));
        assert_eq!(plan.passes()[5].viewport, Rect::new(600, 300, 300, 300));
    }
}
