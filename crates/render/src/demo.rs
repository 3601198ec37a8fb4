use multiview_common::{Color, SurfaceSize};
use multiview_layout::ClearColorPolicy;
use multiview_scene::{Demo, DemoConfig, MultiCameraRig, SceneArena};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::compositor::{CompositeMode, GridCompositor, StackedCompositor};
use crate::renderer::RenderError;

/// The compositor a demo runs, built from its config.
#[derive(Debug, Clone)]
pub enum DemoCompositor {
    Stacked(StackedCompositor),
    Grid(GridCompositor),
}

impl DemoCompositor {
    /// Generate the demo's scenes from `config.seed` and lay them out for
    /// `config.width x config.height`.
    pub fn build(config: &DemoConfig) -> Result<Self, RenderError> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let compositor = match config.arena_config() {
            Some(arena_config) => {
                let arena = SceneArena::generate(&arena_config, &mut rng)?;
                let colors = ClearColorPolicy::new(
                    Color::from_hex(config.even_color),
                    Color::from_hex(config.odd_color),
                );
                Self::Stacked(StackedCompositor::new(arena, colors, config.width)?)
            }
            None => {
                let rig = MultiCameraRig::generate(
                    config.grid_camera_count()?,
                    MultiCameraRig::DEFAULT_SPACING,
                    MultiCameraRig::DEFAULT_CAMERA_DISTANCE,
                    &mut rng,
                );
                Self::Grid(GridCompositor::new(
                    rig,
                    config.grid_rows,
                    config.grid_cols,
                    Color::from_hex(config.grid_color),
                    SurfaceSize::new(config.width, config.height),
                )?)
            }
        };
        tracing::info!(demo = %config.demo, seed = config.seed, "demo built");
        Ok(compositor)
    }

    /// Number of mini-scenes (bands or grid cells).
    pub fn len(&self) -> usize {
        match self {
            Self::Stacked(c) => c.arena().len(),
            Self::Grid(c) => c.rig().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mode a demo starts in.
pub fn initial_mode(demo: Demo) -> CompositeMode {
    match demo {
        Demo::CopyOut => CompositeMode::DedicatedCanvases,
        Demo::Stacked | Demo::Toggle | Demo::Grid => CompositeMode::Scissored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(demo: Demo) -> DemoConfig {
        DemoConfig {
            demo,
            ..DemoConfig::default()
        }
    }

    #[test]
    fn stacked_demos_get_their_preset_counts() {
        assert_eq!(DemoCompositor::build(&config(Demo::Stacked)).unwrap().len(), 6);
        assert_eq!(DemoCompositor::build(&config(Demo::CopyOut)).unwrap().len(), 50);
        assert_eq!(DemoCompositor::build(&config(Demo::Toggle)).unwrap().len(), 50);
    }

    #[test]
    fn grid_demo_fills_every_cell() {
        let built = DemoCompositor::build(&config(Demo::Grid)).unwrap();
        let DemoCompositor::Grid(grid) = built else {
            panic!("grid demo built a stacked compositor");
        };
        assert_eq!(grid.layout().len(), 6);
        assert_eq!(grid.layout().rows(), 2);
        assert_eq!(grid.layout().cols(), 3);
    }

    #[test]
    fn same_seed_same_scenes() {
        let a = DemoCompositor::build(&config(Demo::Stacked)).unwrap();
        let b = DemoCompositor::build(&config(Demo::Stacked)).unwrap();
        let (DemoCompositor::Stacked(a), DemoCompositor::Stacked(b)) = (a, b) else {
            panic!("expected stacked compositors");
        };
        assert_eq!(a.arena(), b.arena());
        assert_eq!(a.layout(), b.layout());
    }

    #[test]
    fn only_copy_out_starts_on_canvases() {
        assert_eq!(initial_mode(Demo::CopyOut), CompositeMode::DedicatedCanvases);
        assert_eq!(initial_mode(Demo::Toggle), CompositeMode::Scissored);
    }

    #[test]
    fn huge_grid_is_reported() {
        for (rows, cols) in [(usize::MAX, 2), (100_000, 100_000)] {
            let config = DemoConfig {
                grid_rows: rows,
                grid_cols: cols,
                ..config(Demo::Grid)
            };
            assert!(matches!(
                DemoCompositor::build(&config),
                Err(RenderError::Scene(_))
            ));
        }
    }

    #[test]
    fn bad_arena_override_is_reported() {
        let mut config = config(Demo::Stacked);
        config.arena = Some(multiview_scene::ArenaConfig {
            ratio_min: -1.0,
            ..multiview_scene::ArenaConfig::stacked()
        });
        assert!(matches!(
            DemoCompositor::build(&config),
            Err(RenderError::Scene(_))
        ));
    }
}
