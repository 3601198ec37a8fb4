use glam::Vec3;
use multiview_layout::GridLayout;
use rand::Rng;

use crate::camera::PerspectiveCamera;
use crate::cube::{Cube, Scene};

/// One shared scene watched by several cameras, one per grid cell.
///
/// Cube `i` sits at `x = i * spacing`; camera `i` hovers in front of it.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiCameraRig {
    pub scene: Scene,
    pub cameras: Vec<PerspectiveCamera>,
}

impl MultiCameraRig {
    pub const DEFAULT_COUNT: usize = 6;
    pub const DEFAULT_SPACING: f32 = 4.0;
    pub const DEFAULT_CAMERA_DISTANCE: f32 = 2.0;
    /// Most cameras a grid demo may ask for.
    pub const MAX_CAMERAS: usize = 1024;

    pub fn generate(
        count: usize,
        spacing: f32,
        camera_distance: f32,
        rng: &mut impl Rng,
    ) -> Self {
        let mut scene = Scene::new();
        let mut cameras = Vec::with_capacity(count);
        for i in 0..count {
            let x = i as f32 * spacing;
            let mut cube = Cube::random(rng);
            cube.position.x = x;
            scene.add(cube);
            cameras.push(PerspectiveCamera::at(Vec3::new(x, 0.0, camera_distance)));
        }
        tracing::debug!(count, "multi-camera rig generated");
        Self { scene, cameras }
    }

    pub fn with_defaults(rng: &mut impl Rng) -> Self {
        Self::generate(
            Self::DEFAULT_COUNT,
            Self::DEFAULT_SPACING,
            Self::DEFAULT_CAMERA_DISTANCE,
            rng,
        )
    }

    /// Every camera shares the cell aspect of the grid.
    pub fn apply_grid_layout(&mut self, layout: &GridLayout) {
        let aspect = layout.cell_aspect();
        for camera in &mut self.cameras {
            camera.aspect = aspect;
        }
    }

    pub fn spin_all(&mut self, step: f32) {
        self.scene.spin(step);
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}
