use glam::Vec3;
use multiview_layout::{StackedLayout, StackedPartitioner};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::camera::PerspectiveCamera;
use crate::cube::{Cube, Scene};
use crate::error::SceneError;

/// How an arena of mini-scenes is generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Number of mini-scenes.
    pub count: usize,
    /// Smallest ratio a scene can draw. Ratios are `ratio_min + r * ratio_span`
    /// with `r` uniform in `[0, 1)`.
    pub ratio_min: f64,
    pub ratio_span: f64,
    /// Camera distance from the origin along +Z.
    pub camera_distance: f32,
    /// Initial rotation about X and Y applied to every cube, in radians.
    pub initial_tilt: f32,
}

impl ArenaConfig {
    /// Six bands of varied height.
    pub fn stacked() -> Self {
        Self {
            count: 6,
            ratio_min: 0.5,
            ratio_span: 1.1,
            camera_distance: 7.0,
            initial_tilt: 0.0,
        }
    }

    /// Fifty bands copied out into dedicated canvases.
    pub fn copy_out() -> Self {
        Self {
            count: 50,
            ratio_min: 0.5,
            ratio_span: 0.8,
            camera_distance: 7.0,
            initial_tilt: 15.0,
        }
    }

    /// Fifty bands, switchable between one surface and many canvases.
    pub fn toggle() -> Self {
        Self {
            camera_distance: 5.0,
            ..Self::copy_out()
        }
    }

    fn validate(&self) -> Result<(), SceneError> {
        if !(self.ratio_min.is_finite() && self.ratio_min > 0.0) {
            return Err(SceneError::InvalidConfig(format!(
                "ratio_min must be finite and positive, got {}",
                self.ratio_min
            )));
        }
        if !(self.ratio_span.is_finite() && self.ratio_span >= 0.0) {
            return Err(SceneError::InvalidConfig(format!(
                "ratio_span must be finite and non-negative, got {}",
                self.ratio_span
            )));
        }
        if !self.camera_distance.is_finite() {
            return Err(SceneError::InvalidConfig(
                "camera_distance must be finite".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::stacked()
    }
}

/// One cube in its own scene, seen through its own camera.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniScene {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    /// Band height as a multiple of the surface width.
    pub ratio: f64,
}

/// The demos' mini-scenes, indexed `0..N`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneArena {
    scenes: Vec<MiniScene>,
}

impl SceneArena {
    pub fn generate(config: &ArenaConfig, rng: &mut impl Rng) -> Result<Self, SceneError> {
        config.validate()?;

        let scenes = (0..config.count)
            .map(|_| {
                let ratio = config.ratio_min + rng.gen_range(0.0..1.0) * config.ratio_span;
                let mut cube = Cube::random(rng);
                cube.spin(config.initial_tilt);
                MiniScene {
                    scene: Scene::with_cube(cube),
                    camera: PerspectiveCamera::at(Vec3::new(0.0, 0.0, config.camera_distance)),
                    ratio,
                }
            })
            .collect();

        tracing::debug!(count = config.count, "scene arena generated");
        Ok(Self { scenes })
    }

    pub fn from_scenes(scenes: Vec<MiniScene>) -> Self {
        Self { scenes }
    }

    pub fn scenes(&self) -> &[MiniScene] {
        &self.scenes
    }

    pub fn get(&self, index: usize) -> Option<&MiniScene> {
        self.scenes.get(index)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn ratios(&self) -> Vec<f64> {
        self.scenes.iter().map(|s| s.ratio).collect()
    }

    /// Partitioner over this arena's ratios.
    pub fn partitioner(&self) -> Result<StackedPartitioner, SceneError> {
        Ok(StackedPartitioner::new(self.ratios())?)
    }

    /// Point every camera at its band: aspect becomes `width / band height`.
    pub fn apply_stacked_layout(&mut self, layout: &StackedLayout) -> Result<(), SceneError> {
        if layout.len() != self.scenes.len() {
            return Err(SceneError::LayoutMismatch {
                layout: layout.len(),
                scenes: self.scenes.len(),
            });
        }
        for (scene, region) in self.scenes.iter_mut().zip(layout.regions()) {
            scene
                .camera
                .set_viewport_size(region.width as f32, region.pixel_height as f32);
        }
        Ok(())
    }

    pub fn spin_all(&mut self, step: f32) {
        for mini in &mut self.scenes {
            mini.scene.spin(step);
        }
    }

    /// Drop every scene (the arena is rebuilt from scratch afterwards).
    pub fn clear(&mut self) {
        self.scenes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn arena(config: &ArenaConfig, seed: u64) -> SceneArena {
        SceneArena::generate(config, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn generates_ratios_within_range() {
        let a = arena(&ArenaConfig::stacked(), 1);
        assert_eq!(a.len(), 6);
        for ratio in a.ratios() {
            assert!((0.5..1.6).contains(&ratio));
        }
        assert!(a.scenes().iter().all(|s| s.camera.position.z == 7.0));
    }

    #[test]
    fn same_seed_same_arena() {
        let config = ArenaConfig::copy_out();
        assert_eq!(arena(&config, 42), arena(&config, 42));
        assert_ne!(arena(&config, 42), arena(&config, 43));
    }

    #[test]
    fn initial_tilt_is_applied() {
        let a = arena(&ArenaConfig::toggle(), 3);
        let cube = a.get(0).unwrap().scene.cubes()[0];
        assert_eq!(cube.rotation.x, 15.0);
        assert_eq!(a.get(0).unwrap().camera.position.z, 5.0);
    }

    #[test]
    fn layout_sets_camera_aspect() {
        let mut a = arena(&ArenaConfig::stacked(), 5);
        let layout = a.partitioner().unwrap().compute(1200).unwrap();
        a.apply_stacked_layout(&layout).unwrap();
        for (scene, region) in a.scenes().iter().zip(layout.regions()) {
            let expected = 1200.0 / region.pixel_height as f32;
            assert!((scene.camera.aspect - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn mismatched_layout_is_rejected() {
        let mut a = arena(&ArenaConfig::stacked(), 5);
        let layout = StackedPartitioner::new(vec![1.0]).unwrap().compute(100).unwrap();
        assert_eq!(
            a.apply_stacked_layout(&layout),
            Err(SceneError::LayoutMismatch {
                layout: 1,
                scenes: 6
            })
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ArenaConfig {
            ratio_min: 0.0,
            ..ArenaConfig::stacked()
        };
        let result = SceneArena::generate(&config, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(SceneError::InvalidConfig(_))));
    }

    #[test]
    fn spin_all_and_clear() {
        let mut a = arena(&ArenaConfig::stacked(), 8);
        a.spin_all(0.01);
        assert!(
            a.scenes()
                .iter()
                .all(|s| (s.scene.cubes()[0].rotation.y - 0.01).abs() < 1e-6)
        );
        a.clear();
        assert!(a.is_empty());
    }
}
