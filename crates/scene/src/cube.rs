use glam::{EulerRot, Quat, Vec3};
use multiview_common::{Color, Transform};
use rand::Rng;

/// Unit cube with one color per pair of opposite faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub position: Vec3,
    /// Euler angles (XYZ order) in radians.
    pub rotation: Vec3,
    /// Colors for the X, Y and Z face pairs.
    pub face_colors: [Color; 3],
}

impl Cube {
    /// Cubes sit half a unit towards the camera.
    pub const DEPTH_OFFSET: f32 = 0.5;

    pub fn new(face_colors: [Color; 3]) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, Self::DEPTH_OFFSET),
            rotation: Vec3::ZERO,
            face_colors,
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::new([random_color(rng), random_color(rng), random_color(rng)])
    }

    /// Advance the animation: rotate about X and Y by `step` radians.
    pub fn spin(&mut self, step: f32) {
        self.rotation.x += step;
        self.rotation.y += step;
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: Quat::from_euler(
                EulerRot::XYZ,
                self.rotation.x,
                self.rotation.y,
                self.rotation.z,
            ),
            scale: Vec3::ONE,
        }
    }
}

/// Uniformly random opaque color.
pub fn random_color(rng: &mut impl Rng) -> Color {
    Color::rgb(
        rng.gen_range(0.0..1.0),
        rng.gen_range(0.0..1.0),
        rng.gen_range(0.0..1.0),
    )
}

/// Flat list of cubes drawn together through one camera.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    cubes: Vec<Cube>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cube(cube: Cube) -> Self {
        Self { cubes: vec![cube] }
    }

    pub fn add(&mut self, cube: Cube) {
        self.cubes.push(cube);
    }

    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    pub fn cubes_mut(&mut self) -> &mut [Cube] {
        &mut self.cubes
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    pub fn spin(&mut self, step: f32) {
        for cube in &mut self.cubes {
            cube.spin(step);
        }
    }
}
