//! Camera for the 3D orbit view.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Radians of rotation per pixel of drag.
const ORBIT_SENSITIVITY: f32 = 0.005;
/// Keeps the camera off the poles.
const PITCH_LIMIT: f32 = 1.5;
/// Fraction of the distance covered per scroll line.
const ZOOM_STEP: f32 = 0.1;

/// Orbit camera looking at the star.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    min_distance: f32,
    max_distance: f32,
}

impl Camera {
    /// Create a camera from its configuration.
    pub fn new(config: &CameraConfig) -> Self {
        let min_distance = config.min_distance.max(config.near);
        let max_distance = config.max_distance.max(min_distance);
        Self {
            yaw: config.yaw,
            pitch: config.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance: config.distance.clamp(min_distance, max_distance),
            target: Vec3::ZERO,
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            min_distance,
            max_distance,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view_matrix()
    }

    /// Rotate around the target by a mouse drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * ORBIT_SENSITIVITY;
        self.pitch = (self.pitch + dy * ORBIT_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move toward (positive) or away from (negative) the target.
    pub fn zoom(&mut self, scroll: f32) {
        let factor = (1.0 - scroll * ZOOM_STEP).max(0.1);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
