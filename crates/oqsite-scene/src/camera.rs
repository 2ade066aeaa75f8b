//! Perspective camera and viewport sizing.

use std::f32::consts::TAU;

use serde::Serialize;

use crate::math::Vec3;

/// Highest device pixel ratio the canvas renders at.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Auto-rotation speed (OrbitControls units: 1.0 = one orbit per minute).
pub const AUTO_ROTATE_SPEED: f32 = 0.3;

/// CSS size of the canvas container plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Pixel ratio the renderer uses, capped at [`MAX_PIXEL_RATIO`].
    pub fn pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.clamp(0.0, MAX_PIXEL_RATIO)
    }

    /// Drawing-buffer size in device pixels.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        (
            (self.width as f32 * ratio).floor() as u32,
            (self.height as f32 * ratio).floor() as u32,
        )
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Perspective camera orbiting the origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    projection: [f32; 16],
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::new(0.0, 0.0, 5.0),
            projection: [0.0; 16],
        };
        camera.update_projection_matrix();
        camera
    }

    /// The hero camera: 45° fov, near 0.1, far 100, five units back.
    pub fn hero(aspect: f32) -> Self {
        Self::new(45.0, aspect, 0.1, 100.0)
    }

    /// Column-major projection matrix.
    pub fn projection_matrix(&self) -> &[f32; 16] {
        &self.projection
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn update_projection_matrix(&mut self) {
        let top = self.near * (self.fov.to_radians() * 0.5).tan();
        let height = 2.0 * top;
        let width = self.aspect * height;

        let x = 2.0 * self.near / width;
        let y = 2.0 * self.near / height;
        let c = -(self.far + self.near) / (self.far - self.near);
        let d = -2.0 * self.far * self.near / (self.far - self.near);

        self.projection = [
            x, 0.0, 0.0, 0.0, //
            0.0, y, 0.0, 0.0, //
            0.0, 0.0, c, -1.0, //
            0.0, 0.0, d, 0.0,
        ];
    }

    /// Orbit angle (radians) accumulated by auto-rotation after `elapsed` seconds.
    pub fn orbit_angle_at(elapsed: f32) -> f32 {
        TAU / 60.0 * AUTO_ROTATE_SPEED * elapsed
    }

    /// Camera position after auto-rotating for `elapsed` seconds around the origin.
    pub fn orbit_position_at(&self, elapsed: f32) -> Vec3 {
        let radius = (self.position.x * self.position.x + self.position.z * self.position.z).sqrt();
        let theta = self.position.x.atan2(self.position.z) - Self::orbit_angle_at(elapsed);
        Vec3::new(radius * theta.sin(), self.position.y, radius * theta.cos())
    }
}
