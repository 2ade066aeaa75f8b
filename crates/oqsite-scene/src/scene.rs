//! The assembled hero scene.

use serde::{Deserialize, Serialize};

use crate::camera::{PerspectiveCamera, Viewport, AUTO_ROTATE_SPEED};
use crate::math::{Rgba, Vec3};
use crate::ribbon::{pulse_at, PlasmaRibbon, TubeGeometry};
use crate::shaders::{ribbon_program, star_program, ShaderProgram};
use crate::sprite::StarSprite;
use crate::starfield::{Starfield, STAR_COUNT, WOBBLE_AMPLITUDE};

/// Scene generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for the starfield layout
    pub seed: u64,
    /// Number of stars
    pub star_count: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            star_count: STAR_COUNT,
        }
    }
}

/// Errors raised by the scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Viewport has zero size: {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },

    #[error("Frame interval must be greater than zero")]
    ZeroFrameInterval,

    #[error("Animation task failed: {0}")]
    Task(String),
}

/// The element a scene renders into.
pub trait SceneContainer {
    /// Current CSS size of the container.
    fn size(&self) -> (u32, u32);

    /// Device pixel ratio of the display showing the container.
    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }
}

impl SceneContainer for Viewport {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }
}

/// Everything that moves, sampled at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSample {
    /// Seconds since the scene started
    pub elapsed: f32,
    /// Star positions as flat `xyz` triples
    pub star_positions: Vec<f32>,
    /// Ribbon Euler rotation
    pub ribbon_rotation: Vec3,
    /// Value bound to the ribbon's `uTime` uniform
    pub u_time: f32,
    /// Ribbon brightness multiplier
    pub pulse: f32,
    /// Camera position after auto-rotation
    pub camera_position: Vec3,
}

/// Starfield data for the browser runtime.
#[derive(Debug, Clone, Serialize)]
pub struct StarExport {
    pub base_positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub wobble: f32,
}

/// Ribbon data for the browser runtime.
#[derive(Debug, Clone, Serialize)]
pub struct RibbonExport {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

/// Camera data for the browser runtime.
#[derive(Debug, Clone, Serialize)]
pub struct CameraExport {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub auto_rotate_speed: f32,
}

/// Serialisable bundle the browser runtime draws from.
#[derive(Debug, Clone, Serialize)]
pub struct SceneExport {
    pub seed: u64,
    pub stars: StarExport,
    pub sprite: StarSprite,
    pub ribbon: RibbonExport,
    pub star_program: ShaderProgram,
    pub ribbon_program: ShaderProgram,
    pub camera: CameraExport,
}

/// The hero scene: starfield, ribbon, and camera.
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    starfield: Starfield,
    sprite: StarSprite,
    ribbon: PlasmaRibbon,
    camera: PerspectiveCamera,
    viewport: Viewport,
}

impl Scene {
    /// Build a scene sized to `viewport`.
    pub fn new(config: SceneConfig, viewport: Viewport) -> Result<Self, SceneError> {
        if viewport.is_empty() {
            return Err(SceneError::EmptyViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        Ok(Self {
            starfield: Starfield::generate(config.star_count, config.seed),
            sprite: StarSprite::generate(),
            ribbon: PlasmaRibbon::new(),
            camera: PerspectiveCamera::hero(viewport.aspect()),
            viewport,
            config,
        })
    }

    /// Build a scene for `container`, or skip it when there is no container.
    ///
    /// A missing or zero-sized container disables the scene with a warning;
    /// the rest of the page is unaffected.
    pub fn mount(container: Option<&dyn SceneContainer>, config: SceneConfig) -> Option<Self> {
        let Some(container) = container else {
            tracing::warn!("Hero canvas container not found, skipping scene");
            return None;
        };

        let (width, height) = container.size();
        let viewport = Viewport::new(width, height).with_pixel_ratio(container.device_pixel_ratio());

        match Self::new(config, viewport) {
            Ok(scene) => Some(scene),
            Err(e) => {
                tracing::warn!("Skipping scene: {}", e);
                None
            }
        }
    }

    /// Resize to a new container size, recomputing the projection.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SceneError> {
        let viewport = Viewport::new(width, height).with_pixel_ratio(self.viewport.device_pixel_ratio);
        if viewport.is_empty() {
            return Err(SceneError::EmptyViewport { width, height });
        }

        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
        tracing::debug!("Scene resized to {}x{}", width, height);
        Ok(())
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn ribbon(&self) -> &PlasmaRibbon {
        &self.ribbon
    }

    /// Sample every animated value at `elapsed` seconds.
    pub fn frame_at(&self, elapsed: f32) -> FrameSample {
        FrameSample {
            elapsed,
            star_positions: self.starfield.position_buffer_at(elapsed),
            ribbon_rotation: PlasmaRibbon::rotation_at(elapsed),
            u_time: elapsed,
            pulse: pulse_at(elapsed),
            camera_position: self.camera.orbit_position_at(elapsed),
        }
    }

    /// Per-vertex ribbon colours at `elapsed` seconds.
    pub fn ribbon_colors_at(&self, elapsed: f32) -> Vec<Rgba> {
        self.ribbon.colors_at(elapsed)
    }

    /// Bundle the static scene data for the browser runtime.
    pub fn export(&self) -> SceneExport {
        let geometry: &TubeGeometry = self.ribbon.geometry();

        SceneExport {
            seed: self.config.seed,
            stars: StarExport {
                base_positions: self
                    .starfield
                    .base_positions()
                    .iter()
                    .flat_map(|p| p.to_array())
                    .collect(),
                colors: self.starfield.color_buffer(),
                wobble: WOBBLE_AMPLITUDE,
            },
            sprite: self.sprite.clone(),
            ribbon: RibbonExport {
                positions: geometry.positions.clone(),
                normals: geometry.normals.clone(),
                indices: geometry.indices.clone(),
            },
            star_program: star_program(),
            ribbon_program: ribbon_program(),
            camera: CameraExport {
                fov: self.camera.fov,
                near: self.camera.near,
                far: self.camera.far,
                position: self.camera.position,
                auto_rotate_speed: AUTO_ROTATE_SPEED,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(SceneConfig::default(), Viewport::new(1280, 720)).unwrap()
    }

    #[test]
    fn missing_container_skips_scene() {
        assert!(Scene::mount(None, SceneConfig::default()).is_none());
    }

    #[test]
    fn zero_sized_container_skips_scene() {
        let empty = Viewport::new(0, 400);
        assert!(Scene::mount(Some(&empty), SceneConfig::default()).is_none());
    }

    #[test]
    fn mounts_into_container() {
        let container = Viewport::new(800, 600).with_pixel_ratio(2.5);
        let scene = Scene::mount(Some(&container), SceneConfig::default()).unwrap();

        assert_eq!(scene.viewport().pixel_ratio(), 2.0);
        assert!((scene.camera().aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn frames_are_pure_functions_of_time() {
        let scene = scene();
        let reference = scene.frame_at(7.25);

        for t in [0.0, 100.0, 3.0, 7.0] {
            let _ = scene.frame_at(t);
        }

        assert_eq!(scene.frame_at(7.25), reference);
        assert_eq!(scene.ribbon_colors_at(7.25), scene.ribbon_colors_at(7.25));
    }

    #[test]
    fn same_seed_same_frames_across_instances() {
        let a = scene();
        let b = scene();

        assert_eq!(a.frame_at(3.0), b.frame_at(3.0));
    }

    #[test]
    fn resize_recomputes_projection() {
        let mut scene = scene();
        let before = *scene.camera().projection_matrix();

        scene.resize(400, 400).unwrap();

        assert_eq!(scene.camera().aspect, 1.0);
        assert_ne!(*scene.camera().projection_matrix(), before);
        assert!(matches!(
            scene.resize(0, 10),
            Err(SceneError::EmptyViewport { .. })
        ));
        assert_eq!(scene.viewport().width, 400);
    }

    #[test]
    fn export_serialises_buffers() {
        let scene = scene();
        let export = scene.export();

        assert_eq!(export.stars.base_positions.len(), STAR_COUNT * 3);
        assert_eq!(export.ribbon.positions.len(), export.ribbon.normals.len());

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["seed"], 42);
        assert_eq!(json["star_program"]["blending"], "additive");
        assert!(json["ribbon_program"]["fragment"]
            .as_str()
            .unwrap()
            .contains("uTime"));
    }
}
