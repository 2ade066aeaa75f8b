//! Deterministic model of the decorative hero scene.
//!
//! The scene is a field of pulsing star sprites plus a closed tube ("plasma
//! ribbon") whose colour is a procedural function of time. Every animated
//! value is a pure function of elapsed seconds, so any frame can be sampled
//! directly without replaying the ones before it.
//!
//! The browser draws the scene from a [`SceneExport`]; [`AnimationLoop`]
//! drives the same model natively with explicit start/stop/cancel control.

pub mod animation;
pub mod camera;
pub mod curve;
pub mod math;
pub mod ribbon;
pub mod scene;
pub mod shaders;
pub mod sprite;
pub mod starfield;

pub use animation::{AnimationLoop, FrameSink};
pub use camera::{PerspectiveCamera, Viewport};
pub use math::{Rgb, Rgba, Vec3};
pub use ribbon::{plasma_color, PlasmaRibbon, TubeGeometry};
pub use scene::{FrameSample, Scene, SceneConfig, SceneContainer, SceneError, SceneExport};
pub use sprite::StarSprite;
pub use starfield::Starfield;
