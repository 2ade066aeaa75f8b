//! The plasma ribbon: a closed tube swept along a figure-eight curve.

use std::f32::consts::TAU;

use serde::Serialize;

use crate::curve::ClosedCatmullRom;
use crate::math::{Rgb, Rgba, Vec3};

/// Control points sampled along the figure-eight (inclusive of both ends).
pub const CONTROL_SEGMENTS: usize = 200;
/// Horizontal half-width of the figure-eight.
pub const CURVE_SCALE: f32 = 2.0;
/// Vertical squash applied to the lobes.
pub const LOBE_SQUASH: f32 = 0.7;

pub const TUBULAR_SEGMENTS: usize = 200;
pub const RADIAL_SEGMENTS: usize = 32;
pub const TUBE_RADIUS: f32 = 0.3;

/// Ribbon opacity.
pub const RIBBON_ALPHA: f32 = 0.9;

/// Rim tint added at grazing angles.
const FRESNEL_TINT: Rgb = Rgb::new(0.3, 0.5, 0.8);

/// Triangle mesh for a tube, as flat GPU-ready buffers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TubeGeometry {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl TubeGeometry {
    /// Sweep a circle of `radius` along `curve`.
    pub fn sweep(
        curve: &ClosedCatmullRom,
        tubular_segments: usize,
        radius: f32,
        radial_segments: usize,
    ) -> Self {
        let tubular_segments = tubular_segments.max(1);
        let radial_segments = radial_segments.max(3);
        let frames = curve.frenet_frames(tubular_segments);

        let ring = radial_segments + 1;
        let vertex_count = (tubular_segments + 1) * ring;
        let mut positions = Vec::with_capacity(vertex_count * 3);
        let mut normals = Vec::with_capacity(vertex_count * 3);

        // The closing ring reuses the first sample so the seam is exact
        for i in (0..tubular_segments).chain(std::iter::once(0)) {
            let center = curve.point_at(i as f32 / tubular_segments as f32);
            let n = frames.normals[i];
            let b = frames.binormals[i];

            for j in 0..=radial_segments {
                let v = j as f32 / radial_segments as f32 * TAU;
                let (sin, cos) = (v.sin(), -v.cos());
                let normal = (n * cos + b * sin).normalize();
                let vertex = center + normal * radius;

                normals.extend_from_slice(&normal.to_array());
                positions.extend_from_slice(&vertex.to_array());
            }
        }

        let mut uvs = Vec::with_capacity(vertex_count * 2);
        for i in 0..=tubular_segments {
            for j in 0..=radial_segments {
                uvs.push(i as f32 / tubular_segments as f32);
                uvs.push(j as f32 / radial_segments as f32);
            }
        }

        let mut indices = Vec::with_capacity(tubular_segments * radial_segments * 6);
        for j in 1..=tubular_segments {
            for i in 1..=radial_segments {
                let a = (ring * (j - 1) + (i - 1)) as u32;
                let b = (ring * j + (i - 1)) as u32;
                let c = (ring * j + i) as u32;
                let d = (ring * (j - 1) + i) as u32;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self {
            positions,
            normals,
            uvs,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        vec3_at(&self.positions, index)
    }

    pub fn normal(&self, index: usize) -> Option<Vec3> {
        vec3_at(&self.normals, index)
    }
}

fn vec3_at(buffer: &[f32], index: usize) -> Option<Vec3> {
    let chunk = buffer.get(index * 3..index * 3 + 3)?;
    Some(Vec3::new(chunk[0], chunk[1], chunk[2]))
}

/// The animated ribbon mesh.
#[derive(Debug, Clone)]
pub struct PlasmaRibbon {
    curve: ClosedCatmullRom,
    geometry: TubeGeometry,
}

impl PlasmaRibbon {
    pub fn new() -> Self {
        let points = (0..=CONTROL_SEGMENTS)
            .map(|i| {
                let t = i as f32 / CONTROL_SEGMENTS as f32 * TAU;
                Vec3::new(
                    CURVE_SCALE * t.cos(),
                    CURVE_SCALE * t.sin() * t.cos() * LOBE_SQUASH,
                    0.0,
                )
            })
            .collect();

        let curve = ClosedCatmullRom::new(points);
        let geometry = TubeGeometry::sweep(&curve, TUBULAR_SEGMENTS, TUBE_RADIUS, RADIAL_SEGMENTS);

        Self { curve, geometry }
    }

    pub fn curve(&self) -> &ClosedCatmullRom {
        &self.curve
    }

    pub fn geometry(&self) -> &TubeGeometry {
        &self.geometry
    }

    /// Euler rotation (x, y, z) of the mesh at `elapsed` seconds.
    pub fn rotation_at(elapsed: f32) -> Vec3 {
        Vec3::new(
            (elapsed * 0.2).cos() * 0.1,
            (elapsed * 0.3).sin() * 0.3,
            0.0,
        )
    }

    /// Colour of every vertex at `elapsed` seconds.
    pub fn colors_at(&self, elapsed: f32) -> Vec<Rgba> {
        (0..self.geometry.vertex_count())
            .filter_map(|i| {
                let position = self.geometry.position(i)?;
                let normal = self.geometry.normal(i)?;
                Some(plasma_color(position, normal, elapsed))
            })
            .collect()
    }
}

impl Default for PlasmaRibbon {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosine palette: `a + b * cos(2π(c·t + d))`.
fn palette(t: f32) -> Rgb {
    const A: Rgb = Rgb::new(0.2, 0.5, 0.8);
    const B: Rgb = Rgb::new(0.5, 0.3, 0.6);
    const D: Rgb = Rgb::new(0.0, 0.33, 0.67);

    Rgb::new(
        A.r + B.r * (TAU * (t + D.r)).cos(),
        A.g + B.g * (TAU * (t + D.g)).cos(),
        A.b + B.b * (TAU * (t + D.b)).cos(),
    )
}

/// Brightness pulse shared by the whole ribbon at `elapsed` seconds.
pub fn pulse_at(elapsed: f32) -> f32 {
    let time = elapsed * 0.5;
    (time * 2.0).sin() * 0.1 + 0.75
}

/// Ribbon colour for an object-space `position` and `normal` at `elapsed` seconds.
///
/// Mirrors the ribbon fragment shader so frames can be checked off-GPU.
pub fn plasma_color(position: Vec3, normal: Vec3, elapsed: f32) -> Rgba {
    let time = elapsed * 0.5;

    let plasma1 = (position.x * 3.0 + time).sin();
    let plasma2 = (position.y * 3.0 + time * 1.3).sin();
    let plasma3 = ((position.x + position.y) * 2.0 + time * 0.7).sin();
    let plasma = (plasma1 + plasma2 + plasma3) / 3.0;

    let base = palette(plasma * 0.5 + 0.5);
    let fresnel = (1.0 - normal.dot(Vec3::Z).abs()).powi(2);
    let lit = base + FRESNEL_TINT.scale(fresnel);

    lit.scale(pulse_at(elapsed)).with_alpha(RIBBON_ALPHA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tube_has_expected_topology() {
        let ribbon = PlasmaRibbon::new();
        let geometry = ribbon.geometry();

        assert_eq!(ribbon.curve().points().len(), CONTROL_SEGMENTS + 1);
        assert_eq!(
            geometry.vertex_count(),
            (TUBULAR_SEGMENTS + 1) * (RADIAL_SEGMENTS + 1)
        );
        assert_eq!(geometry.uvs.len(), geometry.vertex_count() * 2);
        assert_eq!(
            geometry.triangle_count(),
            TUBULAR_SEGMENTS * RADIAL_SEGMENTS * 2
        );
        let max = geometry.vertex_count() as u32;
        assert!(geometry.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn seam_ring_matches_first_ring() {
        let geometry = PlasmaRibbon::new().geometry().clone();
        let ring = RADIAL_SEGMENTS + 1;
        let last = TUBULAR_SEGMENTS * ring;

        for j in 0..ring {
            assert_eq!(geometry.position(j), geometry.position(last + j));
        }
    }

    #[test]
    fn vertices_sit_on_tube_surface() {
        let ribbon = PlasmaRibbon::new();
        let geometry = ribbon.geometry();
        let ring = RADIAL_SEGMENTS + 1;

        for i in [0, 17, 100, 150] {
            let center = ribbon.curve().point_at(i as f32 / TUBULAR_SEGMENTS as f32);
            for j in 0..ring {
                let vertex = geometry.position(i * ring + j).unwrap();
                assert!(((vertex - center).length() - TUBE_RADIUS).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn rotation_is_bounded_and_deterministic() {
        for t in [0.0, 1.0, 5.5, 1000.0] {
            let r = PlasmaRibbon::rotation_at(t);
            assert!(r.x.abs() <= 0.1 + 1e-6);
            assert!(r.y.abs() <= 0.3 + 1e-6);
            assert_eq!(r, PlasmaRibbon::rotation_at(t));
        }
        assert!((PlasmaRibbon::rotation_at(0.0).x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn plasma_color_is_pure() {
        let p = Vec3::new(0.5, -0.2, 0.1);
        let n = Vec3::new(0.0, 0.6, 0.8);

        let first = plasma_color(p, n, 2.5);
        let _ = plasma_color(p, n, 9.0);
        assert_eq!(plasma_color(p, n, 2.5), first);
        assert_eq!(first.a, RIBBON_ALPHA);
    }

    #[test]
    fn facing_normals_get_no_rim() {
        let p = Vec3::ZERO;
        let facing = plasma_color(p, Vec3::Z, 0.0);
        let grazing = plasma_color(p, Vec3::X, 0.0);

        let pulse = pulse_at(0.0);
        assert!((grazing.r - facing.r - 0.3 * pulse).abs() < 1e-5);
        assert!((grazing.b - facing.b - 0.8 * pulse).abs() < 1e-5);
    }

    #[test]
    fn pulse_stays_in_range() {
        for i in 0..100 {
            let p = pulse_at(i as f32 * 0.37);
            assert!((0.65..=0.85).contains(&p));
        }
    }
}
