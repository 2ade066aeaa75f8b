//! Procedural starfield.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::math::{Rgb, Vec3};

/// Number of stars in the hero scene.
pub const STAR_COUNT: usize = 150;

/// Depth wobble amplitude in world units.
pub const WOBBLE_AMPLITUDE: f32 = 0.1;

/// Star tints, deliberately over-bright so additive blending glows.
pub const STAR_PALETTE: [Rgb; 7] = [
    Rgb::new(0.8, 1.0, 1.5),
    Rgb::new(1.0, 1.2, 1.5),
    Rgb::new(1.5, 1.5, 1.5),
    Rgb::new(1.5, 1.5, 1.0),
    Rgb::new(1.5, 1.3, 0.8),
    Rgb::new(1.5, 1.0, 0.7),
    Rgb::new(1.5, 0.8, 0.7),
];

/// Field extents: x in [-6, 6), y in [-4, 4), z in [-5, 1).
const SPREAD: Vec3 = Vec3::new(12.0, 8.0, 6.0);
const DEPTH_OFFSET: f32 = -2.0;

/// A field of point stars that wobble in depth over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Starfield {
    base_positions: Vec<Vec3>,
    colors: Vec<Rgb>,
}

impl Starfield {
    /// Generate `count` stars from `seed`. The same seed always yields the same field.
    pub fn generate(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut base_positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);

        for _ in 0..count {
            let x = (rng.gen::<f32>() - 0.5) * SPREAD.x;
            let y = (rng.gen::<f32>() - 0.5) * SPREAD.y;
            let z = (rng.gen::<f32>() - 0.5) * SPREAD.z + DEPTH_OFFSET;
            base_positions.push(Vec3::new(x, y, z));

            colors.push(STAR_PALETTE[rng.gen_range(0..STAR_PALETTE.len())]);
        }

        Self {
            base_positions,
            colors,
        }
    }

    pub fn len(&self) -> usize {
        self.base_positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base_positions.is_empty()
    }

    /// Resting positions.
    pub fn base_positions(&self) -> &[Vec3] {
        &self.base_positions
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Position of star `index` at `elapsed` seconds.
    pub fn position_at(&self, index: usize, elapsed: f32) -> Option<Vec3> {
        let base = *self.base_positions.get(index)?;
        let wobble = (elapsed + index as f32).sin() * WOBBLE_AMPLITUDE;
        Some(Vec3::new(base.x, base.y, base.z + wobble))
    }

    /// Positions of every star at `elapsed` seconds.
    pub fn positions_at(&self, elapsed: f32) -> Vec<Vec3> {
        self.base_positions
            .iter()
            .enumerate()
            .map(|(index, base)| {
                let wobble = (elapsed + index as f32).sin() * WOBBLE_AMPLITUDE;
                Vec3::new(base.x, base.y, base.z + wobble)
            })
            .collect()
    }

    /// Flat `xyz` position buffer at `elapsed` seconds.
    pub fn position_buffer_at(&self, elapsed: f32) -> Vec<f32> {
        self.positions_at(elapsed)
            .into_iter()
            .flat_map(Vec3::to_array)
            .collect()
    }

    /// Flat `rgb` colour buffer.
    pub fn color_buffer(&self) -> Vec<f32> {
        self.colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_field() {
        assert_eq!(Starfield::generate(STAR_COUNT, 7), Starfield::generate(STAR_COUNT, 7));
        assert_ne!(Starfield::generate(STAR_COUNT, 7), Starfield::generate(STAR_COUNT, 8));
    }

    #[test]
    fn stars_stay_within_bounds() {
        let field = Starfield::generate(STAR_COUNT, 42);

        assert_eq!(field.len(), STAR_COUNT);
        for p in field.base_positions() {
            assert!((-6.0..6.0).contains(&p.x));
            assert!((-4.0..4.0).contains(&p.y));
            assert!((-5.0..1.0).contains(&p.z));
        }
        for c in field.colors() {
            assert!(STAR_PALETTE.contains(c));
        }
    }

    #[test]
    fn only_depth_wobbles() {
        let field = Starfield::generate(10, 1);

        for (index, (now, base)) in field
            .positions_at(3.7)
            .iter()
            .zip(field.base_positions())
            .enumerate()
        {
            assert_eq!(now.x, base.x);
            assert_eq!(now.y, base.y);
            let expected = base.z + (3.7 + index as f32).sin() * WOBBLE_AMPLITUDE;
            assert!((now.z - expected).abs() < 1e-6);
            assert!((now.z - base.z).abs() <= WOBBLE_AMPLITUDE + 1e-6);
        }
    }

    #[test]
    fn positions_do_not_depend_on_history() {
        let field = Starfield::generate(STAR_COUNT, 42);
        let direct = field.position_buffer_at(12.5);

        for t in [0.0, 1.0, 99.0, 4.2] {
            let _ = field.positions_at(t);
        }

        assert_eq!(field.position_buffer_at(12.5), direct);
        assert_eq!(field.position_at(3, 12.5), field.positions_at(12.5).get(3).copied());
    }

    #[test]
    fn buffers_are_flat_xyz() {
        let field = Starfield::generate(5, 3);

        assert_eq!(field.position_buffer_at(0.0).len(), 15);
        assert_eq!(field.color_buffer().len(), 15);
    }
}
