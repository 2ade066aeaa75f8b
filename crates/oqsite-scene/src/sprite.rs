//! Star sprite texture.

use serde::Serialize;

/// Sprite edge length in pixels.
pub const SPRITE_SIZE: usize = 64;

/// Radius of the opaque core in pixels.
const CORE_RADIUS: f32 = 12.0;

/// Radial alpha stops: (offset, alpha), offset as a fraction of the sprite radius.
const ALPHA_STOPS: [(f32, f32); 6] = [
    (0.0, 1.0),
    (0.2, 1.0),
    (0.4, 0.8),
    (0.6, 0.4),
    (0.8, 0.1),
    (1.0, 0.0),
];

/// White radial-gradient sprite with an opaque core, stored as RGBA8.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarSprite {
    pub size: usize,
    pub pixels: Vec<u8>,
}

impl StarSprite {
    pub fn generate() -> Self {
        let center = SPRITE_SIZE as f32 / 2.0;
        let mut pixels = Vec::with_capacity(SPRITE_SIZE * SPRITE_SIZE * 4);

        for y in 0..SPRITE_SIZE {
            for x in 0..SPRITE_SIZE {
                let dx = x as f32 + 0.5 - center;
                let dy = y as f32 + 0.5 - center;
                let alpha = alpha_at(dx.hypot(dy), center);
                pixels.extend_from_slice(&[255, 255, 255, (alpha * 255.0).round() as u8]);
            }
        }

        Self {
            size: SPRITE_SIZE,
            pixels,
        }
    }

    /// Alpha channel at pixel `(x, y)`.
    pub fn alpha(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.pixels.get((y * self.size + x) * 4 + 3).copied()
    }
}

/// Sprite opacity at `distance` pixels from the centre of a sprite with `radius`.
pub fn alpha_at(distance: f32, radius: f32) -> f32 {
    if distance <= CORE_RADIUS {
        return 1.0;
    }

    let offset = (distance / radius).clamp(0.0, 1.0);
    for pair in ALPHA_STOPS.windows(2) {
        let (start, from) = pair[0];
        let (end, to) = pair[1];
        if offset <= end {
            let t = (offset - start) / (end - start);
            return from + (to - from) * t;
        }
    }

    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_is_opaque_and_corners_transparent() {
        let sprite = StarSprite::generate();

        assert_eq!(sprite.pixels.len(), SPRITE_SIZE * SPRITE_SIZE * 4);
        assert_eq!(sprite.alpha(32, 32), Some(255));
        assert_eq!(sprite.alpha(0, 0), Some(0));
        assert_eq!(sprite.alpha(64, 0), None);
    }

    #[test]
    fn alpha_follows_gradient_stops() {
        assert_eq!(alpha_at(0.0, 32.0), 1.0);
        assert_eq!(alpha_at(12.0, 32.0), 1.0);
        assert!((alpha_at(0.6 * 32.0, 32.0) - 0.4).abs() < 1e-5);
        assert!((alpha_at(0.7 * 32.0, 32.0) - 0.25).abs() < 1e-5);
        assert_eq!(alpha_at(40.0, 32.0), 0.0);
    }

    #[test]
    fn alpha_fades_outward() {
        let mut last = 1.0;
        for d in 0..40 {
            let a = alpha_at(d as f32, 32.0);
            assert!(a <= last);
            last = a;
        }
    }
}
