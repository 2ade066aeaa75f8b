//! Closed centripetal Catmull-Rom curve with arc-length parameterisation.

use crate::math::Vec3;

/// Number of samples used for the arc-length table.
const ARC_LENGTH_DIVISIONS: usize = 200;

/// Finite-difference step for tangents.
const TANGENT_DELTA: f32 = 0.0001;

/// A closed centripetal Catmull-Rom spline through a list of control points.
#[derive(Debug, Clone)]
pub struct ClosedCatmullRom {
    points: Vec<Vec3>,
    arc_lengths: Vec<f32>,
}

/// Per-sample orientation frames along a curve.
#[derive(Debug, Clone)]
pub struct FrenetFrames {
    pub tangents: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub binormals: Vec<Vec3>,
}

impl ClosedCatmullRom {
    /// Build a curve through `points`. At least two points are needed for a
    /// non-degenerate curve.
    pub fn new(points: Vec<Vec3>) -> Self {
        let mut curve = Self {
            points,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.compute_lengths(ARC_LENGTH_DIVISIONS);
        curve
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Total curve length.
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at parameter `t` in `[0, 1]` (not arc-length uniform).
    pub fn point(&self, t: f32) -> Vec3 {
        let count = self.points.len();
        match count {
            0 => return Vec3::ZERO,
            1 => return self.points[0],
            _ => {}
        }

        let p = count as f32 * t;
        let int_point = p.floor();
        let weight = p - int_point;
        let i = int_point as isize;

        let at = |offset: isize| self.points[(i + offset).rem_euclid(count as isize) as usize];
        let (p0, p1, p2, p3) = (at(-1), at(0), at(1), at(2));

        // Centripetal parameterisation: knot spacing is sqrt of chord length
        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);

        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let axis = |a: f32, b: f32, c: f32, d: f32| {
            nonuniform_catmull_rom(a, b, c, d, dt0, dt1, dt2, weight)
        };

        Vec3::new(
            axis(p0.x, p1.x, p2.x, p3.x),
            axis(p0.y, p1.y, p2.y, p3.y),
            axis(p0.z, p1.z, p2.z, p3.z),
        )
    }

    /// Point at arc-length fraction `u` in `[0, 1]`.
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at arc-length fraction `u`.
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        let t = self.u_to_t(u);
        let t1 = (t - TANGENT_DELTA).max(0.0);
        let t2 = (t + TANGENT_DELTA).min(1.0);
        (self.point(t2) - self.point(t1)).normalize()
    }

    /// Parallel-transport frames at `segments + 1` evenly spaced samples,
    /// twisted so the first and last frames agree on a closed curve.
    pub fn frenet_frames(&self, segments: usize) -> FrenetFrames {
        let segments = segments.max(1);
        let tangents: Vec<Vec3> = (0..=segments)
            .map(|i| self.tangent_at(i as f32 / segments as f32))
            .collect();

        let mut normals = vec![Vec3::ZERO; segments + 1];
        let mut binormals = vec![Vec3::ZERO; segments + 1];

        // Seed the first normal from the tangent's smallest component
        let t0 = tangents[0];
        let mut min = f32::MAX;
        let mut seed = Vec3::ZERO;
        if t0.x.abs() <= min {
            min = t0.x.abs();
            seed = Vec3::X;
        }
        if t0.y.abs() <= min {
            min = t0.y.abs();
            seed = Vec3::Y;
        }
        if t0.z.abs() <= min {
            seed = Vec3::Z;
        }

        let side = t0.cross(seed).normalize();
        normals[0] = t0.cross(side);
        binormals[0] = t0.cross(normals[0]);

        for i in 1..=segments {
            normals[i] = normals[i - 1];

            let axis = tangents[i - 1].cross(tangents[i]);
            if axis.length() > f32::EPSILON {
                let theta = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
                normals[i] = normals[i].rotate_around(axis.normalize(), theta);
            }

            binormals[i] = tangents[i].cross(normals[i]);
        }

        // Spread the closing twist evenly over the loop
        let mut theta = normals[0].dot(normals[segments]).clamp(-1.0, 1.0).acos() / segments as f32;
        if tangents[0].dot(normals[0].cross(normals[segments])) > 0.0 {
            theta = -theta;
        }

        for i in 1..=segments {
            normals[i] = normals[i].rotate_around(tangents[i], theta * i as f32);
            binormals[i] = tangents[i].cross(normals[i]);
        }

        FrenetFrames {
            tangents,
            normals,
            binormals,
        }
    }

    fn compute_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        lengths.push(0.0);

        for p in 1..=divisions {
            let current = self.point(p as f32 / divisions as f32);
            sum += current.distance(last);
            lengths.push(sum);
            last = current;
        }

        lengths
    }

    /// Map an arc-length fraction to the curve parameter.
    fn u_to_t(&self, u: f32) -> f32 {
        let lengths = &self.arc_lengths;
        let count = lengths.len();
        if count < 2 || self.length() == 0.0 {
            return u;
        }

        let target = u.clamp(0.0, 1.0) * self.length();

        // Last index whose cumulative length is <= target
        let i = lengths
            .partition_point(|&len| len <= target)
            .saturating_sub(1)
            .min(count - 1);

        if lengths[i] == target || i == count - 1 {
            return i as f32 / (count - 1) as f32;
        }

        let before = lengths[i];
        let after = lengths[i + 1];
        let fraction = (target - before) / (after - before);

        (i as f32 + fraction) / (count - 1) as f32
    }
}

/// One axis of a non-uniform Catmull-Rom segment between `x1` and `x2`.
#[allow(clippy::too_many_arguments)]
fn nonuniform_catmull_rom(
    x0: f32,
    x1: f32,
    x2: f32,
    x3: f32,
    dt0: f32,
    dt1: f32,
    dt2: f32,
    t: f32,
) -> f32 {
    let mut t1 = (x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1;
    let mut t2 = (x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2;
    t1 *= dt1;
    t2 *= dt1;

    let c0 = x1;
    let c1 = t1;
    let c2 = -3.0 * x1 + 3.0 * x2 - 2.0 * t1 - t2;
    let c3 = 2.0 * x1 - 2.0 * x2 + t1 + t2;

    c0 + c1 * t + c2 * t * t + c3 * t * t * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn circle(n: usize) -> ClosedCatmullRom {
        ClosedCatmullRom::new(
            (0..n)
                .map(|i| {
                    let a = i as f32 / n as f32 * TAU;
                    Vec3::new(a.cos(), a.sin(), 0.0)
                })
                .collect(),
        )
    }

    #[test]
    fn passes_through_control_points() {
        let curve = circle(8);

        for (i, p) in curve.points().iter().enumerate() {
            let on_curve = curve.point(i as f32 / 8.0);
            assert!((on_curve - *p).length() < 1e-4, "point {i}");
        }
    }

    #[test]
    fn is_closed() {
        let curve = circle(12);

        assert!((curve.point(0.0) - curve.point(1.0)).length() < 1e-4);
        assert!((curve.point_at(0.0) - curve.point_at(1.0)).length() < 1e-4);
    }

    #[test]
    fn length_approximates_circumference() {
        let curve = circle(64);

        assert!((curve.length() - TAU).abs() < 0.01);
    }

    #[test]
    fn frames_are_orthonormal() {
        let frames = circle(32).frenet_frames(40);

        assert_eq!(frames.tangents.len(), 41);
        for i in 0..=40 {
            let (t, n, b) = (frames.tangents[i], frames.normals[i], frames.binormals[i]);
            assert!((t.length() - 1.0).abs() < 1e-3);
            assert!((n.length() - 1.0).abs() < 1e-3);
            assert!(t.dot(n).abs() < 1e-3);
            assert!(b.dot(n).abs() < 1e-3);
        }
    }

    #[test]
    fn arc_length_mapping_is_monotonic() {
        let curve = circle(10);
        let mut last = -1.0;

        for i in 0..=20 {
            let t = curve.u_to_t(i as f32 / 20.0);
            assert!(t >= last);
            last = t;
        }
        assert_eq!(curve.u_to_t(0.0), 0.0);
        assert_eq!(curve.u_to_t(1.0), 1.0);
    }
}
