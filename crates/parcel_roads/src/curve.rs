//! Cubic Bezier curves and the horizontal-plane distance queries the resolver
//! runs against road geometry.
//!
//! Curves live in 3D but every query here works in the X-Z plane: height is
//! ignored when deciding how close a parcel is to a road.

use bevy::prelude::*;

use crate::config::{CURVE_COARSE_SAMPLES, CURVE_REFINE_ITERATIONS};

/// Which side of a directed curve a point falls on, looking along the tangent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoadSide {
    Left,
    Right,
}

/// Cubic Bezier curve with four control points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bezier4 {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub d: Vec3,
}

impl Bezier4 {
    pub const fn new(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Self { a, b, c, d }
    }

    /// Straight curve with its inner control points at the thirds.
    pub fn line(from: Vec3, to: Vec3) -> Self {
        Self {
            a: from,
            b: from.lerp(to, 1.0 / 3.0),
            c: from.lerp(to, 2.0 / 3.0),
            d: to,
        }
    }

    /// Evaluate the curve at `t`, clamped to [0, 1].
    pub fn position(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let uu = u * u;
        let tt = t * t;
        u * uu * self.a + 3.0 * uu * t * self.b + 3.0 * u * tt * self.c + t * tt * self.d
    }

    /// First derivative at `t`, clamped to [0, 1].
    pub fn tangent(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        3.0 * u * u * (self.b - self.a)
            + 6.0 * u * t * (self.c - self.b)
            + 3.0 * t * t * (self.d - self.c)
    }

    /// Control-point interpolation between two curves.
    pub fn lerp(&self, other: &Bezier4, f: f32) -> Bezier4 {
        Bezier4 {
            a: self.a.lerp(other.a, f),
            b: self.b.lerp(other.b, f),
            c: self.c.lerp(other.c, f),
            d: self.d.lerp(other.d, f),
        }
    }

    /// Split at `t` with de Casteljau subdivision.
    pub fn split(&self, t: f32) -> (Bezier4, Bezier4) {
        let ab = self.a.lerp(self.b, t);
        let bc = self.b.lerp(self.c, t);
        let cd = self.c.lerp(self.d, t);
        let abc = ab.lerp(bc, t);
        let bcd = bc.lerp(cd, t);
        let abcd = abc.lerp(bcd, t);
        (
            Bezier4::new(self.a, ab, abc, abcd),
            Bezier4::new(abcd, bcd, cd, self.d),
        )
    }

    /// Approximate parallel curve shifted `distance` to the left in the X-Z
    /// plane (negative shifts right). Exact for straight curves.
    pub fn offset_xz(&self, distance: f32) -> Bezier4 {
        let n0 = left_normal(self.tangent(0.0)) * distance;
        let n1 = left_normal(self.tangent(1.0)) * distance;
        Bezier4::new(self.a + n0, self.b + n0, self.c + n1, self.d + n1)
    }

    /// X-Z bounds of the control polygon. The curve lies inside its convex
    /// hull, so this is a conservative bound.
    pub fn bounds_xz(&self) -> Rect {
        let a = xz(self.a);
        let b = xz(self.b);
        let c = xz(self.c);
        let d = xz(self.d);
        Rect::from_corners(a.min(b).min(c).min(d), a.max(b).max(c).max(d))
    }

    /// Curve parameter of the point closest to `point` in the X-Z plane.
    ///
    /// Uniform coarse scan followed by a fixed number of bracket-halving
    /// refinement rounds. Equal distances keep the smaller `t`.
    pub fn nearest_parameter(&self, point: Vec3) -> f32 {
        let p = xz(point);
        let dist_sq = |t: f32| xz(self.position(t)).distance_squared(p);

        let mut best_t = 0.0_f32;
        let mut best_d = dist_sq(0.0);
        for i in 1..=CURVE_COARSE_SAMPLES {
            let t = i as f32 / CURVE_COARSE_SAMPLES as f32;
            let d = dist_sq(t);
            if d < best_d {
                best_t = t;
                best_d = d;
            }
        }

        let mut step = 1.0 / CURVE_COARSE_SAMPLES as f32;
        for _ in 0..CURVE_REFINE_ITERATIONS {
            step *= 0.5;
            let center = best_t;
            for t in [(center - step).max(0.0), (center + step).min(1.0)] {
                let d = dist_sq(t);
                if d < best_d || (d == best_d && t < best_t) {
                    best_t = t;
                    best_d = d;
                }
            }
        }
        best_t
    }

    /// Distance from `point` to the curve in the X-Z plane, and the curve
    /// parameter where it is reached.
    pub fn distance_xz(&self, point: Vec3) -> (f32, f32) {
        let t = self.nearest_parameter(point);
        (xz(self.position(t)).distance(xz(point)), t)
    }
}

/// Project a world-space point onto the horizontal plane.
#[inline]
pub fn xz(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Unit vector pointing to the left of `tangent` in the X-Z plane.
pub fn left_normal(tangent: Vec3) -> Vec3 {
    Vec3::new(-tangent.z, 0.0, tangent.x).normalize_or_zero()
}

/// Distance from `p` to the straight segment `a`-`b` in the X-Z plane.
pub fn distance_to_segment(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    let a = xz(a);
    let b = xz(b);
    let p = xz(p);
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a.distance(p);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t).distance(p)
}

/// Side of a directed curve that `to_point` (offset from the curve point)
/// falls on, given the curve tangent at that point. Points exactly on the
/// tangent line count as `Left`.
pub fn side_of(tangent: Vec3, to_point: Vec3) -> RoadSide {
    let t = xz(tangent);
    let right = Vec2::new(t.y, -t.x);
    if xz(to_point).dot(right) > 0.0 {
        RoadSide::Right
    } else {
        RoadSide::Left
    }
}

/// Squared distance from `p` to the closest point of `rect` (zero inside).
pub fn rect_distance_sq(rect: Rect, p: Vec2) -> f32 {
    let dx = (rect.min.x - p.x).max(0.0).max(p.x - rect.max.x);
    let dy = (rect.min.y - p.y).max(0.0).max(p.y - rect.max.y);
    dx * dx + dy * dy
}
