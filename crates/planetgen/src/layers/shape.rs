//! Geometric primitives shared by the carving layers.

use glam::Vec2;

/// Hermite smoothstep of `x` between `edge0` and `edge1`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Distance from `p` to the segment `a..b`.
pub fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Distance from `p` to the closest segment of a polyline.
pub fn polyline_distance(p: Vec2, points: &[Vec2]) -> f32 {
    match points {
        [] => f32::INFINITY,
        [only] => p.distance(*only),
        _ => points
            .windows(2)
            .map(|w| segment_distance(p, w[0], w[1]))
            .fold(f32::INFINITY, f32::min),
    }
}

/// 1 within `inner * radius` of `center`, easing to 0 at `radius` and beyond.
#[inline]
pub fn radial_falloff(p: Vec2, center: Vec2, radius: f32, inner: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    1.0 - smoothstep(inner, 1.0, p.distance(center) / radius)
}

/// Inner fraction of a crater radius that stays at full depth.
pub const CRATER_FLOOR: f32 = 0.35;
/// Outer edge of the ejecta shoulder, in crater radii.
pub const CRATER_SHOULDER: f32 = 1.5;

/// Height change of an impact crater at normalized distance `r` (1 = crater edge).
///
/// Three zones: a smoothstep bowl from `-depth` on the floor up to the rim,
/// the raised rim peaking at `rim_height` on the edge, and an outer shoulder
/// that decays back to zero at [`CRATER_SHOULDER`].
pub fn crater_profile(r: f32, depth: f32, rim_height: f32) -> f32 {
    if r < 1.0 {
        let s = smoothstep(CRATER_FLOOR, 1.0, r);
        -depth + (depth + rim_height) * s
    } else if r < CRATER_SHOULDER {
        let t = (r - 1.0) / (CRATER_SHOULDER - 1.0);
        rim_height * (1.0 - smoothstep(0.0, 1.0, t))
    } else {
        0.0
    }
}
