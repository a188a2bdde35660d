use std::f32::consts::{PI, TAU};

use crate::collision::types::{Quat, Vec2, Vec3};
use crate::constants::YAW_EPS;

/// Yaw (radians) facing along a planar direction, or `None` for a near-zero direction.
///
/// Convention: yaw 0 faces -Z; `forward = (-sin yaw, -cos yaw)`.
pub fn yaw_from_xz(xz: Vec2) -> Option<f32> {
    if xz.norm_squared() > YAW_EPS {
        return Some((-xz[0]).atan2(-xz[1]));
    }

    None
}

/// Planar forward direction for a yaw angle (inverse of [`yaw_from_xz`]).
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec2 {
    Vec2::new(-yaw.sin(), -yaw.cos())
}

/// Yaw-only orientation.
#[inline]
pub fn yaw_to_quat(yaw: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), yaw)
}

/// Yaw of an orientation (rotation about +Y).
#[inline]
pub fn quat_to_yaw(q: &Quat) -> f32 {
    let fwd = q * Vec3::new(0.0, 0.0, -1.0);
    yaw_from_xz(Vec2::new(fwd.x, fwd.z)).unwrap_or(0.0)
}

/// Wrap an angle into `(-PI, PI]`.
#[inline]
pub fn wrap_angle(a: f32) -> f32 {
    let r = (a + PI).rem_euclid(TAU) - PI;
    if r <= -PI { r + TAU } else { r }
}

/// Exponential-decay turn from `current` towards `target` (radians).
///
/// `rate` is in 1/s; the remaining error shrinks by `exp(-rate * dt)` each call and never
/// overshoots.
pub fn turn_towards_yaw(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let diff = wrap_angle(target - current);
    let alpha = 1.0 - (-rate.max(0.0) * dt.max(0.0)).exp();
    wrap_angle(current + diff * alpha)
}

/// Drop the Y component.
#[inline]
pub fn to_planar(v: &Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Planar (XZ) distance squared between two positions.
pub fn planar_distance_sq(a: Vec2, b: Vec2) -> f32 {
    let x = b.x - a.x;
    let z = b.y - a.y;
    x * x + z * z
}

/// Planar (XZ) distance between two world positions.
#[inline]
pub fn planar_distance(a: &Vec3, b: &Vec3) -> f32 {
    planar_distance_sq(to_planar(a), to_planar(b)).sqrt()
}

/// Normalize `v`, or return `fallback` when `v` is near zero or not finite.
#[inline]
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    let len_sq = v.norm_squared();
    if len_sq > 1.0e-12 && len_sq.is_finite() {
        v / len_sq.sqrt()
    } else {
        fallback
    }
}

/// Planar variant of [`safe_normalize`].
#[inline]
pub fn safe_normalize2(v: Vec2, fallback: Vec2) -> Vec2 {
    let len_sq = v.norm_squared();
    if len_sq > 1.0e-12 && len_sq.is_finite() {
        v / len_sq.sqrt()
    } else {
        fallback
    }
}

/// Left-hand perpendicular in the XZ plane.
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Cubic smoothstep on `[0, 1]`.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Angle (degrees) between a surface normal and +Y.
#[inline]
pub fn slope_angle_deg(normal: &Vec3) -> f32 {
    let n = safe_normalize(*normal, Vec3::y());
    n.y.clamp(-1.0, 1.0).acos().to_degrees()
}
