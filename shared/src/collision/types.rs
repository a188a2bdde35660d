/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- the geometry backend (ray casts and capsule sweeps against static geometry)
- the kinematic sweep-and-slide loop
- ground probing and snapping
- the motion solver and the ledge probe built on top of them

Positions handed to the solver are *feet* positions (bottom of the capsule). The
backend works with capsule *centers*; [`CapsuleSpec::center_offset`] converts.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Vec2 = na::Vector2<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// Capsule specification for kinematic actors.
///
/// half_height is the half-length of the cylinder section (aligned with +Y),
/// so the total capsule height is 2*half_height + 2*radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleSpec {
    #[inline]
    pub fn new(radius: f32, half_height: f32) -> Self {
        Self {
            radius: radius.max(0.0),
            half_height: half_height.max(0.0),
        }
    }

    /// Total height from the bottom of the lower cap to the top of the upper cap.
    #[inline]
    pub fn height(&self) -> f32 {
        2.0 * (self.half_height + self.radius)
    }

    /// Vertical distance from the feet (capsule bottom) to the capsule center.
    #[inline]
    pub fn center_offset(&self) -> f32 {
        self.half_height + self.radius
    }

    #[inline]
    pub fn center_from_feet(&self, feet: Vec3) -> Vec3 {
        feet + Vec3::new(0.0, self.center_offset(), 0.0)
    }

    #[inline]
    pub fn feet_from_center(&self, center: Vec3) -> Vec3 {
        center - Vec3::new(0.0, self.center_offset(), 0.0)
    }
}

/// A ray cast result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// World-space impact point.
    pub point: Vec3,
    /// Unit surface normal at the impact point.
    pub normal: Vec3,
    /// Distance along the (normalized) ray direction.
    pub distance: f32,
}

/// Earliest contact reported by a capsule sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepHit {
    /// Fraction (0..1) of the tested translation where the hit occurred.
    pub fraction: f32,
    /// Unit surface normal, oriented to oppose the motion.
    pub normal: Vec3,
    /// World-space contact point on the static geometry.
    pub point: Vec3,
}

/// Result of a kinematic sweep-and-slide (capsule center space).
#[derive(Clone, Copy, Debug)]
pub struct MoveResult {
    /// Final capsule center position after applying the step and sliding.
    pub end_pos: Vec3,
    /// The first blocking contact of the step, if any.
    pub first_hit: Option<SweepHit>,
    /// Information about the last hit encountered during the step (if any).
    pub last_hit: Option<SweepHit>,
    /// Remaining translation that could not be consumed (usually zero on success).
    pub remaining: Vec3,
}

impl MoveResult {
    /// Was any part of the step blocked by geometry?
    #[inline]
    pub fn blocked(&self) -> bool {
        self.first_hit.is_some()
    }
}
