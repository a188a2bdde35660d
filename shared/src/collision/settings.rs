/*!
Kinematic character controller (KCC) tolerances.

These constants centralize the parameters used by the sweep-and-slide loop and the
ground probes. Keeping them together makes tuning easier and keeps behavior
deterministic across platforms.

Notes
- Distances are in world units (centimetre scale), time in seconds.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
- Per-character tuning lives in [`crate::config::KccConfig`]; these are the defaults it
  starts from plus the internal tolerances that are not meant to be tuned.
*/

/// Separation kept from surfaces when a sweep is clamped (world units).
/// Too large creates visible gaps; too small risks jitter on contact.
pub const DEFAULT_SKIN: f32 = 0.5;

/// Maximum number of slide iterations per kinematic sweep.
/// Higher values help with tight corners at the cost of more queries.
pub const DEFAULT_MAX_ITERATIONS: u32 = 4;

/// Minimum squared movement threshold to consider a step meaningful.
/// Movements below this are treated as zero to avoid tiny oscillations.
pub const MIN_MOVE_SQ: f32 = 1.0e-6;

/// Practical small distance for comparisons.
/// Use for dot-product guards, equality checks in world space, etc.
pub const DIST_EPS: f32 = 1.0e-4;

/// Hover height kept between the capsule bottom and the ground.
/// Prevents exact contact, which reduces jitter and start-penetrating sweeps.
pub const SNAP_HOVER_HEIGHT: f32 = 1.0;

/// Length of the short down-sweep that decides ground contact.
pub const GROUND_PROBE_DISTANCE: f32 = 6.0;

/// Max drop the ground recovery may snap down over (ledges, stairs).
pub const MAX_SNAP_DOWN: f32 = 30.0;

/// Gap tolerance below which the controller does not bother re-snapping to the hover height.
pub const SNAP_TOLERANCE: f32 = 0.05;

/// A hit normal must oppose the motion by at least this much to block it.
/// Grazing contacts (moving parallel to a surface) are ignored.
pub const BLOCKING_DOT: f32 = 1.0e-3;
