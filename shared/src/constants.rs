/// Default capsule radius for humanoid characters (world units, ~centimetres).
pub const DEFAULT_CAPSULE_RADIUS: f32 = 30.0;

/// Default half-length of the capsule's cylinder section.
///
/// Total capsule height is `2 * half_height + 2 * radius`.
pub const DEFAULT_CAPSULE_HALF_HEIGHT: f32 = 60.0;

/// Gravity magnitude in world units per second squared (positive value).
pub const GRAVITY: f32 = 981.0;

/// Terminal fall speed magnitude (world units per second).
pub const MAX_FALL_SPEED: f32 = 3000.0;

/// Steepest slope (degrees) a character can walk on.
pub const WALK_MAX_DEG: f32 = 45.0;

/// Steepest slope (degrees) a character slides down before it starts falling.
pub const SLIDE_TO_FALL_MAX_DEG: f32 = 67.0;

/// Base slide acceleration, scaled by `sin(slope)`.
pub const SLIDE_ACCELERATION: f32 = 1500.0;

/// Slide speed cap (world units per second).
pub const MAX_SLIDE_SPEED: f32 = 800.0;

/// Descent (world units) after which a `FallDown` becomes a `Fall`.
pub const FALL_DOWN_HEIGHT: f32 = 200.0;

/// Default walking speed (world units per second).
pub const WALK_SPEED: f32 = 180.0;

/// Default running speed (world units per second).
pub const RUN_SPEED: f32 = 450.0;

/// Minimum planar motion required to update yaw.
pub const YAW_EPS: f32 = 1.0e-6;

/// Largest delta accepted by a single simulation tick (seconds).
pub const MAX_TICK_DT: f32 = 0.125;

/// Solver sub-step length (seconds).
pub const MAX_SUBSTEP_DT: f32 = 1.0 / 30.0;

/// Upper bound on solver sub-steps per tick.
pub const MAX_SUBSTEPS: u32 = 4;
