/*!
NPC locomotion core.

- collision: geometry query seam, rapier-backed static world, capsule sweeps and ground probes
- motion:    kinematic motion solver, ledge probe and jumps
- crowd:     character-vs-character resolver and deadlock escape
- waynet:    waypoint graph and A* routing
- steering:  planar step toward a target
*/

pub mod collision;
pub mod config;
pub mod constants;
pub mod crowd;
pub mod error;
pub mod motion;
pub mod steering;
pub mod utils;
pub mod waynet;

pub use collision::{
    CapsuleSpec, ColliderShapeDef, GeometryQuery, RapierQueryWorld, Vec2, Vec3, WorldStaticDef,
};
pub use config::KccConfig;
pub use constants::{MAX_TICK_DT, RUN_SPEED, WALK_SPEED, YAW_EPS};
pub use crowd::{
    CircleCollider, ConstrainRequest, ConstrainResult, CrowdConfig, DeadlockState, constrain_move,
    probe_escape_direction,
};
pub use error::{ConfigError, WaynetError, WorldBuildError};
pub use motion::{
    CharacterMotionState, JumpType, LocomotionState, MotionEvent, MotionOutput, MotionSolver,
};
pub use steering::{StepResult, StepToward, desired_step};
pub use utils::{planar_distance_sq, to_planar, yaw_from_xz};
pub use waynet::{Edge, Freepoint, Waynet, Waypoint, find_route};
