/*!
Collision root module.

This module re-exports submodules that implement the kinematic character
controller (KCC) on top of a [`GeometryQuery`] backend. The code is split for clarity:

- types:         shared data types (CapsuleSpec, RayHit, SweepHit, MoveResult)
- settings:      controller and tolerance constants
- query:         the geometry backend contract
- rapier_world:  Rapier-backed static world implementing the contract
- kinematic:     sweep-and-slide controller
- ground:        downward probe and snap
*/

pub mod ground;
pub mod kinematic;
pub mod query;
pub mod rapier_world;
pub mod settings;
pub mod types;

// Re-export commonly used types and functions.
pub use ground::{GroundContact, probe_ground, snap_to_ground};
pub use kinematic::{MoveRequest, move_capsule};
pub use query::GeometryQuery;
pub use rapier_world::{ColliderShapeDef, RapierQueryWorld, WorldStaticDef};
pub use types::{CapsuleSpec, MoveResult, Quat, RayHit, SweepHit, Vec2, Vec3};
