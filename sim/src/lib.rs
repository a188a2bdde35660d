/*!
Tick-driven NPC locomotion simulation on top of the shared motion core.

- simulation: character map, clock, per-tick pass (executor, crowd resolver, motion solver)
- mover:      waypoint task executor and route planning
- animation:  locomotion mode and edge events published for the animation layer
- config:     serde-loaded tunables for every stage
*/

pub mod animation;
pub mod character;
pub mod config;
pub mod error;
pub mod logging;
pub mod mover;
pub mod simulation;

pub use animation::{AnimationFeed, LocomotionMode};
pub use character::{Character, CharacterId, Control};
pub use config::{MoverConfig, SimConfig, TickConfig};
pub use error::SimError;
pub use mover::{MoveExecutor, MoveOptions, MoveOutcome};
pub use simulation::Simulation;
