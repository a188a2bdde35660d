//! Waypoint task executor: routes from the waynet, per-tick steering, arrival policy.

pub mod executor;
pub mod route;

pub use executor::{
    MoveAdvice, MoveExecutor, MoveObservation, MoveOptions, MoveOutcome, MovePlan, MoveState,
};
pub use route::{MoveGoal, Route, plan_route};
