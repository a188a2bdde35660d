//! Waypoint network: immutable graph plus deterministic A* routing.

pub mod astar;
pub mod graph;

pub use astar::find_route;
pub use graph::{Edge, Freepoint, Waynet, Waypoint};
