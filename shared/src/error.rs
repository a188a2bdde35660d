use thiserror::Error;

/// Errors raised while building or loading a waynet.
#[derive(Debug, Error)]
pub enum WaynetError {
    #[error("edge {edge} references waypoint index {index}, but only {len} waypoints exist")]
    BadEdgeIndex { edge: usize, index: usize, len: usize },

    #[error("duplicate waypoint or freepoint name `{0}`")]
    DuplicateName(String),

    #[error("edge {edge} has invalid weight {weight}")]
    InvalidWeight { edge: usize, weight: f32 },

    #[error("waypoint `{0}` has a non-finite position")]
    NonFinitePosition(String),

    #[error("edge {edge} names unknown waypoint `{name}`")]
    UnknownWaypoint { edge: usize, name: String },

    #[error("failed to parse waynet JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading or validating tunables.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised while building the static query world.
#[derive(Debug, Error)]
pub enum WorldBuildError {
    #[error("static {id} has a non-finite pose")]
    NonFinitePose { id: u32 },

    #[error("static {id}: invalid triangle mesh ({reason})")]
    TriMesh { id: u32, reason: String },
}
