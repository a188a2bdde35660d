use shared::{ConfigError, WaynetError, WorldBuildError};
use thiserror::Error;

/// Errors raised while assembling a simulation. Ticking never fails.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Waynet(#[from] WaynetError),

    #[error(transparent)]
    World(#[from] WorldBuildError),
}
