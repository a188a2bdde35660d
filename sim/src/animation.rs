//! Output toward the animation layer. The core only publishes; it never drives playback.

use shared::{JumpType, LocomotionState, MotionEvent};

/// Locomotion mode consumed by the animation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LocomotionMode {
    #[default]
    Idle,
    Walk,
    Run,
    Slide,
    FallDown,
    Fall,
    Jump,
    JumpUpLow,
    JumpUpMid,
    JumpUp,
    Climb,
}

impl LocomotionMode {
    /// Map the solver's classified state plus executor intent to a mode.
    pub fn from_state(state: LocomotionState, moving: bool, running: bool) -> Self {
        match state {
            LocomotionState::Grounded if !moving => LocomotionMode::Idle,
            LocomotionState::Grounded if running => LocomotionMode::Run,
            LocomotionState::Grounded => LocomotionMode::Walk,
            LocomotionState::Sliding => LocomotionMode::Slide,
            LocomotionState::FallDown => LocomotionMode::FallDown,
            LocomotionState::Fall => LocomotionMode::Fall,
            LocomotionState::Jumping(kind) => match kind {
                JumpType::Forward => LocomotionMode::Jump,
                JumpType::JumpUpLow => LocomotionMode::JumpUpLow,
                JumpType::JumpUpMid => LocomotionMode::JumpUpMid,
                JumpType::JumpUpHigh => LocomotionMode::JumpUp,
                JumpType::Climb => LocomotionMode::Climb,
                JumpType::Blocked => LocomotionMode::Idle,
            },
        }
    }
}

/// Per-tick, per-character feed: the current mode plus edge events raised this tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationFeed {
    pub mode: LocomotionMode,
    pub events: Vec<MotionEvent>,
}
