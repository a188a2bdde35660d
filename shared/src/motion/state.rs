use serde::{Deserialize, Serialize};

use crate::collision::types::{CapsuleSpec, Quat, Vec2, Vec3};
use crate::utils::{quat_to_yaw, yaw_to_quat};

/// Jump maneuver chosen by the ledge probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpType {
    /// Nothing in front: parabolic forward jump.
    Forward,
    JumpUpLow,
    JumpUpMid,
    JumpUpHigh,
    /// Ledge above the highest jump band but within reach.
    Climb,
    /// Full wall, no valid ledge, or no ceiling clearance.
    Blocked,
}

impl JumpType {
    /// Jump-up and climb maneuvers are driven by an assisted lerp to the ledge.
    #[inline]
    pub fn is_assisted(self) -> bool {
        matches!(
            self,
            JumpType::JumpUpLow | JumpType::JumpUpMid | JumpType::JumpUpHigh | JumpType::Climb
        )
    }
}

/// Jump parameters frozen at jump start so the trajectory stays stable for its duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JumpDescriptor {
    pub kind: JumpType,
    /// Simulation time the jump was requested.
    pub start_time: f32,
    /// Feet position at jump start.
    pub start_pos: Vec3,
    /// Feet position at the end of an assisted jump (unused for forward jumps).
    pub target: Vec3,
    /// Planar jump direction (unit).
    pub dir: Vec2,
    /// Assisted jumps hold still until this time.
    pub windup_until: f32,
    /// Assisted lerp duration.
    pub duration: f32,
    /// Ledge height above the floor at jump start (0 for forward jumps).
    pub ledge_height: f32,
}

/// Motion phase. At most one of sliding, falling and jumping can hold at a time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionPhase {
    Grounded { normal: Vec3 },
    Sliding { speed: f32 },
    Falling { start_height: f32 },
    Jumping(JumpDescriptor),
}

impl MotionPhase {
    #[inline]
    pub fn kind(&self) -> PhaseKind {
        match self {
            MotionPhase::Grounded { .. } => PhaseKind::Grounded,
            MotionPhase::Sliding { .. } => PhaseKind::Sliding,
            MotionPhase::Falling { .. } => PhaseKind::Falling,
            MotionPhase::Jumping(_) => PhaseKind::Jumping,
        }
    }
}

/// Payload-free discriminant of [`MotionPhase`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Grounded,
    Sliding,
    Falling,
    Jumping,
}

/// Grace-window tracker: the sensor must report the same target phase for the
/// target's grace period before the phase switches.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hysteresis {
    pub candidate: Option<PhaseKind>,
    pub elapsed: f32,
}

/// Locomotion state reported by the solver each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocomotionState {
    Grounded,
    Sliding,
    /// Airborne and still within `fall_down_height` of the fall start.
    FallDown,
    Fall,
    Jumping(JumpType),
}

/// Edge events latched by the solver and drained into the tick output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionEvent {
    Jumped(JumpType),
    Landed,
}

/// Everything the solver needs to know about one character between ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterMotionState {
    /// Feet position (bottom of the capsule).
    pub position: Vec3,
    /// Yaw-only orientation.
    pub orientation: Quat,
    pub vertical_velocity: f32,
    pub capsule: CapsuleSpec,
    /// Raw sensor: walkable ground within the probe distance this tick.
    pub grounded: bool,
    pub ground_normal: Vec3,
    pub slope_deg: f32,
    pub phase: MotionPhase,
    pub hysteresis: Hysteresis,
    /// Seconds since the last stable ground contact.
    pub air_time: f32,
    /// Sweeps are skipped until this time.
    pub bypass_until: f32,
    /// XZ input is ignored until this time.
    pub input_block_until: f32,
    /// Consecutive short falls.
    pub short_falls: u32,
    /// Last sub-step was stopped by a wall-like surface.
    pub wall_blocked: bool,
    pub(crate) pending_events: Vec<MotionEvent>,
}

impl CharacterMotionState {
    /// New airborne state; [`crate::motion::MotionSolver::settle`] latches it to the ground.
    pub fn new(position: Vec3, yaw: f32, capsule: CapsuleSpec) -> Self {
        Self {
            position,
            orientation: yaw_to_quat(yaw),
            vertical_velocity: 0.0,
            capsule,
            grounded: false,
            ground_normal: Vec3::y(),
            slope_deg: 0.0,
            phase: MotionPhase::Falling {
                start_height: position.y,
            },
            hysteresis: Hysteresis::default(),
            air_time: 0.0,
            bypass_until: f32::NEG_INFINITY,
            input_block_until: f32::NEG_INFINITY,
            short_falls: 0,
            wall_blocked: false,
            pending_events: Vec::new(),
        }
    }

    /// New state already standing on flat ground.
    pub fn grounded(position: Vec3, yaw: f32, capsule: CapsuleSpec) -> Self {
        let mut state = Self::new(position, yaw, capsule);
        state.grounded = true;
        state.phase = MotionPhase::Grounded { normal: Vec3::y() };
        state
    }

    /// Hysteresis-stabilized grounded flag.
    #[inline]
    pub fn stable_grounded(&self) -> bool {
        matches!(self.phase, MotionPhase::Grounded { .. })
    }

    #[inline]
    pub fn is_sliding(&self) -> bool {
        matches!(self.phase, MotionPhase::Sliding { .. })
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        matches!(self.phase, MotionPhase::Falling { .. })
    }

    #[inline]
    pub fn is_jumping(&self) -> bool {
        matches!(self.phase, MotionPhase::Jumping(_))
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        quat_to_yaw(&self.orientation)
    }

    #[inline]
    pub fn set_yaw(&mut self, yaw: f32) {
        self.orientation = yaw_to_quat(yaw);
    }

    #[inline]
    pub fn input_blocked(&self, now: f32) -> bool {
        now < self.input_block_until
    }

    #[inline]
    pub fn bypassing(&self, now: f32) -> bool {
        now < self.bypass_until
    }

    /// Classified locomotion state for the animation layer.
    pub fn locomotion(&self, fall_down_height: f32) -> LocomotionState {
        match self.phase {
            MotionPhase::Grounded { .. } => LocomotionState::Grounded,
            MotionPhase::Sliding { .. } => LocomotionState::Sliding,
            MotionPhase::Falling { start_height } => {
                if start_height - self.position.y > fall_down_height {
                    LocomotionState::Fall
                } else {
                    LocomotionState::FallDown
                }
            }
            MotionPhase::Jumping(desc) => LocomotionState::Jumping(desc.kind),
        }
    }

    pub(crate) fn push_event(&mut self, event: MotionEvent) {
        self.pending_events.push(event);
    }

    pub(crate) fn take_events(&mut self) -> Vec<MotionEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_airborne_and_grounded_helper_is_not() {
        let capsule = CapsuleSpec::new(20.0, 40.0);
        let air = CharacterMotionState::new(Vec3::new(0.0, 50.0, 0.0), 0.0, capsule);
        assert!(air.is_falling());
        assert!(!air.stable_grounded());

        let ground = CharacterMotionState::grounded(Vec3::zeros(), 0.0, capsule);
        assert!(ground.stable_grounded());
        assert!(!ground.is_falling());
    }

    #[test]
    fn falling_reports_fall_down_then_fall() {
        let capsule = CapsuleSpec::new(20.0, 40.0);
        let mut state = CharacterMotionState::new(Vec3::new(0.0, 500.0, 0.0), 0.0, capsule);
        assert_eq!(state.locomotion(200.0), LocomotionState::FallDown);
        state.position.y = 250.0;
        assert_eq!(state.locomotion(200.0), LocomotionState::Fall);
    }
}
