use shared::{CharacterMotionState, CircleCollider, DeadlockState, Vec2};

use crate::animation::AnimationFeed;
use crate::mover::{MoveOutcome, MoveState};

pub type CharacterId = u64;

/// Who decides where a character goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Control {
    /// Driven by the waypoint task executor.
    #[default]
    Npc,
    /// Driven by direct input.
    Player,
}

/// Everything the simulation owns for one loaded character.
#[derive(Clone, Debug)]
pub struct Character {
    pub id: CharacterId,
    pub control: Control,
    pub motion: CharacterMotionState,
    pub deadlock: DeadlockState,
    /// Active move, if any.
    pub movement: Option<MoveState>,
    pub last_outcome: Option<MoveOutcome>,
    /// Planar velocity requested by direct input.
    pub input: Vec2,
    pub input_running: bool,
    /// Facing to ease towards while not moving.
    pub face_yaw: Option<f32>,
    pub feed: AnimationFeed,
}

impl Character {
    pub fn new(id: CharacterId, control: Control, motion: CharacterMotionState) -> Self {
        Self {
            id,
            control,
            motion,
            deadlock: DeadlockState::default(),
            movement: None,
            last_outcome: None,
            input: Vec2::zeros(),
            input_running: false,
            face_yaw: None,
            feed: AnimationFeed::default(),
        }
    }

    /// This character as seen by the crowd resolver.
    pub fn collider(&self) -> CircleCollider {
        CircleCollider {
            id: self.id,
            x: self.motion.position.x,
            z: self.motion.position.z,
            radius: self.motion.capsule.radius,
            y: self.motion.position.y,
        }
    }

    /// Drop the active move without recording an outcome.
    pub fn clear_move(&mut self) {
        self.movement = None;
        self.deadlock = DeadlockState::default();
    }
}
