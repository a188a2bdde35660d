/*!
Kinematic motion solver.

- state:      per-character motion state, phase enum, jump descriptor
- transition: pure phase transition function with grace windows
- solver:     per-tick integration, sweep, ground recovery and jump sub-state
- ledge:      ledge probe and jump classification
- jump:       forward impulse and assisted jump-up/climb trajectories
*/

pub mod jump;
pub mod ledge;
pub mod solver;
pub mod state;
pub mod transition;

pub use ledge::{JumpDecision, LedgeCandidate, LedgeProbe, ScanSample, classify_height, probe_ledge};
pub use solver::{MotionOutput, MotionSolver};
pub use state::{
    CharacterMotionState, Hysteresis, JumpDescriptor, JumpType, LocomotionState, MotionEvent,
    MotionPhase, PhaseKind,
};
pub use transition::{GroundSensors, PhaseChange, SlopeClass, transition};
