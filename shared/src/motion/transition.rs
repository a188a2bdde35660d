//! Pure phase transition function.
//!
//! Takes the current phase, the grace tracker and this step's ground sensors and returns
//! the next phase. No geometry queries happen here, so every slope band and grace window
//! can be tested in isolation.

use super::state::{Hysteresis, MotionPhase, PhaseKind};
use crate::collision::types::Vec3;
use crate::config::KccConfig;

/// Slope band of a ground normal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlopeClass {
    Walkable,
    Slide,
    TooSteep,
}

impl SlopeClass {
    pub fn classify(slope_deg: f32, cfg: &KccConfig) -> Self {
        if slope_deg <= cfg.walk_max_deg {
            SlopeClass::Walkable
        } else if slope_deg <= cfg.slide_to_fall_max_deg {
            SlopeClass::Slide
        } else {
            SlopeClass::TooSteep
        }
    }
}

/// Ground sensor reading for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSensors {
    /// Ground normal and its slope angle (degrees), or `None` without contact.
    pub contact: Option<(Vec3, f32)>,
}

impl GroundSensors {
    pub fn none() -> Self {
        Self { contact: None }
    }

    pub fn with_contact(normal: Vec3, slope_deg: f32) -> Self {
        Self {
            contact: Some((normal, slope_deg)),
        }
    }

    /// Phase the sensor currently argues for.
    pub fn target(&self, cfg: &KccConfig) -> PhaseKind {
        match self.contact {
            None => PhaseKind::Falling,
            Some((_, slope)) => match SlopeClass::classify(slope, cfg) {
                SlopeClass::Walkable => PhaseKind::Grounded,
                SlopeClass::Slide => PhaseKind::Sliding,
                SlopeClass::TooSteep => PhaseKind::Falling,
            },
        }
    }
}

/// Result of [`transition`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseChange {
    pub phase: MotionPhase,
    pub hysteresis: Hysteresis,
    /// Phase kind that was left, when the phase switched this step.
    pub left: Option<PhaseKind>,
}

fn grace_for(kind: PhaseKind, cfg: &KccConfig) -> f32 {
    match kind {
        PhaseKind::Grounded => cfg.grounded_enter_grace,
        PhaseKind::Sliding => cfg.slide_enter_grace,
        PhaseKind::Falling => cfg.fall_enter_grace,
        PhaseKind::Jumping => 0.0,
    }
}

/// Advance the phase state machine by `dt`.
///
/// `Jumping` is owned by the jump sub-state and passes through unchanged.
pub fn transition(
    phase: MotionPhase,
    hysteresis: Hysteresis,
    sensors: GroundSensors,
    cfg: &KccConfig,
    dt: f32,
    feet_y: f32,
) -> PhaseChange {
    if let MotionPhase::Jumping(_) = phase {
        return PhaseChange {
            phase,
            hysteresis: Hysteresis::default(),
            left: None,
        };
    }

    let current = phase.kind();
    let target = sensors.target(cfg);

    if target == current {
        // Agreeing sensor refreshes the payload and cancels any pending switch.
        let phase = match (phase, sensors.contact) {
            (MotionPhase::Grounded { .. }, Some((normal, _))) => MotionPhase::Grounded { normal },
            (other, _) => other,
        };
        return PhaseChange {
            phase,
            hysteresis: Hysteresis::default(),
            left: None,
        };
    }

    let elapsed = if hysteresis.candidate == Some(target) {
        hysteresis.elapsed + dt.max(0.0)
    } else {
        dt.max(0.0)
    };

    if elapsed + f32::EPSILON < grace_for(target, cfg) {
        return PhaseChange {
            phase,
            hysteresis: Hysteresis {
                candidate: Some(target),
                elapsed,
            },
            left: None,
        };
    }

    let next = match target {
        PhaseKind::Grounded => MotionPhase::Grounded {
            normal: sensors.contact.map_or(Vec3::y(), |(n, _)| n),
        },
        PhaseKind::Sliding => MotionPhase::Sliding { speed: 0.0 },
        PhaseKind::Falling => MotionPhase::Falling {
            start_height: feet_y,
        },
        PhaseKind::Jumping => phase,
    };

    PhaseChange {
        phase: next,
        hysteresis: Hysteresis::default(),
        left: Some(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn normal_for(slope_deg: f32) -> Vec3 {
        let r = slope_deg.to_radians();
        Vec3::new(r.sin(), r.cos(), 0.0)
    }

    fn run(mut phase: MotionPhase, slope: Option<f32>, seconds: f32) -> MotionPhase {
        let cfg = KccConfig::default();
        let dt = 1.0 / 120.0;
        let mut hyst = Hysteresis::default();
        let sensors = slope.map_or(GroundSensors::none(), |s| {
            GroundSensors::with_contact(normal_for(s), s)
        });
        let steps = (seconds / dt).ceil() as usize;
        for _ in 0..steps {
            let change = transition(phase, hyst, sensors, &cfg, dt, 0.0);
            phase = change.phase;
            hyst = change.hysteresis;
        }
        phase
    }

    #[rstest]
    #[case(0.0, PhaseKind::Grounded)]
    #[case(30.0, PhaseKind::Grounded)]
    #[case(45.0, PhaseKind::Grounded)]
    #[case(46.0, PhaseKind::Sliding)]
    #[case(60.0, PhaseKind::Sliding)]
    #[case(67.0, PhaseKind::Sliding)]
    #[case(68.0, PhaseKind::Falling)]
    #[case(89.0, PhaseKind::Falling)]
    fn sustained_slope_converges(#[case] slope: f32, #[case] expected: PhaseKind) {
        let starts = [
            MotionPhase::Grounded { normal: Vec3::y() },
            MotionPhase::Sliding { speed: 100.0 },
            MotionPhase::Falling { start_height: 0.0 },
        ];
        for start in starts {
            assert_eq!(run(start, Some(slope), 0.2).kind(), expected, "from {start:?}");
        }
    }

    #[test]
    fn no_contact_converges_to_falling() {
        let phase = run(MotionPhase::Grounded { normal: Vec3::y() }, None, 0.2);
        assert_eq!(phase.kind(), PhaseKind::Falling);
    }

    #[test]
    fn single_noisy_sample_does_not_flip_phase() {
        let cfg = KccConfig::default();
        let grounded = MotionPhase::Grounded { normal: Vec3::y() };
        let noisy = GroundSensors::with_contact(normal_for(50.0), 50.0);
        let change = transition(grounded, Hysteresis::default(), noisy, &cfg, 1.0 / 60.0, 0.0);
        assert_eq!(change.phase.kind(), PhaseKind::Grounded);
        assert_eq!(change.hysteresis.candidate, Some(PhaseKind::Sliding));

        // Agreeing sample resets the tracker.
        let flat = GroundSensors::with_contact(Vec3::y(), 0.0);
        let change = transition(change.phase, change.hysteresis, flat, &cfg, 1.0 / 60.0, 0.0);
        assert_eq!(change.phase.kind(), PhaseKind::Grounded);
        assert_eq!(change.hysteresis, Hysteresis::default());
    }

    #[test]
    fn entering_fall_records_start_height() {
        let cfg = KccConfig::default();
        let change = transition(
            MotionPhase::Grounded { normal: Vec3::y() },
            Hysteresis::default(),
            GroundSensors::none(),
            &cfg,
            1.0,
            123.0,
        );
        assert_eq!(change.phase, MotionPhase::Falling { start_height: 123.0 });
        assert_eq!(change.left, Some(PhaseKind::Grounded));
    }
}
