//! Jump trajectories.
//!
//! Forward jumps are a single parabolic impulse handed to the regular integrator.
//! Jump-up and climb maneuvers follow an assisted lerp from the start position to a
//! landing spot on the ledge, eased with smoothstep and lifted by a sine arc.

use std::f32::consts::PI;

use super::ledge::LedgeCandidate;
use super::state::{JumpDescriptor, JumpType};
use crate::collision::types::{CapsuleSpec, Vec2, Vec3};
use crate::config::KccConfig;
use crate::utils::smoothstep;

/// Upward speed that reaches `height` under `gravity`.
#[inline]
pub fn launch_speed(gravity: f32, height: f32) -> f32 {
    (2.0 * gravity.max(0.0) * height.max(0.0)).sqrt()
}

/// Descriptor for a forward (parabolic) jump.
pub fn forward_jump(feet: Vec3, dir: Vec2, now: f32) -> JumpDescriptor {
    JumpDescriptor {
        kind: JumpType::Forward,
        start_time: now,
        start_pos: feet,
        target: feet,
        dir,
        windup_until: now,
        duration: 0.0,
        ledge_height: 0.0,
    }
}

/// Descriptor for a jump-up or climb onto `ledge`.
pub fn assisted_jump(
    cfg: &KccConfig,
    capsule: CapsuleSpec,
    kind: JumpType,
    feet: Vec3,
    dir: Vec2,
    ledge: &LedgeCandidate,
    now: f32,
) -> JumpDescriptor {
    let fwd3 = Vec3::new(dir.x, 0.0, dir.y);
    // Land one radius past the wall face, hovering above the ledge top.
    let wall_face = Vec3::new(ledge.point.x, 0.0, ledge.point.z) - fwd3 * ledge_inset(ledge, feet, dir);
    let target = Vec3::new(
        wall_face.x + fwd3.x * (capsule.radius + 1.0),
        ledge.point.y + cfg.hover_height,
        wall_face.z + fwd3.z * (capsule.radius + 1.0),
    );
    let duration = if kind == JumpType::Climb {
        cfg.climb_duration
    } else {
        cfg.jump_up_duration
    };

    JumpDescriptor {
        kind,
        start_time: now,
        start_pos: feet,
        target,
        dir,
        windup_until: now + cfg.jump_windup.max(0.0),
        duration: duration.max(1.0e-3),
        ledge_height: ledge.height,
    }
}

/// Distance the ledge point sits past the wall face along `dir`.
fn ledge_inset(ledge: &LedgeCandidate, feet: Vec3, dir: Vec2) -> f32 {
    let along = (ledge.point.x - feet.x) * dir.x + (ledge.point.z - feet.z) * dir.y;
    (along - ledge.distance).max(0.0)
}

/// Feet position along an assisted jump at `now`, and whether the lerp has finished.
pub fn assisted_position(desc: &JumpDescriptor, arc_height: f32, now: f32) -> (Vec3, bool) {
    if now < desc.windup_until {
        return (desc.start_pos, false);
    }
    let t = ((now - desc.windup_until) / desc.duration).clamp(0.0, 1.0);
    if t >= 1.0 {
        return (desc.target, true);
    }
    let s = smoothstep(t);
    let mut pos = desc.start_pos + (desc.target - desc.start_pos) * s;
    pos.y += arc_height * (PI * t).sin();
    (pos, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ledge() -> LedgeCandidate {
        LedgeCandidate {
            height: 130.0,
            point: Vec3::new(0.0, 130.0, -115.0),
            normal: Vec3::y(),
            wall_normal: Vec3::z(),
            distance: 100.0,
            landing_room: 40.0,
            value: 1.0,
        }
    }

    #[test]
    fn launch_speed_reaches_height() {
        let v = launch_speed(981.0, 60.0);
        // Apex = v^2 / 2g.
        assert_relative_eq!(v * v / (2.0 * 981.0), 60.0, epsilon = 1.0e-3);
    }

    #[test]
    fn assisted_jump_lands_past_wall_face() {
        let cfg = KccConfig::default();
        let capsule = cfg.capsule();
        let desc = assisted_jump(
            &cfg,
            capsule,
            JumpType::JumpUpMid,
            Vec3::new(0.0, 1.0, 0.0),
            Vec2::new(0.0, -1.0),
            &ledge(),
            10.0,
        );
        assert_relative_eq!(desc.target.z, -100.0 - capsule.radius - 1.0, epsilon = 1.0e-3);
        assert_relative_eq!(desc.target.y, 130.0 + cfg.hover_height, epsilon = 1.0e-3);
        assert_relative_eq!(desc.windup_until, 10.0 + cfg.jump_windup);
    }

    #[test]
    fn assisted_position_holds_during_windup_then_eases_in() {
        let cfg = KccConfig::default();
        let desc = assisted_jump(
            &cfg,
            cfg.capsule(),
            JumpType::JumpUpLow,
            Vec3::new(0.0, 1.0, 0.0),
            Vec2::new(0.0, -1.0),
            &ledge(),
            0.0,
        );
        let (pos, done) = assisted_position(&desc, cfg.jump_arc_height, desc.windup_until * 0.5);
        assert_eq!(pos, desc.start_pos);
        assert!(!done);

        let (mid, done) =
            assisted_position(&desc, cfg.jump_arc_height, desc.windup_until + desc.duration * 0.5);
        assert!(!done);
        // Halfway in time is halfway along the eased path, plus the full arc.
        let expected_y = 0.5 * (desc.start_pos.y + desc.target.y) + cfg.jump_arc_height;
        assert_relative_eq!(mid.y, expected_y, epsilon = 1.0e-3);

        let (end, done) =
            assisted_position(&desc, cfg.jump_arc_height, desc.windup_until + desc.duration);
        assert!(done);
        assert_eq!(end, desc.target);
    }
}
