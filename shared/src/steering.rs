//! Desired planar step toward a target.
//!
//! This does not apply any collision. Feed the returned step through the crowd resolver
//! and the motion solver, then commit the position they compute.

use crate::collision::settings::DIST_EPS;
use crate::collision::types::Vec2;

/// Input for computing the desired planar step toward a target.
///
/// - The step is clamped so we stop on the acceptance circle (never inside it).
/// - If already within acceptance, the step is zero and `finished = true`.
#[derive(Clone, Copy, Debug)]
pub struct StepToward {
    /// Current planar position of the mover.
    pub current: Vec2,
    /// Planar target.
    pub target: Vec2,
    /// Linear speed in world units per second.
    pub speed: f32,
    pub dt: f32,
    /// Acceptance radius around `target`.
    pub acceptance_radius: f32,
}

/// Result of [`desired_step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepResult {
    /// Planar displacement wanted this tick; never overshoots the acceptance boundary.
    pub step: Vec2,
    /// Within acceptance after this step?
    pub finished: bool,
    /// Distance to the target before stepping.
    pub distance_to_target: f32,
}

/// Compute the desired planar step toward `target` at `speed` over `dt`,
/// stopping on the acceptance circle.
#[inline]
pub fn desired_step(params: StepToward) -> StepResult {
    let StepToward {
        current,
        target,
        speed,
        dt,
        acceptance_radius,
    } = params;

    let delta = target - current;
    let dist = delta.norm();

    let acc = acceptance_radius.max(0.0);
    let speed = speed.max(0.0);
    let dt = dt.max(0.0);

    // Already within acceptance → no movement, finished.
    if dist <= acc + DIST_EPS {
        return StepResult {
            step: Vec2::zeros(),
            finished: true,
            distance_to_target: dist,
        };
    }

    let max_step = speed * dt;
    if max_step <= DIST_EPS {
        return StepResult {
            step: Vec2::zeros(),
            finished: false,
            distance_to_target: dist,
        };
    }

    let to_boundary = (dist - acc).max(0.0);
    let step = to_boundary.min(max_step);

    // Safe since dist > acc >= 0.
    let dir = delta / dist;

    StepResult {
        step: dir * step,
        finished: (to_boundary - step).abs() <= DIST_EPS,
        distance_to_target: dist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(current: Vec2, target: Vec2) -> StepToward {
        StepToward {
            current,
            target,
            speed: 100.0,
            dt: 0.1,
            acceptance_radius: 5.0,
        }
    }

    #[test]
    fn steps_at_speed_toward_far_target() {
        let r = desired_step(params(Vec2::zeros(), Vec2::new(100.0, 0.0)));
        assert_relative_eq!(r.step, Vec2::new(10.0, 0.0), epsilon = 1.0e-5);
        assert!(!r.finished);
        assert_relative_eq!(r.distance_to_target, 100.0);
    }

    #[test]
    fn stops_on_acceptance_circle() {
        let r = desired_step(params(Vec2::zeros(), Vec2::new(12.0, 0.0)));
        assert_relative_eq!(r.step.x, 7.0, epsilon = 1.0e-5);
        assert!(r.finished);
    }

    #[test]
    fn inside_acceptance_is_finished_without_motion() {
        let r = desired_step(params(Vec2::new(1.0, 1.0), Vec2::zeros()));
        assert_eq!(r.step, Vec2::zeros());
        assert!(r.finished);
    }
}
