/*!
Character-vs-character resolver.

Other characters are treated as non-penetrable vertical cylinders in the XZ plane.
[`constrain_move`] adjusts one character's desired point against a read-only snapshot
of [`CircleCollider`]s:

1. filter colliders by id and vertical range;
2. push the desired point out of every overlapping circle, a bounded number of passes;
3. track forward progress; low progress grows a deadlock streak;
4. on low progress try a sidestep whose side comes from comparing ids over a canonical
   pair axis, so both characters of a pair step to opposite world sides;
5. once the streak passes the threshold, commit to the best clear escape candidate for a
   bounded time;
6. a final clearance pass guarantees the returned point overlaps nobody.

[`probe_escape_direction`] is the world-geometry counterpart used for stuck recovery.
*/

pub mod escape;

use serde::Deserialize;

pub use escape::{EscapeCandidate, clearance_at, rank_escape_candidates};

use crate::collision::query::GeometryQuery;
use crate::collision::types::{CapsuleSpec, Vec2, Vec3};
use crate::utils::{forward_from_yaw, perp, safe_normalize2, yaw_from_xz};

/// Extra separation added when pushing out so the result clears the epsilon test.
const PUSH_SKIN: f32 = 1.0e-3;
/// Movement below this is treated as none.
const MOVE_EPS: f32 = 1.0e-4;
/// Push-out passes used by the final clearance pass.
const FINAL_PASS_ITERATIONS: u32 = 16;

/// Per-tick snapshot of one loaded character.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleCollider {
    pub id: u64,
    pub x: f32,
    pub z: f32,
    pub radius: f32,
    /// Feet height, used for the vertical range filter.
    pub y: f32,
}

impl CircleCollider {
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }
}

/// Resolver tunables.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CrowdConfig {
    /// Colliders further apart vertically are ignored.
    pub max_height_delta: f32,
    /// Push-out passes over the nearby colliders.
    pub max_iterations: u32,
    /// Allowed overlap slack in the clearance invariant.
    pub separation_epsilon: f32,
    /// Progress below this fraction of the request counts as a deadlocked call.
    pub low_progress_ratio: f32,
    /// Deadlocked calls in a row before the escape search runs.
    pub deadlock_threshold: u32,
    /// Minimum sidestep length.
    pub min_sidestep: f32,
    pub escape_rings: u32,
    pub escape_samples: u32,
    /// Ring spacing as a multiple of the mover's radius.
    pub escape_ring_step: f32,
    /// How long a committed escape steer stays active (seconds).
    pub escape_duration: f32,
    pub clearance_weight: f32,
    pub progress_weight: f32,
    pub target_weight: f32,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        Self {
            max_height_delta: 150.0,
            max_iterations: 4,
            separation_epsilon: 0.01,
            low_progress_ratio: 0.25,
            deadlock_threshold: 10,
            min_sidestep: 2.0,
            escape_rings: 2,
            escape_samples: 12,
            escape_ring_step: 0.5,
            escape_duration: 0.75,
            clearance_weight: 1.0,
            progress_weight: 1.0,
            target_weight: 0.5,
        }
    }
}

/// Committed escape: steer toward `point` until `until`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EscapeSteer {
    pub point: Vec2,
    pub until: f32,
}

/// Per-character deadlock bookkeeping kept between calls.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeadlockState {
    pub streak: u32,
    pub steer: Option<EscapeSteer>,
}

impl DeadlockState {
    /// Active steer at `now`; expired steers are dropped on read.
    pub fn active_steer(&mut self, now: f32) -> Option<EscapeSteer> {
        if self.steer.is_some_and(|s| now >= s.until) {
            self.steer = None;
        }
        self.steer
    }
}

/// One resolver call.
#[derive(Clone, Copy, Debug)]
pub struct ConstrainRequest {
    pub id: u64,
    /// Current planar position.
    pub from: Vec2,
    /// Desired planar point for this tick.
    pub target: Vec2,
    pub radius: f32,
    pub y: f32,
    pub now: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstrainResult {
    /// Adjusted planar point.
    pub point: Vec2,
    /// The request was modified by other characters.
    pub blocked: bool,
    /// The adjusted point differs from the current position.
    pub moved: bool,
    /// Escape steer active after this call.
    pub steer: Option<EscapeSteer>,
}

/// Adjust `req.target` so it does not overlap any relevant collider.
pub fn constrain_move(
    req: ConstrainRequest,
    colliders: &[CircleCollider],
    deadlock: &mut DeadlockState,
    cfg: &CrowdConfig,
) -> ConstrainResult {
    let steer = deadlock.active_steer(req.now);
    let step = req.target - req.from;
    let request_len = step.norm();

    let relevant: Vec<CircleCollider> = colliders
        .iter()
        .filter(|c| c.id != req.id && (c.y - req.y).abs() <= cfg.max_height_delta)
        .copied()
        .collect();
    let reach = request_len + req.radius;
    let nearby: Vec<CircleCollider> = relevant
        .iter()
        .filter(|c| (c.center() - req.from).norm() < reach + c.radius + cfg.separation_epsilon)
        .copied()
        .collect();

    if nearby.is_empty() {
        deadlock.streak = 0;
        return ConstrainResult {
            point: req.target,
            blocked: false,
            moved: request_len > MOVE_EPS,
            steer,
        };
    }

    let dir = safe_normalize2(step, Vec2::zeros());
    let mut point = push_out(req.target, req.radius, &nearby, -dir, cfg.max_iterations);

    let progress = (point - req.from).dot(&dir);
    let low_progress = request_len > MOVE_EPS && progress < request_len * cfg.low_progress_ratio;

    let mut steer = steer;
    if low_progress {
        deadlock.streak += 1;

        let sidestep = sidestep_point(&req, &nearby, &relevant, request_len, cfg);
        if let Some(side) = sidestep {
            point = side;
        }

        if sidestep.is_none() && deadlock.streak >= cfg.deadlock_threshold {
            let ranked = rank_escape_candidates(req.from, req.target, req.radius, &relevant, cfg);
            if let Some(best) = ranked.iter().find(|c| c.is_clear(0.0)) {
                log::debug!(
                    "character {} deadlocked for {} calls, escaping toward {:?}",
                    req.id,
                    deadlock.streak,
                    best.point
                );
                let committed = EscapeSteer {
                    point: best.point,
                    until: req.now + cfg.escape_duration,
                };
                deadlock.steer = Some(committed);
                steer = Some(committed);
                // Move toward the escape point at the requested speed.
                let to_escape = best.point - req.from;
                let len = to_escape.norm();
                let travel = len.min(request_len.max(cfg.min_sidestep));
                point = req.from + safe_normalize2(to_escape, Vec2::zeros()) * travel;
            }
            deadlock.streak = 0;
        }
    } else {
        deadlock.streak = 0;
    }

    let point = final_clearance(point, &req, &relevant, cfg);
    ConstrainResult {
        point,
        blocked: (point - req.target).norm() > MOVE_EPS,
        moved: (point - req.from).norm() > MOVE_EPS,
        steer,
    }
}

/// Planar push that separates a circle at `point` from `other`, or `None` without overlap.
///
/// Exactly coincident centers are separated along `fallback`.
fn planar_separation(point: Vec2, radius: f32, other: &CircleCollider, fallback: Vec2) -> Option<Vec2> {
    let d = point - other.center();
    let min_dist = radius + other.radius + PUSH_SKIN;
    let dist_sq = d.norm_squared();
    if dist_sq >= (radius + other.radius).powi(2) {
        return None;
    }
    if dist_sq <= 1.0e-12 {
        let n = safe_normalize2(fallback, Vec2::new(1.0, 0.0));
        return Some(n * min_dist);
    }
    let dist = dist_sq.sqrt();
    Some(d / dist * (min_dist - dist))
}

/// Iteratively push `point` out of every overlapping collider.
fn push_out(mut point: Vec2, radius: f32, nearby: &[CircleCollider], fallback: Vec2, iterations: u32) -> Vec2 {
    for _ in 0..iterations.max(1) {
        let mut any = false;
        for other in nearby {
            if let Some(push) = planar_separation(point, radius, other, fallback) {
                point += push;
                any = true;
            }
        }
        if !any {
            break;
        }
    }
    point
}

fn is_clear(point: Vec2, radius: f32, nearby: &[CircleCollider], epsilon: f32) -> bool {
    nearby
        .iter()
        .all(|c| (point - c.center()).norm() >= radius + c.radius - epsilon)
}

/// Deterministic sidestep against the collider closest to the desired point.
///
/// The pair axis runs from the lower id to the higher id; the lower id steps to its left
/// and the higher id to its right, which are opposite world sides for the two of them.
fn sidestep_point(
    req: &ConstrainRequest,
    nearby: &[CircleCollider],
    relevant: &[CircleCollider],
    request_len: f32,
    cfg: &CrowdConfig,
) -> Option<Vec2> {
    let other = nearby
        .iter()
        .min_by(|a, b| {
            let da = (a.center() - req.target).norm_squared();
            let db = (b.center() - req.target).norm_squared();
            da.total_cmp(&db).then(a.id.cmp(&b.id))
        })?;

    let (low, high) = if req.id < other.id {
        (req.from, other.center())
    } else {
        (other.center(), req.from)
    };
    let axis = safe_normalize2(high - low, Vec2::new(1.0, 0.0));
    let side = if req.id < other.id { perp(axis) } else { -perp(axis) };

    let len = request_len.max(cfg.min_sidestep);
    let candidate = push_out(req.from + side * len, req.radius, relevant, side, cfg.max_iterations);
    let clear = is_clear(candidate, req.radius, relevant, 0.0);
    (clear && (candidate - req.from).norm() > MOVE_EPS).then_some(candidate)
}

/// Guarantee the returned point is at least `r + r_other - epsilon` from every collider.
fn final_clearance(
    point: Vec2,
    req: &ConstrainRequest,
    nearby: &[CircleCollider],
    cfg: &CrowdConfig,
) -> Vec2 {
    if nearby.is_empty() {
        return point;
    }
    let eps = cfg.separation_epsilon;
    if is_clear(point, req.radius, nearby, eps) {
        return point;
    }

    let step_dir = safe_normalize2(req.target - req.from, Vec2::zeros());
    let pushed = push_out(point, req.radius, nearby, -step_dir, FINAL_PASS_ITERATIONS);
    if is_clear(pushed, req.radius, nearby, eps) {
        return pushed;
    }
    if is_clear(req.from, req.radius, nearby, eps) {
        return req.from;
    }

    // Past every collider along the fallback direction is always clear.
    let dir = safe_normalize2(pushed - req.from, Vec2::new(1.0, 0.0));
    let far = nearby
        .iter()
        .map(|c| (point - c.center()).norm() + c.radius + req.radius + PUSH_SKIN)
        .fold(0.0f32, f32::max);
    log::warn!("character {} boxed in by {} colliders", req.id, nearby.len());
    point + dir * far
}

/// Probe capsule sweeps at yaw offsets from `forward` and return the first unblocked direction.
///
/// A direction is unblocked when the sweep covers at least 90% of `distance`.
pub fn probe_escape_direction<Q: GeometryQuery + ?Sized>(
    query: &Q,
    capsule: CapsuleSpec,
    feet: Vec3,
    forward: Vec2,
    distance: f32,
    yaw_offsets: &[f32],
) -> Option<Vec2> {
    let base_yaw = yaw_from_xz(forward)?;
    let center = capsule.center_from_feet(feet);
    yaw_offsets.iter().find_map(|offset| {
        let dir = forward_from_yaw(base_yaw + offset);
        let delta = Vec3::new(dir.x, 0.0, dir.y) * distance;
        match query.sweep_capsule(capsule, center, delta) {
            Some(hit) if hit.fraction < 0.9 && hit.normal.dot(&delta) < 0.0 => None,
            _ => Some(dir),
        }
    })
}
