use super::{
    query::GeometryQuery,
    settings::{BLOCKING_DOT, DEFAULT_MAX_ITERATIONS, DEFAULT_SKIN, MIN_MOVE_SQ},
    types::{CapsuleSpec, MoveResult, SweepHit, Vec3},
};

/// Parameters for a single kinematic movement attempt.
///
/// - Movement is expressed as a desired translation for this step (world units).
/// - Collision is handled by sweeping a Y-aligned capsule through the geometry backend,
///   stopping at contact minus `skin`, and optionally sliding along the contact normal.
/// - The slide step iterates up to `max_iterations` to handle corners.
#[derive(Clone, Copy, Debug)]
pub struct MoveRequest {
    /// Starting world position of the capsule's center.
    pub start_pos: Vec3,
    /// Desired world-space translation for this step.
    pub desired_translation: Vec3,
    /// Capsule shape for the actor.
    pub capsule: CapsuleSpec,
    /// Separation to keep from surfaces to avoid jitter.
    pub skin: f32,
    /// Max iterations of slide resolution (for corners).
    pub max_iterations: u32,
    /// Slide the blocked remainder along the contact tangent instead of stopping.
    pub wall_slide: bool,
}

impl MoveRequest {
    #[inline]
    pub fn with_defaults(start_pos: Vec3, desired_translation: Vec3, capsule: CapsuleSpec) -> Self {
        Self {
            start_pos,
            desired_translation,
            capsule,
            skin: DEFAULT_SKIN,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            wall_slide: true,
        }
    }
}

/// Kinematic sweep-and-slide for a capsule against the static world.
///
/// Algorithm:
/// - Sweep the capsule along the remaining translation.
/// - On a blocking hit, move to just before the contact (minus `skin`) and, when wall
///   sliding is enabled, project the leftover onto the contact plane.
/// - Iterate to handle corners until `max_iterations` or the remaining motion is negligible.
///
/// Hits whose normal does not oppose the motion (grazing contacts) do not block.
pub fn move_capsule<Q: GeometryQuery + ?Sized>(query: &Q, req: MoveRequest) -> MoveResult {
    let mut pos = req.start_pos;
    let mut remaining = req.desired_translation;
    let mut first_hit: Option<SweepHit> = None;
    let mut last_hit: Option<SweepHit> = None;

    for _ in 0..req.max_iterations.max(1) {
        if remaining.norm_squared() <= MIN_MOVE_SQ {
            break;
        }

        let len = remaining.norm();
        let dir = remaining / len;

        let blocking = query
            .sweep_capsule(req.capsule, pos, remaining)
            .filter(|hit| hit.normal.dot(&dir) < -BLOCKING_DOT);

        let Some(hit) = blocking else {
            pos += remaining;
            remaining = Vec3::zeros();
            break;
        };

        // Travel up to the contact point (minus skin).
        let travel = (len * hit.fraction).max(0.0);
        pos += dir * (travel - req.skin).max(0.0);

        first_hit.get_or_insert(hit);
        last_hit = Some(hit);

        let leftover = dir * (len - travel);
        if !req.wall_slide {
            remaining = leftover;
            break;
        }

        // Slide along the hit plane: remove the normal component from the leftover.
        let slide = leftover - hit.normal * leftover.dot(&hit.normal);
        remaining = slide;

        if slide.norm_squared() <= MIN_MOVE_SQ {
            break;
        }
    }

    MoveResult {
        end_pos: pos,
        first_hit,
        last_hit,
        remaining,
    }
}
