//! Deadlock escape search: generate ring candidates, score them, rank best first.
//!
//! Pure: takes the collider snapshot by reference and never mutates it.

use std::f32::consts::TAU;

use super::{CircleCollider, CrowdConfig};
use crate::collision::types::Vec2;
use crate::utils::safe_normalize2;

/// One scored escape point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EscapeCandidate {
    pub point: Vec2,
    /// Smallest gap to any collider (negative when overlapping).
    pub clearance: f32,
    /// Displacement along the requested heading.
    pub progress: f32,
    /// Distance from the ideal (requested) target.
    pub target_distance: f32,
    pub score: f32,
}

impl EscapeCandidate {
    /// Does the candidate keep at least `epsilon` short of full overlap with every collider?
    #[inline]
    pub fn is_clear(&self, epsilon: f32) -> bool {
        self.clearance >= -epsilon
    }
}

/// Smallest gap between a circle at `point` and the colliders (`f32::INFINITY` when empty).
pub fn clearance_at(point: Vec2, radius: f32, colliders: &[CircleCollider]) -> f32 {
    colliders
        .iter()
        .map(|c| (point - c.center()).norm() - radius - c.radius)
        .fold(f32::INFINITY, f32::min)
}

/// Rank escape candidates around `from`, best first.
///
/// Candidates sit on `cfg.escape_rings` rings spaced `cfg.escape_ring_step * radius` apart,
/// `cfg.escape_samples` per ring, starting at +X. Score is
/// `clearance_weight * clearance + progress_weight * progress - target_weight * target_distance`,
/// with clearance capped at one radius so very open spots don't dominate. Equal scores keep
/// generation order.
pub fn rank_escape_candidates(
    from: Vec2,
    target: Vec2,
    radius: f32,
    colliders: &[CircleCollider],
    cfg: &CrowdConfig,
) -> Vec<EscapeCandidate> {
    let heading = safe_normalize2(target - from, Vec2::zeros());
    let samples = cfg.escape_samples.max(1);
    let step = (cfg.escape_ring_step * radius).max(1.0e-3);

    let mut out = Vec::with_capacity((cfg.escape_rings * samples) as usize);
    for ring in 1..=cfg.escape_rings {
        let ring_radius = step * ring as f32;
        for i in 0..samples {
            let angle = TAU * i as f32 / samples as f32;
            let point = from + Vec2::new(angle.cos(), angle.sin()) * ring_radius;

            let clearance = clearance_at(point, radius, colliders);
            let progress = (point - from).dot(&heading);
            let target_distance = (point - target).norm();
            let score = cfg.clearance_weight * clearance.min(radius)
                + cfg.progress_weight * progress
                - cfg.target_weight * target_distance;

            out.push(EscapeCandidate {
                point,
                clearance,
                progress,
                target_distance,
                score,
            });
        }
    }

    out.sort_by(|a, b| b.score.total_cmp(&a.score));
    out
}
