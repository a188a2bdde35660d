/*!
Ledge probe and jump classification.

The probe looks at the silhouette in front of a character:

1. a vertical ray pair finds the local floor and ceiling;
2. a recursive, binary-subdivided scan of horizontal rays between
   `ledge_scan_min_height` and the reachable height buckets the silhouette into
   hit / no-hit samples;
3. each hit → no-hit boundary is validated as a ledge candidate and scored;
4. the best candidate's height picks the jump type.

Everything here is read-only against the geometry backend.
*/

use super::state::JumpType;
use crate::collision::query::GeometryQuery;
use crate::collision::types::{CapsuleSpec, RayHit, Vec2, Vec3};
use crate::config::KccConfig;
use crate::utils::slope_angle_deg;

/// Horizontal spacing below which the scan always subdivides, even without a transition.
const COARSE_STEP_FACTOR: f32 = 4.0;
/// Upper bound on scan samples, whatever the configured resolution.
const MAX_SCAN_SAMPLES: usize = 96;
/// How far past the wall face the upper surface is probed.
const LEDGE_PROBE_INSET: f32 = 15.0;
/// Minimum `-normal · forward` for a wall to count as facing the mover.
const MIN_FACING_DOT: f32 = 0.3;

/// One horizontal scan ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanSample {
    /// Absolute height of the ray.
    pub height: f32,
    pub hit: Option<RayHit>,
}

/// A validated ledge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LedgeCandidate {
    /// Height of the ledge top above the floor.
    pub height: f32,
    /// Point on the ledge top, just past the wall face.
    pub point: Vec3,
    /// Normal of the ledge top.
    pub normal: Vec3,
    /// Normal of the wall below the ledge.
    pub wall_normal: Vec3,
    /// Horizontal distance from the mover's axis to the wall face.
    pub distance: f32,
    /// Free landing depth past the wall face.
    pub landing_room: f32,
    /// Score; higher is better.
    pub value: f32,
}

/// Outcome of the probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JumpDecision {
    pub kind: JumpType,
    pub ledge: Option<LedgeCandidate>,
}

impl JumpDecision {
    fn plain(kind: JumpType) -> Self {
        Self { kind, ledge: None }
    }
}

/// Full probe report.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgeProbe {
    pub floor: f32,
    pub ceiling: Option<f32>,
    pub samples: Vec<ScanSample>,
    pub candidates: Vec<LedgeCandidate>,
    pub decision: JumpDecision,
}

/// Probe the geometry in front of `feet` along planar `forward`.
pub fn probe_ledge<Q: GeometryQuery + ?Sized>(
    query: &Q,
    cfg: &KccConfig,
    capsule: CapsuleSpec,
    feet: Vec3,
    forward: Vec2,
) -> LedgeProbe {
    let forward = match forward.try_normalize(1.0e-6) {
        Some(f) => f,
        None => Vec2::new(0.0, -1.0),
    };
    let fwd3 = Vec3::new(forward.x, 0.0, forward.y);

    // Vertical ray pair from inside the lower cap.
    let origin = feet + Vec3::new(0.0, capsule.radius, 0.0);
    let floor = query
        .raycast_down(origin, capsule.radius + cfg.max_snap_down)
        .map_or(feet.y, |hit| hit.point.y);
    let ceiling = query
        .raycast_up(origin, cfg.ledge_reach_height + capsule.height())
        .map(|hit| hit.point.y);

    let lo = floor + cfg.ledge_scan_min_height;
    let mut hi = floor + cfg.ledge_reach_height;
    if let Some(c) = ceiling {
        hi = hi.min(c - 1.0);
    }

    let report = |samples, candidates, decision| LedgeProbe {
        floor,
        ceiling,
        samples,
        candidates,
        decision,
    };

    if hi <= lo {
        log::debug!("ledge probe: ceiling at {ceiling:?} leaves no scan range");
        return report(Vec::new(), Vec::new(), JumpDecision::plain(JumpType::Blocked));
    }

    let reach = capsule.radius + cfg.ledge_scan_distance;
    let cast = |height: f32| ScanSample {
        height,
        hit: query.cast_ray(Vec3::new(feet.x, height, feet.z), fwd3, reach),
    };

    let mut samples = vec![cast(lo), cast(hi)];
    let coarse = cfg.ledge_scan_resolution * COARSE_STEP_FACTOR;
    subdivide(&cast, samples[0], samples[1], cfg.ledge_scan_resolution, coarse, &mut samples);
    samples.sort_by(|a, b| a.height.total_cmp(&b.height));

    if samples.iter().all(|s| s.hit.is_none()) {
        return report(samples, Vec::new(), JumpDecision::plain(JumpType::Forward));
    }

    let mut candidates = Vec::new();
    for pair in samples.windows(2) {
        let (below, above) = (pair[0], pair[1]);
        let Some(wall) = below.hit else { continue };
        if above.hit.is_some() {
            continue;
        }
        if let Some(candidate) =
            validate_candidate(query, cfg, capsule, floor, ceiling, fwd3, wall, below, above)
        {
            candidates.push(candidate);
        }
    }

    let best = candidates
        .iter()
        .copied()
        .max_by(|a, b| a.value.total_cmp(&b.value).then(b.height.total_cmp(&a.height)));

    let decision = match best {
        None => JumpDecision::plain(JumpType::Blocked),
        Some(ledge) => JumpDecision {
            kind: classify_height(ledge.height, cfg),
            ledge: Some(ledge),
        },
    };
    log::debug!(
        "ledge probe: {} samples, {} candidates, decision {:?}",
        samples.len(),
        candidates.len(),
        decision.kind
    );

    report(samples, candidates, decision)
}

/// Jump band for a ledge height.
pub fn classify_height(height: f32, cfg: &KccConfig) -> JumpType {
    if height <= cfg.jump_low_max {
        JumpType::JumpUpLow
    } else if height <= cfg.jump_mid_max {
        JumpType::JumpUpMid
    } else if height <= cfg.jump_high_max {
        JumpType::JumpUpHigh
    } else {
        JumpType::Climb
    }
}

fn subdivide<F: Fn(f32) -> ScanSample>(
    cast: &F,
    lo: ScanSample,
    hi: ScanSample,
    resolution: f32,
    coarse: f32,
    out: &mut Vec<ScanSample>,
) {
    if out.len() >= MAX_SCAN_SAMPLES {
        return;
    }
    let span = hi.height - lo.height;
    let differs = lo.hit.is_some() != hi.hit.is_some();
    if span <= resolution || (!differs && span <= coarse) {
        return;
    }
    let mid = cast(0.5 * (lo.height + hi.height));
    out.push(mid);
    subdivide(cast, lo, mid, resolution, coarse, out);
    subdivide(cast, mid, hi, resolution, coarse, out);
}

#[allow(clippy::too_many_arguments)]
fn validate_candidate<Q: GeometryQuery + ?Sized>(
    query: &Q,
    cfg: &KccConfig,
    capsule: CapsuleSpec,
    floor: f32,
    ceiling: Option<f32>,
    fwd3: Vec3,
    wall: RayHit,
    below: ScanSample,
    above: ScanSample,
) -> Option<LedgeCandidate> {
    // Lower surface must be wall-like and face the mover.
    if slope_angle_deg(&wall.normal) <= cfg.walk_max_deg {
        return None;
    }
    let facing = -wall.normal.dot(&fwd3);
    if facing < MIN_FACING_DOT {
        return None;
    }

    // Upper surface must be floor-like: probe down just past the wall face.
    let top_origin = Vec3::new(wall.point.x, above.height, wall.point.z) + fwd3 * LEDGE_PROBE_INSET;
    let drop = above.height - below.height + cfg.ledge_scan_resolution;
    let top = query.raycast_down(top_origin, drop)?;
    if slope_angle_deg(&top.normal) > cfg.walk_max_deg {
        return None;
    }

    let height = top.point.y - floor;
    if height < cfg.ledge_scan_min_height * 0.5 || height > cfg.ledge_reach_height {
        return None;
    }

    // Ceiling above the mover must let the capsule rise to the ledge.
    if let Some(c) = ceiling {
        if c < top.point.y + capsule.height() * 0.5 {
            return None;
        }
    }

    // Headroom above the landing spot.
    let landing = Vec3::new(wall.point.x, top.point.y, wall.point.z) + fwd3 * (capsule.radius + 1.0);
    if query
        .raycast_up(landing + Vec3::new(0.0, 1.0, 0.0), cfg.ledge_min_headroom)
        .is_some()
    {
        return None;
    }

    // Landing room past the wall face, measured at knee height above the ledge.
    let knee = Vec3::new(wall.point.x, top.point.y + capsule.radius, wall.point.z) + fwd3;
    let landing_room = query
        .cast_ray(knee, fwd3, cfg.ledge_landing_depth)
        .map_or(cfg.ledge_landing_depth, |hit| hit.distance);
    if landing_room < capsule.radius.min(cfg.ledge_landing_depth) {
        return None;
    }

    let distance = wall.distance;
    let sharpness = top.normal.y.max(0.0) * (1.0 - wall.normal.y.abs());
    let value = -(distance / (capsule.radius + cfg.ledge_scan_distance))
        + facing
        + sharpness
        + landing_room / cfg.ledge_landing_depth.max(1.0);

    Some(LedgeCandidate {
        height,
        point: top.point,
        normal: top.normal,
        wall_normal: wall.normal,
        distance,
        landing_room,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::rapier_world::{ColliderShapeDef, RapierQueryWorld, WorldStaticDef};
    use rstest::rstest;

    fn floor() -> WorldStaticDef {
        WorldStaticDef::new(
            1,
            Vec3::zeros(),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        )
    }

    /// Block whose near face is at z = -100 and whose top is at `height`.
    fn block(height: f32) -> WorldStaticDef {
        WorldStaticDef::new(
            2,
            Vec3::new(0.0, height * 0.5, -300.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(300.0, height * 0.5, 200.0),
            },
        )
    }

    fn probe(world: &RapierQueryWorld) -> LedgeProbe {
        let cfg = KccConfig::default();
        probe_ledge(
            world,
            &cfg,
            cfg.capsule(),
            Vec3::new(0.0, 1.0, 0.0),
            Vec2::new(0.0, -1.0),
        )
    }

    #[test]
    fn open_ground_is_a_forward_jump() {
        let world = RapierQueryWorld::build(vec![floor()]).expect("world");
        let result = probe(&world);
        assert_eq!(result.decision.kind, JumpType::Forward);
        assert!(result.decision.ledge.is_none());
    }

    #[rstest]
    #[case(80.0, JumpType::JumpUpLow)]
    #[case(130.0, JumpType::JumpUpMid)]
    #[case(200.0, JumpType::JumpUpHigh)]
    #[case(260.0, JumpType::Climb)]
    fn ledge_height_selects_band(#[case] height: f32, #[case] expected: JumpType) {
        let world = RapierQueryWorld::build(vec![floor(), block(height)]).expect("world");
        let result = probe(&world);
        assert_eq!(result.decision.kind, expected);
        let ledge = result.decision.ledge.expect("ledge");
        assert!((ledge.height - height).abs() < 1.0, "height {}", ledge.height);
        assert!(ledge.point.z < -100.0);
    }

    #[test]
    fn wall_taller_than_reach_is_blocked() {
        let world = RapierQueryWorld::build(vec![floor(), block(1000.0)]).expect("world");
        assert_eq!(probe(&world).decision.kind, JumpType::Blocked);
    }

    #[test]
    fn low_ceiling_over_mover_blocks_ledge() {
        // Slab whose underside is at y = 150, covering the mover but not the ledge top.
        let slab = WorldStaticDef::new(
            3,
            Vec3::new(0.0, 160.0, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(300.0, 10.0, 90.0),
            },
        );
        let world = RapierQueryWorld::build(vec![floor(), block(130.0), slab]).expect("world");
        let result = probe(&world);
        assert_eq!(result.ceiling.map(|c| c.round()), Some(150.0));
        assert_eq!(result.decision.kind, JumpType::Blocked);
    }

    #[rstest]
    #[case(50.0, JumpType::JumpUpLow)]
    #[case(100.0, JumpType::JumpUpLow)]
    #[case(101.0, JumpType::JumpUpMid)]
    #[case(221.0, JumpType::Climb)]
    fn height_bands(#[case] height: f32, #[case] expected: JumpType) {
        assert_eq!(classify_height(height, &KccConfig::default()), expected);
    }
}
