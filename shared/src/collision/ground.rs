use super::{
    query::GeometryQuery,
    settings::DIST_EPS,
    types::{CapsuleSpec, Vec3},
};
use crate::utils::slope_angle_deg;

/// Ground under a capsule, as reported by a short downward sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundContact {
    /// Unit surface normal used for slope classification.
    pub normal: Vec3,
    /// World-space contact point.
    pub point: Vec3,
    /// Vertical distance from the feet down to the contact.
    pub gap: f32,
    /// Slope angle of `normal` in degrees (0 = flat).
    pub slope_deg: f32,
}

/// Probe the ground below `feet` with a capsule down-sweep of `probe_distance`.
///
/// When the sweep normal is steeper than `walk_max_deg` (typical when the capsule brushes a
/// wall or a step edge while descending) and a ray cast straight down from the feet hits a
/// different surface, the ray normal is preferred.
pub fn probe_ground<Q: GeometryQuery + ?Sized>(
    query: &Q,
    capsule: CapsuleSpec,
    feet: Vec3,
    probe_distance: f32,
    walk_max_deg: f32,
) -> Option<GroundContact> {
    if probe_distance <= 0.0 {
        return None;
    }

    let center = capsule.center_from_feet(feet);
    let delta = Vec3::new(0.0, -probe_distance, 0.0);
    let hit = query.sweep_capsule(capsule, center, delta)?;

    // A contact that does not face up at all is a wall or a ceiling, not ground.
    if hit.normal.y <= DIST_EPS {
        return None;
    }

    let gap = hit.fraction * probe_distance;
    let mut normal = hit.normal;

    if slope_angle_deg(&normal) > walk_max_deg {
        // Cast from slightly above the feet so a hover gap does not start the ray inside geometry.
        let lift = capsule.radius;
        let origin = feet + Vec3::new(0.0, lift, 0.0);
        if let Some(ray) = query.raycast_down(origin, lift + probe_distance + capsule.radius) {
            if ray.normal.y > DIST_EPS && ray.normal.dot(&normal) < 1.0 - 1.0e-3 {
                log::trace!(
                    "ambiguous ground normal {:?}, using ray normal {:?}",
                    normal,
                    ray.normal
                );
                normal = ray.normal;
            }
        }
    }

    Some(GroundContact {
        normal,
        point: hit.point,
        gap,
        slope_deg: slope_angle_deg(&normal),
    })
}

/// Keep a capsule hovering above the nearest ground within `max_snap_distance`.
///
/// - `feet` is the current capsule bottom (world space).
/// - If ground is found within the downward sweep range, returns the feet position moved
///   vertically so that it hovers `hover_height` above the contact, plus the contact.
/// - Returns `None` when nothing is below within range.
pub fn snap_to_ground<Q: GeometryQuery + ?Sized>(
    query: &Q,
    capsule: CapsuleSpec,
    feet: Vec3,
    max_snap_distance: f32,
    hover_height: f32,
    walk_max_deg: f32,
) -> Option<(Vec3, GroundContact)> {
    if max_snap_distance <= 0.0 || hover_height < 0.0 {
        return None;
    }

    let contact = probe_ground(
        query,
        capsule,
        feet,
        max_snap_distance + hover_height,
        walk_max_deg,
    )?;
    let snapped = Vec3::new(feet.x, feet.y - contact.gap + hover_height, feet.z);
    Some((snapped, contact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::rapier_world::{ColliderShapeDef, RapierQueryWorld, WorldStaticDef};
    use crate::collision::types::Quat;
    use approx::assert_relative_eq;

    fn plane(id: u32, rotation: Quat) -> WorldStaticDef {
        WorldStaticDef::new(
            id,
            Vec3::zeros(),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        )
        .with_rotation(rotation)
    }

    #[test]
    fn flat_floor_reports_flat_contact() {
        let world = RapierQueryWorld::build(vec![plane(1, Quat::identity())]).expect("world");
        let capsule = CapsuleSpec::new(20.0, 40.0);
        let contact =
            probe_ground(&world, capsule, Vec3::new(0.0, 1.0, 0.0), 6.0, 45.0).expect("ground");
        assert_relative_eq!(contact.gap, 1.0, epsilon = 1.0e-2);
        assert_relative_eq!(contact.slope_deg, 0.0, epsilon = 1.0e-2);
    }

    #[test]
    fn tilted_plane_reports_its_slope() {
        let tilt = Quat::from_axis_angle(&Vec3::z_axis(), 30f32.to_radians());
        let world = RapierQueryWorld::build(vec![plane(1, tilt)]).expect("world");
        let capsule = CapsuleSpec::new(20.0, 40.0);
        let contact =
            probe_ground(&world, capsule, Vec3::new(0.0, 10.0, 0.0), 40.0, 45.0).expect("ground");
        assert_relative_eq!(contact.slope_deg, 30.0, epsilon = 0.5);
    }

    #[test]
    fn snap_pulls_feet_down_to_hover_height() {
        let world = RapierQueryWorld::build(vec![plane(1, Quat::identity())]).expect("world");
        let capsule = CapsuleSpec::new(20.0, 40.0);
        let (feet, _) = snap_to_ground(&world, capsule, Vec3::new(5.0, 12.0, 0.0), 30.0, 1.0, 45.0)
            .expect("snap");
        assert_relative_eq!(feet.y, 1.0, epsilon = 1.0e-2);
        assert_relative_eq!(feet.x, 5.0);
    }

    #[test]
    fn snap_gives_up_beyond_max_drop() {
        let world = RapierQueryWorld::build(vec![plane(1, Quat::identity())]).expect("world");
        let capsule = CapsuleSpec::new(20.0, 40.0);
        assert!(snap_to_ground(&world, capsule, Vec3::new(0.0, 80.0, 0.0), 30.0, 1.0, 45.0).is_none());
    }
}
