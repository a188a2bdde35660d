//! Rapier-based query world for immutable/static world geometry.
//!
//! This module builds an in-memory Rapier scene from a set of static collider
//! definitions and exposes it through [`GeometryQuery`] so the motion solver can ray cast
//! and sweep capsules against it.
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Query-focused: supports ray casts and shape casts. No dynamics are ever stepped.
//! - Immutable world: statics do not move after construction. When the world changes,
//!   build a new one.

// Re-export Rapier so downstream crates can use Rapier types without depending on
// `rapier3d` directly.
pub use rapier3d;

use rapier3d::na::{Point3, Translation3, UnitQuaternion};
use rapier3d::parry::query::{Ray, ShapeCastOptions};
use rapier3d::prelude::*;

use super::query::GeometryQuery;
use super::settings::{DIST_EPS, MIN_MOVE_SQ};
use super::types::{CapsuleSpec, RayHit, SweepHit, Vec3};
use crate::error::WorldBuildError;
use crate::utils::safe_normalize;

/// Canonical, schema-agnostic definition of an immutable world collider.
///
/// Conventions
/// - Units are world units (centimetre scale).
/// - Rotation is a unit quaternion.
/// - For planes, the normal is pose-derived: `normal = rotation * +Y`, and the plane passes
///   through `translation + normal * offset_along_normal`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vec3,
    /// World-space rotation (unit quaternion).
    pub rotation: UnitQuaternion<f32>,
    /// Collider shape parameters.
    pub shape: ColliderShapeDef,
}

impl WorldStaticDef {
    /// Convenience constructor for an unrotated static.
    pub fn new(id: u32, translation: Vec3, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation: UnitQuaternion::identity(),
            shape,
        }
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space). The normal is derived from the pose as `rotation * +Y`.
    Plane {
        /// Offset along the plane normal.
        offset_along_normal: f32,
    },

    /// Oriented cuboid with given half-extents.
    Cuboid { half_extents: Vec3 },

    /// Sphere/ball.
    Sphere { radius: f32 },

    /// Y-aligned capsule.
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder.
    CylinderY { radius: f32, half_height: f32 },

    /// Triangle mesh in local space (the usual shape of level collision).
    TriMesh {
        vertices: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
    },
}

/// In-memory Rapier structures needed for scene queries against a static world.
///
/// For immutable statics, these can be built once at startup and reused every tick.
pub struct RapierQueryWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
}

impl RapierQueryWorld {
    /// Build a query world from a list of static collider definitions.
    ///
    /// The input is sorted by `id` before insertion. Non-finite poses and malformed
    /// triangle meshes are rejected.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Result<Self, WorldBuildError> {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in &defs {
            if !def.translation.iter().all(|v| v.is_finite()) {
                return Err(WorldBuildError::NonFinitePose { id: def.id });
            }
            let mut collider = collider_from_def(def)?;
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);
            collider.set_position(iso);
            colliders.insert(collider);
        }

        // Run collision detection only (no dynamics) so the broad-phase BVH is populated
        // and queries can run.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        let hooks = ();
        let events = ();
        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &hooks,
            &events,
        );

        log::info!("built static query world with {} colliders", colliders.len());

        Ok(Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        })
    }

    /// Number of static colliders in the world.
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Create a borrowed `QueryPipeline` view suitable for scene queries.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }
}

impl GeometryQuery for RapierQueryWorld {
    fn cast_ray(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<RayHit> {
        if max_distance <= 0.0 {
            return None;
        }
        let dir = dir.try_normalize(DIST_EPS)?;
        let ray = Ray::new(Point3::from(origin), dir);
        let pipeline = self.query_pipeline(QueryFilter::default());
        let (_, hit) = pipeline.cast_ray_and_get_normal(&ray, max_distance, true)?;

        // A ray starting inside a solid reports a zero normal; treat it as facing the ray.
        let normal = safe_normalize(hit.normal, -dir);
        Some(RayHit {
            point: ray.point_at(hit.time_of_impact).coords,
            normal,
            distance: hit.time_of_impact,
        })
    }

    fn sweep_capsule(&self, capsule: CapsuleSpec, center: Vec3, delta: Vec3) -> Option<SweepHit> {
        if delta.norm_squared() <= MIN_MOVE_SQ {
            return None;
        }
        let shape = Capsule::new_y(capsule.half_height, capsule.radius);
        let pos = Isometry::translation(center.x, center.y, center.z);

        let mut options = ShapeCastOptions::with_max_time_of_impact(1.0);
        options.stop_at_penetration = false;

        let pipeline = self.query_pipeline(QueryFilter::default());
        let (_, hit) = pipeline.cast_shape(&pos, &delta, &shape, options)?;

        // `normal1` is the capsule's outward normal (capsule is unrotated, so local == world).
        // The surface normal is its opposite; ensure it opposes the motion.
        let fallback = -delta / delta.norm();
        let mut normal = safe_normalize(-hit.normal1.into_inner(), fallback);
        if normal.dot(&delta) > 0.0 {
            normal = -normal;
        }

        Some(SweepHit {
            fraction: hit.time_of_impact.clamp(0.0, 1.0),
            normal,
            point: center + delta * hit.time_of_impact + hit.witness1.coords,
        })
    }
}

/// Build a Rapier collider from a `WorldStaticDef` (local shape only; the caller sets the pose).
fn collider_from_def(def: &WorldStaticDef) -> Result<Collider, WorldBuildError> {
    let collider = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // Local +Y half-space shifted along its normal; the pose rotates it into place.
            ColliderBuilder::halfspace(Vector::y_axis())
                .translation(Vector::y() * *offset_along_normal)
                .build()
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build()
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius).build(),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius).build(),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius).build(),

        ColliderShapeDef::TriMesh { vertices, indices } => {
            let vertex_count = vertices.len() as u32;
            if indices.is_empty() || indices.iter().flatten().any(|&i| i >= vertex_count) {
                return Err(WorldBuildError::TriMesh {
                    id: def.id,
                    reason: "triangle index out of range or empty index buffer".into(),
                });
            }
            let points = vertices.iter().map(|v| Point3::from(*v)).collect();
            ColliderBuilder::trimesh(points, indices.clone())
                .map_err(|err| WorldBuildError::TriMesh {
                    id: def.id,
                    reason: format!("{err:?}"),
                })?
                .build()
        }
    };
    Ok(collider)
}
