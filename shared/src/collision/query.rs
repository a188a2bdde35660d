use super::types::{CapsuleSpec, RayHit, SweepHit, Vec3};

/// Scene queries against immutable world geometry.
///
/// This is the only surface the motion solver, the ledge probe and the stuck-recovery
/// probe use to look at the world. Implementations must report unit normals and must be
/// free of side effects so a tick can issue as many queries as it needs.
pub trait GeometryQuery {
    /// Cast a ray and return the closest hit within `max_distance`.
    ///
    /// `dir` does not need to be normalized; a zero direction yields `None`.
    fn cast_ray(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<RayHit>;

    /// Sweep a Y-aligned capsule centered at `center` along `delta` and return the
    /// earliest blocking contact.
    fn sweep_capsule(&self, capsule: CapsuleSpec, center: Vec3, delta: Vec3) -> Option<SweepHit>;

    /// Cast straight down from `origin`.
    fn raycast_down(&self, origin: Vec3, max_distance: f32) -> Option<RayHit> {
        self.cast_ray(origin, Vec3::new(0.0, -1.0, 0.0), max_distance)
    }

    /// Cast straight up from `origin`.
    fn raycast_up(&self, origin: Vec3, max_distance: f32) -> Option<RayHit> {
        self.cast_ray(origin, Vec3::new(0.0, 1.0, 0.0), max_distance)
    }
}

impl<T: GeometryQuery + ?Sized> GeometryQuery for &T {
    fn cast_ray(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<RayHit> {
        (**self).cast_ray(origin, dir, max_distance)
    }

    fn sweep_capsule(&self, capsule: CapsuleSpec, center: Vec3, delta: Vec3) -> Option<SweepHit> {
        (**self).sweep_capsule(capsule, center, delta)
    }
}
