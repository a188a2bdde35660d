use super::jump::{assisted_jump, assisted_position, forward_jump, launch_speed};
use super::ledge::{JumpDecision, LedgeProbe, probe_ledge};
use super::state::{
    CharacterMotionState, Hysteresis, JumpDescriptor, JumpType, LocomotionState, MotionEvent,
    MotionPhase, PhaseKind,
};
use super::transition::{GroundSensors, SlopeClass, transition};
use crate::collision::ground::{GroundContact, probe_ground, snap_to_ground};
use crate::collision::kinematic::{MoveRequest, move_capsule};
use crate::collision::query::GeometryQuery;
use crate::collision::settings::{MIN_MOVE_SQ, SNAP_TOLERANCE};
use crate::collision::types::{Vec2, Vec3};
use crate::config::KccConfig;
use crate::utils::{forward_from_yaw, safe_normalize, slope_angle_deg};

/// Hit normals pointing further down than this are ceilings.
const CEILING_NORMAL_Y: f32 = -0.5;

/// Result of one [`MotionSolver::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct MotionOutput {
    /// Feet position after the tick.
    pub position: Vec3,
    /// Actual displacement applied this tick.
    pub displacement: Vec3,
    pub ground_normal: Vec3,
    pub state: LocomotionState,
    /// A wall-like surface stopped part of the requested motion.
    pub wall_blocked: bool,
    pub events: Vec<MotionEvent>,
}

/// Kinematic motion solver: per-character, per-tick displacement resolution against
/// static geometry and gravity.
///
/// The solver is stateless apart from its tunables; everything per-character lives in
/// [`CharacterMotionState`].
#[derive(Clone, Debug, Default)]
pub struct MotionSolver {
    cfg: KccConfig,
}

impl MotionSolver {
    pub fn new(cfg: KccConfig) -> Self {
        Self { cfg }
    }

    #[inline]
    pub fn config(&self) -> &KccConfig {
        &self.cfg
    }

    /// Fresh (airborne) state using the configured capsule.
    pub fn new_state(&self, feet: Vec3, yaw: f32) -> CharacterMotionState {
        CharacterMotionState::new(feet, yaw, self.cfg.capsule())
    }

    /// Latch a freshly placed character onto walkable ground below it.
    ///
    /// Returns `false` (leaving the state airborne) when there is no backend or no walkable
    /// ground within `max_snap_down`.
    pub fn settle<Q: GeometryQuery + ?Sized>(
        &self,
        query: Option<&Q>,
        state: &mut CharacterMotionState,
    ) -> bool {
        let Some(query) = query else {
            return false;
        };
        let lift = state.capsule.radius * 0.5;
        let from = state.position + Vec3::new(0.0, lift, 0.0);
        let snapped = snap_to_ground(
            query,
            state.capsule,
            from,
            self.cfg.max_snap_down + lift,
            self.cfg.hover_height,
            self.cfg.walk_max_deg,
        );
        match snapped {
            Some((feet, contact)) if contact.slope_deg <= self.cfg.walk_max_deg => {
                state.position = feet;
                state.vertical_velocity = 0.0;
                state.hysteresis = Hysteresis::default();
                state.phase = MotionPhase::Grounded {
                    normal: contact.normal,
                };
                self.record_contact(state, Some(contact));
                true
            }
            _ => false,
        }
    }

    /// Advance one character by `dt` seconds.
    ///
    /// `desired_xz` is the requested planar displacement for the whole tick. `now` is the
    /// simulation time at the start of the tick. Without a backend the raw displacement is
    /// applied and the phase is left untouched.
    pub fn tick<Q: GeometryQuery + ?Sized>(
        &self,
        query: Option<&Q>,
        state: &mut CharacterMotionState,
        desired_xz: Vec2,
        dt: f32,
        now: f32,
    ) -> MotionOutput {
        let start = state.position;
        state.wall_blocked = false;

        if !(dt.is_finite() && dt > 0.0) {
            return self.output(state, start);
        }

        // Unvalidated tunables degrade to a single sub-step of the whole delta.
        let max_steps = self.cfg.max_substeps.max(1);
        let substep_dt = if self.cfg.max_substep_dt > 0.0 {
            self.cfg.max_substep_dt
        } else {
            dt
        };
        let total = dt.min(substep_dt * max_steps as f32);
        let mut desired = desired_xz * (total / dt);
        if !desired.iter().all(|v| v.is_finite()) || state.input_blocked(now) {
            desired = Vec2::zeros();
        }

        let Some(query) = query else {
            state.position += Vec3::new(desired.x, 0.0, desired.y);
            return self.output(state, start);
        };

        let steps = ((total / substep_dt).ceil() as u32).clamp(1, max_steps);
        let h = total / steps as f32;
        let step_xz = desired / steps as f32;
        for i in 0..steps {
            self.substep(query, state, step_xz, h, now + h * (i + 1) as f32);
        }

        self.output(state, start)
    }

    /// Probe the ledge in front of the character along its facing.
    pub fn probe_ledge<Q: GeometryQuery + ?Sized>(
        &self,
        query: &Q,
        state: &CharacterMotionState,
    ) -> LedgeProbe {
        probe_ledge(
            query,
            &self.cfg,
            state.capsule,
            state.position,
            forward_from_yaw(state.yaw()),
        )
    }

    /// Probe and, when allowed, start a jump. Returns the jump that started.
    ///
    /// Jumps need a backend, stable ground and unblocked input.
    pub fn request_jump<Q: GeometryQuery + ?Sized>(
        &self,
        query: Option<&Q>,
        state: &mut CharacterMotionState,
        now: f32,
    ) -> Option<JumpType> {
        let query = query?;
        if !state.stable_grounded() || state.input_blocked(now) {
            return None;
        }
        let probe = self.probe_ledge(query, state);
        if self.start_jump(state, &probe.decision, now) {
            Some(probe.decision.kind)
        } else {
            log::debug!("jump request declined: {:?}", probe.decision.kind);
            None
        }
    }

    /// Freeze `decision` into the state and enter the jump sub-state.
    pub fn start_jump(
        &self,
        state: &mut CharacterMotionState,
        decision: &JumpDecision,
        now: f32,
    ) -> bool {
        let dir = forward_from_yaw(state.yaw());
        let desc = match decision.kind {
            JumpType::Blocked => return false,
            JumpType::Forward => {
                state.vertical_velocity =
                    launch_speed(self.cfg.gravity, self.cfg.jump_forward_height);
                forward_jump(state.position, dir, now)
            }
            kind => {
                let Some(ledge) = decision.ledge.as_ref() else {
                    return false;
                };
                state.vertical_velocity = 0.0;
                assisted_jump(&self.cfg, state.capsule, kind, state.position, dir, ledge, now)
            }
        };
        state.phase = MotionPhase::Jumping(desc);
        state.hysteresis = Hysteresis::default();
        state.push_event(MotionEvent::Jumped(desc.kind));
        log::debug!("jump started: {:?} at {:?}", desc.kind, state.position);
        true
    }

    fn substep<Q: GeometryQuery + ?Sized>(
        &self,
        query: &Q,
        state: &mut CharacterMotionState,
        xz: Vec2,
        h: f32,
        t: f32,
    ) {
        let was_grounded = state.stable_grounded();

        // Desired displacement for this sub-step.
        let delta = match state.phase {
            MotionPhase::Jumping(desc) => {
                self.step_jump(query, state, desc, h, t);
                return;
            }
            MotionPhase::Grounded { .. } => {
                state.vertical_velocity = 0.0;
                Vec3::new(xz.x, 0.0, xz.y)
            }
            MotionPhase::Sliding { speed } => {
                // Input is discarded; accelerate down the slope.
                let n = state.ground_normal;
                let downhill = safe_normalize(Vec3::new(0.0, -1.0, 0.0) + n * n.y, Vec3::zeros());
                let accel = self.cfg.slide_acceleration * state.slope_deg.to_radians().sin();
                let speed = (speed + accel * h).min(self.cfg.max_slide_speed);
                state.phase = MotionPhase::Sliding { speed };
                state.vertical_velocity = 0.0;
                downhill * speed * h
            }
            MotionPhase::Falling { .. } => {
                state.vertical_velocity =
                    (state.vertical_velocity - self.cfg.gravity * h).max(-self.cfg.max_fall_speed);
                Vec3::new(xz.x, state.vertical_velocity * h, xz.y)
            }
        };

        // Sweep and slide.
        self.sweep(query, state, delta, t);

        // Reclassify ground contact.
        let rising = state.vertical_velocity > 0.0;
        let mut contact = if rising {
            None
        } else {
            probe_ground(
                query,
                state.capsule,
                state.position,
                self.cfg.ground_probe_distance,
                self.cfg.walk_max_deg,
            )
        };

        // Ground recovery: re-latch small drops and hover gaps.
        if (was_grounded || state.is_sliding()) && !rising {
            let off_hover = contact.is_none_or(|c| (c.gap - self.cfg.hover_height).abs() > SNAP_TOLERANCE);
            let max_drop = if was_grounded {
                self.cfg.max_snap_down
            } else {
                self.cfg.ground_probe_distance
            };
            if off_hover {
                if let Some((feet, c)) = snap_to_ground(
                    query,
                    state.capsule,
                    state.position,
                    max_drop,
                    self.cfg.hover_height,
                    self.cfg.walk_max_deg,
                ) {
                    log::trace!("ground recovery: {:.3} -> {:.3}", state.position.y, feet.y);
                    state.position = feet;
                    contact = Some(c);
                }
            }
        }

        self.record_contact(state, contact);

        let sensors = contact.map_or(GroundSensors::none(), |c| {
            GroundSensors::with_contact(c.normal, c.slope_deg)
        });
        let previous = state.phase;
        let change = transition(
            state.phase,
            state.hysteresis,
            sensors,
            &self.cfg,
            h,
            state.position.y,
        );
        state.phase = change.phase;
        state.hysteresis = change.hysteresis;
        if change.left.is_some() {
            self.on_phase_change(state, previous, t);
        }

        if state.stable_grounded() {
            state.air_time = 0.0;
        } else {
            state.air_time += h;
        }
    }

    fn step_jump<Q: GeometryQuery + ?Sized>(
        &self,
        query: &Q,
        state: &mut CharacterMotionState,
        desc: JumpDescriptor,
        h: f32,
        t: f32,
    ) {
        state.air_time += h;

        if desc.kind.is_assisted() {
            let (pos, done) = assisted_position(&desc, self.cfg.jump_arc_height, t);
            state.position = pos;
            state.vertical_velocity = 0.0;
            if done {
                // Snap onto the ledge and skip sweeps briefly so side walls don't push back.
                state.phase = MotionPhase::Grounded { normal: Vec3::y() };
                state.grounded = true;
                state.ground_normal = Vec3::y();
                state.slope_deg = 0.0;
                state.bypass_until = t + self.cfg.kcc_bypass_time;
                state.air_time = 0.0;
                state.push_event(MotionEvent::Landed);
            }
            return;
        }

        // Forward jump: ballistic, fixed horizontal velocity, no re-boost.
        state.vertical_velocity =
            (state.vertical_velocity - self.cfg.gravity * h).max(-self.cfg.max_fall_speed);
        let xz = desc.dir * self.cfg.jump_forward_speed * h;
        let delta = Vec3::new(xz.x, state.vertical_velocity * h, xz.y);
        self.sweep(query, state, delta, t);

        if t - desc.start_time < self.cfg.jump_grace || state.vertical_velocity > 0.0 {
            return;
        }

        let contact = probe_ground(
            query,
            state.capsule,
            state.position,
            self.cfg.ground_probe_distance,
            self.cfg.walk_max_deg,
        );
        match contact.map(|c| (c, SlopeClass::classify(c.slope_deg, &self.cfg))) {
            Some((c, SlopeClass::Walkable)) => {
                state.phase = MotionPhase::Grounded { normal: c.normal };
                state.vertical_velocity = 0.0;
                state.air_time = 0.0;
                self.record_contact(state, Some(c));
                state.push_event(MotionEvent::Landed);
            }
            Some((c, SlopeClass::Slide)) => {
                state.phase = MotionPhase::Sliding { speed: 0.0 };
                state.vertical_velocity = 0.0;
                self.record_contact(state, Some(c));
            }
            _ => {
                if desc.start_pos.y - state.position.y > self.cfg.fall_down_height {
                    state.phase = MotionPhase::Falling {
                        start_height: desc.start_pos.y,
                    };
                }
            }
        }
        state.hysteresis = Hysteresis::default();
    }

    /// Apply `delta` through the sweep-and-slide controller, or directly while bypassing.
    fn sweep<Q: GeometryQuery + ?Sized>(
        &self,
        query: &Q,
        state: &mut CharacterMotionState,
        delta: Vec3,
        t: f32,
    ) {
        if delta.norm_squared() <= MIN_MOVE_SQ {
            return;
        }
        if state.bypassing(t) {
            state.position += delta;
            return;
        }

        let req = MoveRequest {
            start_pos: state.capsule.center_from_feet(state.position),
            desired_translation: delta,
            capsule: state.capsule,
            skin: self.cfg.skin,
            max_iterations: self.cfg.max_iterations,
            wall_slide: self.cfg.wall_slide,
        };
        let res = move_capsule(query, req);
        state.position = state.capsule.feet_from_center(res.end_pos);

        for hit in [res.first_hit, res.last_hit].into_iter().flatten() {
            if hit.normal.y < CEILING_NORMAL_Y {
                state.vertical_velocity = state.vertical_velocity.min(0.0);
            } else if slope_angle_deg(&hit.normal) > self.cfg.slide_to_fall_max_deg {
                state.wall_blocked = true;
            }
        }
    }

    fn record_contact(&self, state: &mut CharacterMotionState, contact: Option<GroundContact>) {
        match contact {
            Some(c) => {
                state.grounded = c.slope_deg <= self.cfg.walk_max_deg;
                state.ground_normal = c.normal;
                state.slope_deg = c.slope_deg;
            }
            None => {
                state.grounded = false;
                state.ground_normal = Vec3::y();
                state.slope_deg = 0.0;
            }
        }
    }

    fn on_phase_change(&self, state: &mut CharacterMotionState, previous: MotionPhase, t: f32) {
        log::trace!("phase {:?} -> {:?}", previous.kind(), state.phase.kind());
        match (previous, state.phase.kind()) {
            (MotionPhase::Falling { start_height }, PhaseKind::Grounded) => {
                state.vertical_velocity = 0.0;
                state.push_event(MotionEvent::Landed);
                self.count_short_fall(state, start_height - state.position.y, t);
            }
            (MotionPhase::Sliding { speed }, PhaseKind::Falling) => {
                // Carry the vertical part of the slide into the fall.
                state.vertical_velocity = -speed * state.slope_deg.to_radians().sin().abs();
            }
            (_, PhaseKind::Grounded | PhaseKind::Sliding) => {
                state.vertical_velocity = 0.0;
            }
            _ => {}
        }
    }

    /// Debounce repeated short drops (e.g. jittering off a step edge) by ignoring input
    /// for a moment after `short_fall_limit` of them in a row.
    fn count_short_fall(&self, state: &mut CharacterMotionState, drop: f32, t: f32) {
        if drop >= self.cfg.short_fall_height {
            state.short_falls = 0;
            return;
        }
        state.short_falls += 1;
        if state.short_falls >= self.cfg.short_fall_limit {
            log::debug!("{} short falls in a row, blocking input", state.short_falls);
            state.short_falls = 0;
            state.input_block_until = t + self.cfg.short_fall_block_time;
        }
    }

    fn output(&self, state: &mut CharacterMotionState, start: Vec3) -> MotionOutput {
        MotionOutput {
            position: state.position,
            displacement: state.position - start,
            ground_normal: state.ground_normal,
            state: state.locomotion(self.cfg.fall_down_height),
            wall_blocked: state.wall_blocked,
            events: state.take_events(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::rapier_world::{ColliderShapeDef, RapierQueryWorld, WorldStaticDef};
    use crate::collision::types::Quat;
    use approx::assert_relative_eq;

    fn floor_world() -> RapierQueryWorld {
        RapierQueryWorld::build(vec![WorldStaticDef::new(
            1,
            Vec3::zeros(),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        )])
        .expect("world")
    }

    fn solver_with_radius(radius: f32) -> MotionSolver {
        MotionSolver::new(KccConfig {
            capsule_radius: radius,
            ..KccConfig::default()
        })
    }

    #[test]
    fn flat_floor_free_move_is_applied_exactly() {
        let world = floor_world();
        let solver = solver_with_radius(20.0);
        let mut state = solver.new_state(Vec3::new(0.0, 5.0, 0.0), 0.0);
        assert!(solver.settle(Some(&world), &mut state));

        let out = solver.tick(Some(&world), &mut state, Vec2::new(100.0, 0.0), 0.016, 0.0);
        assert_relative_eq!(out.displacement.x, 100.0, epsilon = 1.0e-3);
        assert_relative_eq!(out.displacement.z, 0.0, epsilon = 1.0e-3);
        assert_relative_eq!(out.displacement.y, 0.0, epsilon = 1.0e-3);
        assert!(state.stable_grounded());
        assert!(state.grounded);
        assert_eq!(out.state, LocomotionState::Grounded);
    }

    #[test]
    fn resting_on_flat_ground_does_not_drift() {
        let world = floor_world();
        let solver = MotionSolver::default();
        let mut state = solver.new_state(Vec3::new(10.0, 3.0, -4.0), 0.0);
        assert!(solver.settle(Some(&world), &mut state));
        let rest = state.position;

        let mut now = 0.0;
        for _ in 0..200 {
            let out = solver.tick(Some(&world), &mut state, Vec2::zeros(), 1.0 / 60.0, now);
            now += 1.0 / 60.0;
            assert_eq!(out.displacement, Vec3::zeros());
        }
        assert_eq!(state.position, rest);
        assert!(state.stable_grounded());
    }

    #[test]
    fn without_backend_applies_raw_displacement() {
        let solver = MotionSolver::default();
        let mut state = solver.new_state(Vec3::new(0.0, 50.0, 0.0), 0.0);
        let out = solver.tick::<RapierQueryWorld>(None, &mut state, Vec2::new(3.0, -4.0), 0.016, 0.0);
        assert_eq!(out.displacement, Vec3::new(3.0, 0.0, -4.0));
    }

    #[test]
    fn large_delta_is_clamped_and_sub_stepped() {
        let world = floor_world();
        let solver = MotionSolver::default();
        let mut state = solver.new_state(Vec3::new(0.0, 5.0, 0.0), 0.0);
        assert!(solver.settle(Some(&world), &mut state));
        // A 2 s stall requesting 1000 units only gets the clamped fraction.
        let out = solver.tick(Some(&world), &mut state, Vec2::new(1000.0, 0.0), 2.0, 0.0);
        let cfg = solver.config();
        let expected = 1000.0 * cfg.max_substep_dt * cfg.max_substeps as f32 / 2.0;
        assert_relative_eq!(out.displacement.x, expected, epsilon = 1.0e-2);
    }

    #[test]
    fn zero_substep_config_still_ticks() {
        let world = floor_world();
        let solver = MotionSolver::new(KccConfig {
            max_substeps: 0,
            max_substep_dt: 0.0,
            ..KccConfig::default()
        });
        let mut state = solver.new_state(Vec3::new(0.0, 5.0, 0.0), 0.0);
        assert!(solver.settle(Some(&world), &mut state));
        let out = solver.tick(Some(&world), &mut state, Vec2::new(3.0, 0.0), 0.016, 0.0);
        assert!(out.displacement.iter().all(|v| v.is_finite()));
        assert_relative_eq!(out.displacement.x, 3.0, epsilon = 1.0e-2);
    }

    #[test]
    fn falling_in_empty_world_turns_fall_down_into_fall() {
        let world = RapierQueryWorld::build(Vec::new()).expect("world");
        let solver = MotionSolver::default();
        let mut state = solver.new_state(Vec3::new(0.0, 5000.0, 0.0), 0.0);

        let mut now = 0.0;
        let first = solver.tick(Some(&world), &mut state, Vec2::zeros(), 0.05, now);
        assert_eq!(first.state, LocomotionState::FallDown);

        let mut last = first.state;
        for _ in 0..40 {
            now += 0.05;
            last = solver.tick(Some(&world), &mut state, Vec2::zeros(), 0.05, now).state;
        }
        assert!(5000.0 - state.position.y > solver.config().fall_down_height);
        assert_eq!(last, LocomotionState::Fall);
    }

    #[test]
    fn lands_after_falling_and_reports_event() {
        let world = floor_world();
        let solver = MotionSolver::default();
        let mut state = solver.new_state(Vec3::new(0.0, 300.0, 0.0), 0.0);
        let mut now = 0.0;
        let mut landed = false;
        for _ in 0..120 {
            let out = solver.tick(Some(&world), &mut state, Vec2::zeros(), 1.0 / 60.0, now);
            now += 1.0 / 60.0;
            landed |= out.events.contains(&MotionEvent::Landed);
        }
        assert!(landed);
        assert!(state.stable_grounded());
        assert_relative_eq!(state.position.y, solver.config().hover_height, epsilon = 0.1);
    }

    #[test]
    fn steep_slope_slides_downhill_ignoring_input() {
        let tilt = Quat::from_axis_angle(&Vec3::z_axis(), 55f32.to_radians());
        let world = RapierQueryWorld::build(vec![
            WorldStaticDef::new(
                1,
                Vec3::zeros(),
                ColliderShapeDef::Plane {
                    offset_along_normal: 0.0,
                },
            )
            .with_rotation(tilt),
        ])
        .expect("world");
        let solver = MotionSolver::default();
        // Plane height at x = 0 is 0; start a little above it.
        let mut state = solver.new_state(Vec3::new(0.0, 40.0, 0.0), 0.0);

        let mut now = 0.0;
        for _ in 0..60 {
            solver.tick(Some(&world), &mut state, Vec2::new(0.0, 50.0), 1.0 / 60.0, now);
            now += 1.0 / 60.0;
        }
        assert!(state.is_sliding(), "phase {:?}", state.phase);
        assert!(state.position.y < 0.0);
        // Downhill is -X for this tilt; requested +Z input was discarded while sliding.
        assert!(state.position.x < 0.0);
    }

    #[test]
    fn forward_jump_on_open_ground_goes_up_then_lands() {
        let world = floor_world();
        let solver = MotionSolver::default();
        let mut state = solver.new_state(Vec3::new(0.0, 5.0, 0.0), 0.0);
        assert!(solver.settle(Some(&world), &mut state));

        assert_eq!(solver.request_jump(Some(&world), &mut state, 0.0), Some(JumpType::Forward));
        assert!(state.is_jumping());

        let mut now = 0.0;
        let mut apex: f32 = 0.0;
        let mut events = Vec::new();
        for _ in 0..120 {
            let out = solver.tick(Some(&world), &mut state, Vec2::zeros(), 1.0 / 60.0, now);
            now += 1.0 / 60.0;
            apex = apex.max(state.position.y);
            events.extend(out.events);
        }
        assert!(apex > 40.0);
        assert!(events.contains(&MotionEvent::Jumped(JumpType::Forward)));
        assert!(events.contains(&MotionEvent::Landed));
        assert!(state.stable_grounded());
        // Forward is -Z at yaw 0.
        assert!(state.position.z < -100.0);
    }

    #[test]
    fn jump_up_lerps_onto_the_ledge() {
        let world = RapierQueryWorld::build(vec![
            WorldStaticDef::new(
                1,
                Vec3::zeros(),
                ColliderShapeDef::Plane {
                    offset_along_normal: 0.0,
                },
            ),
            WorldStaticDef::new(
                2,
                Vec3::new(0.0, 65.0, -300.0),
                ColliderShapeDef::Cuboid {
                    half_extents: Vec3::new(300.0, 65.0, 200.0),
                },
            ),
        ])
        .expect("world");
        let solver = MotionSolver::default();
        let mut state = solver.new_state(Vec3::new(0.0, 5.0, -50.0), 0.0);
        assert!(solver.settle(Some(&world), &mut state));

        assert_eq!(solver.request_jump(Some(&world), &mut state, 0.0), Some(JumpType::JumpUpMid));

        let mut now = 0.0;
        for _ in 0..90 {
            solver.tick(Some(&world), &mut state, Vec2::zeros(), 1.0 / 60.0, now);
            now += 1.0 / 60.0;
        }
        assert!(state.stable_grounded());
        assert_relative_eq!(state.position.y, 130.0 + solver.config().hover_height, epsilon = 0.5);
        assert!(state.position.z < -100.0);
    }

    #[test]
    fn repeated_short_falls_block_input() {
        let solver = MotionSolver::default();
        let mut state = solver.new_state(Vec3::zeros(), 0.0);
        for _ in 0..solver.config().short_fall_limit {
            solver.count_short_fall(&mut state, 5.0, 1.0);
        }
        assert!(state.input_blocked(1.2));
        assert!(!state.input_blocked(2.0));
        assert_eq!(state.short_falls, 0);
    }
}
