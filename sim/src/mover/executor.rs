use shared::crowd::{CircleCollider, DeadlockState, EscapeSteer, probe_escape_direction};
use shared::steering::{StepToward, desired_step};
use shared::utils::{forward_from_yaw, planar_distance, safe_normalize2, to_planar, yaw_from_xz};
use shared::{CapsuleSpec, GeometryQuery, Vec2, Vec3, Waynet};

use super::route::{MoveGoal, Route, plan_route};
use crate::config::MoverConfig;

/// How a finished move ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Arrived,
    GaveUp,
}

/// Caller options for a move request.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveOptions {
    pub run: bool,
    /// Overrides the walk/run speed.
    pub speed: Option<f32>,
    /// Overrides the configured arrival radius.
    pub arrival_radius: Option<f32>,
    /// Facing on arrival; defaults to the goal's direction when it has one.
    pub final_yaw: Option<f32>,
}

/// Executor state of one active mover.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveState {
    route: Route,
    next: usize,
    speed: f32,
    arrival_radius: f32,
    running: bool,
    outcome: Option<MoveOutcome>,
    final_yaw: Option<f32>,

    stuck_timer: f32,
    recovery_attempted: bool,
    recovery_steer: Option<EscapeSteer>,
    traffic_wait_until: f32,
    crowd_blocked: bool,

    final_blocked_timer: f32,
    final_gate_timer: f32,

    wall_blocked_time: f32,
}

impl MoveState {
    #[inline]
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Index of the route point currently being approached.
    #[inline]
    pub fn next_index(&self) -> usize {
        self.next
    }

    #[inline]
    pub fn target(&self) -> Option<Vec3> {
        self.route.point(self.next)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn outcome(&self) -> Option<MoveOutcome> {
        self.outcome
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    #[inline]
    pub fn final_yaw(&self) -> Option<f32> {
        self.final_yaw
    }

    #[inline]
    pub fn recovery_attempted(&self) -> bool {
        self.recovery_attempted
    }

    fn advance(&mut self) {
        self.next += 1;
        self.stuck_timer = 0.0;
        self.final_blocked_timer = 0.0;
        self.final_gate_timer = 0.0;
    }

    fn finish(&mut self, outcome: MoveOutcome) -> Option<MoveOutcome> {
        if self.outcome.is_none() {
            log::debug!("move finished: {:?} at route index {}", outcome, self.next);
        }
        self.outcome = Some(outcome);
        self.outcome
    }
}

/// What the mover wants this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovePlan {
    /// Planar displacement for the whole tick.
    pub desired: Vec2,
    /// Planar direction to face, if moving.
    pub facing: Option<Vec2>,
    /// Set once the move is over; `desired` is zero then.
    pub outcome: Option<MoveOutcome>,
}

impl MovePlan {
    fn stop(outcome: Option<MoveOutcome>) -> Self {
        Self {
            desired: Vec2::zeros(),
            facing: None,
            outcome,
        }
    }
}

/// What happened to the mover this tick, after the resolver and the solver ran.
#[derive(Clone, Copy, Debug)]
pub struct MoveObservation {
    pub before: Vec3,
    pub after: Vec3,
    pub yaw: f32,
    pub capsule: CapsuleSpec,
    /// The crowd resolver altered the request.
    pub crowd_blocked: bool,
    /// The solver was stopped by a wall-like surface.
    pub wall_blocked: bool,
    pub grounded: bool,
    pub dt: f32,
    pub now: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveAdvice {
    Continue,
    /// Wall-blocked long enough: probe the ledge and jump if possible.
    TryJump,
    Finished(MoveOutcome),
}

/// Waypoint task executor.
///
/// `idle -> moving -> (arrived | gave up)`. A move is started with one of the
/// `start_move_to_*` calls; each tick the owner calls [`MoveExecutor::plan`] before
/// resolving motion and [`MoveExecutor::observe`] after it.
#[derive(Clone, Debug)]
pub struct MoveExecutor {
    cfg: MoverConfig,
    yaw_offsets: Vec<f32>,
}

impl Default for MoveExecutor {
    fn default() -> Self {
        Self::new(MoverConfig::default())
    }
}

impl MoveExecutor {
    pub fn new(cfg: MoverConfig) -> Self {
        let yaw_offsets = cfg
            .recovery_yaw_offsets_deg
            .iter()
            .map(|d| d.to_radians())
            .collect();
        Self { cfg, yaw_offsets }
    }

    #[inline]
    pub fn config(&self) -> &MoverConfig {
        &self.cfg
    }

    pub fn start_move_to_waypoint(
        &self,
        net: Option<&Waynet>,
        from: Vec3,
        name: &str,
        options: MoveOptions,
    ) -> Option<MoveState> {
        self.start(net, from, MoveGoal::Waypoint(name), options)
    }

    pub fn start_move_to_position(
        &self,
        net: Option<&Waynet>,
        from: Vec3,
        target: Vec3,
        options: MoveOptions,
    ) -> Option<MoveState> {
        self.start(net, from, MoveGoal::Position(target), options)
    }

    pub fn start_move_to_freepoint(
        &self,
        net: Option<&Waynet>,
        from: Vec3,
        name: &str,
        options: MoveOptions,
    ) -> Option<MoveState> {
        self.start(net, from, MoveGoal::Freepoint(name), options)
    }

    /// Plan a route and build the move state. `None` without a waynet or a route.
    pub fn start(
        &self,
        net: Option<&Waynet>,
        from: Vec3,
        goal: MoveGoal<'_>,
        options: MoveOptions,
    ) -> Option<MoveState> {
        let Some(net) = net else {
            log::warn!("move to {:?} requested without a waynet", goal);
            return None;
        };
        let Some(route) = plan_route(net, from, goal) else {
            log::debug!("no route from {:?} to {:?}", from, goal);
            return None;
        };

        let speed = options.speed.unwrap_or(if options.run {
            self.cfg.run_speed
        } else {
            self.cfg.walk_speed
        });
        let final_yaw = options.final_yaw.or_else(|| {
            route
                .final_direction()
                .and_then(|d| yaw_from_xz(to_planar(&d)))
        });

        log::debug!("move started: {:?}, {} route points", goal, route.len());
        Some(MoveState {
            route,
            next: 0,
            speed: speed.max(0.0),
            arrival_radius: options
                .arrival_radius
                .unwrap_or(self.cfg.arrival_radius)
                .max(0.0),
            running: options.run,
            outcome: None,
            final_yaw,
            stuck_timer: 0.0,
            recovery_attempted: false,
            recovery_steer: None,
            traffic_wait_until: f32::NEG_INFINITY,
            crowd_blocked: false,
            final_blocked_timer: 0.0,
            final_gate_timer: 0.0,
            wall_blocked_time: 0.0,
        })
    }

    /// Accept reached waypoints and compute this tick's desired displacement.
    ///
    /// `others` is the tick's collider snapshot, used to spot occupied waypoints. An active
    /// escape steer (world recovery first, then the crowd resolver's) overrides the route
    /// target until it is reached or expires.
    #[allow(clippy::too_many_arguments)]
    pub fn plan(
        &self,
        mv: &mut MoveState,
        id: u64,
        position: Vec3,
        others: &[CircleCollider],
        deadlock: &mut DeadlockState,
        dt: f32,
        now: f32,
    ) -> MovePlan {
        if mv.is_done() {
            return MovePlan::stop(mv.outcome);
        }

        let here = to_planar(&position);
        let target = loop {
            let Some(point) = mv.route.point(mv.next) else {
                return MovePlan::stop(mv.finish(MoveOutcome::Arrived));
            };
            let target = to_planar(&point);
            let dist = (target - here).norm();

            if mv.route.is_final(mv.next) {
                if self.final_reached(mv, dist) {
                    return MovePlan::stop(mv.finish(MoveOutcome::Arrived));
                }
                break target;
            }
            if self.intermediate_reached(mv, id, target, dist, others) {
                mv.advance();
                continue;
            }
            break target;
        };

        let (aim, acceptance) = match self.active_steer(mv, deadlock, here, now) {
            Some(steer) => (steer, 0.0),
            None if mv.route.is_final(mv.next) => (target, mv.arrival_radius * 0.5),
            None => (target, 0.0),
        };

        let step = desired_step(StepToward {
            current: here,
            target: aim,
            speed: mv.speed,
            dt,
            acceptance_radius: acceptance,
        });
        let facing = (step.step.norm_squared() > 0.0).then(|| safe_normalize2(step.step, Vec2::zeros()));

        MovePlan {
            desired: step.step,
            facing,
            outcome: None,
        }
    }

    /// Update timers from what actually happened this tick.
    pub fn observe<Q: GeometryQuery + ?Sized>(
        &self,
        query: Option<&Q>,
        mv: &mut MoveState,
        obs: &MoveObservation,
    ) -> MoveAdvice {
        if let Some(outcome) = mv.outcome {
            return MoveAdvice::Finished(outcome);
        }
        let cfg = &self.cfg;
        let progress = planar_distance(&obs.before, &obs.after);

        mv.crowd_blocked = obs.crowd_blocked;
        if obs.crowd_blocked {
            mv.traffic_wait_until = obs.now + cfg.traffic_wait;
        }

        if mv.route.is_final(mv.next) {
            if obs.crowd_blocked {
                mv.final_blocked_timer += obs.dt;
            } else {
                mv.final_blocked_timer = 0.0;
            }
            let inside_gate = mv.target().is_some_and(|t| {
                (to_planar(&t) - to_planar(&obs.after)).norm() <= self.gate_radius(mv)
            });
            if inside_gate {
                mv.final_gate_timer += obs.dt;
            } else {
                mv.final_gate_timer = 0.0;
            }
        }

        let mut advice = MoveAdvice::Continue;
        if obs.wall_blocked && obs.grounded {
            mv.wall_blocked_time += obs.dt;
        } else {
            mv.wall_blocked_time = 0.0;
        }
        if cfg.auto_jump && mv.wall_blocked_time >= cfg.jump_probe_delay {
            mv.wall_blocked_time = 0.0;
            advice = MoveAdvice::TryJump;
        }

        let expected = mv.speed * obs.dt;
        if progress >= expected * cfg.stuck_progress_ratio {
            mv.stuck_timer = 0.0;
        } else if obs.now >= mv.traffic_wait_until {
            mv.stuck_timer += obs.dt;
        }

        if mv.stuck_timer >= cfg.stuck_time {
            mv.stuck_timer = 0.0;
            if mv.recovery_attempted {
                log::info!("mover stuck at {:?} after recovery, giving up", obs.after);
                mv.finish(MoveOutcome::GaveUp);
                return MoveAdvice::Finished(MoveOutcome::GaveUp);
            }
            mv.recovery_attempted = true;
            match self.recover(query, mv, obs) {
                Some(steer) => {
                    log::debug!("mover stuck at {:?}, recovering toward {:?}", obs.after, steer.point);
                    mv.recovery_steer = Some(steer);
                }
                None => {
                    log::info!("mover stuck at {:?} with no escape direction, giving up", obs.after);
                    mv.finish(MoveOutcome::GaveUp);
                    return MoveAdvice::Finished(MoveOutcome::GaveUp);
                }
            }
        }

        advice
    }

    fn intermediate_reached(
        &self,
        mv: &MoveState,
        id: u64,
        target: Vec2,
        dist: f32,
        others: &[CircleCollider],
    ) -> bool {
        if dist <= mv.arrival_radius {
            return true;
        }
        if dist > self.cfg.crowd_radius {
            return false;
        }
        let occupied = others
            .iter()
            .any(|c| c.id != id && (c.center() - target).norm() <= self.cfg.occupied_radius);
        if occupied || mv.crowd_blocked {
            log::trace!(
                "skipping crowded waypoint {} (occupied: {occupied})",
                mv.next
            );
            return true;
        }
        false
    }

    fn final_reached(&self, mv: &MoveState, dist: f32) -> bool {
        if dist <= mv.arrival_radius {
            return true;
        }
        if mv.final_blocked_timer >= self.cfg.final_blocked_time && dist <= self.gate_radius(mv) {
            log::debug!("final waypoint accepted by gate at distance {dist}");
            return true;
        }
        if mv.final_gate_timer >= self.cfg.final_gate_timeout {
            log::debug!("final waypoint accepted after dwelling in gate at distance {dist}");
            return true;
        }
        false
    }

    /// Final gate radius; grows while resolver-blocked past `final_blocked_time`.
    fn gate_radius(&self, mv: &MoveState) -> f32 {
        let cfg = &self.cfg;
        let overdue = (mv.final_blocked_timer - cfg.final_blocked_time).max(0.0);
        (cfg.final_gate_radius + cfg.final_gate_growth * overdue)
            .min(cfg.final_gate_max_radius)
            .max(mv.arrival_radius)
    }

    fn active_steer(
        &self,
        mv: &mut MoveState,
        deadlock: &mut DeadlockState,
        here: Vec2,
        now: f32,
    ) -> Option<Vec2> {
        let reached = |p: Vec2| (p - here).norm() <= self.cfg.steer_reached_radius;

        if mv
            .recovery_steer
            .is_some_and(|s| now >= s.until || reached(s.point))
        {
            mv.recovery_steer = None;
        }
        if let Some(steer) = mv.recovery_steer {
            return Some(steer.point);
        }

        let steer = deadlock.active_steer(now)?;
        if reached(steer.point) {
            deadlock.steer = None;
            return None;
        }
        Some(steer.point)
    }

    fn recover<Q: GeometryQuery + ?Sized>(
        &self,
        query: Option<&Q>,
        mv: &MoveState,
        obs: &MoveObservation,
    ) -> Option<EscapeSteer> {
        let query = query?;
        let here = to_planar(&obs.after);
        let forward = mv
            .target()
            .map(|t| safe_normalize2(to_planar(&t) - here, forward_from_yaw(obs.yaw)))
            .unwrap_or_else(|| forward_from_yaw(obs.yaw));
        let dir = probe_escape_direction(
            query,
            obs.capsule,
            obs.after,
            forward,
            self.cfg.recovery_probe_distance,
            &self.yaw_offsets,
        )?;
        Some(EscapeSteer {
            point: here + dir * self.cfg.recovery_probe_distance,
            until: obs.now + self.cfg.recovery_steer_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use shared::collision::{ColliderShapeDef, RapierQueryWorld, WorldStaticDef};
    use shared::{Edge, Waypoint};

    const DT: f32 = 1.0 / 60.0;

    fn net(points: &[(&str, f32)]) -> Waynet {
        let waypoints = points
            .iter()
            .map(|(name, x)| Waypoint::new(*name, Vec3::new(*x, 0.0, 0.0)))
            .collect::<Vec<_>>();
        let edges = (1..waypoints.len()).map(|i| Edge::undirected(i - 1, i)).collect();
        Waynet::build(waypoints, edges, Vec::new()).expect("net")
    }

    fn other(id: u64, x: f32, z: f32) -> CircleCollider {
        CircleCollider {
            id,
            x,
            z,
            radius: 30.0,
            y: 0.0,
        }
    }

    fn observation(before: Vec3, after: Vec3, now: f32) -> MoveObservation {
        MoveObservation {
            before,
            after,
            yaw: 0.0,
            capsule: CapsuleSpec::new(30.0, 60.0),
            crowd_blocked: false,
            wall_blocked: false,
            grounded: true,
            dt: DT,
            now,
        }
    }

    #[test]
    fn start_fails_without_net_or_route() {
        let exec = MoveExecutor::default();
        let n = net(&[("A", 0.0), ("B", 300.0)]);
        assert!(exec
            .start_move_to_waypoint(None, Vec3::zeros(), "B", MoveOptions::default())
            .is_none());
        assert!(exec
            .start_move_to_waypoint(Some(&n), Vec3::zeros(), "Z", MoveOptions::default())
            .is_none());
        let run = exec
            .start_move_to_waypoint(
                Some(&n),
                Vec3::zeros(),
                "B",
                MoveOptions {
                    run: true,
                    ..MoveOptions::default()
                },
            )
            .expect("move");
        assert_eq!(run.speed(), exec.config().run_speed);
    }

    #[test]
    fn walks_route_and_arrives() {
        let exec = MoveExecutor::default();
        let n = net(&[("A", 0.0), ("B", 300.0)]);
        let mut mv = exec
            .start_move_to_waypoint(Some(&n), Vec3::zeros(), "B", MoveOptions::default())
            .expect("move");
        let mut deadlock = DeadlockState::default();
        let mut pos = Vec3::zeros();
        let mut now = 0.0;

        let mut outcome = None;
        for _ in 0..200 {
            let plan = exec.plan(&mut mv, 1, pos, &[], &mut deadlock, DT, now);
            if plan.outcome.is_some() {
                outcome = plan.outcome;
                break;
            }
            let before = pos;
            pos += Vec3::new(plan.desired.x, 0.0, plan.desired.y);
            assert_eq!(
                exec.observe::<RapierQueryWorld>(None, &mut mv, &observation(before, pos, now)),
                MoveAdvice::Continue
            );
            now += DT;
        }
        assert_eq!(outcome, Some(MoveOutcome::Arrived));
        assert!((pos.x - 300.0).abs() <= exec.config().arrival_radius);
    }

    #[test]
    fn skips_occupied_intermediate_waypoint() {
        let exec = MoveExecutor::default();
        let n = net(&[("A", 0.0), ("B", 200.0), ("C", 400.0)]);
        let mut deadlock = DeadlockState::default();
        let start = || {
            exec.start_move_to_waypoint(Some(&n), Vec3::zeros(), "C", MoveOptions::default())
                .expect("move")
        };
        let near_b = Vec3::new(90.0, 0.0, 0.0);

        let mut free = start();
        exec.plan(&mut free, 1, Vec3::zeros(), &[], &mut deadlock, DT, 0.0);
        exec.plan(&mut free, 1, near_b, &[], &mut deadlock, DT, 0.0);
        assert_eq!(free.next_index(), 1);

        let mut crowded = start();
        exec.plan(&mut crowded, 1, Vec3::zeros(), &[], &mut deadlock, DT, 0.0);
        let plan = exec.plan(&mut crowded, 1, near_b, &[other(2, 200.0, 10.0)], &mut deadlock, DT, 0.0);
        assert_eq!(crowded.next_index(), 2);
        assert!(plan.desired.x > 0.0);
    }

    #[test]
    fn passes_through_when_resolver_blocked_near_waypoint() {
        let exec = MoveExecutor::default();
        let n = net(&[("A", 0.0), ("B", 200.0), ("C", 400.0)]);
        let mut deadlock = DeadlockState::default();
        let mut mv = exec
            .start_move_to_waypoint(Some(&n), Vec3::zeros(), "C", MoveOptions::default())
            .expect("move");
        exec.plan(&mut mv, 1, Vec3::zeros(), &[], &mut deadlock, DT, 0.0);

        let near_b = Vec3::new(90.0, 0.0, 0.0);
        let mut obs = observation(near_b, near_b, 0.0);
        obs.crowd_blocked = true;
        exec.observe::<RapierQueryWorld>(None, &mut mv, &obs);
        exec.plan(&mut mv, 1, near_b, &[], &mut deadlock, DT, DT);
        assert_eq!(mv.next_index(), 2);
    }

    #[test]
    fn blocked_final_waypoint_accepts_through_expanding_gate() {
        let exec = MoveExecutor::default();
        let n = net(&[("A", 0.0), ("B", 300.0)]);
        let pos = Vec3::new(250.0, 0.0, 0.0);
        let mut deadlock = DeadlockState::default();
        let mut mv = exec
            .start_move_to_waypoint(Some(&n), pos, "B", MoveOptions::default())
            .expect("move");
        assert_eq!(mv.route().len(), 1);

        let mut now = 0.0;
        let mut arrived_at = None;
        for _ in 0..120 {
            let plan = exec.plan(&mut mv, 1, pos, &[], &mut deadlock, DT, now);
            if plan.outcome.is_some() {
                arrived_at = Some(now);
                break;
            }
            let mut obs = observation(pos, pos, now);
            obs.crowd_blocked = true;
            exec.observe::<RapierQueryWorld>(None, &mut mv, &obs);
            now += DT;
        }
        let arrived_at = arrived_at.expect("gate accepted the final waypoint");
        assert_eq!(mv.outcome(), Some(MoveOutcome::Arrived));
        assert!(arrived_at >= exec.config().final_blocked_time - DT);
        assert!(!mv.recovery_attempted());
    }

    #[test]
    fn dwelling_inside_gate_trips_circuit_breaker() {
        let cfg = MoverConfig {
            stuck_time: 100.0,
            ..MoverConfig::default()
        };
        let exec = MoveExecutor::new(cfg);
        let n = net(&[("A", 0.0), ("B", 300.0)]);
        let pos = Vec3::new(260.0, 0.0, 0.0);
        let mut deadlock = DeadlockState::default();
        let mut mv = exec
            .start_move_to_waypoint(Some(&n), pos, "B", MoveOptions::default())
            .expect("move");

        let mut now = 0.0;
        while mv.outcome().is_none() && now < 10.0 {
            exec.plan(&mut mv, 1, pos, &[], &mut deadlock, DT, now);
            exec.observe::<RapierQueryWorld>(None, &mut mv, &observation(pos, pos, now));
            now += DT;
        }
        assert_eq!(mv.outcome(), Some(MoveOutcome::Arrived));
        assert_relative_eq!(now, exec.config().final_gate_timeout, epsilon = 0.1);
    }

    #[test]
    fn stuck_without_backend_gives_up() {
        let exec = MoveExecutor::default();
        let n = net(&[("A", 0.0), ("B", 300.0)]);
        let pos = Vec3::new(100.0, 0.0, 0.0);
        let mut mv = exec
            .start_move_to_waypoint(Some(&n), pos, "B", MoveOptions::default())
            .expect("move");

        let mut now = 0.0;
        let mut advice = MoveAdvice::Continue;
        while advice == MoveAdvice::Continue && now < 5.0 {
            advice = exec.observe::<RapierQueryWorld>(None, &mut mv, &observation(pos, pos, now));
            now += DT;
        }
        assert_eq!(advice, MoveAdvice::Finished(MoveOutcome::GaveUp));
        assert!(mv.recovery_attempted());
        assert_relative_eq!(now, exec.config().stuck_time, epsilon = 0.05);
    }

    #[test]
    fn stuck_against_wall_recovers_once_then_gives_up() {
        let world = RapierQueryWorld::build(vec![WorldStaticDef::new(
            1,
            Vec3::new(100.0, 100.0, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(10.0, 200.0, 20.0),
            },
        )])
        .expect("world");
        let exec = MoveExecutor::default();
        let n = net(&[("A", 0.0), ("B", 300.0)]);
        let pos = Vec3::new(50.0, 0.0, 0.0);
        let mut deadlock = DeadlockState::default();
        let mut mv = exec
            .start_move_to_waypoint(Some(&n), pos, "B", MoveOptions::default())
            .expect("move");

        let mut now = 0.0;
        while !mv.recovery_attempted() && now < 5.0 {
            exec.observe(Some(&world), &mut mv, &observation(pos, pos, now));
            now += DT;
        }
        assert!(mv.recovery_attempted());
        assert!(!mv.is_done());

        // The steer points sideways, clear of the wall.
        let plan = exec.plan(&mut mv, 1, pos, &[], &mut deadlock, DT, now);
        assert!(plan.desired.y < 0.0);
        assert_relative_eq!(plan.desired.x, 0.0, epsilon = 1.0e-3);

        let mut advice = MoveAdvice::Continue;
        while advice == MoveAdvice::Continue && now < 10.0 {
            advice = exec.observe(Some(&world), &mut mv, &observation(pos, pos, now));
            now += DT;
        }
        assert_eq!(advice, MoveAdvice::Finished(MoveOutcome::GaveUp));
    }

    #[test]
    fn wall_block_requests_jump_probe_after_delay() {
        let exec = MoveExecutor::default();
        let n = net(&[("A", 0.0), ("B", 300.0)]);
        let mut mv = exec
            .start_move_to_waypoint(Some(&n), Vec3::zeros(), "B", MoveOptions::default())
            .expect("move");

        let mut ticks = 0;
        let mut now = 0.0;
        loop {
            let before = Vec3::new(ticks as f32 * 3.0, 0.0, 0.0);
            let mut obs = observation(before, before + Vec3::new(3.0, 0.0, 0.0), now);
            obs.wall_blocked = true;
            ticks += 1;
            now += DT;
            if exec.observe::<RapierQueryWorld>(None, &mut mv, &obs) == MoveAdvice::TryJump {
                break;
            }
            assert!(ticks < 60, "no jump probe requested");
        }
        assert_relative_eq!(ticks as f32 * DT, exec.config().jump_probe_delay, epsilon = 1.5 * DT);
    }
}
