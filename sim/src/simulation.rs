//! Simulation driver: owns the characters, the clock, the optional geometry backend and
//! waynet, and runs the ordered per-character tick pass.
//!
//! Per tick and per character (in id order):
//! - the task executor (or direct input) produces a desired planar displacement;
//! - the crowd resolver adjusts it against the collider snapshot taken at tick start;
//! - the motion solver applies it against geometry and gravity;
//! - the executor observes the outcome (arrival, stuck, auto-jump);
//! - the animation feed is refreshed.

use std::collections::BTreeMap;

use shared::collision::{RapierQueryWorld, WorldStaticDef};
use shared::crowd::{ConstrainRequest, constrain_move};
use shared::motion::MotionSolver;
use shared::utils::{safe_normalize2, to_planar, turn_towards_yaw, yaw_from_xz};
use shared::{
    CircleCollider, ConfigError, GeometryQuery, JumpType, Vec2, Vec3, Waynet,
};

use crate::animation::{AnimationFeed, LocomotionMode};
use crate::character::{Character, CharacterId, Control};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::mover::{
    MoveAdvice, MoveExecutor, MoveGoal, MoveObservation, MoveOptions, MoveOutcome,
};

/// Planar movement below this does not count as moving for the animation layer.
const MOVING_EPS_SQ: f32 = 1.0e-6;

pub struct Simulation<Q: GeometryQuery = RapierQueryWorld> {
    cfg: SimConfig,
    solver: MotionSolver,
    executor: MoveExecutor,
    world: Option<Q>,
    waynet: Option<Waynet>,
    characters: BTreeMap<CharacterId, Character>,
    next_id: CharacterId,
    clock: f32,
}

impl Simulation<RapierQueryWorld> {
    /// Assemble a simulation from serialized config, static geometry and an optional waynet.
    pub fn load(
        config_json: &str,
        statics: Vec<WorldStaticDef>,
        waynet_json: Option<&str>,
    ) -> Result<Self, SimError> {
        let cfg = SimConfig::from_json_str(config_json)?;
        let world = RapierQueryWorld::build(statics)?;
        let waynet = waynet_json.map(Waynet::from_json_str).transpose()?;

        let mut sim = Self::new(cfg)?;
        sim.set_world(Some(world));
        sim.set_waynet(waynet);
        Ok(sim)
    }
}

impl<Q: GeometryQuery> Simulation<Q> {
    pub fn new(cfg: SimConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            solver: MotionSolver::new(cfg.kcc.clone()),
            executor: MoveExecutor::new(cfg.mover.clone()),
            cfg,
            world: None,
            waynet: None,
            characters: BTreeMap::new(),
            next_id: 1,
            clock: 0.0,
        })
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    /// Simulation time in seconds.
    #[inline]
    pub fn now(&self) -> f32 {
        self.clock
    }

    /// Replace the geometry backend. `None` degrades motion to raw displacement.
    pub fn set_world(&mut self, world: Option<Q>) {
        log::info!("geometry backend {}", if world.is_some() { "attached" } else { "detached" });
        self.world = world;
    }

    #[inline]
    pub fn world(&self) -> Option<&Q> {
        self.world.as_ref()
    }

    /// Replace the waynet. Active moves keep the routes they already planned.
    pub fn set_waynet(&mut self, waynet: Option<Waynet>) {
        self.waynet = waynet;
    }

    #[inline]
    pub fn waynet(&self) -> Option<&Waynet> {
        self.waynet.as_ref()
    }

    /// Load a character at `position` (feet) and latch it onto the ground when possible.
    pub fn spawn(&mut self, position: Vec3, yaw: f32, control: Control) -> CharacterId {
        let id = self.next_id;
        self.next_id += 1;

        let mut motion = self.solver.new_state(position, yaw);
        let settled = self.solver.settle(self.world.as_ref(), &mut motion);
        log::info!("spawned character {id} ({control:?}) at {position:?}, settled: {settled}");

        self.characters.insert(id, Character::new(id, control, motion));
        id
    }

    /// Spawn on a named waypoint, or on a freepoint when no waypoint has that name.
    pub fn spawn_at(&mut self, name: &str, control: Control) -> Option<CharacterId> {
        let net = self.waynet.as_ref()?;
        let spot = net
            .index_of(name)
            .and_then(|i| net.waypoint(i))
            .or_else(|| net.freepoint(name))?;
        let position = spot.position;
        let yaw = spot
            .direction
            .and_then(|d| yaw_from_xz(to_planar(&d)))
            .unwrap_or(0.0);
        Some(self.spawn(position, yaw, control))
    }

    /// Remove a character and every piece of state held for it.
    pub fn unload(&mut self, id: CharacterId) -> bool {
        let removed = self.characters.remove(&id).is_some();
        if removed {
            log::info!("unloaded character {id}");
        } else {
            log::warn!("unload: unknown character {id}");
        }
        removed
    }

    #[inline]
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn position(&self, id: CharacterId) -> Option<Vec3> {
        self.characters.get(&id).map(|c| c.motion.position)
    }

    pub fn yaw(&self, id: CharacterId) -> Option<f32> {
        self.characters.get(&id).map(|c| c.motion.yaw())
    }

    pub fn feed(&self, id: CharacterId) -> Option<&AnimationFeed> {
        self.characters.get(&id).map(|c| &c.feed)
    }

    pub fn locomotion_mode(&self, id: CharacterId) -> Option<LocomotionMode> {
        self.feed(id).map(|f| f.mode)
    }

    pub fn is_moving(&self, id: CharacterId) -> bool {
        self.characters.get(&id).is_some_and(|c| c.movement.is_some())
    }

    /// Outcome of the character's last finished move.
    pub fn move_outcome(&self, id: CharacterId) -> Option<MoveOutcome> {
        self.characters.get(&id).and_then(|c| c.last_outcome)
    }

    pub fn start_move_to_waypoint(&mut self, id: CharacterId, name: &str, options: MoveOptions) -> bool {
        self.start_move(id, MoveGoal::Waypoint(name), options)
    }

    pub fn start_move_to_position(&mut self, id: CharacterId, target: Vec3, options: MoveOptions) -> bool {
        self.start_move(id, MoveGoal::Position(target), options)
    }

    pub fn start_move_to_freepoint(&mut self, id: CharacterId, name: &str, options: MoveOptions) -> bool {
        self.start_move(id, MoveGoal::Freepoint(name), options)
    }

    fn start_move(&mut self, id: CharacterId, goal: MoveGoal<'_>, options: MoveOptions) -> bool {
        let Some(ch) = self.characters.get_mut(&id) else {
            log::error!("start_move: unknown character {id}");
            return false;
        };
        let Some(mv) = self
            .executor
            .start(self.waynet.as_ref(), ch.motion.position, goal, options)
        else {
            return false;
        };
        ch.clear_move();
        ch.movement = Some(mv);
        ch.last_outcome = None;
        ch.face_yaw = None;
        true
    }

    /// Cancel the active move, if any. Leaves no executor state behind.
    pub fn clear_move(&mut self, id: CharacterId) -> bool {
        match self.characters.get_mut(&id) {
            Some(ch) => {
                let had = ch.movement.is_some();
                ch.clear_move();
                had
            }
            None => false,
        }
    }

    /// Set the planar velocity a player-controlled character walks with.
    pub fn set_direct_input(&mut self, id: CharacterId, velocity: Vec2, running: bool) -> bool {
        let Some(ch) = self.characters.get_mut(&id) else {
            log::error!("set_direct_input: unknown character {id}");
            return false;
        };
        if ch.control != Control::Player {
            log::warn!("set_direct_input: character {id} is not player controlled");
            return false;
        }
        ch.input = if velocity.iter().all(|v| v.is_finite()) {
            velocity
        } else {
            Vec2::zeros()
        };
        ch.input_running = running;
        true
    }

    /// Probe the ledge ahead and start a jump when the geometry allows one.
    pub fn request_jump(&mut self, id: CharacterId) -> Option<JumpType> {
        let ch = self.characters.get_mut(&id)?;
        self.solver
            .request_jump(self.world.as_ref(), &mut ch.motion, self.clock)
    }

    /// Advance the whole simulation by `dt` seconds (clamped to `tick.max_tick_dt`).
    pub fn tick(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let dt = dt.min(self.cfg.tick.max_tick_dt);

        let snapshot: Vec<CircleCollider> = self.characters.values().map(Character::collider).collect();
        let pass = TickPass {
            cfg: &self.cfg,
            solver: &self.solver,
            executor: &self.executor,
            world: self.world.as_ref(),
            snapshot: &snapshot,
            dt,
            now: self.clock,
        };
        for ch in self.characters.values_mut() {
            pass.step(ch);
        }

        self.clock += dt;
    }
}

/// Read-only inputs shared by every character during one tick.
struct TickPass<'a, Q: ?Sized> {
    cfg: &'a SimConfig,
    solver: &'a MotionSolver,
    executor: &'a MoveExecutor,
    world: Option<&'a Q>,
    snapshot: &'a [CircleCollider],
    dt: f32,
    now: f32,
}

impl<Q: GeometryQuery + ?Sized> TickPass<'_, Q> {
    fn step(&self, ch: &mut Character) {
        let (dt, now) = (self.dt, self.now);
        let from = ch.motion.position;
        let here = to_planar(&from);

        // Intent.
        let mut desired = Vec2::zeros();
        let mut facing = None;
        let mut running = false;
        let mut finished = None;
        if let Some(mv) = ch.movement.as_mut() {
            let plan = self
                .executor
                .plan(mv, ch.id, from, self.snapshot, &mut ch.deadlock, dt, now);
            desired = plan.desired;
            facing = plan.facing;
            running = mv.running();
            finished = plan.outcome;
        } else if ch.control == Control::Player {
            desired = ch.input * dt;
            facing = (desired.norm_squared() > MOVING_EPS_SQ).then(|| safe_normalize2(desired, Vec2::zeros()));
            running = ch.input_running;
        }

        // Crowd.
        let mut crowd_blocked = false;
        if desired.norm_squared() > 0.0 {
            let resolved = constrain_move(
                ConstrainRequest {
                    id: ch.id,
                    from: here,
                    target: here + desired,
                    radius: ch.motion.capsule.radius,
                    y: from.y,
                    now,
                },
                self.snapshot,
                &mut ch.deadlock,
                &self.cfg.crowd,
            );
            desired = resolved.point - here;
            crowd_blocked = resolved.blocked;
        }

        // Facing.
        if !ch.motion.is_jumping()
            && let Some(target_yaw) = facing.and_then(yaw_from_xz).or(ch.face_yaw)
        {
            let yaw = turn_towards_yaw(ch.motion.yaw(), target_yaw, self.cfg.mover.turn_rate, dt);
            ch.motion.set_yaw(yaw);
        }

        // Motion.
        let out = self.solver.tick(self.world, &mut ch.motion, desired, dt, now);

        // Executor feedback.
        if let Some(mv) = ch.movement.as_mut()
            && finished.is_none()
        {
            let obs = MoveObservation {
                before: from,
                after: out.position,
                yaw: ch.motion.yaw(),
                capsule: ch.motion.capsule,
                crowd_blocked,
                wall_blocked: out.wall_blocked,
                grounded: ch.motion.stable_grounded(),
                dt,
                now,
            };
            match self.executor.observe(self.world, mv, &obs) {
                MoveAdvice::Continue => {}
                MoveAdvice::TryJump => {
                    if let Some(kind) = self.solver.request_jump(self.world, &mut ch.motion, now + dt) {
                        log::debug!("character {} auto-jumps: {kind:?}", ch.id);
                    }
                }
                MoveAdvice::Finished(outcome) => finished = Some(outcome),
            }
        }

        if let Some(outcome) = finished {
            log::info!("character {} move finished: {outcome:?}", ch.id);
            ch.face_yaw = ch.movement.as_ref().and_then(|m| m.final_yaw());
            ch.clear_move();
            ch.last_outcome = Some(outcome);
        }

        let moving = to_planar(&out.displacement).norm_squared() > MOVING_EPS_SQ;
        ch.feed = AnimationFeed {
            mode: LocomotionMode::from_state(out.state, moving, running),
            events: out.events,
        };
    }
}
