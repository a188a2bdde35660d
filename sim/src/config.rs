//! Simulation tunables.
//!
//! Every section derives `Deserialize` with `#[serde(default)]`, so a partial JSON document
//! only overrides what it names.

use serde::Deserialize;
use shared::constants::{MAX_TICK_DT, RUN_SPEED, WALK_SPEED};
use shared::{ConfigError, CrowdConfig, KccConfig};

/// Waypoint task executor tunables (world units, seconds, 1/s).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MoverConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    /// Snap radius for reaching a waypoint.
    pub arrival_radius: f32,
    /// Range within which crowded or blocked intermediate waypoints are skipped.
    pub crowd_radius: f32,
    /// Another character this close to a waypoint occupies it.
    pub occupied_radius: f32,

    /// Base radius of the final waypoint gate.
    pub final_gate_radius: f32,
    /// Gate growth (units per second) once resolver-blocked past `final_blocked_time`.
    pub final_gate_growth: f32,
    pub final_gate_max_radius: f32,
    pub final_blocked_time: f32,
    /// Dwelling inside the gate this long counts as arrival.
    pub final_gate_timeout: f32,

    /// No progress for this long triggers recovery, then gives up.
    pub stuck_time: f32,
    /// Progress below this fraction of `speed * dt` counts as none.
    pub stuck_progress_ratio: f32,
    pub recovery_probe_distance: f32,
    pub recovery_yaw_offsets_deg: Vec<f32>,
    pub recovery_steer_time: f32,
    /// Resolver-blocked ticks pause the stuck timer for this long.
    pub traffic_wait: f32,
    /// A steer point this close counts as reached.
    pub steer_reached_radius: f32,

    /// Exponential-decay turn rate.
    pub turn_rate: f32,

    pub auto_jump: bool,
    /// Wall-blocked this long while moving before probing for a jump.
    pub jump_probe_delay: f32,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            walk_speed: WALK_SPEED,
            run_speed: RUN_SPEED,
            arrival_radius: 25.0,
            crowd_radius: 120.0,
            occupied_radius: 40.0,

            final_gate_radius: 60.0,
            final_gate_growth: 60.0,
            final_gate_max_radius: 150.0,
            final_blocked_time: 0.6,
            final_gate_timeout: 3.0,

            stuck_time: 1.5,
            stuck_progress_ratio: 0.1,
            recovery_probe_distance: 80.0,
            recovery_yaw_offsets_deg: vec![45.0, -45.0, 90.0, -90.0, 135.0, -135.0],
            recovery_steer_time: 1.0,
            traffic_wait: 1.0,
            steer_reached_radius: 2.0,

            turn_rate: 8.0,

            auto_jump: true,
            jump_probe_delay: 0.25,
        }
    }
}

impl MoverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.walk_speed > 0.0 && self.run_speed > 0.0) {
            return Err(ConfigError::invalid("walk_speed", "speeds must be positive"));
        }
        if self.arrival_radius <= 0.0 {
            return Err(ConfigError::invalid("arrival_radius", "must be positive"));
        }
        if self.crowd_radius < self.arrival_radius {
            return Err(ConfigError::invalid("crowd_radius", "must not be below arrival_radius"));
        }
        if !(self.arrival_radius <= self.final_gate_radius
            && self.final_gate_radius <= self.final_gate_max_radius)
        {
            return Err(ConfigError::invalid(
                "final_gate_radius",
                "expected arrival_radius <= final_gate_radius <= final_gate_max_radius",
            ));
        }
        if self.stuck_time <= 0.0 || self.final_gate_timeout <= 0.0 {
            return Err(ConfigError::invalid("stuck_time", "timeouts must be positive"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Largest accepted tick delta; longer stalls are clamped.
    pub max_tick_dt: f32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            max_tick_dt: MAX_TICK_DT,
        }
    }
}

/// Full simulation configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub kcc: KccConfig,
    pub crowd: CrowdConfig,
    pub mover: MoverConfig,
    pub tick: TickConfig,
}

impl SimConfig {
    /// Parse and validate a (possibly partial) JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.kcc.validate()?;
        self.mover.validate()?;
        if !(self.tick.max_tick_dt.is_finite() && self.tick.max_tick_dt > 0.0) {
            return Err(ConfigError::invalid("max_tick_dt", "must be positive"));
        }
        if self.crowd.separation_epsilon < 0.0 {
            return Err(ConfigError::invalid("separation_epsilon", "must not be negative"));
        }
        if self.crowd.escape_samples == 0 || self.crowd.escape_rings == 0 {
            return Err(ConfigError::invalid("escape_samples", "escape search needs candidates"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SimConfig::default().validate().expect("defaults are valid");
    }

    #[test]
    fn partial_json_overrides_sections() {
        let cfg = SimConfig::from_json_str(
            r#"{ "mover": { "walk_speed": 150 }, "kcc": { "capsule_radius": 20 }, "tick": { "max_tick_dt": 0.05 } }"#,
        )
        .expect("config");
        assert_eq!(cfg.mover.walk_speed, 150.0);
        assert_eq!(cfg.mover.run_speed, RUN_SPEED);
        assert_eq!(cfg.kcc.capsule_radius, 20.0);
        assert_eq!(cfg.tick.max_tick_dt, 0.05);
        assert_eq!(cfg.crowd, CrowdConfig::default());
    }

    #[test]
    fn rejects_gate_smaller_than_arrival() {
        let err = SimConfig::from_json_str(r#"{ "mover": { "arrival_radius": 80 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "final_gate_radius", .. }));
    }

    #[test]
    fn surfaces_json_errors() {
        assert!(matches!(
            SimConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
