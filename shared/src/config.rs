//! Per-solver tunables.
//!
//! [`KccConfig`] is consumed by value when a [`crate::motion::MotionSolver`] is built.
//! Defaults come from [`crate::constants`] and [`crate::collision::settings`]; a partial
//! JSON document overrides only the fields it names.

use serde::Deserialize;

use crate::collision::settings::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_SKIN, GROUND_PROBE_DISTANCE, MAX_SNAP_DOWN, SNAP_HOVER_HEIGHT,
};
use crate::collision::types::CapsuleSpec;
use crate::constants::{
    DEFAULT_CAPSULE_HALF_HEIGHT, DEFAULT_CAPSULE_RADIUS, FALL_DOWN_HEIGHT, GRAVITY,
    MAX_FALL_SPEED, MAX_SLIDE_SPEED, MAX_SUBSTEP_DT, MAX_SUBSTEPS, SLIDE_ACCELERATION,
    SLIDE_TO_FALL_MAX_DEG, WALK_MAX_DEG,
};
use crate::error::ConfigError;

/// Kinematic character controller tunables (world units, seconds, degrees).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct KccConfig {
    pub capsule_radius: f32,
    pub capsule_half_height: f32,

    pub gravity: f32,
    pub max_fall_speed: f32,

    pub walk_max_deg: f32,
    pub slide_to_fall_max_deg: f32,
    pub slide_acceleration: f32,
    pub max_slide_speed: f32,

    pub skin: f32,
    pub max_iterations: u32,
    pub wall_slide: bool,
    pub ground_probe_distance: f32,
    pub max_snap_down: f32,
    pub hover_height: f32,

    /// Sensor must agree for this long before the phase becomes `Grounded`.
    pub grounded_enter_grace: f32,
    /// Sensor must agree for this long before the phase becomes `Sliding`.
    pub slide_enter_grace: f32,
    /// Sensor must agree for this long before the phase becomes `Falling`.
    pub fall_enter_grace: f32,

    /// Descent after which an airborne `FallDown` is reported as `Fall`.
    pub fall_down_height: f32,

    pub max_substep_dt: f32,
    pub max_substeps: u32,

    // Jumping
    /// Apex height of a forward jump.
    pub jump_forward_height: f32,
    /// Horizontal speed of a forward jump.
    pub jump_forward_speed: f32,
    /// Minimum air time after a jump before ground contact may end it.
    pub jump_grace: f32,
    /// Delay between a jump-up/climb request and the start of the assisted lerp.
    pub jump_windup: f32,
    /// Duration of the assisted lerp for jump-up classifications.
    pub jump_up_duration: f32,
    /// Duration of the assisted lerp for climbs.
    pub climb_duration: f32,
    /// Extra arc height added on top of the ledge during the assisted lerp.
    pub jump_arc_height: f32,
    /// Window after an assisted jump during which sweeps are skipped.
    pub kcc_bypass_time: f32,

    // Ledge probe
    pub ledge_scan_min_height: f32,
    pub ledge_reach_height: f32,
    pub ledge_scan_distance: f32,
    /// Smallest vertical segment the binary-subdivided scan will split.
    pub ledge_scan_resolution: f32,
    pub ledge_min_headroom: f32,
    pub ledge_landing_depth: f32,
    pub jump_low_max: f32,
    pub jump_mid_max: f32,
    pub jump_high_max: f32,

    // Short-fall debounce
    /// A fall shorter than this counts as a short fall.
    pub short_fall_height: f32,
    /// Consecutive short falls before input is ignored.
    pub short_fall_limit: u32,
    /// How long XZ input is ignored once the limit trips.
    pub short_fall_block_time: f32,
}

impl Default for KccConfig {
    fn default() -> Self {
        Self {
            capsule_radius: DEFAULT_CAPSULE_RADIUS,
            capsule_half_height: DEFAULT_CAPSULE_HALF_HEIGHT,
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            walk_max_deg: WALK_MAX_DEG,
            slide_to_fall_max_deg: SLIDE_TO_FALL_MAX_DEG,
            slide_acceleration: SLIDE_ACCELERATION,
            max_slide_speed: MAX_SLIDE_SPEED,
            skin: DEFAULT_SKIN,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            wall_slide: true,
            ground_probe_distance: GROUND_PROBE_DISTANCE,
            max_snap_down: MAX_SNAP_DOWN,
            hover_height: SNAP_HOVER_HEIGHT,
            grounded_enter_grace: 0.03,
            slide_enter_grace: 0.06,
            fall_enter_grace: 0.08,
            fall_down_height: FALL_DOWN_HEIGHT,
            max_substep_dt: MAX_SUBSTEP_DT,
            max_substeps: MAX_SUBSTEPS,
            jump_forward_height: 60.0,
            jump_forward_speed: 350.0,
            jump_grace: 0.15,
            jump_windup: 0.2,
            jump_up_duration: 0.45,
            climb_duration: 0.9,
            jump_arc_height: 20.0,
            kcc_bypass_time: 0.15,
            ledge_scan_min_height: 30.0,
            ledge_reach_height: 300.0,
            ledge_scan_distance: 80.0,
            ledge_scan_resolution: 8.0,
            ledge_min_headroom: 180.0,
            ledge_landing_depth: 40.0,
            jump_low_max: 100.0,
            jump_mid_max: 160.0,
            jump_high_max: 220.0,
            short_fall_height: 50.0,
            short_fall_limit: 3,
            short_fall_block_time: 0.5,
        }
    }
}

impl KccConfig {
    #[inline]
    pub fn capsule(&self) -> CapsuleSpec {
        CapsuleSpec::new(self.capsule_radius, self.capsule_half_height)
    }

    /// Check orderings and signs the solver relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capsule_radius <= 0.0 {
            return Err(ConfigError::invalid("capsule_radius", "must be positive"));
        }
        if self.capsule_half_height < 0.0 {
            return Err(ConfigError::invalid("capsule_half_height", "must not be negative"));
        }
        if self.gravity <= 0.0 || self.max_fall_speed <= 0.0 {
            return Err(ConfigError::invalid("gravity", "gravity and max fall speed must be positive"));
        }
        if !(0.0..90.0).contains(&self.walk_max_deg) || self.walk_max_deg >= self.slide_to_fall_max_deg {
            return Err(ConfigError::invalid(
                "walk_max_deg",
                format!(
                    "must be in [0, 90) and below slide_to_fall_max_deg ({})",
                    self.slide_to_fall_max_deg
                ),
            ));
        }
        if self.slide_to_fall_max_deg > 90.0 {
            return Err(ConfigError::invalid("slide_to_fall_max_deg", "must not exceed 90"));
        }
        if !(self.ledge_scan_min_height < self.jump_low_max
            && self.jump_low_max < self.jump_mid_max
            && self.jump_mid_max < self.jump_high_max
            && self.jump_high_max <= self.ledge_reach_height)
        {
            return Err(ConfigError::invalid(
                "jump_low_max",
                "jump bands must ascend: scan min < low < mid < high <= reach",
            ));
        }
        if self.max_substep_dt <= 0.0 || self.max_substeps == 0 {
            return Err(ConfigError::invalid("max_substep_dt", "sub-stepping must be positive"));
        }
        if self.ledge_scan_resolution <= 0.0 {
            return Err(ConfigError::invalid("ledge_scan_resolution", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(KccConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_overrides_named_fields_only() {
        let cfg: KccConfig = serde_json::from_str(r#"{ "capsule_radius": 20.0 }"#).expect("json");
        assert_eq!(cfg.capsule_radius, 20.0);
        assert_eq!(cfg.gravity, GRAVITY);
    }

    #[test]
    fn rejects_inverted_slope_thresholds() {
        let cfg = KccConfig {
            walk_max_deg: 70.0,
            ..KccConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "walk_max_deg", .. })
        ));
    }

    #[test]
    fn rejects_unordered_jump_bands() {
        let cfg = KccConfig {
            jump_mid_max: 90.0,
            ..KccConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
