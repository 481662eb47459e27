//! Runtime configuration.
//!
//! Every section defaults to the values in [`crate::constants`], so a JSON
//! file only needs to name the fields it overrides.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::DisruptionChannel;
use crate::error::ConfigError;

/// Top-level configuration for a combat engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// RNG seed for determinism. Same seed = same rolls.
    pub seed: u64,
    pub targeting: TargetingConfig,
    pub sensors: SensorConfig,
    pub intercept: InterceptConfig,
    pub lock: LockConfig,
    pub priority: PriorityConfig,
    pub beams: BeamConfig,
    pub swarm: SwarmConfig,
    pub emp: EmpConfig,
    pub flak: FlakConfig,
    pub caps: CapsConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            targeting: TargetingConfig::default(),
            sensors: SensorConfig::default(),
            intercept: InterceptConfig::default(),
            lock: LockConfig::default(),
            priority: PriorityConfig::default(),
            beams: BeamConfig::default(),
            swarm: SwarmConfig::default(),
            emp: EmpConfig::default(),
            flak: FlakConfig::default(),
            caps: CapsConfig::default(),
        }
    }
}

impl CombatConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("targeting.rescan_interval", self.targeting.rescan_interval)?;
        positive("intercept.convergence_distance", self.intercept.convergence_distance)?;
        positive("intercept.prediction_horizon", self.intercept.prediction_horizon)?;
        if self.intercept.max_iterations == 0 {
            return Err(ConfigError::invalid("intercept.max_iterations", "must be at least 1"));
        }
        fraction("sensors.interference_range_penalty", self.sensors.interference_range_penalty)?;
        fraction("sensors.stealth_base_chance", self.sensors.stealth_base_chance)?;
        positive("lock.build_rate", self.lock.build_rate)?;
        positive("lock.decay_rate", self.lock.decay_rate)?;
        fraction("lock.cue_threshold", self.lock.cue_threshold)?;
        positive("beams.damage_interval", self.beams.damage_interval)?;
        if self.beams.width_ray_max > self.beams.width_volume_min {
            return Err(ConfigError::invalid(
                "beams.width_ray_max",
                "must not exceed beams.width_volume_min",
            ));
        }
        if self.swarm.missile_count == 0 {
            return Err(ConfigError::invalid("swarm.missile_count", "must be at least 1"));
        }
        positive("swarm.launch_interval", self.swarm.launch_interval)?;
        positive("swarm.missile_speed", self.swarm.missile_speed)?;
        if self.emp.inner_radius >= self.emp.outer_radius {
            return Err(ConfigError::invalid(
                "emp.inner_radius",
                "must be smaller than emp.outer_radius",
            ));
        }
        if self.flak.min_safety_distance >= self.flak.max_range {
            return Err(ConfigError::invalid(
                "flak.min_safety_distance",
                "must be smaller than flak.max_range",
            ));
        }
        fraction("emp.weapons_lockout", self.emp.weapons_lockout)?;
        fraction("emp.ai_lockout", self.emp.ai_lockout)?;
        fraction("flak.falloff_slope", self.flak.falloff_slope)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be positive"))
    }
}

fn fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be within 0.0..=1.0"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    pub rescan_interval: f64,
    pub default_scan_range: f64,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            rescan_interval: RESCAN_INTERVAL,
            default_scan_range: DEFAULT_SCAN_RANGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub interference_range_penalty: f64,
    pub always_detect_radius: f64,
    pub link_radius: f64,
    pub los_cache_ttl: f64,
    pub stealth_certain_radius: f64,
    pub stealth_base_chance: f64,
    pub stealth_active_boost: f64,
    pub stealth_fast_speed: f64,
    pub stealth_interference_penalty: f64,
    pub stealth_roll_window: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            interference_range_penalty: INTERFERENCE_RANGE_PENALTY,
            always_detect_radius: ALWAYS_DETECT_RADIUS,
            link_radius: SENSOR_LINK_RADIUS,
            los_cache_ttl: LOS_CACHE_TTL,
            stealth_certain_radius: STEALTH_CERTAIN_RADIUS,
            stealth_base_chance: STEALTH_BASE_CHANCE,
            stealth_active_boost: STEALTH_ACTIVE_BOOST,
            stealth_fast_speed: STEALTH_FAST_SPEED,
            stealth_interference_penalty: STEALTH_INTERFERENCE_PENALTY,
            stealth_roll_window: STEALTH_ROLL_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptConfig {
    pub max_iterations: u32,
    pub convergence_distance: f64,
    pub prediction_horizon: f64,
    pub cache_ttl: f64,
    pub divergence_streak: u32,
    /// Fraction of shooter velocity inherited by the projectile.
    pub velocity_inheritance: f64,
    pub accuracy_range_threshold: f64,
    pub accuracy_range_falloff: f64,
    pub accuracy_lead_threshold: f64,
    pub accuracy_lead_falloff: f64,
    pub min_accuracy: f64,
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self {
            max_iterations: INTERCEPT_MAX_ITERATIONS,
            convergence_distance: INTERCEPT_CONVERGENCE_DISTANCE,
            prediction_horizon: INTERCEPT_PREDICTION_HORIZON,
            cache_ttl: INTERCEPT_CACHE_TTL,
            divergence_streak: INTERCEPT_DIVERGENCE_STREAK,
            velocity_inheritance: 0.0,
            accuracy_range_threshold: ACCURACY_RANGE_THRESHOLD,
            accuracy_range_falloff: ACCURACY_RANGE_FALLOFF,
            accuracy_lead_threshold: ACCURACY_LEAD_THRESHOLD,
            accuracy_lead_falloff: ACCURACY_LEAD_FALLOFF,
            min_accuracy: MIN_ACCURACY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    pub tolerance: f64,
    pub build_rate: f64,
    pub decay_rate: f64,
    pub min_lock_time: f64,
    pub cue_threshold: f64,
    pub fov_half_angle: f64,
    pub progress_event_step: f64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            tolerance: LOCK_TOLERANCE,
            build_rate: LOCK_BUILD_RATE,
            decay_rate: LOCK_DECAY_RATE,
            min_lock_time: LOCK_MIN_TIME,
            cue_threshold: LOCK_CUE_THRESHOLD,
            fov_half_angle: LOCK_FOV_HALF_ANGLE,
            progress_event_step: LOCK_PROGRESS_EVENT_STEP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityConfig {
    pub cache_ttl: f64,
    pub top_threats: usize,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            cache_ttl: PRIORITY_CACHE_TTL,
            top_threats: PRIORITY_TOP_THREATS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    pub warmup_secs: f64,
    pub active_secs: f64,
    pub warmdown_secs: f64,
    pub damage_interval: f64,
    pub damage_per_tick: f64,
    pub width_ray_max: f64,
    pub width_volume_min: f64,
    pub hybrid_range_split: f64,
    pub collision_cache_ttl: f64,
    pub max_penetration: usize,
    pub octant_dwell: f64,
    pub chase_horizon: f64,
    pub chase_max_reacquire: u32,
    pub chase_reacquire_cooldown: f64,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            warmup_secs: BEAM_WARMUP_SECS,
            active_secs: BEAM_ACTIVE_SECS,
            warmdown_secs: BEAM_WARMDOWN_SECS,
            damage_interval: BEAM_DAMAGE_INTERVAL,
            damage_per_tick: BEAM_DAMAGE_PER_TICK,
            width_ray_max: BEAM_WIDTH_RAY_MAX,
            width_volume_min: BEAM_WIDTH_VOLUME_MIN,
            hybrid_range_split: BEAM_HYBRID_RANGE_SPLIT,
            collision_cache_ttl: BEAM_COLLISION_CACHE_TTL,
            max_penetration: BEAM_MAX_PENETRATION,
            octant_dwell: BEAM_OCTANT_DWELL,
            chase_horizon: BEAM_CHASE_HORIZON,
            chase_max_reacquire: BEAM_CHASE_MAX_REACQUIRE,
            chase_reacquire_cooldown: BEAM_CHASE_REACQUIRE_COOLDOWN,
        }
    }
}

/// One of the four spiral flight patterns a swarm missile can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiralPattern {
    /// Spiral axis in world space; combined with travel direction to build the spiral plane.
    pub axis: DVec3,
    /// Offset radius from the travel line (meters).
    pub radius: f64,
    /// Revolutions per second.
    pub frequency: f64,
    /// Time spent spiralling before pursuit (seconds).
    pub duration: f64,
    /// +1.0 counter-clockwise, -1.0 clockwise.
    pub direction: f64,
}

/// Default pattern set: paired opposite-handed tight spirals plus a wide slow
/// and a narrow fast one.
pub fn default_spiral_patterns() -> [SpiralPattern; 4] {
    [
        SpiralPattern {
            axis: DVec3::Z,
            radius: 12.0,
            frequency: 1.5,
            duration: 1.2,
            direction: 1.0,
        },
        SpiralPattern {
            axis: DVec3::Z,
            radius: 12.0,
            frequency: 1.5,
            duration: 1.2,
            direction: -1.0,
        },
        SpiralPattern {
            axis: DVec3::X,
            radius: 18.0,
            frequency: 1.0,
            duration: 1.6,
            direction: 1.0,
        },
        SpiralPattern {
            axis: DVec3::X,
            radius: 8.0,
            frequency: 2.2,
            duration: 0.9,
            direction: -1.0,
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub missile_count: u32,
    pub launch_interval: f64,
    pub missile_speed: f64,
    pub turn_rate: f64,
    pub proximity: f64,
    pub lifetime: f64,
    pub max_reacquire: u32,
    pub reacquire_cooldown: f64,
    pub reacquire_radius: f64,
    pub damage_per_missile: f64,
    pub patterns: [SpiralPattern; 4],
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            missile_count: SWARM_MISSILE_COUNT,
            launch_interval: SWARM_LAUNCH_INTERVAL,
            missile_speed: SWARM_MISSILE_SPEED,
            turn_rate: SWARM_TURN_RATE,
            proximity: SWARM_PROXIMITY,
            lifetime: SWARM_MISSILE_LIFETIME,
            max_reacquire: SWARM_MAX_REACQUIRE,
            reacquire_cooldown: SWARM_REACQUIRE_COOLDOWN,
            reacquire_radius: SWARM_REACQUIRE_RADIUS,
            damage_per_missile: SWARM_DAMAGE_PER_MISSILE,
            patterns: default_spiral_patterns(),
        }
    }
}

/// Per-channel EMP tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelTuning {
    /// Fraction of the effective pulse the channel absorbs.
    pub susceptibility: f64,
    /// Duration multiplier relative to the base duration.
    pub duration_factor: f64,
    /// Channel is affected at all.
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmpConfig {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub intensity: f64,
    pub base_duration: f64,
    pub min_duration: f64,
    /// Indexed by `DisruptionChannel::index()`.
    pub channels: [ChannelTuning; 5],
    pub friendly_fire: bool,
    /// Weapons disruption that blocks fire outright.
    pub weapons_lockout: f64,
    /// AI disruption that suspends threat reassessment.
    pub ai_lockout: f64,
}

impl EmpConfig {
    pub fn channel(&self, channel: DisruptionChannel) -> &ChannelTuning {
        &self.channels[channel.index()]
    }
}

impl Default for EmpConfig {
    fn default() -> Self {
        let tuning = |susceptibility, duration_factor| ChannelTuning {
            susceptibility,
            duration_factor,
            enabled: true,
        };
        Self {
            inner_radius: EMP_INNER_RADIUS,
            outer_radius: EMP_OUTER_RADIUS,
            intensity: EMP_INTENSITY,
            base_duration: EMP_BASE_DURATION,
            min_duration: EMP_MIN_DURATION,
            channels: [
                tuning(1.0, 1.0),  // targeting
                tuning(0.8, 0.7),  // engines
                tuning(0.9, 0.8),  // weapons
                tuning(1.0, 1.2),  // hud
                tuning(0.7, 0.6),  // ai
            ],
            friendly_fire: false,
            weapons_lockout: EMP_WEAPONS_LOCKOUT,
            ai_lockout: EMP_AI_LOCKOUT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlakConfig {
    pub base_jitter: f64,
    pub degraded_jitter: f64,
    pub min_safety_distance: f64,
    pub max_range: f64,
    pub shell_speed: f64,
    pub burst_radius: f64,
    pub damage: f64,
    pub falloff_slope: f64,
    pub leave_barrier: bool,
    pub barrier_duration: f64,
    pub barrier_radius: f64,
}

impl Default for FlakConfig {
    fn default() -> Self {
        Self {
            base_jitter: FLAK_BASE_JITTER,
            degraded_jitter: FLAK_DEGRADED_JITTER,
            min_safety_distance: FLAK_MIN_SAFETY_DISTANCE,
            max_range: FLAK_MAX_RANGE,
            shell_speed: FLAK_SHELL_SPEED,
            burst_radius: FLAK_BURST_RADIUS,
            damage: FLAK_DAMAGE,
            falloff_slope: FLAK_FALLOFF_SLOPE,
            leave_barrier: true,
            barrier_duration: FLAK_BARRIER_DURATION,
            barrier_radius: FLAK_BARRIER_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsConfig {
    pub max_beams: usize,
    pub max_swarms: usize,
    pub max_area_effects: usize,
}

impl Default for CapsConfig {
    fn default() -> Self {
        Self {
            max_beams: MAX_ACTIVE_BEAMS,
            max_swarms: MAX_ACTIVE_SWARMS,
            max_area_effects: MAX_AREA_EFFECTS,
        }
    }
}
