//! Tuning constants. These are the defaults behind `CombatConfig`.

// --- Scheduling ---

/// Fine-motion step for beams and swarms (seconds, 50 Hz).
pub const FINE_STEP: f64 = 1.0 / 50.0;

/// Area-effect bookkeeping interval (seconds, 10 Hz).
pub const AREA_EFFECT_INTERVAL: f64 = 0.1;

/// Upper bound on fine steps processed in one host tick.
pub const MAX_FINE_STEPS_PER_TICK: u32 = 25;

// --- Target registry ---

/// Interval between candidate rescans per holder (seconds).
pub const RESCAN_INTERVAL: f64 = 0.5;

/// Default scan range when a holder has no sensor suite (meters).
pub const DEFAULT_SCAN_RANGE: f64 = 5_000.0;

/// Number of hotkey memory slots (numbered 1..=HOTKEY_SLOTS).
pub const HOTKEY_SLOTS: usize = 12;

// --- Sensors & visibility ---

/// Fraction of range lost at full interference.
pub const INTERFERENCE_RANGE_PENALTY: f64 = 0.3;

/// Radius inside which anything is in range regardless of sensors (meters).
pub const ALWAYS_DETECT_RADIUS: f64 = 400.0;

/// Maximum distance to a friendly long-range sensor unit for range extension (meters).
pub const SENSOR_LINK_RADIUS: f64 = 3_000.0;

/// Line-of-sight cache lifetime (seconds).
pub const LOS_CACHE_TTL: f64 = 0.2;

/// Distance within which stealth targets are always detected (meters).
pub const STEALTH_CERTAIN_RADIUS: f64 = 600.0;

/// Detection chance for stealth targets far beyond the certain radius.
pub const STEALTH_BASE_CHANCE: f64 = 0.15;

/// Bonus chance when a stealth target is emitting or moving fast.
pub const STEALTH_ACTIVE_BOOST: f64 = 0.25;

/// Speed above which a stealth target counts as fast (m/s).
pub const STEALTH_FAST_SPEED: f64 = 250.0;

/// Fraction of stealth detection chance lost at full interference.
pub const STEALTH_INTERFERENCE_PENALTY: f64 = 0.5;

/// Stealth detection re-roll window (seconds).
pub const STEALTH_ROLL_WINDOW: f64 = 1.0;

// --- Intercept solver ---

/// Maximum fixed-point iterations per solve.
pub const INTERCEPT_MAX_ITERATIONS: u32 = 12;

/// Positional convergence tolerance (meters); divided by weapon speed.
pub const INTERCEPT_CONVERGENCE_DISTANCE: f64 = 0.5;

/// Longest lead time the solver will predict (seconds).
pub const INTERCEPT_PREDICTION_HORIZON: f64 = 10.0;

/// Firing solution cache lifetime (seconds).
pub const INTERCEPT_CACHE_TTL: f64 = 0.15;

/// Consecutive growing deltas before a solve is declared diverging.
pub const INTERCEPT_DIVERGENCE_STREAK: u32 = 3;

/// Distance beyond which accuracy starts to fall off (meters).
pub const ACCURACY_RANGE_THRESHOLD: f64 = 1_500.0;

/// Accuracy lost per threshold-length beyond the range threshold.
pub const ACCURACY_RANGE_FALLOFF: f64 = 0.5;

/// Lead time beyond which accuracy starts to fall off (seconds).
pub const ACCURACY_LEAD_THRESHOLD: f64 = 1.0;

/// Accuracy lost per second of lead beyond the threshold.
pub const ACCURACY_LEAD_FALLOFF: f64 = 0.15;

/// Accuracy floor.
pub const MIN_ACCURACY: f64 = 0.05;

// --- Subsystem targeting ---

pub const SUBSYSTEM_CRITICAL_BONUS: f64 = 50.0;
pub const SUBSYSTEM_LOW_HEALTH_THRESHOLD: f64 = 0.4;
pub const SUBSYSTEM_LOW_HEALTH_BONUS: f64 = 20.0;
pub const SUBSYSTEM_TURRET_THREAT_BONUS: f64 = 15.0;

// --- Aspect lock ---

/// Normalized screen-space distance from reticle center that still counts as on-aspect.
pub const LOCK_TOLERANCE: f64 = 0.15;

/// Progress gained per second while on-aspect.
pub const LOCK_BUILD_RATE: f64 = 0.8;

/// Progress lost per second while off-aspect.
pub const LOCK_DECAY_RATE: f64 = 0.5;

/// Minimum continuous on-aspect time before lock (seconds).
pub const LOCK_MIN_TIME: f64 = 1.5;

/// Progress at which the lock cue starts.
pub const LOCK_CUE_THRESHOLD: f64 = 0.25;

/// Half-angle of the holder's view cone mapped to screen edge (radians, ~35°).
pub const LOCK_FOV_HALF_ANGLE: f64 = 0.61;

/// Progress delta between consecutive progress events.
pub const LOCK_PROGRESS_EVENT_STEP: f64 = 0.1;

// --- AI priority ---

/// Priority score cache lifetime (seconds).
pub const PRIORITY_CACHE_TTL: f64 = 0.5;

/// Number of threats tracked per holder during reassessment.
pub const PRIORITY_TOP_THREATS: usize = 3;

// --- Beams ---

pub const BEAM_WARMUP_SECS: f64 = 0.4;
pub const BEAM_ACTIVE_SECS: f64 = 3.0;
pub const BEAM_WARMDOWN_SECS: f64 = 0.3;

/// Damage tick interval while active (seconds).
pub const BEAM_DAMAGE_INTERVAL: f64 = 0.17;

/// Damage per beam damage tick.
pub const BEAM_DAMAGE_PER_TICK: f64 = 12.0;

/// Beam widths below this use a precision ray (meters).
pub const BEAM_WIDTH_RAY_MAX: f64 = 2.0;

/// Beam widths above this use volumetric intersection (meters).
pub const BEAM_WIDTH_VOLUME_MIN: f64 = 8.0;

/// Hybrid beams switch from ray to volume past this range (meters).
pub const BEAM_HYBRID_RANGE_SPLIT: f64 = 1_500.0;

/// Collision result cache lifetime per beam (seconds).
pub const BEAM_COLLISION_CACHE_TTL: f64 = 0.05;

/// Maximum targets a volumetric beam passes through.
pub const BEAM_MAX_PENETRATION: usize = 3;

/// Dwell per octant for sweeping beams (seconds).
pub const BEAM_OCTANT_DWELL: f64 = 0.75;

/// Prediction horizon for chasing beams (seconds).
pub const BEAM_CHASE_HORIZON: f64 = 0.5;

/// Reacquisition attempts for chasing beams.
pub const BEAM_CHASE_MAX_REACQUIRE: u32 = 3;

/// Cooldown between chase reacquisition attempts (seconds).
pub const BEAM_CHASE_REACQUIRE_COOLDOWN: f64 = 0.5;

// --- Swarm missiles ---

pub const SWARM_MISSILE_COUNT: u32 = 8;
pub const SWARM_LAUNCH_INTERVAL: f64 = 0.15;
pub const SWARM_MISSILE_SPEED: f64 = 420.0;

/// Pursuit turn-rate cap (rad/s).
pub const SWARM_TURN_RATE: f64 = 2.5;

/// Proximity fuse radius added to the target's collision radius (meters).
pub const SWARM_PROXIMITY: f64 = 15.0;

/// Missile self-destruct time (seconds).
pub const SWARM_MISSILE_LIFETIME: f64 = 12.0;

pub const SWARM_MAX_REACQUIRE: u32 = 2;
pub const SWARM_REACQUIRE_COOLDOWN: f64 = 0.5;
pub const SWARM_REACQUIRE_RADIUS: f64 = 2_500.0;
pub const SWARM_DAMAGE_PER_MISSILE: f64 = 35.0;

/// Closing speed floor used for lead-point time-to-go (m/s).
pub const SWARM_MIN_CLOSING_SPEED: f64 = 50.0;

// --- EMP ---

pub const EMP_INNER_RADIUS: f64 = 150.0;
pub const EMP_OUTER_RADIUS: f64 = 600.0;
pub const EMP_INTENSITY: f64 = 1.0;

/// Disruption duration at level 1.0 (seconds).
pub const EMP_BASE_DURATION: f64 = 6.0;

/// Shortest disruption applied (seconds).
pub const EMP_MIN_DURATION: f64 = 0.5;

/// How long a pulse stays visible in snapshots after detonation (seconds).
pub const EMP_PULSE_LINGER: f64 = 0.5;

/// Weapons-channel disruption at or above which fire requests are refused.
/// Below it, solution accuracy scales by (1 - level).
pub const EMP_WEAPONS_LOCKOUT: f64 = 0.75;
/// AI-channel disruption at or above which threat reassessment is skipped.
/// Below it, the reassessment interval stretches by (1 + level).
pub const EMP_AI_LOCKOUT: f64 = 0.75;

// --- Flak ---

/// Aim jitter radius with a pristine mount (meters).
pub const FLAK_BASE_JITTER: f64 = 10.0;

/// Additional jitter radius with a fully degraded mount (meters).
pub const FLAK_DEGRADED_JITTER: f64 = 80.0;

pub const FLAK_MIN_SAFETY_DISTANCE: f64 = 80.0;
pub const FLAK_MAX_RANGE: f64 = 2_500.0;
pub const FLAK_SHELL_SPEED: f64 = 900.0;
pub const FLAK_BURST_RADIUS: f64 = 60.0;
pub const FLAK_DAMAGE: f64 = 40.0;

/// Damage lost at the burst edge (EMP falls to zero; flak keeps 40%).
pub const FLAK_FALLOFF_SLOPE: f64 = 0.6;

pub const FLAK_BARRIER_DURATION: f64 = 4.0;
pub const FLAK_BARRIER_RADIUS: f64 = 90.0;

// --- Resistance ---

/// Cap on compounded resistance.
pub const MAX_RESISTANCE: f64 = 0.95;

/// Shield fraction required for EMP immunity.
pub const EMP_SHIELD_IMMUNITY_THRESHOLD: f64 = 0.25;
pub const EMP_SHIELD_IMMUNITY_FACTOR: f64 = 0.98;

pub const CAPITAL_CORE_IMMUNITY_FACTOR: f64 = 0.97;

/// Armor rating at which kinetic rounds mostly bounce.
pub const HEAVY_ARMOR_THRESHOLD: f64 = 0.7;
pub const HEAVY_ARMOR_KINETIC_FACTOR: f64 = 0.8;

pub const POINT_DEFENSE_SWARM_FACTOR: f64 = 0.75;

/// Resistance contributed by a full shield.
pub const SHIELD_RESISTANCE_FACTOR: f64 = 0.3;

/// Resistance contributed per unit armor rating.
pub const ARMOR_RESISTANCE_FACTOR: f64 = 0.4;

pub const HARDENED_ELECTRONICS_RESISTANCE: f64 = 0.5;
pub const REACTIVE_ARMOR_RESISTANCE: f64 = 0.3;
pub const ABLATIVE_PLATING_RESISTANCE: f64 = 0.25;

/// Extra resistance on capital-grade hulls by hit location.
pub const CAPITAL_CORE_RESISTANCE: f64 = 0.3;
pub const CAPITAL_STANDARD_RESISTANCE: f64 = 0.1;

// --- Resource caps ---

pub const MAX_ACTIVE_BEAMS: usize = 32;
pub const MAX_ACTIVE_SWARMS: usize = 16;
pub const MAX_AREA_EFFECTS: usize = 48;
