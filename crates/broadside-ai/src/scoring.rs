//! Multi-factor target priority scoring.
//!
//! Pure functions over a [`ScoreContext`]. Each component produces a value in
//! roughly 0..=100; the total is the weighted mean, so profile multipliers shift
//! emphasis without inflating the scale.

use broadside_core::enums::{BehaviorProfile, ShipClass, WeaponType};
use serde::{Deserialize, Serialize};

use crate::profiles::{
    class_threat, get_params, ship_type_preference, weapon_affinity, BASE_WEIGHTS,
};

/// Bonus for a target that is currently targeting the scorer.
pub const TARGETING_US_BONUS: f64 = 40.0;

/// Speed at which the speed-threat term saturates (m/s).
pub const SPEED_THREAT_SATURATION: f64 = 300.0;

/// Everything the scorer needs to know about one (holder, target, weapon) triple.
#[derive(Debug, Clone)]
pub struct ScoreContext {
    pub profile: BehaviorProfile,
    pub weapon: WeaponType,
    pub distance: f64,
    /// Weapon's sweet-spot range (meters).
    pub optimal_range: f64,
    /// Weapon's maximum useful range (meters).
    pub max_range: f64,
    pub target_class: ShipClass,
    pub target_speed: f64,
    /// The target currently has us selected.
    pub targeting_us: bool,
    /// Fraction of the target's weapon systems still functional (0..=1).
    pub weapon_readiness: f64,
    pub hull_fraction: f64,
    pub shield_fraction: f64,
    /// A critical subsystem on the target is already knocked out.
    pub critical_damage: bool,
    /// Allies already engaging this target.
    pub focus_fire: u32,
    /// Target is attacking our formation.
    pub threatens_formation: bool,
    /// Target is a mission objective.
    pub objective: bool,
}

/// Per-component result, kept for debugging and UI overlays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub distance: f64,
    pub threat: f64,
    pub health: f64,
    pub ship_type: f64,
    pub weapon_affinity: f64,
    pub tactical: f64,
    pub total: f64,
}

/// Score a target. Higher means more attractive.
pub fn score(ctx: &ScoreContext) -> ScoreBreakdown {
    let params = get_params(ctx.profile);
    let weights = BASE_WEIGHTS.scaled_by(&params.multipliers);

    let distance = distance_component(ctx.distance, ctx.optimal_range, ctx.max_range);
    let threat = threat_component(ctx);
    let health = health_component(ctx.hull_fraction, ctx.shield_fraction, ctx.critical_damage);
    let ship_type = ship_type_preference(ctx.profile, ctx.target_class);
    let affinity = weapon_affinity(ctx.weapon, ctx.target_class);
    let tactical = tactical_component(ctx.focus_fire, ctx.threatens_formation, ctx.objective);

    let weighted = distance * weights.distance
        + threat * weights.threat
        + health * weights.health
        + ship_type * weights.ship_type
        + affinity * weights.weapon_affinity
        + tactical * weights.tactical;

    // Out of reach targets are never worth scoring.
    let total = if ctx.distance > ctx.max_range {
        0.0
    } else {
        weighted / weights.sum()
    };

    ScoreBreakdown {
        distance,
        threat,
        health,
        ship_type,
        weapon_affinity: affinity,
        tactical,
        total,
    }
}

/// Whether a score clears the profile's selection threshold.
pub fn meets_threshold(profile: BehaviorProfile, total: f64) -> bool {
    total >= get_params(profile).min_score
}

/// 100 at the optimal range, falling linearly to 0 one max-range away.
pub fn distance_component(distance: f64, optimal: f64, max_range: f64) -> f64 {
    if max_range <= 0.0 || distance > max_range {
        return 0.0;
    }
    100.0 * (1.0 - (distance - optimal).abs() / max_range).clamp(0.0, 1.0)
}

/// Threat posed to us: targeting-us bonus, class threat scaled by readiness, speed.
pub fn threat_component(ctx: &ScoreContext) -> f64 {
    let targeting = if ctx.targeting_us {
        TARGETING_US_BONUS
    } else {
        0.0
    };
    let readiness = ctx.weapon_readiness.clamp(0.0, 1.0);
    let class = class_threat(ctx.target_class) * (0.5 + 0.5 * readiness);
    let speed = (ctx.target_speed / SPEED_THREAT_SATURATION).clamp(0.0, 1.0) * 15.0;
    targeting + class + speed
}

/// Preference for damaged, unshielded, or crippled targets.
pub fn health_component(hull_fraction: f64, shield_fraction: f64, critical_damage: bool) -> f64 {
    let hull = (1.0 - hull_fraction.clamp(0.0, 1.0)) * 60.0;
    let shields = (1.0 - shield_fraction.clamp(0.0, 1.0)) * 25.0;
    let critical = if critical_damage { 15.0 } else { 0.0 };
    hull + shields + critical
}

/// Focus-fire, formation, and objective hooks.
pub fn tactical_component(focus_fire: u32, threatens_formation: bool, objective: bool) -> f64 {
    let focus = f64::from(focus_fire.min(3)) * 10.0;
    let formation = if threatens_formation { 15.0 } else { 0.0 };
    let objective = if objective { 30.0 } else { 0.0 };
    focus + formation + objective
}

/// Pick the highest-scoring candidate that clears the profile threshold.
///
/// Ties keep the earlier candidate, so callers control tie-breaking by order.
pub fn select_best<K: Copy>(
    profile: BehaviorProfile,
    scored: impl IntoIterator<Item = (K, f64)>,
) -> Option<(K, f64)> {
    let mut best: Option<(K, f64)> = None;
    for (key, total) in scored {
        if !meets_threshold(profile, total) {
            continue;
        }
        match best {
            Some((_, best_total)) if best_total >= total => {}
            _ => best = Some((key, total)),
        }
    }
    best
}
