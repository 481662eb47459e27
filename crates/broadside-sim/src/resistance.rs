//! Resistance and immunity engine.
//!
//! Resistance is computed fresh for every hit from the target's current
//! components and never stored:
//! - Hard immunities short-circuit with a fixed factor.
//! - Otherwise independent sources compound as `1 - Π(1 - rᵢ)`.
//! - Compounded resistance is capped at [`MAX_RESISTANCE`].

use hecs::{Entity, World};
use tracing::trace;

use broadside_core::components::*;
use broadside_core::constants::*;
use broadside_core::enums::*;

/// Defensive state of a target at the moment of impact.
#[derive(Debug, Clone, Copy)]
pub struct DefenseProfile {
    pub class: ShipClass,
    /// Shield fraction, 0 when shields are down.
    pub shield_fraction: f64,
    /// Average health of shield subsystems (1.0 when the ship lists none).
    pub shield_system_health: f64,
    pub armor_rating: f64,
    pub point_defense: bool,
    pub protection: SpecialProtection,
}

impl DefenseProfile {
    /// Read the profile from the world. `None` if the target has no hull.
    pub fn from_world(world: &World, target: Entity) -> Option<Self> {
        let class = world.get::<&Hull>(target).ok()?.class;
        let shield_fraction = world
            .get::<&Shields>(target)
            .map(|s| s.fraction())
            .unwrap_or(0.0);
        let shield_system_health = world
            .get::<&Subsystems>(target)
            .ok()
            .and_then(|subs| average_health(&subs, SubsystemKind::Shields))
            .unwrap_or(1.0);
        let armor_rating = world
            .get::<&Armor>(target)
            .map(|a| a.rating.clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let point_defense = world
            .get::<&PointDefense>(target)
            .map(|pd| pd.active)
            .unwrap_or(false);
        let protection = world
            .get::<&SpecialProtection>(target)
            .map(|p| *p)
            .unwrap_or_default();

        Some(Self {
            class,
            shield_fraction,
            shield_system_health,
            armor_rating,
            point_defense,
            protection,
        })
    }
}

/// Mean health of the subsystems of one kind, if any exist.
pub fn average_health(subsystems: &Subsystems, kind: SubsystemKind) -> Option<f64> {
    let (sum, count) = subsystems
        .list
        .iter()
        .filter(|s| s.kind == kind)
        .fold((0.0, 0u32), |(sum, n), s| (sum + s.health.clamp(0.0, 1.0), n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}

/// Result of routing one hit through the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub raw: f64,
    pub applied: f64,
    /// Fraction of raw damage removed (0..=1).
    pub reduction: f64,
    pub immunity: Option<ImmunityCondition>,
}

/// Check hard immunities in priority order.
pub fn check_immunity(
    profile: &DefenseProfile,
    weapon: WeaponType,
    hit_category: SubsystemCategory,
) -> Option<(ImmunityCondition, f64)> {
    if weapon.category() == WeaponCategory::Electromagnetic
        && profile.shield_fraction >= EMP_SHIELD_IMMUNITY_THRESHOLD
    {
        return Some((
            ImmunityCondition::ShieldedAgainstEmp,
            EMP_SHIELD_IMMUNITY_FACTOR,
        ));
    }
    if profile.class.is_capital_grade() && hit_category == SubsystemCategory::Core {
        return Some((
            ImmunityCondition::CapitalCoreProtection,
            CAPITAL_CORE_IMMUNITY_FACTOR,
        ));
    }
    if weapon.category() == WeaponCategory::Kinetic
        && profile.armor_rating >= HEAVY_ARMOR_THRESHOLD
    {
        return Some((
            ImmunityCondition::HeavyArmorVsKinetic,
            HEAVY_ARMOR_KINETIC_FACTOR,
        ));
    }
    if weapon == WeaponType::Swarm && profile.point_defense {
        return Some((
            ImmunityCondition::PointDefenseVsSwarm,
            POINT_DEFENSE_SWARM_FACTOR,
        ));
    }
    None
}

/// Baseline resistance of a hull class to a damage category.
pub fn class_base_resistance(class: ShipClass, category: WeaponCategory) -> f64 {
    let row: [f64; 7] = match category {
        WeaponCategory::Kinetic => [0.0, 0.05, 0.10, 0.15, 0.20, 0.25, 0.30],
        WeaponCategory::Energy => [0.0, 0.05, 0.08, 0.12, 0.15, 0.20, 0.25],
        WeaponCategory::Explosive => [0.0, 0.05, 0.10, 0.12, 0.18, 0.22, 0.28],
        WeaponCategory::Electromagnetic => [0.05, 0.05, 0.10, 0.10, 0.15, 0.20, 0.25],
    };
    let index = match class {
        ShipClass::Fighter => 0,
        ShipClass::Bomber => 1,
        ShipClass::Corvette => 2,
        ShipClass::Frigate => 3,
        ShipClass::Destroyer => 4,
        ShipClass::Cruiser => 5,
        ShipClass::Capital => 6,
    };
    row[index]
}

/// Compound independent resistances: `1 - Π(1 - rᵢ)`, each source clamped to 0..=1.
pub fn compound(factors: impl IntoIterator<Item = f64>) -> f64 {
    1.0 - factors
        .into_iter()
        .map(|r| 1.0 - r.clamp(0.0, 1.0))
        .product::<f64>()
}

/// Every non-immunity resistance source that applies to this hit.
pub fn resistance_sources(
    profile: &DefenseProfile,
    weapon: WeaponType,
    hit_category: SubsystemCategory,
) -> Vec<f64> {
    let category = weapon.category();
    let mut sources = vec![class_base_resistance(profile.class, category)];

    // Step 1: Shields, weakened by damaged generators
    if profile.shield_fraction > 0.0 {
        sources.push(
            profile.shield_fraction * SHIELD_RESISTANCE_FACTOR * profile.shield_system_health,
        );
    }

    // Step 2: Armor only stops physical damage
    if matches!(category, WeaponCategory::Kinetic | WeaponCategory::Explosive) {
        sources.push(profile.armor_rating * ARMOR_RESISTANCE_FACTOR);
    }

    // Step 3: Special protections
    let p = profile.protection;
    match category {
        WeaponCategory::Electromagnetic if p.hardened_electronics => {
            sources.push(HARDENED_ELECTRONICS_RESISTANCE)
        }
        WeaponCategory::Explosive if p.reactive_armor => sources.push(REACTIVE_ARMOR_RESISTANCE),
        WeaponCategory::Energy if p.ablative_plating => sources.push(ABLATIVE_PLATING_RESISTANCE),
        _ => {}
    }

    // Step 4: Capital hulls protect their core better than their extremities
    if profile.class.is_capital_grade() {
        match hit_category {
            SubsystemCategory::Core => sources.push(CAPITAL_CORE_RESISTANCE),
            SubsystemCategory::Standard => sources.push(CAPITAL_STANDARD_RESISTANCE),
            SubsystemCategory::Turret => {}
        }
    }

    sources
}

/// Total resistance for a hit and the immunity that produced it, if any.
///
/// Immunity factors are fixed and may exceed the compounding cap.
pub fn resistance(
    profile: &DefenseProfile,
    weapon: WeaponType,
    hit_category: SubsystemCategory,
) -> (f64, Option<ImmunityCondition>) {
    if let Some((condition, factor)) = check_immunity(profile, weapon, hit_category) {
        return (factor, Some(condition));
    }
    let total = compound(resistance_sources(profile, weapon, hit_category));
    (total.clamp(0.0, MAX_RESISTANCE), None)
}

/// Route raw damage through the engine. `None` if the target has no hull.
pub fn compute(
    world: &World,
    target: Entity,
    weapon: WeaponType,
    damage: f64,
    hit_category: SubsystemCategory,
) -> Option<DamageOutcome> {
    let profile = DefenseProfile::from_world(world, target)?;
    Some(apply(&profile, weapon, damage, hit_category))
}

/// Apply a defense profile to raw damage.
pub fn apply(
    profile: &DefenseProfile,
    weapon: WeaponType,
    damage: f64,
    hit_category: SubsystemCategory,
) -> DamageOutcome {
    let raw = damage.max(0.0);
    let (reduction, immunity) = resistance(profile, weapon, hit_category);
    if let Some(condition) = immunity {
        trace!(?weapon, ?condition, "Immunity triggered");
    }
    DamageOutcome {
        raw,
        applied: raw * (1.0 - reduction),
        reduction,
        immunity,
    }
}
