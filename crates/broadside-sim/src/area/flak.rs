//! Flak bursts and defensive barriers.
//!
//! The detonation point is fixed at fire time: aim point plus jitter that
//! grows as the firing ship's weapons degrade, clamped between the minimum
//! safety distance and max range. The shell bursts after `distance / speed`.

use glam::DVec3;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use broadside_core::components::Subsystems;
use broadside_core::config::FlakConfig;
use broadside_core::enums::{SubsystemCategory, SubsystemKind, Team, WeaponType};
use broadside_core::events::CombatEvent;
use broadside_core::types::Position;

use crate::handle::entity_id;
use crate::resistance::{self, average_health};
use crate::spatial::SpatialQuery;

/// Jitter radius for a mount at the given weapons health (0..=1).
pub fn jitter_radius(weapons_health: f64, config: &FlakConfig) -> f64 {
    config.base_jitter + (1.0 - weapons_health.clamp(0.0, 1.0)) * config.degraded_jitter
}

/// Average health of the holder's weapon subsystems; 1.0 if it lists none.
pub fn weapons_health(world: &World, holder: Entity) -> f64 {
    world
        .get::<&Subsystems>(holder)
        .ok()
        .and_then(|subs| average_health(&subs, SubsystemKind::Weapons))
        .unwrap_or(1.0)
}

/// Uniform random point inside a sphere of `radius`.
pub fn random_offset(rng: &mut ChaCha8Rng, radius: f64) -> DVec3 {
    if radius <= 0.0 {
        return DVec3::ZERO;
    }
    loop {
        let v = DVec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if v.length_squared() <= 1.0 {
            return v * radius;
        }
    }
}

/// Clamp a burst point to the safe firing envelope around `origin`.
pub fn clamp_detonation(origin: DVec3, point: DVec3, config: &FlakConfig) -> DVec3 {
    let offset = point - origin;
    let distance = offset.length();
    let direction = if distance > 1e-9 { offset / distance } else { DVec3::Y };
    origin + direction * distance.clamp(config.min_safety_distance, config.max_range)
}

/// Damage multiplier at `distance` from the burst centre.
pub fn burst_falloff(distance: f64, radius: f64, slope: f64) -> f64 {
    if radius <= 0.0 || distance > radius {
        0.0
    } else {
        1.0 - slope * distance / radius
    }
}

/// A shell in flight toward its predetermined burst point.
#[derive(Debug, Clone)]
pub struct FlakShell {
    pub id: u32,
    pub owner: Entity,
    pub team: Option<Team>,
    pub origin: DVec3,
    pub detonation_point: DVec3,
    pub fuse: f64,
    pub damage: f64,
}

/// Time-limited flak screen left behind by a burst.
#[derive(Debug, Clone)]
pub struct Barrier {
    pub id: u32,
    pub center: DVec3,
    pub radius: f64,
    pub remaining: f64,
}

impl Barrier {
    /// Density contribution at `point`: 1 at the centre, 0 at the edge.
    pub fn density_at(&self, point: DVec3) -> f64 {
        if self.radius <= 0.0 {
            return 0.0;
        }
        (1.0 - point.distance(self.center) / self.radius).max(0.0)
    }
}

/// Build a shell aimed at `aim_point` from `origin`.
#[allow(clippy::too_many_arguments)]
pub fn launch(
    world: &World,
    rng: &mut ChaCha8Rng,
    id: u32,
    owner: Entity,
    origin: DVec3,
    aim_point: DVec3,
    damage: f64,
    config: &FlakConfig,
) -> FlakShell {
    let jitter = jitter_radius(weapons_health(world, owner), config);
    let detonation_point = clamp_detonation(origin, aim_point + random_offset(rng, jitter), config);
    let fuse = if config.shell_speed > 0.0 {
        origin.distance(detonation_point) / config.shell_speed
    } else {
        0.0
    };
    debug!(effect_id = id, jitter, fuse, "Flak shell launched");
    FlakShell {
        id,
        owner,
        team: world.get::<&Team>(owner).ok().map(|t| *t),
        origin,
        detonation_point,
        fuse,
        damage,
    }
}

/// Burst a shell: damage everything hostile in the radius.
///
/// Returns the barrier left behind, if configured.
pub fn burst<S: SpatialQuery>(
    world: &World,
    spatial: &S,
    shell: &FlakShell,
    config: &FlakConfig,
    events: &mut Vec<CombatEvent>,
) -> Option<Barrier> {
    let point = shell.detonation_point;
    let mut victims = spatial.find_in_radius(world, point, config.burst_radius);
    victims.sort_by_key(|e| entity_id(*e));

    let mut hits = 0u32;
    for victim in victims {
        if victim == shell.owner {
            continue;
        }
        let victim_team = world.get::<&Team>(victim).ok().map(|t| *t);
        if matches!((shell.team, victim_team), (Some(a), Some(b)) if a.is_friendly_to(b)) {
            continue;
        }
        let Ok(pos) = world.get::<&Position>(victim).map(|p| p.0) else {
            continue;
        };
        let scale = burst_falloff(pos.distance(point), config.burst_radius, config.falloff_slope);
        if scale <= 0.0 {
            continue;
        }
        let Some(outcome) = resistance::compute(
            world,
            victim,
            WeaponType::Flak,
            shell.damage * scale,
            SubsystemCategory::Standard,
        ) else {
            continue;
        };
        hits += 1;
        events.push(CombatEvent::DamageResolved {
            target: entity_id(victim),
            weapon: WeaponType::Flak,
            raw: outcome.raw,
            applied: outcome.applied,
            reduction: outcome.reduction,
            immunity: outcome.immunity,
        });
    }

    debug!(effect_id = shell.id, hits, "Flak burst");
    events.push(CombatEvent::FlakDetonated {
        effect_id: shell.id,
        point,
        hits,
    });

    config.leave_barrier.then(|| Barrier {
        id: shell.id,
        center: point,
        radius: config.barrier_radius,
        remaining: config.barrier_duration,
    })
}

/// Summed barrier density at `point`, clamped to 1.
pub fn coverage<'a>(barriers: impl IntoIterator<Item = &'a Barrier>, point: DVec3) -> f64 {
    barriers
        .into_iter()
        .map(|b| b.density_at(point))
        .sum::<f64>()
        .min(1.0)
}
