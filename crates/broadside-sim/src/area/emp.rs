//! Electromagnetic pulse.
//!
//! A pulse detonates instantly. Every ship inside the outer radius takes a
//! per-channel disruption whose level falls off linearly from the inner
//! radius, is reduced by the target's EMP resistance and scaled by channel
//! susceptibility. Disruptions decay linearly and restore channel by channel.

use std::collections::BTreeMap;

use glam::DVec3;
use hecs::{Entity, World};
use tracing::{debug, info};

use broadside_core::config::EmpConfig;
use broadside_core::constants::EMP_PULSE_LINGER;
use broadside_core::enums::{DisruptionChannel, SubsystemCategory, Team, WeaponType};
use broadside_core::events::CombatEvent;
use broadside_core::types::{EntityId, Position};

use crate::handle::entity_id;
use crate::resistance::{self, DefenseProfile};
use crate::spatial::SpatialQuery;

/// Linear falloff: 1.0 inside `inner`, 0.0 at or beyond `outer`.
pub fn falloff(distance: f64, inner: f64, outer: f64) -> f64 {
    if distance <= inner {
        1.0
    } else if distance >= outer || outer <= inner {
        0.0
    } else {
        1.0 - (distance - inner) / (outer - inner)
    }
}

/// Disruption levels and durations per enabled channel.
///
/// `level = intensity × falloff × (1 − resistance) × susceptibility`,
/// `duration = max(base × factor × level, min)`.
pub fn channel_effects(
    intensity: f64,
    falloff: f64,
    resistance: f64,
    config: &EmpConfig,
) -> Vec<(DisruptionChannel, f64, f64)> {
    let effective = intensity * falloff * (1.0 - resistance.clamp(0.0, 1.0));
    DisruptionChannel::ALL
        .iter()
        .filter_map(|&channel| {
            let tuning = config.channel(channel);
            if !tuning.enabled {
                return None;
            }
            let level = (effective * tuning.susceptibility).clamp(0.0, 1.0);
            if level <= 0.0 {
                return None;
            }
            let duration =
                (config.base_duration * tuning.duration_factor * level).max(config.min_duration);
            Some((channel, level, duration))
        })
        .collect()
}

/// An active channel disruption on one ship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disruption {
    pub level: f64,
    pub remaining: f64,
    /// Level lost per second.
    decay_rate: f64,
}

impl Disruption {
    pub fn new(level: f64, duration: f64) -> Self {
        let duration = duration.max(f64::EPSILON);
        Self {
            level,
            remaining: duration,
            decay_rate: level / duration,
        }
    }

    /// Stack another pulse: stronger level and longer remaining time win.
    pub fn stack(&mut self, level: f64, duration: f64) {
        *self = Self::new(self.level.max(level), self.remaining.max(duration));
    }

    /// Decay by `dt`. Returns true once the channel has recovered.
    pub fn decay(&mut self, dt: f64) -> bool {
        self.remaining -= dt;
        self.level = (self.level - self.decay_rate * dt).max(0.0);
        self.remaining <= 1e-9
    }
}

/// Disruptions keyed by target and channel slot.
pub type DisruptionMap = BTreeMap<(EntityId, usize), Disruption>;

/// Current level of one channel on a ship, 0 when undisturbed.
pub fn channel_level(
    disruptions: &DisruptionMap,
    target: EntityId,
    channel: DisruptionChannel,
) -> f64 {
    disruptions
        .get(&(target, channel.index()))
        .map_or(0.0, |d| d.level)
}

/// A detonated pulse, kept briefly for presentation.
#[derive(Debug, Clone)]
pub struct EmpPulse {
    pub id: u32,
    pub owner: Entity,
    pub center: DVec3,
    pub radius: f64,
    pub remaining: f64,
}

/// Detonate a pulse at `center` and apply disruptions.
#[allow(clippy::too_many_arguments)]
pub fn detonate<S: SpatialQuery>(
    world: &World,
    spatial: &S,
    id: u32,
    owner: Entity,
    center: DVec3,
    config: &EmpConfig,
    disruptions: &mut DisruptionMap,
    events: &mut Vec<CombatEvent>,
) -> EmpPulse {
    let owner_team = world.get::<&Team>(owner).ok().map(|t| *t);

    let mut victims = spatial.find_in_radius(world, center, config.outer_radius);
    victims.sort_by_key(|e| entity_id(*e));

    let mut affected = 0u32;
    for victim in victims {
        if victim == owner {
            continue;
        }
        let victim_team = world.get::<&Team>(victim).ok().map(|t| *t);
        let friendly = matches!(
            (owner_team, victim_team),
            (Some(a), Some(b)) if a.is_friendly_to(b)
        );
        if friendly && !config.friendly_fire {
            continue;
        }
        let Ok(pos) = world.get::<&Position>(victim).map(|p| p.0) else {
            continue;
        };
        let Some(profile) = DefenseProfile::from_world(world, victim) else {
            continue;
        };

        let f = falloff(pos.distance(center), config.inner_radius, config.outer_radius);
        if f <= 0.0 {
            continue;
        }
        let (reduction, immunity) =
            resistance::resistance(&profile, WeaponType::Emp, SubsystemCategory::Standard);
        if let Some(condition) = immunity {
            debug!(target = ?entity_id(victim), ?condition, "EMP shrugged off");
        }

        let effects = channel_effects(config.intensity, f, reduction, config);
        if effects.is_empty() {
            continue;
        }
        affected += 1;
        let target = entity_id(victim);
        for (channel, level, duration) in effects {
            disruptions
                .entry((target, channel.index()))
                .and_modify(|d| d.stack(level, duration))
                .or_insert_with(|| Disruption::new(level, duration));
            events.push(CombatEvent::ChannelDisrupted {
                target,
                channel,
                level,
                duration,
            });
        }
    }

    info!(effect_id = id, affected, "EMP detonated");
    events.push(CombatEvent::EmpDetonated {
        effect_id: id,
        origin: center,
        affected,
    });

    EmpPulse {
        id,
        owner,
        center,
        radius: config.outer_radius,
        remaining: EMP_PULSE_LINGER,
    }
}

/// Decay every disruption by `dt` and restore channels that run out.
pub fn decay_all(disruptions: &mut DisruptionMap, dt: f64, events: &mut Vec<CombatEvent>) {
    let mut restored = Vec::new();
    for (&(target, slot), disruption) in disruptions.iter_mut() {
        if disruption.decay(dt) {
            restored.push((target, slot));
        }
    }
    for (target, slot) in restored {
        disruptions.remove(&(target, slot));
        events.push(CombatEvent::ChannelRestored {
            target,
            channel: DisruptionChannel::ALL[slot],
        });
    }
}
