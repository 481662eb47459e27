//! Range and visibility validation.
//!
//! Answers "can this holder see and engage that target right now": effective
//! sensor range (with interference and friendly sensor pickets), a cached
//! obstruction ray, and a windowed stealth detection roll.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use broadside_core::components::{Sensors, Stealth};
use broadside_core::config::{CombatConfig, SensorConfig};
use broadside_core::enums::{DisruptionChannel, Team};
use broadside_core::types::{Position, Velocity};

use crate::area::emp::{channel_level, DisruptionMap};
use crate::handle::entity_id;
use crate::spatial::SpatialQuery;

/// Result of validating one (holder, target) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityReport {
    pub in_range: bool,
    /// Only tested inside effective range; false otherwise.
    pub line_of_sight: bool,
    pub detectable: bool,
    pub sensor_quality: f64,
    /// Probability used for the stealth roll (1.0 for non-stealth targets).
    pub detection_chance: f64,
    pub effective_range: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct CachedFlag {
    value: bool,
    at: f64,
}

/// Line-of-sight and stealth-roll caches.
#[derive(Debug, Default)]
pub struct VisibilityValidator {
    line_of_sight: HashMap<(Entity, Entity), CachedFlag>,
    stealth_rolls: HashMap<(Entity, Entity), CachedFlag>,
}

impl VisibilityValidator {
    /// Drop entries older than their windows.
    pub fn prune(&mut self, now: f64, config: &SensorConfig) {
        self.line_of_sight
            .retain(|_, c| now - c.at < config.los_cache_ttl);
        self.stealth_rolls
            .retain(|_, c| now - c.at < config.stealth_roll_window);
    }

    /// Drop every entry that mentions a dead entity.
    pub fn purge(&mut self, is_alive: impl Fn(Entity) -> bool) {
        self.line_of_sight
            .retain(|(a, b), _| is_alive(*a) && is_alive(*b));
        self.stealth_rolls
            .retain(|(a, b), _| is_alive(*a) && is_alive(*b));
    }

    pub fn cached_sight_lines(&self) -> usize {
        self.line_of_sight.len()
    }
}

/// Everything a visibility check needs, borrowed from the engine for one pass.
pub struct SensorContext<'a, S: SpatialQuery> {
    pub world: &'a World,
    pub spatial: &'a S,
    pub validator: &'a mut VisibilityValidator,
    pub rng: &'a mut ChaCha8Rng,
    pub config: &'a CombatConfig,
    /// Live EMP disruptions. The targeting channel adds to sensor interference.
    pub disruptions: &'a DisruptionMap,
    pub now: f64,
}

impl<'a, S: SpatialQuery> SensorContext<'a, S> {
    /// Effective detection range of a holder. `None` if it has no position.
    pub fn effective_range(&self, holder: Entity) -> Option<f64> {
        effective_range(self.world, holder, self.config, self.jamming(holder))
    }

    /// Targeting-channel disruption on `holder`.
    pub fn jamming(&self, holder: Entity) -> f64 {
        channel_level(self.disruptions, entity_id(holder), DisruptionChannel::Targeting)
    }

    /// Validate a (holder, target) pair. `None` if either side is gone.
    pub fn validate(&mut self, holder: Entity, target: Entity) -> Option<VisibilityReport> {
        let holder_pos = *self.world.get::<&Position>(holder).ok()?;
        let target_pos = *self.world.get::<&Position>(target).ok()?;
        let sensors = holder_sensors(self.world, holder, self.config);
        let jamming = self.jamming(holder);
        let effective_range = effective_range(self.world, holder, self.config, jamming)?;
        let distance = holder_pos.range_to(&target_pos);
        let in_range = distance <= effective_range;

        if !in_range {
            return Some(VisibilityReport {
                in_range,
                line_of_sight: false,
                detectable: false,
                sensor_quality: sensors.quality,
                detection_chance: 0.0,
                effective_range,
                distance,
            });
        }

        let line_of_sight = self.line_of_sight(holder, target, holder_pos, target_pos);

        let stealth = self
            .world
            .get::<&Stealth>(target)
            .map(|s| *s)
            .unwrap_or_default();
        let (detection_chance, detectable) = if stealth.engaged {
            let speed = self
                .world
                .get::<&Velocity>(target)
                .map(|v| v.speed())
                .unwrap_or(0.0);
            let chance = stealth_detection_chance(
                distance,
                speed,
                stealth.emitting,
                (sensors.interference + jamming).min(1.0),
                &self.config.sensors,
            );
            (chance, self.stealth_roll(holder, target, chance))
        } else {
            (1.0, true)
        };

        Some(VisibilityReport {
            in_range,
            line_of_sight,
            detectable,
            sensor_quality: sensors.quality,
            detection_chance,
            effective_range,
            distance,
        })
    }

    fn line_of_sight(
        &mut self,
        holder: Entity,
        target: Entity,
        from: Position,
        to: Position,
    ) -> bool {
        let ttl = self.config.sensors.los_cache_ttl;
        if let Some(cached) = self.validator.line_of_sight.get(&(holder, target)) {
            if self.now - cached.at < ttl {
                return cached.value;
            }
        }
        let clear = !self
            .spatial
            .raycast_obstruction(self.world, from.0, to.0, &[holder, target]);
        self.validator.line_of_sight.insert(
            (holder, target),
            CachedFlag {
                value: clear,
                at: self.now,
            },
        );
        clear
    }

    fn stealth_roll(&mut self, holder: Entity, target: Entity, chance: f64) -> bool {
        if chance >= 1.0 {
            return true;
        }
        let window = self.config.sensors.stealth_roll_window;
        if let Some(cached) = self.validator.stealth_rolls.get(&(holder, target)) {
            if self.now - cached.at < window {
                return cached.value;
            }
        }
        let detected = self.rng.gen_bool(chance.clamp(0.0, 1.0));
        self.validator.stealth_rolls.insert(
            (holder, target),
            CachedFlag {
                value: detected,
                at: self.now,
            },
        );
        detected
    }
}

fn holder_sensors(world: &World, holder: Entity, config: &CombatConfig) -> Sensors {
    world.get::<&Sensors>(holder).map(|s| *s).unwrap_or(Sensors {
        base_range: config.targeting.default_scan_range,
        ..Sensors::default()
    })
}

/// Effective detection range of a holder.
///
/// Own sensors degraded by interference (plus `jamming` from EMP) and floored
/// at the always-detect radius, plus the best bonus lent by a friendly sensor
/// picket in link range.
pub fn effective_range(
    world: &World,
    holder: Entity,
    config: &CombatConfig,
    jamming: f64,
) -> Option<f64> {
    let holder_pos = *world.get::<&Position>(holder).ok()?;
    let sensors = holder_sensors(world, holder, config);
    let cfg = &config.sensors;

    let interference = (sensors.interference + jamming).clamp(0.0, 1.0);
    let penalty = interference * cfg.interference_range_penalty;
    let degraded = sensors.base_range * sensors.quality * (1.0 - penalty);
    let own = degraded.max(cfg.always_detect_radius);

    let team = world.get::<&Team>(holder).map(|t| *t).ok();
    let bonus = match team {
        Some(team) => world
            .query::<(&Position, &Team, &Sensors)>()
            .iter()
            .filter(|(e, (pos, t, s))| {
                *e != holder
                    && t.is_friendly_to(team)
                    && s.extension_range > 0.0
                    && pos.range_to(&holder_pos) <= cfg.link_radius
            })
            .map(|(_, (_, _, s))| s.extension_range * s.quality)
            .fold(0.0, f64::max),
        None => 0.0,
    };

    Some(own + bonus)
}

/// Detection probability for a stealthed target.
///
/// Certain inside the close radius, falling linearly to the base chance at
/// three times that radius, boosted when the target is emitting or fast, then
/// scaled down by the observer's interference.
pub fn stealth_detection_chance(
    distance: f64,
    target_speed: f64,
    emitting: bool,
    interference: f64,
    config: &SensorConfig,
) -> f64 {
    let certain = config.stealth_certain_radius;
    let far = certain * 3.0;
    let base = if distance <= certain {
        1.0
    } else if distance >= far {
        config.stealth_base_chance
    } else {
        let t = (distance - certain) / (far - certain);
        1.0 + (config.stealth_base_chance - 1.0) * t
    };
    let boosted = if emitting || target_speed > config.stealth_fast_speed {
        base + config.stealth_active_boost
    } else {
        base
    };
    let scaled =
        boosted * (1.0 - interference.clamp(0.0, 1.0) * config.stealth_interference_penalty);
    scaled.clamp(0.0, 1.0)
}
