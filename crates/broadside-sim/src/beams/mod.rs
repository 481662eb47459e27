//! Continuous beam weapons.
//!
//! A beam is a manager-owned record, not an ECS entity. Each fine step it
//! re-aims, advances its phase clock and, while active, sweeps for contacts
//! and resolves damage ticks through the resistance engine.

pub mod aiming;
pub mod collision;
pub mod lifecycle;

use glam::DVec3;
use hecs::{Entity, World};
use tracing::debug;

use broadside_core::components::{BeamSpec, WeaponMount};
use broadside_core::config::BeamConfig;
use broadside_core::enums::{BeamPhase, BeamType, CollisionMethod, SubsystemCategory, WeaponType};
use broadside_core::events::CombatEvent;
use broadside_core::types::Position;

use self::aiming::{update_aim, AimContext, AimState, AimUpdate};
use self::collision::{collision_method, sweep, BeamContact};
use self::lifecycle::BeamClock;
use crate::handle::entity_id;
use crate::resistance;
use crate::spatial::SpatialQuery;

#[derive(Debug, Clone)]
struct CachedContacts {
    at: f64,
    contacts: Vec<BeamContact>,
}

/// One firing beam.
#[derive(Debug, Clone)]
pub struct Beam {
    pub id: u32,
    pub owner: Entity,
    pub width: f64,
    pub range: f64,
    pub damage_per_tick: f64,
    pub mount_offset: DVec3,
    /// Distance to the tracked target when the method was last picked.
    pub engaged_range: f64,
    pub method: CollisionMethod,
    pub clock: BeamClock,
    pub aim: AimState,
    pub origin: DVec3,
    pub direction: DVec3,
    pub accumulated_damage: f64,
    pub penetration_count: usize,
    collision_cache: Option<CachedContacts>,
}

impl Beam {
    pub fn beam_type(&self) -> BeamType {
        self.aim.beam_type()
    }

    pub fn phase(&self) -> BeamPhase {
        self.clock.phase
    }
}

/// Owns every live beam.
#[derive(Debug, Default)]
pub struct BeamManager {
    beams: Vec<Beam>,
    next_id: u32,
}

impl BeamManager {
    pub fn len(&self) -> usize {
        self.beams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Beam> {
        self.beams.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Beam> {
        self.beams.iter().find(|b| b.id == id)
    }

    /// Start a beam in warmup. Returns its id.
    #[allow(clippy::too_many_arguments)]
    pub fn fire(
        &mut self,
        owner: Entity,
        mount: &WeaponMount,
        spec: BeamSpec,
        target: Option<(Entity, DVec3)>,
        origin: DVec3,
        heading: DVec3,
        config: &BeamConfig,
        events: &mut Vec<CombatEvent>,
    ) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let aim = AimState::initial(spec.beam_type, target, origin + heading);
        let direction = match target {
            Some((_, pos)) => (pos - origin).normalize_or_zero(),
            None => heading,
        };
        let engaged_range = target.map_or(mount.max_range, |(_, pos)| {
            pos.distance(origin).min(mount.max_range)
        });
        let method = collision_method(spec.width, engaged_range, config);

        let mut beam = Beam {
            id,
            owner,
            width: spec.width,
            range: mount.max_range,
            damage_per_tick: mount.damage,
            mount_offset: mount.offset,
            engaged_range,
            method,
            clock: BeamClock::default(),
            aim,
            origin,
            direction,
            accumulated_damage: 0.0,
            penetration_count: 0,
            collision_cache: None,
        };
        beam.clock.start(id, events);
        debug!(
            beam_id = id,
            owner = ?entity_id(owner),
            beam_type = ?spec.beam_type,
            ?method,
            "Beam fired"
        );
        self.beams.push(beam);
        id
    }

    /// Send a beam into warmdown. Unknown or finished ids are ignored.
    pub fn stop(&mut self, id: u32, events: &mut Vec<CombatEvent>) -> bool {
        match self.beams.iter_mut().find(|b| b.id == id) {
            Some(beam) => {
                beam.clock.stop(id, events);
                true
            }
            None => false,
        }
    }

    /// Drop tracked references to dead entities. Beams whose owner died stop.
    pub fn purge(&mut self, is_alive: impl Fn(Entity) -> bool, events: &mut Vec<CombatEvent>) {
        for beam in &mut self.beams {
            beam.aim.purge(&is_alive);
            if let Some(cache) = &mut beam.collision_cache {
                cache.contacts.retain(|c| is_alive(c.entity));
            }
            if !is_alive(beam.owner) {
                beam.clock.stop(beam.id, events);
            }
        }
    }

    /// Advance every beam by one fine step.
    #[allow(clippy::too_many_arguments)]
    pub fn step<S: SpatialQuery>(
        &mut self,
        world: &World,
        spatial: &S,
        now: f64,
        dt: f64,
        config: &BeamConfig,
        events: &mut Vec<CombatEvent>,
    ) {
        for beam in &mut self.beams {
            step_beam(beam, world, spatial, now, dt, config, events);
        }
        self.beams.retain(|b| !b.clock.is_finished());
    }
}

fn step_beam<S: SpatialQuery>(
    beam: &mut Beam,
    world: &World,
    spatial: &S,
    now: f64,
    dt: f64,
    config: &BeamConfig,
    events: &mut Vec<CombatEvent>,
) {
    // Step 1: Follow the owner
    if let Ok(pos) = world.get::<&Position>(beam.owner) {
        beam.origin = pos.0 + beam.mount_offset;
    }

    // Step 2: Aim
    if matches!(beam.clock.phase, BeamPhase::Warmup | BeamPhase::Active) {
        let ctx = AimContext {
            world,
            spatial,
            owner: beam.owner,
            origin: beam.origin,
            range: beam.range,
            config,
        };
        match update_aim(&mut beam.aim, &ctx, dt) {
            AimUpdate::Aim(direction) => beam.direction = direction,
            AimUpdate::Hold => {}
            AimUpdate::Exhausted => {
                debug!(beam_id = beam.id, "Beam lost its target");
                beam.clock.stop(beam.id, events);
            }
        }
    }

    // Step 3: Phase clock and damage
    let ticks = beam.clock.advance(dt, beam.id, config, events);
    if ticks == 0 || beam.clock.phase == BeamPhase::Inactive {
        return;
    }

    let contacts = match &beam.collision_cache {
        Some(cache) if now - cache.at < config.collision_cache_ttl => cache.contacts.clone(),
        _ => {
            refresh_method(beam, world, config);
            let contacts = sweep(
                world,
                spatial,
                beam.owner,
                beam.origin,
                beam.direction,
                beam.range,
                beam.width,
                beam.method,
                config.max_penetration,
            );
            beam.collision_cache = Some(CachedContacts {
                at: now,
                contacts: contacts.clone(),
            });
            contacts
        }
    };
    beam.penetration_count = beam.penetration_count.max(contacts.len());

    let raw = beam.damage_per_tick * f64::from(ticks);
    for contact in contacts {
        let Some(outcome) = resistance::compute(
            world,
            contact.entity,
            WeaponType::Beam,
            raw,
            SubsystemCategory::Standard,
        ) else {
            continue;
        };
        let target = entity_id(contact.entity);
        beam.accumulated_damage += outcome.applied;
        events.push(CombatEvent::BeamHit {
            beam_id: beam.id,
            target,
            damage: outcome.applied,
        });
        events.push(CombatEvent::DamageResolved {
            target,
            weapon: WeaponType::Beam,
            raw: outcome.raw,
            applied: outcome.applied,
            reduction: outcome.reduction,
            immunity: outcome.immunity,
        });
    }
}

/// Re-pick the collision method from the tracked target's current distance.
fn refresh_method(beam: &mut Beam, world: &World, config: &BeamConfig) {
    if let Some(pos) = beam
        .aim
        .tracked()
        .and_then(|t| world.get::<&Position>(t).ok().map(|p| p.0))
    {
        beam.engaged_range = pos.distance(beam.origin).min(beam.range);
    }
    let method = collision_method(beam.width, beam.engaged_range, config);
    if method != beam.method {
        debug!(
            beam_id = beam.id,
            from = ?beam.method,
            to = ?method,
            "Beam collision method changed"
        );
        beam.method = method;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadside_core::enums::{ShipClass, Team};
    use broadside_core::types::Velocity;

    use crate::spatial::WorldSpatial;
    use crate::world_setup::spawn_ship;

    fn setup() -> (World, Entity, Entity) {
        let mut world = World::new();
        let owner = spawn_ship(
            &mut world,
            Team::Alliance,
            ShipClass::Cruiser,
            Position::default(),
            Velocity::default(),
        );
        let target = spawn_ship(
            &mut world,
            Team::Pirates,
            ShipClass::Frigate,
            Position::new(0.0, 1000.0, 0.0),
            Velocity::default(),
        );
        (world, owner, target)
    }

    fn run(manager: &mut BeamManager, world: &World, seconds: f64, events: &mut Vec<CombatEvent>) {
        let config = BeamConfig::default();
        let steps = (seconds / 0.02).round() as usize;
        for i in 0..steps {
            manager.step(world, &WorldSpatial, i as f64 * 0.02, 0.02, &config, events);
        }
    }

    #[test]
    fn test_no_damage_during_warmup() {
        let (world, owner, target) = setup();
        let mut manager = BeamManager::default();
        let mut events = Vec::new();
        let mount = WeaponMount::beam(BeamType::PredictiveChase, 4.0);
        manager.fire(
            owner,
            &mount,
            mount.beam.unwrap(),
            Some((target, DVec3::new(0.0, 1000.0, 0.0))),
            DVec3::ZERO,
            DVec3::Y,
            &BeamConfig::default(),
            &mut events,
        );

        run(&mut manager, &world, 0.3, &mut events);
        assert!(!events.iter().any(|e| matches!(e, CombatEvent::BeamHit { .. })));

        run(&mut manager, &world, 1.0, &mut events);
        let hits = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::BeamHit { .. }))
            .count();
        assert!(hits >= 4, "hits = {hits}");
        assert!(manager.get(0).unwrap().accumulated_damage > 0.0);
    }

    #[test]
    fn test_beam_is_removed_after_warmdown() {
        let (world, owner, _target) = setup();
        let mut manager = BeamManager::default();
        let mut events = Vec::new();
        let mount = WeaponMount::beam(BeamType::TurretFixed, 1.0);
        let id = manager.fire(
            owner,
            &mount,
            mount.beam.unwrap(),
            None,
            DVec3::ZERO,
            DVec3::Y,
            &BeamConfig::default(),
            &mut events,
        );
        assert!(manager.stop(id, &mut events));
        run(&mut manager, &world, 0.5, &mut events);
        assert!(manager.is_empty());
        assert!(!manager.stop(id, &mut events));
    }

    #[test]
    fn test_collision_method_follows_target_distance() {
        let (mut world, owner, target) = setup();
        let mut manager = BeamManager::default();
        let mut events = Vec::new();
        let mount = WeaponMount::standard(WeaponType::Beam);
        let id = manager.fire(
            owner,
            &mount,
            mount.beam.unwrap(),
            Some((target, DVec3::new(0.0, 1000.0, 0.0))),
            DVec3::ZERO,
            DVec3::Y,
            &BeamConfig::default(),
            &mut events,
        );
        // Close target: the hybrid beam starts as a ray even though its reach is 3000
        assert_eq!(manager.get(id).unwrap().method, CollisionMethod::HybridRay);

        world.get::<&mut Position>(target).unwrap().0 = DVec3::new(0.0, 2000.0, 0.0);
        run(&mut manager, &world, 1.0, &mut events);
        let beam = manager.get(id).unwrap();
        assert_eq!(beam.method, CollisionMethod::HybridVolume);
        assert!((beam.engaged_range - 2000.0).abs() < 1e-6);
    }
}
