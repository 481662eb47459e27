//! Targeting system: periodic rescans, subsystem upkeep and aspect lock.

use std::collections::BTreeMap;

use broadside_core::components::Subsystems;
use broadside_core::events::CombatEvent;
use broadside_core::types::{EntityId, Heading, Position};

use crate::handle::entity_id;
use crate::spatial::SpatialQuery;
use crate::targeting::aspect_lock::screen_offset;
use crate::targeting::visibility::SensorContext;
use crate::targeting::{registry, subsystem, TargetingSession};

/// Run one tick of targeting for every session.
pub fn run<S: SpatialQuery>(
    sessions: &mut BTreeMap<EntityId, TargetingSession>,
    ctx: &mut SensorContext<'_, S>,
    dt: f64,
    events: &mut Vec<CombatEvent>,
) {
    let now = ctx.now;
    for session in sessions.values_mut() {
        let holder = session.holder;

        // Step 1: Rescan on cadence
        if now >= session.next_scan_at {
            session.candidates = registry::scan(ctx, holder, &session.filter);
            session.next_scan_at = now + ctx.config.targeting.rescan_interval;
        }

        // Step 2: Drop a subsystem selection that no longer exists
        if let (Some(target), Some(_)) = (session.target, session.subsystem) {
            let refreshed = ctx.world.get::<&Subsystems>(target).ok().and_then(|subs| {
                let ranked = subsystem::rank(&subs, session.subsystem_kinds.as_deref());
                subsystem::refresh(&ranked, session.subsystem)
            });
            session.subsystem = refreshed;
        }

        // Step 3: Aspect lock against the reticle
        let sample = session.target.and_then(|target| {
            let holder_pos = ctx.world.get::<&Position>(holder).ok()?.0;
            let forward = ctx
                .world
                .get::<&Heading>(holder)
                .map(|h| h.forward())
                .unwrap_or(Heading::FORWARD.0);
            let target_pos = ctx.world.get::<&Position>(target).ok()?.0;
            screen_offset(holder_pos, forward, target_pos, ctx.config.lock.fov_half_angle)
        });
        session.lock.update(
            entity_id(holder),
            session.target.is_some(),
            sample,
            dt,
            &ctx.config.lock,
            events,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadside_core::config::CombatConfig;
    use broadside_core::enums::{LockPhase, ShipClass, Team};
    use broadside_core::types::Velocity;
    use hecs::World;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::area::emp::DisruptionMap;
    use crate::spatial::WorldSpatial;
    use crate::targeting::visibility::VisibilityValidator;
    use crate::targeting::TargetFilter;
    use crate::world_setup::spawn_ship;

    #[test]
    fn test_rescan_cadence_and_lock_build() {
        let mut world = World::new();
        let holder = spawn_ship(
            &mut world,
            Team::Alliance,
            ShipClass::Fighter,
            Position::default(),
            Velocity::default(),
        );
        let target = spawn_ship(
            &mut world,
            Team::Pirates,
            ShipClass::Fighter,
            Position::new(0.0, 800.0, 0.0),
            Velocity::default(),
        );

        let config = CombatConfig::default();
        let mut validator = VisibilityValidator::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sessions = BTreeMap::new();
        let mut session = TargetingSession::new(holder, TargetFilter::default());
        let mut events = Vec::new();
        session.set_target(target, &mut events);
        sessions.insert(entity_id(holder), session);

        let dt = 0.1;
        let mut now = 0.0;
        for _ in 0..40 {
            let mut ctx = SensorContext {
                world: &world,
                spatial: &WorldSpatial,
                validator: &mut validator,
                rng: &mut rng,
                config: &config,
                disruptions: &DisruptionMap::new(),
                now,
            };
            run(&mut sessions, &mut ctx, dt, &mut events);
            now += dt;
        }

        let session = &sessions[&entity_id(holder)];
        assert_eq!(session.candidates, vec![target]);
        assert!(session.next_scan_at > now - config.targeting.rescan_interval - 1e-9);
        // Dead ahead for 4 s: well past build time and minimum lock time
        assert_eq!(session.lock.phase, LockPhase::Locked);
        assert!(events.iter().any(|e| matches!(e, CombatEvent::LockCueStarted { .. })));
    }
}
