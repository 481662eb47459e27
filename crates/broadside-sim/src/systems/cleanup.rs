//! Cleanup system: purges references to despawned entities.
//!
//! The host despawns ships directly through `world_mut()`. Within one tick
//! every session, cache and manager forgets them.

use std::collections::BTreeMap;

use hecs::{Entity, World};
use tracing::debug;

use broadside_core::enums::TargetLostReason;
use broadside_core::events::CombatEvent;
use broadside_core::types::EntityId;

use crate::area::AreaEffects;
use crate::beams::BeamManager;
use crate::intercept::SolutionCache;
use crate::swarm::SwarmManager;
use crate::targeting::visibility::VisibilityValidator;
use crate::targeting::TargetingSession;

use super::priority::PriorityCache;

/// Purge dead references from every session, cache and manager.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &World,
    sessions: &mut BTreeMap<EntityId, TargetingSession>,
    validator: &mut VisibilityValidator,
    solutions: &mut SolutionCache,
    priority: &mut PriorityCache,
    beams: &mut BeamManager,
    swarms: &mut SwarmManager,
    area: &mut AreaEffects,
    events: &mut Vec<CombatEvent>,
) {
    let is_alive = |e: Entity| world.contains(e);

    // Step 1: Sessions whose holder died go away entirely
    sessions.retain(|id, session| {
        let alive = is_alive(session.holder);
        if !alive {
            debug!(holder = ?id, "Holder despawned, dropping session");
        }
        alive
    });

    // Step 2: Surviving sessions lose dead targets, hotkeys and candidates
    for session in sessions.values_mut() {
        if session.purge(is_alive) {
            session.clear_target(TargetLostReason::Invalidated, events);
        }
    }

    // Step 3: Caches and managers
    validator.purge(is_alive);
    solutions.purge(is_alive);
    priority.purge(is_alive);
    beams.purge(is_alive, events);
    swarms.purge(is_alive);
    area.purge(is_alive);
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadside_core::enums::{ShipClass, Team};
    use broadside_core::types::{Position, Velocity};

    use crate::handle::entity_id;
    use crate::targeting::TargetFilter;
    use crate::world_setup::spawn_ship;

    #[test]
    fn test_dead_target_is_cleared_everywhere() {
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
            Position::new(0.0, 500.0, 0.0),
            Velocity::default(),
        );

        let mut events = Vec::new();
        let mut session = TargetingSession::new(holder, TargetFilter::default());
        session.candidates = vec![target];
        session.set_target(target, &mut events);
        session.assign_hotkey(3).unwrap();
        let mut sessions = BTreeMap::from([(entity_id(holder), session)]);

        world.despawn(target).unwrap();
        events.clear();
        run(
            &world,
            &mut sessions,
            &mut VisibilityValidator::default(),
            &mut SolutionCache::default(),
            &mut PriorityCache::default(),
            &mut BeamManager::default(),
            &mut SwarmManager::default(),
            &mut AreaEffects::default(),
            &mut events,
        );

        let session = &sessions[&entity_id(holder)];
        assert_eq!(session.target, None);
        assert!(session.candidates.is_empty());
        assert!(session.hotkeys.iter().all(Option::is_none));
        assert!(events.contains(&CombatEvent::TargetLost {
            holder: entity_id(holder),
            target: entity_id(target),
            reason: TargetLostReason::Invalidated,
        }));
    }

    #[test]
    fn test_dead_holder_drops_session() {
        let mut world = World::new();
        let holder = spawn_ship(
            &mut world,
            Team::Alliance,
            ShipClass::Fighter,
            Position::default(),
            Velocity::default(),
        );
        let mut sessions = BTreeMap::from([(
            entity_id(holder),
            TargetingSession::new(holder, TargetFilter::default()),
        )]);
        world.despawn(holder).unwrap();

        let mut events = Vec::new();
        run(
            &world,
            &mut sessions,
            &mut VisibilityValidator::default(),
            &mut SolutionCache::default(),
            &mut PriorityCache::default(),
            &mut BeamManager::default(),
            &mut SwarmManager::default(),
            &mut AreaEffects::default(),
            &mut events,
        );
        assert!(sessions.is_empty());
    }
}
