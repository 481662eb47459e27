//! Snapshot system: builds a `CombatSnapshot` from the engine's managers.
//!
//! Read-only. Every list is ordered by id so equal states serialize equally.

use std::collections::BTreeMap;

use broadside_core::state::*;
use broadside_core::types::{EntityId, SimClock};

use crate::area::AreaEffects;
use crate::beams::BeamManager;
use crate::handle::entity_id;
use crate::swarm::SwarmManager;
use crate::targeting::TargetingSession;

/// Build a complete snapshot of the targeting core.
pub fn build_snapshot(
    clock: &SimClock,
    sessions: &BTreeMap<EntityId, TargetingSession>,
    beams: &BeamManager,
    swarms: &SwarmManager,
    area: &AreaEffects,
) -> CombatSnapshot {
    CombatSnapshot {
        tick: clock.tick,
        elapsed_secs: clock.elapsed_secs,
        sessions: build_sessions(sessions),
        beams: build_beams(beams),
        swarms: build_swarms(swarms),
        area_effects: area.views(),
        disruptions: area.disruption_views(),
    }
}

fn build_sessions(sessions: &BTreeMap<EntityId, TargetingSession>) -> Vec<SessionView> {
    sessions
        .iter()
        .map(|(&holder, s)| SessionView {
            holder,
            target: s.target.map(entity_id),
            subsystem_id: s.subsystem,
            lock_phase: s.lock.phase,
            lock_progress: s.lock.progress,
            candidates: s.candidates.len(),
            threat_level: s.threat_level,
            top_threats: s.top_threats.clone(),
            threat_aggregate: s.threat_aggregate,
        })
        .collect()
}

fn build_beams(beams: &BeamManager) -> Vec<BeamView> {
    let mut views: Vec<BeamView> = beams
        .iter()
        .map(|b| BeamView {
            id: b.id,
            owner: entity_id(b.owner),
            beam_type: b.beam_type(),
            phase: b.phase(),
            origin: b.origin,
            direction: b.direction,
            accumulated_damage: b.accumulated_damage,
            penetration_count: b.penetration_count,
        })
        .collect();
    views.sort_by_key(|v| v.id);
    views
}

fn build_swarms(swarms: &SwarmManager) -> Vec<SwarmView> {
    let mut views: Vec<SwarmView> = swarms
        .iter()
        .map(|s| SwarmView {
            id: s.id,
            owner: entity_id(s.owner),
            launched: s.launched,
            total: s.total,
            missiles: s
                .missiles
                .iter()
                .map(|m| MissileView {
                    index: m.index,
                    position: m.position,
                    phase: m.phase,
                })
                .collect(),
        })
        .collect();
    views.sort_by_key(|v| v.id);
    views
}
