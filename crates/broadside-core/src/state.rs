//! Snapshot types handed to the presentation layer.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::EntityId;

/// Complete read-only view of the targeting core after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub tick: u64,
    pub elapsed_secs: f64,
    pub sessions: Vec<SessionView>,
    pub beams: Vec<BeamView>,
    pub swarms: Vec<SwarmView>,
    pub area_effects: Vec<AreaEffectView>,
    pub disruptions: Vec<DisruptionView>,
}

/// One weapon holder's targeting state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub holder: EntityId,
    pub target: Option<EntityId>,
    pub subsystem_id: Option<u32>,
    pub lock_phase: LockPhase,
    pub lock_progress: f64,
    pub candidates: usize,
    pub threat_level: ThreatLevel,
    /// Strongest threats first.
    pub top_threats: Vec<(EntityId, f64)>,
    pub threat_aggregate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamView {
    pub id: u32,
    pub owner: EntityId,
    pub beam_type: BeamType,
    pub phase: BeamPhase,
    pub origin: DVec3,
    pub direction: DVec3,
    pub accumulated_damage: f64,
    pub penetration_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmView {
    pub id: u32,
    pub owner: EntityId,
    pub launched: u32,
    pub total: u32,
    pub missiles: Vec<MissileView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissileView {
    pub index: u32,
    pub position: DVec3,
    pub phase: SwarmMissilePhase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaEffectView {
    pub id: u32,
    pub kind: AreaEffectKind,
    pub center: DVec3,
    pub radius: f64,
    pub remaining_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisruptionView {
    pub target: EntityId,
    pub channel: DisruptionChannel,
    pub level: f64,
    pub remaining_secs: f64,
}
