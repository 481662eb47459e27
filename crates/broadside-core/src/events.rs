//! Events emitted by the targeting core for presentation and gameplay layers.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::EntityId;

/// Everything observable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    // --- Targeting ---
    TargetAcquired {
        holder: EntityId,
        target: EntityId,
    },
    TargetLost {
        holder: EntityId,
        target: EntityId,
        reason: TargetLostReason,
    },
    SubsystemSelected {
        holder: EntityId,
        target: EntityId,
        subsystem_id: u32,
    },

    // --- Aspect lock ---
    LockPhaseChanged {
        holder: EntityId,
        phase: LockPhase,
    },
    LockProgress {
        holder: EntityId,
        progress: f64,
    },
    LockCueStarted {
        holder: EntityId,
    },
    LockCueStopped {
        holder: EntityId,
    },

    // --- AI ---
    ThreatLevelChanged {
        holder: EntityId,
        level: ThreatLevel,
    },

    // --- Weapons ---
    WeaponFired {
        holder: EntityId,
        weapon: WeaponType,
        target: Option<EntityId>,
        aim_point: DVec3,
    },
    DamageResolved {
        target: EntityId,
        weapon: WeaponType,
        raw: f64,
        applied: f64,
        reduction: f64,
        immunity: Option<ImmunityCondition>,
    },

    // --- Beams ---
    BeamPhaseChanged {
        beam_id: u32,
        phase: BeamPhase,
    },
    BeamHit {
        beam_id: u32,
        target: EntityId,
        damage: f64,
    },

    // --- Swarms ---
    SwarmMissileFired {
        swarm_id: u32,
        missile_index: u32,
    },
    SwarmFormationComplete {
        swarm_id: u32,
    },
    SwarmMissileDetached {
        swarm_id: u32,
        missile_index: u32,
        reason: MissileDetachReason,
    },

    // --- Area effects ---
    EmpDetonated {
        effect_id: u32,
        origin: DVec3,
        affected: u32,
    },
    ChannelDisrupted {
        target: EntityId,
        channel: DisruptionChannel,
        level: f64,
        duration: f64,
    },
    ChannelRestored {
        target: EntityId,
        channel: DisruptionChannel,
    },
    FlakDetonated {
        effect_id: u32,
        point: DVec3,
        hits: u32,
    },
    BarrierExpired {
        effect_id: u32,
    },
}
