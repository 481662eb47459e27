//! Per-holder targeting state and the managers that drive it.

pub mod aspect_lock;
pub mod registry;
pub mod subsystem;
pub mod visibility;

use hecs::Entity;
use serde::{Deserialize, Serialize};

use broadside_core::constants::HOTKEY_SLOTS;
use broadside_core::enums::{ShipClass, SubsystemKind, TeamFilter, ThreatLevel};
use broadside_core::types::EntityId;

use self::aspect_lock::AspectLock;
use crate::handle::entity_from_id;

/// Which contacts a holder's scans admit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetFilter {
    pub team: TeamFilter,
    pub exclude_stealth: bool,
    pub exclude_cargo: bool,
    /// Smallest hull class admitted.
    pub min_class: Option<ShipClass>,
    pub require_line_of_sight: bool,
    /// Scan radius override. Defaults to the holder's effective sensor range.
    pub scan_range: Option<f64>,
}

impl Default for TargetFilter {
    fn default() -> Self {
        Self {
            team: TeamFilter::Hostile,
            exclude_stealth: false,
            exclude_cargo: false,
            min_class: None,
            require_line_of_sight: false,
            scan_range: None,
        }
    }
}

/// Targeting session of one weapon holder.
#[derive(Debug, Clone)]
pub struct TargetingSession {
    pub holder: Entity,
    pub filter: TargetFilter,
    pub target: Option<Entity>,
    /// Selected subsystem id on `target`.
    pub subsystem: Option<u32>,
    /// Subsystem kinds considered when ranking, `None` for all.
    pub subsystem_kinds: Option<Vec<SubsystemKind>>,
    pub lock: AspectLock,
    pub cycle_index: usize,
    /// Slots 1..=12 stored at indices 0..12.
    pub hotkeys: [Option<Entity>; HOTKEY_SLOTS],
    /// Priority-ordered result of the last scan.
    pub candidates: Vec<Entity>,
    pub next_scan_at: f64,
    pub threat_level: ThreatLevel,
    /// Highest threats from the last reassessment, strongest first.
    pub top_threats: Vec<(EntityId, f64)>,
    pub threat_aggregate: f64,
    pub next_reassess_at: f64,
}

impl TargetingSession {
    pub fn new(holder: Entity, filter: TargetFilter) -> Self {
        Self {
            holder,
            filter,
            target: None,
            subsystem: None,
            subsystem_kinds: None,
            lock: AspectLock::default(),
            cycle_index: 0,
            hotkeys: [None; HOTKEY_SLOTS],
            candidates: Vec::new(),
            next_scan_at: 0.0,
            threat_level: ThreatLevel::None,
            top_threats: Vec::new(),
            threat_aggregate: 0.0,
            next_reassess_at: 0.0,
        }
    }

    /// Forget every reference to a dead entity.
    ///
    /// Returns true if the current target was among them.
    pub fn purge(&mut self, is_alive: impl Fn(Entity) -> bool) -> bool {
        self.candidates.retain(|e| is_alive(*e));
        self.top_threats
            .retain(|(id, _)| entity_from_id(*id).is_some_and(&is_alive));
        for slot in self.hotkeys.iter_mut() {
            if slot.is_some_and(|e| !is_alive(e)) {
                *slot = None;
            }
        }
        self.target.is_some_and(|e| !is_alive(e))
    }
}
