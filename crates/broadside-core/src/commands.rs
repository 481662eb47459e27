//! Targeting commands sent from the input layer.
//!
//! Commands are queued and applied at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::SubsystemKind;
use crate::types::EntityId;

/// All targeting actions a pilot can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TargetingCommand {
    // --- Target selection ---
    SetTarget { holder: EntityId, target: EntityId },
    ClearTarget { holder: EntityId },
    CycleNext { holder: EntityId },
    CyclePrevious { holder: EntityId },

    // --- Hotkeys ---
    /// Remember the current target in slot 1..=12.
    AssignHotkey { holder: EntityId, slot: usize },
    RecallHotkey { holder: EntityId, slot: usize },

    // --- Subsystems ---
    CycleSubsystem { holder: EntityId, forward: bool },
    SelectSubsystemKind { holder: EntityId, kind: SubsystemKind },
    SelectSubsystemName { holder: EntityId, name: String },
    SelectPrioritySubsystem { holder: EntityId },
    ClearSubsystem { holder: EntityId },

    // --- Cancellation ---
    ForceClearLock { holder: EntityId },
    StopBeam { beam_id: u32 },
}
