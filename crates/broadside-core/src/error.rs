//! Error types for configuration, fire requests, and targeting commands.

use thiserror::Error;

use crate::enums::{SolveFailure, WeaponType};
use crate::types::EntityId;

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON was malformed or had the wrong shape.
    #[error("Failed to parse combat config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value was out of its allowed range.
    #[error("Invalid config value '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: &'static str) -> Self {
        ConfigError::Invalid { field, reason }
    }
}

/// A fire request was rejected. Nothing was spawned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FireError {
    #[error("Holder {0:?} is not registered or no longer exists")]
    UnknownHolder(EntityId),

    #[error("Holder has no weapon mount {0}")]
    UnknownMount(usize),

    #[error("{0:?} requires a target")]
    NoTarget(WeaponType),

    #[error("Target {0:?} is out of range or not detectable")]
    TargetNotVisible(EntityId),

    #[error("Target {0:?} is obstructed")]
    NoLineOfSight(EntityId),

    #[error("No firing solution: {0:?}")]
    NoSolution(SolveFailure),

    #[error("Target {0:?} is beyond the weapon's reach")]
    OutOfWeaponRange(EntityId),

    #[error("Missile launch requires an aspect lock")]
    LockRequired,

    #[error("Weapons are disrupted by an EMP")]
    WeaponsDisrupted,

    #[error("Capacity reached for {kind} ({limit})")]
    CapacityReached { kind: &'static str, limit: usize },
}

/// A targeting command could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetingError {
    #[error("Holder {0:?} is not registered")]
    UnknownHolder(EntityId),

    #[error("Hotkey slot {0} is outside 1..=12")]
    InvalidHotkeySlot(usize),

    #[error("No current target")]
    NoTarget,
}
