//! Target registry: scanning, filtering, selection, cycling, hotkeys.

use hecs::Entity;
use tracing::debug;

use broadside_core::components::{Cargo, Hull, Stealth};
use broadside_core::constants::HOTKEY_SLOTS;
use broadside_core::enums::{Team, TargetLostReason};
use broadside_core::error::TargetingError;
use broadside_core::events::CombatEvent;
use broadside_core::types::Position;

use super::visibility::SensorContext;
use super::{TargetFilter, TargetingSession};
use crate::handle::entity_id;
use crate::spatial::SpatialQuery;

/// Whether `candidate` passes `holder`'s filter right now.
pub fn accepts<S: SpatialQuery>(
    ctx: &mut SensorContext<'_, S>,
    holder: Entity,
    candidate: Entity,
    filter: &TargetFilter,
) -> bool {
    if candidate == holder || !ctx.world.contains(candidate) {
        return false;
    }

    // Step 1: Static filters
    let holder_team = ctx.world.get::<&Team>(holder).map(|t| *t).unwrap_or_default();
    let Ok(candidate_team) = ctx.world.get::<&Team>(candidate).map(|t| *t) else {
        return false;
    };
    if !filter.team.admits(holder_team, candidate_team) {
        return false;
    }
    if filter.exclude_cargo && ctx.world.get::<&Cargo>(candidate).is_ok() {
        return false;
    }
    if filter.exclude_stealth
        && ctx
            .world
            .get::<&Stealth>(candidate)
            .is_ok_and(|s| s.engaged)
    {
        return false;
    }
    if let Some(min_class) = filter.min_class {
        let big_enough = ctx
            .world
            .get::<&Hull>(candidate)
            .is_ok_and(|h| h.class >= min_class);
        if !big_enough {
            return false;
        }
    }

    // Step 2: Sensors
    let Some(report) = ctx.validate(holder, candidate) else {
        return false;
    };
    if let Some(limit) = filter.scan_range {
        if report.distance > limit {
            return false;
        }
    }
    report.detectable && (!filter.require_line_of_sight || report.line_of_sight)
}

/// Scan for candidates, ordered hostiles first, then by distance, then by id.
pub fn scan<S: SpatialQuery>(
    ctx: &mut SensorContext<'_, S>,
    holder: Entity,
    filter: &TargetFilter,
) -> Vec<Entity> {
    let Ok(holder_pos) = ctx.world.get::<&Position>(holder).map(|p| *p) else {
        return Vec::new();
    };
    let holder_team = ctx.world.get::<&Team>(holder).map(|t| *t).unwrap_or_default();
    let Some(range) = filter.scan_range.or_else(|| ctx.effective_range(holder)) else {
        return Vec::new();
    };

    let nearby = ctx.spatial.find_in_radius(ctx.world, holder_pos.0, range);
    let mut ranked: Vec<(bool, f64, u64, Entity)> = Vec::with_capacity(nearby.len());
    for candidate in nearby {
        if !accepts(ctx, holder, candidate, filter) {
            continue;
        }
        let Ok(pos) = ctx.world.get::<&Position>(candidate).map(|p| *p) else {
            continue;
        };
        let hostile = ctx
            .world
            .get::<&Team>(candidate)
            .is_ok_and(|t| holder_team.is_hostile_to(*t));
        ranked.push((
            !hostile,
            holder_pos.range_to(&pos),
            entity_id(candidate).0,
            candidate,
        ));
    }

    ranked.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });
    ranked.into_iter().map(|(_, _, _, e)| e).collect()
}

impl TargetingSession {
    /// Select an already-validated target.
    pub fn set_target(&mut self, target: Entity, events: &mut Vec<CombatEvent>) {
        if self.target == Some(target) {
            return;
        }
        let holder = entity_id(self.holder);
        if let Some(old) = self.target {
            events.push(CombatEvent::TargetLost {
                holder,
                target: entity_id(old),
                reason: TargetLostReason::Replaced,
            });
        }
        self.target = Some(target);
        self.subsystem = None;
        self.lock.clear(holder, events);
        if let Some(i) = self.candidates.iter().position(|c| *c == target) {
            self.cycle_index = i;
        }
        debug!(?holder, target = ?entity_id(target), "Target acquired");
        events.push(CombatEvent::TargetAcquired {
            holder,
            target: entity_id(target),
        });
    }

    /// Drop the current target. Always succeeds.
    pub fn clear_target(&mut self, reason: TargetLostReason, events: &mut Vec<CombatEvent>) {
        let holder = entity_id(self.holder);
        if let Some(old) = self.target.take() {
            debug!(?holder, target = ?entity_id(old), ?reason, "Target lost");
            events.push(CombatEvent::TargetLost {
                holder,
                target: entity_id(old),
                reason,
            });
        }
        self.subsystem = None;
        self.lock.clear(holder, events);
    }

    /// Step through the last scan result. Returns false on an empty list.
    pub fn cycle(&mut self, forward: bool, events: &mut Vec<CombatEvent>) -> bool {
        let n = self.candidates.len();
        if n == 0 {
            return false;
        }
        let position = self
            .target
            .and_then(|t| self.candidates.iter().position(|c| *c == t));
        let index = match position {
            Some(i) if forward => (i + 1) % n,
            Some(i) => (i + n - 1) % n,
            None => 0,
        };
        self.cycle_index = index;
        let next = self.candidates[index];
        self.set_target(next, events);
        true
    }

    /// Remember the current target in `slot` (1..=12).
    pub fn assign_hotkey(&mut self, slot: usize) -> Result<(), TargetingError> {
        let index = slot_index(slot)?;
        let target = self.target.ok_or(TargetingError::NoTarget)?;
        self.hotkeys[index] = Some(target);
        Ok(())
    }

    /// Recall `slot`. `is_valid` re-checks the stored target; a stale slot is
    /// emptied and recall returns `Ok(false)`.
    pub fn recall_hotkey(
        &mut self,
        slot: usize,
        is_valid: impl FnOnce(Entity) -> bool,
        events: &mut Vec<CombatEvent>,
    ) -> Result<bool, TargetingError> {
        let index = slot_index(slot)?;
        let Some(stored) = self.hotkeys[index] else {
            return Ok(false);
        };
        if !is_valid(stored) {
            self.hotkeys[index] = None;
            return Ok(false);
        }
        self.set_target(stored, events);
        Ok(true)
    }
}

fn slot_index(slot: usize) -> Result<usize, TargetingError> {
    if (1..=HOTKEY_SLOTS).contains(&slot) {
        Ok(slot - 1)
    } else {
        Err(TargetingError::InvalidHotkeySlot(slot))
    }
}
