//! Subsystem targeting on the current target.
//!
//! Functional subsystems are ranked by a fixed scoring table; every selection
//! operation works over that ranking.

use broadside_core::components::{Subsystem, Subsystems};
use broadside_core::constants::*;
use broadside_core::enums::{SubsystemCategory, SubsystemKind};

/// A subsystem with its priority score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSubsystem {
    pub id: u32,
    pub name: String,
    pub kind: SubsystemKind,
    pub category: SubsystemCategory,
    pub score: f64,
}

/// Targeting value of a subsystem kind.
pub fn kind_weight(kind: SubsystemKind) -> f64 {
    match kind {
        SubsystemKind::Engine => 40.0,
        SubsystemKind::Weapons => 35.0,
        SubsystemKind::Sensors => 30.0,
        SubsystemKind::Shields => 25.0,
        SubsystemKind::Comms => 15.0,
        SubsystemKind::Reactor | SubsystemKind::Other => 5.0,
    }
}

pub fn score_subsystem(subsystem: &Subsystem) -> f64 {
    let mut score = kind_weight(subsystem.kind);
    if subsystem.critical {
        score += SUBSYSTEM_CRITICAL_BONUS;
    }
    let health = subsystem.health.clamp(0.0, 1.0);
    if health < SUBSYSTEM_LOW_HEALTH_THRESHOLD {
        score += SUBSYSTEM_LOW_HEALTH_BONUS * (1.0 - health);
    }
    if subsystem.category == SubsystemCategory::Turret && subsystem.turret_active {
        score += SUBSYSTEM_TURRET_THREAT_BONUS;
    }
    score
}

/// Functional subsystems, optionally limited to `kinds`, best first.
/// Ties keep ascending id order.
pub fn rank(subsystems: &Subsystems, kinds: Option<&[SubsystemKind]>) -> Vec<RankedSubsystem> {
    let mut ranked: Vec<RankedSubsystem> = subsystems
        .list
        .iter()
        .filter(|s| s.functional)
        .filter(|s| kinds.map_or(true, |k| k.contains(&s.kind)))
        .map(|s| RankedSubsystem {
            id: s.id,
            name: s.name.clone(),
            kind: s.kind,
            category: s.category,
            score: score_subsystem(s),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
    ranked
}

/// Step through the ranking. Starts from the top when nothing valid is selected.
pub fn cycle(ranked: &[RankedSubsystem], current: Option<u32>, forward: bool) -> Option<u32> {
    if ranked.is_empty() {
        return None;
    }
    let n = ranked.len();
    let next = match current.and_then(|id| ranked.iter().position(|r| r.id == id)) {
        Some(i) if forward => (i + 1) % n,
        Some(i) => (i + n - 1) % n,
        None => 0,
    };
    Some(ranked[next].id)
}

/// Best subsystem of a kind.
pub fn select_kind(ranked: &[RankedSubsystem], kind: SubsystemKind) -> Option<u32> {
    ranked.iter().find(|r| r.kind == kind).map(|r| r.id)
}

/// Subsystem by name, ignoring case.
pub fn select_name(ranked: &[RankedSubsystem], name: &str) -> Option<u32> {
    ranked
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(name))
        .map(|r| r.id)
}

/// Highest-priority subsystem.
pub fn select_priority(ranked: &[RankedSubsystem]) -> Option<u32> {
    ranked.first().map(|r| r.id)
}

/// Keep the current selection only if it is still ranked.
pub fn refresh(ranked: &[RankedSubsystem], current: Option<u32>) -> Option<u32> {
    current.filter(|id| ranked.iter().any(|r| r.id == *id))
}

/// Category of a subsystem by id, for hit-location resistance.
pub fn category_of(subsystems: &Subsystems, id: u32) -> Option<SubsystemCategory> {
    subsystems.list.iter().find(|s| s.id == id).map(|s| s.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loadout() -> Subsystems {
        Subsystems {
            list: vec![
                Subsystem::new(1, "Engine", SubsystemKind::Engine),
                Subsystem {
                    critical: true,
                    ..Subsystem::new(2, "Reactor", SubsystemKind::Reactor)
                },
                Subsystem {
                    health: 0.1,
                    ..Subsystem::new(3, "Comms", SubsystemKind::Comms)
                },
                Subsystem {
                    category: SubsystemCategory::Turret,
                    turret_active: true,
                    ..Subsystem::new(4, "Turret", SubsystemKind::Weapons)
                },
                Subsystem {
                    functional: false,
                    ..Subsystem::new(5, "Sensors", SubsystemKind::Sensors)
                },
            ],
        }
    }

    #[test]
    fn test_ranking_order() {
        let ranked = rank(&loadout(), None);
        let ids: Vec<u32> = ranked.iter().map(|r| r.id).collect();
        // Reactor 55, Turret 50, Engine 40, Comms 15 + 18 = 33; sensors are down
        assert_eq!(ids, vec![2, 4, 1, 3]);
        assert!((ranked[3].score - 33.0).abs() < 1e-9);
    }

    #[test]
    fn test_kind_filter() {
        let ranked = rank(&loadout(), Some(&[SubsystemKind::Engine, SubsystemKind::Comms]));
        let ids: Vec<u32> = ranked.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_cycle_wraps_both_ways() {
        let ranked = rank(&loadout(), None);
        assert_eq!(cycle(&ranked, None, true), Some(2));
        assert_eq!(cycle(&ranked, Some(3), true), Some(2));
        assert_eq!(cycle(&ranked, Some(2), false), Some(3));
        assert_eq!(cycle(&[], Some(2), true), None);
    }

    #[test]
    fn test_selection_helpers() {
        let ranked = rank(&loadout(), None);
        assert_eq!(select_kind(&ranked, SubsystemKind::Weapons), Some(4));
        assert_eq!(select_kind(&ranked, SubsystemKind::Sensors), None);
        assert_eq!(select_name(&ranked, "engine"), Some(1));
        assert_eq!(select_priority(&ranked), Some(2));
        assert_eq!(refresh(&ranked, Some(5)), None);
        assert_eq!(refresh(&ranked, Some(4)), Some(4));
    }
}
