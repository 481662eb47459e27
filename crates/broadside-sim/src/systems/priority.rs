//! AI target priority: cached scoring, threat reassessment, auto-targeting.
//!
//! Each AI holder reassesses on its profile's cadence. Scores for a
//! (holder, target) pair are reused for a short window of simulated time.

use std::collections::{BTreeMap, HashMap};

use hecs::{Entity, World};
use tracing::{debug, info, trace};

use broadside_ai::scoring::{score, select_best, ScoreBreakdown, ScoreContext};
use broadside_ai::threat::{assess, ThreatContact};
use broadside_ai::profiles::get_params;
use broadside_core::components::*;
use broadside_core::config::{EmpConfig, PriorityConfig};
use broadside_core::enums::{DisruptionChannel, SubsystemKind, Team};
use broadside_core::events::CombatEvent;
use broadside_core::types::{EntityId, Position, Velocity};

use crate::area::emp::{channel_level, DisruptionMap};
use crate::handle::entity_id;
use crate::resistance::average_health;
use crate::targeting::TargetingSession;

#[derive(Debug, Clone, Copy)]
struct CachedScore {
    breakdown: ScoreBreakdown,
    scored_at: f64,
}

/// Recent score breakdowns per (holder, target).
#[derive(Debug, Default)]
pub struct PriorityCache {
    entries: HashMap<(Entity, Entity), CachedScore>,
}

impl PriorityCache {
    pub fn get(
        &self,
        holder: Entity,
        target: Entity,
        now: f64,
        ttl: f64,
    ) -> Option<ScoreBreakdown> {
        self.entries
            .get(&(holder, target))
            .filter(|c| now - c.scored_at < ttl)
            .map(|c| c.breakdown)
    }

    pub fn insert(&mut self, holder: Entity, target: Entity, breakdown: ScoreBreakdown, now: f64) {
        self.entries.insert(
            (holder, target),
            CachedScore {
                breakdown,
                scored_at: now,
            },
        );
    }

    pub fn prune(&mut self, now: f64, ttl: f64) {
        self.entries.retain(|_, c| now - c.scored_at < ttl);
    }

    pub fn purge(&mut self, is_alive: impl Fn(Entity) -> bool) {
        self.entries
            .retain(|(holder, target), _| is_alive(*holder) && is_alive(*target));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Who every holder is currently aiming at.
pub type TargetBoard = Vec<(Entity, Option<Entity>)>;

pub fn target_board(sessions: &BTreeMap<EntityId, TargetingSession>) -> TargetBoard {
    sessions.values().map(|s| (s.holder, s.target)).collect()
}

/// Build the scoring context for `holder` aiming `mount` at `target`.
pub fn score_context(
    world: &World,
    board: &TargetBoard,
    holder: Entity,
    target: Entity,
    mount: &WeaponMount,
    profile: broadside_core::enums::BehaviorProfile,
) -> Option<ScoreContext> {
    let holder_pos = world.get::<&Position>(holder).ok()?.0;
    let holder_team = world.get::<&Team>(holder).map(|t| *t).unwrap_or_default();
    let target_pos = world.get::<&Position>(target).ok()?.0;
    let hull = *world.get::<&Hull>(target).ok()?;

    let target_speed = world
        .get::<&Velocity>(target)
        .map(|v| v.speed())
        .unwrap_or(0.0);
    let shield_fraction = world
        .get::<&Shields>(target)
        .map(|s| s.fraction())
        .unwrap_or(0.0);
    let (weapon_readiness, critical_damage) = match world.get::<&Subsystems>(target) {
        Ok(subs) => (
            average_health(&subs, SubsystemKind::Weapons).unwrap_or(1.0),
            subs.list
                .iter()
                .any(|s| s.critical && (!s.functional || s.health <= 0.0)),
        ),
        Err(_) => (1.0, false),
    };

    // Step 1: Read the board for who aims at whom
    let target_aim = board
        .iter()
        .find(|(h, _)| *h == target)
        .and_then(|(_, t)| *t);
    let targeting_us = target_aim == Some(holder);
    let threatens_formation = target_aim.is_some_and(|victim| {
        victim != holder
            && world
                .get::<&Team>(victim)
                .is_ok_and(|t| t.is_friendly_to(holder_team))
    });
    let focus_fire = board
        .iter()
        .filter(|(h, t)| {
            *h != holder
                && *t == Some(target)
                && world
                    .get::<&Team>(*h)
                    .is_ok_and(|team| team.is_friendly_to(holder_team))
        })
        .count() as u32;

    Some(ScoreContext {
        profile,
        weapon: mount.weapon,
        distance: holder_pos.distance(target_pos),
        optimal_range: mount.optimal_range,
        max_range: mount.max_range,
        target_class: hull.class,
        target_speed,
        targeting_us,
        weapon_readiness,
        hull_fraction: hull.fraction(),
        shield_fraction,
        critical_damage,
        focus_fire,
        threatens_formation,
        objective: world.get::<&Objective>(target).is_ok(),
    })
}

/// Reassess every AI holder whose cadence is due.
///
/// AI-channel disruption stretches the cadence; at the lockout level the
/// holder skips the pass and keeps its previous picture.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &World,
    sessions: &mut BTreeMap<EntityId, TargetingSession>,
    cache: &mut PriorityCache,
    now: f64,
    config: &PriorityConfig,
    disruptions: &DisruptionMap,
    emp: &EmpConfig,
    events: &mut Vec<CombatEvent>,
) {
    let board = target_board(sessions);

    for session in sessions.values_mut() {
        let holder = session.holder;
        let Ok(pilot) = world.get::<&AiPilot>(holder).map(|p| *p) else {
            continue;
        };
        if now < session.next_reassess_at {
            continue;
        }
        let params = get_params(pilot.profile);
        let scrambled = channel_level(disruptions, entity_id(holder), DisruptionChannel::Ai);
        if scrambled >= emp.ai_lockout {
            session.next_reassess_at = now + params.reassess_interval;
            trace!(holder = ?entity_id(holder), scrambled, "Reassessment suspended");
            continue;
        }
        session.next_reassess_at = now + params.reassess_interval * (1.0 + scrambled);

        let Some(mount) = world
            .get::<&Armament>(holder)
            .ok()
            .and_then(|a| a.mounts.first().cloned())
        else {
            continue;
        };
        let holder_team = world.get::<&Team>(holder).map(|t| *t).unwrap_or_default();

        // Step 1: Score every candidate, reusing fresh cache entries
        let mut scored: Vec<(Entity, ScoreBreakdown, f64)> = Vec::new();
        for &candidate in &session.candidates {
            let breakdown = match cache.get(holder, candidate, now, config.cache_ttl) {
                Some(b) => b,
                None => {
                    let Some(ctx) =
                        score_context(world, &board, holder, candidate, &mount, pilot.profile)
                    else {
                        continue;
                    };
                    let b = score(&ctx);
                    cache.insert(holder, candidate, b, now);
                    b
                }
            };
            let distance = match (
                world.get::<&Position>(holder),
                world.get::<&Position>(candidate),
            ) {
                (Ok(a), Ok(b)) => a.range_to(&b),
                _ => continue,
            };
            scored.push((candidate, breakdown, distance));
        }

        // Step 2: Threat picture from hostiles only
        let contacts: Vec<ThreatContact<Entity>> = scored
            .iter()
            .filter(|(e, _, _)| {
                world
                    .get::<&Team>(*e)
                    .is_ok_and(|t| holder_team.is_hostile_to(*t))
            })
            .map(|(e, b, d)| ThreatContact {
                id: *e,
                threat: b.threat,
                distance: *d,
            })
            .collect();
        let assessment = assess(&contacts, config.top_threats);
        session.top_threats = assessment
            .top
            .iter()
            .map(|(e, threat)| (entity_id(*e), *threat))
            .collect();
        session.threat_aggregate = assessment.aggregate;
        if assessment.level != session.threat_level {
            info!(holder = ?entity_id(holder), level = ?assessment.level, "Threat level changed");
            session.threat_level = assessment.level;
            events.push(CombatEvent::ThreatLevelChanged {
                holder: entity_id(holder),
                level: assessment.level,
            });
        }

        // Step 3: Adopt the best candidate when idle
        if session.target.is_none() {
            let best = select_best(
                pilot.profile,
                scored.iter().map(|(e, b, _)| (*e, b.total)),
            );
            if let Some((target, total)) = best {
                debug!(
                    holder = ?entity_id(holder),
                    target = ?entity_id(target),
                    total,
                    "AI auto-target"
                );
                session.set_target(target, events);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadside_core::enums::{BehaviorProfile, ShipClass, ThreatLevel};
    use broadside_core::types::Velocity;

    use crate::area::emp::Disruption;
    use crate::targeting::TargetFilter;
    use crate::world_setup::{spawn_ai_ship, spawn_ship};

    fn world_with_ai() -> (World, Entity, Entity, Entity) {
        let mut world = World::new();
        let ai = spawn_ai_ship(
            &mut world,
            Team::Pirates,
            ShipClass::Corvette,
            Position::default(),
            BehaviorProfile::Aggressive,
        );
        let near = spawn_ship(
            &mut world,
            Team::Alliance,
            ShipClass::Fighter,
            Position::new(0.0, 1_200.0, 0.0),
            Velocity::default(),
        );
        let far = spawn_ship(
            &mut world,
            Team::Alliance,
            ShipClass::Fighter,
            Position::new(0.0, 2_900.0, 0.0),
            Velocity::default(),
        );
        (world, ai, near, far)
    }

    fn sessions_for(ai: Entity, candidates: Vec<Entity>) -> BTreeMap<EntityId, TargetingSession> {
        let mut session = TargetingSession::new(ai, TargetFilter::default());
        session.candidates = candidates;
        BTreeMap::from([(entity_id(ai), session)])
    }

    #[test]
    fn test_ai_adopts_best_candidate_and_raises_threat() {
        let (world, ai, near, far) = world_with_ai();
        let mut sessions = sessions_for(ai, vec![near, far]);
        let mut cache = PriorityCache::default();
        let mut events = Vec::new();

        let calm = DisruptionMap::new();
        let emp = EmpConfig::default();
        let config = PriorityConfig::default();
        run(&world, &mut sessions, &mut cache, 0.0, &config, &calm, &emp, &mut events);

        let session = &sessions[&entity_id(ai)];
        assert_eq!(session.target, Some(near));
        assert_ne!(session.threat_level, ThreatLevel::None);
        assert!(events.iter().any(|e| matches!(e, CombatEvent::ThreatLevelChanged { .. })));
        assert_eq!(cache.len(), 2);

        // Equal class threat, so the closer fighter leads the list
        let ids: Vec<EntityId> = session.top_threats.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![entity_id(near), entity_id(far)]);
        assert!(session.top_threats.windows(2).all(|w| w[0].1 >= w[1].1));
        let sum: f64 = session.top_threats.iter().map(|(_, t)| t).sum();
        assert!(session.threat_aggregate > 0.0);
        assert!((session.threat_aggregate - sum).abs() < 1e-9);
    }

    fn scrambled(ai: Entity, level: f64) -> DisruptionMap {
        DisruptionMap::from([(
            (entity_id(ai), DisruptionChannel::Ai.index()),
            Disruption::new(level, 10.0),
        )])
    }

    #[test]
    fn test_ai_disruption_suspends_reassessment() {
        let (world, ai, near, far) = world_with_ai();
        let mut sessions = sessions_for(ai, vec![near, far]);
        let mut cache = PriorityCache::default();
        let mut events = Vec::new();
        let config = PriorityConfig::default();
        let emp = EmpConfig::default();
        let jammed = scrambled(ai, 0.8);

        run(&world, &mut sessions, &mut cache, 0.0, &config, &jammed, &emp, &mut events);

        let session = &sessions[&entity_id(ai)];
        assert!(events.is_empty());
        assert_eq!(session.target, None);
        assert!(session.top_threats.is_empty());
        assert!(cache.is_empty());
        assert!(session.next_reassess_at > 0.0);
    }

    #[test]
    fn test_ai_disruption_stretches_cadence() {
        let (world, ai, near, far) = world_with_ai();
        let mut cache = PriorityCache::default();
        let mut events = Vec::new();
        let config = PriorityConfig::default();
        let emp = EmpConfig::default();

        let mut calm_sessions = sessions_for(ai, vec![near, far]);
        let calm = DisruptionMap::new();
        run(&world, &mut calm_sessions, &mut cache, 0.0, &config, &calm, &emp, &mut events);
        let calm_due = calm_sessions[&entity_id(ai)].next_reassess_at;

        let mut hazy_sessions = sessions_for(ai, vec![near, far]);
        let hazy_map = scrambled(ai, 0.5);
        run(&world, &mut hazy_sessions, &mut cache, 0.0, &config, &hazy_map, &emp, &mut events);
        let hazy = &hazy_sessions[&entity_id(ai)];

        assert!((hazy.next_reassess_at - calm_due * 1.5).abs() < 1e-9);
        assert_eq!(hazy.target, Some(near));
    }

    #[test]
    fn test_reassessment_waits_for_cadence() {
        let (world, ai, near, far) = world_with_ai();
        let mut sessions = sessions_for(ai, vec![near, far]);
        let mut cache = PriorityCache::default();
        let mut events = Vec::new();
        let config = PriorityConfig::default();
        let calm = DisruptionMap::new();
        let emp = EmpConfig::default();

        run(&world, &mut sessions, &mut cache, 0.0, &config, &calm, &emp, &mut events);
        let due = sessions[&entity_id(ai)].next_reassess_at;
        assert!(due > 0.0);

        events.clear();
        sessions.get_mut(&entity_id(ai)).unwrap().threat_level = ThreatLevel::None;
        run(&world, &mut sessions, &mut cache, due / 2.0, &config, &calm, &emp, &mut events);
        assert!(events.is_empty());
        run(&world, &mut sessions, &mut cache, due, &config, &calm, &emp, &mut events);
        assert!(!events.is_empty());
    }

    #[test]
    fn test_targeting_us_and_focus_fire_read_from_board() {
        let (world, ai, near, _) = world_with_ai();
        let mount = WeaponMount::standard(broadside_core::enums::WeaponType::Kinetic);
        let quiet =
            score_context(&world, &Vec::new(), ai, near, &mount, BehaviorProfile::Aggressive)
                .unwrap();
        assert!(!quiet.targeting_us);

        let board = vec![(near, Some(ai))];
        let hot =
            score_context(&world, &board, ai, near, &mount, BehaviorProfile::Aggressive)
                .unwrap();
        assert!(hot.targeting_us);
        assert_eq!(hot.focus_fire, 0);
        assert!(score(&hot).threat > score(&quiet).threat);
    }

    #[test]
    fn test_cache_window_by_sim_time() {
        let (world, ai, near, _) = world_with_ai();
        let mount = WeaponMount::standard(broadside_core::enums::WeaponType::Kinetic);
        let ctx =
            score_context(&world, &Vec::new(), ai, near, &mount, BehaviorProfile::Aggressive)
                .unwrap();
        let mut cache = PriorityCache::default();
        cache.insert(ai, near, score(&ctx), 2.0);
        assert!(cache.get(ai, near, 2.4, 0.5).is_some());
        assert!(cache.get(ai, near, 2.5, 0.5).is_none());
        cache.prune(3.0, 0.5);
        assert!(cache.is_empty());
    }
}
