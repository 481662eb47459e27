//! Tests for the combat engine: command pipeline, fire pipeline, purging and determinism.

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec3;
use hecs::Entity;

use broadside_core::commands::TargetingCommand;
use broadside_core::components::{Armament, Stealth, WeaponMount};
use broadside_core::config::CombatConfig;
use broadside_core::constants::MIN_ACCURACY;
use broadside_core::enums::*;
use broadside_core::error::{FireError, TargetingError};
use broadside_core::events::CombatEvent;
use broadside_core::types::{Position, Velocity};

use crate::engine::{CombatEngine, FireOutcome};
use crate::handle::entity_id;
use crate::world_setup::{spawn_ai_ship, spawn_obstacle, spawn_ship};

// Destroyer mount order from the stock armament.
const KINETIC: usize = 0;
const MISSILE: usize = 1;
const FLAK: usize = 3;
const BEAM: usize = 4;
const SWARM: usize = 5;
const EMP: usize = 6;

const DT: f64 = 0.1;

/// Route engine logs to the test harness. Set `RUST_LOG` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Destroyer at the origin facing +y, one pirate corvette dead ahead.
fn duel(target_range: f64) -> (CombatEngine, Entity, Entity) {
    let mut engine = CombatEngine::new(CombatConfig::default());
    let holder = spawn_ship(
        engine.world_mut(),
        Team::Alliance,
        ShipClass::Destroyer,
        Position::default(),
        Velocity::default(),
    );
    let target = spawn_ship(
        engine.world_mut(),
        Team::Pirates,
        ShipClass::Corvette,
        Position::new(0.0, target_range, 0.0),
        Velocity::default(),
    );
    engine.register_holder(holder).unwrap();
    (engine, holder, target)
}

fn select(engine: &mut CombatEngine, holder: Entity, target: Entity) {
    engine.queue_command(TargetingCommand::SetTarget {
        holder: entity_id(holder),
        target: entity_id(target),
    });
    engine.tick(DT);
}

fn run(engine: &mut CombatEngine, ticks: usize) -> Vec<CombatEvent> {
    for _ in 0..ticks {
        engine.tick(DT);
    }
    engine.drain_events()
}

// ---- Determinism ----

fn scripted_battle(seed: u64) -> Vec<String> {
    init_tracing();
    let mut engine = CombatEngine::new(CombatConfig {
        seed,
        ..Default::default()
    });
    let world = engine.world_mut();
    let holder = spawn_ship(
        world,
        Team::Alliance,
        ShipClass::Destroyer,
        Position::default(),
        Velocity::default(),
    );
    let ai = spawn_ai_ship(
        world,
        Team::Pirates,
        ShipClass::Corvette,
        Position::new(300.0, 1_400.0, 0.0),
        BehaviorProfile::Aggressive,
    );
    let ghost = spawn_ship(
        world,
        Team::Pirates,
        ShipClass::Fighter,
        Position::new(-200.0, 1_600.0, 0.0),
        Velocity::new(120.0, 0.0, 0.0),
    );
    world
        .insert_one(ghost, Stealth { engaged: true, emitting: false })
        .unwrap();
    spawn_ship(
        world,
        Team::Pirates,
        ShipClass::Fighter,
        Position::new(50.0, 900.0, 0.0),
        Velocity::new(0.0, -40.0, 0.0),
    );

    engine.register_holder(holder).unwrap();
    engine.register_holder(ai).unwrap();

    let mut frames = Vec::new();
    for tick in 0..120 {
        match tick {
            2 => engine.queue_command(TargetingCommand::CycleNext {
                holder: entity_id(holder),
            }),
            5 => {
                let _ = engine.request_fire(holder, FLAK);
            }
            8 => {
                let _ = engine.request_fire(holder, SWARM);
            }
            12 => {
                let _ = engine.request_fire(holder, BEAM);
            }
            20 => engine.queue_command(TargetingCommand::CycleNext {
                holder: entity_id(holder),
            }),
            25 => {
                let _ = engine.request_fire(holder, EMP);
            }
            _ => {}
        }
        let snapshot = engine.tick(0.05);
        frames.push(serde_json::to_string(&snapshot).unwrap());
        frames.push(serde_json::to_string(&engine.drain_events()).unwrap());
    }
    frames
}

#[test]
fn test_determinism_same_seed() {
    let a = scripted_battle(12345);
    let b = scripted_battle(12345);
    assert_eq!(a.len(), b.len());
    for (i, (fa, fb)) in a.iter().zip(&b).enumerate() {
        assert_eq!(fa, fb, "Frame {i} diverged with same seed");
    }
}

#[test]
fn test_clock_advances_per_tick() {
    let (mut engine, _, _) = duel(1_000.0);
    let snap = engine.tick(0.25);
    assert_eq!(snap.tick, 1);
    assert!((snap.elapsed_secs - 0.25).abs() < 1e-12);
    engine.tick(0.25);
    assert_eq!(engine.clock().tick, 2);
}

// ---- Command pipeline ----

#[test]
fn test_set_target_command() {
    let (mut engine, holder, target) = duel(1_000.0);
    select(&mut engine, holder, target);

    assert_eq!(engine.session(holder).unwrap().target, Some(target));
    let events = engine.drain_events();
    assert!(events.contains(&CombatEvent::TargetAcquired {
        holder: entity_id(holder),
        target: entity_id(target),
    }));
    let snap = engine.snapshot();
    assert_eq!(snap.sessions[0].target, Some(entity_id(target)));
}

#[test]
fn test_set_target_out_of_range_is_ignored() {
    let (mut engine, holder, target) = duel(9_000.0);
    select(&mut engine, holder, target);
    assert_eq!(engine.session(holder).unwrap().target, None);
}

#[test]
fn test_cycle_through_candidates_wraps() {
    let (mut engine, holder, first) = duel(1_000.0);
    let second = spawn_ship(
        engine.world_mut(),
        Team::Pirates,
        ShipClass::Fighter,
        Position::new(0.0, 2_000.0, 0.0),
        Velocity::default(),
    );
    engine.tick(DT);
    assert_eq!(engine.session(holder).unwrap().candidates, vec![first, second]);

    let h = entity_id(holder);
    let mut seen = Vec::new();
    for _ in 0..3 {
        engine.apply_command(TargetingCommand::CycleNext { holder: h }).unwrap();
        seen.push(engine.session(holder).unwrap().target.unwrap());
    }
    assert_eq!(seen, vec![first, second, first]);

    engine.apply_command(TargetingCommand::CyclePrevious { holder: h }).unwrap();
    assert_eq!(engine.session(holder).unwrap().target, Some(second));
}

#[test]
fn test_hotkeys_assign_and_recall() {
    let (mut engine, holder, target) = duel(1_000.0);
    let h = entity_id(holder);
    select(&mut engine, holder, target);

    engine.apply_command(TargetingCommand::AssignHotkey { holder: h, slot: 4 }).unwrap();
    engine.apply_command(TargetingCommand::ClearTarget { holder: h }).unwrap();
    assert_eq!(engine.session(holder).unwrap().target, None);

    engine.apply_command(TargetingCommand::RecallHotkey { holder: h, slot: 4 }).unwrap();
    assert_eq!(engine.session(holder).unwrap().target, Some(target));

    assert_eq!(
        engine.apply_command(TargetingCommand::AssignHotkey { holder: h, slot: 13 }),
        Err(TargetingError::InvalidHotkeySlot(13))
    );
}

#[test]
fn test_unknown_holder_command_rejected() {
    let (mut engine, _, target) = duel(1_000.0);
    assert_eq!(
        engine.apply_command(TargetingCommand::ClearTarget {
            holder: entity_id(target)
        }),
        Err(TargetingError::UnknownHolder(entity_id(target)))
    );
}

#[test]
fn test_subsystem_selection_commands() {
    let (mut engine, holder, target) = duel(1_000.0);
    let h = entity_id(holder);
    assert_eq!(
        engine.apply_command(TargetingCommand::SelectPrioritySubsystem { holder: h }),
        Err(TargetingError::NoTarget)
    );
    select(&mut engine, holder, target);
    engine.drain_events();

    engine
        .apply_command(TargetingCommand::SelectSubsystemName {
            holder: h,
            name: "shield generator".to_string(),
        })
        .unwrap();
    assert_eq!(engine.session(holder).unwrap().subsystem, Some(4));
    assert!(engine.drain_events().contains(&CombatEvent::SubsystemSelected {
        holder: h,
        target: entity_id(target),
        subsystem_id: 4,
    }));

    engine
        .apply_command(TargetingCommand::SelectSubsystemKind {
            holder: h,
            kind: SubsystemKind::Engine,
        })
        .unwrap();
    assert_eq!(engine.session(holder).unwrap().subsystem, Some(1));

    engine.apply_command(TargetingCommand::ClearSubsystem { holder: h }).unwrap();
    assert_eq!(engine.session(holder).unwrap().subsystem, None);

    // Switching targets drops the selection
    engine.apply_command(TargetingCommand::SelectPrioritySubsystem { holder: h }).unwrap();
    assert!(engine.session(holder).unwrap().subsystem.is_some());
    engine.apply_command(TargetingCommand::ClearTarget { holder: h }).unwrap();
    assert_eq!(engine.session(holder).unwrap().subsystem, None);
}

// ---- Fire pipeline ----

#[test]
fn test_fire_without_target_rejected() {
    let (mut engine, holder, _) = duel(1_000.0);
    assert_eq!(
        engine.request_fire(holder, KINETIC),
        Err(FireError::NoTarget(WeaponType::Kinetic))
    );
    assert_eq!(engine.request_fire(holder, 42), Err(FireError::UnknownMount(42)));
    assert!(engine.drain_events().is_empty());
}

#[test]
fn test_kinetic_fire_returns_lead_solution() {
    let (mut engine, holder, target) = duel(1_500.0);
    select(&mut engine, holder, target);
    engine.drain_events();

    let outcome = engine.request_fire(holder, KINETIC).unwrap();
    let FireOutcome::Projectile { solution, target: hit, weapon } = outcome else {
        panic!("expected a projectile, got {outcome:?}");
    };
    assert_eq!(hit, target);
    assert_eq!(weapon, WeaponType::Kinetic);
    assert!((solution.lead_time - 1_500.0 / 1_200.0).abs() < 1e-3);
    assert!(engine
        .drain_events()
        .iter()
        .any(|e| matches!(e, CombatEvent::WeaponFired { weapon: WeaponType::Kinetic, .. })));
}

#[test]
fn test_obstructed_target_rejected() {
    let (mut engine, holder, target) = duel(1_500.0);
    spawn_obstacle(engine.world_mut(), Position::new(0.0, 700.0, 0.0), 60.0);
    select(&mut engine, holder, target);
    assert_eq!(engine.session(holder).unwrap().target, Some(target));
    assert_eq!(
        engine.request_fire(holder, KINETIC),
        Err(FireError::NoLineOfSight(entity_id(target)))
    );
}

#[test]
fn test_missile_requires_lock() {
    let (mut engine, holder, target) = duel(1_500.0);
    select(&mut engine, holder, target);
    assert_eq!(engine.request_fire(holder, MISSILE), Err(FireError::LockRequired));

    // Dead ahead: lock builds and holds
    let events = run(&mut engine, 25);
    assert!(events.contains(&CombatEvent::LockPhaseChanged {
        holder: entity_id(holder),
        phase: LockPhase::Locked,
    }));
    assert!(engine.session(holder).unwrap().lock.is_locked());
    assert!(matches!(
        engine.request_fire(holder, MISSILE),
        Ok(FireOutcome::Projectile { weapon: WeaponType::Missile, .. })
    ));

    engine
        .apply_command(TargetingCommand::ForceClearLock {
            holder: entity_id(holder),
        })
        .unwrap();
    assert_eq!(engine.request_fire(holder, MISSILE), Err(FireError::LockRequired));
}

#[test]
fn test_beam_damages_target_then_winds_down() {
    init_tracing();
    let (mut engine, holder, target) = duel(800.0);
    select(&mut engine, holder, target);
    let FireOutcome::Beam { beam_id } = engine.request_fire(holder, BEAM).unwrap() else {
        panic!("expected a beam");
    };

    let events = run(&mut engine, 20);
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::BeamHit { beam_id: id, target: t, .. }
            if *id == beam_id && *t == entity_id(target)
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::DamageResolved { weapon: WeaponType::Beam, .. }
    )));

    engine
        .apply_command(TargetingCommand::StopBeam { beam_id })
        .unwrap();
    run(&mut engine, 10);
    assert!(engine.beams().is_empty());
    assert!(engine.snapshot().beams.is_empty());
}

#[test]
fn test_beam_cap_rejects_new_fire() {
    let mut config = CombatConfig::default();
    config.caps.max_beams = 1;
    let mut engine = CombatEngine::new(config);
    let holder = spawn_ship(
        engine.world_mut(),
        Team::Alliance,
        ShipClass::Destroyer,
        Position::default(),
        Velocity::default(),
    );
    engine.register_holder(holder).unwrap();

    assert!(matches!(engine.request_fire(holder, BEAM), Ok(FireOutcome::Beam { .. })));
    assert_eq!(
        engine.request_fire(holder, BEAM),
        Err(FireError::CapacityReached {
            kind: "beams",
            limit: 1
        })
    );
    assert_eq!(engine.beams().len(), 1);
}

#[test]
fn test_fixed_beam_beyond_reach_rejected() {
    let (mut engine, holder, target) = duel(4_000.0);
    engine.world_mut().get::<&mut Armament>(holder).unwrap().mounts[BEAM] =
        WeaponMount::beam(BeamType::FixedAim, 1.0);
    select(&mut engine, holder, target);
    assert_eq!(engine.session(holder).unwrap().target, Some(target));

    assert_eq!(
        engine.request_fire(holder, BEAM),
        Err(FireError::OutOfWeaponRange(entity_id(target)))
    );
    assert!(engine.beams().is_empty());

    engine.world_mut().get::<&mut Position>(target).unwrap().0 = DVec3::new(0.0, 2_000.0, 0.0);
    engine.tick(DT);
    assert!(matches!(engine.request_fire(holder, BEAM), Ok(FireOutcome::Beam { .. })));
    assert_eq!(engine.beams().len(), 1);
}

#[test]
fn test_swarm_launch_through_engine() {
    let (mut engine, holder, target) = duel(3_000.0);
    select(&mut engine, holder, target);
    engine.drain_events();
    assert!(matches!(engine.request_fire(holder, SWARM), Ok(FireOutcome::Swarm { .. })));

    let mut events = Vec::new();
    for _ in 0..100 {
        engine.tick(0.02);
        events.extend(engine.drain_events());
    }
    let count = engine.config().swarm.missile_count as usize;
    let fired = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::SwarmMissileFired { .. }))
        .count();
    let complete = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::SwarmFormationComplete { .. }))
        .count();
    assert_eq!(fired, count);
    assert_eq!(complete, 1);
    let snap = engine.snapshot();
    assert_eq!(snap.swarms[0].launched, snap.swarms[0].total);
}

#[test]
fn test_emp_disrupts_target_channels() {
    let (mut engine, holder, target) = duel(300.0);
    select(&mut engine, holder, target);
    engine.drain_events();

    let FireOutcome::Emp { origin, .. } = engine.request_fire(holder, EMP).unwrap() else {
        panic!("expected an EMP");
    };
    assert!(origin.distance(DVec3::new(0.0, 300.0, 0.0)) < 1.0);
    let level = engine.disruption_level(target, DisruptionChannel::Targeting);
    assert!(level > 0.0);
    assert_eq!(engine.disruption_level(holder, DisruptionChannel::Targeting), 0.0);

    let events = run(&mut engine, 100);
    let restored = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::ChannelRestored { .. }))
        .count();
    assert_eq!(restored, 5);
    assert_eq!(engine.disruption_level(target, DisruptionChannel::Targeting), 0.0);
}

#[test]
fn test_weapons_disruption_degrades_then_blocks_fire() {
    let (mut engine, holder, target) = duel(300.0);
    engine.register_holder(target).unwrap();
    select(&mut engine, target, holder);
    select(&mut engine, holder, target);
    let baseline = engine.solve(target, holder, KINETIC).unwrap().accuracy;

    assert!(matches!(engine.request_fire(holder, EMP), Ok(FireOutcome::Emp { .. })));
    let level = engine.disruption_level(target, DisruptionChannel::Weapons);
    let lockout = engine.config().emp.weapons_lockout;
    assert!(level >= lockout);
    assert_eq!(engine.request_fire(target, KINETIC), Err(FireError::WeaponsDisrupted));

    let degraded = engine.solve(target, holder, KINETIC).unwrap().accuracy;
    assert!(degraded < baseline);
    assert!((degraded - (baseline * (1.0 - level)).max(MIN_ACCURACY)).abs() < 1e-9);

    // Fire comes back once the pulse decays below the lockout
    for _ in 0..200 {
        if engine.disruption_level(target, DisruptionChannel::Weapons) < lockout {
            break;
        }
        engine.tick(DT);
    }
    assert!(engine.disruption_level(target, DisruptionChannel::Weapons) < lockout);
    assert!(matches!(
        engine.request_fire(target, KINETIC),
        Ok(FireOutcome::Projectile { weapon: WeaponType::Kinetic, .. })
    ));
}

#[test]
fn test_emp_without_target_centres_on_holder() {
    let (mut engine, holder, _) = duel(1_000.0);
    let FireOutcome::Emp { origin, .. } = engine.request_fire(holder, EMP).unwrap() else {
        panic!("expected an EMP");
    };
    assert_eq!(origin, DVec3::ZERO);
}

#[test]
fn test_flak_leaves_queryable_barrier() {
    let (mut engine, holder, target) = duel(900.0);
    select(&mut engine, holder, target);
    let FireOutcome::Flak { detonation_point, .. } = engine.request_fire(holder, FLAK).unwrap()
    else {
        panic!("expected flak");
    };
    assert_eq!(engine.barrier_coverage(detonation_point), 0.0);

    let events = run(&mut engine, 15);
    assert!(events
        .iter()
        .any(|e| matches!(e, CombatEvent::FlakDetonated { .. })));
    assert!(engine.barrier_coverage(detonation_point) > 0.9);

    let events = run(&mut engine, 50);
    assert!(events
        .iter()
        .any(|e| matches!(e, CombatEvent::BarrierExpired { .. })));
    assert_eq!(engine.barrier_coverage(detonation_point), 0.0);
}

#[test]
fn test_resolve_hit_honours_core_protection() {
    let (mut engine, holder, _) = duel(1_000.0);
    let capital = spawn_ship(
        engine.world_mut(),
        Team::Pirates,
        ShipClass::Capital,
        Position::new(0.0, 2_000.0, 0.0),
        Velocity::default(),
    );

    let core = engine.resolve_hit(capital, WeaponType::Energy, 100.0, Some(8)).unwrap();
    assert_eq!(core.immunity, Some(ImmunityCondition::CapitalCoreProtection));
    let turret = engine.resolve_hit(capital, WeaponType::Energy, 100.0, Some(6)).unwrap();
    assert_eq!(turret.immunity, None);
    assert!(turret.applied > core.applied);
    assert!(engine.resolve_hit(holder, WeaponType::Energy, 10.0, None).is_some());
    assert_eq!(
        engine
            .drain_events()
            .iter()
            .filter(|e| matches!(e, CombatEvent::DamageResolved { .. }))
            .count(),
        3
    );
}

// ---- Lifecycle ----

#[test]
fn test_despawned_target_purged_within_one_tick() {
    let (mut engine, holder, target) = duel(1_000.0);
    let h = entity_id(holder);
    select(&mut engine, holder, target);
    engine.apply_command(TargetingCommand::AssignHotkey { holder: h, slot: 1 }).unwrap();
    engine.drain_events();

    engine.world_mut().despawn(target).unwrap();
    let snap = engine.tick(DT);

    let session = engine.session(holder).unwrap();
    assert_eq!(session.target, None);
    assert!(session.hotkeys.iter().all(Option::is_none));
    assert!(session.candidates.is_empty());
    assert_eq!(snap.sessions[0].target, None);
    assert!(engine.drain_events().contains(&CombatEvent::TargetLost {
        holder: h,
        target: entity_id(target),
        reason: TargetLostReason::Invalidated,
    }));
}

#[test]
fn test_despawned_holder_session_dropped() {
    let (mut engine, holder, _) = duel(1_000.0);
    engine.world_mut().despawn(holder).unwrap();
    let snap = engine.tick(DT);
    assert!(engine.session(holder).is_none());
    assert!(snap.sessions.is_empty());
    assert_eq!(
        engine.request_fire(holder, KINETIC),
        Err(FireError::UnknownHolder(entity_id(holder)))
    );
}

#[test]
fn test_ai_holder_auto_targets() {
    let mut engine = CombatEngine::new(CombatConfig::default());
    let ai = spawn_ai_ship(
        engine.world_mut(),
        Team::Pirates,
        ShipClass::Corvette,
        Position::default(),
        BehaviorProfile::Aggressive,
    );
    let prey = spawn_ship(
        engine.world_mut(),
        Team::Alliance,
        ShipClass::Fighter,
        Position::new(0.0, 1_200.0, 0.0),
        Velocity::default(),
    );
    engine.register_holder(ai).unwrap();
    engine.tick(DT);

    assert_eq!(engine.session(ai).unwrap().target, Some(prey));
    assert_ne!(engine.session(ai).unwrap().threat_level, ThreatLevel::None);
}

// ---- Events ----

#[test]
fn test_subscribers_receive_tick_events() {
    let (mut engine, holder, target) = duel(1_000.0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = engine.subscribe(move |e| sink.borrow_mut().push(e.clone()));

    select(&mut engine, holder, target);
    assert!(seen
        .borrow()
        .iter()
        .any(|e| matches!(e, CombatEvent::TargetAcquired { .. })));

    assert!(engine.unsubscribe(id));
    let before = seen.borrow().len();
    engine
        .apply_command(TargetingCommand::ClearTarget {
            holder: entity_id(holder),
        })
        .unwrap();
    assert_eq!(seen.borrow().len(), before);
}

// ---- Configuration ----

#[test]
fn test_engine_from_json_config() {
    let config =
        CombatConfig::from_json_str(r#"{ "seed": 7, "caps": { "max_swarms": 0 } }"#).unwrap();
    let mut engine = CombatEngine::new(config);
    let holder = spawn_ship(
        engine.world_mut(),
        Team::Alliance,
        ShipClass::Destroyer,
        Position::default(),
        Velocity::default(),
    );
    let target = spawn_ship(
        engine.world_mut(),
        Team::Pirates,
        ShipClass::Fighter,
        Position::new(0.0, 800.0, 0.0),
        Velocity::default(),
    );
    engine.register_holder(holder).unwrap();
    select(&mut engine, holder, target);

    assert_eq!(
        engine.request_fire(holder, SWARM),
        Err(FireError::CapacityReached {
            kind: "swarms",
            limit: 0
        })
    );
}
