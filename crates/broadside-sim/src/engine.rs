//! Combat engine: the facade the host drives.
//!
//! `CombatEngine` owns the hecs world, every targeting session and every
//! manager. The host spawns, moves and despawns ships through `world_mut()`,
//! sends targeting commands and fire requests, and calls `tick(dt)` once per
//! frame. Completely headless and deterministic for a given seed.

use std::collections::{BTreeMap, VecDeque};

use glam::DVec3;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};

use broadside_core::commands::TargetingCommand;
use broadside_core::components::{Armament, BeamSpec, PilotSkill, Subsystems, WeaponMount};
use broadside_core::config::CombatConfig;
use broadside_core::constants::{
    AREA_EFFECT_INTERVAL, FINE_STEP, MAX_FINE_STEPS_PER_TICK, MIN_ACCURACY,
};
use broadside_core::enums::{
    BeamType, DisruptionChannel, SubsystemCategory, TargetLostReason, Team, WeaponType,
};
use broadside_core::error::{FireError, TargetingError};
use broadside_core::events::CombatEvent;
use broadside_core::state::CombatSnapshot;
use broadside_core::types::{EntityId, Heading, Position, SimClock, Velocity};

use crate::area::AreaEffects;
use crate::beams::BeamManager;
use crate::events::{EventBus, SubscriberId};
use crate::handle::{entity_from_id, entity_id};
use crate::intercept::{self, FiringSolution, InterceptInput, SolutionCache};
use crate::resistance::{self, DamageOutcome};
use crate::spatial::{SpatialQuery, WorldSpatial};
use crate::swarm::SwarmManager;
use crate::systems;
use crate::systems::priority::PriorityCache;
use crate::targeting::subsystem::{self, RankedSubsystem};
use crate::targeting::visibility::{SensorContext, VisibilityReport, VisibilityValidator};
use crate::targeting::{registry, TargetFilter, TargetingSession};

/// What a successful fire request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FireOutcome {
    /// Kinetic, energy and missile shots. The projectile layer flies them
    /// along the solution and reports impacts through `resolve_hit`.
    Projectile {
        weapon: WeaponType,
        target: Entity,
        solution: FiringSolution,
    },
    Beam {
        beam_id: u32,
    },
    Swarm {
        swarm_id: u32,
    },
    Emp {
        effect_id: u32,
        origin: DVec3,
    },
    Flak {
        effect_id: u32,
        detonation_point: DVec3,
    },
}

/// The targeting and ballistics core.
pub struct CombatEngine<S: SpatialQuery = WorldSpatial> {
    world: World,
    spatial: S,
    config: CombatConfig,
    clock: SimClock,
    rng: ChaCha8Rng,
    sessions: BTreeMap<EntityId, TargetingSession>,
    command_queue: VecDeque<TargetingCommand>,
    validator: VisibilityValidator,
    solutions: SolutionCache,
    priority: PriorityCache,
    beams: BeamManager,
    swarms: SwarmManager,
    area: AreaEffects,
    bus: EventBus,
    fine_accumulator: f64,
    area_accumulator: f64,
}

impl CombatEngine<WorldSpatial> {
    /// Create an engine with brute-force spatial queries.
    pub fn new(config: CombatConfig) -> Self {
        Self::with_spatial(config, WorldSpatial)
    }
}

impl<S: SpatialQuery> CombatEngine<S> {
    /// Create an engine with a host-provided spatial index.
    pub fn with_spatial(config: CombatConfig, spatial: S) -> Self {
        Self {
            world: World::new(),
            spatial,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            clock: SimClock::default(),
            sessions: BTreeMap::new(),
            command_queue: VecDeque::new(),
            validator: VisibilityValidator::default(),
            solutions: SolutionCache::default(),
            priority: PriorityCache::default(),
            beams: BeamManager::default(),
            swarms: SwarmManager::default(),
            area: AreaEffects::default(),
            bus: EventBus::default(),
            fine_accumulator: 0.0,
            area_accumulator: 0.0,
        }
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for spawning, moving and despawning ships.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn beams(&self) -> &BeamManager {
        &self.beams
    }

    pub fn swarms(&self) -> &SwarmManager {
        &self.swarms
    }

    pub fn area_effects(&self) -> &AreaEffects {
        &self.area
    }

    /// Targeting session of a holder.
    pub fn session(&self, holder: Entity) -> Option<&TargetingSession> {
        self.sessions.get(&entity_id(holder))
    }

    // --- Registration ---

    /// Give a ship a targeting session with the default hostile filter.
    pub fn register_holder(&mut self, holder: Entity) -> Result<(), TargetingError> {
        self.register_holder_with_filter(holder, TargetFilter::default())
    }

    pub fn register_holder_with_filter(
        &mut self,
        holder: Entity,
        filter: TargetFilter,
    ) -> Result<(), TargetingError> {
        if !self.world.contains(holder) {
            return Err(TargetingError::UnknownHolder(entity_id(holder)));
        }
        let mut session = TargetingSession::new(holder, filter);
        session.next_scan_at = self.clock.elapsed_secs;
        session.next_reassess_at = self.clock.elapsed_secs;
        self.sessions.insert(entity_id(holder), session);
        debug!(holder = ?entity_id(holder), "Holder registered");
        Ok(())
    }

    /// Replace a holder's filter. The next tick rescans with it.
    pub fn set_filter(
        &mut self,
        holder: Entity,
        filter: TargetFilter,
    ) -> Result<(), TargetingError> {
        let now = self.clock.elapsed_secs;
        let session = self
            .sessions
            .get_mut(&entity_id(holder))
            .ok_or(TargetingError::UnknownHolder(entity_id(holder)))?;
        session.filter = filter;
        session.next_scan_at = now;
        Ok(())
    }

    // --- Queries ---

    /// Range, sight-line and detectability of `target` from `holder`.
    pub fn validate(&mut self, holder: Entity, target: Entity) -> Option<VisibilityReport> {
        let mut ctx = SensorContext {
            world: &self.world,
            spatial: &self.spatial,
            validator: &mut self.validator,
            rng: &mut self.rng,
            config: &self.config,
            disruptions: self.area.disruptions(),
            now: self.clock.elapsed_secs,
        };
        ctx.validate(holder, target)
    }

    /// Lead solution for one of the holder's mounts against `target`.
    pub fn solve(
        &mut self,
        holder: Entity,
        target: Entity,
        mount_index: usize,
    ) -> Result<FiringSolution, FireError> {
        let mount = self.mount(holder, mount_index)?;
        let solution = self.solve_with(holder, target, &mount)?;
        Ok(self.degrade(holder, solution))
    }

    /// Flak barrier density at a point (0..=1).
    pub fn barrier_coverage(&self, point: DVec3) -> f64 {
        self.area.barrier_coverage(point)
    }

    /// Current EMP disruption of one channel on a ship.
    pub fn disruption_level(&self, target: Entity, channel: DisruptionChannel) -> f64 {
        self.area.disruption_level(entity_id(target), channel)
    }

    // --- Events ---

    pub fn subscribe(&mut self, handler: impl FnMut(&CombatEvent) + 'static) -> SubscriberId {
        self.bus.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Every event delivered since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.bus.drain()
    }

    // --- Commands ---

    /// Queue a targeting command for the next tick boundary.
    pub fn queue_command(&mut self, command: TargetingCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = TargetingCommand>) {
        self.command_queue.extend(commands);
    }

    /// Apply a targeting command immediately.
    pub fn apply_command(&mut self, command: TargetingCommand) -> Result<(), TargetingError> {
        let result = self.handle_command(command);
        self.bus.flush();
        result
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(command) {
                warn!(%err, "Targeting command rejected");
            }
        }
    }

    fn handle_command(&mut self, command: TargetingCommand) -> Result<(), TargetingError> {
        let now = self.clock.elapsed_secs;
        match command {
            TargetingCommand::SetTarget { holder, target } => {
                let session = session_mut(&mut self.sessions, holder)?;
                let holder_entity = session.holder;
                let Some(target_entity) = entity_from_id(target) else {
                    return Ok(());
                };
                let mut ctx = SensorContext {
                    world: &self.world,
                    spatial: &self.spatial,
                    validator: &mut self.validator,
                    rng: &mut self.rng,
                    config: &self.config,
                    disruptions: self.area.disruptions(),
                    now,
                };
                if registry::accepts(&mut ctx, holder_entity, target_entity, &session.filter) {
                    session.set_target(target_entity, self.bus.pending_mut());
                } else {
                    debug!(?holder, ?target, "Set target ignored, target not admissible");
                }
            }
            TargetingCommand::ClearTarget { holder } => {
                let session = session_mut(&mut self.sessions, holder)?;
                session.clear_target(TargetLostReason::Cleared, self.bus.pending_mut());
            }
            TargetingCommand::CycleNext { holder } => {
                let session = session_mut(&mut self.sessions, holder)?;
                session.cycle(true, self.bus.pending_mut());
            }
            TargetingCommand::CyclePrevious { holder } => {
                let session = session_mut(&mut self.sessions, holder)?;
                session.cycle(false, self.bus.pending_mut());
            }
            TargetingCommand::AssignHotkey { holder, slot } => {
                let session = session_mut(&mut self.sessions, holder)?;
                session.assign_hotkey(slot)?;
            }
            TargetingCommand::RecallHotkey { holder, slot } => {
                let session = session_mut(&mut self.sessions, holder)?;
                let holder_entity = session.holder;
                let mut ctx = SensorContext {
                    world: &self.world,
                    spatial: &self.spatial,
                    validator: &mut self.validator,
                    rng: &mut self.rng,
                    config: &self.config,
                    disruptions: self.area.disruptions(),
                    now,
                };
                let filter = session.filter.clone();
                session.recall_hotkey(
                    slot,
                    |stored| registry::accepts(&mut ctx, holder_entity, stored, &filter),
                    self.bus.pending_mut(),
                )?;
            }
            TargetingCommand::CycleSubsystem { holder, forward } => {
                self.select_subsystem(holder, |ranked, current| {
                    subsystem::cycle(ranked, current, forward)
                })?;
            }
            TargetingCommand::SelectSubsystemKind { holder, kind } => {
                self.select_subsystem(holder, |ranked, _| subsystem::select_kind(ranked, kind))?;
            }
            TargetingCommand::SelectSubsystemName { holder, name } => {
                self.select_subsystem(holder, |ranked, _| subsystem::select_name(ranked, &name))?;
            }
            TargetingCommand::SelectPrioritySubsystem { holder } => {
                self.select_subsystem(holder, |ranked, _| subsystem::select_priority(ranked))?;
            }
            TargetingCommand::ClearSubsystem { holder } => {
                let session = session_mut(&mut self.sessions, holder)?;
                session.subsystem = None;
            }
            TargetingCommand::ForceClearLock { holder } => {
                let session = session_mut(&mut self.sessions, holder)?;
                session.lock.clear(holder, self.bus.pending_mut());
            }
            TargetingCommand::StopBeam { beam_id } => {
                self.beams.stop(beam_id, self.bus.pending_mut());
            }
        }
        Ok(())
    }

    /// Rank the current target's subsystems and let `pick` choose one.
    fn select_subsystem(
        &mut self,
        holder: EntityId,
        pick: impl FnOnce(&[RankedSubsystem], Option<u32>) -> Option<u32>,
    ) -> Result<(), TargetingError> {
        let session = session_mut(&mut self.sessions, holder)?;
        let target = session.target.ok_or(TargetingError::NoTarget)?;
        let Ok(subs) = self.world.get::<&Subsystems>(target) else {
            return Ok(());
        };
        let ranked = subsystem::rank(&subs, session.subsystem_kinds.as_deref());
        let chosen = pick(&ranked, session.subsystem);
        if let Some(id) = chosen {
            if session.subsystem != Some(id) {
                session.subsystem = Some(id);
                self.bus.publish(CombatEvent::SubsystemSelected {
                    holder,
                    target: entity_id(target),
                    subsystem_id: id,
                });
            }
        }
        Ok(())
    }

    // --- Fire pipeline ---

    fn mount(&self, holder: Entity, mount_index: usize) -> Result<WeaponMount, FireError> {
        if !self.world.contains(holder) {
            return Err(FireError::UnknownHolder(entity_id(holder)));
        }
        self.world
            .get::<&Armament>(holder)
            .ok()
            .and_then(|a| a.mounts.get(mount_index).copied())
            .ok_or(FireError::UnknownMount(mount_index))
    }

    fn solve_with(
        &mut self,
        holder: Entity,
        target: Entity,
        mount: &WeaponMount,
    ) -> Result<FiringSolution, FireError> {
        let now = self.clock.elapsed_secs;
        let ttl = self.config.intercept.cache_ttl;
        if let Some(cached) = self.solutions.get(holder, target, mount.muzzle_speed, now, ttl) {
            return cached.map_err(FireError::NoSolution);
        }

        let shooter_pos = self
            .world
            .get::<&Position>(holder)
            .map(|p| p.0)
            .map_err(|_| FireError::UnknownHolder(entity_id(holder)))?;
        let target_pos = self
            .world
            .get::<&Position>(target)
            .map(|p| p.0)
            .map_err(|_| FireError::TargetNotVisible(entity_id(target)))?;
        let velocity_of = |e: Entity| {
            self.world
                .get::<&Velocity>(e)
                .map(|v| v.0)
                .unwrap_or(DVec3::ZERO)
        };
        let skill = self
            .world
            .get::<&PilotSkill>(holder)
            .map(|s| s.0)
            .unwrap_or_default();

        let input = InterceptInput {
            shooter_pos,
            shooter_vel: velocity_of(holder),
            mount_offset: mount.offset,
            target_pos,
            target_vel: velocity_of(target),
            weapon_speed: mount.muzzle_speed,
            skill,
        };
        let result = intercept::solve(&input, &self.config.intercept);
        if let Err(reason) = result {
            trace!(
                holder = ?entity_id(holder),
                target = ?entity_id(target),
                ?reason,
                "Intercept solve failed"
            );
        }
        self.solutions.insert(holder, target, mount.muzzle_speed, result, now);
        result.map_err(FireError::NoSolution)
    }

    /// Scale a solution's accuracy down by the holder's weapons disruption.
    fn degrade(&self, holder: Entity, mut solution: FiringSolution) -> FiringSolution {
        let level = self.disruption_level(holder, DisruptionChannel::Weapons);
        if level > 0.0 {
            solution.accuracy = (solution.accuracy * (1.0 - level)).max(MIN_ACCURACY);
        }
        solution
    }

    fn check_capacity(&self, weapon: WeaponType) -> Result<(), FireError> {
        let caps = &self.config.caps;
        let (kind, live, limit) = match weapon {
            WeaponType::Beam => ("beams", self.beams.len(), caps.max_beams),
            WeaponType::Swarm => ("swarms", self.swarms.len(), caps.max_swarms),
            WeaponType::Emp | WeaponType::Flak => {
                ("area effects", self.area.count(), caps.max_area_effects)
            }
            _ => return Ok(()),
        };
        if live >= limit {
            Err(FireError::CapacityReached { kind, limit })
        } else {
            Ok(())
        }
    }

    /// Fire one of the holder's mounts at its current target.
    ///
    /// Rejections leave no trace in the simulation.
    pub fn request_fire(
        &mut self,
        holder: Entity,
        mount_index: usize,
    ) -> Result<FireOutcome, FireError> {
        let result = self.fire(holder, mount_index);
        match &result {
            Ok(outcome) => trace!(holder = ?entity_id(holder), ?outcome, "Fire request accepted"),
            Err(err) => {
                debug!(holder = ?entity_id(holder), mount_index, %err, "Fire request rejected")
            }
        }
        self.bus.flush();
        result
    }

    fn fire(&mut self, holder: Entity, mount_index: usize) -> Result<FireOutcome, FireError> {
        let holder_id = entity_id(holder);

        // Step 1: Holder, mount, capacity and weapons disruption
        let session = self
            .sessions
            .get(&holder_id)
            .ok_or(FireError::UnknownHolder(holder_id))?;
        let target = session.target;
        let locked = session.lock.is_locked();
        let mount = self.mount(holder, mount_index)?;
        let weapon = mount.weapon;
        self.check_capacity(weapon)?;
        let jammed = self.disruption_level(holder, DisruptionChannel::Weapons);
        if jammed >= self.config.emp.weapons_lockout {
            return Err(FireError::WeaponsDisrupted);
        }

        // Step 2: Target requirements
        let needs_target = matches!(
            weapon,
            WeaponType::Kinetic | WeaponType::Energy | WeaponType::Missile | WeaponType::Swarm
        );
        if needs_target && target.is_none() {
            return Err(FireError::NoTarget(weapon));
        }
        if weapon == WeaponType::Missile && !locked {
            return Err(FireError::LockRequired);
        }

        // Step 3: Visibility and solution
        let solution = match target {
            Some(t) => {
                let report = self
                    .validate(holder, t)
                    .ok_or(FireError::TargetNotVisible(entity_id(t)))?;
                if !report.detectable {
                    return Err(FireError::TargetNotVisible(entity_id(t)));
                }
                if !report.line_of_sight {
                    return Err(FireError::NoLineOfSight(entity_id(t)));
                }
                let solution = self.solve_with(holder, t, &mount)?;
                Some(self.degrade(holder, solution))
            }
            None => None,
        };

        let holder_pos = self
            .world
            .get::<&Position>(holder)
            .map(|p| p.0)
            .map_err(|_| FireError::UnknownHolder(holder_id))?;
        let forward = self
            .world
            .get::<&Heading>(holder)
            .map(|h| h.forward())
            .unwrap_or(Heading::FORWARD.0);
        let origin = holder_pos + mount.offset;
        let aim_point = solution
            .map(|s| s.intercept_point)
            .unwrap_or(origin + forward * mount.optimal_range);

        // Step 4: Hand off to the weapon's effect system
        let outcome = match weapon {
            WeaponType::Kinetic | WeaponType::Energy | WeaponType::Missile => {
                let (Some(target), Some(solution)) = (target, solution) else {
                    return Err(FireError::NoTarget(weapon));
                };
                FireOutcome::Projectile {
                    weapon,
                    target,
                    solution,
                }
            }
            WeaponType::Beam => {
                let spec = mount.beam.unwrap_or(BeamSpec {
                    beam_type: BeamType::FixedAim,
                    width: self.config.beams.width_ray_max,
                });
                let tracked = target.and_then(|t| {
                    self.world.get::<&Position>(t).ok().map(|p| (t, p.0))
                });
                // Fixed beams lock their point once, inside reach
                if spec.beam_type == BeamType::FixedAim {
                    if let Some((t, pos)) = tracked {
                        if pos.distance(origin) > mount.max_range {
                            return Err(FireError::OutOfWeaponRange(entity_id(t)));
                        }
                    }
                }
                let beam_id = self.beams.fire(
                    holder,
                    &mount,
                    spec,
                    tracked,
                    origin,
                    forward,
                    &self.config.beams,
                    self.bus.pending_mut(),
                );
                FireOutcome::Beam { beam_id }
            }
            WeaponType::Swarm => {
                let team = self.world.get::<&Team>(holder).ok().map(|t| *t);
                let swarm_id = self.swarms.launch(
                    holder,
                    team,
                    target,
                    weapon,
                    mount.damage,
                    mount.offset,
                    &self.config.swarm,
                );
                FireOutcome::Swarm { swarm_id }
            }
            WeaponType::Emp => {
                let center = if target.is_some() { aim_point } else { holder_pos };
                let effect_id = self.area.detonate_emp(
                    &self.world,
                    &self.spatial,
                    holder,
                    center,
                    &self.config.emp,
                    self.bus.pending_mut(),
                );
                FireOutcome::Emp {
                    effect_id,
                    origin: center,
                }
            }
            WeaponType::Flak => {
                let (effect_id, detonation_point) = self.area.fire_flak(
                    &self.world,
                    &mut self.rng,
                    holder,
                    origin,
                    aim_point,
                    mount.damage,
                    &self.config.flak,
                );
                FireOutcome::Flak {
                    effect_id,
                    detonation_point,
                }
            }
        };

        self.bus.publish(CombatEvent::WeaponFired {
            holder: holder_id,
            weapon,
            target: target.map(entity_id),
            aim_point,
        });
        Ok(outcome)
    }

    /// Route an external projectile impact through the resistance engine.
    ///
    /// `subsystem` is the struck subsystem id, if the impact hit one.
    pub fn resolve_hit(
        &mut self,
        target: Entity,
        weapon: WeaponType,
        damage: f64,
        subsystem: Option<u32>,
    ) -> Option<DamageOutcome> {
        let category = subsystem
            .and_then(|id| {
                self.world
                    .get::<&Subsystems>(target)
                    .ok()
                    .and_then(|subs| subsystem::category_of(&subs, id))
            })
            .unwrap_or(SubsystemCategory::Standard);
        let outcome = resistance::compute(&self.world, target, weapon, damage, category)?;
        self.bus.publish(CombatEvent::DamageResolved {
            target: entity_id(target),
            weapon,
            raw: outcome.raw,
            applied: outcome.applied,
            reduction: outcome.reduction,
            immunity: outcome.immunity,
        });
        self.bus.flush();
        Some(outcome)
    }

    // --- Tick ---

    /// Advance the core by `dt` seconds and return the resulting snapshot.
    pub fn tick(&mut self, dt: f64) -> CombatSnapshot {
        let dt = dt.max(0.0);
        self.process_commands();
        self.run_systems(dt);
        self.clock.advance(dt);
        self.bus.flush();
        self.snapshot()
    }

    /// Snapshot of the current state without advancing.
    pub fn snapshot(&self) -> CombatSnapshot {
        systems::snapshot::build_snapshot(
            &self.clock,
            &self.sessions,
            &self.beams,
            &self.swarms,
            &self.area,
        )
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        let now = self.clock.elapsed_secs;
        let events = self.bus.pending_mut();

        // 1. Forget despawned entities
        systems::cleanup::run(
            &self.world,
            &mut self.sessions,
            &mut self.validator,
            &mut self.solutions,
            &mut self.priority,
            &mut self.beams,
            &mut self.swarms,
            &mut self.area,
            events,
        );
        // 2. Expire caches by simulated age
        self.validator.prune(now, &self.config.sensors);
        self.solutions.prune(now, self.config.intercept.cache_ttl);
        self.priority.prune(now, self.config.priority.cache_ttl);
        // 3. Rescans, subsystem upkeep, aspect lock
        let mut ctx = SensorContext {
            world: &self.world,
            spatial: &self.spatial,
            validator: &mut self.validator,
            rng: &mut self.rng,
            config: &self.config,
            disruptions: self.area.disruptions(),
            now,
        };
        systems::targeting::run(&mut self.sessions, &mut ctx, dt, events);
        // 4. AI reassessment and auto-targeting
        systems::priority::run(
            &self.world,
            &mut self.sessions,
            &mut self.priority,
            now,
            &self.config.priority,
            self.area.disruptions(),
            &self.config.emp,
            events,
        );
        // 5. Fine motion: beams, swarms, flak fuses
        self.fine_accumulator += dt;
        let mut steps = 0;
        while self.fine_accumulator >= FINE_STEP - 1e-12 {
            if steps == MAX_FINE_STEPS_PER_TICK {
                warn!(
                    backlog = self.fine_accumulator,
                    "Fine step budget exhausted, dropping backlog"
                );
                self.fine_accumulator = 0.0;
                break;
            }
            let step_now = now + f64::from(steps) * FINE_STEP;
            self.beams.step(
                &self.world,
                &self.spatial,
                step_now,
                FINE_STEP,
                &self.config.beams,
                events,
            );
            self.swarms.step(
                &self.world,
                &self.spatial,
                step_now,
                FINE_STEP,
                &self.config.swarm,
                events,
            );
            self.area
                .step_shells(&self.world, &self.spatial, FINE_STEP, &self.config.flak, events);
            self.fine_accumulator -= FINE_STEP;
            steps += 1;
        }
        // 6. Area-effect bookkeeping at its own cadence
        self.area_accumulator += dt;
        while self.area_accumulator >= AREA_EFFECT_INTERVAL - 1e-12 {
            self.area.update(AREA_EFFECT_INTERVAL, events);
            self.area_accumulator -= AREA_EFFECT_INTERVAL;
        }
    }
}

fn session_mut(
    sessions: &mut BTreeMap<EntityId, TargetingSession>,
    holder: EntityId,
) -> Result<&mut TargetingSession, TargetingError> {
    sessions
        .get_mut(&holder)
        .ok_or(TargetingError::UnknownHolder(holder))
}
