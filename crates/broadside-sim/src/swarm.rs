//! Swarm missile coordinator.
//!
//! A swarm launches its missiles one at a time on a fixed interval. Each
//! missile flies a spiral around its travel line, then breaks into pursuit with
//! a turn-rate cap and lead-point aim, and detonates on proximity.

use std::f64::consts::TAU;

use glam::{DQuat, DVec3};
use hecs::{Entity, World};
use tracing::{debug, info};

use broadside_core::components::Hull;
use broadside_core::config::{SpiralPattern, SwarmConfig};
use broadside_core::constants::SWARM_MIN_CLOSING_SPEED;
use broadside_core::enums::{
    MissileDetachReason, SubsystemCategory, SwarmMissilePhase, Team, WeaponType,
};
use broadside_core::events::CombatEvent;
use broadside_core::types::{Heading, Position, Velocity};

use crate::handle::entity_id;
use crate::resistance;
use crate::spatial::SpatialQuery;

/// Launch deadlines within this many seconds count as due.
const LAUNCH_EPSILON: f64 = 1e-9;

/// One missile in flight.
#[derive(Debug, Clone)]
pub struct SwarmMissile {
    pub index: u32,
    pub pattern: SpiralPattern,
    /// Angular offset so missiles of one swarm fan out around the axis.
    pub phase_offset: f64,
    pub launch_pos: DVec3,
    pub travel_dir: DVec3,
    p1: DVec3,
    p2: DVec3,
    pub position: DVec3,
    pub velocity: DVec3,
    pub phase: SwarmMissilePhase,
    pub age: f64,
    pub launched_at: f64,
    pub target: Option<Entity>,
    pub reacquire_attempts: u32,
    pub reacquire_cooldown: f64,
}

/// Spiral plane basis for a travel direction and pattern axis.
///
/// `p1 = normalize(travel × axis)`, `p2 = normalize(travel × p1)`. Falls back
/// to an arbitrary orthonormal pair when the axis is parallel to travel.
pub fn spiral_basis(travel: DVec3, axis: DVec3) -> (DVec3, DVec3) {
    let travel = travel.normalize_or_zero();
    if travel == DVec3::ZERO {
        return (DVec3::X, DVec3::Z);
    }
    let p1 = travel.cross(axis).normalize_or_zero();
    if p1 == DVec3::ZERO {
        return travel.any_orthonormal_pair();
    }
    let p2 = travel.cross(p1).normalize();
    (p1, p2)
}

/// Spiral position `elapsed` seconds after launch.
#[allow(clippy::too_many_arguments)]
pub fn spiral_position(
    launch_pos: DVec3,
    travel_dir: DVec3,
    speed: f64,
    pattern: &SpiralPattern,
    p1: DVec3,
    p2: DVec3,
    phase_offset: f64,
    elapsed: f64,
) -> DVec3 {
    let progress = if pattern.duration > 0.0 {
        (elapsed / pattern.duration).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let end = launch_pos + travel_dir * speed * pattern.duration;
    let center = launch_pos.lerp(end, progress);
    let theta = elapsed * pattern.frequency * TAU * pattern.direction + phase_offset;
    center + pattern.radius * (theta.cos() * p1 + theta.sin() * p2)
}

/// Turn `current` toward `desired` by at most `max_angle` radians.
pub fn turn_toward(current: DVec3, desired: DVec3, max_angle: f64) -> DVec3 {
    let current = current.normalize_or_zero();
    let desired = desired.normalize_or_zero();
    if current == DVec3::ZERO {
        return desired;
    }
    if desired == DVec3::ZERO {
        return current;
    }
    let angle = current.dot(desired).clamp(-1.0, 1.0).acos();
    if angle <= max_angle {
        return desired;
    }
    let mut axis = current.cross(desired).normalize_or_zero();
    if axis == DVec3::ZERO {
        axis = current.any_orthonormal_vector();
    }
    DQuat::from_axis_angle(axis, max_angle) * current
}

/// Lead point for pursuit: target position advanced by its time-to-go.
pub fn lead_point(
    missile_pos: DVec3,
    missile_vel: DVec3,
    target_pos: DVec3,
    target_vel: DVec3,
    min_closing: f64,
) -> DVec3 {
    let los = target_pos - missile_pos;
    let distance = los.length();
    let closing = -(target_vel - missile_vel).dot(los.normalize_or_zero());
    let t_go = distance / closing.max(min_closing);
    target_pos + target_vel * t_go
}

/// One swarm salvo.
#[derive(Debug, Clone)]
pub struct Swarm {
    pub id: u32,
    pub owner: Entity,
    pub team: Option<Team>,
    pub target: Option<Entity>,
    pub weapon: WeaponType,
    pub damage: f64,
    pub mount_offset: DVec3,
    pub total: u32,
    /// Launch cursor. Never exceeds `total`.
    pub launched: u32,
    pub next_launch_in: f64,
    pub missiles: Vec<SwarmMissile>,
    pub formation_complete: bool,
    /// Owner died mid-sequence; no further launches.
    pub abandoned: bool,
}

impl Swarm {
    fn sequence_done(&self) -> bool {
        self.formation_complete || self.abandoned
    }
}

/// Owns every live swarm.
#[derive(Debug, Default)]
pub struct SwarmManager {
    swarms: Vec<Swarm>,
    next_id: u32,
}

impl SwarmManager {
    pub fn len(&self) -> usize {
        self.swarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swarms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Swarm> {
        self.swarms.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Swarm> {
        self.swarms.iter().find(|s| s.id == id)
    }

    /// Create a swarm. The first missile leaves on the next fine step.
    #[allow(clippy::too_many_arguments)]
    pub fn launch(
        &mut self,
        owner: Entity,
        team: Option<Team>,
        target: Option<Entity>,
        weapon: WeaponType,
        damage: f64,
        mount_offset: DVec3,
        config: &SwarmConfig,
    ) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        info!(
            swarm_id = id,
            owner = ?entity_id(owner),
            count = config.missile_count,
            "Swarm launch started"
        );
        self.swarms.push(Swarm {
            id,
            owner,
            team,
            target,
            weapon,
            damage,
            mount_offset,
            total: config.missile_count,
            launched: 0,
            next_launch_in: 0.0,
            missiles: Vec::new(),
            formation_complete: false,
            abandoned: false,
        });
        id
    }

    /// Drop references to dead entities. Missiles keep flying and reacquire.
    pub fn purge(&mut self, is_alive: impl Fn(Entity) -> bool) {
        for swarm in &mut self.swarms {
            if swarm.target.is_some_and(|e| !is_alive(e)) {
                swarm.target = None;
            }
            if !is_alive(swarm.owner) && !swarm.sequence_done() {
                swarm.abandoned = true;
            }
            for missile in &mut swarm.missiles {
                if missile.target.is_some_and(|e| !is_alive(e)) {
                    missile.target = None;
                }
            }
        }
    }

    /// Advance every swarm by one fine step.
    pub fn step<S: SpatialQuery>(
        &mut self,
        world: &World,
        spatial: &S,
        now: f64,
        dt: f64,
        config: &SwarmConfig,
        events: &mut Vec<CombatEvent>,
    ) {
        for swarm in &mut self.swarms {
            launch_due(swarm, world, now, dt, config, events);
            fly_missiles(swarm, world, spatial, dt, config, events);
        }
        self.swarms
            .retain(|s| !(s.sequence_done() && s.missiles.is_empty()));
    }
}

fn launch_due(
    swarm: &mut Swarm,
    world: &World,
    now: f64,
    dt: f64,
    config: &SwarmConfig,
    events: &mut Vec<CombatEvent>,
) {
    if swarm.sequence_done() {
        return;
    }
    let Ok(owner_pos) = world.get::<&Position>(swarm.owner).map(|p| p.0) else {
        swarm.abandoned = true;
        return;
    };
    let heading = world
        .get::<&Heading>(swarm.owner)
        .map(|h| h.forward())
        .unwrap_or(DVec3::Y);
    let launch_pos = owner_pos + swarm.mount_offset;
    let target_pos = swarm
        .target
        .and_then(|t| world.get::<&Position>(t).ok().map(|p| p.0));
    let travel_dir = target_pos
        .map(|p| (p - launch_pos).normalize_or_zero())
        .filter(|d| *d != DVec3::ZERO)
        .unwrap_or(heading);

    while swarm.launched < swarm.total && swarm.next_launch_in <= LAUNCH_EPSILON {
        let index = swarm.launched;
        let pattern = config.patterns[(index % 4) as usize];
        let (p1, p2) = spiral_basis(travel_dir, pattern.axis);
        let phase_offset = f64::from(index) * TAU / f64::from(swarm.total);
        let position = spiral_position(
            launch_pos,
            travel_dir,
            config.missile_speed,
            &pattern,
            p1,
            p2,
            phase_offset,
            0.0,
        );
        swarm.missiles.push(SwarmMissile {
            index,
            pattern,
            phase_offset,
            launch_pos,
            travel_dir,
            p1,
            p2,
            position,
            velocity: travel_dir * config.missile_speed,
            phase: SwarmMissilePhase::Spiral,
            age: 0.0,
            launched_at: now,
            target: swarm.target,
            reacquire_attempts: 0,
            reacquire_cooldown: 0.0,
        });
        swarm.launched += 1;
        swarm.next_launch_in += config.launch_interval;
        events.push(CombatEvent::SwarmMissileFired {
            swarm_id: swarm.id,
            missile_index: index,
        });
    }

    if swarm.launched >= swarm.total {
        swarm.formation_complete = true;
        info!(swarm_id = swarm.id, "Swarm formation complete");
        events.push(CombatEvent::SwarmFormationComplete { swarm_id: swarm.id });
    } else {
        swarm.next_launch_in -= dt;
    }
}

fn fly_missiles<S: SpatialQuery>(
    swarm: &mut Swarm,
    world: &World,
    spatial: &S,
    dt: f64,
    config: &SwarmConfig,
    events: &mut Vec<CombatEvent>,
) {
    let mut detached: Vec<(u32, MissileDetachReason)> = Vec::new();

    for missile in &mut swarm.missiles {
        missile.age += dt;
        if missile.age >= config.lifetime {
            detached.push((missile.index, MissileDetachReason::FuelExhausted));
            continue;
        }

        match missile.phase {
            SwarmMissilePhase::Spiral => {
                let next = spiral_position(
                    missile.launch_pos,
                    missile.travel_dir,
                    config.missile_speed,
                    &missile.pattern,
                    missile.p1,
                    missile.p2,
                    missile.phase_offset,
                    missile.age,
                );
                if dt > 0.0 {
                    missile.velocity = (next - missile.position) / dt;
                }
                missile.position = next;
                if missile.age >= missile.pattern.duration {
                    missile.phase = if missile.target.is_some() {
                        SwarmMissilePhase::Pursuit
                    } else {
                        SwarmMissilePhase::Reacquiring
                    };
                    missile.velocity = missile
                        .velocity
                        .normalize_or(missile.travel_dir)
                        * config.missile_speed;
                }
            }
            SwarmMissilePhase::Pursuit => {
                let target = missile.target.and_then(|t| {
                    let pos = world.get::<&Position>(t).ok()?.0;
                    let vel = world.get::<&Velocity>(t).map(|v| v.0).unwrap_or(DVec3::ZERO);
                    let radius = world
                        .get::<&Hull>(t)
                        .map(|h| h.class.collision_radius())
                        .unwrap_or(0.0);
                    Some((t, pos, vel, radius))
                });
                let Some((entity, target_pos, target_vel, radius)) = target else {
                    missile.target = None;
                    missile.phase = SwarmMissilePhase::Reacquiring;
                    missile.position += missile.velocity * dt;
                    continue;
                };

                let aim = lead_point(
                    missile.position,
                    missile.velocity,
                    target_pos,
                    target_vel,
                    SWARM_MIN_CLOSING_SPEED,
                );
                let heading = turn_toward(
                    missile.velocity,
                    aim - missile.position,
                    config.turn_rate * dt,
                );
                missile.velocity = heading * config.missile_speed;
                missile.position += missile.velocity * dt;

                if missile.position.distance(target_pos) <= config.proximity + radius {
                    if let Some(outcome) = resistance::compute(
                        world,
                        entity,
                        swarm.weapon,
                        swarm.damage,
                        SubsystemCategory::Standard,
                    ) {
                        events.push(CombatEvent::DamageResolved {
                            target: entity_id(entity),
                            weapon: swarm.weapon,
                            raw: outcome.raw,
                            applied: outcome.applied,
                            reduction: outcome.reduction,
                            immunity: outcome.immunity,
                        });
                    }
                    detached.push((missile.index, MissileDetachReason::Detonated));
                }
            }
            SwarmMissilePhase::Reacquiring => {
                missile.position += missile.velocity * dt;
                missile.reacquire_cooldown -= dt;
                if missile.reacquire_cooldown > 0.0 {
                    continue;
                }
                if missile.reacquire_attempts >= config.max_reacquire {
                    detached.push((missile.index, MissileDetachReason::TargetLost));
                    continue;
                }
                missile.reacquire_attempts += 1;
                missile.reacquire_cooldown = config.reacquire_cooldown;
                if let Some(found) = nearest_hostile(
                    world,
                    spatial,
                    swarm.owner,
                    swarm.team,
                    missile.position,
                    config.reacquire_radius,
                ) {
                    debug!(
                        swarm_id = swarm.id,
                        missile = missile.index,
                        "Swarm missile reacquired"
                    );
                    missile.target = Some(found);
                    missile.phase = SwarmMissilePhase::Pursuit;
                }
            }
        }
    }

    for (index, reason) in detached {
        swarm.missiles.retain(|m| m.index != index);
        events.push(CombatEvent::SwarmMissileDetached {
            swarm_id: swarm.id,
            missile_index: index,
            reason,
        });
    }
}

fn nearest_hostile<S: SpatialQuery>(
    world: &World,
    spatial: &S,
    owner: Entity,
    team: Option<Team>,
    from: DVec3,
    radius: f64,
) -> Option<Entity> {
    let team = team?;
    spatial
        .find_in_radius(world, from, radius)
        .into_iter()
        .filter(|e| *e != owner)
        .filter_map(|e| {
            let t = *world.get::<&Team>(e).ok()?;
            let pos = world.get::<&Position>(e).ok()?.0;
            team.is_hostile_to(t)
                .then_some((e, pos.distance_squared(from), entity_id(e)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)))
        .map(|(e, _, _)| e)
}
