//! Beam aiming algorithms.
//!
//! Each beam type carries its own aiming state. `update_aim` advances that state
//! by one fine step and returns the direction the emitter should point.

use glam::DVec3;
use hecs::{Entity, World};

use broadside_core::config::BeamConfig;
use broadside_core::enums::{BeamType, Team};
use broadside_core::types::{Heading, Position, Velocity};

use crate::spatial::SpatialQuery;

/// Per-type aiming state.
#[derive(Debug, Clone, PartialEq)]
pub enum AimState {
    /// Holds on the point the target occupied when the beam fired.
    FixedAim { point: DVec3 },
    /// Sweeps the eight sign octants, dwelling in each.
    OctantSweep { octant: u8, dwell: f64 },
    /// Retargets the nearest valid contact every step.
    AutoClosest { target: Option<Entity> },
    /// Leads a target; bounded reacquisition when it is lost.
    PredictiveChase {
        target: Option<Entity>,
        attempts: u32,
        cooldown: f64,
    },
    /// Follows the mount's orientation.
    TurretFixed,
}

impl AimState {
    pub fn beam_type(&self) -> BeamType {
        match self {
            AimState::FixedAim { .. } => BeamType::FixedAim,
            AimState::OctantSweep { .. } => BeamType::OctantSweep,
            AimState::AutoClosest { .. } => BeamType::AutoClosest,
            AimState::PredictiveChase { .. } => BeamType::PredictiveChase,
            AimState::TurretFixed => BeamType::TurretFixed,
        }
    }

    /// Initial state for a freshly fired beam.
    pub fn initial(beam_type: BeamType, target: Option<(Entity, DVec3)>, heading: DVec3) -> Self {
        match beam_type {
            BeamType::FixedAim => AimState::FixedAim {
                point: target.map_or(heading, |(_, pos)| pos),
            },
            BeamType::OctantSweep => AimState::OctantSweep {
                octant: octant_of(heading),
                dwell: 0.0,
            },
            BeamType::AutoClosest => AimState::AutoClosest {
                target: target.map(|(e, _)| e),
            },
            BeamType::PredictiveChase => AimState::PredictiveChase {
                target: target.map(|(e, _)| e),
                attempts: 0,
                cooldown: 0.0,
            },
            BeamType::TurretFixed => AimState::TurretFixed,
        }
    }

    /// Entity this state is tracking, if any.
    pub fn tracked(&self) -> Option<Entity> {
        match self {
            AimState::AutoClosest { target } | AimState::PredictiveChase { target, .. } => *target,
            _ => None,
        }
    }

    /// Forget a tracked entity that died.
    pub fn purge(&mut self, is_alive: impl Fn(Entity) -> bool) {
        match self {
            AimState::AutoClosest { target } | AimState::PredictiveChase { target, .. } => {
                if target.is_some_and(|e| !is_alive(e)) {
                    *target = None;
                }
            }
            _ => {}
        }
    }
}

/// Outcome of one aim update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimUpdate {
    /// Point along this direction.
    Aim(DVec3),
    /// Keep the previous direction.
    Hold,
    /// Nothing left to chase; the beam should stop.
    Exhausted,
}

/// Octant index from direction signs: bit 0 = +x, bit 1 = +y, bit 2 = +z.
pub fn octant_of(direction: DVec3) -> u8 {
    u8::from(direction.x >= 0.0)
        | (u8::from(direction.y >= 0.0) << 1)
        | (u8::from(direction.z >= 0.0) << 2)
}

/// Unit vector through the center of an octant.
pub fn octant_center(octant: u8) -> DVec3 {
    let sign = |bit: u8| if octant & bit != 0 { 1.0 } else { -1.0 };
    DVec3::new(sign(1), sign(2), sign(4)).normalize()
}

/// Everything an aim update reads.
pub struct AimContext<'a, S: SpatialQuery> {
    pub world: &'a World,
    pub spatial: &'a S,
    pub owner: Entity,
    pub origin: DVec3,
    pub range: f64,
    pub config: &'a BeamConfig,
}

impl<'a, S: SpatialQuery> AimContext<'a, S> {
    /// Hostile ships in range, nearest first, optionally restricted.
    fn hostiles(&self, accept: impl Fn(DVec3) -> bool) -> Vec<(Entity, DVec3)> {
        let Ok(owner_team) = self.world.get::<&Team>(self.owner).map(|t| *t) else {
            return Vec::new();
        };
        let mut found: Vec<(Entity, DVec3, f64)> = self
            .spatial
            .find_in_radius(self.world, self.origin, self.range)
            .into_iter()
            .filter(|e| *e != self.owner)
            .filter(|e| {
                self.world
                    .get::<&Team>(*e)
                    .is_ok_and(|t| owner_team.is_hostile_to(*t))
            })
            .filter_map(|e| {
                let pos = self.world.get::<&Position>(e).ok()?.0;
                accept(pos - self.origin).then_some((e, pos, pos.distance(self.origin)))
            })
            .collect();
        found.sort_by(|a, b| a.2.total_cmp(&b.2));
        found.into_iter().map(|(e, pos, _)| (e, pos)).collect()
    }

    fn in_range(&self, target: Entity) -> Option<DVec3> {
        let pos = self.world.get::<&Position>(target).ok()?.0;
        (pos.distance(self.origin) <= self.range).then_some(pos)
    }

    fn direction_to(&self, point: DVec3) -> AimUpdate {
        let dir = (point - self.origin).normalize_or_zero();
        if dir == DVec3::ZERO {
            AimUpdate::Hold
        } else {
            AimUpdate::Aim(dir)
        }
    }
}

/// Advance an aiming state by `dt` and return where to point.
pub fn update_aim<S: SpatialQuery>(
    state: &mut AimState,
    ctx: &AimContext<'_,
    S>,
    dt: f64,
) -> AimUpdate {
    match state {
        AimState::FixedAim { point } => ctx.direction_to(*point),

        AimState::OctantSweep { octant, dwell } => {
            *dwell += dt;
            if *dwell >= ctx.config.octant_dwell {
                *dwell -= ctx.config.octant_dwell;
                *octant = (*octant + 1) % 8;
            }
            let current = *octant;
            match ctx.hostiles(|offset| octant_of(offset) == current).first() {
                Some((_, pos)) => ctx.direction_to(*pos),
                None => AimUpdate::Aim(octant_center(current)),
            }
        }

        AimState::AutoClosest { target } => match ctx.hostiles(|_| true).first() {
            Some((entity, pos)) => {
                *target = Some(*entity);
                ctx.direction_to(*pos)
            }
            None => {
                *target = None;
                AimUpdate::Hold
            }
        },

        AimState::PredictiveChase {
            target,
            attempts,
            cooldown,
        } => {
            if let Some(pos) = target.and_then(|t| ctx.in_range(t)) {
                let vel = target
                    .and_then(|t| ctx.world.get::<&Velocity>(t).ok().map(|v| v.0))
                    .unwrap_or(DVec3::ZERO);
                return ctx.direction_to(pos + vel * ctx.config.chase_horizon);
            }

            // Target gone or out of reach: bounded reacquisition
            *target = None;
            *cooldown -= dt;
            if *cooldown > 0.0 {
                return AimUpdate::Hold;
            }
            if *attempts >= ctx.config.chase_max_reacquire {
                return AimUpdate::Exhausted;
            }
            *attempts += 1;
            *cooldown = ctx.config.chase_reacquire_cooldown;
            match ctx.hostiles(|_| true).first() {
                Some((entity, pos)) => {
                    *target = Some(*entity);
                    ctx.direction_to(*pos)
                }
                None => AimUpdate::Hold,
            }
        }

        AimState::TurretFixed => {
            let heading = ctx
                .world
                .get::<&Heading>(ctx.owner)
                .map(|h| h.forward())
                .unwrap_or(DVec3::Y);
            AimUpdate::Aim(heading)
        }
    }
}
