//! Lead-aim intercept solver.
//!
//! Fixed-point iteration on time of flight: predict where the target will be
//! after `t`, recompute the flight time to that point from the (moving) muzzle,
//! repeat until the change in `t` is below the positional tolerance.

use std::collections::HashMap;

use glam::DVec3;
use hecs::Entity;
use tracing::trace;

use broadside_core::config::InterceptConfig;
use broadside_core::enums::{SkillLevel, SolveFailure};

/// Kinematic inputs for one solve.
#[derive(Debug, Clone, Copy)]
pub struct InterceptInput {
    pub shooter_pos: DVec3,
    pub shooter_vel: DVec3,
    /// Muzzle offset from the shooter center.
    pub mount_offset: DVec3,
    pub target_pos: DVec3,
    pub target_vel: DVec3,
    pub weapon_speed: f64,
    pub skill: SkillLevel,
}

/// A converged lead solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiringSolution {
    pub intercept_point: DVec3,
    /// Projectile time of flight to the intercept point (seconds).
    pub lead_time: f64,
    /// Target velocity relative to the shooter.
    pub relative_velocity: DVec3,
    /// Muzzle-to-target distance at solve time.
    pub distance: f64,
    /// Hit probability modifier (MIN_ACCURACY..=1).
    pub accuracy: f64,
    pub iterations: u32,
}

/// Base accuracy by gunnery skill.
pub fn skill_accuracy(skill: SkillLevel) -> f64 {
    match skill {
        SkillLevel::Rookie => 0.6,
        SkillLevel::Regular => 0.75,
        SkillLevel::Veteran => 0.85,
        SkillLevel::Elite => 0.95,
        SkillLevel::Ace => 1.0,
    }
}

/// Accuracy after range and lead-time falloff.
pub fn accuracy(skill: SkillLevel, distance: f64, lead_time: f64, config: &InterceptConfig) -> f64 {
    let range_factor = if distance > config.accuracy_range_threshold {
        let excess = (distance - config.accuracy_range_threshold) / config.accuracy_range_threshold;
        (1.0 - config.accuracy_range_falloff * excess).max(0.0)
    } else {
        1.0
    };
    let lead_factor = if lead_time > config.accuracy_lead_threshold {
        (1.0 - config.accuracy_lead_falloff * (lead_time - config.accuracy_lead_threshold))
            .max(0.0)
    } else {
        1.0
    };
    (skill_accuracy(skill) * range_factor * lead_factor).max(config.min_accuracy)
}

/// Solve for a lead intercept.
pub fn solve(
    input: &InterceptInput,
    config: &InterceptConfig,
) -> Result<FiringSolution, SolveFailure> {
    let speed = input.weapon_speed;
    if !(speed > 0.0 && speed.is_finite()) {
        return Err(SolveFailure::InvalidWeapon);
    }

    let muzzle = input.shooter_pos + input.mount_offset;
    let inherited = input.shooter_vel * config.velocity_inheritance;
    let to_target = input.target_pos - muzzle;
    let distance = to_target.length();

    // Step 1: A target opening the range at least as fast as the round can never be caught
    let recession = (input.target_vel - inherited).dot(to_target.normalize_or_zero());
    if recession >= speed {
        trace!(recession, speed, "Target outrunning weapon");
        return Err(SolveFailure::Outrunning);
    }

    // Step 2: Fixed-point iteration on flight time
    let tolerance = config.convergence_distance / speed;
    let mut t = distance / speed;
    let mut previous_delta = f64::INFINITY;
    let mut growing = 0u32;

    for iteration in 1..=config.max_iterations {
        let predicted = input.target_pos + input.target_vel * t;
        let origin = muzzle + inherited * t;
        let next_t = predicted.distance(origin) / speed;

        if !next_t.is_finite() || next_t < 0.0 {
            return Err(SolveFailure::Outrunning);
        }
        if next_t > config.prediction_horizon {
            trace!(next_t, "Intercept beyond prediction horizon");
            return Err(SolveFailure::BeyondHorizon);
        }

        let delta = (next_t - t).abs();
        t = next_t;

        if delta < tolerance {
            let intercept_point = input.target_pos + input.target_vel * t;
            return Ok(FiringSolution {
                intercept_point,
                lead_time: t,
                relative_velocity: input.target_vel - input.shooter_vel,
                distance,
                accuracy: accuracy(input.skill, distance, t, config),
                iterations: iteration,
            });
        }

        // Step 3: Divergence detection
        if delta > previous_delta {
            growing += 1;
            if growing >= config.divergence_streak {
                trace!(iteration, delta, "Intercept diverging");
                return Err(SolveFailure::Diverging);
            }
        } else {
            growing = 0;
        }
        previous_delta = delta;
    }

    Err(SolveFailure::NoConvergence)
}

#[derive(Debug, Clone, Copy)]
struct CachedSolution {
    result: Result<FiringSolution, SolveFailure>,
    weapon_speed: f64,
    solved_at: f64,
}

/// Solutions cached per (holder, target) for a short window of simulated time.
///
/// An entry only answers for the weapon speed it was solved with.
#[derive(Debug, Default)]
pub struct SolutionCache {
    entries: HashMap<(Entity, Entity), CachedSolution>,
}

impl SolutionCache {
    /// A cached result younger than `ttl`, if any.
    pub fn get(
        &self,
        holder: Entity,
        target: Entity,
        weapon_speed: f64,
        now: f64,
        ttl: f64,
    ) -> Option<Result<FiringSolution, SolveFailure>> {
        self.entries
            .get(&(holder, target))
            .filter(|c| now - c.solved_at < ttl && c.weapon_speed == weapon_speed)
            .map(|c| c.result)
    }

    pub fn insert(
        &mut self,
        holder: Entity,
        target: Entity,
        weapon_speed: f64,
        result: Result<FiringSolution, SolveFailure>,
        now: f64,
    ) {
        self.entries.insert(
            (holder, target),
            CachedSolution {
                result,
                weapon_speed,
                solved_at: now,
            },
        );
    }

    /// Drop expired entries.
    pub fn prune(&mut self, now: f64, ttl: f64) {
        self.entries.retain(|_, c| now - c.solved_at < ttl);
    }

    /// Drop every entry that mentions a dead entity.
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
