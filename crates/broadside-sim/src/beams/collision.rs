//! Beam collision method selection and sweep.

use glam::DVec3;
use hecs::{Entity, World};

use broadside_core::components::Hull;
use broadside_core::config::BeamConfig;
use broadside_core::enums::{CollisionMethod, Team};
use broadside_core::types::Position;

use crate::spatial::{segment_distance, SpatialQuery};

/// Largest ship collision radius, used to pad broadphase queries.
const MAX_SHIP_RADIUS: f64 = 200.0;

/// One ship touched by a beam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamContact {
    pub entity: Entity,
    /// Distance from the emitter along the beam.
    pub distance: f64,
}

/// Pick the collision method for a beam of `width` reaching `range`.
pub fn collision_method(width: f64, range: f64, config: &BeamConfig) -> CollisionMethod {
    if width < config.width_ray_max {
        CollisionMethod::PrecisionRay
    } else if width > config.width_volume_min {
        CollisionMethod::Volumetric
    } else if range <= config.hybrid_range_split {
        CollisionMethod::HybridRay
    } else {
        CollisionMethod::HybridVolume
    }
}

/// Ships hit by a beam, nearest first.
///
/// Ray methods stop at the first hit. Volumetric methods pass through up to
/// `max_penetration` ships. The owner and its team mates are never hit.
#[allow(clippy::too_many_arguments)]
pub fn sweep<S: SpatialQuery>(
    world: &World,
    spatial: &S,
    owner: Entity,
    origin: DVec3,
    direction: DVec3,
    range: f64,
    width: f64,
    method: CollisionMethod,
    max_penetration: usize,
) -> Vec<BeamContact> {
    let direction = direction.normalize_or_zero();
    if direction == DVec3::ZERO || range <= 0.0 {
        return Vec::new();
    }
    let end = origin + direction * range;
    let owner_team = world.get::<&Team>(owner).map(|t| *t).ok();
    let half_width = if method.is_volumetric() { width * 0.5 } else { 0.0 };

    let midpoint = origin + direction * (range * 0.5);
    let mut contacts: Vec<BeamContact> = spatial
        .find_in_radius(world, midpoint, range * 0.5 + MAX_SHIP_RADIUS + half_width)
        .into_iter()
        .filter(|e| *e != owner)
        .filter(|e| {
            let team = world.get::<&Team>(*e).map(|t| *t).ok();
            !(owner_team.is_some() && team == owner_team)
        })
        .filter_map(|e| {
            let pos = world.get::<&Position>(e).ok()?.0;
            let radius = world.get::<&Hull>(e).ok()?.class.collision_radius();
            if segment_distance(origin, end, pos) > radius + half_width {
                return None;
            }
            let along = (pos - origin).dot(direction);
            (along >= -radius).then_some(BeamContact {
                entity: e,
                distance: along.max(0.0),
            })
        })
        .collect();

    contacts.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    let limit = if method.is_volumetric() {
        max_penetration
    } else {
        1
    };
    contacts.truncate(limit);
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadside_core::enums::ShipClass;
    use broadside_core::types::Velocity;

    use crate::spatial::WorldSpatial;
    use crate::world_setup::spawn_ship;

    #[test]
    fn test_method_by_width_and_range() {
        let cfg = BeamConfig::default();
        assert_eq!(collision_method(1.0, 5000.0, &cfg), CollisionMethod::PrecisionRay);
        assert_eq!(collision_method(12.0, 100.0, &cfg), CollisionMethod::Volumetric);
        assert_eq!(collision_method(4.0, 1000.0, &cfg), CollisionMethod::HybridRay);
        assert_eq!(collision_method(4.0, 2000.0, &cfg), CollisionMethod::HybridVolume);
        // Thresholds themselves fall into the hybrid band
        assert_eq!(collision_method(2.0, 1500.0, &cfg), CollisionMethod::HybridRay);
        assert_eq!(collision_method(8.0, 1501.0, &cfg), CollisionMethod::HybridVolume);
    }

    fn line_of_fighters(world: &mut World, count: usize) -> (Entity, Vec<Entity>) {
        let owner = spawn_ship(
            world,
            Team::Alliance,
            ShipClass::Cruiser,
            Position::default(),
            Velocity::default(),
        );
        let targets = (1..=count)
            .map(|i| {
                spawn_ship(
                    world,
                    Team::Pirates,
                    ShipClass::Fighter,
                    Position::new(0.0, 200.0 * i as f64, 0.0),
                    Velocity::default(),
                )
            })
            .collect();
        (owner, targets)
    }

    #[test]
    fn test_ray_hits_first_only() {
        let mut world = World::new();
        let (owner, targets) = line_of_fighters(&mut world, 4);
        let hits = sweep(
            &world,
            &WorldSpatial,
            owner,
            DVec3::ZERO,
            DVec3::Y,
            2000.0,
            1.0,
            CollisionMethod::PrecisionRay,
            3,
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, targets[0]);
    }

    #[test]
    fn test_volume_penetrates_up_to_cap() {
        let mut world = World::new();
        let (owner, targets) = line_of_fighters(&mut world, 5);
        let hits = sweep(
            &world,
            &WorldSpatial,
            owner,
            DVec3::ZERO,
            DVec3::Y,
            2000.0,
            12.0,
            CollisionMethod::Volumetric,
            3,
        );
        let ids: Vec<Entity> = hits.iter().map(|h| h.entity).collect();
        assert_eq!(ids, targets[..3].to_vec());
    }

    #[test]
    fn test_width_widens_volume_hits() {
        let mut world = World::new();
        let owner = world.spawn((Team::Alliance, Position::default()));
        // Fighter radius 8, sitting 12m off the beam axis
        let off_axis = spawn_ship(
            &mut world,
            Team::Pirates,
            ShipClass::Fighter,
            Position::new(12.0, 500.0, 0.0),
            Velocity::default(),
        );
        let thin = sweep(
            &world,
            &WorldSpatial,
            owner,
            DVec3::ZERO,
            DVec3::Y,
            1000.0,
            1.0,
            CollisionMethod::PrecisionRay,
            3,
        );
        let wide = sweep(
            &world,
            &WorldSpatial,
            owner,
            DVec3::ZERO,
            DVec3::Y,
            1000.0,
            10.0,
            CollisionMethod::Volumetric,
            3,
        );
        assert!(thin.is_empty());
        assert_eq!(wide.len(), 1);
        assert_eq!(wide[0].entity, off_axis);
    }
}
