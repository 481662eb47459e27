//! Spatial queries over the combat world.
//!
//! Managers never walk the world for proximity or sight lines directly; they go
//! through a [`SpatialQuery`] so hosts can plug in a broadphase and tests can
//! script obstructions.

use glam::DVec3;
use hecs::{Entity, World};

use broadside_core::components::{Hull, Obstacle};
use broadside_core::types::Position;

/// Proximity and sight-line queries.
pub trait SpatialQuery {
    /// Ships (entities with `Position` and `Hull`) within `radius` of `center`.
    fn find_in_radius(&self, world: &World, center: DVec3, radius: f64) -> Vec<Entity>;

    /// True if a sight-blocking body lies on the segment `from`..`to`.
    /// Bodies listed in `ignore` never block.
    fn raycast_obstruction(&self, world: &World, from: DVec3, to: DVec3, ignore: &[Entity])
        -> bool;
}

/// Brute-force implementation over the hecs world.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldSpatial;

impl SpatialQuery for WorldSpatial {
    fn find_in_radius(&self, world: &World, center: DVec3, radius: f64) -> Vec<Entity> {
        let radius_sq = radius * radius;
        world
            .query::<(&Position, &Hull)>()
            .iter()
            .filter(|(_, (pos, _))| pos.0.distance_squared(center) <= radius_sq)
            .map(|(entity, _)| entity)
            .collect()
    }

    fn raycast_obstruction(
        &self,
        world: &World,
        from: DVec3,
        to: DVec3,
        ignore: &[Entity],
    ) -> bool {
        world
            .query::<(&Position, &Obstacle)>()
            .iter()
            .any(|(entity, (pos, obstacle))| {
                !ignore.contains(&entity) && segment_distance(from, to, pos.0) < obstacle.radius
            })
    }
}

/// Parameter in 0..=1 of the point on `a`..`b` closest to `p`.
pub fn closest_param(a: DVec3, b: DVec3, p: DVec3) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return 0.0;
    }
    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
}

/// Shortest distance from `p` to the segment `a`..`b`.
pub fn segment_distance(a: DVec3, b: DVec3, p: DVec3) -> f64 {
    let t = closest_param(a, b, p);
    p.distance(a + (b - a) * t)
}

/// Scriptable spatial double for tests.
///
/// Proximity falls through to the brute-force search; sight lines are blocked
/// by the listed spheres only. Counts ray casts so cache behaviour is visible.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockSpatial {
    pub walls: Vec<(DVec3, f64)>,
    pub ray_casts: std::cell::Cell<u32>,
}

#[cfg(test)]
impl MockSpatial {
    pub fn with_wall(center: DVec3, radius: f64) -> Self {
        Self {
            walls: vec![(center, radius)],
            ray_casts: std::cell::Cell::new(0),
        }
    }
}

#[cfg(test)]
impl SpatialQuery for MockSpatial {
    fn find_in_radius(&self, world: &World, center: DVec3, radius: f64) -> Vec<Entity> {
        WorldSpatial.find_in_radius(world, center, radius)
    }

    fn raycast_obstruction(
        &self,
        _world: &World,
        from: DVec3,
        to: DVec3,
        _ignore: &[Entity],
    ) -> bool {
        self.ray_casts.set(self.ray_casts.get() + 1);
        self.walls
            .iter()
            .any(|(center, radius)| segment_distance(from, to, *center) < *radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadside_core::enums::ShipClass;

    #[test]
    fn test_segment_distance() {
        let d = segment_distance(
            DVec3::ZERO,
            DVec3::new(100.0, 0.0, 0.0),
            DVec3::new(50.0, 7.0, 0.0),
        );
        assert!((d - 7.0).abs() < 1e-9);
        // Past the end clamps to the endpoint
        let d = segment_distance(
            DVec3::ZERO,
            DVec3::new(100.0, 0.0, 0.0),
            DVec3::new(103.0, 4.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_find_in_radius_only_returns_ships() {
        let mut world = World::new();
        let near = world.spawn((
            Position::new(100.0, 0.0, 0.0),
            Hull::new(ShipClass::Fighter, 100.0),
        ));
        let _far = world.spawn((
            Position::new(900.0, 0.0, 0.0),
            Hull::new(ShipClass::Fighter, 100.0),
        ));
        let _rock = world.spawn((Position::new(50.0, 0.0, 0.0), Obstacle { radius: 20.0 }));

        let found = WorldSpatial.find_in_radius(&world, DVec3::ZERO, 500.0);
        assert_eq!(found, vec![near]);
    }

    #[test]
    fn test_obstacle_blocks_ray() {
        let mut world = World::new();
        let rock = world.spawn((Position::new(500.0, 0.0, 0.0), Obstacle { radius: 40.0 }));
        let from = DVec3::ZERO;
        let to = DVec3::new(1000.0, 0.0, 0.0);

        assert!(WorldSpatial.raycast_obstruction(&world, from, to, &[]));
        assert!(!WorldSpatial.raycast_obstruction(&world, from, to, &[rock]));
        assert!(!WorldSpatial.raycast_obstruction(&world, from, DVec3::new(0.0, 1000.0, 0.0), &[]));
    }
}
