//! Conversion between hecs entities and serializable ids.

use hecs::Entity;

use broadside_core::types::EntityId;

/// Stable id for events and snapshots.
pub fn entity_id(entity: Entity) -> EntityId {
    EntityId(entity.to_bits().get())
}

/// Resolve an id back to an entity handle. The entity may since have died.
pub fn entity_from_id(id: EntityId) -> Option<Entity> {
    Entity::from_bits(id.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    #[test]
    fn test_id_round_trip() {
        let mut world = World::new();
        let a = world.spawn((1u32,));
        let b = world.spawn((2u32,));
        assert_eq!(entity_from_id(entity_id(a)), Some(a));
        assert_ne!(entity_id(a), entity_id(b));
        assert_eq!(entity_from_id(EntityId(0)), None);
    }
}
