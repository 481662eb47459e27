//! Entity spawn factories for the combat world.
//!
//! Hosts own their ships; these helpers give every ship the component bundle
//! the targeting core expects so scenarios and tests stay short.

use hecs::{Entity, World};

use broadside_core::components::*;
use broadside_core::enums::*;
use broadside_core::types::{Heading, Position, Velocity};

/// Default hull points per class.
pub fn default_hull_max(class: ShipClass) -> f64 {
    match class {
        ShipClass::Fighter => 100.0,
        ShipClass::Bomber => 150.0,
        ShipClass::Corvette => 400.0,
        ShipClass::Frigate => 800.0,
        ShipClass::Destroyer => 1_500.0,
        ShipClass::Cruiser => 3_000.0,
        ShipClass::Capital => 8_000.0,
    }
}

/// Build the standard subsystem loadout for a class.
///
/// Small craft carry engine, weapons and sensors. Corvettes and up add shields
/// and comms; capital-grade hulls add turrets and a core reactor.
pub fn build_default_subsystems(class: ShipClass) -> Subsystems {
    let mut list = vec![
        Subsystem {
            critical: true,
            ..Subsystem::new(1, "Main Engine", SubsystemKind::Engine)
        },
        Subsystem::new(2, "Weapons Array", SubsystemKind::Weapons),
        Subsystem::new(3, "Sensor Suite", SubsystemKind::Sensors),
    ];

    if class >= ShipClass::Corvette {
        list.push(Subsystem::new(4, "Shield Generator", SubsystemKind::Shields));
        list.push(Subsystem::new(5, "Comms Relay", SubsystemKind::Comms));
    }

    if class.is_capital_grade() {
        list.push(Subsystem {
            category: SubsystemCategory::Turret,
            turret_active: true,
            ..Subsystem::new(6, "Port Turret", SubsystemKind::Weapons)
        });
        list.push(Subsystem {
            category: SubsystemCategory::Turret,
            turret_active: true,
            ..Subsystem::new(7, "Starboard Turret", SubsystemKind::Weapons)
        });
        list.push(Subsystem {
            category: SubsystemCategory::Core,
            critical: true,
            ..Subsystem::new(8, "Reactor Core", SubsystemKind::Reactor)
        });
    }

    Subsystems { list }
}

/// Build the stock armament for a class.
pub fn default_armament(class: ShipClass) -> Armament {
    let mut weapons = vec![WeaponType::Kinetic, WeaponType::Missile];
    if class >= ShipClass::Corvette {
        weapons.extend([WeaponType::Energy, WeaponType::Flak]);
    }
    if class >= ShipClass::Destroyer {
        weapons.extend([WeaponType::Beam, WeaponType::Swarm, WeaponType::Emp]);
    }
    Armament {
        mounts: weapons.into_iter().map(WeaponMount::standard).collect(),
    }
}

/// Spawn a fully equipped ship facing along its velocity.
pub fn spawn_ship(
    world: &mut World,
    team: Team,
    class: ShipClass,
    position: Position,
    velocity: Velocity,
) -> Entity {
    let heading = if velocity.speed() > 1e-6 {
        Heading(velocity.0.normalize())
    } else {
        Heading::default()
    };

    world.spawn((
        team,
        position,
        velocity,
        heading,
        Hull::new(class, default_hull_max(class)),
        Sensors::default(),
        build_default_subsystems(class),
        default_armament(class),
        PilotSkill::default(),
    ))
}

/// Spawn an AI-piloted ship.
pub fn spawn_ai_ship(
    world: &mut World,
    team: Team,
    class: ShipClass,
    position: Position,
    profile: BehaviorProfile,
) -> Entity {
    let entity = spawn_ship(world, team, class, position, Velocity::default());
    // Entity was just spawned, insertion cannot fail.
    let _ = world.insert_one(entity, AiPilot { profile });
    entity
}

/// Spawn a sight-blocking body.
pub fn spawn_obstacle(world: &mut World, position: Position, radius: f64) -> Entity {
    world.spawn((position, Obstacle { radius }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capital_loadout_has_core_and_turrets() {
        let subs = build_default_subsystems(ShipClass::Capital);
        assert!(subs
            .list
            .iter()
            .any(|s| s.category == SubsystemCategory::Core && s.critical));
        let turrets = subs
            .list
            .iter()
            .filter(|s| s.category == SubsystemCategory::Turret)
            .count();
        assert_eq!(turrets, 2);
    }

    #[test]
    fn test_fighter_loadout_is_minimal() {
        let subs = build_default_subsystems(ShipClass::Fighter);
        assert_eq!(subs.list.len(), 3);
    }

    #[test]
    fn test_spawn_ship_faces_velocity() {
        let mut world = World::new();
        let e = spawn_ship(
            &mut world,
            Team::Alliance,
            ShipClass::Frigate,
            Position::default(),
            Velocity::new(10.0, 0.0, 0.0),
        );
        let heading = *world.get::<&Heading>(e).unwrap();
        assert!((heading.forward().x - 1.0).abs() < 1e-9);
        assert_eq!(world.get::<&Hull>(e).unwrap().max, 800.0);
    }
}
