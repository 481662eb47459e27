//! Behavior-profile parameters for the priority scorer.
//!
//! Consolidates per-profile weight multipliers, selection thresholds,
//! reassessment cadence, and ship-type preference tables.

use broadside_core::enums::{BehaviorProfile, ShipClass, WeaponType};

/// Multipliers applied to each scoring component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentWeights {
    pub distance: f64,
    pub threat: f64,
    pub health: f64,
    pub ship_type: f64,
    pub weapon_affinity: f64,
    pub tactical: f64,
}

impl ComponentWeights {
    pub fn sum(&self) -> f64 {
        self.distance
            + self.threat
            + self.health
            + self.ship_type
            + self.weapon_affinity
            + self.tactical
    }

    /// Component-wise product.
    pub fn scaled_by(&self, other: &ComponentWeights) -> ComponentWeights {
        ComponentWeights {
            distance: self.distance * other.distance,
            threat: self.threat * other.threat,
            health: self.health * other.health,
            ship_type: self.ship_type * other.ship_type,
            weapon_affinity: self.weapon_affinity * other.weapon_affinity,
            tactical: self.tactical * other.tactical,
        }
    }
}

/// Weights shared by every profile before profile multipliers.
pub const BASE_WEIGHTS: ComponentWeights = ComponentWeights {
    distance: 1.0,
    threat: 1.2,
    health: 0.8,
    ship_type: 0.6,
    weapon_affinity: 0.5,
    tactical: 0.7,
};

/// Behavioral parameters for one profile.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorParams {
    pub multipliers: ComponentWeights,
    /// Candidates scoring below this are never selected.
    pub min_score: f64,
    /// Seconds between threat reassessments.
    pub reassess_interval: f64,
}

/// Get the behavioral parameters for a profile.
pub fn get_params(profile: BehaviorProfile) -> BehaviorParams {
    match profile {
        BehaviorProfile::Aggressive => BehaviorParams {
            multipliers: ComponentWeights {
                distance: 0.8,
                threat: 0.9,
                health: 1.4,
                ship_type: 1.2,
                weapon_affinity: 1.0,
                tactical: 1.1,
            },
            min_score: 25.0,
            reassess_interval: 1.0,
        },
        BehaviorProfile::Defensive => BehaviorParams {
            multipliers: ComponentWeights {
                distance: 1.2,
                threat: 1.6,
                health: 0.8,
                ship_type: 0.9,
                weapon_affinity: 0.9,
                tactical: 1.0,
            },
            min_score: 35.0,
            reassess_interval: 1.5,
        },
        BehaviorProfile::Support => BehaviorParams {
            multipliers: ComponentWeights {
                distance: 1.0,
                threat: 1.0,
                health: 1.2,
                ship_type: 0.8,
                weapon_affinity: 1.0,
                tactical: 1.5,
            },
            min_score: 30.0,
            reassess_interval: 2.0,
        },
        BehaviorProfile::Patrol => BehaviorParams {
            multipliers: ComponentWeights {
                distance: 1.3,
                threat: 1.1,
                health: 0.7,
                ship_type: 1.0,
                weapon_affinity: 0.8,
                tactical: 0.8,
            },
            min_score: 40.0,
            reassess_interval: 3.0,
        },
    }
}

/// How much a profile wants to engage a ship class (0..=100).
pub fn ship_type_preference(profile: BehaviorProfile, class: ShipClass) -> f64 {
    use ShipClass::*;
    match profile {
        // Hunts big, slow, valuable hulls.
        BehaviorProfile::Aggressive => match class {
            Fighter => 40.0,
            Bomber => 60.0,
            Corvette => 70.0,
            Frigate => 80.0,
            Destroyer => 85.0,
            Cruiser => 90.0,
            Capital => 100.0,
        },
        // Screens against strike craft first.
        BehaviorProfile::Defensive => match class {
            Fighter => 80.0,
            Bomber => 100.0,
            Corvette => 70.0,
            Frigate => 55.0,
            Destroyer => 50.0,
            Cruiser => 40.0,
            Capital => 35.0,
        },
        BehaviorProfile::Support => match class {
            Fighter => 70.0,
            Bomber => 90.0,
            Corvette => 75.0,
            Frigate => 60.0,
            Destroyer => 50.0,
            Cruiser => 45.0,
            Capital => 40.0,
        },
        BehaviorProfile::Patrol => match class {
            Fighter => 60.0,
            Bomber => 70.0,
            Corvette => 80.0,
            Frigate => 70.0,
            Destroyer => 55.0,
            Cruiser => 45.0,
            Capital => 30.0,
        },
    }
}

/// How well a weapon type suits a target class (0..=100).
pub fn weapon_affinity(weapon: WeaponType, class: ShipClass) -> f64 {
    use ShipClass::*;
    match weapon {
        WeaponType::Kinetic => match class {
            Fighter | Bomber => 80.0,
            Corvette | Frigate => 65.0,
            Destroyer => 50.0,
            Cruiser | Capital => 30.0,
        },
        WeaponType::Energy => match class {
            Fighter | Bomber => 75.0,
            Corvette | Frigate | Destroyer => 70.0,
            Cruiser | Capital => 50.0,
        },
        WeaponType::Beam => match class {
            Fighter => 25.0,
            Bomber => 40.0,
            Corvette => 60.0,
            Frigate | Destroyer => 80.0,
            Cruiser | Capital => 100.0,
        },
        WeaponType::Missile => match class {
            Fighter | Bomber => 90.0,
            Corvette => 80.0,
            Frigate | Destroyer => 60.0,
            Cruiser | Capital => 40.0,
        },
        WeaponType::Swarm => match class {
            Fighter => 60.0,
            Bomber | Corvette => 90.0,
            Frigate => 80.0,
            Destroyer => 60.0,
            Cruiser | Capital => 45.0,
        },
        WeaponType::Emp => match class {
            Fighter | Bomber => 50.0,
            Corvette | Frigate => 70.0,
            Destroyer | Cruiser => 80.0,
            Capital => 60.0,
        },
        WeaponType::Flak => match class {
            Fighter | Bomber => 100.0,
            Corvette => 60.0,
            Frigate => 35.0,
            Destroyer | Cruiser | Capital => 15.0,
        },
    }
}

/// Inherent threat of a hull class with fully ready weapons (0..=45).
pub fn class_threat(class: ShipClass) -> f64 {
    match class {
        ShipClass::Fighter => 20.0,
        ShipClass::Bomber => 35.0,
        ShipClass::Corvette => 25.0,
        ShipClass::Frigate => 30.0,
        ShipClass::Destroyer => 35.0,
        ShipClass::Cruiser => 40.0,
        ShipClass::Capital => 45.0,
    }
}
