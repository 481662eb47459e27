//! ECS components for hecs entities.
//!
//! Components are plain data. Targeting logic lives in the sim crate.
//! `Position`, `Velocity`, `Heading` (types.rs) and `Team` (enums.rs)
//! are components too.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BEAM_DAMAGE_PER_TICK, FLAK_DAMAGE, FLAK_MAX_RANGE, FLAK_SHELL_SPEED, SWARM_DAMAGE_PER_MISSILE,
    SWARM_MISSILE_SPEED,
};
use crate::enums::*;

/// Structural integrity and size class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hull {
    pub class: ShipClass,
    pub current: f64,
    pub max: f64,
}

impl Hull {
    pub fn new(class: ShipClass, max: f64) -> Self {
        Self {
            class,
            current: max,
            max,
        }
    }

    /// Remaining hull as a fraction of max (0.0..=1.0).
    pub fn fraction(&self) -> f64 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }
}

/// Deflector shields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Shields {
    pub current: f64,
    pub max: f64,
    /// Shields are raised.
    pub active: bool,
}

impl Shields {
    pub fn fraction(&self) -> f64 {
        if !self.active || self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }
}

/// Estimated armor quality (0.0 = bare hull, 1.0 = heaviest plating).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Armor {
    pub rating: f64,
}

/// Cloaking device.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stealth {
    /// Cloak is engaged.
    pub engaged: bool,
    /// Ship is firing or otherwise radiating while cloaked.
    pub emitting: bool,
}

/// Sensor suite of a weapon holder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sensors {
    /// Nominal detection range (meters).
    pub base_range: f64,
    /// Sensor quality multiplier (1.0 = nominal).
    pub quality: f64,
    /// Local jamming/interference (0.0..=1.0).
    pub interference: f64,
    /// Range bonus this unit lends to nearby friendlies (0 = not a sensor picket).
    pub extension_range: f64,
}

impl Default for Sensors {
    fn default() -> Self {
        Self {
            base_range: crate::constants::DEFAULT_SCAN_RANGE,
            quality: 1.0,
            interference: 0.0,
            extension_range: 0.0,
        }
    }
}

/// A single targetable ship subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsystem {
    /// Unique within the parent ship.
    pub id: u32,
    pub name: String,
    pub kind: SubsystemKind,
    pub category: SubsystemCategory,
    /// Remaining health (0.0..=1.0).
    pub health: f64,
    pub functional: bool,
    /// Loss of this system cripples the ship.
    pub critical: bool,
    /// Turret is armed and tracking.
    pub turret_active: bool,
}

impl Subsystem {
    pub fn new(id: u32, name: &str, kind: SubsystemKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            category: SubsystemCategory::Standard,
            health: 1.0,
            functional: true,
            critical: false,
            turret_active: false,
        }
    }
}

/// Subsystem list of a ship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subsystems {
    pub list: Vec<Subsystem>,
}

/// Point-defense grid. Shreds incoming swarm missiles when active.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointDefense {
    pub active: bool,
}

/// Special hull protections.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpecialProtection {
    /// Resists electromagnetic damage.
    pub hardened_electronics: bool,
    /// Resists explosive damage.
    pub reactive_armor: bool,
    /// Resists energy damage.
    pub ablative_plating: bool,
}

/// Beam emitter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSpec {
    pub beam_type: BeamType,
    /// Beam width (meters). Selects the collision method.
    pub width: f64,
}

/// One weapon hardpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponMount {
    pub weapon: WeaponType,
    /// Projectile speed (m/s).
    pub muzzle_speed: f64,
    /// Muzzle offset from the ship center, in world axes.
    pub offset: DVec3,
    pub optimal_range: f64,
    pub max_range: f64,
    /// Damage per hit (per damage tick for beams).
    pub damage: f64,
    pub beam: Option<BeamSpec>,
}

impl WeaponMount {
    /// Stock hardpoint for a weapon type.
    pub fn standard(weapon: WeaponType) -> Self {
        let (muzzle_speed, optimal_range, max_range, damage) = match weapon {
            WeaponType::Kinetic => (1_200.0, 1_200.0, 3_000.0, 20.0),
            WeaponType::Energy => (3_000.0, 1_500.0, 3_500.0, 15.0),
            WeaponType::Beam => (300_000.0, 1_500.0, 3_000.0, BEAM_DAMAGE_PER_TICK),
            WeaponType::Missile => (600.0, 2_000.0, 5_000.0, 80.0),
            WeaponType::Swarm => (SWARM_MISSILE_SPEED, 1_500.0, 4_000.0, SWARM_DAMAGE_PER_MISSILE),
            WeaponType::Emp => (800.0, 1_000.0, 2_500.0, 0.0),
            WeaponType::Flak => (FLAK_SHELL_SPEED, 800.0, FLAK_MAX_RANGE, FLAK_DAMAGE),
        };
        let beam = (weapon == WeaponType::Beam).then_some(BeamSpec {
            beam_type: BeamType::PredictiveChase,
            width: 4.0,
        });
        Self {
            weapon,
            muzzle_speed,
            offset: DVec3::ZERO,
            optimal_range,
            max_range,
            damage,
            beam,
        }
    }

    /// Beam hardpoint with an explicit algorithm and width.
    pub fn beam(beam_type: BeamType, width: f64) -> Self {
        Self {
            beam: Some(BeamSpec { beam_type, width }),
            ..Self::standard(WeaponType::Beam)
        }
    }
}

/// Hardpoints of a weapon holder, addressed by index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Armament {
    pub mounts: Vec<WeaponMount>,
}

/// Marks an AI-controlled weapon holder.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AiPilot {
    pub profile: BehaviorProfile,
}

/// Gunnery skill of whoever pulls the trigger.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PilotSkill(pub SkillLevel);

/// Marks an unarmed cargo hauler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cargo;

/// Marks a mission objective.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Objective;

/// Sight-blocking body (asteroid, station wreck).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub radius: f64,
}
