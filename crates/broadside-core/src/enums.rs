//! Enumeration types used throughout the targeting core.

use serde::{Deserialize, Serialize};

/// Team allegiance of a ship. Also used directly as an ECS component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Alliance,
    Federation,
    Pirates,
    /// Never hostile and never friendly to anyone but itself.
    Neutral,
}

impl Team {
    /// Whether two teams are at war with each other.
    pub fn is_hostile_to(self, other: Team) -> bool {
        self != other && self != Team::Neutral && other != Team::Neutral
    }

    pub fn is_friendly_to(self, other: Team) -> bool {
        self == other
    }
}

/// Which teams a scan admits relative to the scanning holder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamFilter {
    #[default]
    Hostile,
    Friendly,
    All,
}

impl TeamFilter {
    pub fn admits(self, holder: Team, candidate: Team) -> bool {
        match self {
            TeamFilter::Hostile => holder.is_hostile_to(candidate),
            TeamFilter::Friendly => holder.is_friendly_to(candidate),
            TeamFilter::All => true,
        }
    }
}

/// Ship size class, ordered smallest to largest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ShipClass {
    #[default]
    Fighter,
    Bomber,
    Corvette,
    Frigate,
    Destroyer,
    Cruiser,
    Capital,
}

impl ShipClass {
    pub const ALL: [ShipClass; 7] = [
        ShipClass::Fighter,
        ShipClass::Bomber,
        ShipClass::Corvette,
        ShipClass::Frigate,
        ShipClass::Destroyer,
        ShipClass::Cruiser,
        ShipClass::Capital,
    ];

    /// Radius of the collision sphere used for beam and burst hits (meters).
    pub fn collision_radius(self) -> f64 {
        match self {
            ShipClass::Fighter => 8.0,
            ShipClass::Bomber => 12.0,
            ShipClass::Corvette => 25.0,
            ShipClass::Frigate => 45.0,
            ShipClass::Destroyer => 70.0,
            ShipClass::Cruiser => 110.0,
            ShipClass::Capital => 200.0,
        }
    }

    /// Capital-grade hulls get core-vs-turret protection rules.
    pub fn is_capital_grade(self) -> bool {
        matches!(self, ShipClass::Cruiser | ShipClass::Capital)
    }
}

/// Weapon families known to the core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponType {
    /// Mass drivers and autocannons.
    #[default]
    Kinetic,
    /// Pulse lasers and plasma bolts.
    Energy,
    /// Continuous beams.
    Beam,
    /// Aspect-locked guided missiles.
    Missile,
    /// Sequentially launched spiral missile swarms.
    Swarm,
    /// Electromagnetic pulse.
    Emp,
    /// Proximity-fused flak bursts.
    Flak,
}

impl WeaponType {
    pub const ALL: [WeaponType; 7] = [
        WeaponType::Kinetic,
        WeaponType::Energy,
        WeaponType::Beam,
        WeaponType::Missile,
        WeaponType::Swarm,
        WeaponType::Emp,
        WeaponType::Flak,
    ];

    /// Damage category used by the ship-class resistance table.
    pub fn category(self) -> WeaponCategory {
        match self {
            WeaponType::Kinetic => WeaponCategory::Kinetic,
            WeaponType::Energy | WeaponType::Beam => WeaponCategory::Energy,
            WeaponType::Missile | WeaponType::Swarm | WeaponType::Flak => {
                WeaponCategory::Explosive
            }
            WeaponType::Emp => WeaponCategory::Electromagnetic,
        }
    }
}

/// Damage category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponCategory {
    Kinetic,
    Energy,
    Explosive,
    Electromagnetic,
}

/// Functional type of a ship subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubsystemKind {
    Engine,
    Weapons,
    Sensors,
    Shields,
    Comms,
    Reactor,
    Other,
}

/// Protection category of a subsystem on capital-grade hulls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubsystemCategory {
    /// Buried systems (reactor, bridge, core engines).
    Core,
    /// Exposed hardpoints.
    Turret,
    #[default]
    Standard,
}

/// Beam aiming algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeamType {
    FixedAim,
    OctantSweep,
    AutoClosest,
    PredictiveChase,
    TurretFixed,
}

/// Beam lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamPhase {
    #[default]
    Inactive,
    /// Charging; no damage.
    Warmup,
    /// Firing; damage applied on a fixed interval.
    Active,
    /// Fading out; no damage.
    Warmdown,
}

/// How a beam resolves collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionMethod {
    /// Thin beam: single precision ray, first hit only.
    PrecisionRay,
    /// Wide beam: volumetric intersection, penetrates.
    Volumetric,
    /// Mid-width beam at short range.
    HybridRay,
    /// Mid-width beam at long range.
    HybridVolume,
}

impl CollisionMethod {
    pub fn is_volumetric(self) -> bool {
        matches!(self, CollisionMethod::Volumetric | CollisionMethod::HybridVolume)
    }
}

/// Aspect lock phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockPhase {
    #[default]
    NoTarget,
    Building,
    Locked,
    Decaying,
    Lost,
}

/// AI behavior profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorProfile {
    #[default]
    Aggressive,
    Defensive,
    Support,
    Patrol,
}

/// Pilot gunnery skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillLevel {
    Rookie,
    #[default]
    Regular,
    Veteran,
    Elite,
    Ace,
}

/// Ship system channel that an EMP can disrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisruptionChannel {
    Targeting,
    Engines,
    Weapons,
    Hud,
    Ai,
}

impl DisruptionChannel {
    pub const ALL: [DisruptionChannel; 5] = [
        DisruptionChannel::Targeting,
        DisruptionChannel::Engines,
        DisruptionChannel::Weapons,
        DisruptionChannel::Hud,
        DisruptionChannel::Ai,
    ];

    /// Stable slot index for per-channel arrays.
    pub fn index(self) -> usize {
        match self {
            DisruptionChannel::Targeting => 0,
            DisruptionChannel::Engines => 1,
            DisruptionChannel::Weapons => 2,
            DisruptionChannel::Hud => 3,
            DisruptionChannel::Ai => 4,
        }
    }
}

/// Why an intercept solve failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveFailure {
    /// The target is receding faster than the shot travels.
    Outrunning,
    /// Required lead exceeds the prediction horizon.
    BeyondHorizon,
    /// Successive estimates are moving apart.
    Diverging,
    /// Iteration cap reached without settling.
    NoConvergence,
    /// Weapon speed is not positive.
    InvalidWeapon,
}

/// Aggregate threat level from periodic reassessment.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ThreatLevel {
    #[default]
    None,
    Low,
    Moderate,
    High,
    Critical,
}

/// Hard immunity rule that short-circuits resistance compounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImmunityCondition {
    ShieldedAgainstEmp,
    CapitalCoreProtection,
    HeavyArmorVsKinetic,
    PointDefenseVsSwarm,
}

/// Swarm missile flight phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwarmMissilePhase {
    #[default]
    Spiral,
    Pursuit,
    /// Target lost; waiting on reacquisition cooldown.
    Reacquiring,
}

/// Why a missile left its swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissileDetachReason {
    Detonated,
    TargetLost,
    FuelExhausted,
}

/// Why a holder's target was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetLostReason {
    Cleared,
    Replaced,
    Invalidated,
}

/// Kind of area-effect instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaEffectKind {
    Emp,
    FlakShell,
    Barrier,
}
