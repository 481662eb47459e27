//! Fundamental geometric and simulation types.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// 3D position in simulation space (meters, Cartesian, z = up).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec3);

/// 3D velocity in simulation space (m/s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec3);

/// Facing of an entity. Used for aspect lock and turret-fixed beams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heading(pub DVec3);

/// Stable, serializable identity for an entity in events and snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Simulation clock. Advanced by the host through `tick(dt)`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimClock {
    /// Number of ticks processed.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }

    /// Range to another position in meters.
    pub fn range_to(&self, other: &Position) -> f64 {
        self.0.distance(other.0)
    }

    /// Unit vector pointing at `other`, or zero when coincident.
    pub fn direction_to(&self, other: &Position) -> DVec3 {
        (other.0 - self.0).normalize_or_zero()
    }

    /// Position after travelling at `velocity` for `secs`.
    pub fn extrapolate(&self, velocity: &Velocity, secs: f64) -> Position {
        Position(self.0 + velocity.0 * secs)
    }
}

impl Velocity {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }

    /// Speed magnitude (m/s).
    pub fn speed(&self) -> f64 {
        self.0.length()
    }
}

impl Heading {
    /// Facing along +y, the default forward axis.
    pub const FORWARD: Heading = Heading(DVec3::Y);

    /// Normalized facing. Falls back to +y for degenerate input.
    pub fn forward(&self) -> DVec3 {
        let f = self.0.normalize_or_zero();
        if f == DVec3::ZERO {
            DVec3::Y
        } else {
            f
        }
    }
}

impl Default for Heading {
    fn default() -> Self {
        Self::FORWARD
    }
}

impl SimClock {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }

    /// Seconds elapsed since `since`.
    pub fn since(&self, since: f64) -> f64 {
        self.elapsed_secs - since
    }
}
