//! Combat simulation for BROADSIDE.
//!
//! Owns the hecs combat world and every stateful manager of the targeting
//! core: target registry, visibility, intercept solutions, aspect lock, beams,
//! swarms and area effects. The host drives it through `CombatEngine::tick(dt)`.

pub mod area;
pub mod beams;
pub mod engine;
pub mod events;
pub mod handle;
pub mod intercept;
pub mod resistance;
pub mod spatial;
pub mod swarm;
pub mod systems;
pub mod targeting;
pub mod world_setup;

pub use broadside_core as core;
pub use engine::CombatEngine;

#[cfg(test)]
mod tests;
