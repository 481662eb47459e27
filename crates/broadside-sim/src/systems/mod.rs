//! Per-tick systems of the combat engine.
//!
//! Systems are free functions over the world and the engine's managers. They
//! hold no state of their own.

pub mod cleanup;
pub mod priority;
pub mod snapshot;
pub mod targeting;
