//! Target priority AI for BROADSIDE.
//!
//! Implements multi-factor target scoring, behavior-profile weighting,
//! and periodic threat assessment. No ECS dependency; operates on plain data.

pub mod profiles;
pub mod scoring;
pub mod threat;

pub use broadside_core as core;
