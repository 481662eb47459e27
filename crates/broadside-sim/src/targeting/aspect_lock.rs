//! Aspect lock state machine for missile weapons.
//!
//! The pilot must hold the target near the reticle. Progress builds while the
//! screen-space offset stays within tolerance and decays (never snaps to zero)
//! when it drifts. A lock needs full progress and an unbroken on-aspect run of
//! at least the minimum lock time.

use glam::DVec3;
use tracing::debug;

use broadside_core::config::LockConfig;
use broadside_core::enums::LockPhase;
use broadside_core::events::CombatEvent;
use broadside_core::types::EntityId;

/// Normalized reticle offset of a target (0 = dead center, 1 = screen edge).
///
/// `None` when the target is behind the holder or outside the view cone.
pub fn screen_offset(
    holder_pos: DVec3,
    forward: DVec3,
    target_pos: DVec3,
    fov_half: f64,
) -> Option<f64> {
    let to_target = (target_pos - holder_pos).normalize_or_zero();
    let forward = forward.normalize_or_zero();
    let cos = to_target.dot(forward);
    if cos <= 0.0 || fov_half <= 0.0 {
        return None;
    }
    let angle = cos.clamp(-1.0, 1.0).acos();
    if angle > fov_half {
        None
    } else {
        Some(angle / fov_half)
    }
}

/// Lock progress of one holder against its current target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AspectLock {
    pub phase: LockPhase,
    /// 0.0..=1.0
    pub progress: f64,
    /// Continuous time spent within tolerance.
    pub on_aspect_secs: f64,
    pub cue_active: bool,
    last_reported: f64,
}

impl AspectLock {
    pub fn is_locked(&self) -> bool {
        self.phase == LockPhase::Locked
    }

    /// Advance by `dt` with this tick's screen sample.
    ///
    /// `sample` is the reticle offset of the current target, `None` when no
    /// target is selected or it is off screen. `has_target` distinguishes the two.
    pub fn update(
        &mut self,
        holder: EntityId,
        has_target: bool,
        sample: Option<f64>,
        dt: f64,
        config: &LockConfig,
        events: &mut Vec<CombatEvent>,
    ) {
        if !has_target {
            self.clear(holder, events);
            return;
        }

        let on_aspect = sample.is_some_and(|offset| offset <= config.tolerance);
        let previous = self.phase;

        if on_aspect {
            self.on_aspect_secs += dt;
            self.progress = (self.progress + config.build_rate * dt).min(1.0);
            self.phase = if self.progress >= 1.0 && self.on_aspect_secs >= config.min_lock_time {
                LockPhase::Locked
            } else {
                LockPhase::Building
            };
        } else {
            // Leaving tolerance restarts the continuous-time requirement
            self.on_aspect_secs = 0.0;
            if self.progress > 0.0 {
                self.progress = (self.progress - config.decay_rate * dt).max(0.0);
                self.phase = if self.progress > 0.0 {
                    LockPhase::Decaying
                } else {
                    LockPhase::Lost
                };
            } else if matches!(
                self.phase,
                LockPhase::Building | LockPhase::Decaying | LockPhase::Locked
            ) {
                self.phase = LockPhase::Lost;
            }
        }

        if self.phase != previous {
            self.emit_phase(holder, previous, events);
        }

        if !self.cue_active && self.progress > config.cue_threshold {
            self.cue_active = true;
            events.push(CombatEvent::LockCueStarted { holder });
        }
        if self.cue_active && self.phase == LockPhase::Lost {
            self.cue_active = false;
            events.push(CombatEvent::LockCueStopped { holder });
        }

        if (self.progress - self.last_reported).abs() >= config.progress_event_step
            || (self.progress >= 1.0 && self.last_reported < 1.0)
        {
            self.last_reported = self.progress;
            events.push(CombatEvent::LockProgress {
                holder,
                progress: self.progress,
            });
        }
    }

    /// Drop all progress. Used on target change, clear, and forced clear.
    pub fn clear(&mut self, holder: EntityId, events: &mut Vec<CombatEvent>) {
        let previous = self.phase;
        if self.cue_active {
            events.push(CombatEvent::LockCueStopped { holder });
        }
        *self = AspectLock::default();
        if previous != LockPhase::NoTarget {
            self.emit_phase(holder, previous, events);
        }
    }

    fn emit_phase(&self, holder: EntityId, previous: LockPhase, events: &mut Vec<CombatEvent>) {
        match self.phase {
            LockPhase::Locked => debug!(?holder, "Aspect lock acquired"),
            LockPhase::Lost if previous == LockPhase::Locked || previous == LockPhase::Decaying => {
                debug!(?holder, "Aspect lock lost")
            }
            _ => {}
        }
        events.push(CombatEvent::LockPhaseChanged {
            holder,
            phase: self.phase,
        });
    }
}
