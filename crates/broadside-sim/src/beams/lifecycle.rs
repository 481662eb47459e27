//! Beam phase transitions.
//!
//! `Inactive -> Warmup -> Active -> Warmdown -> Inactive`, driven by simulated
//! time. Damage is only dealt while active, on a fixed-interval accumulator.

use tracing::debug;

use broadside_core::config::BeamConfig;
use broadside_core::enums::BeamPhase;
use broadside_core::events::CombatEvent;

/// Phase clock of one beam.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeamClock {
    pub phase: BeamPhase,
    /// Time spent in the current phase.
    pub phase_elapsed: f64,
    damage_accumulator: f64,
}

impl BeamClock {
    /// Begin warmup. Only valid from `Inactive`.
    pub fn start(&mut self, beam_id: u32, events: &mut Vec<CombatEvent>) -> bool {
        if self.phase != BeamPhase::Inactive {
            return false;
        }
        self.enter(BeamPhase::Warmup, beam_id, events);
        true
    }

    /// Move warmup or active into warmdown. Idempotent.
    pub fn stop(&mut self, beam_id: u32, events: &mut Vec<CombatEvent>) {
        if matches!(self.phase, BeamPhase::Warmup | BeamPhase::Active) {
            self.enter(BeamPhase::Warmdown, beam_id, events);
        }
    }

    /// Advance by `dt`. Returns the number of damage ticks that fell due.
    pub fn advance(
        &mut self,
        dt: f64,
        beam_id: u32,
        config: &BeamConfig,
        events: &mut Vec<CombatEvent>,
    ) -> u32 {
        self.phase_elapsed += dt;
        match self.phase {
            BeamPhase::Inactive => 0,
            BeamPhase::Warmup => {
                if self.phase_elapsed >= config.warmup_secs {
                    let overflow = self.phase_elapsed - config.warmup_secs;
                    self.enter(BeamPhase::Active, beam_id, events);
                    self.phase_elapsed = overflow;
                    self.damage_accumulator = overflow;
                    return self.drain_ticks(config);
                }
                0
            }
            BeamPhase::Active => {
                let active_left = config.active_secs - (self.phase_elapsed - dt);
                self.damage_accumulator += dt.min(active_left.max(0.0));
                let ticks = self.drain_ticks(config);
                if self.phase_elapsed >= config.active_secs {
                    self.enter(BeamPhase::Warmdown, beam_id, events);
                }
                ticks
            }
            BeamPhase::Warmdown => {
                if self.phase_elapsed >= config.warmdown_secs {
                    self.enter(BeamPhase::Inactive, beam_id, events);
                }
                0
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == BeamPhase::Inactive
    }

    fn drain_ticks(&mut self, config: &BeamConfig) -> u32 {
        let mut ticks = 0;
        while self.damage_accumulator >= config.damage_interval {
            self.damage_accumulator -= config.damage_interval;
            ticks += 1;
        }
        ticks
    }

    fn enter(&mut self, phase: BeamPhase, beam_id: u32, events: &mut Vec<CombatEvent>) {
        debug!(beam_id, from = ?self.phase, to = ?phase, "Beam phase change");
        self.phase = phase;
        self.phase_elapsed = 0.0;
        self.damage_accumulator = 0.0;
        events.push(CombatEvent::BeamPhaseChanged { beam_id, phase });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phases(events: &[CombatEvent]) -> Vec<BeamPhase> {
        events
            .iter()
            .filter_map(|e| match e {
                CombatEvent::BeamPhaseChanged { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_full_cycle_and_damage_ticks() {
        let config = BeamConfig::default();
        let mut clock = BeamClock::default();
        let mut events = Vec::new();
        assert!(clock.start(1, &mut events));

        let mut ticks = 0;
        let mut warmup_ticks = 0;
        for _ in 0..500 {
            let was_warmup = clock.phase == BeamPhase::Warmup;
            let n = clock.advance(0.02, 1, &config, &mut events);
            if was_warmup && clock.phase == BeamPhase::Warmup {
                warmup_ticks += n;
            }
            ticks += n;
            if clock.is_finished() {
                break;
            }
        }

        assert_eq!(
            phases(&events),
            vec![
                BeamPhase::Warmup,
                BeamPhase::Active,
                BeamPhase::Warmdown,
                BeamPhase::Inactive
            ]
        );
        assert_eq!(warmup_ticks, 0);
        // 3.0s of activity at one tick per 0.17s
        assert!((16..=18).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn test_stop_is_idempotent() {
        let config = BeamConfig::default();
        let mut clock = BeamClock::default();
        let mut events = Vec::new();
        clock.start(2, &mut events);
        clock.advance(0.1, 2, &config, &mut events);
        clock.stop(2, &mut events);
        clock.stop(2, &mut events);
        assert_eq!(clock.phase, BeamPhase::Warmdown);
        assert_eq!(phases(&events), vec![BeamPhase::Warmup, BeamPhase::Warmdown]);

        // A stopped beam never becomes active
        for _ in 0..20 {
            assert_eq!(clock.advance(0.02, 2, &config, &mut events), 0);
        }
        assert!(clock.is_finished());
    }

    #[test]
    fn test_start_only_from_inactive() {
        let mut clock = BeamClock::default();
        let mut events = Vec::new();
        assert!(clock.start(3, &mut events));
        assert!(!clock.start(3, &mut events));
    }
}
