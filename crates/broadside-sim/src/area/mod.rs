//! Area-effect weapons: EMP pulses, flak shells and flak barriers.
//!
//! Shells advance on the fine step so fuses burn accurately. Disruption decay
//! and barrier/pulse expiry run on the coarser area-effect cadence.

pub mod emp;
pub mod flak;

use glam::DVec3;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use broadside_core::config::{EmpConfig, FlakConfig};
use broadside_core::enums::{AreaEffectKind, DisruptionChannel};
use broadside_core::events::CombatEvent;
use broadside_core::state::{AreaEffectView, DisruptionView};
use broadside_core::types::EntityId;

use self::emp::{Disruption, DisruptionMap, EmpPulse};
use self::flak::{Barrier, FlakShell};
use crate::handle::entity_from_id;
use crate::spatial::SpatialQuery;

/// Every live area effect plus the disruptions they left behind.
#[derive(Debug, Default)]
pub struct AreaEffects {
    pulses: Vec<EmpPulse>,
    shells: Vec<FlakShell>,
    barriers: Vec<Barrier>,
    disruptions: DisruptionMap,
    next_id: u32,
}

impl AreaEffects {
    /// Live instances counted against the area-effect cap.
    pub fn count(&self) -> usize {
        self.pulses.len() + self.shells.len() + self.barriers.len()
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Detonate an EMP at `center`. Returns the effect id.
    pub fn detonate_emp<S: SpatialQuery>(
        &mut self,
        world: &World,
        spatial: &S,
        owner: Entity,
        center: DVec3,
        config: &EmpConfig,
        events: &mut Vec<CombatEvent>,
    ) -> u32 {
        let id = self.allocate_id();
        let pulse = emp::detonate(
            world,
            spatial,
            id,
            owner,
            center,
            config,
            &mut self.disruptions,
            events,
        );
        self.pulses.push(pulse);
        id
    }

    /// Fire a flak shell toward `aim_point`. Returns the effect id and burst point.
    #[allow(clippy::too_many_arguments)]
    pub fn fire_flak(
        &mut self,
        world: &World,
        rng: &mut ChaCha8Rng,
        owner: Entity,
        origin: DVec3,
        aim_point: DVec3,
        damage: f64,
        config: &FlakConfig,
    ) -> (u32, DVec3) {
        let id = self.allocate_id();
        let shell = flak::launch(world, rng, id, owner, origin, aim_point, damage, config);
        let point = shell.detonation_point;
        self.shells.push(shell);
        (id, point)
    }

    /// Burn shell fuses by one fine step and burst the ones that run out.
    pub fn step_shells<S: SpatialQuery>(
        &mut self,
        world: &World,
        spatial: &S,
        dt: f64,
        config: &FlakConfig,
        events: &mut Vec<CombatEvent>,
    ) {
        let mut bursting = Vec::new();
        self.shells.retain_mut(|shell| {
            shell.fuse -= dt;
            if shell.fuse <= 1e-9 {
                bursting.push(shell.clone());
                false
            } else {
                true
            }
        });
        for shell in bursting {
            if let Some(barrier) = flak::burst(world, spatial, &shell, config, events) {
                self.barriers.push(barrier);
            }
        }
    }

    /// Decay disruptions and expire pulses and barriers.
    pub fn update(&mut self, dt: f64, events: &mut Vec<CombatEvent>) {
        emp::decay_all(&mut self.disruptions, dt, events);

        self.pulses.retain_mut(|pulse| {
            pulse.remaining -= dt;
            pulse.remaining > 1e-9
        });

        self.barriers.retain_mut(|barrier| {
            barrier.remaining -= dt;
            if barrier.remaining > 1e-9 {
                true
            } else {
                debug!(effect_id = barrier.id, "Flak barrier expired");
                events.push(CombatEvent::BarrierExpired {
                    effect_id: barrier.id,
                });
                false
            }
        });
    }

    /// Flak barrier density at `point` (0..=1).
    pub fn barrier_coverage(&self, point: DVec3) -> f64 {
        flak::coverage(&self.barriers, point)
    }

    /// Current disruption level of one channel on a ship.
    pub fn disruption_level(&self, target: EntityId, channel: DisruptionChannel) -> f64 {
        emp::channel_level(&self.disruptions, target, channel)
    }

    pub fn disruptions(&self) -> &DisruptionMap {
        &self.disruptions
    }

    pub fn disruption(&self, target: EntityId, channel: DisruptionChannel) -> Option<&Disruption> {
        self.disruptions.get(&(target, channel.index()))
    }

    /// Forget disruptions on dead ships. Shells already in flight still burst.
    pub fn purge(&mut self, is_alive: impl Fn(Entity) -> bool) {
        self.disruptions
            .retain(|(target, _), _| entity_from_id(*target).is_some_and(&is_alive));
    }

    /// Presentation views, ordered by effect id.
    pub fn views(&self) -> Vec<AreaEffectView> {
        let mut views: Vec<AreaEffectView> = self
            .pulses
            .iter()
            .map(|p| AreaEffectView {
                id: p.id,
                kind: AreaEffectKind::Emp,
                center: p.center,
                radius: p.radius,
                remaining_secs: p.remaining,
            })
            .chain(self.shells.iter().map(|s| AreaEffectView {
                id: s.id,
                kind: AreaEffectKind::FlakShell,
                center: s.detonation_point,
                radius: 0.0,
                remaining_secs: s.fuse,
            }))
            .chain(self.barriers.iter().map(|b| AreaEffectView {
                id: b.id,
                kind: AreaEffectKind::Barrier,
                center: b.center,
                radius: b.radius,
                remaining_secs: b.remaining,
            }))
            .collect();
        views.sort_by_key(|v| v.id);
        views
    }

    /// Disruption views, ordered by target then channel.
    pub fn disruption_views(&self) -> Vec<DisruptionView> {
        self.disruptions
            .iter()
            .map(|(&(target, slot), d)| DisruptionView {
                target,
                channel: DisruptionChannel::ALL[slot],
                level: d.level,
                remaining_secs: d.remaining,
            })
            .collect()
    }
}
