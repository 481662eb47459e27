#[cfg(test)]
mod tests {
    use crate::commands::TargetingCommand;
    use crate::components::{Hull, Shields};
    use crate::config::CombatConfig;
    use crate::constants::*;
    use crate::enums::*;
    use crate::error::ConfigError;
    use crate::events::CombatEvent;
    use crate::types::{EntityId, Heading, Position, SimClock, Velocity};

    #[test]
    fn test_team_hostility() {
        assert!(Team::Alliance.is_hostile_to(Team::Pirates));
        assert!(Team::Pirates.is_hostile_to(Team::Federation));
        assert!(!Team::Alliance.is_hostile_to(Team::Alliance));
        assert!(!Team::Alliance.is_hostile_to(Team::Neutral));
        assert!(!Team::Neutral.is_hostile_to(Team::Pirates));
    }

    #[test]
    fn test_team_filter_admits() {
        assert!(TeamFilter::Hostile.admits(Team::Alliance, Team::Pirates));
        assert!(!TeamFilter::Hostile.admits(Team::Alliance, Team::Alliance));
        assert!(TeamFilter::Friendly.admits(Team::Alliance, Team::Alliance));
        assert!(!TeamFilter::Friendly.admits(Team::Alliance, Team::Neutral));
        assert!(TeamFilter::All.admits(Team::Alliance, Team::Neutral));
    }

    #[test]
    fn test_ship_class_ordering() {
        assert!(ShipClass::Fighter < ShipClass::Corvette);
        assert!(ShipClass::Capital > ShipClass::Cruiser);
        let radii: Vec<f64> = ShipClass::ALL.iter().map(|c| c.collision_radius()).collect();
        assert!(radii.windows(2).all(|w| w[0] < w[1]), "radius grows with class");
    }

    #[test]
    fn test_weapon_categories() {
        assert_eq!(WeaponType::Kinetic.category(), WeaponCategory::Kinetic);
        assert_eq!(WeaponType::Beam.category(), WeaponCategory::Energy);
        assert_eq!(WeaponType::Swarm.category(), WeaponCategory::Explosive);
        assert_eq!(WeaponType::Flak.category(), WeaponCategory::Explosive);
        assert_eq!(WeaponType::Emp.category(), WeaponCategory::Electromagnetic);
    }

    #[test]
    fn test_channel_indices_unique() {
        let mut seen = [false; 5];
        for channel in DisruptionChannel::ALL {
            assert!(!seen[channel.index()]);
            seen[channel.index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_hull_and_shield_fractions() {
        let mut hull = Hull::new(ShipClass::Frigate, 400.0);
        assert_eq!(hull.fraction(), 1.0);
        hull.current = 100.0;
        assert!((hull.fraction() - 0.25).abs() < 1e-9);

        let shields = Shields {
            current: 50.0,
            max: 100.0,
            active: false,
        };
        assert_eq!(shields.fraction(), 0.0, "Lowered shields count as down");
    }

    #[test]
    fn test_position_helpers() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.range_to(&b) - 5.0).abs() < 1e-9);
        let moved = a.extrapolate(&Velocity::new(10.0, 0.0, 0.0), 2.0);
        assert_eq!(moved, Position::new(20.0, 0.0, 0.0));
        assert_eq!(a.direction_to(&a), glam::DVec3::ZERO);
    }

    #[test]
    fn test_heading_degenerate_falls_back() {
        let h = Heading(glam::DVec3::ZERO);
        assert_eq!(h.forward(), glam::DVec3::Y);
    }

    #[test]
    fn test_sim_clock_advance() {
        let mut clock = SimClock::default();
        clock.advance(0.02);
        clock.advance(0.02);
        assert_eq!(clock.tick, 2);
        assert!((clock.since(0.01) - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_config_defaults_validate() {
        let config = CombatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.swarm.missile_count, SWARM_MISSILE_COUNT);
        assert_eq!(config.targeting.rescan_interval, RESCAN_INTERVAL);
    }

    #[test]
    fn test_config_partial_json_override() {
        let json =
            r#"{ "seed": 7, "swarm": { "missile_count": 4 }, "beams": { "warmup_secs": 1.0 } }"#;
        let config = CombatConfig::from_json_str(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.swarm.missile_count, 4);
        assert_eq!(config.swarm.launch_interval, SWARM_LAUNCH_INTERVAL);
        assert_eq!(config.beams.warmup_secs, 1.0);
        assert_eq!(config.beams.warmdown_secs, BEAM_WARMDOWN_SECS);
    }

    #[test]
    fn test_config_rejects_inverted_emp_radii() {
        let json = r#"{ "emp": { "inner_radius": 700.0, "outer_radius": 600.0 } }"#;
        match CombatConfig::from_json_str(json) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "emp.inner_radius"),
            other => panic!("Expected invalid emp radii, got {other:?}"),
        }
    }

    #[test]
    fn test_config_rejects_zero_swarm() {
        let json = r#"{ "swarm": { "missile_count": 0 } }"#;
        assert!(matches!(
            CombatConfig::from_json_str(json),
            Err(ConfigError::Invalid { field: "swarm.missile_count", .. })
        ));
    }

    #[test]
    fn test_config_parse_error() {
        assert!(matches!(
            CombatConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_event_tagged_serialization() {
        let event = CombatEvent::SwarmFormationComplete { swarm_id: 3 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"SwarmFormationComplete\""), "{json}");
        let back: CombatEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_command_tagged_serialization() {
        let cmd = TargetingCommand::AssignHotkey {
            holder: EntityId(9),
            slot: 3,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let back: TargetingCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }
}
