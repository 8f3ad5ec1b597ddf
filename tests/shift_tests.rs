#[cfg(test)]
mod tests {
    use rigshift_engine::engine::{HEAT_MAX, PURGE_COOLDOWN};
    use rigshift_engine::modules::resolve_loadout;
    use rigshift_engine::{
        aggregate, run_full_shift, Biome, Depth, LiveShift, RigModifiers, ShiftCommand,
        ShiftSummary, SimError,
    };

    fn loadout(ids: &[&str]) -> RigModifiers {
        aggregate(&resolve_loadout(ids, 1).expect("known module ids"))
    }

    // ========== Determinism ==========

    #[test]
    fn test_same_seed_is_byte_identical() {
        let rig = loadout(&["basic_drill", "basic_cooler", "deep_tap"]);
        let a = run_full_shift(Biome::Abyss, Depth::Deep, &rig, 12_345, 75).expect("shift runs");
        let b = run_full_shift(Biome::Abyss, Depth::Deep, &rig, 12_345, 75).expect("shift runs");

        let ja = serde_json::to_string(&a).expect("serialize");
        let jb = serde_json::to_string(&b).expect("serialize");
        assert_eq!(ja, jb);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let rig = RigModifiers::default();
        let a = run_full_shift(Biome::Desert, Depth::Mid, &rig, 1, 75).expect("shift runs");
        let b = run_full_shift(Biome::Desert, Depth::Mid, &rig, 2, 75).expect("shift runs");
        assert_ne!(a.ticks, b.ticks);
    }

    #[test]
    fn test_live_shift_without_commands_matches_full_run() {
        let rig = loadout(&["basic_drill", "basic_cooler", "smelter"]);
        let full = run_full_shift(Biome::Volcanic, Depth::Mid, &rig, 777, 80).expect("shift runs");

        let mut live = LiveShift::new(Biome::Volcanic, Depth::Mid, &rig, 777, 80).expect("valid");
        while live.step().is_some() {}
        let stepped = live.finish();

        assert_eq!(stepped.state, full.state);
        assert_eq!(stepped.ticks, full.ticks);
    }

    #[test]
    fn test_same_command_schedule_replays() {
        let rig = loadout(&["basic_drill", "high_torque_drill"]);
        let drive = || {
            let mut live =
                LiveShift::new(Biome::Tundra, Depth::Deep, &rig, 99, 75).expect("valid");
            let mut tick = 0u32;
            while !live.is_complete() {
                match tick {
                    5 => live.push(ShiftCommand::Overclock(true)),
                    30 => live.push(ShiftCommand::Purge),
                    40 => live.push(ShiftCommand::Overclock(false)),
                    _ => {}
                }
                live.step();
                tick += 1;
            }
            live.finish()
        };
        let a = drive();
        let b = drive();
        assert_eq!(a.state, b.state);
        assert_eq!(a.state.purges_used, 1);
        assert_eq!(a.state.overclock_ticks, 35);
    }

    // ========== Bounds & Conservation ==========

    #[test]
    fn test_meters_stay_bounded_across_seeds() {
        let rig = loadout(&["turbo_bore", "deep_tap", "crate_rack"]);
        for seed in 0..25u64 {
            let run = run_full_shift(Biome::Volcanic, Depth::Deep, &rig, seed, 90).expect("runs");
            for t in &run.ticks {
                assert!((0.0..=HEAT_MAX).contains(&t.heat_after));
                assert!(t.storage_after <= run.state.storage_max);
                assert_eq!(t.units_stored + t.scrap_generated, t.routed_units);
            }
            assert!(run.conservation.is_balanced(), "seed {seed} leaked units");
            assert_eq!(run.state.storage_used, run.state.units_produced.total());
        }
    }

    #[test]
    fn test_small_storage_overflows_to_scrap() {
        let rig = RigModifiers {
            storage: 10,
            ..RigModifiers::default()
        };
        let run = run_full_shift(Biome::Desert, Depth::Deep, &rig, 5, 90).expect("shift runs");
        assert_eq!(run.state.storage_used, 10);
        assert!(run.state.scrap_produced > 0);
        assert!(run.ticks.iter().any(|t| t.overflow));
    }

    #[test]
    fn test_storage_matches_tallies_after_purges() {
        let rig = RigModifiers::default();
        let mut live = LiveShift::new(Biome::Desert, Depth::Mid, &rig, 2024, 90).expect("valid");
        let mut tick = 0u32;
        while !live.is_complete() {
            if tick > 0 && tick % (PURGE_COOLDOWN + 1) == 0 {
                live.push(ShiftCommand::Purge);
            }
            live.step();
            tick += 1;
            let state = live.state();
            assert_eq!(state.storage_used, state.units_produced.total());
        }
        let run = live.finish();
        assert!(run.state.purges_used >= 3);
        assert!(run.state.purge_loss > 0);
        assert!(run.conservation.is_balanced());
    }

    #[test]
    fn test_hot_rig_throttles_once() {
        let rig = RigModifiers {
            heat_gain: 4.0,
            ..RigModifiers::default()
        };
        let mut live = LiveShift::new(Biome::Volcanic, Depth::Deep, &rig, 8, 90).expect("valid");
        live.push(ShiftCommand::Overclock(true));
        while live.step().is_some() {}
        let run = live.finish();

        assert!(run.state.heat_throttled);
        assert_eq!(run.state.damage_from_heat, 1);
        assert!(run.state.throttle_ticks > 1);
        assert_eq!(run.state.overclock_ticks, 90);
    }

    // ========== Summary ==========

    #[test]
    fn test_summary_reflects_state() {
        let rig = RigModifiers::default();
        let run = run_full_shift(Biome::Tundra, Depth::Surface, &rig, 3, 75).expect("runs");
        let summary = ShiftSummary::from_state(&run.state, 2);

        assert_eq!(summary.day, 2);
        assert_eq!(summary.ticks_run, 75);
        assert!(!summary.ended_early);
        assert_eq!(summary.total_units_produced, run.state.units_produced);
        assert_eq!(summary.final_storage_used, run.state.storage_used);
        assert!(summary.waste_percent > 0.0 && summary.waste_percent < 1.0);
    }

    #[test]
    fn test_end_early_summary() {
        let rig = RigModifiers::default();
        let mut live = LiveShift::new(Biome::Desert, Depth::Surface, &rig, 1, 75).expect("valid");
        for _ in 0..10 {
            live.step();
        }
        live.push(ShiftCommand::EndEarly);
        live.step();
        let summary = live.summary(1);
        assert!(summary.ended_early);
        assert_eq!(summary.ticks_run, 10);
    }

    #[test]
    fn test_zero_ticks_rejected() {
        let rig = RigModifiers::default();
        let err = run_full_shift(Biome::Desert, Depth::Surface, &rig, 1, 0).unwrap_err();
        assert!(matches!(err, SimError::InvalidMaxTicks));
    }
}
