#[cfg(test)]
mod tests {
    use rigshift_engine::policy::{
        specimen_melt_value, total_units_value, unit_value, units_left_after_sale,
        KeepSpecimensPolicy, SellUnitsPolicy, FINAL_DAY, MAX_CREDITS,
    };
    use rigshift_engine::{
        process_policy, AutomationPolicy, Biome, DayEndInput, Depth, Grade, Metal, MetalMap,
        RigModifiers, RunStatus, SimError, Specimen, SpecimenForm,
    };

    fn specimen(id: &str, metal: Metal, form: SpecimenForm, grade: Grade) -> Specimen {
        Specimen::new(id.to_string(), metal, form, grade, Biome::Desert, Depth::Surface)
    }

    fn input(day: u32, due: i64, credits: i64) -> DayEndInput {
        DayEndInput {
            day,
            due,
            current_credits: credits,
            units_produced: MetalMap::new(),
            specimens_found: Vec::new(),
            scrap_produced: 0,
            rig_damage: 0,
            policy: AutomationPolicy::default(),
            rig: RigModifiers::default(),
        }
    }

    // ========== Outcome ==========

    #[test]
    fn test_unpaid_due_loses_the_run() {
        let result = process_policy(&input(5, 1000, 0));
        assert!(!result.due_paid);
        assert!(result.run_ended);
        assert_eq!(result.run_status, RunStatus::Lost);
        assert_eq!(result.credits_after, 0);
    }

    #[test]
    fn test_paid_due_keeps_the_run_going() {
        let result = process_policy(&input(5, 500, 600));
        assert!(result.due_paid);
        assert!(!result.run_ended);
        assert_eq!(result.run_status, RunStatus::Active);
        assert_eq!(result.credits_after, 100);
    }

    #[test]
    fn test_final_day_payment_wins() {
        let result = process_policy(&input(FINAL_DAY, 4740, 5000));
        assert!(result.due_paid);
        assert!(result.run_ended);
        assert_eq!(result.run_status, RunStatus::Won);
        assert_eq!(result.credits_after, 260);
    }

    #[test]
    fn test_upkeep_is_paid_before_due() {
        let mut day = input(3, 500, 550);
        day.rig.daily_upkeep = 100;
        day.policy.emergency_mode = false;
        let result = process_policy(&day);
        assert_eq!(result.upkeep_paid, 100);
        assert!(!result.due_paid);
        assert_eq!(result.credits_after, 450);
    }

    #[test]
    fn test_repair_cost_is_reported_not_charged() {
        let mut day = input(2, 100, 300);
        day.rig_damage = 2;
        let result = process_policy(&day);
        assert_eq!(result.repair_cost, 360);
        assert_eq!(result.credits_after, 200);
    }

    // ========== Specimens ==========

    #[test]
    fn test_high_plus_keeps_low_without_melt_low() {
        let mut day = input(5, 500, 600);
        day.specimens_found = vec![
            specimen("1", Metal::Sol, SpecimenForm::Ore, Grade::Low),
            specimen("2", Metal::Sol, SpecimenForm::Ore, Grade::High),
            specimen("3", Metal::Sol, SpecimenForm::Ore, Grade::Ultra),
        ];
        let result = process_policy(&day);
        assert_eq!(result.specimens_kept.len(), 3);
        assert!(result.specimens_melted.is_empty());
    }

    #[test]
    fn test_high_plus_melts_low_with_melt_low() {
        let mut day = input(5, 500, 600);
        day.policy.melt_low = true;
        day.specimens_found = vec![
            specimen("1", Metal::Sol, SpecimenForm::Ore, Grade::Low),
            specimen("2", Metal::Sol, SpecimenForm::Ore, Grade::High),
        ];
        let result = process_policy(&day);
        assert_eq!(result.specimens_kept.len(), 1);
        assert_eq!(result.specimens_kept[0].grade, Grade::High);
        assert_eq!(result.specimens_melted.len(), 1);
        assert_eq!(result.specimens_melted[0].grade, Grade::Low);
        // Ore+Low melts to 4 SOL units: floor(4 × 20 × 0.99)
        assert_eq!(result.credits_sold, 79);
    }

    #[test]
    fn test_keep_none_melts_everything() {
        let mut day = input(5, 500, 600);
        day.policy.keep_specimens = KeepSpecimensPolicy::KeepNone;
        day.specimens_found = vec![specimen("1", Metal::Sol, SpecimenForm::Bar, Grade::Ultra)];
        let result = process_policy(&day);
        assert!(result.specimens_kept.is_empty());
        assert_eq!(result.specimens_melted.len(), 1);
        assert_eq!(result.credits_sold, unit_value(Metal::Sol, 18, 0.0));
    }

    #[test]
    fn test_melt_value_uses_unit_price() {
        let bar = specimen("x", Metal::Sol, SpecimenForm::Bar, Grade::Ultra);
        assert_eq!(bar.melt_units, 18);
        assert_eq!(specimen_melt_value(&bar, 0.0), 356);
    }

    // ========== Units ==========

    #[test]
    fn test_always_sells_everything() {
        let mut day = input(5, 500, 0);
        day.policy.sell_units = SellUnitsPolicy::Always;
        day.units_produced[Metal::Sol] = 50;
        let result = process_policy(&day);
        assert_eq!(result.units_sold_value, 990);
        assert_eq!(result.unsold_units_value, 0);
        assert_eq!(result.credits_after, 490);
    }

    #[test]
    fn test_never_sells_nothing_when_covered() {
        let mut day = input(5, 500, 600);
        day.policy.sell_units = SellUnitsPolicy::Never;
        day.units_produced[Metal::Sol] = 50;
        let result = process_policy(&day);
        assert_eq!(result.credits_sold, 0);
        assert_eq!(result.unsold_units_value, 990);
    }

    #[test]
    fn test_only_if_needed_sells_the_gap() {
        let mut day = input(5, 500, 300);
        day.rig.daily_upkeep = 40;
        day.units_produced[Metal::Noc] = 20;
        let result = process_policy(&day);
        assert_eq!(result.units_sold_value, 240);
        assert!(result.due_paid);
        assert_eq!(result.credits_after, 0);
        assert_eq!(result.unsold_units_value, unit_value(Metal::Noc, 20, 0.0) - 240);
    }

    #[test]
    fn test_scrap_is_always_liquidated() {
        let mut day = input(5, 0, 0);
        day.policy.sell_units = SellUnitsPolicy::Never;
        day.scrap_produced = 4;
        let result = process_policy(&day);
        assert_eq!(result.credits_sold, 30);
        assert_eq!(result.raw_credits, 30);
    }

    #[test]
    fn test_bid_bonus_raises_prices() {
        let mut day = input(5, 0, 0);
        day.policy.sell_units = SellUnitsPolicy::Always;
        day.units_produced[Metal::Sol] = 10;
        day.rig.sell_bid_bonus = 0.02;
        let result = process_policy(&day);
        assert_eq!(result.units_sold_value, 202);
    }

    // ========== Emergency ==========

    #[test]
    fn test_emergency_melts_low_specimens() {
        let mut day = input(5, 500, 400);
        day.policy = AutomationPolicy {
            sell_units: SellUnitsPolicy::Never,
            keep_specimens: KeepSpecimensPolicy::KeepAll,
            melt_low: false,
            emergency_mode: true,
        };
        day.specimens_found = vec![
            specimen("1", Metal::Sol, SpecimenForm::Ore, Grade::Low),
            specimen("2", Metal::Sol, SpecimenForm::Ore, Grade::Low),
        ];
        let result = process_policy(&day);
        assert!(result.emergency_triggered);
        assert_eq!(result.specimens_melted.len(), 2);
        // 79 from the first melt is not enough, the second covers it
        assert!(result.due_paid);
        assert_eq!(result.credits_after, 58);
    }

    #[test]
    fn test_emergency_sells_units_before_melting() {
        let mut day = input(5, 500, 400);
        day.policy = AutomationPolicy {
            sell_units: SellUnitsPolicy::Never,
            keep_specimens: KeepSpecimensPolicy::KeepAll,
            melt_low: false,
            emergency_mode: true,
        };
        day.units_produced[Metal::Crn] = 10;
        day.specimens_found = vec![specimen("1", Metal::Sol, SpecimenForm::Ore, Grade::Low)];
        let result = process_policy(&day);
        assert!(result.emergency_triggered);
        assert_eq!(result.units_sold_value, 100);
        assert!(result.specimens_melted.is_empty());
        assert!(result.due_paid);
        assert_eq!(result.credits_after, 0);
    }

    #[test]
    fn test_emergency_melts_in_discovery_order_and_stops_when_covered() {
        let mut day = input(5, 500, 430);
        day.policy = AutomationPolicy {
            sell_units: SellUnitsPolicy::Never,
            keep_specimens: KeepSpecimensPolicy::KeepAll,
            melt_low: false,
            emergency_mode: true,
        };
        day.specimens_found = vec![
            specimen("a", Metal::Crn, SpecimenForm::Bar, Grade::High),
            specimen("b", Metal::Crn, SpecimenForm::Bar, Grade::Low),
            specimen("c", Metal::Sol, SpecimenForm::Ore, Grade::Low),
        ];
        let result = process_policy(&day);
        let melted: Vec<&str> = result.specimens_melted.iter().map(|s| s.id.as_str()).collect();
        let kept: Vec<&str> = result.specimens_kept.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(melted, vec!["b"]);
        assert_eq!(kept, vec!["a", "c"]);
        assert!(result.due_paid);
    }

    #[test]
    fn test_no_emergency_when_disabled() {
        let mut day = input(5, 500, 400);
        day.policy.emergency_mode = false;
        day.policy.sell_units = SellUnitsPolicy::Never;
        day.units_produced[Metal::Crn] = 10;
        let result = process_policy(&day);
        assert!(!result.emergency_triggered);
        assert!(!result.due_paid);
        assert_eq!(result.run_status, RunStatus::Lost);
    }

    #[test]
    fn test_input_round_trips_through_json() {
        let mut day = input(4, 560, 10);
        day.units_produced[Metal::Vir] = 7;
        let json = serde_json::to_string(&day).expect("serialize");
        let back: DayEndInput = serde_json::from_str(&json).expect("parse");
        assert_eq!(process_policy(&back), process_policy(&day));
    }

    // ========== Holdings ==========

    #[test]
    fn test_partial_sale_draws_metals_in_fixed_order() {
        let mut units = MetalMap::new();
        units[Metal::Sol] = 10;
        units[Metal::Aes] = 10;

        // 10 SOL is worth 198, the remaining 52 takes 2 AES (55)
        let left = units_left_after_sale(&units, 250, 0.0);
        assert_eq!(left[Metal::Sol], 0);
        assert_eq!(left[Metal::Aes], 8);

        assert_eq!(units_left_after_sale(&units, 0, 0.0), units);
        let everything = total_units_value(&units, 0.0);
        assert_eq!(units_left_after_sale(&units, everything, 0.0).total(), 0);
    }

    // ========== Boundary ==========

    #[test]
    fn test_extreme_bid_bonus_saturates() {
        assert_eq!(unit_value(Metal::Crn, 4_000_000, 1e22), i64::MAX);
        let mut units = MetalMap::new();
        units[Metal::Crn] = 4_000_000;
        units[Metal::Sol] = 4_000_000;
        assert_eq!(total_units_value(&units, 1e22), i64::MAX);
    }

    #[test]
    fn test_out_of_range_input_rejected() {
        let day = input(5, 500, 600);
        assert!(day.validate().is_ok());

        let mut rich_bid = day.clone();
        rich_bid.rig.sell_bid_bonus = 1e22;
        assert!(matches!(rich_bid.validate(), Err(SimError::InvalidSettlement(_))));

        let mut nan_bid = day.clone();
        nan_bid.rig.sell_bid_bonus = f64::NAN;
        assert!(nan_bid.validate().is_err());

        let mut negative_due = day.clone();
        negative_due.due = -1;
        assert!(negative_due.validate().is_err());

        let mut huge_credits = day;
        huge_credits.current_credits = MAX_CREDITS + 1;
        assert!(huge_credits.validate().is_err());
    }
}
