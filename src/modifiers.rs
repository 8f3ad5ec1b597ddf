// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Rigshift Idle Mining Simulation - Rig Modifier Aggregation

use serde::{Deserialize, Serialize};

use crate::modules::InstalledModule;

/// Storage capacity of a rig with no storage modules.
pub const BASE_STORAGE: i64 = 20;
/// Lowest storage capacity any loadout can reach.
pub const MIN_STORAGE: i64 = 10;

/// Effective rig stats after summing every installed module onto the base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigModifiers {
    pub throughput: f64,
    pub heat_gain: f64,
    pub waste: f64,
    pub specimen_chance: f64,
    pub high_grade_chance: f64,
    pub scrap_to_units: f64,
    pub storage: u32,
    pub sell_bid_bonus: f64,
    pub volatility_impact: f64,
    pub daily_upkeep: i64,
    pub unit_yield: f64,
    /// Aggregated for reporting only; shifts never roll jams.
    pub jam_chance: f64,
}

impl Default for RigModifiers {
    fn default() -> Self {
        Self {
            throughput: 1.0,
            heat_gain: 1.0,
            waste: 0.15,
            specimen_chance: 0.0,
            high_grade_chance: 0.0,
            scrap_to_units: 0.0,
            storage: BASE_STORAGE as u32,
            sell_bid_bonus: 0.0,
            volatility_impact: 1.0,
            daily_upkeep: 0,
            unit_yield: 1.0,
            jam_chance: 0.0,
        }
    }
}

/// Fold installed modules into rig stats. Pure; order of modules is irrelevant.
pub fn aggregate(modules: &[InstalledModule]) -> RigModifiers {
    let mut rig = RigModifiers::default();
    let mut storage = BASE_STORAGE;

    for module in modules {
        let def = module.definition;
        rig.throughput += def.throughput_mod;
        rig.heat_gain += def.heat_gain_mod;
        rig.waste += def.waste_mod;
        rig.specimen_chance += def.specimen_chance_mod;
        rig.high_grade_chance += def.high_grade_chance_mod;
        rig.scrap_to_units += def.scrap_to_units_mod;
        storage += def.storage_mod as i64;
        rig.sell_bid_bonus += def.sell_bid_bonus_mod;
        rig.volatility_impact -= def.volatility_mod;
        rig.daily_upkeep += def.upkeep_cost;
        rig.unit_yield += def.unit_yield_mod;
        rig.jam_chance += def.jam_chance_mod;
    }

    rig.throughput = rig.throughput.max(0.1);
    rig.heat_gain = rig.heat_gain.max(0.1);
    rig.waste = rig.waste.clamp(0.0, 1.0);
    rig.unit_yield = rig.unit_yield.max(0.1);
    rig.storage = storage.max(MIN_STORAGE) as u32;

    rig
}
