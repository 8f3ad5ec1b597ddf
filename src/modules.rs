// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Rigshift Idle Mining Simulation - Module Catalog and Draft
//
// The catalog is a static table, indexed by id once on first lookup and never
// mutated afterwards. Installs are resolved against it at the boundary so that
// an unknown id can never reach a running shift.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::error::{Result, SimError};
use crate::rng::SeededRng;

/// Total slot budget of a rig.
pub const RIG_TOTAL_SLOTS: u8 = 6;

/// Modules every run starts with. They never appear in a draft.
pub const STARTER_MODULES: [&str; 2] = ["basic_drill", "basic_cooler"];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModuleCategory {
    Extraction,
    Cooling,
    Sorting,
    Refining,
    Storage,
    Market,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
}

impl Rarity {
    /// Draft weight.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Common => 50.0,
            Self::Uncommon => 35.0,
            Self::Rare => 15.0,
        }
    }
}

/// One catalog entry. All modifier fields are additive onto the rig base.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: ModuleCategory,
    pub slot_cost: u8,
    pub rarity: Rarity,

    pub throughput_mod: f64,
    pub heat_gain_mod: f64,
    pub waste_mod: f64,
    pub specimen_chance_mod: f64,
    pub high_grade_chance_mod: f64,
    pub scrap_to_units_mod: f64,
    pub storage_mod: i32,
    pub sell_bid_bonus_mod: f64,
    /// Subtracted from volatility impact.
    pub volatility_mod: f64,
    pub unit_yield_mod: f64,
    pub jam_chance_mod: f64,
    /// Credits per day.
    pub upkeep_cost: i64,

    pub unlock_condition: Option<&'static str>,
}

impl ModuleDefinition {
    /// Neutral entry used as the spread base for the catalog below.
    pub const BLANK: ModuleDefinition = ModuleDefinition {
        id: "",
        name: "",
        description: "",
        category: ModuleCategory::Extraction,
        slot_cost: 1,
        rarity: Rarity::Common,
        throughput_mod: 0.0,
        heat_gain_mod: 0.0,
        waste_mod: 0.0,
        specimen_chance_mod: 0.0,
        high_grade_chance_mod: 0.0,
        scrap_to_units_mod: 0.0,
        storage_mod: 0,
        sell_bid_bonus_mod: 0.0,
        volatility_mod: 0.0,
        unit_yield_mod: 0.0,
        jam_chance_mod: 0.0,
        upkeep_cost: 0,
        unlock_condition: None,
    };

    pub fn is_starter(&self) -> bool {
        STARTER_MODULES.contains(&self.id)
    }
}

const B: ModuleDefinition = ModuleDefinition::BLANK;

// ─── Catalog ─────────────────────────────────────────────────────────────────

pub static MODULE_POOL: [ModuleDefinition; 20] = [
    // Starters
    ModuleDefinition {
        id: "basic_drill",
        name: "Basic Drill",
        description: "Standard extraction equipment. Does the job.",
        ..B
    },
    ModuleDefinition {
        id: "basic_cooler",
        name: "Basic Cooler",
        description: "Standard cooling unit. Keeps things running.",
        category: ModuleCategory::Cooling,
        heat_gain_mod: -0.10,
        ..B
    },
    // Extraction
    ModuleDefinition {
        id: "high_torque_drill",
        name: "High Torque Drill",
        description: "Powerful drill for faster extraction. Runs hot.",
        throughput_mod: 0.25,
        heat_gain_mod: 0.15,
        ..B
    },
    ModuleDefinition {
        id: "gentle_bit",
        name: "Gentle Bit",
        description: "Precision drilling with less heat. Slower pace.",
        throughput_mod: -0.10,
        heat_gain_mod: -0.15,
        waste_mod: -0.05,
        ..B
    },
    ModuleDefinition {
        id: "deep_tap",
        name: "Deep Tap",
        description: "Reaches rare veins. Prone to jams.",
        rarity: Rarity::Uncommon,
        heat_gain_mod: 0.05,
        waste_mod: 0.03,
        specimen_chance_mod: 0.05,
        jam_chance_mod: 0.03,
        upkeep_cost: 25,
        ..B
    },
    ModuleDefinition {
        id: "turbo_bore",
        name: "Turbo Bore",
        description: "Maximum speed extraction. Heavy maintenance.",
        slot_cost: 2,
        rarity: Rarity::Rare,
        throughput_mod: 0.45,
        heat_gain_mod: 0.30,
        waste_mod: 0.05,
        jam_chance_mod: 0.02,
        upkeep_cost: 75,
        ..B
    },
    // Cooling
    ModuleDefinition {
        id: "cryo_loop",
        name: "Cryo Loop",
        description: "Advanced cooling system. Expensive to run.",
        category: ModuleCategory::Cooling,
        rarity: Rarity::Uncommon,
        heat_gain_mod: -0.30,
        upkeep_cost: 50,
        ..B
    },
    ModuleDefinition {
        id: "heat_sink",
        name: "Heat Sink",
        description: "Passive cooling. Slight throughput drag.",
        category: ModuleCategory::Cooling,
        throughput_mod: -0.05,
        heat_gain_mod: -0.20,
        ..B
    },
    ModuleDefinition {
        id: "thermal_dump",
        name: "Thermal Dump",
        description: "Emergency heat venting. Wastes some material.",
        category: ModuleCategory::Cooling,
        heat_gain_mod: -0.25,
        waste_mod: 0.08,
        ..B
    },
    // Sorting
    ModuleDefinition {
        id: "precision_sieve",
        name: "Precision Sieve",
        description: "Reduces waste through careful sorting. Slower.",
        category: ModuleCategory::Sorting,
        throughput_mod: -0.10,
        waste_mod: -0.20,
        ..B
    },
    ModuleDefinition {
        id: "magnet_array",
        name: "Magnet Array",
        description: "Recovers ore from scrap. Runs warm.",
        category: ModuleCategory::Sorting,
        rarity: Rarity::Uncommon,
        heat_gain_mod: 0.05,
        waste_mod: -0.05,
        scrap_to_units_mod: 0.15,
        upkeep_cost: 20,
        ..B
    },
    ModuleDefinition {
        id: "auto_sorter",
        name: "Auto Sorter",
        description: "Automated sorting reduces waste significantly.",
        category: ModuleCategory::Sorting,
        slot_cost: 2,
        rarity: Rarity::Rare,
        heat_gain_mod: 0.10,
        waste_mod: -0.35,
        scrap_to_units_mod: 0.10,
        upkeep_cost: 60,
        ..B
    },
    // Refining
    ModuleDefinition {
        id: "smelter",
        name: "Smelter",
        description: "Converts scrap to usable units. Very hot.",
        category: ModuleCategory::Refining,
        heat_gain_mod: 0.15,
        scrap_to_units_mod: 0.25,
        upkeep_cost: 15,
        ..B
    },
    ModuleDefinition {
        id: "assayer",
        name: "Assayer",
        description: "Better grade detection. Slightly lower yield.",
        category: ModuleCategory::Refining,
        rarity: Rarity::Uncommon,
        high_grade_chance_mod: 0.10,
        unit_yield_mod: -0.05,
        upkeep_cost: 30,
        ..B
    },
    ModuleDefinition {
        id: "refinery",
        name: "Refinery",
        description: "Full-scale processing. High upkeep, big gains.",
        category: ModuleCategory::Refining,
        slot_cost: 2,
        rarity: Rarity::Rare,
        throughput_mod: 0.15,
        heat_gain_mod: 0.20,
        waste_mod: -0.15,
        high_grade_chance_mod: 0.05,
        scrap_to_units_mod: 0.30,
        unit_yield_mod: 0.10,
        upkeep_cost: 100,
        ..B
    },
    // Storage
    ModuleDefinition {
        id: "crate_rack",
        name: "Crate Rack",
        description: "Extra storage. Slows operations slightly.",
        category: ModuleCategory::Storage,
        throughput_mod: -0.05,
        storage_mod: 8,
        ..B
    },
    ModuleDefinition {
        id: "vacuum_vault",
        name: "Vacuum Vault",
        description: "Premium storage. Expensive maintenance.",
        category: ModuleCategory::Storage,
        rarity: Rarity::Uncommon,
        storage_mod: 15,
        upkeep_cost: 80,
        ..B
    },
    ModuleDefinition {
        id: "cargo_bay",
        name: "Cargo Bay",
        description: "Massive storage expansion. Takes two slots.",
        category: ModuleCategory::Storage,
        slot_cost: 2,
        rarity: Rarity::Rare,
        throughput_mod: -0.10,
        storage_mod: 30,
        upkeep_cost: 40,
        ..B
    },
    // Market
    ModuleDefinition {
        id: "fee_reducer",
        name: "Fee Reducer",
        description: "Better sell prices. Uses storage space.",
        category: ModuleCategory::Market,
        rarity: Rarity::Uncommon,
        storage_mod: -3,
        sell_bid_bonus_mod: 0.02,
        upkeep_cost: 25,
        ..B
    },
    ModuleDefinition {
        id: "stabilizer",
        name: "Stabilizer",
        description: "Reduces market volatility impact.",
        category: ModuleCategory::Market,
        slot_cost: 2,
        rarity: Rarity::Rare,
        sell_bid_bonus_mod: 0.01,
        volatility_mod: 0.30,
        upkeep_cost: 50,
        ..B
    },
];

fn catalog_index() -> &'static HashMap<&'static str, usize> {
    static INDEX: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();
    INDEX.get_or_init(|| {
        MODULE_POOL
            .iter()
            .enumerate()
            .map(|(i, def)| (def.id, i))
            .collect()
    })
}

/// Look up a catalog entry by id.
pub fn module_by_id(id: &str) -> Option<&'static ModuleDefinition> {
    catalog_index().get(id).map(|&i| &MODULE_POOL[i])
}

pub fn starter_modules() -> Vec<&'static ModuleDefinition> {
    STARTER_MODULES.iter().filter_map(|id| module_by_id(id)).collect()
}

// ─── Installed modules ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstalledModule {
    pub definition: &'static ModuleDefinition,
    pub slot_index: u8,
    pub installed_day: u32,
}

impl InstalledModule {
    /// Resolve an install record coming from outside the engine.
    pub fn resolve(id: &str, slot_index: u8, installed_day: u32) -> Result<Self> {
        let definition =
            module_by_id(id).ok_or_else(|| SimError::UnknownModule(id.to_string()))?;
        Ok(Self {
            definition,
            slot_index,
            installed_day,
        })
    }
}

/// Resolve a whole loadout, assigning consecutive slots by slot cost.
pub fn resolve_loadout(ids: &[&str], installed_day: u32) -> Result<Vec<InstalledModule>> {
    let mut slot = 0u8;
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let module = InstalledModule::resolve(id, slot, installed_day)?;
        slot = slot.saturating_add(module.definition.slot_cost);
        out.push(module);
    }
    Ok(out)
}

pub fn slots_used(modules: &[InstalledModule]) -> u8 {
    modules.iter().map(|m| m.definition.slot_cost).sum()
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// Catalog entries that may be offered given what is installed and unlocked.
pub fn draftable_modules(
    installed_ids: &[&str],
    unlocked: &[&str],
) -> Vec<&'static ModuleDefinition> {
    eligible(&MODULE_POOL, installed_ids, unlocked)
}

fn eligible(
    pool: &'static [ModuleDefinition],
    installed_ids: &[&str],
    unlocked: &[&str],
) -> Vec<&'static ModuleDefinition> {
    pool.iter()
        .filter(|m| !m.is_starter())
        .filter(|m| !installed_ids.contains(&m.id))
        .filter(|m| match m.unlock_condition {
            Some(cond) => unlocked.contains(&cond),
            None => true,
        })
        .collect()
}

/// Draw `count` distinct draft options, weighted by rarity.
///
/// When the candidate pool is no larger than `count` every candidate is
/// returned without consuming any draws.
pub fn generate_draft(
    installed_ids: &[&str],
    unlocked: &[&str],
    rng: &mut SeededRng,
    count: usize,
) -> Vec<&'static ModuleDefinition> {
    sample_by_rarity(draftable_modules(installed_ids, unlocked), rng, count)
}

fn sample_by_rarity(
    candidates: Vec<&'static ModuleDefinition>,
    rng: &mut SeededRng,
    count: usize,
) -> Vec<&'static ModuleDefinition> {
    if candidates.len() <= count {
        return candidates;
    }

    let mut weighted: Vec<(&'static ModuleDefinition, f64)> = candidates
        .into_iter()
        .map(|m| (m, m.rarity.weight()))
        .collect();
    let mut selected = Vec::with_capacity(count);

    while selected.len() < count {
        let Some(&pick) = rng.weighted_choice(&weighted) else {
            break;
        };
        weighted.retain(|(m, _)| m.id != pick.id);
        selected.push(pick);
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        assert_eq!(catalog_index().len(), MODULE_POOL.len());
    }

    #[test]
    fn lookup_by_id() {
        let smelter = module_by_id("smelter").expect("smelter in catalog");
        assert_eq!(smelter.upkeep_cost, 15);
        assert!((smelter.scrap_to_units_mod - 0.25).abs() < 1e-12);
        assert!(module_by_id("warp_core").is_none());
    }

    #[test]
    fn starters_resolve() {
        let starters = starter_modules();
        assert_eq!(starters.len(), 2);
        assert!(starters.iter().all(|m| m.is_starter()));
    }

    #[test]
    fn unknown_install_is_rejected() {
        let err = InstalledModule::resolve("warp_core", 0, 1).unwrap_err();
        assert!(matches!(err, SimError::UnknownModule(id) if id == "warp_core"));
        assert!(resolve_loadout(&["basic_drill", "nope"], 1).is_err());
    }

    #[test]
    fn loadout_assigns_slots_by_cost() {
        let loadout =
            resolve_loadout(&["basic_drill", "turbo_bore", "smelter"], 2).expect("known ids");
        let slots: Vec<u8> = loadout.iter().map(|m| m.slot_index).collect();
        assert_eq!(slots, vec![0, 1, 3]);
        assert_eq!(slots_used(&loadout), 4);
        assert!(loadout.iter().all(|m| m.installed_day == 2));
    }

    #[test]
    fn draftable_excludes_starters_installed_and_locked() {
        let pool = draftable_modules(&["smelter"], &[]);
        assert!(pool.iter().all(|m| !m.is_starter()));
        assert!(pool.iter().all(|m| m.id != "smelter"));
        assert!(pool.iter().any(|m| m.id == "stabilizer"));
        assert!(MODULE_POOL.iter().all(|m| m.unlock_condition.is_none()));
    }

    static GATED_POOL: [ModuleDefinition; 2] = [
        ModuleDefinition {
            id: "open_entry",
            ..ModuleDefinition::BLANK
        },
        ModuleDefinition {
            id: "gated_entry",
            unlock_condition: Some("survey_complete"),
            ..ModuleDefinition::BLANK
        },
    ];

    #[test]
    fn gated_entry_needs_its_condition() {
        let locked: Vec<&str> = eligible(&GATED_POOL, &[], &[]).iter().map(|m| m.id).collect();
        assert_eq!(locked, vec!["open_entry"]);

        let unlocked: Vec<&str> = eligible(&GATED_POOL, &[], &["survey_complete"])
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(unlocked, vec!["open_entry", "gated_entry"]);

        let installed = eligible(&GATED_POOL, &["gated_entry"], &["survey_complete"]);
        assert_eq!(installed.len(), 1);
    }

    #[test]
    fn draft_has_no_duplicates() {
        for seed in 0..50 {
            let mut rng = SeededRng::new(seed);
            let draft = generate_draft(&["basic_drill", "basic_cooler"], &[], &mut rng, 3);
            assert_eq!(draft.len(), 3);
            let mut ids: Vec<&str> = draft.iter().map(|m| m.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), 3, "seed {seed} repeated a module");
        }
    }

    #[test]
    fn small_pool_is_returned_whole() {
        let mut rng = SeededRng::new(5);
        let few: Vec<_> = ["smelter", "assayer"]
            .iter()
            .filter_map(|id| module_by_id(id))
            .collect();
        let draft = sample_by_rarity(few, &mut rng, 3);
        assert_eq!(draft.len(), 2);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn draft_is_deterministic() {
        let ids = |seed| -> Vec<&'static str> {
            let mut rng = SeededRng::new(seed);
            generate_draft(&[], &[], &mut rng, 3)
                .into_iter()
                .map(|m| m.id)
                .collect()
        };
        assert_eq!(ids(1005), ids(1005));
    }
}
