// Scenario Definitions
// Each scenario is a player strategy: where to dig each day, how to settle, what to draft

use rigshift_engine::modules::ModuleCategory;
use rigshift_engine::policy::{KeepSpecimensPolicy, SellUnitsPolicy};
use rigshift_engine::{AutomationPolicy, Biome, Depth};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    /// Biome and depth to dig on a given day.
    pub plan: fn(u32) -> (Biome, Depth),
    pub policy: AutomationPolicy,
    pub draft: DraftStrategy,
    /// Hit points to buy back whenever the rig drops below this.
    pub repair_below: Option<u32>,
    pub criteria: PassCriteria,
}

#[derive(Debug, Clone, Copy)]
pub enum DraftStrategy {
    /// Never take a module.
    Skip,
    /// Take the first module offered.
    FirstOffer,
    /// Take the first offered module of this category, else the first offer.
    Prefer(ModuleCategory),
    /// Take a seeded random module from the offer.
    Random,
}

pub struct PassCriteria {
    pub require_conservation: bool,
    pub min_final_day: Option<u32>,
    pub require_win: bool,
    pub max_heat_damage: Option<u32>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            require_conservation: true,
            min_final_day: None,
            require_win: false,
            max_heat_damage: None,
        }
    }
}

// ─── Dig Plans ──────────────────────────────────────────────────────────────

fn desert_surface(_day: u32) -> (Biome, Depth) {
    (Biome::Desert, Depth::Surface)
}

fn volcanic_deep(_day: u32) -> (Biome, Depth) {
    (Biome::Volcanic, Depth::Deep)
}

fn abyss_mid(_day: u32) -> (Biome, Depth) {
    (Biome::Abyss, Depth::Mid)
}

/// Surface for the first third, mid for the second, deep for the rest.
fn depth_ramp(day: u32) -> (Biome, Depth) {
    let depth = match day {
        0..=4 => Depth::Surface,
        5..=8 => Depth::Mid,
        _ => Depth::Deep,
    };
    (Biome::Tundra, depth)
}

fn biome_rotation(day: u32) -> (Biome, Depth) {
    let biome = match day % 4 {
        1 => Biome::Desert,
        2 => Biome::Tundra,
        3 => Biome::Volcanic,
        _ => Biome::Abyss,
    };
    (biome, Depth::Mid)
}

// ─── Scenario Definitions ───────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    let default_policy = AutomationPolicy::default();
    let sell_everything = AutomationPolicy {
        sell_units: SellUnitsPolicy::Always,
        keep_specimens: KeepSpecimensPolicy::KeepNone,
        melt_low: true,
        emergency_mode: true,
    };
    let hoarder = AutomationPolicy {
        sell_units: SellUnitsPolicy::Never,
        keep_specimens: KeepSpecimensPolicy::KeepAll,
        melt_low: false,
        emergency_mode: true,
    };

    vec![
        // ─── Baselines ──────────────────────────────────────────────────
        Scenario { name: "SAFE_SURFACE", label: "Safe Surface", category: "baseline",
            plan: desert_surface, policy: default_policy, draft: DraftStrategy::Skip,
            repair_below: None,
            criteria: PassCriteria { max_heat_damage: Some(0), ..Default::default() } },
        Scenario { name: "SELL_EVERYTHING", label: "Sell Everything", category: "baseline",
            plan: biome_rotation, policy: sell_everything, draft: DraftStrategy::FirstOffer,
            repair_below: None,
            criteria: PassCriteria::default() },

        // ─── Risk ───────────────────────────────────────────────────────
        Scenario { name: "GREEDY_DEEP", label: "Greedy Deep", category: "risk",
            plan: volcanic_deep, policy: default_policy,
            draft: DraftStrategy::Prefer(ModuleCategory::Extraction),
            repair_below: None,
            criteria: PassCriteria::default() },
        Scenario { name: "DEPTH_RAMP", label: "Depth Ramp", category: "risk",
            plan: depth_ramp, policy: default_policy, draft: DraftStrategy::FirstOffer,
            repair_below: Some(5),
            criteria: PassCriteria { min_final_day: Some(4), ..Default::default() } },

        // ─── Build Paths ────────────────────────────────────────────────
        Scenario { name: "COOLING_FIRST", label: "Cooling First", category: "build",
            plan: volcanic_deep, policy: default_policy,
            draft: DraftStrategy::Prefer(ModuleCategory::Cooling),
            repair_below: Some(6),
            criteria: PassCriteria::default() },
        Scenario { name: "STORAGE_FIRST", label: "Storage First", category: "build",
            plan: abyss_mid, policy: default_policy,
            draft: DraftStrategy::Prefer(ModuleCategory::Storage),
            repair_below: None,
            criteria: PassCriteria::default() },
        Scenario { name: "MARKET_FIRST", label: "Market First", category: "build",
            plan: biome_rotation, policy: sell_everything,
            draft: DraftStrategy::Prefer(ModuleCategory::Market),
            repair_below: None,
            criteria: PassCriteria::default() },
        Scenario { name: "RANDOM_DRAFT", label: "Random Draft", category: "build",
            plan: biome_rotation, policy: default_policy, draft: DraftStrategy::Random,
            repair_below: Some(4),
            criteria: PassCriteria::default() },

        // ─── Settlement ─────────────────────────────────────────────────
        Scenario { name: "HOARDER", label: "Hoarder", category: "settlement",
            plan: abyss_mid, policy: hoarder, draft: DraftStrategy::Skip,
            repair_below: None,
            criteria: PassCriteria::default() },
    ]
}
