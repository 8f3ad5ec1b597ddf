// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Rigshift Idle Mining Simulation - Type Definitions

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

// ─── Metal ───────────────────────────────────────────────────────────────────

pub const METAL_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metal {
    #[serde(rename = "SOL")]
    Sol = 0,
    #[serde(rename = "AES")]
    Aes = 1,
    #[serde(rename = "VIR")]
    Vir = 2,
    #[serde(rename = "LUN")]
    Lun = 3,
    #[serde(rename = "NOC")]
    Noc = 4,
    #[serde(rename = "CRN")]
    Crn = 5,
}

impl Metal {
    /// Fixed iteration order. Weighted draws walk metals in this order.
    pub const ALL: [Metal; METAL_COUNT] = [
        Metal::Sol,
        Metal::Aes,
        Metal::Vir,
        Metal::Lun,
        Metal::Noc,
        Metal::Crn,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Sol => "SOL",
            Self::Aes => "AES",
            Self::Vir => "VIR",
            Self::Lun => "LUN",
            Self::Noc => "NOC",
            Self::Crn => "CRN",
        }
    }

    /// Base market price in credits per unit.
    pub fn base_price(&self) -> u32 {
        match self {
            Self::Sol => 20,
            Self::Aes => 28,
            Self::Vir => 34,
            Self::Lun => 24,
            Self::Noc => 42,
            Self::Crn => 60,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Metal {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metal::ALL
            .iter()
            .copied()
            .find(|m| m.code() == s)
            .ok_or_else(|| SimError::UnknownMetal(s.to_string()))
    }
}

// ─── MetalMap ────────────────────────────────────────────────────────────────

/// Per-metal unit counts. Every metal is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Metal, u32>", into = "BTreeMap<Metal, u32>")]
pub struct MetalMap([u32; METAL_COUNT]);

impl MetalMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metal, u32)> + '_ {
        Metal::ALL.iter().map(move |&m| (m, self.0[m.index()]))
    }

    /// Merge another tally into this one.
    pub fn add_all(&mut self, other: &MetalMap) {
        for (m, units) in other.iter() {
            self[m] = self[m].saturating_add(units);
        }
    }
}

impl Index<Metal> for MetalMap {
    type Output = u32;

    fn index(&self, metal: Metal) -> &u32 {
        &self.0[metal.index()]
    }
}

impl IndexMut<Metal> for MetalMap {
    fn index_mut(&mut self, metal: Metal) -> &mut u32 {
        &mut self.0[metal.index()]
    }
}

impl From<BTreeMap<Metal, u32>> for MetalMap {
    fn from(map: BTreeMap<Metal, u32>) -> Self {
        let mut out = MetalMap::new();
        for (m, units) in map {
            out[m] = units;
        }
        out
    }
}

impl From<MetalMap> for BTreeMap<Metal, u32> {
    fn from(map: MetalMap) -> Self {
        map.iter().collect()
    }
}

// ─── Biome ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Biome {
    Desert,
    Tundra,
    Volcanic,
    Abyss,
}

impl Biome {
    pub const ALL: [Biome; 4] = [Biome::Desert, Biome::Tundra, Biome::Volcanic, Biome::Abyss];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Desert => "Desert",
            Self::Tundra => "Tundra",
            Self::Volcanic => "Volcanic",
            Self::Abyss => "Abyss",
        }
    }

    /// Relative draw weight of each metal, in `Metal::ALL` order.
    pub fn metal_weights(&self) -> [(Metal, f64); METAL_COUNT] {
        let w = match self {
            Self::Desert => [40.0, 15.0, 10.0, 30.0, 5.0, 0.0],
            Self::Tundra => [10.0, 30.0, 20.0, 35.0, 5.0, 0.0],
            Self::Volcanic => [30.0, 20.0, 15.0, 0.0, 25.0, 10.0],
            Self::Abyss => [0.0, 10.0, 25.0, 15.0, 35.0, 15.0],
        };
        [
            (Metal::Sol, w[0]),
            (Metal::Aes, w[1]),
            (Metal::Vir, w[2]),
            (Metal::Lun, w[3]),
            (Metal::Noc, w[4]),
            (Metal::Crn, w[5]),
        ]
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Biome {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Biome::ALL
            .iter()
            .copied()
            .find(|b| b.name() == s)
            .ok_or_else(|| SimError::UnknownBiome(s.to_string()))
    }
}

// ─── Depth ───────────────────────────────────────────────────────────────────

/// Fixed per-depth multipliers applied by the tick engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthModifiers {
    pub throughput_mult: f64,
    pub specimen_chance: f64,
    pub heat_gain_mult: f64,
    pub waste_mult: f64,
}

/// Probability mass per grade before the rig's high-grade bonus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeDistribution {
    pub low: f64,
    pub high: f64,
    pub ultra: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum Depth {
    Surface = 1,
    Mid = 2,
    Deep = 3,
}

impl Depth {
    pub const ALL: [Depth; 3] = [Depth::Surface, Depth::Mid, Depth::Deep];

    pub fn tier(&self) -> u8 {
        *self as u8
    }

    pub fn modifiers(&self) -> DepthModifiers {
        match self {
            Self::Surface => DepthModifiers {
                throughput_mult: 1.0,
                specimen_chance: 0.08,
                heat_gain_mult: 1.0,
                waste_mult: 1.0,
            },
            Self::Mid => DepthModifiers {
                throughput_mult: 1.35,
                specimen_chance: 0.14,
                heat_gain_mult: 1.25,
                waste_mult: 1.15,
            },
            Self::Deep => DepthModifiers {
                throughput_mult: 1.80,
                specimen_chance: 0.22,
                heat_gain_mult: 1.60,
                waste_mult: 1.35,
            },
        }
    }

    pub fn grade_distribution(&self) -> GradeDistribution {
        match self {
            Self::Surface => GradeDistribution { low: 0.80, high: 0.17, ultra: 0.03 },
            Self::Mid => GradeDistribution { low: 0.65, high: 0.28, ultra: 0.07 },
            Self::Deep => GradeDistribution { low: 0.50, high: 0.38, ultra: 0.12 },
        }
    }

    pub fn from_tier(tier: i64) -> Result<Self, SimError> {
        match tier {
            1 => Ok(Self::Surface),
            2 => Ok(Self::Mid),
            3 => Ok(Self::Deep),
            other => Err(SimError::UnknownDepth(other)),
        }
    }
}

impl TryFrom<u8> for Depth {
    type Error = SimError;

    fn try_from(tier: u8) -> Result<Self, Self::Error> {
        Depth::from_tier(tier as i64)
    }
}

impl From<Depth> for u8 {
    fn from(depth: Depth) -> u8 {
        depth.tier()
    }
}

// ─── Specimen Form / Grade ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SpecimenForm {
    Ore,
    Nugget,
    Coin,
    Bar,
}

impl SpecimenForm {
    pub const ALL: [SpecimenForm; 4] = [
        SpecimenForm::Ore,
        SpecimenForm::Nugget,
        SpecimenForm::Coin,
        SpecimenForm::Bar,
    ];

    pub fn base_units(&self) -> u32 {
        match self {
            Self::Ore => 4,
            Self::Nugget => 6,
            Self::Coin => 7,
            Self::Bar => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ore => "Ore",
            Self::Nugget => "Nugget",
            Self::Coin => "Coin",
            Self::Bar => "Bar",
        }
    }
}

impl FromStr for SpecimenForm {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpecimenForm::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| SimError::UnknownForm(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Grade {
    Low,
    High,
    Ultra,
}

impl Grade {
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::High => 1.5,
            Self::Ultra => 2.3,
        }
    }

    /// High and Ultra count as "high plus" for the keep policy.
    pub fn is_high_plus(&self) -> bool {
        matches!(self, Self::High | Self::Ultra)
    }
}

impl FromStr for Grade {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "High" => Ok(Self::High),
            "Ultra" => Ok(Self::Ultra),
            other => Err(SimError::UnknownGrade(other.to_string())),
        }
    }
}

/// Melt value of a specimen: `round(form base units × grade multiplier)`.
pub fn melt_units(form: SpecimenForm, grade: Grade) -> u32 {
    (form.base_units() as f64 * grade.multiplier()).round() as u32
}

// ─── Specimen ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specimen {
    pub id: String,
    pub metal: Metal,
    pub form: SpecimenForm,
    pub grade: Grade,
    pub biome: Biome,
    pub depth: Depth,
    pub melt_units: u32,
}

impl Specimen {
    pub fn new(
        id: String,
        metal: Metal,
        form: SpecimenForm,
        grade: Grade,
        biome: Biome,
        depth: Depth,
    ) -> Self {
        Self {
            id,
            metal,
            form,
            grade,
            biome,
            depth,
            melt_units: melt_units(form, grade),
        }
    }
}

// ─── Run Status ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Active,
    Won,
    Lost,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

// ─── ShiftState ──────────────────────────────────────────────────────────────

/// Live state of one shift. Owned by exactly one orchestrator; see `engine`
/// for the transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftState {
    pub tick: u32,
    pub max_ticks: u32,
    pub biome: Biome,
    pub depth: Depth,

    // Meters
    pub heat: f64,
    pub storage_used: u32,
    pub storage_max: u32,
    pub waste_accum: f64,

    // Player controls
    pub overclock_active: bool,
    pub purge_cooldown: u32,

    // Production
    pub units_produced: MetalMap,
    pub specimens_found: Vec<Specimen>,
    pub scrap_produced: u32,
    pub purge_loss: u32,

    // Events
    pub heat_throttled: bool,
    pub throttle_ticks: u32,
    pub purges_used: u32,
    pub overclock_ticks: u32,
    pub damage_from_heat: u32,

    pub is_complete: bool,
    pub ended_early: bool,
}

// ─── TickResult ──────────────────────────────────────────────────────────────

/// Per-tick delta produced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    pub tick: u32,
    pub metal: Metal,
    pub raw_units: f64,
    pub wasted_units: f64,
    /// `floor(good units)` before storage routing.
    pub routed_units: u32,
    pub units_stored: u32,
    pub scrap_recovered: u32,
    pub scrap_generated: u32,
    pub overflow: bool,
    pub throttled: bool,
    pub specimen: Option<Specimen>,
    pub heat_delta: f64,
    pub heat_after: f64,
    pub storage_after: u32,
}

// ─── HudSnapshot ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub tick: u32,
    pub max_ticks: u32,
    pub heat: f64,
    pub storage_used: u32,
    pub storage_max: u32,
    pub purge_cooldown: u32,
    pub overclock_active: bool,
    pub heat_throttled: bool,
    pub specimens_found: usize,
    pub is_complete: bool,
}

// ─── ShiftSummary ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub day: u32,
    pub biome: Biome,
    pub depth: Depth,

    pub total_units_produced: MetalMap,
    pub total_specimens_found: Vec<Specimen>,
    pub total_scrap: u32,

    pub final_heat: f64,
    pub final_storage_used: u32,
    pub waste_percent: f64,

    pub heat_throttled: bool,
    pub throttle_ticks: u32,
    pub damage_from_heat: u32,
    pub purges_used: u32,
    pub purge_loss: u32,
    pub overclock_ticks: u32,

    pub ticks_run: u32,
    pub ended_early: bool,
}
