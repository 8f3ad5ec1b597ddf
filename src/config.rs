// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Rigshift Idle Mining Simulation - Run Configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::{DEFAULT_SHIFT_TICKS, MAX_SHIFT_TICKS, MIN_SHIFT_TICKS};
use crate::error::{Result, SimError};
use crate::modules::{module_by_id, STARTER_MODULES};
use crate::policy::FINAL_DAY;

/// Credits owed at the end of each day, day 1 first.
pub const DEFAULT_DUE_CURVE: [i64; FINAL_DAY as usize] =
    [150, 260, 400, 560, 760, 1000, 1300, 1650, 2100, 2650, 3350, 4740];

pub const MAX_RIG_HP: u32 = 10;

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Knobs for a run. Every field has a default, so a partial JSON document
/// overrides only what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub shift_ticks: u32,
    pub due_curve: Vec<i64>,
    pub starting_credits: i64,
    pub draft_size: usize,
    pub starter_modules: Vec<String>,
    pub max_rig_hp: u32,
    /// Shift seed = base seed + day × stride.
    pub seed_stride: u64,
    /// Draft seed = shift seed + offset. Must not be a multiple of the
    /// stride, or a draft stream would replay a later day's shift stream.
    pub draft_seed_offset: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            shift_ticks: DEFAULT_SHIFT_TICKS,
            due_curve: DEFAULT_DUE_CURVE.to_vec(),
            starting_credits: 0,
            draft_size: 3,
            starter_modules: STARTER_MODULES.iter().map(|s| s.to_string()).collect(),
            max_rig_hp: MAX_RIG_HP,
            seed_stride: 1000,
            draft_seed_offset: 500,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_SHIFT_TICKS..=MAX_SHIFT_TICKS).contains(&self.shift_ticks) {
            return Err(SimError::InvalidConfig(format!(
                "shift_ticks {} outside {MIN_SHIFT_TICKS}..={MAX_SHIFT_TICKS}",
                self.shift_ticks
            )));
        }
        if self.due_curve.len() != FINAL_DAY as usize {
            return Err(SimError::InvalidConfig(format!(
                "due_curve needs {FINAL_DAY} entries, got {}",
                self.due_curve.len()
            )));
        }
        if self.due_curve.iter().any(|&due| due < 0) {
            return Err(SimError::InvalidConfig("due_curve entries must be non-negative".into()));
        }
        if self.starting_credits < 0 {
            return Err(SimError::InvalidConfig("starting_credits must be non-negative".into()));
        }
        if self.draft_size == 0 {
            return Err(SimError::InvalidConfig("draft_size must be at least 1".into()));
        }
        if self.max_rig_hp == 0 {
            return Err(SimError::InvalidConfig("max_rig_hp must be positive".into()));
        }
        if self.seed_stride == 0 {
            return Err(SimError::InvalidConfig("seed_stride must be positive".into()));
        }
        if self.draft_seed_offset % self.seed_stride == 0 {
            return Err(SimError::InvalidConfig(format!(
                "draft_seed_offset {} is a multiple of seed_stride {}",
                self.draft_seed_offset, self.seed_stride
            )));
        }
        if let Some(id) = self.starter_modules.iter().find(|id| module_by_id(id).is_none()) {
            return Err(SimError::UnknownModule(id.clone()));
        }
        Ok(())
    }

    /// Due owed on `day` (1-based).
    pub fn due_for_day(&self, day: u32) -> Option<i64> {
        let idx = (day as usize).checked_sub(1)?;
        self.due_curve.get(idx).copied()
    }

    pub fn shift_seed(&self, base_seed: u64, day: u32) -> u64 {
        base_seed.wrapping_add(day as u64 * self.seed_stride)
    }

    pub fn draft_seed(&self, shift_seed: u64) -> u64 {
        shift_seed.wrapping_add(self.draft_seed_offset)
    }
}
