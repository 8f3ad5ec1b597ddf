// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Rigshift Idle Mining Simulation - Error Types

use crate::types::RunStatus;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised at the engine boundary and by run-level rules.
///
/// Conditions that are part of normal play (purge on cooldown, ticking a
/// finished shift, failing to cover the due) are not errors and never show up
/// here.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("unknown biome: {0:?}")]
    UnknownBiome(String),

    #[error("unknown depth tier: {0} (expected 1-3)")]
    UnknownDepth(i64),

    #[error("unknown metal: {0:?}")]
    UnknownMetal(String),

    #[error("unknown specimen form: {0:?}")]
    UnknownForm(String),

    #[error("unknown grade: {0:?}")]
    UnknownGrade(String),

    #[error("unknown policy mode: {0:?}")]
    UnknownPolicyMode(String),

    #[error("unknown module id: {0:?}")]
    UnknownModule(String),

    #[error("max ticks must be positive")]
    InvalidMaxTicks,

    #[error("seed must be a finite non-negative integer, got {0}")]
    InvalidSeed(f64),

    #[error("shift already completed for day {0}")]
    ShiftAlreadyCompleted(u32),

    #[error("no shift has been run for day {0}")]
    ShiftNotRun(u32),

    #[error("run is not active (status: {0:?})")]
    RunNotActive(RunStatus),

    #[error("due for day {0} has not been paid")]
    DueNotPaid(u32),

    #[error("run already reached its final day")]
    RunComplete,

    #[error("module {0:?} is not in today's draft")]
    NotInDraft(String),

    #[error("module {0:?} is already installed")]
    AlreadyInstalled(String),

    #[error("not enough slots: need {needed}, {free} free")]
    NotEnoughSlots { needed: u8, free: u8 },

    #[error("not enough credits: need {needed}, have {available}")]
    InsufficientCredits { needed: i64, available: i64 },

    #[error("invalid settlement input: {0}")]
    InvalidSettlement(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
