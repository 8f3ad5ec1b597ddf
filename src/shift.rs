// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Rigshift Idle Mining Simulation - Shift Orchestration
//
// Two ways to drive a shift: `run_full_shift` runs it to completion in one
// call, `LiveShift` advances it one tick at a time and applies queued player
// commands at tick boundaries. Both own their ShiftState outright.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::conservation::ConservationLedger;
use crate::error::Result;
use crate::modifiers::RigModifiers;
use crate::rng::SeededRng;
use crate::types::{Biome, Depth, HudSnapshot, ShiftState, ShiftSummary, TickResult};

// ─── Full shift ──────────────────────────────────────────────────────────────

/// A finished shift with its per-tick log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftRun {
    pub state: ShiftState,
    pub ticks: Vec<TickResult>,
    pub conservation: ConservationLedger,
}

impl ShiftRun {
    pub fn summary(&self, day: u32) -> ShiftSummary {
        ShiftSummary::from_state(&self.state, day)
    }
}

/// Run a shift to completion with no player input.
pub fn run_full_shift(
    biome: Biome,
    depth: Depth,
    rig: &RigModifiers,
    seed: u64,
    max_ticks: u32,
) -> Result<ShiftRun> {
    let mut live = LiveShift::new(biome, depth, rig, seed, max_ticks)?;
    while live.step().is_some() {}
    Ok(live.finish())
}

impl ShiftSummary {
    pub fn from_state(state: &ShiftState, day: u32) -> Self {
        let total_units = state.units_produced.total() as f64;
        let waste_percent = if total_units > 0.0 {
            state.waste_accum / (total_units + state.waste_accum)
        } else {
            0.0
        };

        Self {
            day,
            biome: state.biome,
            depth: state.depth,
            total_units_produced: state.units_produced,
            total_specimens_found: state.specimens_found.clone(),
            total_scrap: state.scrap_produced,
            final_heat: state.heat,
            final_storage_used: state.storage_used,
            waste_percent,
            heat_throttled: state.heat_throttled,
            throttle_ticks: state.throttle_ticks,
            damage_from_heat: state.damage_from_heat,
            purges_used: state.purges_used,
            purge_loss: state.purge_loss,
            overclock_ticks: state.overclock_ticks,
            ticks_run: state.tick,
            ended_early: state.ended_early,
        }
    }
}

// ─── Live shift ──────────────────────────────────────────────────────────────

/// Player input for a running shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ShiftCommand {
    Overclock(bool),
    Purge,
    EndEarly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub command: ShiftCommand,
    pub accepted: bool,
}

/// What one `step` did: the commands applied at the boundary, then the tick.
/// `tick` is `None` when a command ended the shift before it could run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub outcomes: Vec<CommandOutcome>,
    pub tick: Option<TickResult>,
}

#[derive(Debug, Clone)]
pub struct LiveShift {
    state: ShiftState,
    rig: RigModifiers,
    rng: SeededRng,
    commands: VecDeque<ShiftCommand>,
    ticks: Vec<TickResult>,
    ledger: ConservationLedger,
    finalized: bool,
}

impl LiveShift {
    pub fn new(
        biome: Biome,
        depth: Depth,
        rig: &RigModifiers,
        seed: u64,
        max_ticks: u32,
    ) -> Result<Self> {
        let state = ShiftState::new(biome, depth, rig, max_ticks)?;
        Ok(Self {
            state,
            rig: *rig,
            rng: SeededRng::new(seed),
            commands: VecDeque::new(),
            ticks: Vec::with_capacity(max_ticks as usize),
            ledger: ConservationLedger::new(),
            finalized: false,
        })
    }

    /// Queue a command for the next tick boundary.
    pub fn push(&mut self, command: ShiftCommand) {
        self.commands.push_back(command);
    }

    pub fn pending(&self) -> usize {
        self.commands.len()
    }

    /// Apply queued commands, then advance one tick.
    ///
    /// Returns `None` once the shift is complete. Commands queued after that
    /// point are dropped.
    pub fn step(&mut self) -> Option<StepReport> {
        if self.state.is_complete {
            self.commands.clear();
            self.finalize();
            return None;
        }

        let outcomes: Vec<CommandOutcome> = self
            .commands
            .drain(..)
            .map(|command| {
                let accepted = match command {
                    ShiftCommand::Overclock(on) => self.state.toggle_overclock(on),
                    ShiftCommand::Purge => self.state.activate_purge(),
                    ShiftCommand::EndEarly => self.state.end_shift_early(),
                };
                CommandOutcome { command, accepted }
            })
            .collect();

        let tick = self.state.process_tick(&self.rig, &mut self.rng);
        if let Some(result) = &tick {
            self.ledger.verify_tick(result);
            self.ticks.push(result.clone());
        }
        if self.state.is_complete {
            self.finalize();
        }

        Some(StepReport { outcomes, tick })
    }

    fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        self.ledger.verify_shift(&self.state);

        let s = &self.state;
        info!(
            biome = %s.biome,
            depth = s.depth.tier(),
            ticks = s.tick,
            units = s.units_produced.total(),
            specimens = s.specimens_found.len(),
            scrap = s.scrap_produced,
            heat = s.heat,
            ended_early = s.ended_early,
            "shift complete"
        );
        if !self.ledger.is_balanced() {
            warn!(violations = self.ledger.violations, "shift finished with ledger violations");
        }
    }

    pub fn state(&self) -> &ShiftState {
        &self.state
    }

    pub fn hud(&self) -> HudSnapshot {
        self.state.hud()
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete
    }

    pub fn ticks(&self) -> &[TickResult] {
        &self.ticks
    }

    pub fn summary(&self, day: u32) -> ShiftSummary {
        ShiftSummary::from_state(&self.state, day)
    }

    /// Hand over the finished (or abandoned) shift.
    pub fn finish(mut self) -> ShiftRun {
        self.finalize();
        ShiftRun {
            state: self.state,
            ticks: self.ticks,
            conservation: self.ledger,
        }
    }
}
