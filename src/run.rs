// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Rigshift Idle Mining Simulation - Run Driver
//
// A run is twelve days. Each day: optionally adjust the rig and policy, run
// one shift, settle it, then pick from a module draft before advancing.
// Everything random is derived from the base seed, so a run replays exactly
// given the same choices.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::modifiers::{aggregate, RigModifiers};
use crate::modules::{
    generate_draft, module_by_id, slots_used, InstalledModule, ModuleDefinition, RIG_TOTAL_SLOTS,
};
use crate::policy::{
    process_policy, units_left_after_sale, AutomationPolicy, DayEndInput, EndOfDayResult, FINAL_DAY,
    REPAIR_COST_PER_HP,
};
use crate::rng::SeededRng;
use crate::shift::run_full_shift;
use crate::types::{Biome, Depth, MetalMap, RunStatus, ShiftSummary, Specimen};

/// One settled day, kept for replay and reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub day: u32,
    pub shift_seed: u64,
    pub summary: ShiftSummary,
    pub settlement: EndOfDayResult,
    pub rig_damage: u32,
    pub rig_hp_after: u32,
    /// Units carried into the next day.
    pub stash_after: MetalMap,
    /// Whether the shift's unit ledger reconciled.
    pub ledger_balanced: bool,
    pub draft_offered: Vec<String>,
    pub draft_chosen: Option<String>,
}

/// What `execute_day` hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayOutcome {
    pub summary: ShiftSummary,
    pub settlement: EndOfDayResult,
    pub draft: Vec<&'static ModuleDefinition>,
    pub rig_damage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepairOutcome {
    pub hp_repaired: u32,
    pub cost: i64,
    pub new_hp: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Run {
    config: SimConfig,
    base_seed: u64,
    day: u32,
    credits: i64,
    rig_hp: u32,
    rig_damage: u32,
    modules: Vec<InstalledModule>,
    unlocked: Vec<String>,
    policy: AutomationPolicy,
    status: RunStatus,
    shift_done: bool,
    due_paid: bool,
    draft: Vec<&'static ModuleDefinition>,
    stash: MetalMap,
    vault: Vec<Specimen>,
    history: Vec<DayRecord>,
}

impl Run {
    /// Start day 1 with the starter loadout.
    pub fn start(config: SimConfig, base_seed: u64) -> Result<Self> {
        config.validate()?;

        let mut modules = Vec::with_capacity(config.starter_modules.len());
        let mut slot = 0u8;
        for id in &config.starter_modules {
            let module = InstalledModule::resolve(id, slot, 1)?;
            slot = slot.saturating_add(module.definition.slot_cost);
            modules.push(module);
        }
        if slots_used(&modules) > RIG_TOTAL_SLOTS {
            return Err(SimError::NotEnoughSlots {
                needed: slots_used(&modules),
                free: RIG_TOTAL_SLOTS,
            });
        }

        info!(seed = base_seed, starters = modules.len(), "run started");

        Ok(Self {
            credits: config.starting_credits,
            rig_hp: config.max_rig_hp,
            config,
            base_seed,
            day: 1,
            rig_damage: 0,
            modules,
            unlocked: Vec::new(),
            policy: AutomationPolicy::default(),
            status: RunStatus::Active,
            shift_done: false,
            due_paid: false,
            draft: Vec::new(),
            stash: MetalMap::new(),
            vault: Vec::new(),
            history: Vec::new(),
        })
    }

    fn ensure_active(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(SimError::RunNotActive(self.status));
        }
        Ok(())
    }

    // ─── Day loop ────────────────────────────────────────────────────────────

    /// Run today's shift, settle it and offer a draft.
    pub fn execute_day(&mut self, biome: Biome, depth: Depth) -> Result<DayOutcome> {
        self.ensure_active()?;
        if self.shift_done {
            return Err(SimError::ShiftAlreadyCompleted(self.day));
        }
        let due = self
            .config
            .due_for_day(self.day)
            .ok_or(SimError::RunComplete)?;

        let rig = self.rig_modifiers();
        let shift_seed = self.config.shift_seed(self.base_seed, self.day);
        let mut shift = run_full_shift(biome, depth, &rig, shift_seed, self.config.shift_ticks)?;
        for specimen in &mut shift.state.specimens_found {
            specimen.id = format!("d{}-{}", self.day, specimen.id);
        }
        let summary = shift.summary(self.day);
        self.shift_done = true;

        let heat_damage = shift.state.damage_from_heat;
        self.rig_damage += heat_damage;
        self.rig_hp = self.rig_hp.saturating_sub(heat_damage);

        // Unsold units from earlier days are offered again alongside today's haul
        let mut holdings = self.stash;
        holdings.add_all(&shift.state.units_produced);

        let settlement = process_policy(&DayEndInput {
            day: self.day,
            due,
            current_credits: self.credits,
            units_produced: holdings,
            specimens_found: shift.state.specimens_found.clone(),
            scrap_produced: shift.state.scrap_produced,
            rig_damage: self.rig_damage,
            policy: self.policy,
            rig,
        });

        self.stash =
            units_left_after_sale(&holdings, settlement.units_sold_value, rig.sell_bid_bonus);
        self.credits = settlement.credits_after;
        self.due_paid = settlement.due_paid;
        self.status = settlement.run_status;
        self.vault.extend(settlement.specimens_kept.iter().cloned());

        self.draft = if self.status == RunStatus::Active {
            let installed: Vec<&str> = self.modules.iter().map(|m| m.definition.id).collect();
            let unlocked: Vec<&str> = self.unlocked.iter().map(String::as_str).collect();
            let mut draft_rng = SeededRng::new(self.config.draft_seed(shift_seed));
            generate_draft(&installed, &unlocked, &mut draft_rng, self.config.draft_size)
        } else {
            Vec::new()
        };

        match self.status {
            RunStatus::Lost => warn!(day = self.day, due, credits = self.credits, "run lost"),
            RunStatus::Won => info!(credits = self.credits, "run won"),
            RunStatus::Active => info!(day = self.day, credits = self.credits, "day complete"),
        }

        self.history.push(DayRecord {
            day: self.day,
            shift_seed,
            summary: summary.clone(),
            settlement: settlement.clone(),
            rig_damage: self.rig_damage,
            rig_hp_after: self.rig_hp,
            stash_after: self.stash,
            ledger_balanced: shift.conservation.is_balanced(),
            draft_offered: self.draft.iter().map(|m| m.id.to_string()).collect(),
            draft_chosen: None,
        });

        Ok(DayOutcome {
            summary,
            settlement,
            draft: self.draft.clone(),
            rig_damage: self.rig_damage,
        })
    }

    /// Install one module from today's offer. The offer closes once used.
    pub fn choose_draft(&mut self, module_id: &str) -> Result<InstalledModule> {
        self.ensure_active()?;
        let definition = self
            .draft
            .iter()
            .copied()
            .find(|m| m.id == module_id)
            .ok_or_else(|| SimError::NotInDraft(module_id.to_string()))?;

        let installed = self.install(definition)?;
        self.draft.clear();
        if let Some(record) = self.history.last_mut() {
            record.draft_chosen = Some(module_id.to_string());
        }

        info!(day = self.day, module = module_id, "draft module installed");
        Ok(installed)
    }

    fn install(&mut self, definition: &'static ModuleDefinition) -> Result<InstalledModule> {
        if self.modules.iter().any(|m| m.definition.id == definition.id) {
            return Err(SimError::AlreadyInstalled(definition.id.to_string()));
        }
        let used = slots_used(&self.modules);
        let free = RIG_TOTAL_SLOTS.saturating_sub(used);
        if definition.slot_cost > free {
            return Err(SimError::NotEnoughSlots {
                needed: definition.slot_cost,
                free,
            });
        }
        let installed = InstalledModule {
            definition,
            slot_index: used,
            installed_day: self.day,
        };
        self.modules.push(installed.clone());
        Ok(installed)
    }

    /// Install modules by id before today's shift. All ids are resolved and
    /// checked before anything is installed.
    pub fn install_by_ids(&mut self, ids: &[&str]) -> Result<()> {
        self.ensure_active()?;
        if self.shift_done {
            return Err(SimError::ShiftAlreadyCompleted(self.day));
        }

        let mut defs = Vec::with_capacity(ids.len());
        for id in ids {
            let def = module_by_id(id).ok_or_else(|| {
                warn!(module = *id, "rejected unknown module id");
                SimError::UnknownModule(id.to_string())
            })?;
            if self.modules.iter().any(|m| m.definition.id == def.id)
                || defs.iter().any(|d: &&ModuleDefinition| d.id == def.id)
            {
                return Err(SimError::AlreadyInstalled(def.id.to_string()));
            }
            defs.push(def);
        }

        let needed: u8 = defs.iter().map(|d| d.slot_cost).sum();
        let free = RIG_TOTAL_SLOTS.saturating_sub(slots_used(&self.modules));
        if needed > free {
            return Err(SimError::NotEnoughSlots { needed, free });
        }

        for def in defs {
            self.install(def)?;
        }
        Ok(())
    }

    /// Buy back hit points. Repair is capped at the missing HP.
    pub fn repair(&mut self, hp: u32) -> Result<RepairOutcome> {
        self.ensure_active()?;
        let hp_repaired = hp.min(self.config.max_rig_hp.saturating_sub(self.rig_hp));
        let cost = hp_repaired as i64 * REPAIR_COST_PER_HP;
        if self.credits < cost {
            return Err(SimError::InsufficientCredits {
                needed: cost,
                available: self.credits,
            });
        }
        self.credits -= cost;
        self.rig_hp += hp_repaired;
        Ok(RepairOutcome {
            hp_repaired,
            cost,
            new_hp: self.rig_hp,
        })
    }

    /// Move to the next day. Today's due must be paid.
    pub fn advance_day(&mut self) -> Result<u32> {
        self.ensure_active()?;
        if !self.shift_done {
            return Err(SimError::ShiftNotRun(self.day));
        }
        if !self.due_paid {
            return Err(SimError::DueNotPaid(self.day));
        }
        if self.day >= FINAL_DAY {
            return Err(SimError::RunComplete);
        }

        self.day += 1;
        self.rig_damage = 0;
        self.shift_done = false;
        self.due_paid = false;
        self.draft.clear();
        Ok(self.day)
    }

    pub fn set_policy(&mut self, policy: AutomationPolicy) -> Result<()> {
        self.ensure_active()?;
        self.policy = policy;
        Ok(())
    }

    /// Record a met unlock condition so gated modules can be drafted.
    pub fn unlock(&mut self, condition: impl Into<String>) {
        let condition = condition.into();
        if !self.unlocked.contains(&condition) {
            self.unlocked.push(condition);
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn rig_modifiers(&self) -> RigModifiers {
        aggregate(&self.modules)
    }

    pub fn current_due(&self) -> Option<i64> {
        self.config.due_for_day(self.day)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn credits(&self) -> i64 {
        self.credits
    }

    pub fn rig_hp(&self) -> u32 {
        self.rig_hp
    }

    pub fn rig_damage(&self) -> u32 {
        self.rig_damage
    }

    pub fn modules(&self) -> &[InstalledModule] {
        &self.modules
    }

    pub fn policy(&self) -> AutomationPolicy {
        self.policy
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn shift_done(&self) -> bool {
        self.shift_done
    }

    pub fn due_paid(&self) -> bool {
        self.due_paid
    }

    pub fn draft_offer(&self) -> &[&'static ModuleDefinition] {
        &self.draft
    }

    /// Units held over from earlier settlements.
    pub fn stash(&self) -> &MetalMap {
        &self.stash
    }

    pub fn vault(&self) -> &[Specimen] {
        &self.vault
    }

    pub fn history(&self) -> &[DayRecord] {
        &self.history
    }
}
