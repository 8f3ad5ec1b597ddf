// Per-Day JSONL Time Series Recorder
// Outputs one JSON line per settled day for independent analysis

use rigshift_engine::run::DayRecord;
use rigshift_engine::{Biome, Depth};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct DaySnapshot {
    pub day: u32,
    pub shift_seed: u64,
    pub biome: Biome,
    pub depth: Depth,
    pub units_produced: u32,
    pub specimens_found: usize,
    pub scrap: u32,
    pub waste_percent: f64,
    pub final_heat: f64,
    pub throttle_ticks: u32,
    pub damage_from_heat: u32,
    pub rig_hp_after: u32,
    pub due: i64,
    pub due_paid: bool,
    pub credits_before: i64,
    pub credits_after: i64,
    pub credits_sold: i64,
    pub unsold_units_value: i64,
    pub stash_units: u32,
    pub upkeep_paid: i64,
    pub emergency_triggered: bool,
    pub ledger_balanced: bool,
    pub modules_installed: usize,
    pub draft_chosen: Option<String>,
}

impl DaySnapshot {
    pub fn from_record(record: &DayRecord, modules_installed: usize) -> Self {
        let summary = &record.summary;
        let settlement = &record.settlement;
        Self {
            day: record.day,
            shift_seed: record.shift_seed,
            biome: summary.biome,
            depth: summary.depth,
            units_produced: summary.total_units_produced.total(),
            specimens_found: summary.total_specimens_found.len(),
            scrap: summary.total_scrap,
            waste_percent: summary.waste_percent,
            final_heat: summary.final_heat,
            throttle_ticks: summary.throttle_ticks,
            damage_from_heat: summary.damage_from_heat,
            rig_hp_after: record.rig_hp_after,
            due: settlement.due,
            due_paid: settlement.due_paid,
            credits_before: settlement.credits_before,
            credits_after: settlement.credits_after,
            credits_sold: settlement.credits_sold,
            unsold_units_value: settlement.unsold_units_value,
            stash_units: record.stash_after.total(),
            upkeep_paid: settlement.upkeep_paid,
            emergency_triggered: settlement.emergency_triggered,
            ledger_balanced: record.ledger_balanced,
            modules_installed,
            draft_chosen: record.draft_chosen.clone(),
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<DaySnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, record: &DayRecord, modules_installed: usize) {
        self.snapshots.push(DaySnapshot::from_record(record, modules_installed));
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}
