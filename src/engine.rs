// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Rigshift Idle Mining Simulation - Tick Engine
//
// One call to `process_tick` advances a shift by exactly one tick in a fixed
// order. Every random draw happens at a fixed point in that order, so the same
// seed and the same control inputs always reproduce the same shift.

use tracing::debug;

use crate::error::{Result, SimError};
use crate::modifiers::RigModifiers;
use crate::rng::SeededRng;
use crate::types::{
    Biome, Depth, Grade, HudSnapshot, Metal, MetalMap, ShiftState, Specimen, SpecimenForm,
    TickResult,
};

// ─── Constants ───────────────────────────────────────────────────────────────

pub const DEFAULT_SHIFT_TICKS: u32 = 75;
pub const MIN_SHIFT_TICKS: u32 = 60;
pub const MAX_SHIFT_TICKS: u32 = 90;

pub const HEAT_MAX: f64 = 100.0;
pub const HEAT_THROTTLE_THRESHOLD: f64 = 100.0;
/// Output multiplier while throttled.
pub const THROTTLE_OUTPUT: f64 = 0.70;
pub const HEAT_DECAY_PER_TICK: f64 = 0.5;
pub const BASE_HEAT_GAIN_PER_TICK: f64 = 1.5;

pub const OVERCLOCK_THROUGHPUT: f64 = 1.20;
pub const OVERCLOCK_HEAT: f64 = 1.35;

pub const PURGE_COOLDOWN: u32 = 20;
pub const PURGE_HEAT_REDUCTION: f64 = 25.0;
pub const PURGE_UNIT_LOSS: f64 = 0.05;

pub const BASE_UNITS_PER_TICK: f64 = 2.0;
pub const UNIT_VARIANCE: f64 = 0.4;

// ─── Shift lifecycle ─────────────────────────────────────────────────────────

impl ShiftState {
    /// Fresh shift at tick 0 with cold heat and empty storage.
    pub fn new(biome: Biome, depth: Depth, rig: &RigModifiers, max_ticks: u32) -> Result<Self> {
        if max_ticks == 0 {
            return Err(SimError::InvalidMaxTicks);
        }
        Ok(Self {
            tick: 0,
            max_ticks,
            biome,
            depth,
            heat: 0.0,
            storage_used: 0,
            storage_max: rig.storage,
            waste_accum: 0.0,
            overclock_active: false,
            purge_cooldown: 0,
            units_produced: MetalMap::new(),
            specimens_found: Vec::new(),
            scrap_produced: 0,
            purge_loss: 0,
            heat_throttled: false,
            throttle_ticks: 0,
            purges_used: 0,
            overclock_ticks: 0,
            damage_from_heat: 0,
            is_complete: false,
            ended_early: false,
        })
    }

    /// Advance one tick. Returns `None` once the shift is complete; the state
    /// is left untouched in that case.
    pub fn process_tick(&mut self, rig: &RigModifiers, rng: &mut SeededRng) -> Option<TickResult> {
        if self.is_complete {
            return None;
        }

        let depth_mods = self.depth.modifiers();
        let tick = self.tick;

        // 1. Throttle
        let throttled = self.heat >= HEAT_THROTTLE_THRESHOLD;
        if throttled {
            if !self.heat_throttled {
                self.heat_throttled = true;
                self.damage_from_heat += 1;
                debug!(tick, "rig throttled by heat");
            }
            self.throttle_ticks += 1;
        }

        // 2. Throughput
        let mut mult = rig.throughput * depth_mods.throughput_mult;
        if throttled {
            mult *= THROTTLE_OUTPUT;
        }
        if self.overclock_active {
            mult *= OVERCLOCK_THROUGHPUT;
            self.overclock_ticks += 1;
        }
        mult *= rig.unit_yield;

        // 3. Raw output
        let variance = (rng.random() - 0.5) * 2.0 * UNIT_VARIANCE;
        let raw_units = BASE_UNITS_PER_TICK * mult * (1.0 + variance);

        // 4. Waste
        let waste_rate = (rig.waste * depth_mods.waste_mult).clamp(0.0, 1.0);
        let wasted_units = raw_units * waste_rate;
        let good_units = raw_units - wasted_units;
        self.waste_accum += wasted_units;

        // 5. Metal
        let metal = select_metal(self.biome, rng);

        // 6. Storage routing
        let routed_units = good_units.floor().max(0.0) as u32;
        let routing = route_to_storage(
            routed_units,
            self.storage_max.saturating_sub(self.storage_used),
            rig.scrap_to_units,
        );
        if routing.stored > 0 {
            self.units_produced[metal] += routing.stored;
            self.storage_used += routing.stored;
        }
        self.scrap_produced += routing.scrap;

        // 7. Specimen
        let specimen_chance = depth_mods.specimen_chance + rig.specimen_chance;
        let specimen = if rng.random() < specimen_chance {
            let found = generate_specimen(tick, self.biome, self.depth, rig.high_grade_chance, rng);
            debug!(tick, id = %found.id, metal = %found.metal, grade = ?found.grade, "specimen found");
            self.specimens_found.push(found.clone());
            Some(found)
        } else {
            None
        };

        // 8. Heat
        let mut heat_gain = BASE_HEAT_GAIN_PER_TICK * rig.heat_gain * depth_mods.heat_gain_mult;
        if self.overclock_active {
            heat_gain *= OVERCLOCK_HEAT;
        }
        let heat_delta = heat_gain - HEAT_DECAY_PER_TICK;
        self.heat = (self.heat + heat_delta).clamp(0.0, HEAT_MAX);

        // 9. Purge cooldown
        if self.purge_cooldown > 0 {
            self.purge_cooldown -= 1;
        }

        // 10. Advance
        self.tick += 1;
        if self.tick >= self.max_ticks {
            self.is_complete = true;
        }

        Some(TickResult {
            tick,
            metal,
            raw_units,
            wasted_units,
            routed_units,
            units_stored: routing.stored,
            scrap_recovered: routing.recovered,
            scrap_generated: routing.scrap,
            overflow: routing.overflow,
            throttled,
            specimen,
            heat_delta,
            heat_after: self.heat,
            storage_after: self.storage_used,
        })
    }

    /// Switch overclock on or off. Returns `false` on a completed shift.
    pub fn toggle_overclock(&mut self, active: bool) -> bool {
        if self.is_complete {
            return false;
        }
        self.overclock_active = active;
        true
    }

    /// Vent heat at the cost of a slice of stored units.
    ///
    /// Returns `false` while on cooldown or once the shift is complete.
    pub fn activate_purge(&mut self) -> bool {
        if self.is_complete || self.purge_cooldown > 0 {
            return false;
        }

        self.heat = (self.heat - PURGE_HEAT_REDUCTION).max(0.0);

        let loss = (self.storage_used as f64 * PURGE_UNIT_LOSS).floor() as u32;
        let removed = remove_largest_first(&mut self.units_produced, loss);
        self.storage_used -= removed;
        self.purge_loss += removed;

        self.purge_cooldown = PURGE_COOLDOWN;
        self.purges_used += 1;
        debug!(tick = self.tick, heat = self.heat, lost = removed, "purge vented");
        true
    }

    /// Stop the shift now. Returns `false` if it had already ended.
    pub fn end_shift_early(&mut self) -> bool {
        if self.is_complete {
            return false;
        }
        self.is_complete = true;
        self.ended_early = true;
        debug!(tick = self.tick, "shift ended early");
        true
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            tick: self.tick,
            max_ticks: self.max_ticks,
            heat: self.heat,
            storage_used: self.storage_used,
            storage_max: self.storage_max,
            purge_cooldown: self.purge_cooldown,
            overclock_active: self.overclock_active,
            heat_throttled: self.heat_throttled,
            specimens_found: self.specimens_found.len(),
            is_complete: self.is_complete,
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Routing {
    stored: u32,
    recovered: u32,
    scrap: u32,
    overflow: bool,
}

/// Split whole units between storage and scrap. `stored + scrap == units`.
fn route_to_storage(units: u32, remaining: u32, scrap_to_units: f64) -> Routing {
    if units <= remaining {
        return Routing {
            stored: units,
            recovered: 0,
            scrap: 0,
            overflow: false,
        };
    }

    let mut stored = remaining;
    let mut scrap = units - remaining;

    let reclaim = ((scrap as f64 * scrap_to_units).floor().max(0.0) as u32).min(scrap);
    scrap -= reclaim;
    stored += reclaim;

    // Reclaimed units still need room
    if stored > remaining {
        scrap += stored - remaining;
        stored = remaining;
    }

    Routing {
        stored,
        recovered: stored - remaining.min(units),
        scrap,
        overflow: true,
    }
}

/// Take `amount` units out of the tallies, largest holding first. Ties go to
/// the metal earliest in `Metal::ALL`. Returns how many were removed.
fn remove_largest_first(units: &mut MetalMap, amount: u32) -> u32 {
    let mut left = amount;
    while left > 0 {
        let Some((metal, held)) = units
            .iter()
            .filter(|&(_, held)| held > 0)
            .fold(None, |best: Option<(Metal, u32)>, (m, held)| match best {
                Some((_, top)) if top >= held => best,
                _ => Some((m, held)),
            })
        else {
            break;
        };
        let take = held.min(left);
        units[metal] -= take;
        left -= take;
    }
    amount - left
}

fn select_metal(biome: Biome, rng: &mut SeededRng) -> Metal {
    rng.weighted_choice(&biome.metal_weights())
        .copied()
        .unwrap_or(Metal::Sol)
}

fn select_grade(depth: Depth, high_grade_bonus: f64, rng: &mut SeededRng) -> Grade {
    let mut dist = depth.grade_distribution();
    if high_grade_bonus > 0.0 {
        dist.low = (dist.low - high_grade_bonus).max(0.0);
        dist.high = (dist.high + high_grade_bonus * 0.7).min(1.0);
        dist.ultra = (dist.ultra + high_grade_bonus * 0.3).min(1.0);
    }
    let weights = [
        (Grade::Low, dist.low),
        (Grade::High, dist.high),
        (Grade::Ultra, dist.ultra),
    ];
    rng.weighted_choice(&weights).copied().unwrap_or(Grade::Low)
}

fn generate_specimen(
    tick: u32,
    biome: Biome,
    depth: Depth,
    high_grade_bonus: f64,
    rng: &mut SeededRng,
) -> Specimen {
    let metal = select_metal(biome, rng);
    let form = rng
        .choice(&SpecimenForm::ALL)
        .copied()
        .unwrap_or(SpecimenForm::Ore);
    let grade = select_grade(depth, high_grade_bonus, rng);
    Specimen::new(format!("spec-{tick}"), metal, form, grade, biome, depth)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(depth: Depth) -> (ShiftState, RigModifiers) {
        let rig = RigModifiers::default();
        let state = ShiftState::new(Biome::Desert, depth, &rig, DEFAULT_SHIFT_TICKS)
            .expect("valid shift");
        (state, rig)
    }

    #[test]
    fn zero_ticks_rejected() {
        let rig = RigModifiers::default();
        assert!(matches!(
            ShiftState::new(Biome::Tundra, Depth::Surface, &rig, 0),
            Err(SimError::InvalidMaxTicks)
        ));
    }

    #[test]
    fn purge_vents_heat_then_cools_down() {
        let (mut state, _) = fresh(Depth::Surface);
        state.heat = 50.0;
        assert!(state.activate_purge());
        assert_eq!(state.heat, 25.0);
        assert_eq!(state.purge_cooldown, PURGE_COOLDOWN);
        assert_eq!(state.purges_used, 1);
        assert!(!state.activate_purge());
        assert_eq!(state.heat, 25.0);
        assert_eq!(state.purge_cooldown, PURGE_COOLDOWN);
        assert_eq!(state.purges_used, 1);
    }

    #[test]
    fn purge_heat_floors_at_zero() {
        let (mut state, _) = fresh(Depth::Surface);
        state.heat = 10.0;
        assert!(state.activate_purge());
        assert_eq!(state.heat, 0.0);
    }

    #[test]
    fn purge_takes_from_largest_holding() {
        let (mut state, _) = fresh(Depth::Surface);
        state.units_produced[Metal::Aes] = 30;
        state.units_produced[Metal::Lun] = 30;
        state.units_produced[Metal::Sol] = 10;
        state.storage_used = 70;
        state.storage_max = 80;

        assert!(state.activate_purge());
        assert_eq!(state.purge_loss, 3);
        assert_eq!(state.storage_used, 67);
        assert_eq!(state.units_produced[Metal::Aes], 27);
        assert_eq!(state.units_produced[Metal::Lun], 30);
        assert_eq!(state.storage_used, state.units_produced.total());
    }

    #[test]
    fn throttle_damages_once_but_counts_every_tick() {
        let (mut state, rig) = fresh(Depth::Deep);
        let mut rng = SeededRng::new(11);
        state.heat = HEAT_MAX;

        let first = state.process_tick(&rig, &mut rng).expect("tick runs");
        assert!(first.throttled);
        state.heat = HEAT_MAX;
        let second = state.process_tick(&rig, &mut rng).expect("tick runs");
        assert!(second.throttled);

        assert!(state.heat_throttled);
        assert_eq!(state.damage_from_heat, 1);
        assert_eq!(state.throttle_ticks, 2);
    }

    #[test]
    fn overclock_ticks_are_counted() {
        let (mut state, rig) = fresh(Depth::Surface);
        let mut rng = SeededRng::new(3);
        assert!(state.toggle_overclock(true));
        for _ in 0..5 {
            state.process_tick(&rig, &mut rng);
        }
        assert!(state.toggle_overclock(false));
        state.process_tick(&rig, &mut rng);
        assert_eq!(state.overclock_ticks, 5);
    }

    #[test]
    fn completed_shift_ignores_input() {
        let rig = RigModifiers::default();
        let mut state = ShiftState::new(Biome::Abyss, Depth::Mid, &rig, 1).expect("valid shift");
        let mut rng = SeededRng::new(1);

        assert!(state.process_tick(&rig, &mut rng).is_some());
        assert!(state.is_complete);
        let snapshot = state.clone();
        let draws = rng.draws();

        assert!(state.process_tick(&rig, &mut rng).is_none());
        assert!(!state.toggle_overclock(true));
        assert!(!state.activate_purge());
        assert!(!state.end_shift_early());
        assert_eq!(state, snapshot);
        assert_eq!(rng.draws(), draws);
    }

    #[test]
    fn end_early_is_immediate() {
        let (mut state, rig) = fresh(Depth::Surface);
        let mut rng = SeededRng::new(9);
        state.process_tick(&rig, &mut rng);
        assert!(state.end_shift_early());
        assert!(state.is_complete && state.ended_early);
        assert_eq!(state.tick, 1);
        assert!(state.process_tick(&rig, &mut rng).is_none());
    }

    #[test]
    fn meters_stay_in_bounds() {
        for seed in 0..20 {
            let (mut state, rig) = fresh(Depth::Deep);
            let mut rng = SeededRng::new(seed);
            state.toggle_overclock(true);
            while let Some(result) = state.process_tick(&rig, &mut rng) {
                assert!((0.0..=HEAT_MAX).contains(&state.heat));
                assert!(state.storage_used <= state.storage_max);
                assert_eq!(result.units_stored + result.scrap_generated, result.routed_units);
            }
            assert_eq!(state.tick, DEFAULT_SHIFT_TICKS);
        }
    }

    #[test]
    fn routing_without_overflow_stores_everything() {
        let r = route_to_storage(3, 10, 0.5);
        assert_eq!(r, Routing { stored: 3, recovered: 0, scrap: 0, overflow: false });
    }

    #[test]
    fn routing_overflow_is_bounded_by_capacity() {
        let r = route_to_storage(5, 2, 1.0);
        assert_eq!(r.stored, 2);
        assert_eq!(r.scrap, 3);
        assert!(r.overflow);

        let full = route_to_storage(4, 0, 0.0);
        assert_eq!(full.stored + full.scrap, 4);
        assert_eq!(full.stored, 0);
    }

    #[test]
    fn specimen_ids_follow_tick() {
        let mut rng = SeededRng::new(77);
        let found = generate_specimen(12, Biome::Volcanic, Depth::Deep, 0.0, &mut rng);
        assert_eq!(found.id, "spec-12");
        assert_eq!(found.biome, Biome::Volcanic);
        assert_ne!(found.metal, Metal::Lun);
    }

    #[test]
    fn grade_bonus_can_empty_low() {
        let mut rng = SeededRng::new(5);
        for _ in 0..200 {
            assert_ne!(select_grade(Depth::Surface, 1.0, &mut rng), Grade::Low);
        }
    }
}
