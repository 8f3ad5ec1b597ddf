// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Rigshift Idle Mining Simulation - End-of-Day Policy Settlement
//
// Turns a shift's haul into credits according to the player's automation
// policy, pays upkeep, then tests the day's due. Pure: the same input always
// gives the same result and nothing outside the returned value changes.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SimError;
use crate::modifiers::RigModifiers;
use crate::types::{Grade, Metal, MetalMap, RunStatus, Specimen};

/// Last day of a run. Paying this day's due wins.
pub const FINAL_DAY: u32 = 12;
pub const REPAIR_COST_PER_HP: i64 = 180;

/// Largest credit amount accepted from outside the engine.
pub const MAX_CREDITS: i64 = 1_000_000_000_000_000;
/// Bid bonus accepted from outside the engine.
pub const BID_BONUS_RANGE: RangeInclusive<f64> = -0.99..=1.0;

const BID_MULTIPLIER: Decimal = dec!(0.99);
const SCRAP_PROXY_PRICE: Decimal = dec!(30);
const SCRAP_VALUE_MULTIPLIER: Decimal = dec!(0.25);

// ─── Policy ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SellUnitsPolicy {
    Always,
    Never,
    OnlyIfNeeded,
}

impl SellUnitsPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Never => "never",
            Self::OnlyIfNeeded => "only_if_needed",
        }
    }
}

impl fmt::Display for SellUnitsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SellUnitsPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "only_if_needed" => Ok(Self::OnlyIfNeeded),
            other => Err(SimError::UnknownPolicyMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeepSpecimensPolicy {
    KeepAll,
    KeepNone,
    HighPlus,
}

impl KeepSpecimensPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeepAll => "keep_all",
            Self::KeepNone => "keep_none",
            Self::HighPlus => "high_plus",
        }
    }
}

impl fmt::Display for KeepSpecimensPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeepSpecimensPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep_all" => Ok(Self::KeepAll),
            "keep_none" => Ok(Self::KeepNone),
            "high_plus" => Ok(Self::HighPlus),
            other => Err(SimError::UnknownPolicyMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutomationPolicy {
    pub sell_units: SellUnitsPolicy,
    pub keep_specimens: KeepSpecimensPolicy,
    /// Only consulted under `high_plus`.
    pub melt_low: bool,
    pub emergency_mode: bool,
}

impl Default for AutomationPolicy {
    fn default() -> Self {
        Self {
            sell_units: SellUnitsPolicy::OnlyIfNeeded,
            keep_specimens: KeepSpecimensPolicy::HighPlus,
            melt_low: false,
            emergency_mode: true,
        }
    }
}

// ─── Input / Output ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEndInput {
    pub day: u32,
    pub due: i64,
    pub current_credits: i64,
    pub units_produced: MetalMap,
    pub specimens_found: Vec<Specimen>,
    pub scrap_produced: u32,
    pub rig_damage: u32,
    pub policy: AutomationPolicy,
    #[serde(default)]
    pub rig: RigModifiers,
}

impl DayEndInput {
    /// Reject money and bid values that did not come from a real run.
    pub fn validate(&self) -> crate::error::Result<()> {
        let bonus = self.rig.sell_bid_bonus;
        if !BID_BONUS_RANGE.contains(&bonus) {
            return Err(SimError::InvalidSettlement(format!(
                "sell_bid_bonus {bonus} outside {}..={}",
                BID_BONUS_RANGE.start(),
                BID_BONUS_RANGE.end()
            )));
        }
        let amounts = [
            ("due", self.due, 0),
            ("daily_upkeep", self.rig.daily_upkeep, 0),
            ("current_credits", self.current_credits, -MAX_CREDITS),
        ];
        for (name, value, min) in amounts {
            if !(min..=MAX_CREDITS).contains(&value) {
                return Err(SimError::InvalidSettlement(format!(
                    "{name} {value} outside {min}..={MAX_CREDITS}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndOfDayResult {
    /// Value of every unit plus scrap, before policy.
    pub raw_credits: i64,
    pub raw_specimens: Vec<Specimen>,
    /// Everything converted to credits today: units, scrap and melts.
    pub credits_sold: i64,
    pub units_sold_value: i64,
    /// Unit value the policy chose to hold back.
    pub unsold_units_value: i64,
    pub specimens_kept: Vec<Specimen>,
    pub specimens_melted: Vec<Specimen>,
    pub emergency_triggered: bool,
    pub upkeep_paid: i64,
    /// Reported only; paying it is a separate player action.
    pub repair_cost: i64,
    pub due: i64,
    pub credits_before: i64,
    pub credits_after: i64,
    pub due_paid: bool,
    pub run_ended: bool,
    pub run_status: RunStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DueCoverage {
    pub can_cover: bool,
    pub shortfall: i64,
}

// ─── Pricing ─────────────────────────────────────────────────────────────────

fn bid_multiplier(sell_bid_bonus: f64) -> Decimal {
    let bonus = Decimal::from_f64(sell_bid_bonus)
        .unwrap_or(if sell_bid_bonus > 0.0 {
            Decimal::MAX
        } else if sell_bid_bonus < 0.0 {
            Decimal::MIN
        } else {
            Decimal::ZERO
        })
        .round_dp(6);
    BID_MULTIPLIER.checked_add(bonus).unwrap_or(bonus)
}

fn saturated(sign_of: Decimal) -> i64 {
    if sign_of.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    }
}

/// Floor to whole credits, saturating outside the `i64` range.
fn floor_credits(value: Decimal) -> i64 {
    let floored = value.floor();
    floored.to_i64().unwrap_or_else(|| saturated(floored))
}

/// `floor(units × base price × (0.99 + bonus))`, saturating on overflow.
pub fn unit_value(metal: Metal, units: u32, sell_bid_bonus: f64) -> i64 {
    let bid = bid_multiplier(sell_bid_bonus);
    Decimal::from(metal.base_price())
        .checked_mul(bid)
        .and_then(|price| Decimal::from(units).checked_mul(price))
        .map_or_else(|| saturated(bid), floor_credits)
}

/// Per-metal values floored individually, then summed.
pub fn total_units_value(units: &MetalMap, sell_bid_bonus: f64) -> i64 {
    units
        .iter()
        .filter(|&(_, n)| n > 0)
        .map(|(metal, n)| unit_value(metal, n, sell_bid_bonus))
        .fold(0i64, i64::saturating_add)
}

/// Holdings left after `sold_value` credits' worth of units is sold.
///
/// Units are drawn metal by metal in `Metal::ALL` order. A metal that is only
/// partly needed gives up the fewest units whose value covers the rest.
pub fn units_left_after_sale(units: &MetalMap, sold_value: i64, sell_bid_bonus: f64) -> MetalMap {
    let mut left = *units;
    let mut owed = sold_value;
    for metal in Metal::ALL {
        if owed <= 0 {
            break;
        }
        let held = left[metal];
        if held == 0 {
            continue;
        }
        let full = unit_value(metal, held, sell_bid_bonus);
        if full <= owed {
            left[metal] = 0;
            owed -= full;
        } else {
            left[metal] = held - units_covering(metal, owed, held, sell_bid_bonus);
            owed = 0;
        }
    }
    left
}

fn units_covering(metal: Metal, owed: i64, held: u32, sell_bid_bonus: f64) -> u32 {
    let (mut lo, mut hi) = (1u32, held);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if unit_value(metal, mid, sell_bid_bonus) >= owed {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

pub fn scrap_value(scrap: u32) -> i64 {
    floor_credits(Decimal::from(scrap) * SCRAP_PROXY_PRICE * SCRAP_VALUE_MULTIPLIER)
}

pub fn specimen_melt_value(specimen: &Specimen, sell_bid_bonus: f64) -> i64 {
    unit_value(specimen.metal, specimen.melt_units, sell_bid_bonus)
}

pub fn repair_cost(damage: u32) -> i64 {
    damage as i64 * REPAIR_COST_PER_HP
}

// ─── Settlement ──────────────────────────────────────────────────────────────

pub fn process_policy(input: &DayEndInput) -> EndOfDayResult {
    let policy = &input.policy;
    let bonus = input.rig.sell_bid_bonus;
    let upkeep = input.rig.daily_upkeep;
    let due = input.due;

    let raw_units_value = total_units_value(&input.units_produced, bonus);
    let scrap = scrap_value(input.scrap_produced);

    // Specimens
    let mut kept = Vec::new();
    let mut melted = Vec::new();
    let mut melt_credits = 0i64;
    for specimen in &input.specimens_found {
        let melt = match policy.keep_specimens {
            KeepSpecimensPolicy::KeepAll => false,
            KeepSpecimensPolicy::KeepNone => true,
            KeepSpecimensPolicy::HighPlus => !specimen.grade.is_high_plus() && policy.melt_low,
        };
        if melt {
            melt_credits += specimen_melt_value(specimen, bonus);
            melted.push(specimen.clone());
        } else {
            kept.push(specimen.clone());
        }
    }

    // Units
    let mut units_sold = match policy.sell_units {
        SellUnitsPolicy::Always => raw_units_value,
        SellUnitsPolicy::Never => 0,
        SellUnitsPolicy::OnlyIfNeeded => {
            let needed = due + upkeep - input.current_credits;
            raw_units_value.min(needed.max(0))
        }
    };

    let mut projected = input.current_credits + melt_credits + units_sold + scrap;

    // Emergency liquidation
    let mut emergency_triggered = false;
    if policy.emergency_mode && projected - upkeep < due {
        emergency_triggered = true;
        let shortfall = due + upkeep - projected;

        let extra = (raw_units_value - units_sold).min(shortfall).max(0);
        units_sold += extra;
        projected += extra;

        if projected - upkeep < due {
            let still_short = due + upkeep - projected;
            let mut recovered = 0i64;
            let mut remaining = Vec::with_capacity(kept.len());
            for specimen in kept {
                if recovered < still_short && specimen.grade == Grade::Low {
                    let value = specimen_melt_value(&specimen, bonus);
                    recovered += value;
                    melt_credits += value;
                    melted.push(specimen);
                } else {
                    remaining.push(specimen);
                }
            }
            kept = remaining;
            projected += recovered;
        }
    }

    // Upkeep, then due
    let after_upkeep = projected - upkeep;
    let due_paid = after_upkeep >= due;
    let credits_after = if due_paid { after_upkeep - due } else { after_upkeep };

    let run_status = if !due_paid {
        RunStatus::Lost
    } else if input.day >= FINAL_DAY {
        RunStatus::Won
    } else {
        RunStatus::Active
    };

    info!(
        day = input.day,
        due,
        credits_before = input.current_credits,
        credits_after,
        units_sold,
        melted = melted.len(),
        emergency = emergency_triggered,
        status = ?run_status,
        "day settled"
    );

    EndOfDayResult {
        raw_credits: raw_units_value + scrap,
        raw_specimens: input.specimens_found.clone(),
        credits_sold: units_sold + scrap + melt_credits,
        units_sold_value: units_sold,
        unsold_units_value: raw_units_value - units_sold,
        specimens_kept: kept,
        specimens_melted: melted,
        emergency_triggered,
        upkeep_paid: upkeep,
        repair_cost: repair_cost(input.rig_damage),
        due,
        credits_before: input.current_credits,
        credits_after,
        due_paid,
        run_ended: run_status.is_terminal(),
        run_status,
    }
}

/// Whether credits plus everything sellable covers upkeep and the due.
pub fn can_cover_due(
    credits: i64,
    units_value: i64,
    specimens_value: i64,
    upkeep: i64,
    due: i64,
) -> DueCoverage {
    let total = credits + units_value + specimens_value - upkeep;
    let shortfall = (due - total).max(0);
    DueCoverage {
        can_cover: shortfall == 0,
        shortfall,
    }
}
