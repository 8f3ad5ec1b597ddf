// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Rigshift Idle Mining Simulation - Conservation Logic

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{ShiftState, TickResult};

// ---------------------------------------------------------------------------
// Conservation result
// ---------------------------------------------------------------------------

/// Outcome of a single conservation check.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConservationResult {
    pub balanced: bool,
    /// Whole units that went missing (or appeared) in this check.
    pub error: u32,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Running unit ledger for one shift.
///
/// Per tick: `units_stored + scrap_generated == routed_units`.
/// Per shift: everything routed is either in storage, in scrap, or was lost to
/// purges.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConservationLedger {
    pub ticks_checked: u32,
    pub total_routed: u64,
    pub total_stored: u64,
    pub total_scrap: u64,
    pub violations: u32,
    pub cumulative_error: u64,
}

impl ConservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verify_tick(&mut self, result: &TickResult) -> ConservationResult {
        let accounted = result.units_stored as u64 + result.scrap_generated as u64;
        let error = accounted.abs_diff(result.routed_units as u64) as u32;

        self.ticks_checked += 1;
        self.total_routed += result.routed_units as u64;
        self.total_stored += result.units_stored as u64;
        self.total_scrap += result.scrap_generated as u64;

        let balanced = error == 0;
        if !balanced {
            self.violations += 1;
            self.cumulative_error += error as u64;
            warn!(
                tick = result.tick,
                routed = result.routed_units,
                stored = result.units_stored,
                scrap = result.scrap_generated,
                "unit conservation violated"
            );
        }

        ConservationResult { balanced, error }
    }

    /// Reconcile the ledger against the final shift state.
    pub fn verify_shift(&mut self, state: &ShiftState) -> ConservationResult {
        let held = state.units_produced.total() as u64;
        let expected_held = self.total_stored.saturating_sub(state.purge_loss as u64);
        let error = held.abs_diff(expected_held)
            + (state.storage_used as u64).abs_diff(held)
            + (state.scrap_produced as u64).abs_diff(self.total_scrap);

        let balanced = error == 0;
        if !balanced {
            self.violations += 1;
            self.cumulative_error += error;
            warn!(
                held,
                storage_used = state.storage_used,
                purge_loss = state.purge_loss,
                "shift ledger does not reconcile"
            );
        }

        ConservationResult {
            balanced,
            error: error.min(u32::MAX as u64) as u32,
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.violations == 0
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metal;

    fn tick(routed: u32, stored: u32, scrap: u32) -> TickResult {
        TickResult {
            tick: 0,
            metal: Metal::Sol,
            raw_units: routed as f64,
            wasted_units: 0.0,
            routed_units: routed,
            units_stored: stored,
            scrap_recovered: 0,
            scrap_generated: scrap,
            overflow: scrap > 0,
            throttled: false,
            specimen: None,
            heat_delta: 1.0,
            heat_after: 1.0,
            storage_after: stored,
        }
    }

    #[test]
    fn balanced_tick_passes() {
        let mut ledger = ConservationLedger::new();
        let r = ledger.verify_tick(&tick(3, 2, 1));
        assert!(r.balanced);
        assert_eq!(r.error, 0);
        assert!(ledger.is_balanced());
        assert_eq!(ledger.total_routed, 3);
    }

    #[test]
    fn leaked_units_are_flagged() {
        let mut ledger = ConservationLedger::new();
        let r = ledger.verify_tick(&tick(4, 1, 1));
        assert!(!r.balanced);
        assert_eq!(r.error, 2);
        assert_eq!(ledger.violations, 1);
        assert_eq!(ledger.cumulative_error, 2);

        ledger.verify_tick(&tick(2, 2, 0));
        assert_eq!(ledger.violations, 1);
        assert!(!ledger.is_balanced());
    }
}
