// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Rigshift Idle Mining Simulation

pub mod config;
pub mod conservation;
pub mod engine;
pub mod error;
pub mod modifiers;
pub mod modules;
pub mod policy;
pub mod rng;
pub mod run;
pub mod shift;
pub mod types;

pub use config::SimConfig;
pub use error::{Result, SimError};
pub use modifiers::{aggregate, RigModifiers};
pub use modules::{generate_draft, module_by_id, InstalledModule, ModuleDefinition, MODULE_POOL};
pub use policy::{can_cover_due, process_policy, AutomationPolicy, DayEndInput, EndOfDayResult};
pub use rng::{SeededRng, RNG_FORMAT_VERSION};
pub use run::Run;
pub use shift::{run_full_shift, LiveShift, ShiftCommand, ShiftRun};
pub use types::*;

use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize + ?Sized>(value: &T) -> std::result::Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

fn install_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// A live shift driven from JS one tick at a time.
#[wasm_bindgen]
pub struct WasmShift {
    live: LiveShift,
    rig: RigModifiers,
}

#[wasm_bindgen]
impl WasmShift {
    #[wasm_bindgen(constructor)]
    pub fn new(
        biome: &str,
        depth: u8,
        module_ids: Vec<String>,
        seed: f64,
        max_ticks: u32,
    ) -> std::result::Result<WasmShift, JsError> {
        install_panic_hook();

        let biome: Biome = biome.parse()?;
        let depth = Depth::try_from(depth)?;
        let seed = rng::seed_from_f64(seed)?;
        let ids: Vec<&str> = module_ids.iter().map(String::as_str).collect();
        let modules = modules::resolve_loadout(&ids, 1)?;
        let rig = aggregate(&modules);
        let live = LiveShift::new(biome, depth, &rig, seed, max_ticks)?;

        Ok(Self { live, rig })
    }

    /// Advance one tick. Returns the step report, or `null` once complete.
    pub fn tick(&mut self) -> JsValue {
        match self.live.step() {
            Some(report) => to_js(&report).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    /// Run ticks without returning results.
    pub fn run_batch(&mut self, ticks: u32) {
        for _ in 0..ticks {
            if self.live.step().is_none() {
                break;
            }
        }
    }

    pub fn toggle_overclock(&mut self, active: bool) {
        self.live.push(ShiftCommand::Overclock(active));
    }

    pub fn purge(&mut self) {
        self.live.push(ShiftCommand::Purge);
    }

    pub fn end_early(&mut self) {
        self.live.push(ShiftCommand::EndEarly);
    }

    pub fn hud(&self) -> JsValue {
        to_js(&self.live.hud()).unwrap_or(JsValue::NULL)
    }

    pub fn summary(&self, day: u32) -> JsValue {
        to_js(&self.live.summary(day)).unwrap_or(JsValue::NULL)
    }

    pub fn rig(&self) -> JsValue {
        to_js(&self.rig).unwrap_or(JsValue::NULL)
    }

    pub fn is_complete(&self) -> bool {
        self.live.is_complete()
    }
}

/// Settle a day from a JS `DayEndInput` object.
#[wasm_bindgen]
pub fn settle_day(input: JsValue) -> std::result::Result<JsValue, JsError> {
    let input: DayEndInput = serde_wasm_bindgen::from_value(input)?;
    input.validate()?;
    to_js(&process_policy(&input))
}

#[wasm_bindgen]
pub fn rng_format_version() -> u32 {
    RNG_FORMAT_VERSION
}
