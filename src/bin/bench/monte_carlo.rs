// Monte Carlo Infrastructure: N full runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N, computing mean ± 95% CI

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rigshift_engine::{Run, RunStatus, SimConfig};
use tracing::debug;

use crate::report::*;
use crate::scenarios::{DraftStrategy, Scenario};
use crate::time_series::TimeSeriesRecorder;

use std::time::Instant;

/// Play one full run of a scenario with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    config: &SimConfig,
    seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> rigshift_engine::Result<BenchResult> {
    let start = Instant::now();
    let mut run = Run::start(config.clone(), seed)?;
    run.set_policy(scenario.policy)?;

    // Draft picks get their own stream so they never disturb engine draws
    let mut picker = ChaCha8Rng::seed_from_u64(seed);
    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());

    loop {
        if let Some(threshold) = scenario.repair_below {
            repair_if_needed(&mut run, threshold);
        }

        let (biome, depth) = (scenario.plan)(run.day());
        run.execute_day(biome, depth)?;

        if run.status() == RunStatus::Active {
            pick_draft(&mut run, scenario.draft, &mut picker);
        }

        if let (Some(ts), Some(record)) = (time_series.as_mut(), run.history().last()) {
            ts.record(record, run.modules().len());
        }

        if run.status() != RunStatus::Active {
            break;
        }
        run.advance_day()?;
    }

    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("seed-{}.jsonl", seed));
        if let Err(e) = ts.write_jsonl(&path) {
            eprintln!("  Warning: failed to write time series: {}", e);
        }
    }

    let history = run.history();
    let units_produced: u64 = history
        .iter()
        .map(|r| r.summary.total_units_produced.total() as u64)
        .sum();
    let specimens_found: usize = history.iter().map(|r| r.summary.total_specimens_found.len()).sum();
    let heat_damage: u32 = history.iter().map(|r| r.summary.damage_from_heat).sum();
    let throttled_days = history.iter().filter(|r| r.summary.heat_throttled).count() as u32;
    let emergency_days = history.iter().filter(|r| r.settlement.emergency_triggered).count() as u32;
    let upkeep_paid: i64 = history.iter().map(|r| r.settlement.upkeep_paid).sum();
    let unsold_units_value: i64 = history.iter().map(|r| r.settlement.unsold_units_value).sum();
    let conservation_holds = history.iter().all(|r| r.ledger_balanced);

    let won = run.status() == RunStatus::Won;
    let final_day = run.day();

    // Evaluate pass/fail
    let criteria = &scenario.criteria;
    let mut pass = true;
    if criteria.require_conservation && !conservation_holds {
        pass = false;
    }
    if criteria.require_win && !won {
        pass = false;
    }
    if let Some(min_day) = criteria.min_final_day {
        if final_day < min_day {
            pass = false;
        }
    }
    if let Some(max_damage) = criteria.max_heat_damage {
        if heat_damage > max_damage {
            pass = false;
        }
    }

    Ok(BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass,
        won,
        final_day,
        final_credits: run.credits(),
        units_produced,
        unsold_units_value,
        specimens_found,
        vault_size: run.vault().len(),
        heat_damage,
        throttled_days,
        emergency_days,
        upkeep_paid,
        modules_installed: run.modules().len(),
        conservation_holds,
        elapsed_ms: start.elapsed().as_millis(),
    })
}

/// Buy back as much HP as credits allow once the rig drops below the threshold.
fn repair_if_needed(run: &mut Run, threshold: u32) {
    if run.rig_hp() >= threshold {
        return;
    }
    let missing = run.config().max_rig_hp.saturating_sub(run.rig_hp());
    let affordable = (run.credits().max(0) / rigshift_engine::policy::REPAIR_COST_PER_HP) as u32;
    let hp = missing.min(affordable);
    if hp == 0 {
        return;
    }
    if let Err(e) = run.repair(hp) {
        debug!(day = run.day(), error = %e, "repair skipped");
    }
}

fn pick_draft(run: &mut Run, strategy: DraftStrategy, picker: &mut ChaCha8Rng) {
    let offer = run.draft_offer();
    if offer.is_empty() {
        return;
    }
    let pick = match strategy {
        DraftStrategy::Skip => None,
        DraftStrategy::FirstOffer => Some(offer[0].id),
        DraftStrategy::Prefer(category) => offer
            .iter()
            .find(|m| m.category == category)
            .or(offer.first())
            .map(|m| m.id),
        DraftStrategy::Random => Some(offer[picker.gen_range(0..offer.len())].id),
    };
    if let Some(id) = pick {
        if let Err(e) = run.choose_draft(id) {
            debug!(day = run.day(), module = id, error = %e, "draft pick rejected");
        }
    }
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(
    scenario: &Scenario,
    config: &SimConfig,
    n_runs: usize,
    base_seed: u64,
    time_series_base: Option<&std::path::Path>,
) -> rigshift_engine::Result<MonteCarloReport> {
    let ts_dir = time_series_base.map(|base| base.join(scenario.name.to_lowercase()));

    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed.wrapping_add(i as u64);
        results.push(run_single(scenario, config, seed, ts_dir.as_deref())?);
    }

    Ok(aggregate(scenario, results))
}

fn samples<F: Fn(&BenchResult) -> f64>(results: &[BenchResult], f: F) -> Stats {
    Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let won = results.iter().filter(|r| r.won).count();
    let rate = |count: usize| if n == 0 { 0.0 } else { count as f64 / n as f64 };

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate: rate(passed),
        win_rate: rate(won),
        final_day: samples(&results, |r| r.final_day as f64),
        final_credits: samples(&results, |r| r.final_credits as f64),
        units_produced: samples(&results, |r| r.units_produced as f64),
        specimens_found: samples(&results, |r| r.specimens_found as f64),
        heat_damage: samples(&results, |r| r.heat_damage as f64),
        upkeep_paid: samples(&results, |r| r.upkeep_paid as f64),
        elapsed_ms: samples(&results, |r| r.elapsed_ms as f64),
        individual_runs: results,
    }
}
