// Rigshift Benchmark Runner v0.1.0: strategy balance sweeps over full 12-day runs
// Monte Carlo (N=30), seedable ChaCha8 runs, per-day audit trail
//
// Usage:
//   cargo run --release --bin bench                     # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5         # Quick mode (5 runs each)
//   cargo run --release --bin bench -- GREEDY_DEEP      # Filter by name, label or category
//   cargo run --release --bin bench -- --time-series    # Enable per-day JSONL output
//   cargo run --release --bin bench -- --seed 42        # Custom base seed
//   cargo run --release --bin bench -- --config rs.json # Override the run config
//
// Log verbosity follows RUST_LOG (default: warn).

mod report;
mod scenarios;
mod monte_carlo;
mod time_series;

use report::*;
use rigshift_engine::{SimConfig, RNG_FORMAT_VERSION};
use scenarios::*;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    time_series: bool,
    config: Option<String>,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        time_series: false,
        config: None,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    cli.config = Some(args[i].clone());
                }
            }
            "--time-series" => {
                cli.time_series = true;
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    init_tracing();
    let cli = parse_args();

    let config = match &cli.config {
        Some(path) => match SimConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => SimConfig::default(),
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {}", e);
        std::process::exit(2);
    }

    let all_scenarios = scenarios();
    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    let ts_dir = if cli.time_series {
        Some(std::path::Path::new("benchmark-results/time-series").to_path_buf())
    } else {
        None
    };

    println!("\n  Rigshift Benchmark Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng (format v{}) | Runs/scenario: {} | Base seed: {}",
        RNG_FORMAT_VERSION, cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<20} {:>5} {:>5} {:>6} {:>14} {:>8} {:>6} {:>7}",
        "Scenario", "Pass%", "Win%", "Day", "Credits", "Units", "Heat", "Time");
    println!("  {}", "-".repeat(86));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = match monte_carlo::run_monte_carlo(
            scenario,
            &config,
            cli.runs,
            cli.seed,
            ts_dir.as_deref(),
        ) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("  {} aborted: {}", scenario.label, e);
                std::process::exit(1);
            }
        };

        let pass_pct = report.pass_rate * 100.0;
        let status = if report.pass_rate >= 0.933 { "PASS" } else { "FAIL" };

        println!("  {:<20} {:>4}% {:>4}% {:>6.1} {:>7.0}±{:<6.0} {:>8.0} {:>6.2} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            (report.win_rate * 100.0) as u32,
            report.final_day.mean,
            report.final_credits.mean, report.final_credits.half_width(),
            report.units_produced.mean,
            report.heat_damage.mean,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= 0.933).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(86));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        rng_format_version: RNG_FORMAT_VERSION,
        n_runs_per_scenario: cli.runs,
        config,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        scenarios: mc_reports,
    };

    let dir = std::path::Path::new("benchmark-results");
    let path = dir.join(format!("bench-{}.json", timestamp));
    let written = std::fs::create_dir_all(dir)
        .and_then(|_| {
            serde_json::to_string_pretty(&report)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
        })
        .and_then(|json| std::fs::write(&path, json));
    match written {
        Ok(()) => println!("  Results saved to: {}\n", path.display()),
        Err(e) => eprintln!("  Failed to write {}: {}", path.display(), e),
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
