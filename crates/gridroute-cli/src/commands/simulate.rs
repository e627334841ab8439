//! `gridroute simulate` — synthetic load driver.
//!
//! Builds a router, then lets several worker threads route randomly sized
//! requests through it at once. Each worker keeps its own tick clock and
//! lease book: a request placed at tick `t` with duration `d` is released
//! at tick `t + d`.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use gridroute_balancer::{LeaseBook, Router, StatsSnapshot};
use gridroute_core::{
    AcceleratorSnapshot, PoolConfig, Request, RouterConfig, SimulationConfig, StrategyKind,
};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub strategy: Option<String>,
    pub accelerators: Option<u32>,
    pub capacity: u32,
    pub requests: Option<u64>,
    pub workers: Option<u32>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub strategy: StrategyKind,
    pub accelerators: usize,
    pub workers: u32,
    pub requests: u64,
    pub elapsed_ms: f64,
    pub throughput_rps: f64,
    pub stats: StatsSnapshot,
    pub held_leases: usize,
    pub load: LoadDistribution,
}

/// Spread of reserved load across the pool at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadDistribution {
    pub mean: f64,
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
    pub max_ratio: f64,
}

pub fn simulate(config_path: Option<&Path>, overrides: Overrides, format: &str) -> anyhow::Result<()> {
    let config = resolve_config(config_path, overrides)?;
    config.validate()?;

    let router = Router::from_config(&config)?;
    let report = run(&router, &config.simulation())?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("{}", format_report(&report));
        }
    }

    Ok(())
}

/// Merge the optional config file with command-line overrides.
pub fn resolve_config(config_path: Option<&Path>, overrides: Overrides) -> anyhow::Result<RouterConfig> {
    let mut config = match config_path {
        Some(path) => RouterConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => RouterConfig::scaffold(StrategyKind::PowerOfTwoChoices),
    };

    if let Some(strategy) = overrides.strategy {
        config.strategy = strategy;
    }
    if let Some(count) = overrides.accelerators {
        config.accelerators.clear();
        config.pool = Some(PoolConfig {
            count,
            capacity: overrides.capacity,
        });
    }

    let mut sim = config.simulation();
    if let Some(requests) = overrides.requests {
        sim.requests = requests;
    }
    if let Some(workers) = overrides.workers {
        sim.workers = workers;
    }
    if overrides.seed.is_some() {
        sim.seed = overrides.seed;
    }
    config.simulation = Some(sim);

    Ok(config)
}

/// Route `sim.requests` requests through `router` from `sim.workers` threads.
pub fn run(router: &Router, sim: &SimulationConfig) -> anyhow::Result<SimulationReport> {
    info!(
        strategy = %router.strategy_kind(),
        accelerators = router.len(),
        requests = sim.requests,
        workers = sim.workers,
        "simulation starting"
    );

    let start = Instant::now();
    let held_leases = thread::scope(|s| -> anyhow::Result<usize> {
        let handles: Vec<_> = (0..sim.workers)
            .map(|worker| s.spawn(move || drive(router, sim, worker)))
            .collect();

        let mut held = 0;
        for handle in handles {
            held += handle
                .join()
                .map_err(|_| anyhow!("simulation worker panicked"))??;
        }
        Ok(held)
    })?;
    let elapsed = start.elapsed();

    let stats = router.stats();
    let report = SimulationReport {
        strategy: router.strategy_kind(),
        accelerators: router.len(),
        workers: sim.workers,
        requests: stats.total(),
        elapsed_ms: elapsed.as_secs_f64() * 1_000.0,
        throughput_rps: throughput(stats.total(), elapsed),
        stats,
        held_leases,
        load: load_distribution(&router.snapshot()),
    };

    if stats.rejected > 0 {
        warn!(
            rejected = stats.rejected,
            success_rate = stats.success_rate(),
            "some requests found no accelerator with room"
        );
    }
    info!(elapsed_ms = report.elapsed_ms, "simulation complete");
    Ok(report)
}

/// One worker's share of the run. Returns the leases still held at the end.
fn drive(router: &Router, sim: &SimulationConfig, worker: u32) -> anyhow::Result<usize> {
    let mut rng = match sim.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(worker))),
        None => StdRng::from_entropy(),
    };
    let share = worker_share(sim.requests, sim.workers, worker);
    let id_base = u64::from(worker) << 40;
    let mut book = LeaseBook::new();

    for tick in 0..share {
        let cost = rng.gen_range(sim.min_cost..=sim.max_cost);
        let duration = rng.gen_range(sim.min_duration..=sim.max_duration);
        let request = Request::new(id_base + tick, cost, duration)?;

        if let Some(accelerator) = router.route_request(&request) {
            book.hold(tick, accelerator, &request);
        }
        book.release_expired(tick, router);
    }

    debug!(
        worker,
        requests = share,
        outstanding = book.outstanding(),
        "worker finished"
    );
    Ok(book.len())
}

/// Requests assigned to `worker`; the remainder goes to the lowest workers.
fn worker_share(total: u64, workers: u32, worker: u32) -> u64 {
    let workers = u64::from(workers);
    let base = total / workers;
    let extra = u64::from(u64::from(worker) < total % workers);
    base + extra
}

fn throughput(requests: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { requests as f64 / secs } else { 0.0 }
}

pub fn load_distribution(pool: &[AcceleratorSnapshot]) -> LoadDistribution {
    if pool.is_empty() {
        return LoadDistribution {
            mean: 0.0,
            std_dev: 0.0,
            min: 0,
            max: 0,
            max_ratio: 0.0,
        };
    }

    let n = pool.len() as f64;
    let mean = pool.iter().map(|a| f64::from(a.current_load)).sum::<f64>() / n;
    let variance = pool
        .iter()
        .map(|a| {
            let diff = f64::from(a.current_load) - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    LoadDistribution {
        mean,
        std_dev: variance.sqrt(),
        min: pool.iter().map(|a| a.current_load).min().unwrap_or(0),
        max: pool.iter().map(|a| a.current_load).max().unwrap_or(0),
        max_ratio: pool.iter().map(|a| a.load_ratio).fold(0.0, f64::max),
    }
}

pub fn format_report(report: &SimulationReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();
    out.push_str(&format!(
        "Simulation: {} over {} accelerators, {} workers\n",
        report.strategy, report.accelerators, report.workers
    ));
    out.push_str(&format!(
        "  Elapsed:     {:.2} ms ({:.0} req/s)\n",
        report.elapsed_ms, report.throughput_rps
    ));
    out.push_str(&format!("  Requests:    {}\n", report.requests));
    out.push_str(&format!(
        "  Routed:      {} ({:.1}%)\n",
        stats.routed,
        stats.success_rate() * 100.0
    ));
    out.push_str(&format!("  Rejected:    {}\n", stats.rejected));
    out.push_str(&format!(
        "  Attempts:    {:.2} per request\n",
        stats.attempts_per_request()
    ));
    out.push_str(&format!("  Held leases: {}\n", report.held_leases));
    out.push_str(&format!(
        "  Load:        mean {:.2}, std dev {:.2}, min {}, max {} (peak {:.0}%)",
        report.load.mean,
        report.load.std_dev,
        report.load.min,
        report.load.max,
        report.load.max_ratio * 100.0
    ));
    out
}
