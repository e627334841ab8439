use std::path::Path;

use anyhow::Context;
use gridroute_core::RouterConfig;

pub fn check(path: &Path) -> anyhow::Result<()> {
    let config = RouterConfig::from_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    if let Err(e) = config.validate() {
        eprintln!("✗ {}: {e}", path.display());
        return Err(e.into());
    }

    println!("{}", summarize(&config)?);
    Ok(())
}

fn summarize(config: &RouterConfig) -> anyhow::Result<String> {
    let accelerators = config.build_accelerators()?;
    let total_capacity: u64 = accelerators.iter().map(|a| u64::from(a.capacity())).sum();
    let sim = config.simulation();

    Ok(format!(
        "✓ strategy {}, {} accelerators, total capacity {}\n  simulation: {} requests, {} workers, cost {}..={}, duration {}..={}",
        config.strategy_kind()?,
        accelerators.len(),
        total_capacity,
        sim.requests,
        sim.workers,
        sim.min_cost,
        sim.max_cost,
        sim.min_duration,
        sim.max_duration,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridroute_core::StrategyKind;

    #[test]
    fn summary_counts_capacity() {
        let config = RouterConfig::scaffold(StrategyKind::RoundRobin);
        let summary = summarize(&config).unwrap();
        assert!(summary.contains("strategy round_robin"));
        assert!(summary.contains("8 accelerators, total capacity 800"));
    }

    #[test]
    fn check_rejects_unknown_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gridroute.toml");
        std::fs::write(
            &path,
            "strategy = \"least_connections\"\n\n[pool]\ncount = 2\ncapacity = 10\n",
        )
        .unwrap();

        let err = check(&path).unwrap_err();
        assert!(err.to_string().contains("least_connections"));
    }
}
