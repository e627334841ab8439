//! gridroute.toml configuration parser.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::accelerator::Accelerator;
use crate::error::{RoutingError, RoutingResult};
use crate::types::StrategyKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    pub strategy: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accelerators: Vec<AcceleratorConfig>,
    pub pool: Option<PoolConfig>,
    pub simulation: Option<SimulationConfig>,
}

/// An explicitly numbered accelerator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceleratorConfig {
    pub id: u64,
    pub capacity: u32,
}

/// A block of identical accelerators. Ids continue after the highest
/// explicit id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub count: u32,
    pub capacity: u32,
}

/// Parameters for the synthetic load driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub requests: u64,
    pub workers: u32,
    pub min_cost: u32,
    pub max_cost: u32,
    pub min_duration: u32,
    pub max_duration: u32,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            requests: 100_000,
            workers: 4,
            min_cost: 1,
            max_cost: 10,
            min_duration: 1,
            max_duration: 50,
            seed: None,
        }
    }
}

/// Problems found by [`RouterConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("config defines no accelerators")]
    EmptyPool,

    #[error("invalid {field} range: {min}..={max}")]
    InvalidRange {
        field: &'static str,
        min: u32,
        max: u32,
    },

    #[error("simulation needs at least one worker")]
    NoWorkers,
}

impl RouterConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), strategy = %config.strategy, "loaded router config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a small config for the given strategy.
    pub fn scaffold(strategy: StrategyKind) -> Self {
        RouterConfig {
            strategy: strategy.name().to_string(),
            accelerators: Vec::new(),
            pool: Some(PoolConfig {
                count: 8,
                capacity: 100,
            }),
            simulation: Some(SimulationConfig {
                seed: Some(42),
                ..SimulationConfig::default()
            }),
        }
    }

    pub fn strategy_kind(&self) -> RoutingResult<StrategyKind> {
        self.strategy.parse()
    }

    /// Simulation settings, falling back to defaults when the section is absent.
    pub fn simulation(&self) -> SimulationConfig {
        self.simulation.clone().unwrap_or_default()
    }

    /// Check everything that would otherwise fail later at router setup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy_kind()?;

        let accelerators = self.build_accelerators()?;
        if accelerators.is_empty() {
            return Err(ConfigError::EmptyPool);
        }

        let mut seen = HashSet::new();
        for acc in &accelerators {
            if !seen.insert(acc.id()) {
                return Err(RoutingError::DuplicateId(acc.id()).into());
            }
        }

        if let Some(sim) = &self.simulation {
            check_range("cost", sim.min_cost, sim.max_cost)?;
            check_range("duration", sim.min_duration, sim.max_duration)?;
            if sim.workers == 0 {
                return Err(ConfigError::NoWorkers);
            }
        }

        Ok(())
    }

    /// Materialize the configured pool: explicit accelerators first, in
    /// file order, then the generated block.
    pub fn build_accelerators(&self) -> RoutingResult<Vec<Accelerator>> {
        let mut out = Vec::with_capacity(self.accelerator_count());

        for acc in &self.accelerators {
            out.push(Accelerator::new(acc.id, acc.capacity)?);
        }

        if let Some(pool) = &self.pool {
            let first = self
                .accelerators
                .iter()
                .map(|a| a.id + 1)
                .max()
                .unwrap_or(0);
            for offset in 0..u64::from(pool.count) {
                out.push(Accelerator::new(first + offset, pool.capacity)?);
            }
        }

        Ok(out)
    }

    pub fn accelerator_count(&self) -> usize {
        self.accelerators.len() + self.pool.as_ref().map_or(0, |p| p.count as usize)
    }
}

fn check_range(field: &'static str, min: u32, max: u32) -> Result<(), ConfigError> {
    if min == 0 || min > max {
        return Err(ConfigError::InvalidRange { field, min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AcceleratorId;

    #[test]
    fn test_scaffold() {
        let config = RouterConfig::scaffold(StrategyKind::PowerOfTwoChoices);
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("p2c"));
        assert!(toml_str.contains("[pool]"));
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal() {
        let toml_str = r#"
strategy = "round_robin"

[[accelerators]]
id = 1
capacity = 100
"#;
        let config = RouterConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.strategy_kind().unwrap(), StrategyKind::RoundRobin);
        assert_eq!(config.accelerators.len(), 1);
        assert_eq!(config.simulation(), SimulationConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_pool_ids_follow_explicit_ids() {
        let toml_str = r#"
strategy = "p2c"

[[accelerators]]
id = 10
capacity = 50

[[accelerators]]
id = 3
capacity = 50

[pool]
count = 2
capacity = 80
"#;
        let config = RouterConfig::from_toml_str(toml_str).unwrap();
        let ids: Vec<u64> = config
            .build_accelerators()
            .unwrap()
            .iter()
            .map(|a| a.id().get())
            .collect();
        assert_eq!(ids, vec![10, 3, 11, 12]);
    }

    #[test]
    fn test_partial_simulation_section_uses_defaults() {
        let toml_str = r#"
strategy = "p2c"

[pool]
count = 1
capacity = 10

[simulation]
requests = 5
"#;
        let config = RouterConfig::from_toml_str(toml_str).unwrap();
        let sim = config.simulation();
        assert_eq!(sim.requests, 5);
        assert_eq!(sim.workers, 4);
        assert_eq!(sim.max_cost, 10);
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        let bogus = RouterConfig {
            strategy: "bogus".to_string(),
            ..RouterConfig::scaffold(StrategyKind::RoundRobin)
        };
        assert!(matches!(
            bogus.validate(),
            Err(ConfigError::Routing(RoutingError::InvalidStrategy(_)))
        ));

        let empty = RouterConfig {
            pool: None,
            ..RouterConfig::scaffold(StrategyKind::RoundRobin)
        };
        assert!(matches!(empty.validate(), Err(ConfigError::EmptyPool)));

        let dup = RouterConfig {
            accelerators: vec![
                AcceleratorConfig { id: 1, capacity: 10 },
                AcceleratorConfig { id: 1, capacity: 20 },
            ],
            pool: None,
            ..RouterConfig::scaffold(StrategyKind::RoundRobin)
        };
        assert!(matches!(
            dup.validate(),
            Err(ConfigError::Routing(RoutingError::DuplicateId(AcceleratorId(1))))
        ));

        let zero_cap = RouterConfig {
            pool: Some(PoolConfig { count: 2, capacity: 0 }),
            ..RouterConfig::scaffold(StrategyKind::RoundRobin)
        };
        assert!(matches!(
            zero_cap.validate(),
            Err(ConfigError::Routing(RoutingError::InvalidCapacity(_)))
        ));

        let mut bad_range = RouterConfig::scaffold(StrategyKind::RoundRobin);
        if let Some(sim) = bad_range.simulation.as_mut() {
            sim.min_cost = 8;
            sim.max_cost = 2;
        }
        assert!(matches!(
            bad_range.validate(),
            Err(ConfigError::InvalidRange { field: "cost", .. })
        ));
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gridroute.toml");
        let config = RouterConfig::scaffold(StrategyKind::RoundRobin);
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = RouterConfig::from_file(&path).unwrap();
        assert_eq!(loaded.strategy, "round_robin");
        assert_eq!(loaded.accelerator_count(), 8);
        assert_eq!(loaded.simulation().seed, Some(42));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RouterConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
