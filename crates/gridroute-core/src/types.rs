//! Shared types used across gridroute crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

/// Stable identity of an accelerator within a router pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcceleratorId(pub u64);

impl AcceleratorId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AcceleratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acc-{}", self.0)
    }
}

impl From<u64> for AcceleratorId {
    fn from(id: u64) -> Self {
        AcceleratorId(id)
    }
}

/// The load-balancing strategies a router can be built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    #[serde(rename = "round_robin")]
    RoundRobin,
    #[serde(rename = "p2c")]
    PowerOfTwoChoices,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::RoundRobin, StrategyKind::PowerOfTwoChoices];

    /// Name accepted by `FromStr` and used in config files.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::RoundRobin => "round_robin",
            StrategyKind::PowerOfTwoChoices => "p2c",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round_robin" => Ok(StrategyKind::RoundRobin),
            "p2c" => Ok(StrategyKind::PowerOfTwoChoices),
            other => Err(RoutingError::InvalidStrategy(other.to_string())),
        }
    }
}

/// Point-in-time view of an accelerator's occupancy.
///
/// Loads are read without synchronization against in-flight
/// reservations, so a snapshot of a busy pool is approximate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceleratorSnapshot {
    pub id: AcceleratorId,
    pub capacity: u32,
    pub current_load: u32,
    pub load_ratio: f64,
}

impl AcceleratorSnapshot {
    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.current_load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_and_serde_are_transparent() {
        let id = AcceleratorId(7);
        assert_eq!(id.to_string(), "acc-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: AcceleratorId = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn strategy_names_parse_exactly() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
        }
        assert_eq!(
            "RoundRobin".parse::<StrategyKind>(),
            Err(RoutingError::InvalidStrategy("RoundRobin".to_string()))
        );
        assert!("least_connections".parse::<StrategyKind>().is_err());
        assert!("".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn snapshot_available_saturates() {
        let snap = AcceleratorSnapshot {
            id: AcceleratorId(1),
            capacity: 10,
            current_load: 4,
            load_ratio: 0.4,
        };
        assert_eq!(snap.available(), 6);
    }
}
