//! Request routing — places requests on accelerators.
//!
//! The router owns the accelerator pool and one strategy. For every
//! request it walks the strategy's candidates and reserves capacity on
//! the first accelerator that accepts. Each reservation is a CAS on that
//! accelerator's own counter; there is no pool-wide lock on the hot path.

use std::collections::HashMap;

use tracing::{debug, info, trace};

use gridroute_core::{
    Accelerator, AcceleratorId, AcceleratorSnapshot, Request, RouterConfig, RoutingError,
    RoutingResult, StrategyKind,
};

use crate::stats::{RouterStats, StatsSnapshot};
use crate::strategy::Strategy;

/// Lifecycle of a router. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// No accelerators registered; every request is rejected.
    Unconfigured,
    /// At least one accelerator registered.
    Ready,
}

/// Routes requests to accelerators with spare capacity.
///
/// Build it with `&mut` access, then share it (`&Router` or
/// `Arc<Router>`) between any number of routing threads.
#[derive(Debug)]
pub struct Router {
    /// Insertion-ordered pool; this is the round-robin rotation order.
    pool: Vec<Accelerator>,
    /// Accelerator id → position in `pool`.
    index: HashMap<AcceleratorId, usize>,
    strategy: Strategy,
    stats: RouterStats,
}

impl Router {
    /// Create an empty router using the named strategy.
    ///
    /// Accepts exactly `"round_robin"` and `"p2c"`.
    pub fn new(strategy_name: &str) -> RoutingResult<Self> {
        let kind: StrategyKind = strategy_name.parse()?;
        Ok(Self::with_strategy(Strategy::from_kind(kind)))
    }

    pub fn with_strategy(strategy: impl Into<Strategy>) -> Self {
        Self {
            pool: Vec::new(),
            index: HashMap::new(),
            strategy: strategy.into(),
            stats: RouterStats::new(),
        }
    }

    /// Build a router and its pool from a parsed config file.
    pub fn from_config(config: &RouterConfig) -> RoutingResult<Self> {
        let mut router = Self::new(&config.strategy)?;
        for acc in config.build_accelerators()? {
            router.add_accelerator(acc)?;
        }
        info!(
            strategy = %router.strategy_kind(),
            accelerators = router.len(),
            "router built from config"
        );
        Ok(router)
    }

    /// Append an accelerator to the pool.
    ///
    /// Fails with `DuplicateId` if the id is already registered; the pool
    /// is left unchanged.
    pub fn add_accelerator(&mut self, accelerator: Accelerator) -> RoutingResult<()> {
        let id = accelerator.id();
        if self.index.contains_key(&id) {
            return Err(RoutingError::DuplicateId(id));
        }
        self.index.insert(id, self.pool.len());
        debug!(
            accelerator = %id,
            capacity = accelerator.capacity(),
            pool_size = self.pool.len() + 1,
            "accelerator added"
        );
        self.pool.push(accelerator);
        Ok(())
    }

    /// Reserve `request.cost()` on one accelerator and return its id.
    ///
    /// Returns `None` when no candidate offered by the strategy has room.
    /// Either exactly one accelerator's load grows by the cost, or none does.
    pub fn route_request(&self, request: &Request) -> Option<AcceleratorId> {
        let cost = request.cost();
        for idx in self.strategy.candidates(&self.pool, request) {
            let accelerator = &self.pool[idx];
            self.stats.record_attempt();
            if accelerator.try_reserve(cost) {
                self.stats.record_routed(cost);
                trace!(
                    request = request.id(),
                    accelerator = %accelerator.id(),
                    cost,
                    "request routed"
                );
                return Some(accelerator.id());
            }
        }

        self.stats.record_rejected();
        trace!(request = request.id(), cost, "no accelerator available");
        None
    }

    /// Give `cost` back to an accelerator, flooring its load at zero.
    ///
    /// Returns the amount actually released.
    pub fn release(&self, id: AcceleratorId, cost: u32) -> RoutingResult<u32> {
        let accelerator = self
            .accelerator(id)
            .ok_or(RoutingError::UnknownAccelerator(id))?;
        let released = accelerator.release(cost);
        self.stats.record_released(released);
        trace!(accelerator = %id, cost, released, "capacity released");
        Ok(released)
    }

    pub fn accelerator(&self, id: AcceleratorId) -> Option<&Accelerator> {
        self.index.get(&id).map(|&idx| &self.pool[idx])
    }

    /// The pool in insertion order.
    pub fn accelerators(&self) -> &[Accelerator] {
        &self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn state(&self) -> RouterState {
        if self.pool.is_empty() {
            RouterState::Unconfigured
        } else {
            RouterState::Ready
        }
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Per-accelerator occupancy in pool order.
    pub fn snapshot(&self) -> Vec<AcceleratorSnapshot> {
        self.pool.iter().map(Accelerator::snapshot).collect()
    }
}
