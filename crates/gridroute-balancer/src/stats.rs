//! Routing counters.
//!
//! Plain relaxed atomics: counters are independent of each other and only
//! read for reporting.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct RouterStats {
    /// Requests that landed on an accelerator.
    routed: AtomicU64,
    /// Requests that found no accelerator with room.
    rejected: AtomicU64,
    /// Individual `try_reserve` calls, successful or not.
    attempts: AtomicU64,
    reserved_cost: AtomicU64,
    released_cost: AtomicU64,
}

impl RouterStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_routed(&self, cost: u32) {
        self.routed.fetch_add(1, Ordering::Relaxed);
        self.reserved_cost.fetch_add(u64::from(cost), Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_released(&self, cost: u32) {
        self.released_cost.fetch_add(u64::from(cost), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            routed: self.routed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            reserved_cost: self.reserved_cost.load(Ordering::Relaxed),
            released_cost: self.released_cost.load(Ordering::Relaxed),
        }
    }
}

/// Copy of the counters at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub routed: u64,
    pub rejected: u64,
    pub attempts: u64,
    pub reserved_cost: u64,
    pub released_cost: u64,
}

impl StatsSnapshot {
    pub fn total(&self) -> u64 {
        self.routed + self.rejected
    }

    /// Fraction of requests that were placed; 0.0 before any request.
    pub fn success_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.routed as f64 / total as f64,
        }
    }

    /// Mean `try_reserve` calls per request.
    pub fn attempts_per_request(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.attempts as f64 / total as f64,
        }
    }
}
