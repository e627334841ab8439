//! Strategy dispatch.
//!
//! The set of strategies is closed: a router picks one at construction
//! and keeps it for its lifetime. Strategies only order candidates; the
//! router owns every reservation attempt.

use gridroute_core::{Accelerator, Request, StrategyKind};

use crate::p2c::{Pair, PowerOfTwoChoices};
use crate::round_robin::{RoundRobin, Rotation};

#[derive(Debug)]
pub enum Strategy {
    RoundRobin(RoundRobin),
    PowerOfTwoChoices(PowerOfTwoChoices),
}

impl Strategy {
    pub fn from_kind(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::RoundRobin => Strategy::RoundRobin(RoundRobin::new()),
            StrategyKind::PowerOfTwoChoices => Strategy::PowerOfTwoChoices(PowerOfTwoChoices::new()),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::RoundRobin(_) => StrategyKind::RoundRobin,
            Strategy::PowerOfTwoChoices(_) => StrategyKind::PowerOfTwoChoices,
        }
    }

    /// Indices into `pool` in the order reservations should be attempted.
    ///
    /// Round-robin yields a full rotation; P2C yields at most two.
    pub fn candidates(&self, pool: &[Accelerator], _request: &Request) -> Candidates {
        match self {
            Strategy::RoundRobin(rr) => Candidates::Rotation(rr.rotation(pool.len())),
            Strategy::PowerOfTwoChoices(p2c) => Candidates::Pair(p2c.candidates(pool)),
        }
    }
}

impl From<RoundRobin> for Strategy {
    fn from(rr: RoundRobin) -> Self {
        Strategy::RoundRobin(rr)
    }
}

impl From<PowerOfTwoChoices> for Strategy {
    fn from(p2c: PowerOfTwoChoices) -> Self {
        Strategy::PowerOfTwoChoices(p2c)
    }
}

/// Candidate indices produced by a [`Strategy`].
#[derive(Debug, Clone)]
pub enum Candidates {
    Rotation(Rotation),
    Pair(Pair),
}

impl Iterator for Candidates {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self {
            Candidates::Rotation(r) => r.next(),
            Candidates::Pair(p) => p.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Candidates::Rotation(r) => r.size_hint(),
            Candidates::Pair(p) => p.size_hint(),
        }
    }
}
