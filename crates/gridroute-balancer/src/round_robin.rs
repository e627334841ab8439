//! Round-robin candidate ordering.
//!
//! Each call takes one ticket from an atomic counter and turns it into a
//! full rotation over the pool starting at `ticket % len`. Lock-free and
//! safe for concurrent access.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Rotates the starting point of a pool scan across successive calls.
///
/// Uses `AtomicUsize` for lock-free concurrent selection. The counter
/// wraps around when it exceeds the pool size.
#[derive(Debug)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    /// Create a new round-robin cursor at index 0.
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
        }
    }

    /// Take the next starting index, wrapping around `count`.
    ///
    /// Returns `None` (without advancing) if count is zero.
    pub fn next(&self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let idx = self.counter.fetch_add(1, Ordering::Relaxed);
        Some(idx % count)
    }

    /// Every index of a pool of `count`, starting at the next cursor position.
    pub fn rotation(&self, count: usize) -> Rotation {
        match self.next(count) {
            Some(start) => Rotation::new(start, count),
            None => Rotation::empty(),
        }
    }

    /// Current counter value (for diagnostics).
    pub fn current(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

/// Cyclic walk over `0..len` that visits every index exactly once.
#[derive(Debug, Clone)]
pub struct Rotation {
    start: usize,
    len: usize,
    step: usize,
}

impl Rotation {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len, step: 0 }
    }

    pub fn empty() -> Self {
        Self::new(0, 0)
    }
}

impl Iterator for Rotation {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.step >= self.len {
            return None;
        }
        let idx = (self.start + self.step) % self.len;
        self.step += 1;
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.len - self.step;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Rotation {}
