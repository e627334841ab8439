//! Power-of-two-choices candidate selection.
//!
//! Samples two distinct accelerators uniformly at random and offers the
//! less loaded one first. Work per call is constant regardless of pool
//! size: the search never widens past the two samples.

use std::fmt;

use gridroute_core::Accelerator;
use rand::Rng;

/// Source of uniform random indices.
///
/// Called twice per routing decision, so implementations must be cheap
/// and must not block.
pub trait IndexSource: Send + Sync {
    /// A uniformly distributed index in `0..bound`. `bound` is never zero.
    fn index(&self, bound: usize) -> usize;
}

/// Thread-local RNG. Fast, lock-free, not cryptographically strong.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl IndexSource for ThreadRngSource {
    fn index(&self, bound: usize) -> usize {
        rand::thread_rng().gen_range(0..bound)
    }
}

pub struct PowerOfTwoChoices {
    source: Box<dyn IndexSource>,
}

impl PowerOfTwoChoices {
    pub fn new() -> Self {
        Self::with_source(ThreadRngSource)
    }

    pub fn with_source(source: impl IndexSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Draw two distinct indices in `0..len`.
    ///
    /// A pool of one yields a single candidate; an empty pool yields none.
    pub fn sample(&self, len: usize) -> Pair {
        match len {
            0 => Pair::empty(),
            1 => Pair::one(0),
            _ => {
                let first = self.source.index(len);
                // Draw from the remaining len - 1 slots and skip past `first`.
                let mut second = self.source.index(len - 1);
                if second >= first {
                    second += 1;
                }
                Pair::two(first, second)
            }
        }
    }

    /// The sampled pair, less loaded accelerator first.
    pub fn candidates(&self, pool: &[Accelerator]) -> Pair {
        let mut pair = self.sample(pool.len());
        if let &[a, b] = pair.slots() {
            if pool[b].load_ratio() < pool[a].load_ratio() {
                pair.swap();
            }
        }
        pair
    }
}

impl Default for PowerOfTwoChoices {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PowerOfTwoChoices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PowerOfTwoChoices").finish_non_exhaustive()
    }
}

/// Up to two candidate indices, yielded in attempt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    slots: [usize; 2],
    len: usize,
    pos: usize,
}

impl Pair {
    fn empty() -> Self {
        Self {
            slots: [0, 0],
            len: 0,
            pos: 0,
        }
    }

    fn one(idx: usize) -> Self {
        Self {
            slots: [idx, idx],
            len: 1,
            pos: 0,
        }
    }

    fn two(first: usize, second: usize) -> Self {
        Self {
            slots: [first, second],
            len: 2,
            pos: 0,
        }
    }

    /// The sampled indices, in current attempt order.
    pub fn slots(&self) -> &[usize] {
        &self.slots[..self.len]
    }

    fn swap(&mut self) {
        self.slots.swap(0, 1);
    }
}

impl Iterator for Pair {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.pos >= self.len {
            return None;
        }
        let idx = self.slots[self.pos];
        self.pos += 1;
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.len - self.pos;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Pair {}
