//! Accelerator resource record.
//!
//! An accelerator has a fixed capacity and a reserved-load counter. The
//! counter is only ever changed through compare-and-swap loops, so
//! concurrent reservations never lose updates and never push the load
//! past capacity.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{RoutingError, RoutingResult};
use crate::types::{AcceleratorId, AcceleratorSnapshot};

/// A compute resource that accepts reservations up to its capacity.
pub struct Accelerator {
    id: AcceleratorId,
    capacity: u32,
    current_load: AtomicU32,
}

impl Accelerator {
    /// Create an idle accelerator. Capacity must be positive.
    pub fn new(id: u64, capacity: u32) -> RoutingResult<Self> {
        let id = AcceleratorId(id);
        if capacity == 0 {
            return Err(RoutingError::InvalidCapacity(id));
        }
        Ok(Self {
            id,
            capacity,
            current_load: AtomicU32::new(0),
        })
    }

    pub fn id(&self) -> AcceleratorId {
        self.id
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn current_load(&self) -> u32 {
        self.current_load.load(Ordering::Acquire)
    }

    /// Remaining capacity at the time of the read.
    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.current_load())
    }

    /// Fraction of capacity currently reserved, in `0.0..=1.0`.
    ///
    /// Uses a relaxed read: the value only steers placement heuristics.
    pub fn load_ratio(&self) -> f64 {
        f64::from(self.current_load.load(Ordering::Relaxed)) / f64::from(self.capacity)
    }

    /// Atomically reserve `cost` units if they fit.
    ///
    /// Returns `false` and leaves the load untouched when
    /// `current_load + cost` would exceed capacity.
    pub fn try_reserve(&self, cost: u32) -> bool {
        let mut current = self.current_load.load(Ordering::Acquire);
        loop {
            let next = match current.checked_add(cost) {
                Some(next) if next <= self.capacity => next,
                _ => return false,
            };
            match self.current_load.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Give back `cost` units, flooring the load at zero.
    ///
    /// Returns the amount actually released.
    pub fn release(&self, cost: u32) -> u32 {
        let mut current = self.current_load.load(Ordering::Acquire);
        loop {
            let next = current.saturating_sub(cost);
            match self.current_load.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return current - next,
                Err(observed) => current = observed,
            }
        }
    }

    pub fn snapshot(&self) -> AcceleratorSnapshot {
        let current_load = self.current_load();
        AcceleratorSnapshot {
            id: self.id,
            capacity: self.capacity,
            current_load,
            load_ratio: f64::from(current_load) / f64::from(self.capacity),
        }
    }
}

impl fmt::Debug for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accelerator")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("current_load", &self.current_load())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        let err = Accelerator::new(3, 0).unwrap_err();
        assert_eq!(err, RoutingError::InvalidCapacity(AcceleratorId(3)));
    }

    #[test]
    fn reserve_until_full() {
        let acc = Accelerator::new(1, 5).unwrap();

        assert!(acc.try_reserve(3));
        assert_eq!(acc.current_load(), 3);
        assert!(!acc.try_reserve(3));
        assert_eq!(acc.current_load(), 3);
        assert!(acc.try_reserve(2));
        assert_eq!(acc.current_load(), 5);
        assert_eq!(acc.available(), 0);
        assert!(!acc.try_reserve(1));
    }

    #[test]
    fn reserve_rejects_overflowing_cost() {
        let acc = Accelerator::new(1, u32::MAX).unwrap();
        assert!(acc.try_reserve(10));
        assert!(!acc.try_reserve(u32::MAX));
        assert_eq!(acc.current_load(), 10);
    }

    #[test]
    fn release_floors_at_zero() {
        let acc = Accelerator::new(1, 10).unwrap();
        assert!(acc.try_reserve(4));

        assert_eq!(acc.release(3), 3);
        assert_eq!(acc.current_load(), 1);
        assert_eq!(acc.release(5), 1);
        assert_eq!(acc.current_load(), 0);
        assert_eq!(acc.release(1), 0);
    }

    #[test]
    fn load_ratio_tracks_reservations() {
        let acc = Accelerator::new(1, 200).unwrap();
        assert_eq!(acc.load_ratio(), 0.0);
        assert!(acc.try_reserve(50));
        assert!((acc.load_ratio() - 0.25).abs() < f64::EPSILON);

        let snap = acc.snapshot();
        assert_eq!(snap.current_load, 50);
        assert_eq!(snap.available(), 150);
    }

    #[test]
    fn concurrent_reservations_never_overshoot() {
        use std::sync::Arc;
        use std::thread;

        let acc = Arc::new(Accelerator::new(1, 1_000).unwrap());
        let mut handles = vec![];

        for _ in 0..8 {
            let acc = acc.clone();
            handles.push(thread::spawn(move || {
                let mut granted = 0u32;
                for _ in 0..500 {
                    if acc.try_reserve(3) {
                        granted += 3;
                    }
                    assert!(acc.current_load() <= acc.capacity());
                }
                granted
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        // 1000 / 3 = 333 reservations fit, nothing more.
        assert_eq!(total, 999);
        assert_eq!(acc.current_load(), 999);
    }
}
