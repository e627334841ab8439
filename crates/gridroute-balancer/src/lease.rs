//! Tick-based lease expiry.
//!
//! The router never frees capacity on its own. A `LeaseBook` lets a
//! caller that models request duration as logical ticks remember what it
//! reserved and hand expired reservations back via [`Router::release`].
//!
//! A book is single-owner: each driver thread keeps its own.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::warn;

use gridroute_core::{AcceleratorId, Request};

use crate::router::Router;

/// A reservation held until `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lease {
    pub accelerator: AcceleratorId,
    pub request_id: u64,
    pub cost: u32,
    pub expires_at: u64,
}

/// Heap entry ordered by expiry, then insertion order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    expires_at: u64,
    seq: u64,
    accelerator: AcceleratorId,
    request_id: u64,
    cost: u32,
}

impl From<Entry> for Lease {
    fn from(e: Entry) -> Self {
        Lease {
            accelerator: e.accelerator,
            request_id: e.request_id,
            cost: e.cost,
            expires_at: e.expires_at,
        }
    }
}

#[derive(Debug, Default)]
pub struct LeaseBook {
    heap: BinaryHeap<Reverse<Entry>>,
    seq: u64,
    outstanding: u64,
}

impl LeaseBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `request` was placed on `accelerator` at tick `now`.
    pub fn hold(&mut self, now: u64, accelerator: AcceleratorId, request: &Request) -> Lease {
        let entry = Entry {
            expires_at: now.saturating_add(u64::from(request.duration())),
            seq: self.seq,
            accelerator,
            request_id: request.id(),
            cost: request.cost(),
        };
        self.seq += 1;
        self.outstanding += u64::from(entry.cost);

        let lease = Lease {
            accelerator,
            request_id: entry.request_id,
            cost: entry.cost,
            expires_at: entry.expires_at,
        };
        self.heap.push(Reverse(entry));
        lease
    }

    /// Remove and return every lease with `expires_at <= now`, earliest first.
    pub fn advance(&mut self, now: u64) -> Vec<Lease> {
        let mut expired = Vec::new();
        while self
            .heap
            .peek()
            .is_some_and(|Reverse(e)| e.expires_at <= now)
        {
            if let Some(Reverse(entry)) = self.heap.pop() {
                self.outstanding -= u64::from(entry.cost);
                expired.push(entry.into());
            }
        }
        expired
    }

    /// Expire leases due at `now` and release them on `router`.
    ///
    /// Returns the number of leases released.
    pub fn release_expired(&mut self, now: u64, router: &Router) -> usize {
        let expired = self.advance(now);
        release_all(router, &expired);
        expired.len()
    }

    /// Remove every lease regardless of expiry, earliest first.
    pub fn drain_all(&mut self) -> Vec<Lease> {
        self.advance(u64::MAX)
    }

    /// Total cost still held.
    pub fn outstanding(&self) -> u64 {
        self.outstanding
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

fn release_all(router: &Router, leases: &[Lease]) {
    for lease in leases {
        if let Err(e) = router.release(lease.accelerator, lease.cost) {
            warn!(
                request = lease.request_id,
                accelerator = %lease.accelerator,
                error = %e,
                "could not release lease"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridroute_core::Accelerator;

    fn req(id: u64, cost: u32, duration: u32) -> Request {
        Request::new(id, cost, duration).unwrap()
    }

    #[test]
    fn leases_expire_in_order() {
        let mut book = LeaseBook::new();
        book.hold(0, AcceleratorId(1), &req(1, 5, 10));
        book.hold(0, AcceleratorId(2), &req(2, 3, 2));
        book.hold(1, AcceleratorId(1), &req(3, 4, 1));
        assert_eq!(book.outstanding(), 12);

        assert!(book.advance(1).is_empty());

        let due: Vec<u64> = book.advance(2).iter().map(|l| l.request_id).collect();
        assert_eq!(due, vec![2, 3]);
        assert_eq!(book.outstanding(), 5);

        let rest = book.drain_all();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].expires_at, 10);
        assert!(book.is_empty());
        assert_eq!(book.outstanding(), 0);
    }

    #[test]
    fn equal_expiry_keeps_insertion_order() {
        let mut book = LeaseBook::new();
        for id in [5, 3, 9] {
            book.hold(0, AcceleratorId(id), &req(id, 1, 4));
        }
        let order: Vec<u64> = book.advance(4).iter().map(|l| l.request_id).collect();
        assert_eq!(order, vec![5, 3, 9]);
    }

    #[test]
    fn release_expired_frees_router_capacity() {
        let mut router = Router::new("round_robin").unwrap();
        router.add_accelerator(Accelerator::new(1, 10).unwrap()).unwrap();
        let mut book = LeaseBook::new();

        let request = req(1, 10, 3);
        let id = router.route_request(&request).unwrap();
        book.hold(0, id, &request);
        assert_eq!(router.route_request(&req(2, 1, 1)), None);

        assert_eq!(book.release_expired(2, &router), 0);
        assert_eq!(book.release_expired(3, &router), 1);
        assert_eq!(router.accelerator(id).unwrap().current_load(), 0);
        assert!(router.route_request(&req(3, 1, 1)).is_some());
    }

    #[test]
    fn unknown_accelerator_is_skipped() {
        let router = Router::new("p2c").unwrap();
        let mut book = LeaseBook::new();
        book.hold(0, AcceleratorId(42), &req(1, 1, 1));
        assert_eq!(book.release_expired(1, &router), 1);
        assert!(book.is_empty());
    }
}
