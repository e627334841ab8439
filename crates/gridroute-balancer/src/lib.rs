//! gridroute-balancer — request routing across an accelerator pool.
//!
//! The router owns the pool and one strategy selected by name:
//!
//! - `round_robin` — rotates the scan start, tries every accelerator
//! - `p2c` — samples two accelerators, tries the less loaded first
//!
//! Reservations are per-accelerator CAS operations, so any number of
//! threads can route through a shared `Router`.
//!
//! # Architecture
//!
//! ```text
//! Router
//!   ├── pool: Vec<Accelerator>   (atomic load counters)
//!   ├── Strategy                  (orders candidate indices)
//!   │     ├── RoundRobin          (atomic cursor → full rotation)
//!   │     └── PowerOfTwoChoices   (IndexSource → two samples)
//!   └── RouterStats               (relaxed counters)
//!
//! LeaseBook (caller-owned) ── release_expired() ──▶ Router::release
//! ```

pub mod lease;
pub mod p2c;
pub mod round_robin;
pub mod router;
pub mod stats;
pub mod strategy;

pub use gridroute_core::{RoutingError, RoutingResult};
pub use lease::{Lease, LeaseBook};
pub use p2c::{IndexSource, PowerOfTwoChoices, ThreadRngSource};
pub use round_robin::RoundRobin;
pub use router::{Router, RouterState};
pub use stats::{RouterStats, StatsSnapshot};
pub use strategy::{Candidates, Strategy};
