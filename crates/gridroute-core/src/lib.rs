//! gridroute-core — the resource and request model shared by every
//! gridroute crate.
//!
//! - **`accelerator`** — capacity plus a lock-free reserved-load counter
//! - **`request`** — validated workload records
//! - **`config`** — `gridroute.toml` parsing and validation

pub mod accelerator;
pub mod config;
pub mod error;
pub mod request;
pub mod types;

pub use accelerator::Accelerator;
pub use config::{AcceleratorConfig, ConfigError, PoolConfig, RouterConfig, SimulationConfig};
pub use error::{RoutingError, RoutingResult};
pub use request::Request;
pub use types::*;
