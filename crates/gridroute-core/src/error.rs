//! Routing error types.

use thiserror::Error;

use crate::types::AcceleratorId;

/// Errors raised while building or mutating a routing pool.
///
/// Capacity exhaustion is not an error: `route_request` reports it as
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("unknown strategy: {0:?} (expected \"round_robin\" or \"p2c\")")]
    InvalidStrategy(String),

    #[error("accelerator already registered: {0}")]
    DuplicateId(AcceleratorId),

    #[error("invalid request: cost={cost}, duration={duration} (both must be positive)")]
    InvalidRequest { cost: u32, duration: u32 },

    #[error("accelerator {0} must have a positive capacity")]
    InvalidCapacity(AcceleratorId),

    #[error("accelerator not found: {0}")]
    UnknownAccelerator(AcceleratorId),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
