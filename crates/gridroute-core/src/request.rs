//! Workload request record.

use serde::Serialize;

use crate::error::{RoutingError, RoutingResult};

/// A unit of work to place on an accelerator.
///
/// `duration` is carried through untouched; whoever releases the
/// reservation decides what unit it is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Request {
    id: u64,
    cost: u32,
    duration: u32,
}

impl Request {
    /// Build a request. Cost and duration must both be positive.
    pub fn new(id: u64, cost: u32, duration: u32) -> RoutingResult<Self> {
        if cost == 0 || duration == 0 {
            return Err(RoutingError::InvalidRequest { cost, duration });
        }
        Ok(Self { id, cost, duration })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_request_exposes_fields() {
        let req = Request::new(1, 10, 1).unwrap();
        assert_eq!(req.id(), 1);
        assert_eq!(req.cost(), 10);
        assert_eq!(req.duration(), 1);
    }

    #[test]
    fn zero_cost_or_duration_is_rejected() {
        assert_eq!(
            Request::new(1, 0, 5),
            Err(RoutingError::InvalidRequest { cost: 0, duration: 5 })
        );
        assert_eq!(
            Request::new(1, 5, 0),
            Err(RoutingError::InvalidRequest { cost: 5, duration: 0 })
        );
    }
}
