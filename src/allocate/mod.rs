//! Capacity-respecting assignment of orders to vehicles.
//!
//! First-fit-decreasing bin packing over clusters in priority order. Orders
//! that fit no vehicle are reported as [`FleetError::Capacity`](crate::error::FleetError)
//! and the run continues.
//!
//! Complexity: O(orders × vehicles).

mod config;
mod runner;

pub use config::{AllocationConfig, AllocationCriterion, MAX_TOLERANCE};
pub use runner::{Allocation, Assignment, LoadAllocator};
