//! Multi-trip scheduling over a fleet.
//!
//! - [`MultiTripScheduler`] — Round-based driver reusing vehicles until all demand is served
//! - [`plan_deliveries`] — One-call pipeline from raw demand points to a plan

mod multi_trip;
mod pipeline;

pub use multi_trip::MultiTripScheduler;
pub use pipeline::{plan_deliveries, PlanOutcome};
