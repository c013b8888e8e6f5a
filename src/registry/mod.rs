//! Demand point registry.
//!
//! Validates incoming demand points once and tracks which of them are still
//! waiting for a trip.

mod demand_registry;

pub use demand_registry::{DemandRegistry, Registration};
