//! Domain model types for multi-trip delivery planning.
//!
//! Provides the core abstractions: geo-located demand points and the depot,
//! vehicles and the fleet, trips as ordered sequences of stops, and the plan
//! collecting every trip of a run.

mod plan;
mod point;
mod trip;
mod vehicle;

pub use plan::{Plan, RoundSummary};
pub use point::{DemandPoint, Depot, Location, SiteId, Waypoint};
pub use trip::{Stop, Trip};
pub use vehicle::{Fleet, Vehicle};
