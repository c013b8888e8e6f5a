//! Structured per-trip report of a finished plan.
//!
//! Rendering (tables, CSV, text) is left to the caller; everything here is
//! `Serialize`.

mod builder;

pub use builder::{build_report, RejectedPoint, RouteReport, StopSummary, TripSummary};
