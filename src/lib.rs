//! # u-dispatch
//!
//! Multi-trip delivery planning for a single depot: capacitated trips are
//! built by nearest-feasible insertion, tightened with 2-opt, and dispatched
//! round after round with vehicles reused until every order is delivered.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (DemandPoint, Depot, Vehicle, Fleet, Trip, Plan)
//! - [`registry`] — Validated demand points and unserved-set tracking
//! - [`oracle`] — Travel-cost providers behind a memoising cache
//! - [`evaluation`] — Trip metrics and capacity checking
//! - [`constructive`] — Nearest-feasible-insertion trip construction
//! - [`local_search`] — 2-opt trip improvement
//! - [`scheduler`] — Round-based multi-trip scheduling
//! - [`report`] — Structured per-trip report of a plan
//! - [`config`] — Planner configuration
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use u_dispatch::config::PlannerConfig;
//! use u_dispatch::models::{DemandPoint, Depot, Fleet, Location};
//! use u_dispatch::oracle::HaversineProvider;
//! use u_dispatch::report::build_report;
//! use u_dispatch::scheduler::plan_deliveries;
//!
//! let depot = Depot::new(Location::new(12.9716, 77.5946));
//! let points = vec![
//!     DemandPoint::new(1, Location::new(12.9352, 77.6245), 8).with_name("Koramangala"),
//!     DemandPoint::new(2, Location::new(12.9784, 77.6408), 6).with_name("Indiranagar"),
//!     DemandPoint::new(3, Location::new(13.0358, 77.5970), 3).with_name("Hebbal"),
//! ];
//! let fleet = Fleet::uniform(1, 10);
//!
//! let provider = HaversineProvider::default();
//! let outcome = plan_deliveries(depot, points, &fleet, provider, &PlannerConfig::default())?;
//! let report = build_report(&outcome.plan, &outcome.registry, &fleet, &outcome.rejects)?;
//! assert_eq!(report.points_served, 3);
//! assert!(report.trips.iter().all(|t| t.load <= 10));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod constructive;
pub mod error;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod oracle;
pub mod registry;
pub mod report;
pub mod scheduler;
