//! Local search operators for improving constructed trips.
//!
//! - [`two_opt_improve`] — Intra-trip 2-opt edge reversal, best improvement per pass

mod two_opt;

pub use two_opt::{route_distance, two_opt_improve};
