//! Constructive heuristics for building single trips.
//!
//! - [`nearest_feasible_insertion`] — Capacity-bounded cheapest insertion, O(n²k)

mod insertion;

pub use insertion::nearest_feasible_insertion;
