//! Trip metric computation and feasibility checking.

mod evaluator;

pub use evaluator::{TripEvaluator, Violation};
