//! Travel-cost oracle.
//!
//! [`TravelCostProvider`] is the boundary to whatever computes real travel
//! costs. [`DistanceOracle`] sits in front of it and memoises every answer
//! for the lifetime of a planning run.

mod cache;
mod provider;

pub use cache::{CacheStats, CostSymmetry, DistanceOracle};
pub use provider::{
    EuclideanProvider, HaversineProvider, TravelCost, TravelCostProvider, TravelCostTable,
};
