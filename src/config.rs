//! Planner configuration.

use serde::{Deserialize, Serialize};

use crate::oracle::CostSymmetry;

/// What to do with a point no vehicle can carry in one trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnservablePolicy {
    /// Fail the run with
    /// [`PlanError::UnservableDemand`](crate::error::PlanError::UnservableDemand).
    #[default]
    Abort,
    /// Leave the point out, list it in
    /// [`Plan::skipped`](crate::models::Plan::skipped) and plan the rest.
    SkipAndReport,
}

/// Knobs for a planning run.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::{PlannerConfig, UnservablePolicy};
///
/// let config = PlannerConfig::default()
///     .with_max_two_opt_passes(50)
///     .with_unservable_policy(UnservablePolicy::SkipAndReport);
/// assert_eq!(config.max_two_opt_passes, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Upper bound on improving 2-opt passes per trip.
    pub max_two_opt_passes: usize,
    /// Handling of points heavier than any vehicle.
    pub unservable_policy: UnservablePolicy,
    /// Whether travel costs are cached per unordered or ordered pair.
    pub cost_symmetry: CostSymmetry,
    /// Fetch the full cost table in one provider call before round 1.
    pub prefetch_costs: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_two_opt_passes: 1000,
            unservable_policy: UnservablePolicy::Abort,
            cost_symmetry: CostSymmetry::Symmetric,
            prefetch_costs: false,
        }
    }
}

impl PlannerConfig {
    /// Sets the 2-opt pass budget.
    pub fn with_max_two_opt_passes(mut self, passes: usize) -> Self {
        self.max_two_opt_passes = passes;
        self
    }

    /// Sets the unservable-demand policy.
    pub fn with_unservable_policy(mut self, policy: UnservablePolicy) -> Self {
        self.unservable_policy = policy;
        self
    }

    /// Enables or disables the up-front cost table fetch.
    pub fn with_prefetch_costs(mut self, prefetch: bool) -> Self {
        self.prefetch_costs = prefetch;
        self
    }

    /// Sets the cost symmetry assumption.
    pub fn with_cost_symmetry(mut self, symmetry: CostSymmetry) -> Self {
        self.cost_symmetry = symmetry;
        self
    }
}
