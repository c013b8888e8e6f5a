//! Registration, oracle setup and scheduling in one call.

use crate::config::PlannerConfig;
use crate::error::{InvalidDemandError, PlanError};
use crate::models::{DemandPoint, Depot, Fleet, Plan};
use crate::oracle::{CacheStats, DistanceOracle, TravelCostProvider};
use crate::registry::DemandRegistry;

use super::MultiTripScheduler;

/// Everything a planning run produced.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// The trips.
    pub plan: Plan,
    /// Registry after planning; every non-skipped point is served.
    pub registry: DemandRegistry,
    /// Records rejected at registration.
    pub rejects: Vec<InvalidDemandError>,
    /// Cost cache counters at the end of the run.
    pub cache: CacheStats,
}

/// Registers `points`, wraps `provider` in a cache, and schedules the fleet.
///
/// Invalid points are dropped and returned in [`PlanOutcome::rejects`]; they
/// never fail the run.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::PlannerConfig;
/// use u_dispatch::models::{DemandPoint, Depot, Fleet, Location};
/// use u_dispatch::oracle::HaversineProvider;
/// use u_dispatch::scheduler::plan_deliveries;
///
/// let depot = Depot::new(Location::new(12.9716, 77.5946));
/// let points = vec![
///     DemandPoint::new(1, Location::new(12.9352, 77.6245), 4),
///     DemandPoint::new(2, Location::new(12.9784, 77.6408), 5),
///     DemandPoint::new(3, Location::new(13.0358, 77.5970), 0),
/// ];
/// let outcome = plan_deliveries(
///     depot,
///     points,
///     &Fleet::uniform(1, 10),
///     HaversineProvider::default(),
///     &PlannerConfig::default(),
/// )?;
/// assert_eq!(outcome.plan.num_trips(), 1);
/// assert_eq!(outcome.rejects.len(), 1);
/// # Ok::<(), u_dispatch::error::PlanError>(())
/// ```
pub fn plan_deliveries<P, I>(
    depot: Depot,
    points: I,
    fleet: &Fleet,
    provider: P,
    config: &PlannerConfig,
) -> Result<PlanOutcome, PlanError>
where
    P: TravelCostProvider,
    I: IntoIterator<Item = DemandPoint>,
{
    let registration = DemandRegistry::register(depot, points);
    let mut registry = registration.registry;
    let oracle = DistanceOracle::new(provider, config.cost_symmetry);

    let plan = MultiTripScheduler::new(&oracle, config).run(&mut registry, fleet)?;

    Ok(PlanOutcome {
        plan,
        registry,
        rejects: registration.rejects,
        cache: oracle.stats(),
    })
}
