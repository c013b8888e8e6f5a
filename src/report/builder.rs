//! Plan → report transformation with invariant checks.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{InvalidDemandError, ReportError};
use crate::models::{Fleet, Plan, RoundSummary, Trip};
use crate::registry::DemandRegistry;

/// One delivery in a trip summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopSummary {
    /// Position in the trip, starting at 1.
    pub sequence: usize,
    /// Customer id.
    pub point_id: usize,
    /// Customer name.
    pub name: String,
    /// Customer city.
    pub city: String,
    /// Quantity delivered here.
    pub demand: i32,
    /// Order value.
    pub order_value: f64,
    /// Cumulative load once this stop is done.
    pub load_after: i64,
    /// Distance driven since leaving the depot, in metres.
    pub distance_m: f64,
}

/// One depot-to-depot trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    /// Position in the plan, starting at 1.
    pub trip_index: usize,
    /// Vehicle driving the trip.
    pub vehicle_id: usize,
    /// Scheduling round, starting at 1.
    pub round: usize,
    /// Deliveries in visiting order.
    pub stops: Vec<StopSummary>,
    /// Number of deliveries.
    pub stop_count: usize,
    /// Sum of delivered demand.
    pub load: i64,
    /// Capacity of the vehicle.
    pub capacity: i32,
    /// Round-trip distance in metres.
    pub distance_m: f64,
    /// Round-trip distance in kilometres.
    pub distance_km: f64,
    /// Round-trip travel time in seconds.
    pub duration_s: f64,
    /// Sum of order values on the trip.
    pub order_value: f64,
}

/// A record dropped at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedPoint {
    /// Id of the rejected record.
    pub point_id: usize,
    /// Why it was rejected.
    pub reason: String,
}

/// The full report of a planning run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    /// Trips in plan order.
    pub trips: Vec<TripSummary>,
    /// Per-round summaries.
    pub rounds: Vec<RoundSummary>,
    /// Rounds needed to serve everything.
    pub round_count: usize,
    /// Points delivered.
    pub points_served: usize,
    /// Total distance in metres.
    pub total_distance_m: f64,
    /// Total distance in kilometres.
    pub total_distance_km: f64,
    /// Total travel time in seconds.
    pub total_duration_s: f64,
    /// Total delivered demand.
    pub total_load: i64,
    /// Total value of delivered orders.
    pub total_order_value: f64,
    /// Points left out because no vehicle could carry them.
    pub skipped: Vec<usize>,
    /// Records rejected at registration.
    pub rejects: Vec<RejectedPoint>,
}

/// Builds the report for `plan`, checking it against the registry and fleet
/// first.
///
/// # Errors
///
/// [`ReportError::MalformedPlan`] if a trip names an unknown vehicle or
/// point, a point is served twice or both served and skipped, a trip's load
/// does not match its stops or exceeds capacity, or a registered point is
/// neither served nor skipped.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::PlannerConfig;
/// use u_dispatch::models::{DemandPoint, Depot, Fleet, Location};
/// use u_dispatch::oracle::EuclideanProvider;
/// use u_dispatch::report::build_report;
/// use u_dispatch::scheduler::plan_deliveries;
///
/// let depot = Depot::new(Location::new(0.0, 0.0));
/// let points = vec![
///     DemandPoint::new(1, Location::new(0.0, 300.0), 2).with_name("North"),
///     DemandPoint::new(2, Location::new(400.0, 0.0), 3).with_name("East"),
/// ];
/// let fleet = Fleet::uniform(1, 10);
/// let config = PlannerConfig::default();
/// let outcome = plan_deliveries(depot, points, &fleet, EuclideanProvider, &config)?;
///
/// let report = build_report(&outcome.plan, &outcome.registry, &fleet, &outcome.rejects)?;
/// assert_eq!(report.trips.len(), 1);
/// assert_eq!(report.trips[0].stop_count, 2);
/// assert!((report.total_distance_km - 1.2).abs() < 1e-9);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn build_report(
    plan: &Plan,
    registry: &DemandRegistry,
    fleet: &Fleet,
    rejects: &[InvalidDemandError],
) -> Result<RouteReport, ReportError> {
    let mut served = BTreeSet::new();
    let mut trips = Vec::with_capacity(plan.num_trips());

    for (idx, trip) in plan.trips().iter().enumerate() {
        let summary = summarize_trip(idx + 1, trip, registry, fleet)?;
        for stop in &summary.stops {
            if !served.insert(stop.point_id) {
                return Err(malformed(format!("point {} is served twice", stop.point_id)));
            }
        }
        trips.push(summary);
    }

    let skipped: BTreeSet<usize> = plan.skipped().iter().copied().collect();
    if let Some(id) = skipped.intersection(&served).next() {
        return Err(malformed(format!("point {id} is both served and skipped")));
    }
    if let Some(p) = registry
        .points()
        .find(|p| !served.contains(&p.id()) && !skipped.contains(&p.id()))
    {
        return Err(malformed(format!("point {} is never served", p.id())));
    }

    let total_distance_m: f64 = trips.iter().map(|t| t.distance_m).sum();
    Ok(RouteReport {
        round_count: plan.round_count(),
        rounds: plan.rounds().to_vec(),
        points_served: served.len(),
        total_distance_m,
        total_distance_km: total_distance_m / 1000.0,
        total_duration_s: trips.iter().map(|t| t.duration_s).sum(),
        total_load: trips.iter().map(|t| t.load).sum(),
        total_order_value: trips.iter().map(|t| t.order_value).sum(),
        trips,
        skipped: plan.skipped().to_vec(),
        rejects: rejects
            .iter()
            .map(|e| RejectedPoint {
                point_id: e.point_id(),
                reason: e.to_string(),
            })
            .collect(),
    })
}

fn summarize_trip(
    trip_index: usize,
    trip: &Trip,
    registry: &DemandRegistry,
    fleet: &Fleet,
) -> Result<TripSummary, ReportError> {
    let vehicle = fleet.vehicle(trip.vehicle_id()).ok_or_else(|| {
        malformed(format!(
            "trip {trip_index} uses unknown vehicle {}",
            trip.vehicle_id()
        ))
    })?;

    let mut stops = Vec::with_capacity(trip.len());
    let mut load: i64 = 0;
    for (pos, stop) in trip.stops().iter().enumerate() {
        let point = registry.point(stop.point_id).ok_or_else(|| {
            malformed(format!(
                "trip {trip_index} visits unknown point {}",
                stop.point_id
            ))
        })?;
        load += i64::from(point.demand());
        stops.push(StopSummary {
            sequence: pos + 1,
            point_id: point.id(),
            name: point.name().to_string(),
            city: point.city().to_string(),
            demand: point.demand(),
            order_value: point.order_value(),
            load_after: stop.load_after,
            distance_m: stop.distance_to_here,
        });
    }

    if load != trip.load() {
        return Err(malformed(format!(
            "trip {trip_index} records load {} but its stops sum to {load}",
            trip.load()
        )));
    }
    if load > i64::from(vehicle.capacity()) {
        return Err(malformed(format!(
            "trip {trip_index} carries {load}, over capacity {} of vehicle {}",
            vehicle.capacity(),
            vehicle.id()
        )));
    }

    Ok(TripSummary {
        trip_index,
        vehicle_id: vehicle.id(),
        round: trip.round(),
        stop_count: stops.len(),
        order_value: stops.iter().map(|s| s.order_value).sum(),
        stops,
        load,
        capacity: vehicle.capacity(),
        distance_m: trip.distance(),
        distance_km: trip.distance() / 1000.0,
        duration_s: trip.duration(),
    })
}

fn malformed(reason: String) -> ReportError {
    ReportError::MalformedPlan { reason }
}
