//! Plan and per-round summary types.

use serde::{Deserialize, Serialize};

use super::Trip;

/// What one scheduling round achieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Round number, starting at 1.
    pub round: usize,
    /// Trips dispatched in this round.
    pub trips: usize,
    /// Points served in this round.
    pub points_served: usize,
    /// Distance driven in this round, in metres.
    pub distance: f64,
}

/// All trips produced by a planning run.
///
/// Every registered point appears in exactly one trip, except points listed
/// in [`Plan::skipped`] when the run was configured to skip unservable
/// demand.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Plan, Trip};
///
/// let mut plan = Plan::new();
/// plan.add_trip(Trip::new(0, 1));
/// assert_eq!(plan.num_trips(), 1);
/// assert!(plan.skipped().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Plan {
    trips: Vec<Trip>,
    rounds: Vec<RoundSummary>,
    skipped: Vec<usize>,
}

impl Plan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a trip.
    pub fn add_trip(&mut self, trip: Trip) {
        self.trips.push(trip);
    }

    /// Records a finished round.
    pub fn add_round(&mut self, summary: RoundSummary) {
        self.rounds.push(summary);
    }

    /// Records a point excluded as unservable.
    pub fn add_skipped(&mut self, point_id: usize) {
        self.skipped.push(point_id);
    }

    /// Trips in dispatch order.
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Round summaries in order.
    pub fn rounds(&self) -> &[RoundSummary] {
        &self.rounds
    }

    /// Number of rounds needed to serve everything.
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Points excluded as unservable.
    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }

    /// Number of trips.
    pub fn num_trips(&self) -> usize {
        self.trips.len()
    }

    /// Total number of points served.
    pub fn num_served(&self) -> usize {
        self.trips.iter().map(Trip::len).sum()
    }

    /// Ids of every served point, in trip order.
    pub fn served_point_ids(&self) -> Vec<usize> {
        self.trips.iter().flat_map(Trip::point_ids).collect()
    }

    /// Total distance over all trips, in metres.
    pub fn total_distance(&self) -> f64 {
        self.trips.iter().map(Trip::distance).sum()
    }

    /// Total travel time over all trips, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.trips.iter().map(Trip::duration).sum()
    }

    /// Total load delivered.
    pub fn total_load(&self) -> i64 {
        self.trips.iter().map(Trip::load).sum()
    }
}
