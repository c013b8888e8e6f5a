//! Trip and stop types.

use serde::{Deserialize, Serialize};

/// A single delivery within a trip.
///
/// Tracks the point served along with cumulative load and travel state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Demand point being served.
    pub point_id: usize,
    /// Cumulative load delivered once this stop is done.
    pub load_after: i64,
    /// Distance driven from the depot up to this stop, in metres.
    pub distance_to_here: f64,
    /// Travel time from the depot up to this stop, in seconds.
    pub arrival_seconds: f64,
}

/// One depot-to-depot run of a vehicle.
///
/// The depot is implicit at both ends and not stored in `stops`.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Stop, Trip};
///
/// let mut trip = Trip::new(0, 1);
/// trip.push_stop(Stop {
///     point_id: 4,
///     load_after: 3,
///     distance_to_here: 1200.0,
///     arrival_seconds: 180.0,
/// });
/// assert_eq!(trip.len(), 1);
/// assert_eq!(trip.load(), 3);
/// assert_eq!(trip.round(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    vehicle_id: usize,
    round: usize,
    stops: Vec<Stop>,
    distance: f64,
    duration: f64,
    load: i64,
}

impl Trip {
    /// Creates an empty trip for a vehicle in the given round (1-based).
    pub fn new(vehicle_id: usize, round: usize) -> Self {
        Self {
            vehicle_id,
            round,
            stops: Vec::new(),
            distance: 0.0,
            duration: 0.0,
            load: 0,
        }
    }

    /// Appends a stop.
    pub fn push_stop(&mut self, stop: Stop) {
        self.load = stop.load_after;
        self.stops.push(stop);
    }

    /// Vehicle running this trip.
    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    /// Round in which the trip departs.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Stops in visiting order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the trip visits nobody.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Point ids in visiting order.
    pub fn point_ids(&self) -> Vec<usize> {
        self.stops.iter().map(|s| s.point_id).collect()
    }

    /// Total distance including both depot legs, in metres.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Total travel time including both depot legs, in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Sum of demands served.
    pub fn load(&self) -> i64 {
        self.load
    }

    /// Sets total distance (used by the evaluator).
    pub fn set_distance(&mut self, d: f64) {
        self.distance = d;
    }

    /// Sets total duration (used by the evaluator).
    pub fn set_duration(&mut self, d: f64) {
        self.duration = d;
    }
}
