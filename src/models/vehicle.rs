//! Vehicles and the fleet they belong to.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::FleetError;

/// A delivery vehicle. It can run any number of trips in one plan.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Vehicle;
///
/// let v = Vehicle::new(0, 50);
/// assert_eq!(v.id(), 0);
/// assert_eq!(v.capacity(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    id: usize,
    capacity: i32,
}

impl Vehicle {
    /// Creates a vehicle with the given ID and capacity.
    pub fn new(id: usize, capacity: i32) -> Self {
        Self { id, capacity }
    }

    /// Vehicle ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Maximum load per trip.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }
}

/// The vehicles available to a planning run, ordered by id.
///
/// The order is the fixed cycle the scheduler walks every round.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Fleet, Vehicle};
///
/// let fleet = Fleet::uniform(5, 50);
/// assert_eq!(fleet.len(), 5);
/// assert_eq!(fleet.total_capacity(), 250);
///
/// let mixed = Fleet::new(vec![Vehicle::new(2, 30), Vehicle::new(1, 80)])?;
/// assert_eq!(mixed.vehicles()[0].id(), 1);
/// assert_eq!(mixed.max_capacity(), Some(80));
/// # Ok::<(), u_dispatch::error::FleetError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    /// Builds a heterogeneous fleet.
    ///
    /// Fails on repeated ids or non-positive capacities.
    pub fn new(mut vehicles: Vec<Vehicle>) -> Result<Self, FleetError> {
        let mut seen = BTreeSet::new();
        for v in &vehicles {
            if v.capacity() <= 0 {
                return Err(FleetError::NonPositiveCapacity {
                    id: v.id(),
                    capacity: v.capacity(),
                });
            }
            if !seen.insert(v.id()) {
                return Err(FleetError::DuplicateVehicle { id: v.id() });
            }
        }
        vehicles.sort_by_key(Vehicle::id);
        Ok(Self { vehicles })
    }

    /// `count` identical vehicles with ids `0..count`.
    ///
    /// A non-positive capacity yields vehicles that can never carry anything;
    /// use [`Fleet::new`] to have that rejected.
    pub fn uniform(count: usize, capacity: i32) -> Self {
        Self {
            vehicles: (0..count).map(|id| Vehicle::new(id, capacity)).collect(),
        }
    }

    /// Vehicles in cycle order.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Looks up a vehicle by id.
    pub fn vehicle(&self, id: usize) -> Option<&Vehicle> {
        self.vehicles
            .binary_search_by_key(&id, Vehicle::id)
            .ok()
            .map(|idx| &self.vehicles[idx])
    }

    /// Number of vehicles.
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Returns `true` if there are no vehicles.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Largest single-vehicle capacity, `None` for an empty fleet.
    pub fn max_capacity(&self) -> Option<i32> {
        self.vehicles.iter().map(Vehicle::capacity).max()
    }

    /// Sum of capacities, i.e. what one round can carry at most.
    pub fn total_capacity(&self) -> i64 {
        self.vehicles.iter().map(|v| i64::from(v.capacity())).sum()
    }
}
