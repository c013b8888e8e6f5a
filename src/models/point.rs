//! Locations, the depot, and customer demand points.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A geographic coordinate in decimal degrees.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Location;
///
/// let loc = Location::new(12.9716, 77.5946);
/// assert_eq!(loc.latitude(), 12.9716);
/// assert_eq!(loc.longitude(), 77.5946);
/// assert!(loc.is_finite());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    /// Creates a location from latitude and longitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns `true` if both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Identity of a site a vehicle can stand at.
///
/// The depot orders before every customer, customers order by id. Cache keys
/// and tie-breaks rely on this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SiteId {
    /// The single depot.
    Depot,
    /// A customer demand point.
    Point(usize),
}

impl SiteId {
    /// Customer id, `None` for the depot.
    pub fn point_id(self) -> Option<usize> {
        match self {
            SiteId::Depot => None,
            SiteId::Point(id) => Some(id),
        }
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteId::Depot => f.write_str("depot"),
            SiteId::Point(id) => write!(f, "point {id}"),
        }
    }
}

/// A site identity paired with its coordinate, as handed to the oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// Site identity.
    pub id: SiteId,
    /// Site coordinate.
    pub location: Location,
}

/// The depot every trip starts from and returns to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    location: Location,
}

impl Depot {
    /// Creates a depot at the given location.
    pub fn new(location: Location) -> Self {
        Self { location }
    }

    /// Depot coordinate.
    pub fn location(&self) -> Location {
        self.location
    }

    /// The depot as an oracle waypoint.
    pub fn waypoint(&self) -> Waypoint {
        Waypoint {
            id: SiteId::Depot,
            location: self.location,
        }
    }
}

/// A customer order to be delivered.
///
/// Only `demand` and the location influence planning; name, city and order
/// value are carried through to the report.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{DemandPoint, Location};
///
/// let p = DemandPoint::new(7, Location::new(12.95, 77.60), 3)
///     .with_name("Fresh Mart")
///     .with_city("Bengaluru")
///     .with_order_value(1250.0);
/// assert_eq!(p.id(), 7);
/// assert_eq!(p.demand(), 3);
/// assert_eq!(p.city(), "Bengaluru");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandPoint {
    id: usize,
    name: String,
    city: String,
    location: Location,
    demand: i32,
    order_value: f64,
}

impl DemandPoint {
    /// Creates a demand point with empty name/city and zero order value.
    pub fn new(id: usize, location: Location, demand: i32) -> Self {
        Self {
            id,
            name: String::new(),
            city: String::new(),
            location,
            demand,
            order_value: 0.0,
        }
    }

    /// Sets the customer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the city.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    /// Sets the order value (informational only).
    pub fn with_order_value(mut self, value: f64) -> Self {
        self.order_value = value;
        self
    }

    /// Customer id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Customer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// City.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Coordinate.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Quantity to deliver.
    pub fn demand(&self) -> i32 {
        self.demand
    }

    /// Order value in currency units.
    pub fn order_value(&self) -> f64 {
        self.order_value
    }

    /// Site identity of this point.
    pub fn site_id(&self) -> SiteId {
        SiteId::Point(self.id)
    }

    /// This point as an oracle waypoint.
    pub fn waypoint(&self) -> Waypoint {
        Waypoint {
            id: self.site_id(),
            location: self.location,
        }
    }
}
