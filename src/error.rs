//! Error taxonomy for a planning run.
//!
//! Validation problems ([`InvalidDemandError`]) are collected and reported
//! alongside the plan. Everything reaching [`PlanError`] aborts the run.

use thiserror::Error;

use crate::evaluation::Violation;
use crate::models::SiteId;

/// A demand record rejected at registration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidDemandError {
    /// Demand is zero or negative.
    #[error("point {id} has non-positive demand {demand}")]
    NonPositiveDemand {
        /// Offending point id.
        id: usize,
        /// Demand carried by the record.
        demand: i32,
    },
    /// Another point with the same id was already registered.
    #[error("point {id} is registered more than once")]
    DuplicateId {
        /// Repeated point id.
        id: usize,
    },
    /// Latitude or longitude is NaN or infinite.
    #[error("point {id} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Offending point id.
        id: usize,
    },
}

impl InvalidDemandError {
    /// Id of the rejected record.
    pub fn point_id(&self) -> usize {
        match self {
            Self::NonPositiveDemand { id, .. }
            | Self::DuplicateId { id }
            | Self::NonFiniteCoordinate { id } => *id,
        }
    }
}

/// Failure to obtain a travel cost.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    /// The provider could not be reached or refused the query.
    #[error("travel cost {origin} -> {destination} unavailable: {reason}")]
    Unavailable {
        /// Origin site.
        origin: SiteId,
        /// Destination site.
        destination: SiteId,
        /// Provider-supplied reason.
        reason: String,
    },
    /// The provider answered with a negative or non-finite value.
    #[error("travel cost {origin} -> {destination} is not a finite non-negative value")]
    InvalidCost {
        /// Origin site.
        origin: SiteId,
        /// Destination site.
        destination: SiteId,
    },
    /// A table query returned the wrong number of rows or columns.
    #[error("travel cost table is not {expected}x{expected}")]
    MalformedTable {
        /// Number of waypoints requested.
        expected: usize,
    },
}

/// Invalid fleet description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FleetError {
    /// Two vehicles share an id.
    #[error("vehicle {id} appears more than once")]
    DuplicateVehicle {
        /// Repeated vehicle id.
        id: usize,
    },
    /// Capacity is zero or negative.
    #[error("vehicle {id} has non-positive capacity {capacity}")]
    NonPositiveCapacity {
        /// Vehicle id.
        id: usize,
        /// Declared capacity.
        capacity: i32,
    },
}

/// Fatal planning failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// A travel cost could not be obtained; feasibility is unverifiable.
    #[error(transparent)]
    Oracle(#[from] OracleError),
    /// A single point's demand exceeds what any vehicle can carry.
    #[error("point {point} demands {demand}, over the largest capacity {max_capacity}")]
    UnservableDemand {
        /// Offending point id.
        point: usize,
        /// Its demand.
        demand: i32,
        /// Largest capacity available.
        max_capacity: i32,
    },
    /// A constructed trip breaks a constraint it was built to respect.
    #[error("trip for vehicle {vehicle} in round {round} breaks {violations:?}")]
    InvalidTrip {
        /// Vehicle the trip was built for.
        vehicle: usize,
        /// Round of the trip.
        round: usize,
        /// What the trip breaks.
        violations: Vec<Violation>,
    },
    /// A full round served nothing while demand remains.
    #[error(
        "no progress after {rounds_completed} round(s); {} point(s) left unserved",
        .residual.len()
    )]
    InfeasiblePlan {
        /// Rounds that did serve something before progress stopped.
        rounds_completed: usize,
        /// Ids of the points still unserved.
        residual: Vec<usize>,
    },
}

/// A plan that breaks its own invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Coverage or capacity invariant violated.
    #[error("malformed plan: {reason}")]
    MalformedPlan {
        /// Which invariant failed.
        reason: String,
    },
}
