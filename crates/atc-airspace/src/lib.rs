//! Airspace routing and collision avoidance engine.
//!
//! An [`AirspaceGraph`] of airports and waypoints joined by weighted
//! corridors, and a [`FleetManager`] that routes flights over it, moves them
//! one hop at a time and keeps at most one flight on any node.

pub mod error;
pub mod fleet;
pub mod flight_log;
pub mod graph;
pub mod landing_queue;
pub mod models;
pub mod registry;
pub mod rules;
pub mod shared;
pub mod snapshot;

pub use error::{FleetError, GraphError};
pub use fleet::FleetManager;
pub use flight_log::{FlightLog, FlightLogEntry, FlightOutcome};
pub use graph::AirspaceGraph;
pub use landing_queue::{LandingQueue, LandingSlot};
pub use models::{
    ActiveFlight, Edge, FlightStatus, FuelState, MoveOutcome, Node, NodeId, NodeKind, Priority,
    Route,
};
pub use registry::{AircraftRecord, AircraftRegistry, RegistrySink};
pub use rules::{AirspaceRules, FleetRules};
pub use shared::SharedFleet;
pub use snapshot::{FleetSnapshot, FlightRecord};
