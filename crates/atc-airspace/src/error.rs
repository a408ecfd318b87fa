//! Error types for the airspace graph and the fleet manager.
//!
//! Every failure is reported to the caller and leaves state unchanged.
//! A blocked move is not an error; see [`crate::models::MoveOutcome`].

use crate::models::{FlightStatus, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("node table full ({0} nodes)")]
    CapacityExhausted(usize),
    #[error("coordinates ({x}, {y}) outside grid {width}x{height}")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    #[error("node id {0} already exists")]
    DuplicateId(NodeId),
    #[error("node name {0:?} already exists")]
    DuplicateName(String),
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("node {node} occupied by flight {occupant}")]
    Occupied { node: NodeId, occupant: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FleetError {
    #[error("fleet full ({0} active flights)")]
    CapacityReached(usize),
    #[error("flight {0} already active")]
    AlreadyActive(String),
    #[error("flight {0} not found")]
    NotFound(String),
    #[error("no path from node {from} to node {to}")]
    NoPath { from: NodeId, to: NodeId },
    #[error("start node {node} occupied by flight {occupant}")]
    StartOccupied { node: NodeId, occupant: String },
    #[error("fuel value {0} outside 0-100")]
    InvalidFuel(u8),
    #[error("priority {0} outside 1-4")]
    InvalidPriority(u8),
    #[error("flight {flight_id} is {status}, must be APPROACHING to land")]
    NotApproaching {
        flight_id: String,
        status: FlightStatus,
    },
    #[error("inconsistent snapshot for flight {flight_id}: {reason}")]
    InvalidSnapshot { flight_id: String, reason: String },
    #[error(transparent)]
    Graph(#[from] GraphError),
}
