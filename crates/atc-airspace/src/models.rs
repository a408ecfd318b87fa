//! Core data models for the airspace engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally assigned node identifier. Not necessarily dense.
pub type NodeId = u32;

/// Kind of airspace node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// Can host landings
    Airport,
    /// Transit only
    Waypoint,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Airport => f.write_str("AIRPORT"),
            NodeKind::Waypoint => f.write_str("WAYPOINT"),
        }
    }
}

/// A point in the airspace graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// Grid column
    pub x: i32,
    /// Grid row
    pub y: i32,
    /// Flight currently holding this node
    #[serde(default)]
    pub occupied_by: Option<String>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, x: i32, y: i32, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            x,
            y,
            occupied_by: None,
        }
    }

    pub fn is_airport(&self) -> bool {
        self.kind == NodeKind::Airport
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied_by.is_some()
    }
}

/// Directed, weighted corridor. Owned by the source node's adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub to: NodeId,
    /// Distance in km
    pub weight: u32,
}

/// Result of a shortest-path query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Node ids from origin to destination, inclusive. Empty when unreachable.
    pub nodes: Vec<NodeId>,
    /// Total weight. `None` when the target is unreachable.
    pub distance: Option<u64>,
}

impl Route {
    pub fn unreachable() -> Self {
        Self {
            nodes: Vec::new(),
            distance: None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance.is_some()
    }

    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    /// Not yet airborne
    #[default]
    Grounded,
    /// En route
    Flying,
    /// Sitting on the last node of its path, cleared to land
    Approaching,
    /// Terminal; flight removed from the active set
    Landed,
    /// Reserved for fault injection; no core transition produces it
    Crashed,
}

impl FlightStatus {
    /// Stable numeric code used by flat persistence formats.
    pub fn code(self) -> u8 {
        match self {
            FlightStatus::Grounded => 0,
            FlightStatus::Flying => 1,
            FlightStatus::Approaching => 2,
            FlightStatus::Landed => 3,
            FlightStatus::Crashed => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FlightStatus::Grounded),
            1 => Some(FlightStatus::Flying),
            2 => Some(FlightStatus::Approaching),
            3 => Some(FlightStatus::Landed),
            4 => Some(FlightStatus::Crashed),
            _ => None,
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlightStatus::Grounded => "GROUNDED",
            FlightStatus::Flying => "FLYING",
            FlightStatus::Approaching => "APPROACHING",
            FlightStatus::Landed => "LANDED",
            FlightStatus::Crashed => "CRASHED",
        };
        f.write_str(label)
    }
}

/// Landing priority. Lower value is more urgent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Critical = 1,
    LowFuel = 2,
    #[default]
    Normal = 3,
    Low = 4,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::LowFuel => "LOW FUEL",
            Priority::Normal => "NORMAL",
            Priority::Low => "LOW",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = crate::error::FleetError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Critical),
            2 => Ok(Priority::LowFuel),
            3 => Ok(Priority::Normal),
            4 => Ok(Priority::Low),
            other => Err(crate::error::FleetError::InvalidPriority(other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority as u8
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", *self as u8, self.label())
    }
}

/// A flight currently tracked and moved through the airspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFlight {
    pub flight_id: String,
    pub current_node: NodeId,
    pub destination: NodeId,
    /// Computed once at creation; never recomputed.
    pub path: Vec<NodeId>,
    /// Index of `current_node` within `path`
    pub cursor: usize,
    pub priority: Priority,
    /// 0-100
    pub fuel: u8,
    pub status: FlightStatus,
}

impl ActiveFlight {
    pub fn origin(&self) -> Option<NodeId> {
        self.path.first().copied()
    }

    pub fn next_node(&self) -> Option<NodeId> {
        self.path.get(self.cursor + 1).copied()
    }

    pub fn at_destination(&self) -> bool {
        self.cursor + 1 >= self.path.len()
    }

    /// Hops still to fly.
    pub fn remaining_hops(&self) -> usize {
        self.path.len().saturating_sub(self.cursor + 1)
    }
}

/// Result of a single `move_next` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// Flight advanced one hop
    Moved { node: NodeId, approaching: bool },
    /// Next node is held by another flight; nothing changed
    Blocked { node: NodeId, occupant: String },
    /// Cursor already at the last path index; nothing changed
    AtDestination,
}

/// Fuel condition reported after a fuel update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelState {
    Nominal,
    Low,
}
