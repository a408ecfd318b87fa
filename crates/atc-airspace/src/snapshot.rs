//! Serializable capture of the active fleet.
//!
//! A snapshot holds, per flight: id, current node, destination, priority,
//! fuel, status, path cursor, path length and the full path. Restoring it
//! through [`crate::FleetManager::restore`] re-validates every record
//! against the graph before anything is replaced.

use crate::error::FleetError;
use crate::graph::AirspaceGraph;
use crate::models::{ActiveFlight, FlightStatus, NodeId, Priority};
use crate::rules::FleetRules;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub flight_id: String,
    pub current_node: NodeId,
    pub destination: NodeId,
    pub priority: Priority,
    pub fuel: u8,
    pub status: FlightStatus,
    pub cursor: usize,
    pub path_length: usize,
    pub path: Vec<NodeId>,
}

impl From<&ActiveFlight> for FlightRecord {
    fn from(flight: &ActiveFlight) -> Self {
        Self {
            flight_id: flight.flight_id.clone(),
            current_node: flight.current_node,
            destination: flight.destination,
            priority: flight.priority,
            fuel: flight.fuel,
            status: flight.status,
            cursor: flight.cursor,
            path_length: flight.path.len(),
            path: flight.path.clone(),
        }
    }
}

impl FlightRecord {
    pub fn into_active(self) -> ActiveFlight {
        ActiveFlight {
            flight_id: self.flight_id,
            current_node: self.current_node,
            destination: self.destination,
            path: self.path,
            cursor: self.cursor,
            priority: self.priority,
            fuel: self.fuel,
            status: self.status,
        }
    }

    fn check(&self, graph: &AirspaceGraph) -> Result<(), String> {
        if self.fuel > 100 {
            return Err(format!("fuel {} outside 0-100", self.fuel));
        }
        if self.path.is_empty() {
            return Err("empty path".to_string());
        }
        if self.path_length != self.path.len() {
            return Err(format!(
                "path length {} but {} entries",
                self.path_length,
                self.path.len()
            ));
        }
        if let Some(unknown) = self.path.iter().find(|id| !graph.contains(**id)) {
            return Err(format!("unknown node {unknown} in path"));
        }
        if self.path.get(self.cursor) != Some(&self.current_node) {
            return Err(format!(
                "cursor {} does not point at current node {}",
                self.cursor, self.current_node
            ));
        }
        if self.path.last() != Some(&self.destination) {
            return Err(format!("path does not end at destination {}", self.destination));
        }
        if graph.path_weight(&self.path).is_none() {
            return Err("path has a hop with no corridor".to_string());
        }

        let at_destination = self.cursor + 1 == self.path.len();
        match self.status {
            FlightStatus::Flying if at_destination => {
                Err("FLYING flight already at destination".to_string())
            }
            FlightStatus::Approaching if !at_destination => {
                Err("APPROACHING flight not at destination".to_string())
            }
            FlightStatus::Grounded | FlightStatus::Landed => {
                Err(format!("{} is not an active status", self.status))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub taken_at: DateTime<Utc>,
    pub flights: Vec<FlightRecord>,
}

impl FleetSnapshot {
    pub fn new(flights: Vec<FlightRecord>) -> Self {
        Self {
            taken_at: Utc::now(),
            flights,
        }
    }

    pub fn flight_count(&self) -> usize {
        self.flights.len()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub(crate) fn validate(&self, graph: &AirspaceGraph, rules: &FleetRules) -> Result<(), FleetError> {
        if self.flights.len() > rules.max_active_flights {
            return Err(FleetError::CapacityReached(rules.max_active_flights));
        }

        let mut ids = HashSet::new();
        let mut held = HashSet::new();
        for record in &self.flights {
            let invalid = |reason: String| FleetError::InvalidSnapshot {
                flight_id: record.flight_id.clone(),
                reason,
            };
            if !ids.insert(record.flight_id.as_str()) {
                return Err(invalid("duplicate flight id".to_string()));
            }
            record.check(graph).map_err(invalid)?;
            if !held.insert(record.current_node) {
                return Err(invalid(format!(
                    "node {} held by more than one flight",
                    record.current_node
                )));
            }
        }
        Ok(())
    }
}
