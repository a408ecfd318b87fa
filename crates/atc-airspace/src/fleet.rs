//! Flight fleet manager: lifecycle, movement sequencing and collision
//! avoidance over an owned [`AirspaceGraph`].
//!
//! The manager is the only writer of node occupancy. Every operation that
//! moves a flight updates the flight's `current_node` and the graph's
//! occupancy marker in the same call, so the two never disagree.

use crate::error::{FleetError, GraphError};
use crate::graph::AirspaceGraph;
use crate::models::{
    ActiveFlight, FlightStatus, FuelState, MoveOutcome, NodeId, NodeKind, Priority,
};
use crate::registry::RegistrySink;
use crate::rules::FleetRules;
use crate::snapshot::{FleetSnapshot, FlightRecord};
use std::collections::HashMap;
use std::sync::Arc;

pub struct FleetManager {
    rules: FleetRules,
    graph: AirspaceGraph,
    flights: HashMap<String, ActiveFlight>,
    /// Flight ids in creation order, for stable enumeration
    order: Vec<String>,
    registry: Option<Arc<dyn RegistrySink>>,
}

impl FleetManager {
    pub fn new(graph: AirspaceGraph, rules: FleetRules) -> Self {
        Self {
            rules,
            graph,
            flights: HashMap::new(),
            order: Vec::new(),
            registry: None,
        }
    }

    /// Attach a registry that receives best-effort status and fuel updates.
    pub fn with_registry(mut self, registry: Arc<dyn RegistrySink>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn set_registry(&mut self, registry: Option<Arc<dyn RegistrySink>>) {
        self.registry = registry;
    }

    pub fn rules(&self) -> &FleetRules {
        &self.rules
    }

    pub fn graph(&self) -> &AirspaceGraph {
        &self.graph
    }

    /// Add a node at runtime. New nodes start unoccupied.
    pub fn add_node(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        x: i32,
        y: i32,
        kind: NodeKind,
    ) -> Result<(), GraphError> {
        self.graph.add_node(id, name, x, y, kind)
    }

    /// Add a directed corridor at runtime. Existing paths are not recomputed.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: u32) -> Result<(), GraphError> {
        self.graph.add_edge(from, to, weight)
    }

    pub fn add_flight(
        &mut self,
        flight_id: &str,
        start: NodeId,
        destination: NodeId,
        priority: Priority,
        model: &str,
    ) -> Result<&ActiveFlight, FleetError> {
        if self.flights.len() >= self.rules.max_active_flights {
            tracing::warn!("Rejected flight {}: fleet full", flight_id);
            return Err(FleetError::CapacityReached(self.rules.max_active_flights));
        }
        if self.flights.contains_key(flight_id) {
            return Err(FleetError::AlreadyActive(flight_id.to_string()));
        }

        let route = self.graph.shortest_path(start, destination)?;
        if !route.is_reachable() {
            tracing::warn!(
                "Rejected flight {}: no path from {} to {}",
                flight_id,
                start,
                destination
            );
            return Err(FleetError::NoPath {
                from: start,
                to: destination,
            });
        }

        self.graph
            .try_occupy(start, flight_id)
            .map_err(|err| match err {
                GraphError::Occupied { node, occupant } => {
                    FleetError::StartOccupied { node, occupant }
                }
                other => FleetError::Graph(other),
            })?;

        let status = if route.hops() == 0 {
            FlightStatus::Approaching
        } else {
            FlightStatus::Flying
        };
        let flight = ActiveFlight {
            flight_id: flight_id.to_string(),
            current_node: start,
            destination,
            path: route.nodes,
            cursor: 0,
            priority,
            fuel: self.rules.initial_fuel.min(100),
            status,
        };

        let origin_name = self.node_name(start);
        let destination_name = self.node_name(destination);
        if let Some(registry) = &self.registry {
            registry.upsert(
                flight_id,
                model,
                flight.fuel,
                &origin_name,
                &destination_name,
                status,
            );
        }
        tracing::info!(
            "Flight {} added from {} to {} ({} hops, {} km)",
            flight_id,
            origin_name,
            destination_name,
            flight.path.len() - 1,
            route.distance.unwrap_or_default()
        );

        self.order.push(flight_id.to_string());
        Ok(self.flights.entry(flight_id.to_string()).or_insert(flight))
    }

    /// Advance a flight one hop along its path.
    ///
    /// A blocked move changes nothing and is reported as
    /// [`MoveOutcome::Blocked`]; the caller decides whether to retry.
    pub fn move_next(&mut self, flight_id: &str) -> Result<MoveOutcome, FleetError> {
        let Some(flight) = self.flights.get_mut(flight_id) else {
            return Err(FleetError::NotFound(flight_id.to_string()));
        };
        let Some(next) = flight.next_node() else {
            tracing::debug!("Flight {} has reached destination", flight_id);
            return Ok(MoveOutcome::AtDestination);
        };

        if let Err(err) = self.graph.try_occupy(next, flight_id) {
            return match err {
                GraphError::Occupied { node, occupant } => {
                    tracing::warn!(
                        "Flight {} holding: node {} occupied by {}",
                        flight_id,
                        node,
                        occupant
                    );
                    Ok(MoveOutcome::Blocked { node, occupant })
                }
                other => Err(other.into()),
            };
        }
        self.graph.release(flight.current_node, flight_id);

        flight.current_node = next;
        flight.cursor += 1;
        let was_low = flight.fuel < self.rules.low_fuel_threshold;
        flight.fuel = flight.fuel.saturating_sub(self.rules.fuel_burn_per_move);
        let approaching = flight.at_destination();
        if approaching {
            flight.status = FlightStatus::Approaching;
        }
        let fuel = flight.fuel;

        tracing::debug!("Flight {} moved to node {} (fuel {}%)", flight_id, next, fuel);
        if !was_low && fuel < self.rules.low_fuel_threshold {
            tracing::warn!("Flight {} LOW FUEL: {}%", flight_id, fuel);
        }
        if let Some(registry) = &self.registry {
            registry.set_fuel(flight_id, fuel);
            if approaching {
                registry.set_status(flight_id, FlightStatus::Approaching);
            }
        }
        if approaching {
            tracing::info!("Flight {} approaching destination", flight_id);
        }

        Ok(MoveOutcome::Moved {
            node: next,
            approaching,
        })
    }

    /// Overwrite a flight's priority. Returns the previous priority.
    pub fn declare_emergency(
        &mut self,
        flight_id: &str,
        priority: Priority,
    ) -> Result<Priority, FleetError> {
        let flight = self.flight_mut(flight_id)?;
        let previous = std::mem::replace(&mut flight.priority, priority);
        tracing::warn!(
            "Emergency: flight {} priority {} -> {}",
            flight_id,
            previous,
            priority
        );
        Ok(previous)
    }

    pub fn update_fuel(&mut self, flight_id: &str, fuel: u8) -> Result<FuelState, FleetError> {
        if fuel > 100 {
            return Err(FleetError::InvalidFuel(fuel));
        }
        let threshold = self.rules.low_fuel_threshold;
        let flight = self.flight_mut(flight_id)?;
        flight.fuel = fuel;

        if let Some(registry) = &self.registry {
            registry.set_fuel(flight_id, fuel);
        }
        if fuel < threshold {
            tracing::warn!("Flight {} LOW FUEL: {}%", flight_id, fuel);
            Ok(FuelState::Low)
        } else {
            tracing::debug!("Flight {} fuel updated to {}%", flight_id, fuel);
            Ok(FuelState::Nominal)
        }
    }

    /// Land an approaching flight. The flight leaves the active set and its
    /// node is freed; the landed record is returned for downstream logging.
    pub fn land(&mut self, flight_id: &str) -> Result<ActiveFlight, FleetError> {
        let flight = self.flight(flight_id)?;
        if flight.status != FlightStatus::Approaching {
            return Err(FleetError::NotApproaching {
                flight_id: flight_id.to_string(),
                status: flight.status,
            });
        }

        if let Some(registry) = &self.registry {
            registry.set_status(flight_id, FlightStatus::Landed);
        }
        let mut landed = self.remove_flight(flight_id)?;
        landed.status = FlightStatus::Landed;
        tracing::info!(
            "Flight {} landed at {}",
            flight_id,
            self.node_name(landed.current_node)
        );
        Ok(landed)
    }

    /// Drop a flight from the active set and free its node.
    pub fn remove_flight(&mut self, flight_id: &str) -> Result<ActiveFlight, FleetError> {
        let flight = self
            .flights
            .remove(flight_id)
            .ok_or_else(|| FleetError::NotFound(flight_id.to_string()))?;
        self.order.retain(|id| id != flight_id);
        self.graph.release(flight.current_node, flight_id);
        tracing::info!("Flight {} removed", flight_id);
        Ok(flight)
    }

    pub fn get(&self, flight_id: &str) -> Option<&ActiveFlight> {
        self.flights.get(flight_id)
    }

    pub fn exists(&self, flight_id: &str) -> bool {
        self.flights.contains_key(flight_id)
    }

    pub fn current_node(&self, flight_id: &str) -> Option<NodeId> {
        self.get(flight_id).map(|flight| flight.current_node)
    }

    /// Active flights in creation order.
    pub fn flights(&self) -> impl Iterator<Item = &ActiveFlight> {
        self.order.iter().filter_map(|id| self.flights.get(id))
    }

    pub fn flight_at(&self, index: usize) -> Option<&ActiveFlight> {
        self.order.get(index).and_then(|id| self.flights.get(id))
    }

    pub fn flight_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Whether any flight other than `excluding` currently holds `node`.
    pub fn check_collision(&self, node: NodeId, excluding: Option<&str>) -> bool {
        self.graph
            .occupant(node)
            .is_some_and(|occupant| Some(occupant) != excluding)
    }

    /// Cross-check flight positions against graph occupancy.
    pub fn occupancy_consistent(&self) -> bool {
        let flights_hold_their_nodes = self
            .flights
            .values()
            .all(|flight| self.graph.occupant(flight.current_node) == Some(flight.flight_id.as_str()));
        let markers_match_flights = self.graph.nodes().all(|node| match &node.occupied_by {
            Some(occupant) => self.current_node(occupant) == Some(node.id),
            None => true,
        });
        flights_hold_their_nodes && markers_match_flights
    }

    /// Capture every active flight in enumeration order.
    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot::new(self.flights().map(FlightRecord::from).collect())
    }

    /// Replace the active set with a saved snapshot, re-reserving every
    /// flight's node. A rejected snapshot leaves the manager untouched.
    pub fn restore(&mut self, snapshot: FleetSnapshot) -> Result<(), FleetError> {
        snapshot.validate(&self.graph, &self.rules)?;

        for flight in self.flights.values() {
            self.graph.release(flight.current_node, &flight.flight_id);
        }
        self.flights.clear();
        self.order.clear();

        for record in snapshot.flights {
            let flight = record.into_active();
            self.graph.try_occupy(flight.current_node, &flight.flight_id)?;
            self.order.push(flight.flight_id.clone());
            self.flights.insert(flight.flight_id.clone(), flight);
        }
        tracing::info!("Restored {} active flights", self.order.len());
        Ok(())
    }

    fn flight(&self, flight_id: &str) -> Result<&ActiveFlight, FleetError> {
        self.flights
            .get(flight_id)
            .ok_or_else(|| FleetError::NotFound(flight_id.to_string()))
    }

    fn flight_mut(&mut self, flight_id: &str) -> Result<&mut ActiveFlight, FleetError> {
        self.flights
            .get_mut(flight_id)
            .ok_or_else(|| FleetError::NotFound(flight_id.to_string()))
    }

    fn node_name(&self, id: NodeId) -> String {
        self.graph
            .node(id)
            .map(|node| node.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
