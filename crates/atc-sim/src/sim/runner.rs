//! Turn-based simulation loop.
//!
//! Each tick advances every active flight by at most one hop in fleet
//! order. Flights that reach their destination join the landing queue, and
//! the single runway lands at most one queued flight per tick.

use super::scenarios::FlightPlan;
use atc_airspace::{
    AircraftRegistry, AirspaceGraph, FleetError, FleetManager, FleetRules, FleetSnapshot,
    FlightLog, FlightLogEntry, FlightOutcome, FlightStatus, FuelState, LandingQueue, MoveOutcome,
    NodeId, Priority, RegistrySink,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Registry model for restored flights with no earlier record.
const UNKNOWN_MODEL: &str = "UNKNOWN";

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub moved: usize,
    pub blocked: usize,
    /// Flights waiting for the runway after this tick
    pub queued: usize,
    pub landed: Option<String>,
}

pub struct Simulation {
    fleet: FleetManager,
    registry: Arc<AircraftRegistry>,
    landing_queue: LandingQueue,
    flight_log: FlightLog,
    tick: u64,
}

impl Simulation {
    pub fn new(graph: AirspaceGraph, rules: FleetRules) -> Self {
        let registry = Arc::new(AircraftRegistry::new());
        let fleet = FleetManager::new(graph, rules).with_registry(registry.clone());
        Self {
            fleet,
            registry,
            landing_queue: LandingQueue::new(),
            flight_log: FlightLog::new(),
            tick: 0,
        }
    }

    pub fn fleet(&self) -> &FleetManager {
        &self.fleet
    }

    pub fn registry(&self) -> &AircraftRegistry {
        &self.registry
    }

    pub fn landing_queue(&self) -> &LandingQueue {
        &self.landing_queue
    }

    pub fn flight_log(&self) -> &FlightLog {
        &self.flight_log
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// No flights left in the air.
    pub fn is_idle(&self) -> bool {
        self.fleet.is_empty()
    }

    pub fn schedule(&mut self, plan: &FlightPlan) -> Result<(), FleetError> {
        let flight = self.fleet.add_flight(
            &plan.flight_id,
            plan.origin,
            plan.destination,
            plan.priority,
            &plan.model,
        )?;
        if flight.status == FlightStatus::Approaching {
            self.landing_queue.push(&plan.flight_id, plan.priority);
        }
        Ok(())
    }

    /// Change a flight's priority, moving it within the landing queue if it
    /// is already waiting.
    pub fn declare_emergency(
        &mut self,
        flight_id: &str,
        priority: Priority,
    ) -> Result<Priority, FleetError> {
        let previous = self.fleet.declare_emergency(flight_id, priority)?;
        self.landing_queue.update_priority(flight_id, priority);
        Ok(previous)
    }

    /// Set a flight's fuel. A low reading escalates routine flights to
    /// [`Priority::LowFuel`].
    pub fn update_fuel(&mut self, flight_id: &str, fuel: u8) -> Result<FuelState, FleetError> {
        let state = self.fleet.update_fuel(flight_id, fuel)?;
        if state == FuelState::Low {
            self.escalate_low_fuel(flight_id)?;
        }
        Ok(state)
    }

    /// Take a flight out of the simulation without landing it.
    pub fn cancel(&mut self, flight_id: &str) -> Result<(), FleetError> {
        self.fleet.remove_flight(flight_id)?;
        self.landing_queue.remove(flight_id);
        self.registry.remove(flight_id);
        Ok(())
    }

    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        for flight_id in self.fleet.flight_ids() {
            let Some(flight) = self.fleet.get(&flight_id) else {
                continue;
            };
            if flight.status == FlightStatus::Approaching {
                self.landing_queue.push(&flight_id, flight.priority);
                continue;
            }

            match self.fleet.move_next(&flight_id) {
                Ok(MoveOutcome::Moved { approaching, .. }) => {
                    report.moved += 1;
                    if approaching {
                        if let Some(flight) = self.fleet.get(&flight_id) {
                            self.landing_queue.push(&flight_id, flight.priority);
                        }
                    }
                }
                Ok(MoveOutcome::Blocked { .. }) => report.blocked += 1,
                Ok(MoveOutcome::AtDestination) => {}
                Err(err) => warn!("Tick {}: flight {} not moved: {}", self.tick, flight_id, err),
            }

            let low_fuel = self
                .fleet
                .get(&flight_id)
                .is_some_and(|f| f.fuel < self.fleet.rules().low_fuel_threshold);
            if low_fuel {
                if let Err(err) = self.escalate_low_fuel(&flight_id) {
                    warn!("Tick {}: {}", self.tick, err);
                }
            }
        }

        if let Some(slot) = self.landing_queue.pop() {
            match self.land(&slot.flight_id) {
                Ok(()) => report.landed = Some(slot.flight_id),
                Err(err) => warn!("Tick {}: landing failed: {}", self.tick, err),
            }
        }

        report.queued = self.landing_queue.len();
        report
    }

    /// Tick until the fleet is empty or `max_ticks` have run.
    pub fn run(&mut self, max_ticks: u64) -> Vec<TickReport> {
        let mut reports = Vec::new();
        for _ in 0..max_ticks {
            if self.is_idle() {
                break;
            }
            reports.push(self.tick());
        }
        info!(
            "Simulation stopped after {} ticks: {} landed, {} still active",
            self.tick,
            self.flight_log.len(),
            self.fleet.len()
        );
        reports
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        self.fleet.snapshot()
    }

    /// Replace the fleet with a saved snapshot. Approaching flights are
    /// queued for landing in snapshot order.
    ///
    /// Registry records of in-air flights absent from the snapshot are
    /// dropped; records of landed or crashed flights stay as history.
    pub fn restore(&mut self, snapshot: FleetSnapshot) -> Result<(), FleetError> {
        self.fleet.restore(snapshot)?;
        self.landing_queue = LandingQueue::new();

        for record in self.registry.all() {
            let finished = matches!(record.status, FlightStatus::Landed | FlightStatus::Crashed);
            if !finished && !self.fleet.exists(&record.flight_id) {
                self.registry.remove(&record.flight_id);
            }
        }

        let graph = self.fleet.graph();
        for flight in self.fleet.flights() {
            let origin = flight.origin().unwrap_or(flight.current_node);
            let model = self
                .registry
                .get(&flight.flight_id)
                .map_or_else(|| UNKNOWN_MODEL.to_string(), |record| record.model);
            self.registry.upsert(
                &flight.flight_id,
                &model,
                flight.fuel,
                &node_name(graph, origin),
                &node_name(graph, flight.destination),
                flight.status,
            );
            if flight.status == FlightStatus::Approaching {
                self.landing_queue.push(&flight.flight_id, flight.priority);
            }
        }
        Ok(())
    }

    fn escalate_low_fuel(&mut self, flight_id: &str) -> Result<(), FleetError> {
        let priority = self
            .fleet
            .get(flight_id)
            .map(|f| f.priority)
            .ok_or_else(|| FleetError::NotFound(flight_id.to_string()))?;
        if priority > Priority::LowFuel {
            self.declare_emergency(flight_id, Priority::LowFuel)?;
        }
        Ok(())
    }

    fn land(&mut self, flight_id: &str) -> Result<(), FleetError> {
        let landed = self.fleet.land(flight_id)?;
        let graph = self.fleet.graph();
        let origin = landed.origin().unwrap_or(landed.current_node);
        self.flight_log.record(FlightLogEntry {
            flight_id: landed.flight_id.clone(),
            origin: node_name(graph, origin),
            destination: node_name(graph, landed.destination),
            arrival_time: Utc::now(),
            outcome: FlightOutcome::Landed,
        });
        Ok(())
    }
}

fn node_name(graph: &AirspaceGraph, id: NodeId) -> String {
    graph
        .node(id)
        .map_or_else(|| id.to_string(), |node| node.name.clone())
}
