//! Lock-guarded handle for driving one fleet from several threads.
//!
//! A single mutex serializes every operation, so the occupancy
//! check-and-reserve inside `move_next` and `add_flight` is atomic with
//! respect to other callers. Each call takes at most one new node and
//! releases the old one under the same lock, so there is no lock ordering
//! to get wrong.

use crate::error::FleetError;
use crate::fleet::FleetManager;
use crate::models::{ActiveFlight, FuelState, MoveOutcome, NodeId, Priority};
use crate::snapshot::FleetSnapshot;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub struct SharedFleet {
    inner: Arc<Mutex<FleetManager>>,
}

impl SharedFleet {
    pub fn new(fleet: FleetManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(fleet)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FleetManager> {
        // Fleet operations validate before mutating; poisoned state is still whole.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_flight(
        &self,
        flight_id: &str,
        start: NodeId,
        destination: NodeId,
        priority: Priority,
        model: &str,
    ) -> Result<ActiveFlight, FleetError> {
        self.lock()
            .add_flight(flight_id, start, destination, priority, model)
            .cloned()
    }

    pub fn move_next(&self, flight_id: &str) -> Result<MoveOutcome, FleetError> {
        self.lock().move_next(flight_id)
    }

    pub fn declare_emergency(&self, flight_id: &str, priority: Priority) -> Result<Priority, FleetError> {
        self.lock().declare_emergency(flight_id, priority)
    }

    pub fn update_fuel(&self, flight_id: &str, fuel: u8) -> Result<FuelState, FleetError> {
        self.lock().update_fuel(flight_id, fuel)
    }

    pub fn land(&self, flight_id: &str) -> Result<ActiveFlight, FleetError> {
        self.lock().land(flight_id)
    }

    pub fn remove_flight(&self, flight_id: &str) -> Result<ActiveFlight, FleetError> {
        self.lock().remove_flight(flight_id)
    }

    pub fn get(&self, flight_id: &str) -> Option<ActiveFlight> {
        self.lock().get(flight_id).cloned()
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        self.lock().snapshot()
    }

    /// Run a read-only closure against the fleet under the lock.
    pub fn read<T>(&self, f: impl FnOnce(&FleetManager) -> T) -> T {
        f(&self.lock())
    }
}
