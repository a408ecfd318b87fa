//! Aircraft registry: keyed descriptive records for every flight seen.
//!
//! The fleet manager only talks to the [`RegistrySink`] trait and treats it
//! as best-effort; [`AircraftRegistry`] is the in-memory implementation.

use crate::models::FlightStatus;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Outbound updates emitted by the fleet manager.
pub trait RegistrySink: Send + Sync {
    fn upsert(
        &self,
        flight_id: &str,
        model: &str,
        fuel: u8,
        origin: &str,
        destination: &str,
        status: FlightStatus,
    );

    fn set_status(&self, flight_id: &str, status: FlightStatus);

    fn set_fuel(&self, _flight_id: &str, _fuel: u8) {}
}

/// Descriptive record for one aircraft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AircraftRecord {
    pub flight_id: String,
    pub model: String,
    pub fuel: u8,
    /// Origin node name
    pub origin: String,
    /// Destination node name
    pub destination: String,
    pub status: FlightStatus,
    pub updated_at: DateTime<Utc>,
}

/// Thread-safe registry keyed by flight id.
#[derive(Debug, Default)]
pub struct AircraftRegistry {
    records: DashMap<String, AircraftRecord>,
}

impl AircraftRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, flight_id: &str) -> Option<AircraftRecord> {
        self.records.get(flight_id).map(|r| r.value().clone())
    }

    pub fn contains(&self, flight_id: &str) -> bool {
        self.records.contains_key(flight_id)
    }

    pub fn remove(&self, flight_id: &str) -> Option<AircraftRecord> {
        self.records.remove(flight_id).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records sorted by flight id.
    pub fn all(&self) -> Vec<AircraftRecord> {
        let mut records: Vec<AircraftRecord> =
            self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.flight_id.cmp(&b.flight_id));
        records
    }
}

impl RegistrySink for AircraftRegistry {
    fn upsert(
        &self,
        flight_id: &str,
        model: &str,
        fuel: u8,
        origin: &str,
        destination: &str,
        status: FlightStatus,
    ) {
        self.records.insert(
            flight_id.to_string(),
            AircraftRecord {
                flight_id: flight_id.to_string(),
                model: model.to_string(),
                fuel,
                origin: origin.to_string(),
                destination: destination.to_string(),
                status,
                updated_at: Utc::now(),
            },
        );
    }

    fn set_status(&self, flight_id: &str, status: FlightStatus) {
        if let Some(mut record) = self.records.get_mut(flight_id) {
            record.status = status;
            record.updated_at = Utc::now();
        }
    }

    fn set_fuel(&self, flight_id: &str, fuel: u8) {
        if let Some(mut record) = self.records.get_mut(flight_id) {
            record.fuel = fuel;
            record.updated_at = Utc::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_and_updates_apply_to_existing_records() {
        let registry = AircraftRegistry::new();
        registry.upsert("EK202", "A380", 100, "DXB", "LHR", FlightStatus::Flying);
        registry.upsert("EK202", "B777", 90, "DXB", "CDG", FlightStatus::Flying);
        assert_eq!(registry.len(), 1);

        registry.set_status("EK202", FlightStatus::Landed);
        registry.set_fuel("EK202", 42);
        let record = registry.get("EK202").unwrap();
        assert_eq!(record.model, "B777");
        assert_eq!(record.destination, "CDG");
        assert_eq!(record.status, FlightStatus::Landed);
        assert_eq!(record.fuel, 42);
    }

    #[test]
    fn updates_for_unknown_flights_are_ignored() {
        let registry = AircraftRegistry::new();
        registry.set_status("GHOST", FlightStatus::Landed);
        registry.set_fuel("GHOST", 5);
        assert!(registry.is_empty());
        assert!(!registry.contains("GHOST"));
    }

    #[test]
    fn all_is_sorted_by_flight_id() {
        let registry = AircraftRegistry::new();
        registry.upsert("ZZ9", "A320", 100, "JFK", "LHR", FlightStatus::Flying);
        registry.upsert("AA1", "A320", 100, "JFK", "CDG", FlightStatus::Flying);
        let ids: Vec<String> = registry.all().into_iter().map(|r| r.flight_id).collect();
        assert_eq!(ids, vec!["AA1", "ZZ9"]);
        assert!(registry.remove("AA1").is_some());
        assert_eq!(registry.len(), 1);
    }
}
