//! Chronological audit log of completed flights.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightOutcome {
    Landed,
    Crashed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightLogEntry {
    pub flight_id: String,
    pub origin: String,
    pub destination: String,
    pub arrival_time: DateTime<Utc>,
    pub outcome: FlightOutcome,
}

/// Entries ordered by arrival time; insertion order breaks ties.
#[derive(Debug, Default)]
pub struct FlightLog {
    entries: BTreeMap<(DateTime<Utc>, u64), FlightLogEntry>,
    next_seq: u64,
}

impl FlightLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: FlightLogEntry) {
        let key = (entry.arrival_time, self.next_seq);
        self.next_seq += 1;
        self.entries.insert(key, entry);
    }

    /// Most recent entry for `flight_id`.
    pub fn find(&self, flight_id: &str) -> Option<&FlightLogEntry> {
        self.entries
            .values()
            .rev()
            .find(|entry| entry.flight_id == flight_id)
    }

    /// Drop every entry for `flight_id`. Returns how many were removed.
    pub fn remove(&mut self, flight_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.flight_id != flight_id);
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlightLogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
