//! Priority landing queue.
//!
//! Lower priority value lands first; flights with equal priority land in
//! the order they were queued. Priority changes keep a flight's original
//! queue position within its new priority class.

use crate::models::Priority;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingSlot {
    pub flight_id: String,
    pub priority: Priority,
}

#[derive(Debug, Default)]
pub struct LandingQueue {
    ordered: BTreeMap<(Priority, u64), String>,
    keys: HashMap<String, (Priority, u64)>,
    next_seq: u64,
}

impl LandingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a flight. Re-queueing an already queued flight only updates
    /// its priority.
    pub fn push(&mut self, flight_id: &str, priority: Priority) {
        if self.keys.contains_key(flight_id) {
            self.update_priority(flight_id, priority);
            return;
        }
        let key = (priority, self.next_seq);
        self.next_seq += 1;
        self.ordered.insert(key, flight_id.to_string());
        self.keys.insert(flight_id.to_string(), key);
    }

    pub fn pop(&mut self) -> Option<LandingSlot> {
        let ((priority, _), flight_id) = self.ordered.pop_first()?;
        self.keys.remove(&flight_id);
        Some(LandingSlot {
            flight_id,
            priority,
        })
    }

    pub fn peek(&self) -> Option<LandingSlot> {
        self.ordered
            .iter()
            .next()
            .map(|(&(priority, _), flight_id)| LandingSlot {
                flight_id: flight_id.clone(),
                priority,
            })
    }

    /// Emergency override. Returns false if the flight is not queued.
    pub fn update_priority(&mut self, flight_id: &str, priority: Priority) -> bool {
        let Some(key) = self.keys.get_mut(flight_id) else {
            return false;
        };
        if let Some(id) = self.ordered.remove(&*key) {
            let new_key = (priority, key.1);
            self.ordered.insert(new_key, id);
            *key = new_key;
        }
        true
    }

    pub fn remove(&mut self, flight_id: &str) -> bool {
        match self.keys.remove(flight_id) {
            Some(key) => self.ordered.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn contains(&self, flight_id: &str) -> bool {
        self.keys.contains_key(flight_id)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Queued flights in landing order.
    pub fn iter_in_order(&self) -> impl Iterator<Item = LandingSlot> + '_ {
        self.ordered
            .iter()
            .map(|(&(priority, _), flight_id)| LandingSlot {
                flight_id: flight_id.clone(),
                priority,
            })
    }
}
