//! Capacity limits and thresholds for the airspace engine.

use serde::{Deserialize, Serialize};

/// Configuration for the airspace graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirspaceRules {
    /// Maximum number of nodes in the graph
    pub max_nodes: usize,
    /// Grid columns; valid x is 0..grid_width
    pub grid_width: i32,
    /// Grid rows; valid y is 0..grid_height
    pub grid_height: i32,
}

impl Default for AirspaceRules {
    fn default() -> Self {
        Self {
            max_nodes: 20,
            grid_width: 30,
            grid_height: 20,
        }
    }
}

impl AirspaceRules {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..self.grid_width).contains(&x) && (0..self.grid_height).contains(&y)
    }
}

/// Configuration for the fleet manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetRules {
    /// Maximum concurrently active flights
    pub max_active_flights: usize,
    /// Fuel assigned to a newly created flight
    pub initial_fuel: u8,
    /// Fuel burned per successful move
    pub fuel_burn_per_move: u8,
    /// Fuel strictly below this raises a low-fuel condition
    pub low_fuel_threshold: u8,
}

impl Default for FleetRules {
    fn default() -> Self {
        Self {
            max_active_flights: 20,
            initial_fuel: 100,
            fuel_burn_per_move: 1,
            low_fuel_threshold: 10,
        }
    }
}
