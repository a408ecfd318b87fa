//! Driver configuration from environment.

use atc_airspace::{AirspaceRules, FleetRules};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub airspace: AirspaceRules,
    pub fleet: FleetRules,
    pub snapshot_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let airspace = AirspaceRules::default();
        let fleet = FleetRules::default();
        Self {
            airspace: AirspaceRules {
                max_nodes: env_or("ATC_MAX_NODES", airspace.max_nodes),
                ..airspace
            },
            fleet: FleetRules {
                max_active_flights: env_or("ATC_MAX_FLIGHTS", fleet.max_active_flights),
                fuel_burn_per_move: env_or("ATC_FUEL_BURN", fleet.fuel_burn_per_move),
                low_fuel_threshold: env_or("ATC_LOW_FUEL", fleet.low_fuel_threshold),
                ..fleet
            },
            snapshot_path: env::var("ATC_SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("atc_data.json")),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
