//! ATC simulator - turn-based driver for the airspace engine.
//!
//! This crate provides:
//! - a seeded default airspace and random traffic generation
//! - the tick loop with a single-runway landing queue and flight log
//! - snapshot files and environment configuration for the `atc-sim` binary

pub mod config;
pub mod persist;
pub mod sim;

pub use config::Config;
pub use persist::{load_snapshot, save_snapshot};
pub use sim::{default_airspace, random_flight_plans, FlightPlan, Simulation, TickReport};
