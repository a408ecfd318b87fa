//! Simulation driver: seeded airspace, generated traffic and the tick loop.

pub mod runner;
pub mod scenarios;

pub use runner::{Simulation, TickReport};
pub use scenarios::{default_airspace, random_flight_plans, FlightPlan};
