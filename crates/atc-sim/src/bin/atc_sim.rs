//! ATC simulator CLI.
//!
//! Routes and nearest-airport queries over the default airspace, and a
//! turn-based traffic simulation with optional snapshot save/resume.
//!
//! Usage:
//!   cargo run -p atc-sim -- route JFK DXB
//!   cargo run -p atc-sim -- simulate --flights 8 --ticks 30 --seed 7
//!   cargo run -p atc-sim -- inspect atc_data.json

use anyhow::{anyhow, Result};
use atc_airspace::{AirspaceGraph, NodeId};
use atc_sim::{
    default_airspace, load_snapshot, random_flight_plans, save_snapshot, Config, Simulation,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shortest route between two named nodes
    Route { from: String, to: String },
    /// Closest reachable airport from a named node, with the route there
    Nearest { from: String },
    /// Run random traffic through the default airspace
    Simulate {
        /// Flights to generate
        #[arg(long, default_value_t = 6)]
        flights: usize,

        /// Tick limit
        #[arg(long, default_value_t = 50)]
        ticks: u64,

        /// RNG seed for flight generation
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Resume from a saved snapshot instead of generating flights
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Save the final state here
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Print tick reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the flights stored in a snapshot file
    Inspect {
        /// Defaults to ATC_SNAPSHOT_PATH
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("atc_sim=info,atc_airspace=info"));
    // Logs go to stderr; stdout carries results.
    tracing_subscriber::registry()
        .with(filter)
        .with(args.log_json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!args.log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let config = Config::from_env();
    let graph = default_airspace(config.airspace.clone())?;

    match args.command {
        Command::Route { from, to } => {
            let route = graph.shortest_path(resolve(&graph, &from)?, resolve(&graph, &to)?)?;
            match route.distance {
                Some(distance) => println!("{} ({} km)", format_path(&graph, &route.nodes), distance),
                None => println!("No route from {} to {}", from, to),
            }
        }
        Command::Nearest { from } => {
            match graph.route_to_nearest_airport(resolve(&graph, &from)?)? {
                Some(route) => println!(
                    "Nearest airport to {}: {} ({} km)",
                    from,
                    format_path(&graph, &route.nodes),
                    route.distance.unwrap_or_default()
                ),
                None => println!("No airport reachable from {}", from),
            }
        }
        Command::Simulate {
            flights,
            ticks,
            seed,
            resume,
            snapshot,
            json,
        } => {
            let mut sim = Simulation::new(graph, config.fleet.clone());
            match resume {
                Some(path) => sim.restore(load_snapshot(&path)?)?,
                None => {
                    let plans = random_flight_plans(sim.fleet().graph(), flights, seed);
                    if plans.len() < flights {
                        tracing::warn!(
                            "Only {} of {} flights have a free origin with a route",
                            plans.len(),
                            flights
                        );
                    }
                    for plan in plans {
                        if let Err(err) = sim.schedule(&plan) {
                            tracing::warn!("Skipping {}: {}", plan.flight_id, err);
                        }
                    }
                }
            }
            tracing::info!("Simulating {} flights for up to {} ticks", sim.fleet().len(), ticks);

            for report in sim.run(ticks) {
                if json {
                    println!("{}", serde_json::to_string(&report)?);
                } else {
                    println!(
                        "tick {:>3}: moved {}, holding {}, queued {}, landed {}",
                        report.tick,
                        report.moved,
                        report.blocked,
                        report.queued,
                        report.landed.as_deref().unwrap_or("-")
                    );
                }
            }

            for entry in sim.flight_log().iter() {
                println!(
                    "{} {} -> {} landed {}",
                    entry.flight_id,
                    entry.origin,
                    entry.destination,
                    entry.arrival_time.format("%H:%M:%S")
                );
            }
            if let Some(path) = snapshot {
                save_snapshot(&path, &sim.snapshot())?;
            }
        }
        Command::Inspect { path } => {
            let path = path.unwrap_or(config.snapshot_path);
            let snapshot = load_snapshot(&path)?;
            println!(
                "{} flights, taken {}",
                snapshot.flight_count(),
                snapshot.taken_at.to_rfc3339()
            );
            for flight in &snapshot.flights {
                println!(
                    "{:<8} {:<11} {:<8} fuel {:>3}%  at {:<4} {}",
                    flight.flight_id,
                    flight.status.to_string(),
                    flight.priority.label(),
                    flight.fuel,
                    name_of(&graph, flight.current_node),
                    format_path(&graph, &flight.path)
                );
            }
        }
    }
    Ok(())
}

fn resolve(graph: &AirspaceGraph, name: &str) -> Result<NodeId> {
    graph
        .node_id_by_name(name)
        .ok_or_else(|| anyhow!("Unknown node: {}", name))
}

fn name_of(graph: &AirspaceGraph, id: NodeId) -> String {
    graph
        .node(id)
        .map_or_else(|| id.to_string(), |node| node.name.clone())
}

fn format_path(graph: &AirspaceGraph, path: &[NodeId]) -> String {
    path.iter()
        .map(|&id| name_of(graph, id))
        .collect::<Vec<_>>()
        .join(" -> ")
}
