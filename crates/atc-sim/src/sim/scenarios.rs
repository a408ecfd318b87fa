//! Seeded airspace and traffic generation.

use atc_airspace::{AirspaceGraph, AirspaceRules, GraphError, NodeId, NodeKind, Priority};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const JFK: NodeId = 1;
pub const LHR: NodeId = 2;
pub const CDG: NodeId = 3;
pub const DXB: NodeId = 4;
pub const W1: NodeId = 5;
pub const W2: NodeId = 6;
pub const W3: NodeId = 7;
pub const W4: NodeId = 8;

const AIRCRAFT_MODELS: &[&str] = &["B737", "A320", "A330", "B777", "A380", "E190"];
const CARRIERS: &[&str] = &["AA", "BA", "AF", "EK", "DL", "LH"];

/// A flight waiting to be handed to the fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightPlan {
    pub flight_id: String,
    pub origin: NodeId,
    pub destination: NodeId,
    pub priority: Priority,
    pub model: String,
}

/// Four airports and four waypoints joined by ten one-way corridors.
pub fn default_airspace(rules: AirspaceRules) -> Result<AirspaceGraph, GraphError> {
    let mut graph = AirspaceGraph::new(rules);
    graph.add_node(JFK, "JFK", 5, 2, NodeKind::Airport)?;
    graph.add_node(LHR, "LHR", 25, 5, NodeKind::Airport)?;
    graph.add_node(CDG, "CDG", 15, 8, NodeKind::Airport)?;
    graph.add_node(DXB, "DXB", 28, 12, NodeKind::Airport)?;
    graph.add_node(W1, "W1", 10, 3, NodeKind::Waypoint)?;
    graph.add_node(W2, "W2", 20, 7, NodeKind::Waypoint)?;
    graph.add_node(W3, "W3", 5, 10, NodeKind::Waypoint)?;
    graph.add_node(W4, "W4", 23, 10, NodeKind::Waypoint)?;

    for (from, to, weight) in [
        (JFK, W1, 50),
        (W1, LHR, 100),
        (JFK, W2, 80),
        (W2, CDG, 75),
        (LHR, W2, 90),
        (W2, DXB, 120),
        (CDG, W3, 110),
        (W3, DXB, 130),
        (CDG, W4, 100),
        (W4, DXB, 85),
    ] {
        graph.add_edge(from, to, weight)?;
    }
    Ok(graph)
}

/// Draw up to `count` flight plans between airports of `graph`.
///
/// Every plan has a route to its destination and no two plans share an
/// origin, so a fresh fleet accepts all of them. Fewer than `count` plans
/// come back once the origins with an onward route run out. The same seed
/// always yields the same plans.
pub fn random_flight_plans(graph: &AirspaceGraph, count: usize, seed: u64) -> Vec<FlightPlan> {
    let airports: Vec<NodeId> = graph
        .nodes()
        .filter(|node| node.is_airport())
        .map(|node| node.id)
        .collect();
    let mut origins: Vec<(NodeId, Vec<NodeId>)> = airports
        .iter()
        .map(|&origin| {
            let reachable = airports
                .iter()
                .copied()
                .filter(|&dest| dest != origin)
                .filter(|&dest| {
                    graph
                        .shortest_path(origin, dest)
                        .is_ok_and(|route| route.is_reachable())
                })
                .collect::<Vec<_>>();
            (origin, reachable)
        })
        .filter(|(_, reachable)| !reachable.is_empty())
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut plans = Vec::with_capacity(count.min(origins.len()));
    while plans.len() < count && !origins.is_empty() {
        let (origin, reachable) = origins.swap_remove(rng.random_range(0..origins.len()));
        let destination = reachable[rng.random_range(0..reachable.len())];
        // About one plan in ten is low priority and one in twenty critical.
        let priority = match rng.random_range(0..20u8) {
            0 => Priority::Critical,
            1 | 2 => Priority::Low,
            _ => Priority::Normal,
        };
        let carrier = CARRIERS[rng.random_range(0..CARRIERS.len())];
        plans.push(FlightPlan {
            flight_id: format!("{carrier}{}", 100 + plans.len()),
            origin,
            destination,
            priority,
            model: AIRCRAFT_MODELS[rng.random_range(0..AIRCRAFT_MODELS.len())].to_string(),
        });
    }
    plans
}
