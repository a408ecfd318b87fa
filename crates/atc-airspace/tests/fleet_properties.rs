//! End-to-end properties of the routing and collision-avoidance engine.

use atc_airspace::{
    AircraftRegistry, AirspaceGraph, FleetError, FleetManager, FleetRules, FleetSnapshot,
    FlightStatus, MoveOutcome, NodeId, NodeKind, Priority,
};
use std::collections::HashSet;
use std::sync::Arc;

const JFK: NodeId = 1;
const LHR: NodeId = 2;
const CDG: NodeId = 3;
const DXB: NodeId = 4;
const W1: NodeId = 5;
const W2: NodeId = 6;
const W3: NodeId = 7;
const W4: NodeId = 8;

fn airspace() -> AirspaceGraph {
    let mut graph = AirspaceGraph::default();
    graph.add_node(JFK, "JFK", 5, 2, NodeKind::Airport).unwrap();
    graph.add_node(LHR, "LHR", 25, 5, NodeKind::Airport).unwrap();
    graph.add_node(CDG, "CDG", 15, 8, NodeKind::Airport).unwrap();
    graph.add_node(DXB, "DXB", 28, 12, NodeKind::Airport).unwrap();
    graph.add_node(W1, "W1", 10, 3, NodeKind::Waypoint).unwrap();
    graph.add_node(W2, "W2", 20, 7, NodeKind::Waypoint).unwrap();
    graph.add_node(W3, "W3", 5, 10, NodeKind::Waypoint).unwrap();
    graph.add_node(W4, "W4", 23, 10, NodeKind::Waypoint).unwrap();
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
        graph.add_edge(from, to, weight).unwrap();
    }
    graph
}

fn assert_exclusive(fleet: &FleetManager) {
    let mut held = HashSet::new();
    for flight in fleet.flights() {
        assert!(
            held.insert(flight.current_node),
            "node {} shared",
            flight.current_node
        );
    }
    assert!(fleet.occupancy_consistent());
}

#[test]
fn seeded_routes_are_optimal_and_valid() {
    let graph = airspace();
    let route = graph.shortest_path(JFK, DXB).unwrap();
    assert_eq!(route.nodes, vec![JFK, W2, DXB]);
    assert_eq!(route.distance, Some(200));

    let route = graph.shortest_path(LHR, DXB).unwrap();
    assert_eq!(route.nodes, vec![LHR, W2, DXB]);
    assert_eq!(graph.path_weight(&route.nodes), route.distance);

    assert!(!graph.shortest_path(DXB, JFK).unwrap().is_reachable());
    assert_eq!(graph.nearest_airport(W3).unwrap(), Some(DXB));
    assert_eq!(graph.nearest_airport(JFK).unwrap(), Some(LHR));
}

#[test]
fn active_paths_start_at_origin_end_at_destination_and_follow_corridors() {
    let mut fleet = FleetManager::new(airspace(), FleetRules::default());
    fleet.add_flight("AA100", JFK, DXB, Priority::Normal, "B737").unwrap();
    fleet.add_flight("BA200", LHR, CDG, Priority::Normal, "A320").unwrap();
    fleet.add_flight("AF300", CDG, DXB, Priority::Normal, "A330").unwrap();

    for flight in fleet.flights() {
        assert_eq!(flight.path.first(), Some(&flight.current_node));
        assert_eq!(flight.path.last(), Some(&flight.destination));
        let expected = fleet
            .graph()
            .shortest_path(flight.current_node, flight.destination)
            .unwrap();
        assert_eq!(fleet.graph().path_weight(&flight.path), expected.distance);
    }
}

#[test]
fn traffic_through_shared_waypoint_stays_exclusive() {
    let registry = Arc::new(AircraftRegistry::new());
    let mut fleet = FleetManager::new(airspace(), FleetRules::default()).with_registry(registry.clone());
    // Both route through W2.
    fleet.add_flight("AA100", JFK, DXB, Priority::Normal, "B737").unwrap();
    fleet.add_flight("BA200", LHR, CDG, Priority::Normal, "A320").unwrap();

    assert!(matches!(
        fleet.move_next("AA100").unwrap(),
        MoveOutcome::Moved { node: W2, .. }
    ));
    assert_exclusive(&fleet);

    let before = fleet.get("BA200").cloned().unwrap();
    let outcome = fleet.move_next("BA200").unwrap();
    assert_eq!(
        outcome,
        MoveOutcome::Blocked {
            node: W2,
            occupant: "AA100".into()
        }
    );
    assert_eq!(fleet.get("BA200"), Some(&before));
    assert_exclusive(&fleet);

    fleet.move_next("AA100").unwrap();
    assert!(matches!(
        fleet.move_next("BA200").unwrap(),
        MoveOutcome::Moved { node: W2, .. }
    ));
    assert_exclusive(&fleet);
    assert_eq!(registry.len(), 2);
}

#[test]
fn full_lifecycle_lands_and_frees_node() {
    let mut fleet = FleetManager::new(airspace(), FleetRules::default());
    fleet.add_flight("EK1", CDG, DXB, Priority::Normal, "A380").unwrap();
    assert_eq!(fleet.get("EK1").unwrap().path, vec![CDG, W4, DXB]);

    let mut moves = 0;
    while fleet.get("EK1").unwrap().status != FlightStatus::Approaching {
        fleet.move_next("EK1").unwrap();
        moves += 1;
    }
    assert_eq!(moves, 2);
    assert_eq!(fleet.get("EK1").unwrap().cursor, 2);

    fleet.land("EK1").unwrap();
    assert!(!fleet.exists("EK1"));
    assert!(!fleet.graph().is_occupied(DXB));
    assert_eq!(
        fleet.move_next("EK1"),
        Err(FleetError::NotFound("EK1".into()))
    );
}

#[test]
fn capacity_bound_rejects_extra_flights() {
    let rules = FleetRules {
        max_active_flights: 2,
        ..FleetRules::default()
    };
    let mut fleet = FleetManager::new(airspace(), rules);
    fleet.add_flight("F1", JFK, DXB, Priority::Normal, "A320").unwrap();
    fleet.add_flight("F2", LHR, DXB, Priority::Normal, "A320").unwrap();
    assert_eq!(
        fleet.add_flight("F3", CDG, DXB, Priority::Normal, "A320").unwrap_err(),
        FleetError::CapacityReached(2)
    );
    assert_eq!(fleet.len(), 2);
}

#[test]
fn snapshot_round_trip_reproduces_every_flight() {
    let mut fleet = FleetManager::new(airspace(), FleetRules::default());
    fleet.add_flight("AA100", JFK, DXB, Priority::Normal, "B737").unwrap();
    fleet.add_flight("AF300", CDG, DXB, Priority::Low, "A330").unwrap();
    fleet.move_next("AA100").unwrap();
    fleet.move_next("AF300").unwrap();
    fleet.move_next("AF300").unwrap();
    fleet.update_fuel("AA100", 42).unwrap();
    fleet.declare_emergency("AF300", Priority::Critical).unwrap();

    let json = fleet.snapshot().to_json().unwrap();
    let snapshot = FleetSnapshot::from_json(&json).unwrap();
    assert_eq!(snapshot.flight_count(), 2);

    let mut reloaded = FleetManager::new(airspace(), FleetRules::default());
    reloaded.restore(snapshot).unwrap();

    let original: Vec<_> = fleet.flights().cloned().collect();
    let restored: Vec<_> = reloaded.flights().cloned().collect();
    assert_eq!(original, restored);
    for flight in &restored {
        assert_eq!(
            reloaded.graph().occupant(flight.current_node),
            Some(flight.flight_id.as_str())
        );
    }
    assert_exclusive(&reloaded);
    assert_eq!(reloaded.get("AF300").unwrap().status, FlightStatus::Approaching);
}

#[test]
fn fuel_floor_holds_over_long_routes() {
    let rules = FleetRules {
        initial_fuel: 3,
        fuel_burn_per_move: 2,
        ..FleetRules::default()
    };
    let mut fleet = FleetManager::new(airspace(), rules);
    fleet.add_flight("LOW", JFK, DXB, Priority::LowFuel, "C172").unwrap();
    for _ in 0..10 {
        fleet.move_next("LOW").unwrap();
        assert!(fleet.get("LOW").unwrap().fuel <= 3);
    }
    assert_eq!(fleet.get("LOW").unwrap().fuel, 0);
}
