//! Airspace graph: topology, shortest paths and node occupancy.
//!
//! Nodes are stored in insertion order; that order is also the tie-breaker
//! when two candidates share a tentative distance, so path selection is
//! deterministic for a fixed graph and insertion sequence.

use crate::error::GraphError;
use crate::models::{Edge, Node, NodeId, NodeKind, Route};
use crate::rules::AirspaceRules;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Weighted directed graph of airports and waypoints.
#[derive(Debug, Clone, Default)]
pub struct AirspaceGraph {
    rules: AirspaceRules,
    nodes: Vec<Node>,
    /// Outgoing edges, parallel to `nodes`
    adjacency: Vec<Vec<Edge>>,
    slots: HashMap<NodeId, usize>,
    names: HashMap<String, NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    distance: u64,
    slot: usize,
}

/// Distances and parent links from a single source, indexed by slot.
struct SearchTree {
    distance: Vec<Option<u64>>,
    parent: Vec<Option<usize>>,
}

impl AirspaceGraph {
    pub fn new(rules: AirspaceRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn rules(&self) -> &AirspaceRules {
        &self.rules
    }

    pub fn add_node(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        x: i32,
        y: i32,
        kind: NodeKind,
    ) -> Result<(), GraphError> {
        let name = name.into();
        if self.nodes.len() >= self.rules.max_nodes {
            return Err(GraphError::CapacityExhausted(self.rules.max_nodes));
        }
        if !self.rules.contains(x, y) {
            return Err(GraphError::OutOfBounds {
                x,
                y,
                width: self.rules.grid_width,
                height: self.rules.grid_height,
            });
        }
        if self.slots.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        if self.names.contains_key(&name) {
            return Err(GraphError::DuplicateName(name));
        }

        tracing::debug!("Node added: {} (id {}) at ({}, {})", name, id, x, y);
        self.slots.insert(id, self.nodes.len());
        self.names.insert(name.clone(), id);
        self.nodes.push(Node::new(id, name, x, y, kind));
        self.adjacency.push(Vec::new());
        Ok(())
    }

    /// Add a directed corridor. Bidirectional corridors need both directions.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: u32) -> Result<(), GraphError> {
        let from_slot = self.slot(from)?;
        self.slot(to)?;
        self.adjacency[from_slot].push(Edge { to, weight });
        tracing::debug!("Edge added: {} -> {} ({} km)", from, to, weight);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(&id).map(|&slot| &self.nodes[slot])
    }

    pub fn node_id_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.node_id_by_name(name).and_then(|id| self.node(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges_from(&self, id: NodeId) -> Option<&[Edge]> {
        self.slots
            .get(&id)
            .map(|&slot| self.adjacency[slot].as_slice())
    }

    /// Lightest corridor from `from` to `to`, if any.
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<u32> {
        self.edges_from(from)?
            .iter()
            .filter(|edge| edge.to == to)
            .map(|edge| edge.weight)
            .min()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Summed weight along `path`, or `None` if two consecutive entries
    /// are not connected.
    pub fn path_weight(&self, path: &[NodeId]) -> Option<u64> {
        path.windows(2).try_fold(0u64, |total, pair| {
            self.edge_weight(pair[0], pair[1])
                .map(|weight| total + u64::from(weight))
        })
    }

    /// Dijkstra shortest path. An unreachable target yields
    /// [`Route::unreachable`], not an error.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> Result<Route, GraphError> {
        let source = self.slot(from)?;
        let target = self.slot(to)?;

        let tree = self.search(source, Some(target));
        let Some(distance) = tree.distance[target] else {
            tracing::debug!("No path exists from {} to {}", from, to);
            return Ok(Route::unreachable());
        };

        let mut nodes = Vec::new();
        let mut current = Some(target);
        while let Some(slot) = current {
            nodes.push(self.nodes[slot].id);
            current = tree.parent[slot];
        }
        nodes.reverse();

        Ok(Route {
            nodes,
            distance: Some(distance),
        })
    }

    /// Closest airport other than `from`. Falls back to `from` itself when it
    /// is an airport and no other airport is reachable.
    pub fn nearest_airport(&self, from: NodeId) -> Result<Option<NodeId>, GraphError> {
        let source = self.slot(from)?;
        let tree = self.search(source, None);

        let nearest = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(slot, node)| *slot != source && node.is_airport())
            .filter_map(|(slot, node)| tree.distance[slot].map(|d| (d, slot, node.id)))
            .min()
            .map(|(_, _, id)| id);

        Ok(nearest.or_else(|| self.nodes[source].is_airport().then_some(from)))
    }

    /// Shortest route from `from` to its nearest airport, or `None` when no
    /// airport is reachable.
    pub fn route_to_nearest_airport(&self, from: NodeId) -> Result<Option<Route>, GraphError> {
        match self.nearest_airport(from)? {
            Some(airport) => self.shortest_path(from, airport).map(Some),
            None => Ok(None),
        }
    }

    pub fn is_occupied(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_occupied)
    }

    pub fn occupant(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|node| node.occupied_by.as_deref())
    }

    /// Reserve `id` for `flight_id` unless another flight holds it.
    /// Re-reserving a node already held by the same flight succeeds.
    pub(crate) fn try_occupy(&mut self, id: NodeId, flight_id: &str) -> Result<(), GraphError> {
        let slot = self.slot(id)?;
        let node = &mut self.nodes[slot];
        match node.occupied_by.as_deref() {
            Some(occupant) if occupant != flight_id => Err(GraphError::Occupied {
                node: id,
                occupant: occupant.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                node.occupied_by = Some(flight_id.to_string());
                Ok(())
            }
        }
    }

    /// Free `id` if `flight_id` holds it. Returns whether anything changed.
    pub(crate) fn release(&mut self, id: NodeId, flight_id: &str) -> bool {
        let Some(&slot) = self.slots.get(&id) else {
            return false;
        };
        let node = &mut self.nodes[slot];
        if node.occupied_by.as_deref() == Some(flight_id) {
            node.occupied_by = None;
            true
        } else {
            false
        }
    }

    fn slot(&self, id: NodeId) -> Result<usize, GraphError> {
        self.slots
            .get(&id)
            .copied()
            .ok_or(GraphError::UnknownNode(id))
    }

    fn search(&self, source: usize, target: Option<usize>) -> SearchTree {
        let count = self.nodes.len();
        let mut distance: Vec<Option<u64>> = vec![None; count];
        let mut parent: Vec<Option<usize>> = vec![None; count];
        let mut closed = vec![false; count];

        distance[source] = Some(0);
        let mut open_set = BinaryHeap::new();
        open_set.push(Reverse(OpenNode {
            distance: 0,
            slot: source,
        }));

        while let Some(Reverse(current)) = open_set.pop() {
            if closed[current.slot] {
                continue;
            }
            closed[current.slot] = true;
            if target == Some(current.slot) {
                break;
            }

            for edge in &self.adjacency[current.slot] {
                let Some(&next) = self.slots.get(&edge.to) else {
                    continue;
                };
                if closed[next] {
                    continue;
                }
                let tentative = current.distance + u64::from(edge.weight);
                if distance[next].map_or(true, |best| tentative < best) {
                    distance[next] = Some(tentative);
                    parent[next] = Some(current.slot);
                    open_set.push(Reverse(OpenNode {
                        distance: tentative,
                        slot: next,
                    }));
                }
            }
        }

        SearchTree { distance, parent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> AirspaceGraph {
        let mut graph = AirspaceGraph::default();
        graph.add_node(1, "A", 0, 0, NodeKind::Airport).unwrap();
        graph.add_node(2, "B", 1, 1, NodeKind::Waypoint).unwrap();
        graph.add_node(3, "C", 2, 2, NodeKind::Airport).unwrap();
        graph.add_edge(1, 2, 10).unwrap();
        graph.add_edge(2, 3, 10).unwrap();
        graph.add_edge(1, 3, 25).unwrap();
        graph
    }

    #[test]
    fn shortest_path_prefers_lighter_two_hop_route() {
        let graph = triangle();
        let route = graph.shortest_path(1, 3).unwrap();
        assert_eq!(route.nodes, vec![1, 2, 3]);
        assert_eq!(route.distance, Some(20));
        assert_eq!(graph.path_weight(&route.nodes), Some(20));
    }

    #[test]
    fn unreachable_target_yields_empty_route() {
        let graph = triangle();
        let route = graph.shortest_path(3, 1).unwrap();
        assert!(route.nodes.is_empty());
        assert!(!route.is_reachable());
    }

    #[test]
    fn path_to_self_is_single_node() {
        let graph = triangle();
        let route = graph.shortest_path(2, 2).unwrap();
        assert_eq!(route.nodes, vec![2]);
        assert_eq!(route.distance, Some(0));
    }

    #[test]
    fn unknown_endpoint_is_reported() {
        let graph = triangle();
        assert_eq!(graph.shortest_path(1, 99), Err(GraphError::UnknownNode(99)));
    }

    #[test]
    fn equal_cost_ties_follow_node_insertion_order() {
        // Two 10 km routes A->B->D and A->C->D; B was inserted before C.
        let mut graph = AirspaceGraph::default();
        graph.add_node(10, "A", 0, 0, NodeKind::Airport).unwrap();
        graph.add_node(20, "B", 1, 0, NodeKind::Waypoint).unwrap();
        graph.add_node(30, "C", 0, 1, NodeKind::Waypoint).unwrap();
        graph.add_node(40, "D", 1, 1, NodeKind::Airport).unwrap();
        graph.add_edge(10, 30, 5).unwrap();
        graph.add_edge(30, 40, 5).unwrap();
        graph.add_edge(10, 20, 5).unwrap();
        graph.add_edge(20, 40, 5).unwrap();

        for _ in 0..3 {
            let route = graph.shortest_path(10, 40).unwrap();
            assert_eq!(route.nodes, vec![10, 20, 40]);
            assert_eq!(route.distance, Some(10));
        }
    }

    #[test]
    fn add_node_validates_bounds_capacity_and_duplicates() {
        let mut graph = AirspaceGraph::new(AirspaceRules {
            max_nodes: 2,
            ..AirspaceRules::default()
        });
        assert!(matches!(
            graph.add_node(1, "X", 30, 0, NodeKind::Waypoint),
            Err(GraphError::OutOfBounds { .. })
        ));
        assert!(matches!(
            graph.add_node(1, "X", 0, -1, NodeKind::Waypoint),
            Err(GraphError::OutOfBounds { .. })
        ));
        graph.add_node(1, "X", 29, 19, NodeKind::Waypoint).unwrap();
        assert_eq!(
            graph.add_node(1, "Y", 0, 0, NodeKind::Waypoint),
            Err(GraphError::DuplicateId(1))
        );
        assert_eq!(
            graph.add_node(2, "X", 0, 0, NodeKind::Waypoint),
            Err(GraphError::DuplicateName("X".into()))
        );
        graph.add_node(2, "Y", 0, 0, NodeKind::Waypoint).unwrap();
        assert_eq!(
            graph.add_node(3, "Z", 0, 0, NodeKind::Waypoint),
            Err(GraphError::CapacityExhausted(2))
        );
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn add_edge_with_unknown_endpoint_is_noop() {
        let mut graph = triangle();
        let before = graph.edge_count();
        assert_eq!(graph.add_edge(1, 42, 5), Err(GraphError::UnknownNode(42)));
        assert_eq!(graph.add_edge(42, 1, 5), Err(GraphError::UnknownNode(42)));
        assert_eq!(graph.edge_count(), before);
    }

    #[test]
    fn lookups_by_id_and_name() {
        let graph = triangle();
        assert_eq!(graph.node_id_by_name("B"), Some(2));
        assert_eq!(graph.node_id_by_name("nope"), None);
        assert_eq!(graph.node(3).map(|n| n.name.as_str()), Some("C"));
        assert!(graph.node(7).is_none());
    }

    #[test]
    fn nearest_airport_skips_source_and_falls_back_to_it() {
        let graph = triangle();
        assert_eq!(graph.nearest_airport(1).unwrap(), Some(3));
        assert_eq!(graph.nearest_airport(2).unwrap(), Some(3));
        // C has no outgoing edges, but is itself an airport.
        assert_eq!(graph.nearest_airport(3).unwrap(), Some(3));
    }

    #[test]
    fn nearest_airport_none_from_isolated_waypoint() {
        let mut graph = triangle();
        graph.add_node(4, "W", 5, 5, NodeKind::Waypoint).unwrap();
        assert_eq!(graph.nearest_airport(4).unwrap(), None);
    }

    #[test]
    fn route_to_nearest_airport_follows_shortest_path() {
        let mut graph = triangle();
        let route = graph.route_to_nearest_airport(1).unwrap().unwrap();
        assert_eq!(route.nodes, vec![1, 2, 3]);
        assert_eq!(route.distance, Some(20));

        let home = graph.route_to_nearest_airport(3).unwrap().unwrap();
        assert_eq!(home.nodes, vec![3]);
        assert_eq!(home.distance, Some(0));

        graph.add_node(4, "W", 5, 5, NodeKind::Waypoint).unwrap();
        assert_eq!(graph.route_to_nearest_airport(4).unwrap(), None);
        assert_eq!(
            graph.route_to_nearest_airport(99),
            Err(GraphError::UnknownNode(99))
        );
    }

    #[test]
    fn try_occupy_is_exclusive() {
        let mut graph = triangle();
        graph.try_occupy(2, "AA1").unwrap();
        graph.try_occupy(2, "AA1").unwrap();
        assert_eq!(
            graph.try_occupy(2, "BB2"),
            Err(GraphError::Occupied {
                node: 2,
                occupant: "AA1".into()
            })
        );
        assert!(!graph.release(2, "BB2"));
        assert_eq!(graph.occupant(2), Some("AA1"));
        assert!(graph.release(2, "AA1"));
        assert!(!graph.is_occupied(2));
    }
}
