//! Whole-graph cycle diagnostics.
//!
//! The closure and chain walks already fail on the first cycle they run
//! into. This module answers the broader question of *every* cycle in an
//! expanded edge map, using Tarjan's SCC algorithm over a petgraph view.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{instrument, warn};

use crate::error::GraphError;
use crate::model::{DirectEdgeMap, Node};

impl DirectEdgeMap {
    /// petgraph view of the map, plus the index of every node.
    ///
    /// Successors that are not keys still get a graph node. Nodes are added
    /// in sorted order so indices are stable for a given map.
    #[must_use]
    pub fn to_digraph(&self) -> (DiGraph<Node, ()>, HashMap<Node, NodeIndex>) {
        let mut graph: DiGraph<Node, ()> = DiGraph::new();
        let mut index: HashMap<Node, NodeIndex> = HashMap::new();

        let mut intern = |graph: &mut DiGraph<Node, ()>, node: &Node| {
            *index
                .entry(node.clone())
                .or_insert_with(|| graph.add_node(node.clone()))
        };

        for node in self.sorted_nodes() {
            let from = intern(&mut graph, node);
            for successor in self.get(node).unwrap_or_default() {
                let to = intern(&mut graph, successor);
                graph.update_edge(from, to, ());
            }
        }

        (graph, index)
    }
}

/// Every cycle in `edges`.
///
/// Each entry is the sorted member list of one strongly connected
/// component of size > 1, or a one-element list for a self-edge. The
/// list itself is sorted.
#[must_use]
#[instrument(skip_all, fields(nodes = edges.len()))]
pub fn find_cycles(edges: &DirectEdgeMap) -> Vec<Vec<Node>> {
    let (graph, _) = edges.to_digraph();

    let mut cycles: Vec<Vec<Node>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&idx| graph.find_edge(idx, idx).is_some())
        })
        .map(|component| {
            let mut members: Vec<Node> = component
                .into_iter()
                .filter_map(|idx| graph.node_weight(idx).cloned())
                .collect();
            members.sort_unstable();
            members
        })
        .collect();

    cycles.sort_unstable();
    cycles
}

/// Fail with [`GraphError::CycleDetected`] if `edges` has any cycle.
///
/// The reported path follows real edges: it starts at the smallest member
/// of the first component from [`find_cycles`], stays inside that
/// component, and ends back at the start.
///
/// # Errors
///
/// [`GraphError::CycleDetected`] when a cycle exists.
pub fn ensure_acyclic(edges: &DirectEdgeMap) -> Result<(), GraphError> {
    let cycles = find_cycles(edges);
    let Some(members) = cycles.first() else {
        return Ok(());
    };
    let path = cycle_within(members, edges);
    warn!(cycle = %path.join(" -> "), "dependency cycle found");
    Err(GraphError::CycleDetected { path })
}

/// A walk `start -> ... -> start` over edges between `members`, where
/// `start` is the first member. Shortest such walk, found breadth-first.
fn cycle_within(members: &[Node], edges: &DirectEdgeMap) -> Vec<Node> {
    let Some(start) = members.first() else {
        return Vec::new();
    };
    let inside: HashSet<&str> = members.iter().map(String::as_str).collect();
    let inside = &inside;
    let successors_inside = move |node: &str| {
        edges
            .get(node)
            .unwrap_or_default()
            .iter()
            .filter(move |successor| inside.contains(successor.as_str()))
    };

    let mut queue: VecDeque<&str> = VecDeque::from([start.as_str()]);
    let mut visited: HashSet<&str> = HashSet::from([start.as_str()]);
    let mut parent: HashMap<&str, &str> = HashMap::new();

    while let Some(current) = queue.pop_front() {
        for successor in successors_inside(current) {
            if successor == start {
                // Parent links run back from `current` to `start`.
                let mut path: Vec<Node> = vec![start.clone()];
                let mut cursor = current;
                while cursor != start.as_str() {
                    path.push(cursor.to_string());
                    cursor = parent.get(cursor).copied().unwrap_or(start.as_str());
                }
                path.push(start.clone());
                path.reverse();
                return path;
            }
            if visited.insert(successor.as_str()) {
                parent.insert(successor.as_str(), current);
                queue.push_back(successor.as_str());
            }
        }
    }

    // A strongly connected component always closes; keep the members as a
    // last resort.
    let mut path = members.to_vec();
    path.push(start.clone());
    path
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(adjacency: &[(&str, &[&str])]) -> DirectEdgeMap {
        adjacency
            .iter()
            .map(|(node, successors)| (*node, successors.to_vec()))
            .collect()
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let edges = graph(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &[])]);
        assert!(find_cycles(&edges).is_empty());
        ensure_acyclic(&edges).expect("acyclic");
    }

    #[test]
    fn reports_each_component_sorted() {
        // A ↔ B, and C → D → E → C, F → A
        let edges = graph(&[
            ("A", &["B"]),
            ("B", &["A"]),
            ("C", &["D"]),
            ("D", &["E"]),
            ("E", &["C"]),
            ("F", &["A"]),
        ]);
        assert_eq!(
            find_cycles(&edges),
            vec![vec!["A", "B"], vec!["C", "D", "E"]]
        );
    }

    #[test]
    fn self_edge_is_a_cycle() {
        let edges = graph(&[("A", &["A"]), ("B", &[])]);
        assert_eq!(find_cycles(&edges), vec![vec!["A"]]);

        let err = ensure_acyclic(&edges).expect_err("cycle");
        assert!(matches!(err, GraphError::CycleDetected { ref path } if path == &["A", "A"]));
    }

    fn assert_follows_edges(path: &[Node], edges: &DirectEdgeMap) {
        assert_eq!(path.first(), path.last(), "cycle must close: {path:?}");
        for pair in path.windows(2) {
            let successors = edges.get(&pair[0]).unwrap_or_default();
            assert!(successors.contains(&pair[1]), "{} -> {} is not an edge", pair[0], pair[1]);
        }
    }

    #[test]
    fn reported_cycle_walks_real_edges() {
        // A → C → B → A: sorted members would read A, B, C.
        let edges = graph(&[("A", &["C"]), ("C", &["B"]), ("B", &["A"])]);
        let err = ensure_acyclic(&edges).expect_err("cycle");
        let GraphError::CycleDetected { path } = err else {
            panic!("expected cycle, got {err}");
        };
        assert_eq!(path, vec!["A", "C", "B", "A"]);
        assert_follows_edges(&path, &edges);
    }

    #[test]
    fn reported_cycle_stays_inside_component() {
        // A ↔ D inside a bigger component A → B → C → A, with an exit to E.
        let edges = graph(&[
            ("A", &["B", "D", "E"]),
            ("B", &["C"]),
            ("C", &["A"]),
            ("D", &["A"]),
            ("E", &[]),
        ]);
        let err = ensure_acyclic(&edges).expect_err("cycle");
        let GraphError::CycleDetected { path } = err else {
            panic!("expected cycle, got {err}");
        };
        assert_eq!(path, vec!["A", "D", "A"]);
        assert_follows_edges(&path, &edges);
    }

    #[test]
    fn digraph_includes_dangling_successors() {
        let edges = graph(&[("A", &["Z"])]);
        let (digraph, index) = edges.to_digraph();
        assert_eq!(digraph.node_count(), 2);
        assert_eq!(digraph.edge_count(), 1);
        assert!(index.contains_key("Z"));
    }
}
