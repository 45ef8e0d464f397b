//! Graph data model: direct edges, closures and reverse adjacency.
//!
//! # Append-only maps
//!
//! [`DirectEdgeMap`] and [`ClosureMap`] never overwrite an entry. `insert`
//! returns `false` and leaves the existing value alone when the key is
//! already present, so a cache handed back in by a caller can only grow.
//!
//! # Edge direction
//!
//! An edge `A → B` means "A depends on B" (B is a direct successor of A).
//! [`ReverseAdjacency`] stores the opposite direction: `B → [A, ...]`.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Opaque node identifier, compared by value.
pub type Node = String;

/// A path from a descendant (first element) up to a root (last element).
pub type Chain = Vec<Node>;

/// Per node, the subset of its direct successors judged redundant.
pub type ReductionResult = BTreeMap<Node, Vec<Node>>;

// ---------------------------------------------------------------------------
// Inclusivity
// ---------------------------------------------------------------------------

/// Whether a reachability set includes the node it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inclusivity {
    /// Only nodes reachable through one or more edges.
    #[default]
    Exclusive,
    /// The exclusive set plus the node itself.
    Inclusive,
}

impl Inclusivity {
    /// Apply this inclusivity to an exclusive set computed for `node`.
    #[must_use]
    pub fn apply(self, node: &str, mut exclusive: BTreeSet<Node>) -> BTreeSet<Node> {
        if self == Self::Inclusive {
            exclusive.insert(node.to_string());
        }
        exclusive
    }
}

// ---------------------------------------------------------------------------
// DirectEdgeMap
// ---------------------------------------------------------------------------

/// Node → ordered direct successors, as reported by the edge provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectEdgeMap {
    edges: HashMap<Node, Vec<Node>>,
}

impl DirectEdgeMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the direct successors of `node`.
    ///
    /// Duplicate successors are dropped, keeping the first occurrence.
    /// Returns `false` (and changes nothing) if `node` is already a key.
    pub fn insert(&mut self, node: Node, successors: Vec<Node>) -> bool {
        if self.edges.contains_key(&node) {
            return false;
        }
        let mut deduped: Vec<Node> = Vec::with_capacity(successors.len());
        for successor in successors {
            if !deduped.contains(&successor) {
                deduped.push(successor);
            }
        }
        self.edges.insert(node, deduped);
        true
    }

    /// Direct successors of `node`, if it has been discovered.
    #[must_use]
    pub fn get(&self, node: &str) -> Option<&[Node]> {
        self.edges.get(node).map(Vec::as_slice)
    }

    /// Stored key and successors of `node`, borrowed from the map.
    #[must_use]
    pub fn entry_of(&self, node: &str) -> Option<(&Node, &[Node])> {
        self.edges
            .get_key_value(node)
            .map(|(key, successors)| (key, successors.as_slice()))
    }

    #[must_use]
    pub fn contains(&self, node: &str) -> bool {
        self.edges.contains_key(node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Total number of direct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Iterate over discovered nodes in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.edges.keys()
    }

    /// Discovered nodes in sorted order.
    #[must_use]
    pub fn sorted_nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.edges.keys().collect();
        nodes.sort_unstable();
        nodes
    }

    /// Iterate over `(node, successors)` in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Node, &[Node])> {
        self.edges
            .iter()
            .map(|(node, successors)| (node, successors.as_slice()))
    }

    /// Sorted copy for display and serialization.
    #[must_use]
    pub fn to_sorted(&self) -> BTreeMap<Node, Vec<Node>> {
        self.edges
            .iter()
            .map(|(node, successors)| (node.clone(), successors.clone()))
            .collect()
    }

    /// BLAKE3 fingerprint of the sorted edge list.
    ///
    /// Two maps with the same nodes and the same successor sets hash equal,
    /// regardless of insertion order.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for node in self.sorted_nodes() {
            hasher.update(node.as_bytes());
            hasher.update(b"\x00");
            let mut successors: Vec<&Node> = self.edges[node].iter().collect();
            successors.sort_unstable();
            for successor in successors {
                hasher.update(successor.as_bytes());
                hasher.update(b"\x01");
            }
            hasher.update(b"\x00");
        }
        format!("blake3:{}", hasher.finalize())
    }
}

impl<K, V, S> FromIterator<(K, V)> for DirectEdgeMap
where
    K: Into<Node>,
    V: IntoIterator<Item = S>,
    S: Into<Node>,
{
    /// Build from `(node, successors)` pairs. The first entry for a node wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (node, successors) in iter {
            map.insert(node.into(), successors.into_iter().map(Into::into).collect());
        }
        map
    }
}

// ---------------------------------------------------------------------------
// ClosureMap
// ---------------------------------------------------------------------------

/// Node → every node transitively reachable from it (exclusive).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClosureMap {
    closures: HashMap<Node, BTreeSet<Node>>,
}

impl ClosureMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the exclusive closure of `node`. Returns `false` if one is
    /// already cached; the cached value is kept.
    pub fn insert(&mut self, node: Node, closure: BTreeSet<Node>) -> bool {
        if self.closures.contains_key(&node) {
            return false;
        }
        self.closures.insert(node, closure);
        true
    }

    #[must_use]
    pub fn get(&self, node: &str) -> Option<&BTreeSet<Node>> {
        self.closures.get(node)
    }

    /// Cached closure of `node` with the requested inclusivity.
    #[must_use]
    pub fn closure(&self, node: &str, inclusivity: Inclusivity) -> Option<BTreeSet<Node>> {
        self.closures
            .get(node)
            .map(|exclusive| inclusivity.apply(node, exclusive.clone()))
    }

    #[must_use]
    pub fn contains(&self, node: &str) -> bool {
        self.closures.contains_key(node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.closures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.closures.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Node, &BTreeSet<Node>)> {
        self.closures.iter()
    }

    /// Sorted copy with the requested inclusivity, for display.
    #[must_use]
    pub fn to_sorted(&self, inclusivity: Inclusivity) -> BTreeMap<Node, Vec<Node>> {
        self.closures
            .iter()
            .map(|(node, exclusive)| {
                let set = inclusivity.apply(node, exclusive.clone());
                (node.clone(), set.into_iter().collect())
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// GraphCache
// ---------------------------------------------------------------------------

/// Owns the direct-edge map and closure map shared across analysis calls.
///
/// Hand the same cache back into later calls to reuse everything already
/// discovered; nothing else retains state between calls.
#[derive(Debug, Clone, Default)]
pub struct GraphCache {
    pub edges: DirectEdgeMap,
    pub closures: ClosureMap,
}

impl GraphCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already expanded edge map with no closures computed.
    #[must_use]
    pub fn from_edges(edges: DirectEdgeMap) -> Self {
        Self {
            edges,
            closures: ClosureMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ReverseAdjacency
// ---------------------------------------------------------------------------

/// Node → the nodes that directly reference it.
///
/// Every node of the inverted [`DirectEdgeMap`] is a key, possibly with an
/// empty referencer list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReverseAdjacency {
    referencers: HashMap<Node, Vec<Node>>,
}

impl ReverseAdjacency {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `node` is a key, with no referencers if it is new.
    pub fn add_node(&mut self, node: &str) {
        if !self.referencers.contains_key(node) {
            self.referencers.insert(node.to_string(), Vec::new());
        }
    }

    /// Record that `referencer` has a direct edge to `node`.
    pub fn add_referencer(&mut self, node: &str, referencer: &str) {
        let list = self.referencers.entry(node.to_string()).or_default();
        if !list.iter().any(|existing| existing == referencer) {
            list.push(referencer.to_string());
        }
    }

    /// Direct referencers of `node`, if it is in the domain.
    #[must_use]
    pub fn get(&self, node: &str) -> Option<&[Node]> {
        self.referencers.get(node).map(Vec::as_slice)
    }

    /// Stored key and referencers of `node`, borrowed from the map.
    #[must_use]
    pub fn entry_of(&self, node: &str) -> Option<(&Node, &[Node])> {
        self.referencers
            .get_key_value(node)
            .map(|(key, referencers)| (key, referencers.as_slice()))
    }

    #[must_use]
    pub fn contains(&self, node: &str) -> bool {
        self.referencers.contains_key(node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.referencers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.referencers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Node, &[Node])> {
        self.referencers
            .iter()
            .map(|(node, referencers)| (node, referencers.as_slice()))
    }

    /// Sorted copy (keys and referencer lists) for display.
    #[must_use]
    pub fn to_sorted(&self) -> BTreeMap<Node, Vec<Node>> {
        self.referencers
            .iter()
            .map(|(node, referencers)| {
                let mut referencers = referencers.clone();
                referencers.sort_unstable();
                (node.clone(), referencers)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_edge_map_is_append_only() {
        let mut map = DirectEdgeMap::new();
        assert!(map.insert("A".into(), vec!["B".into()]));
        assert!(!map.insert("A".into(), vec!["C".into()]));
        assert_eq!(map.get("A"), Some(&["B".to_string()][..]));
    }

    #[test]
    fn duplicate_successors_are_dropped() {
        let map: DirectEdgeMap = [("A", vec!["B", "C", "B"])].into_iter().collect();
        assert_eq!(map.get("A").map(<[Node]>::len), Some(2));
        assert_eq!(map.edge_count(), 2);
    }

    #[test]
    fn content_hash_ignores_insertion_order() {
        let a: DirectEdgeMap = [("A", vec!["B", "C"]), ("B", vec![]), ("C", vec![])]
            .into_iter()
            .collect();
        let b: DirectEdgeMap = [("C", vec![]), ("B", vec![]), ("A", vec!["C", "B"])]
            .into_iter()
            .collect();
        assert_eq!(a.content_hash(), b.content_hash());
        assert!(a.content_hash().starts_with("blake3:"));
    }

    #[test]
    fn content_hash_changes_with_edges() {
        let a: DirectEdgeMap = [("A", vec!["B"]), ("B", vec![])].into_iter().collect();
        let b: DirectEdgeMap = [("A", Vec::<&str>::new()), ("B", vec![])]
            .into_iter()
            .collect();
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn closure_map_keeps_first_value() {
        let mut closures = ClosureMap::new();
        assert!(closures.insert("A".into(), BTreeSet::from(["B".to_string()])));
        assert!(!closures.insert("A".into(), BTreeSet::new()));
        assert_eq!(closures.get("A").map(BTreeSet::len), Some(1));
    }

    #[test]
    fn inclusive_closure_adds_self() {
        let mut closures = ClosureMap::new();
        closures.insert("A".into(), BTreeSet::from(["B".to_string()]));
        let inclusive = closures.closure("A", Inclusivity::Inclusive).unwrap_or_default();
        assert!(inclusive.contains("A"));
        assert!(inclusive.contains("B"));
        let exclusive = closures.closure("A", Inclusivity::Exclusive).unwrap_or_default();
        assert!(!exclusive.contains("A"));
    }

    #[test]
    fn reverse_adjacency_dedupes_referencers() {
        let mut reverse = ReverseAdjacency::new();
        reverse.add_referencer("C", "A");
        reverse.add_referencer("C", "A");
        reverse.add_node("A");
        assert_eq!(reverse.get("C"), Some(&["A".to_string()][..]));
        assert_eq!(reverse.get("A"), Some(&[][..]));
    }
}
