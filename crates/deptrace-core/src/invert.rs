//! Graph inversion: direct edges → referencers.

use tracing::instrument;

use crate::model::{DirectEdgeMap, ReverseAdjacency};

/// Build the reverse adjacency of `edges`.
///
/// Every key of `edges` is a key of the result, with an empty list when
/// nothing references it. Successors that are not keys of `edges` are added
/// as keys too, so lookups of any node named in the map succeed.
///
/// Keys are visited in sorted order, so each referencer list is sorted.
#[must_use]
#[instrument(skip_all, fields(nodes = edges.len()))]
pub fn invert(edges: &DirectEdgeMap) -> ReverseAdjacency {
    let mut reverse = ReverseAdjacency::new();
    for node in edges.sorted_nodes() {
        reverse.add_node(node);
    }
    for node in edges.sorted_nodes() {
        for successor in edges.get(node).unwrap_or_default() {
            reverse.add_referencer(successor, node);
        }
    }
    reverse
}

/// Invert a reverse adjacency back into direct edges over the same domain.
#[must_use]
pub fn revert(reverse: &ReverseAdjacency) -> DirectEdgeMap {
    let mut forward = ReverseAdjacency::new();
    for (node, referencers) in reverse.to_sorted() {
        forward.add_node(&node);
        for referencer in &referencers {
            forward.add_referencer(referencer, &node);
        }
    }
    forward
        .to_sorted()
        .into_iter()
        .collect()
}
