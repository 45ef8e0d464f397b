//! Memoized transitive closure over a [`DirectEdgeMap`].
//!
//! # Algorithm
//!
//! Depth-first, post-order: a node's closure is stored once every one of
//! its successors has a cached closure, and is the union of the successors
//! themselves and their closures. Every closure written to the shared
//! [`ClosureMap`] is reused by later queries, so a sub-graph shared by many
//! nodes is walked once per cache rather than once per query.
//!
//! The walk uses an explicit stack instead of recursion. Nodes on the stack
//! are "in progress"; reaching one again means the graph has a cycle and
//! the walk fails with [`GraphError::CycleDetected`] instead of looping.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{instrument, trace};

use crate::error::GraphError;
use crate::model::{ClosureMap, DirectEdgeMap, Inclusivity, Node};

struct Frame<'a> {
    node: &'a Node,
    successors: &'a [Node],
    next: usize,
}

/// Closure of `node`, computing and caching whatever is missing.
///
/// # Errors
///
/// - [`GraphError::UnknownNode`] if `node`, or a node reachable from it, is
///   not a key of `edges`.
/// - [`GraphError::CycleDetected`] if a cycle is reachable from `node`.
pub fn closure_of(
    node: &str,
    edges: &DirectEdgeMap,
    cache: &mut ClosureMap,
    inclusivity: Inclusivity,
) -> Result<BTreeSet<Node>, GraphError> {
    fill_closure(node, edges, cache)?;
    cache
        .closure(node, inclusivity)
        .ok_or_else(|| GraphError::unknown(node))
}

/// Ensure `cache` holds the exclusive closure of `node`.
///
/// # Errors
///
/// Same as [`closure_of`].
pub fn fill_closure(
    node: &str,
    edges: &DirectEdgeMap,
    cache: &mut ClosureMap,
) -> Result<(), GraphError> {
    if cache.contains(node) {
        return Ok(());
    }
    let (root, successors) = edges.entry_of(node).ok_or_else(|| GraphError::unknown(node))?;

    let mut stack: Vec<Frame<'_>> = vec![Frame {
        node: root,
        successors,
        next: 0,
    }];
    let mut in_progress: HashSet<&str> = HashSet::from([root.as_str()]);

    while let Some(frame) = stack.last_mut() {
        let successors = frame.successors;
        if let Some(successor) = successors.get(frame.next) {
            frame.next += 1;

            if cache.contains(successor) {
                continue;
            }
            if in_progress.contains(successor.as_str()) {
                return Err(cycle_error(&stack, successor));
            }
            let (key, next_successors) = edges
                .entry_of(successor)
                .ok_or_else(|| GraphError::unknown(successor))?;

            in_progress.insert(key.as_str());
            stack.push(Frame {
                node: key,
                successors: next_successors,
                next: 0,
            });
        } else {
            let done = frame.node;
            stack.pop();
            in_progress.remove(done.as_str());

            let mut closure: BTreeSet<Node> = BTreeSet::new();
            for successor in successors {
                closure.insert(successor.clone());
                if let Some(reachable) = cache.get(successor) {
                    closure.extend(reachable.iter().cloned());
                }
            }
            trace!(node = %done, size = closure.len(), "closure cached");
            cache.insert(done.clone(), closure);
        }
    }

    Ok(())
}

/// Compute the exclusive closure of every key of `edges` into `cache`.
///
/// Keys are processed in sorted order; shared sub-closures are computed
/// once because all of them go through the same cache.
///
/// # Errors
///
/// Same as [`closure_of`].
#[instrument(skip_all, fields(nodes = edges.len()))]
pub fn fill_all(edges: &DirectEdgeMap, cache: &mut ClosureMap) -> Result<(), GraphError> {
    for node in edges.sorted_nodes() {
        fill_closure(node, edges, cache)?;
    }
    Ok(())
}

/// Exclusive closures for every key of `edges`, in a fresh cache.
///
/// # Errors
///
/// Same as [`closure_of`].
pub fn build_closures(edges: &DirectEdgeMap) -> Result<ClosureMap, GraphError> {
    let mut cache = ClosureMap::new();
    fill_all(edges, &mut cache)?;
    Ok(cache)
}

/// Union of the closures of all `seeds`.
///
/// With [`Inclusivity::Exclusive`] a seed only appears in the result if it
/// is reachable from another seed; with [`Inclusivity::Inclusive`] every
/// seed is included.
///
/// # Errors
///
/// Same as [`closure_of`].
pub fn all_reachable<'s>(
    seeds: impl IntoIterator<Item = &'s str>,
    edges: &DirectEdgeMap,
    cache: &mut ClosureMap,
    inclusivity: Inclusivity,
) -> Result<BTreeSet<Node>, GraphError> {
    let mut reachable: BTreeSet<Node> = BTreeSet::new();
    for seed in seeds {
        let closure = closure_of(seed, edges, cache, inclusivity)?;
        reachable.extend(closure);
    }
    Ok(reachable)
}

/// Inclusive view of an exclusive closure map: every closure plus its node.
#[must_use]
pub fn to_inclusive(closures: &ClosureMap) -> BTreeMap<Node, BTreeSet<Node>> {
    closures
        .iter()
        .map(|(node, exclusive)| {
            (node.clone(), Inclusivity::Inclusive.apply(node, exclusive.clone()))
        })
        .collect()
}

fn cycle_error(stack: &[Frame<'_>], repeated: &Node) -> GraphError {
    let mut path: Vec<Node> = stack
        .iter()
        .skip_while(|frame| frame.node != repeated)
        .map(|frame| frame.node.clone())
        .collect();
    path.push(repeated.clone());
    GraphError::CycleDetected { path }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
