//! Dependency-chain enumeration over reverse adjacency.
//!
//! # Overview
//!
//! A chain is a path of direct edges connecting a descendant node to a root
//! node. [`chains`] starts at the descendant (`target`) and walks *up* the
//! referencer lists until it reaches `root`, so every distinct path is found:
//! a diamond below the root yields one chain per side.
//!
//! # Output shape
//!
//! Each chain starts with `target` and ends with `root`. Reading it left to
//! right follows reverse-adjacency edges; read right to left it follows the
//! direct edges `root → … → target`.
//!
//! Chain order follows the referencer order in [`ReverseAdjacency`]; callers
//! that need a canonical order sort afterwards.
//!
//! # Memoization and cycles
//!
//! The climb only visits nodes that `root` reaches, itself included.
//! Referencers outside that set cannot lie on a chain and are skipped, so a
//! cycle among them never fails the call.
//!
//! Chains from `root` to each intermediate node are computed once per call
//! and shared by every branch that passes through that node. The walk keeps
//! an explicit stack; revisiting a node that is still on it is a cycle and
//! fails with [`GraphError::CycleDetected`].

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::model::{Chain, Node, ReverseAdjacency};

struct Frame<'a> {
    node: &'a Node,
    referencers: &'a [Node],
    next: usize,
}

/// Every chain from `target` up to `root`.
///
/// `chains(x, x)` is exactly `[[x]]`. A target that `root` does not reach
/// yields no chains.
///
/// # Errors
///
/// - [`GraphError::UnknownNode`] if `root` or `target` is not in the domain
///   of `reverse`.
/// - [`GraphError::CycleDetected`] if a cycle lies between them. Cycles
///   that `root` does not reach are ignored.
#[instrument(skip(reverse))]
pub fn chains(root: &str, target: &str, reverse: &ReverseAdjacency) -> Result<Vec<Chain>, GraphError> {
    if !reverse.contains(root) {
        return Err(GraphError::unknown(root));
    }
    let (target_key, target_referencers) =
        reverse.entry_of(target).ok_or_else(|| GraphError::unknown(target))?;

    let reached = reachable_from(root, reverse);
    if !reached.contains(target) {
        debug!("target not under root");
        return Ok(Vec::new());
    }

    // Paths are built root-first (each node appended after its referencer)
    // and flipped on the way out.
    let mut memo: HashMap<&str, Vec<Chain>> = HashMap::new();
    memo.insert(root, vec![vec![root.to_string()]]);

    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut in_progress: HashSet<&str> = HashSet::new();
    if !memo.contains_key(target) {
        in_progress.insert(target_key.as_str());
        stack.push(Frame {
            node: target_key,
            referencers: target_referencers,
            next: 0,
        });
    }

    while let Some(frame) = stack.last_mut() {
        let referencers = frame.referencers;
        if let Some(referencer) = referencers.get(frame.next) {
            frame.next += 1;

            if !reached.contains(referencer.as_str()) || memo.contains_key(referencer.as_str()) {
                continue;
            }
            if in_progress.contains(referencer.as_str()) {
                return Err(cycle_error(&stack, referencer));
            }
            let (key, next_referencers) = reverse
                .entry_of(referencer)
                .ok_or_else(|| GraphError::unknown(referencer))?;

            in_progress.insert(key.as_str());
            stack.push(Frame {
                node: key,
                referencers: next_referencers,
                next: 0,
            });
        } else {
            let done = frame.node;
            stack.pop();
            in_progress.remove(done.as_str());

            let mut paths: Vec<Chain> = Vec::new();
            for referencer in referencers {
                if let Some(upstream) = memo.get(referencer.as_str()) {
                    paths.extend(upstream.iter().map(|path| {
                        let mut path = path.clone();
                        path.push(done.clone());
                        path
                    }));
                }
            }
            memo.insert(done.as_str(), paths);
        }
    }

    let found: Vec<Chain> = memo
        .remove(target)
        .unwrap_or_default()
        .into_iter()
        .map(|mut path| {
            path.reverse();
            path
        })
        .collect();

    debug!(count = found.len(), "chains enumerated");
    Ok(found)
}

/// Direct referencers of `node`.
///
/// # Errors
///
/// Returns [`GraphError::UnknownNode`] if `node` is not in the domain.
pub fn referencers<'r>(node: &str, reverse: &'r ReverseAdjacency) -> Result<&'r [Node], GraphError> {
    reverse.get(node).ok_or_else(|| GraphError::unknown(node))
}

/// Nodes `root` reaches through direct edges, `root` included, read off the
/// reverse adjacency.
fn reachable_from<'a>(root: &'a str, reverse: &'a ReverseAdjacency) -> HashSet<&'a str> {
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    for (node, referencers) in reverse.iter() {
        for referencer in referencers {
            successors.entry(referencer.as_str()).or_default().push(node.as_str());
        }
    }

    let mut reached: HashSet<&str> = HashSet::from([root]);
    let mut queue: VecDeque<&str> = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        for &next in successors.get(node).map(Vec::as_slice).unwrap_or_default() {
            if reached.insert(next) {
                queue.push_back(next);
            }
        }
    }
    reached
}

fn cycle_error(stack: &[Frame<'_>], repeated: &Node) -> GraphError {
    // The stack runs target-side first, so flip it to read in edge direction.
    let mut path: Vec<Node> = stack
        .iter()
        .skip_while(|frame| frame.node != repeated)
        .map(|frame| frame.node.clone())
        .collect();
    path.push(repeated.clone());
    path.reverse();
    GraphError::CycleDetected { path }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invert::invert;
    use crate::model::DirectEdgeMap;

    fn reverse_of(adjacency: &[(&str, &[&str])]) -> ReverseAdjacency {
        let edges: DirectEdgeMap = adjacency
            .iter()
            .map(|(node, successors)| (*node, successors.to_vec()))
            .collect();
        invert(&edges)
    }

    fn sorted(mut found: Vec<Chain>) -> Vec<Chain> {
        found.sort();
        found
    }

    #[test]
    fn worked_example_has_two_chains() {
        // A → {B, C}, B → {C}, C → {}
        let reverse = reverse_of(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &[])]);
        let found = sorted(chains("A", "C", &reverse).expect("chains"));
        assert_eq!(found, vec![vec!["C", "A"], vec!["C", "B", "A"]]);
    }

    #[test]
    fn same_node_is_a_single_chain() {
        let reverse = reverse_of(&[("A", &["B"]), ("B", &[])]);
        assert_eq!(chains("B", "B", &reverse).expect("chains"), vec![vec!["B"]]);
    }

    #[test]
    fn diamond_yields_one_chain_per_side() {
        // R → {L, M}, L → {T}, M → {T}, T → {}
        let reverse = reverse_of(&[("R", &["L", "M"]), ("L", &["T"]), ("M", &["T"]), ("T", &[])]);
        let found = sorted(chains("R", "T", &reverse).expect("chains"));
        assert_eq!(found, vec![vec!["T", "L", "R"], vec!["T", "M", "R"]]);
    }

    #[test]
    fn referencers_outside_root_are_ignored() {
        // X → T is not under R, so it contributes nothing.
        let reverse = reverse_of(&[("R", &["T"]), ("X", &["T"]), ("T", &[])]);
        let found = chains("R", "T", &reverse).expect("chains");
        assert_eq!(found, vec![vec!["T", "R"]]);
    }

    #[test]
    fn unreachable_target_has_no_chains() {
        let reverse = reverse_of(&[("R", &[]), ("T", &[])]);
        assert!(chains("R", "T", &reverse).expect("chains").is_empty());
    }

    #[test]
    fn unknown_nodes_fail() {
        let reverse = reverse_of(&[("R", &[])]);
        assert!(matches!(
            chains("Q", "R", &reverse),
            Err(GraphError::UnknownNode(ref n)) if n == "Q"
        ));
        assert!(matches!(
            chains("R", "Q", &reverse),
            Err(GraphError::UnknownNode(ref n)) if n == "Q"
        ));
    }

    #[test]
    fn cycle_above_target_is_reported() {
        // R → A, A → B, B → A, B → T
        let reverse = reverse_of(&[("R", &["A"]), ("A", &["B"]), ("B", &["A", "T"]), ("T", &[])]);
        let err = chains("R", "T", &reverse).expect_err("cycle");
        assert!(matches!(err, GraphError::CycleDetected { .. }));
    }

    #[test]
    fn cycle_outside_root_is_ignored() {
        // R → T, and X ↔ Y with Y → T. Nothing under R reaches X or Y.
        let reverse = reverse_of(&[
            ("R", &["T"]),
            ("X", &["Y"]),
            ("Y", &["X", "T"]),
            ("T", &[]),
        ]);
        let found = chains("R", "T", &reverse).expect("no cycle under R");
        assert_eq!(found, vec![vec!["T", "R"]]);
    }

    #[test]
    fn cycle_outside_root_is_ignored_for_unreached_target() {
        let reverse = reverse_of(&[("R", &[]), ("X", &["Y"]), ("Y", &["X", "T"]), ("T", &[])]);
        assert!(chains("R", "T", &reverse).expect("no cycle under R").is_empty());
    }

    #[test]
    fn referencers_lookup() {
        let reverse = reverse_of(&[("A", &["C"]), ("B", &["C"]), ("C", &[])]);
        assert_eq!(
            referencers("C", &reverse).expect("known"),
            &["A".to_string(), "B".to_string()][..]
        );
        assert!(referencers("Z", &reverse).is_err());
    }
}
