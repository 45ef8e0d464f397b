//! Extraneous-edge detection (a restricted transitive reduction).
//!
//! # Overview
//!
//! A direct edge `u → v` is **extraneous** when `v` is already reachable
//! from `u` through one of `u`'s other direct successors: some `w ≠ v` in
//! `u`'s successor list has `v` in its closure. Removing every extraneous
//! edge of `u` never shrinks `u`'s closure.
//!
//! Unlike a full transitive reduction this looks at one node's successor
//! list at a time and never adds or reroutes edges.
//!
//! # Applying results
//!
//! The engine never edits a backing store itself. [`apply_removals`] and
//! [`apply_additions`] hand the work to a caller-supplied [`EdgeEditor`].

use std::collections::BTreeSet;

use anyhow::Result;
use tracing::{info, instrument};

use crate::closure::fill_closure;
use crate::error::GraphError;
use crate::model::{ClosureMap, DirectEdgeMap, Node, ReductionResult};

/// Applies edge changes to whatever store the edges were read from.
pub trait EdgeEditor {
    /// Remove the direct edges `node → target` for every target.
    fn remove_edges(&mut self, node: &str, targets: &[Node]) -> Result<()>;

    /// Add direct edges `node → target` for every target.
    fn add_edges(&mut self, node: &str, targets: &[Node]) -> Result<()>;
}

/// Extraneous direct edges of every node of `edges`.
///
/// Every node is a key of the result, with an empty list when none of its
/// edges is redundant. Lists keep the node's successor order.
///
/// # Errors
///
/// - [`GraphError::UnknownNode`] if a successor is not a key of `edges`.
/// - [`GraphError::CycleDetected`] if the graph has a cycle.
#[instrument(skip_all, fields(nodes = edges.len()))]
pub fn extraneous(edges: &DirectEdgeMap, cache: &mut ClosureMap) -> Result<ReductionResult, GraphError> {
    let mut result = ReductionResult::new();
    for node in edges.sorted_nodes() {
        let redundant = extraneous_of(node, edges, cache)?;
        result.insert(node.clone(), redundant);
    }
    Ok(result)
}

/// Extraneous direct edges of one node.
///
/// # Errors
///
/// Same as [`extraneous`], plus [`GraphError::UnknownNode`] for `node`.
pub fn extraneous_of(
    node: &str,
    edges: &DirectEdgeMap,
    cache: &mut ClosureMap,
) -> Result<Vec<Node>, GraphError> {
    let successors = edges.get(node).ok_or_else(|| GraphError::unknown(node))?;
    for successor in successors {
        fill_closure(successor, edges, cache)?;
    }

    let redundant = successors
        .iter()
        .filter(|&v| {
            successors
                .iter()
                .filter(|&w| w != v)
                .any(|w| cache.get(w).is_some_and(|reach| reach.contains(v)))
        })
        .cloned()
        .collect();
    Ok(redundant)
}

/// Only the nodes that have at least one extraneous edge.
#[must_use]
pub fn only_with_extraneous(result: &ReductionResult) -> ReductionResult {
    result
        .iter()
        .filter(|(_, redundant)| !redundant.is_empty())
        .map(|(node, redundant)| (node.clone(), redundant.clone()))
        .collect()
}

/// Which of `candidates` must become direct successors of `node` for all of
/// them to be reachable from it, without introducing extraneous edges.
///
/// A candidate reachable from another candidate is dropped (it comes along
/// transitively), as is any candidate already in `node`'s closure and
/// `node` itself. The result is sorted.
///
/// # Errors
///
/// [`GraphError::UnknownNode`] if `node` or a candidate is not a key of
/// `edges`; [`GraphError::CycleDetected`] on cyclic input.
pub fn edges_to_add<'c>(
    node: &str,
    candidates: impl IntoIterator<Item = &'c str>,
    edges: &DirectEdgeMap,
    cache: &mut ClosureMap,
) -> Result<Vec<Node>, GraphError> {
    let candidates: BTreeSet<&str> = candidates.into_iter().collect();

    fill_closure(node, edges, cache)?;
    for candidate in &candidates {
        fill_closure(candidate, edges, cache)?;
    }

    let already = cache.get(node).ok_or_else(|| GraphError::unknown(node))?;
    let to_add = candidates
        .iter()
        .filter(|&&candidate| candidate != node && !already.contains(candidate))
        .filter(|&&candidate| {
            !candidates.iter().any(|&other| {
                other != candidate && cache.get(other).is_some_and(|reach| reach.contains(candidate))
            })
        })
        .map(|&candidate| candidate.to_string())
        .collect();
    Ok(to_add)
}

/// Remove every extraneous edge in `result` through `editor`.
///
/// Nodes without extraneous edges are not passed to the editor. Returns
/// the applied view (only nodes that had edges removed).
///
/// # Errors
///
/// [`GraphError::EditFailure`] on the first editor failure; edits already
/// applied are not rolled back.
pub fn apply_removals<E>(result: &ReductionResult, editor: &mut E) -> Result<ReductionResult, GraphError>
where
    E: EdgeEditor + ?Sized,
{
    let applied = only_with_extraneous(result);
    for (node, redundant) in &applied {
        editor
            .remove_edges(node, redundant)
            .map_err(|err| GraphError::edit(node, err))?;
        info!(node = %node, removed = redundant.len(), "extraneous edges removed");
    }
    Ok(applied)
}

/// Add `targets` as direct successors of `node` through `editor`, if any.
///
/// # Errors
///
/// [`GraphError::EditFailure`] if the editor fails.
pub fn apply_additions<E>(node: &str, targets: &[Node], editor: &mut E) -> Result<(), GraphError>
where
    E: EdgeEditor + ?Sized,
{
    if targets.is_empty() {
        return Ok(());
    }
    editor
        .add_edges(node, targets)
        .map_err(|err| GraphError::edit(node, err))?;
    info!(node = %node, added = targets.len(), "edges added");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure::closure_of;
    use crate::model::Inclusivity;

    fn graph(adjacency: &[(&str, &[&str])]) -> DirectEdgeMap {
        adjacency
            .iter()
            .map(|(node, successors)| (*node, successors.to_vec()))
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        removed: Vec<(String, Vec<Node>)>,
        added: Vec<(String, Vec<Node>)>,
        fail_on: Option<&'static str>,
    }

    impl EdgeEditor for Recorder {
        fn remove_edges(&mut self, node: &str, targets: &[Node]) -> Result<()> {
            if self.fail_on == Some(node) {
                anyhow::bail!("read-only");
            }
            self.removed.push((node.to_string(), targets.to_vec()));
            Ok(())
        }

        fn add_edges(&mut self, node: &str, targets: &[Node]) -> Result<()> {
            self.added.push((node.to_string(), targets.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn worked_example_flags_c() {
        // A → {B, C}, B → {C}, C → {}
        let edges = graph(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &[])]);
        let mut cache = ClosureMap::new();
        let result = extraneous(&edges, &mut cache).expect("reduce");

        assert_eq!(result.len(), 3, "every node is a key");
        assert_eq!(result["A"], vec!["C"]);
        assert!(result["B"].is_empty());
        assert!(result["C"].is_empty());
    }

    #[test]
    fn diamond_diagonal_is_extraneous() {
        // A → {B, C, D}, B → {D}, C → {D}
        let edges = graph(&[("A", &["B", "C", "D"]), ("B", &["D"]), ("C", &["D"]), ("D", &[])]);
        let mut cache = ClosureMap::new();
        let result = extraneous(&edges, &mut cache).expect("reduce");
        assert_eq!(result["A"], vec!["D"]);
    }

    #[test]
    fn removal_preserves_closure() {
        let edges = graph(&[
            ("A", &["B", "C", "D", "E"]),
            ("B", &["C", "E"]),
            ("C", &["D"]),
            ("D", &[]),
            ("E", &[]),
        ]);
        let mut cache = ClosureMap::new();
        let result = extraneous(&edges, &mut cache).expect("reduce");

        let reduced: DirectEdgeMap = edges
            .iter()
            .map(|(node, successors)| {
                let kept: Vec<Node> = successors
                    .iter()
                    .filter(|s| !result[node.as_str()].contains(s))
                    .cloned()
                    .collect();
                (node.clone(), kept)
            })
            .collect();

        let mut reduced_cache = ClosureMap::new();
        for node in edges.nodes() {
            let before = closure_of(node, &edges, &mut cache, Inclusivity::Exclusive).expect("before");
            let after =
                closure_of(node, &reduced, &mut reduced_cache, Inclusivity::Exclusive).expect("after");
            assert_eq!(before, after, "closure of {node} changed");
        }
        assert_eq!(reduced.get("A"), Some(&["B".to_string()][..]));
    }

    #[test]
    fn only_with_extraneous_filters_empty() {
        let edges = graph(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &[])]);
        let mut cache = ClosureMap::new();
        let result = extraneous(&edges, &mut cache).expect("reduce");
        let only = only_with_extraneous(&result);
        assert_eq!(only.len(), 1);
        assert!(only.contains_key("A"));
    }

    #[test]
    fn edges_to_add_keeps_top_level_new_candidates() {
        // N → {P}, P → {}; X → {Y}, Y → {}, Z → {}
        let edges = graph(&[("N", &["P"]), ("P", &[]), ("X", &["Y"]), ("Y", &[]), ("Z", &[])]);
        let mut cache = ClosureMap::new();
        let to_add =
            edges_to_add("N", ["Y", "X", "P", "Z", "N"], &edges, &mut cache).expect("to add");
        // Y comes with X, P is already reachable, N is the node itself.
        assert_eq!(to_add, vec!["X", "Z"]);
    }

    #[test]
    fn apply_removals_skips_clean_nodes() {
        let edges = graph(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &[])]);
        let mut cache = ClosureMap::new();
        let result = extraneous(&edges, &mut cache).expect("reduce");

        let mut editor = Recorder::default();
        let applied = apply_removals(&result, &mut editor).expect("apply");
        assert_eq!(applied.len(), 1);
        assert_eq!(editor.removed, vec![("A".to_string(), vec!["C".to_string()])]);
    }

    #[test]
    fn editor_failure_names_node() {
        let mut result = ReductionResult::new();
        result.insert("A".into(), vec!["C".into()]);
        let mut editor = Recorder {
            fail_on: Some("A"),
            ..Recorder::default()
        };
        let err = apply_removals(&result, &mut editor).expect_err("fails");
        assert!(matches!(err, GraphError::EditFailure { ref node, .. } if node == "A"));
    }

    #[test]
    fn apply_additions_ignores_empty() {
        let mut editor = Recorder::default();
        apply_additions("A", &[], &mut editor).expect("noop");
        assert!(editor.added.is_empty());
        apply_additions("A", &["B".to_string()], &mut editor).expect("add");
        assert_eq!(editor.added.len(), 1);
    }
}
