//! Frontier expansion with memoized edge discovery.
//!
//! # Overview
//!
//! Starting from a set of seed nodes, [`expand`] discovers the direct edges
//! of every node reachable from the seeds. Each node is handed to the
//! [`EdgeProvider`] at most once: a node that is already a key of the edge
//! map is never looked up again, and the worklist never holds a node twice.
//!
//! # Lookup failures
//!
//! What happens when the provider fails is an explicit [`LookupPolicy`]:
//! `Absorb` records the node with an empty successor list and continues,
//! `Propagate` aborts with [`GraphError::LookupFailure`]. Entries written
//! before an abort stay in the map (it is append-only and they are valid).

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::{debug, instrument, warn};

use crate::config::LookupPolicy;
use crate::error::GraphError;
use crate::model::{DirectEdgeMap, Node};
use crate::provider::EdgeProvider;

/// Counters describing one expansion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    /// Nodes handed to the provider.
    pub lookups: usize,
    /// Lookups that failed and were recorded with no successors.
    pub absorbed: usize,
}

/// Discover the direct edges of every node reachable from `seeds`.
///
/// # Errors
///
/// Returns [`GraphError::LookupFailure`] under [`LookupPolicy::Propagate`]
/// when the provider fails for any node.
pub async fn expand<P>(
    seeds: impl IntoIterator<Item = Node>,
    provider: &P,
    policy: LookupPolicy,
) -> Result<DirectEdgeMap, GraphError>
where
    P: EdgeProvider + ?Sized,
{
    let mut edges = DirectEdgeMap::new();
    expand_into(&mut edges, seeds, provider, policy, |_| false).await?;
    Ok(edges)
}

/// Extend `edges` with everything reachable from `seeds`.
///
/// Nodes already present in `edges` are not looked up again but their
/// recorded successors are still walked. Nodes for which `is_settled`
/// returns `true` are neither looked up nor walked; the incremental merger
/// uses this to skip nodes whose closure is already cached.
///
/// # Errors
///
/// Returns [`GraphError::LookupFailure`] under [`LookupPolicy::Propagate`].
#[instrument(skip_all, fields(policy = ?policy))]
pub async fn expand_into<P, S>(
    edges: &mut DirectEdgeMap,
    seeds: impl IntoIterator<Item = Node>,
    provider: &P,
    policy: LookupPolicy,
    is_settled: S,
) -> Result<ExpansionStats, GraphError>
where
    P: EdgeProvider + ?Sized,
    S: Fn(&str) -> bool,
{
    // Deduplicated and sorted so a run is reproducible.
    let seeds: BTreeSet<Node> = seeds.into_iter().collect();

    let mut worklist: VecDeque<Node> = VecDeque::with_capacity(seeds.len());
    let mut queued: HashSet<Node> = HashSet::with_capacity(seeds.len());
    for seed in seeds {
        if !is_settled(&seed) && queued.insert(seed.clone()) {
            worklist.push_back(seed);
        }
    }

    let mut stats = ExpansionStats::default();

    while let Some(node) = worklist.pop_front() {
        if !edges.contains(&node) {
            stats.lookups += 1;
            let successors = match provider.direct_edges(&node).await {
                Ok(successors) => successors,
                Err(err) => match policy {
                    LookupPolicy::Absorb => {
                        warn!(node = %node, error = %err, "edge lookup failed; recording no edges");
                        stats.absorbed += 1;
                        Vec::new()
                    }
                    LookupPolicy::Propagate => return Err(GraphError::lookup(&node, err)),
                },
            };
            edges.insert(node.clone(), successors);
        }

        if let Some(successors) = edges.get(&node) {
            for successor in successors {
                if is_settled(successor) || queued.contains(successor.as_str()) {
                    continue;
                }
                queued.insert(successor.clone());
                worklist.push_back(successor.clone());
            }
        }
    }

    debug!(
        discovered = queued.len(),
        lookups = stats.lookups,
        absorbed = stats.absorbed,
        "frontier expanded"
    );

    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::FnProvider;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Provider backed by a fixed adjacency list that counts lookups.
    struct Counting {
        adjacency: HashMap<&'static str, Vec<&'static str>>,
        failing: HashSet<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl Counting {
        fn new(adjacency: &[(&'static str, &[&'static str])]) -> Self {
            Self {
                adjacency: adjacency.iter().map(|(n, s)| (*n, s.to_vec())).collect(),
                failing: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, node: &'static str) -> Self {
            self.failing.insert(node);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock").clone()
        }
    }

    #[async_trait::async_trait]
    impl EdgeProvider for Counting {
        async fn direct_edges(&self, node: &str) -> anyhow::Result<Vec<Node>> {
            self.calls.lock().expect("lock").push(node.to_string());
            if self.failing.contains(node) {
                anyhow::bail!("cannot read {node}");
            }
            Ok(self
                .adjacency
                .get(node)
                .map(|s| s.iter().map(ToString::to_string).collect())
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn every_reachable_node_becomes_a_key_once() {
        // A → {B, C}, B → {C}, C → {}
        let provider = Counting::new(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &[])]);
        let edges = expand(["A".to_string()], &provider, LookupPolicy::Absorb)
            .await
            .expect("expand");

        assert_eq!(edges.len(), 3);
        assert_eq!(edges.get("A").map(<[Node]>::len), Some(2));

        let mut calls = provider.calls();
        calls.sort();
        assert_eq!(calls, vec!["A", "B", "C"], "C looked up once despite two referencers");
    }

    #[tokio::test]
    async fn duplicate_seeds_are_looked_up_once() {
        let provider = Counting::new(&[("A", &[])]);
        let edges = expand(
            ["A".to_string(), "A".to_string()],
            &provider,
            LookupPolicy::Absorb,
        )
        .await
        .expect("expand");
        assert_eq!(edges.len(), 1);
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn absorb_records_failed_node_with_no_edges() {
        let provider = Counting::new(&[]).failing("X");
        let edges = expand(["X".to_string()], &provider, LookupPolicy::Absorb)
            .await
            .expect("absorbed");
        assert_eq!(edges.get("X"), Some(&[][..]));
    }

    #[tokio::test]
    async fn propagate_fails_with_the_node() {
        let provider = Counting::new(&[]).failing("X");
        let err = expand(["X".to_string()], &provider, LookupPolicy::Propagate)
            .await
            .expect_err("propagated");
        assert!(matches!(err, GraphError::LookupFailure { ref node, .. } if node == "X"));
    }

    #[tokio::test]
    async fn absorbed_failure_does_not_hide_siblings() {
        // A → {X, B}; X fails; B → {C}
        let provider =
            Counting::new(&[("A", &["X", "B"]), ("B", &["C"]), ("C", &[])]).failing("X");
        let mut edges = DirectEdgeMap::new();
        let stats = expand_into(
            &mut edges,
            ["A".to_string()],
            &provider,
            LookupPolicy::Absorb,
            |_| false,
        )
        .await
        .expect("expand");

        assert_eq!(stats.lookups, 4);
        assert_eq!(stats.absorbed, 1);
        assert!(edges.contains("C"));
    }

    #[tokio::test]
    async fn known_nodes_are_walked_but_not_looked_up() {
        let provider = Counting::new(&[("C", &["D"]), ("D", &[])]);
        let mut edges: DirectEdgeMap = [("A", vec!["C"])].into_iter().collect();

        expand_into(
            &mut edges,
            ["A".to_string()],
            &provider,
            LookupPolicy::Absorb,
            |_| false,
        )
        .await
        .expect("expand");

        let mut calls = provider.calls();
        calls.sort();
        assert_eq!(calls, vec!["C", "D"]);
        assert!(edges.contains("D"));
    }

    #[tokio::test]
    async fn settled_nodes_are_skipped() {
        let provider = FnProvider::new(|node: &str| match node {
            "A" => Ok(vec!["B".to_string()]),
            other => anyhow::bail!("unexpected lookup of {other}"),
        });
        let mut edges = DirectEdgeMap::new();
        expand_into(
            &mut edges,
            ["A".to_string()],
            &provider,
            LookupPolicy::Propagate,
            |node| node == "B",
        )
        .await
        .expect("B is never looked up");
        assert!(!edges.contains("B"));
    }
}
