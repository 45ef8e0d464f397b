//! Incremental, idempotent extension of a closure cache.
//!
//! [`add_seeds`] grows a caller-owned [`GraphCache`] with the closures of new
//! seed nodes. Work already recorded in the cache is never redone:
//!
//! - a seed whose closure is cached is skipped outright;
//! - frontier expansion stops at nodes whose closure is cached, and never
//!   looks up a node that is already a key of the cache's edge map;
//! - seeds processed in the same call share everything earlier seeds
//!   discovered.
//!
//! The return value is exactly the set of nodes whose closure was added, so
//! calling again with the same seeds returns an empty set and leaves the
//! cache untouched.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, instrument};

use crate::closure::fill_closure;
use crate::config::LookupPolicy;
use crate::error::GraphError;
use crate::frontier::expand_into;
use crate::model::{GraphCache, Node};
use crate::provider::EdgeSource;

/// Add the closures of `seeds` to `cache`; return the nodes newly cached.
///
/// With [`EdgeSource::Fetch`] the cache's own edge map is extended through
/// the provider, following `policy`. With [`EdgeSource::Known`] the supplied
/// map is read as-is and `policy` is irrelevant.
///
/// # Errors
///
/// - [`GraphError::LookupFailure`] under [`LookupPolicy::Propagate`].
/// - [`GraphError::UnknownNode`] when a known map lacks a seed or a node
///   reachable from one.
/// - [`GraphError::CycleDetected`] when a seed reaches a cycle.
///
/// Closures cached before an error stay in the cache.
#[instrument(skip_all, fields(source = ?source, policy = ?policy))]
pub async fn add_seeds(
    cache: &mut GraphCache,
    source: EdgeSource<'_>,
    seeds: impl IntoIterator<Item = Node>,
    policy: LookupPolicy,
) -> Result<BTreeSet<Node>, GraphError> {
    let before: HashSet<Node> = cache.closures.nodes().cloned().collect();
    let seeds: BTreeSet<Node> = seeds.into_iter().collect();

    let GraphCache { edges, closures } = cache;

    for seed in &seeds {
        if closures.contains(seed) {
            continue;
        }
        match source {
            EdgeSource::Fetch(provider) => {
                expand_into(edges, [seed.clone()], provider, policy, |node| {
                    closures.contains(node)
                })
                .await?;
                fill_closure(seed, edges, closures)?;
            }
            EdgeSource::Known(known) => fill_closure(seed, known, closures)?,
        }
    }

    let added: BTreeSet<Node> = closures
        .nodes()
        .filter(|node| !before.contains(node.as_str()))
        .cloned()
        .collect();

    debug!(seeds = seeds.len(), added = added.len(), "seeds merged");
    Ok(added)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
