//! The edge-discovery capability consumed by the engine.
//!
//! A host supplies an [`EdgeProvider`] (for example a manifest parser). The
//! engine only ever asks it for one node's direct successors at a time and
//! never assumes anything about how the answer is produced.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{DirectEdgeMap, Node};

/// Fetches the direct successors of a node. May be slow and may fail.
#[async_trait]
pub trait EdgeProvider: Send + Sync {
    async fn direct_edges(&self, node: &str) -> Result<Vec<Node>>;
}

#[async_trait]
impl<P: EdgeProvider + ?Sized> EdgeProvider for &P {
    async fn direct_edges(&self, node: &str) -> Result<Vec<Node>> {
        (**self).direct_edges(node).await
    }
}

#[async_trait]
impl<P: EdgeProvider + ?Sized> EdgeProvider for Arc<P> {
    async fn direct_edges(&self, node: &str) -> Result<Vec<Node>> {
        (**self).direct_edges(node).await
    }
}

/// Adapts a synchronous closure into an [`EdgeProvider`].
pub struct FnProvider<F> {
    lookup: F,
}

impl<F> FnProvider<F>
where
    F: Fn(&str) -> Result<Vec<Node>> + Send + Sync,
{
    pub const fn new(lookup: F) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl<F> EdgeProvider for FnProvider<F>
where
    F: Fn(&str) -> Result<Vec<Node>> + Send + Sync,
{
    async fn direct_edges(&self, node: &str) -> Result<Vec<Node>> {
        (self.lookup)(node)
    }
}

/// A precomputed map answers lookups for its own keys and fails for
/// anything else.
#[async_trait]
impl EdgeProvider for DirectEdgeMap {
    async fn direct_edges(&self, node: &str) -> Result<Vec<Node>> {
        self.get(node)
            .map(<[Node]>::to_vec)
            .ok_or_else(|| anyhow::anyhow!("node {node} is not in the edge map"))
    }
}

/// Where edges come from: a map that already has them, or a provider that
/// can fetch them.
#[derive(Clone, Copy)]
pub enum EdgeSource<'a> {
    /// Precomputed edges. A node missing from the map is an `UnknownNode`
    /// error, never a lookup.
    Known(&'a DirectEdgeMap),
    /// Fetch edges lazily; lookup failures follow the configured policy.
    Fetch(&'a dyn EdgeProvider),
}

impl<'a> From<&'a DirectEdgeMap> for EdgeSource<'a> {
    fn from(edges: &'a DirectEdgeMap) -> Self {
        Self::Known(edges)
    }
}

impl std::fmt::Debug for EdgeSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(edges) => f.debug_tuple("Known").field(&edges.len()).finish(),
            Self::Fetch(_) => f.write_str("Fetch"),
        }
    }
}
