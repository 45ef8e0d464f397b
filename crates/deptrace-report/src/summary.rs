//! Headline numbers for an analyzed graph.

use std::fmt;

use deptrace_core::{DirectEdgeMap, ReductionResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub nodes: usize,
    pub edges: usize,
    pub extraneous_edges: usize,
    /// `DirectEdgeMap::content_hash` of the analyzed map.
    pub content_hash: String,
}

impl Summary {
    #[must_use]
    pub fn new(edges: &DirectEdgeMap, reduction: &ReductionResult) -> Self {
        Self {
            nodes: edges.len(),
            edges: edges.edge_count(),
            extraneous_edges: reduction.values().map(Vec::len).sum(),
            content_hash: edges.content_hash(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<12} {}", "nodes:", self.nodes)?;
        writeln!(f, "{:<12} {}", "edges:", self.edges)?;
        writeln!(f, "{:<12} {}", "extraneous:", self.extraneous_edges)?;
        write!(f, "{:<12} {}", "hash:", self.content_hash)
    }
}
