//! Error types for graph analysis.
//!
//! Every [`GraphError`] carries the node(s) involved and maps onto a stable
//! [`ErrorCode`] so hosts can branch on failures without string matching.

use std::fmt;

use crate::model::Node;

/// Boxed error produced by a host collaborator (edge provider or editor).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the analysis operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The edge provider failed for `node` while the propagate policy was
    /// in effect.
    #[error("edge lookup failed for node '{node}': {source}")]
    LookupFailure {
        node: Node,
        #[source]
        source: BoxError,
    },

    /// A closure, chain or reduction was requested for a node that no
    /// frontier expansion discovered.
    #[error("node not found: '{0}'")]
    UnknownNode(Node),

    /// A cycle was reached. `path` starts and ends at the same node.
    #[error("dependency cycle detected: {}", .path.join(" -> "))]
    CycleDetected { path: Vec<Node> },

    /// The host's edge editor failed while applying a change to `node`.
    #[error("failed to edit edges of node '{node}': {source}")]
    EditFailure {
        node: Node,
        #[source]
        source: BoxError,
    },
}

impl GraphError {
    pub(crate) fn lookup(node: &str, err: anyhow::Error) -> Self {
        Self::LookupFailure {
            node: node.to_string(),
            source: err.into(),
        }
    }

    pub(crate) fn edit(node: &str, err: anyhow::Error) -> Self {
        Self::EditFailure {
            node: node.to_string(),
            source: err.into(),
        }
    }

    pub(crate) fn unknown(node: &str) -> Self {
        Self::UnknownNode(node.to_string())
    }

    /// The machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::LookupFailure { .. } => ErrorCode::LookupFailure,
            Self::UnknownNode(_) => ErrorCode::UnknownNode,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::EditFailure { .. } => ErrorCode::EditFailure,
        }
    }

    /// The node(s) the error is about.
    #[must_use]
    pub fn nodes(&self) -> Vec<&str> {
        match self {
            Self::LookupFailure { node, .. }
            | Self::UnknownNode(node)
            | Self::EditFailure { node, .. } => vec![node.as_str()],
            Self::CycleDetected { path } => path.iter().map(String::as_str).collect(),
        }
    }
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    LookupFailure,
    UnknownNode,
    CycleDetected,
    EditFailure,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::UnknownNode => "E2001",
            Self::CycleDetected => "E2003",
            Self::LookupFailure => "E4001",
            Self::EditFailure => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UnknownNode => "Node not found",
            Self::CycleDetected => "Dependency cycle detected",
            Self::LookupFailure => "Edge lookup failed",
            Self::EditFailure => "Edge edit failed",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::UnknownNode => Some("Expand the frontier from a seed that reaches this node first."),
            Self::CycleDetected => Some("Remove one edge of the reported cycle to keep the graph acyclic."),
            Self::LookupFailure => {
                Some("Check the node's backing data, or use the absorb lookup policy.")
            }
            Self::EditFailure => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
