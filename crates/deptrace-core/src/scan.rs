//! Short-circuiting property scan over an inclusive closure.

use std::collections::BTreeSet;

use anyhow::Result;
use tracing::{debug, instrument};

use crate::model::Node;

/// `true` as soon as `predicate` holds for `node` or any member of
/// `closure`.
///
/// `node` is tested first, then the closure in sorted order. A predicate
/// error (for example unreadable node data) counts as "no match" and the
/// scan moves on.
#[instrument(skip(closure, predicate), fields(size = closure.len()))]
pub fn any_matches<F>(node: &str, closure: &BTreeSet<Node>, mut predicate: F) -> bool
where
    F: FnMut(&str) -> Result<bool>,
{
    let candidates = std::iter::once(node).chain(
        closure
            .iter()
            .map(String::as_str)
            .filter(|&candidate| candidate != node),
    );

    for candidate in candidates {
        match predicate(candidate) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(err) => debug!(node = %candidate, error = %err, "predicate failed, treated as no match"),
        }
    }
    false
}
