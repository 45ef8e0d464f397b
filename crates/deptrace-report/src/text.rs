//! Plain-text rendering.
//!
//! A listing renders as one block per key:
//!
//! ```text
//! app
//! 	db
//! 	web
//!
//! log
//! 	<No Dependencies>
//!
//! ```

use std::io::{self, Write};

use deptrace_core::{Chain, Node};
use tracing::trace;

use crate::Listing;

/// Placeholder for a key with no values.
pub const NO_DEPENDENCIES: &str = "<No Dependencies>";

/// Placeholder for an empty listing.
pub const NO_NODES: &str = "<No Nodes>";

/// Lines for `listing`, keys in sorted order.
#[must_use]
pub fn render_lines(listing: &Listing) -> Vec<String> {
    if listing.is_empty() {
        return vec![NO_NODES.to_string()];
    }

    let mut lines = Vec::new();
    for (node, values) in listing {
        lines.push(node.clone());
        if values.is_empty() {
            lines.push(indent(NO_DEPENDENCIES));
        } else {
            lines.extend(values.iter().map(|value| indent(value.as_str())));
        }
        lines.push(String::new());
    }
    lines
}

/// Lines describing every chain from `target` up to `root`.
///
/// Each chain is listed without its first element (always `target`, named
/// in the header), one node per line, followed by a blank line.
#[must_use]
pub fn render_chains(root: &str, target: &str, chains: &[Chain]) -> Vec<String> {
    let mut lines = vec![
        "For target:".to_string(),
        target.to_string(),
        String::new(),
        "Within root:".to_string(),
        root.to_string(),
        String::new(),
    ];
    for chain in chains {
        lines.extend(chain.iter().skip(1).cloned());
        lines.push(String::new());
    }
    lines
}

/// Write each line followed by a newline.
///
/// # Errors
///
/// Propagates I/O errors from `writer`.
pub fn write_lines<W, I, S>(writer: &mut W, lines: I) -> io::Result<()>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut count = 0_usize;
    for line in lines {
        writeln!(writer, "{}", line.as_ref())?;
        count += 1;
    }
    trace!(lines = count, "lines written");
    Ok(())
}

fn indent(value: &str) -> Node {
    format!("\t{value}")
}
