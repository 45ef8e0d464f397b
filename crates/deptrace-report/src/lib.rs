#![forbid(unsafe_code)]
//! deptrace-report library.
//!
//! Turns engine results into text lines or JSON. Nothing here touches the
//! graph itself; every function takes the sorted listings produced by
//! `deptrace-core`.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types.
//! - **Logging**: Use `tracing` macros (`debug!`, `trace!`).

pub mod json;
pub mod output;
pub mod summary;
pub mod text;

pub use json::{chains_to_json, to_json};
pub use output::{OutputMode, resolve_output_mode, write_chains, write_listing};
pub use summary::Summary;
pub use text::{NO_DEPENDENCIES, NO_NODES, render_chains, render_lines, write_lines};

/// Node → sorted list of related nodes, as produced by the `to_sorted`
/// views of `deptrace-core`.
pub type Listing = std::collections::BTreeMap<deptrace_core::Node, Vec<deptrace_core::Node>>;
