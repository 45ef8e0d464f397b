//! JSON rendering.

use anyhow::{Context, Result};
use deptrace_core::Chain;
use serde::Serialize;

use crate::Listing;

#[derive(Serialize)]
struct ChainReport<'a> {
    root: &'a str,
    target: &'a str,
    chains: &'a [Chain],
}

/// Pretty JSON object for `listing`; keys come out sorted.
///
/// # Errors
///
/// Fails only if serialization fails.
pub fn to_json(listing: &Listing) -> Result<String> {
    serde_json::to_string_pretty(listing).context("Failed to serialize listing")
}

/// Pretty JSON object `{ "root", "target", "chains" }`.
///
/// # Errors
///
/// Fails only if serialization fails.
pub fn chains_to_json(root: &str, target: &str, chains: &[Chain]) -> Result<String> {
    let report = ChainReport {
        root,
        target,
        chains,
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize chains")
}
