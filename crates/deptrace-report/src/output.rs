//! Output mode selection and dispatch.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. An explicit mode from the host
//! 2. `DEPTRACE_FORMAT` env var → `"text"` | `"json"`
//! 3. Default: [`OutputMode::Text`]

use std::io::Write;

use anyhow::Result;
use deptrace_core::Chain;
use tracing::debug;

use crate::{Listing, json, text};

/// Environment variable selecting the output mode.
pub const FORMAT_ENV: &str = "DEPTRACE_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Indented plain text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputMode {
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

fn resolve_output_mode_inner(explicit: Option<OutputMode>, format_env: Option<&str>) -> OutputMode {
    if let Some(mode) = explicit {
        return mode;
    }
    match format_env.map(str::to_lowercase).as_deref() {
        Some("json") => OutputMode::Json,
        _ => OutputMode::Text,
    }
}

/// Resolve the output mode from an explicit choice and the environment.
#[must_use]
pub fn resolve_output_mode(explicit: Option<OutputMode>) -> OutputMode {
    let env_val = std::env::var(FORMAT_ENV).ok();
    resolve_output_mode_inner(explicit, env_val.as_deref())
}

/// Write `listing` in `mode`.
///
/// # Errors
///
/// Propagates serialization and I/O errors.
pub fn write_listing<W: Write + ?Sized>(mode: OutputMode, listing: &Listing, w: &mut W) -> Result<()> {
    debug!(?mode, keys = listing.len(), "writing listing");
    if mode.is_json() {
        writeln!(w, "{}", json::to_json(listing)?)?;
    } else {
        text::write_lines(w, text::render_lines(listing))?;
    }
    Ok(())
}

/// Write the chains from `target` up to `root` in `mode`.
///
/// # Errors
///
/// Propagates serialization and I/O errors.
pub fn write_chains<W: Write + ?Sized>(
    mode: OutputMode,
    root: &str,
    target: &str,
    chains: &[Chain],
    w: &mut W,
) -> Result<()> {
    debug!(?mode, count = chains.len(), "writing chains");
    if mode.is_json() {
        writeln!(w, "{}", json::chains_to_json(root, target, chains)?)?;
    } else {
        text::write_lines(w, text::render_chains(root, target, chains))?;
    }
    Ok(())
}
