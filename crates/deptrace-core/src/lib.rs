#![forbid(unsafe_code)]
//! deptrace-core library.
//!
//! Analysis of dependency graphs whose edges are expensive to discover:
//! frontier expansion, transitive closure, incremental cache merging,
//! inversion, chain enumeration, extraneous-edge detection and closure
//! property scans.
//!
//! # Conventions
//!
//! - **Errors**: Graph operations return `Result<T, GraphError>`; host
//!   collaborators (providers, predicates, editors) and config loading use
//!   `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//!   The library never installs a subscriber.
//! - **Caches**: `DirectEdgeMap` and `ClosureMap` are append-only.

pub mod chains;
pub mod closure;
pub mod config;
pub mod cycles;
pub mod engine;
pub mod error;
pub mod frontier;
pub mod invert;
pub mod merge;
pub mod model;
pub mod provider;
pub mod reduce;
pub mod scan;

pub use config::{EngineConfig, LookupPolicy};
pub use engine::Engine;
pub use error::{ErrorCode, GraphError};
pub use model::{
    Chain, ClosureMap, DirectEdgeMap, GraphCache, Inclusivity, Node, ReductionResult,
    ReverseAdjacency,
};
pub use provider::{EdgeProvider, EdgeSource, FnProvider};
pub use reduce::EdgeEditor;
