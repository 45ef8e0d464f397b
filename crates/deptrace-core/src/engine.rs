//! One-stop façade over the analysis components.
//!
//! An [`Engine`] owns an [`EdgeProvider`] and an [`EngineConfig`]. Each
//! query expands the frontier it needs from scratch, so no state carries
//! over between calls; [`Engine::merge_seeds`] is the exception and works
//! on a caller-owned [`GraphCache`].

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result as AnyResult;
use tracing::{debug, instrument};

use crate::chains;
use crate::closure;
use crate::config::{EngineConfig, resolve_config};
use crate::cycles::ensure_acyclic;
use crate::error::GraphError;
use crate::frontier;
use crate::invert::invert;
use crate::merge::add_seeds;
use crate::model::{Chain, ClosureMap, DirectEdgeMap, GraphCache, Inclusivity, Node, ReductionResult};
use crate::provider::{EdgeProvider, EdgeSource};
use crate::reduce::{self, EdgeEditor};
use crate::scan;

type Result<T> = std::result::Result<T, GraphError>;

/// Closure map rendered as sorted lists.
pub type ClosureListing = std::collections::BTreeMap<Node, Vec<Node>>;

pub struct Engine<P> {
    provider: P,
    config: EngineConfig,
}

impl<P: EdgeProvider> Engine<P> {
    /// Engine with the default configuration.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, EngineConfig::default())
    }

    #[must_use]
    pub const fn with_config(provider: P, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    /// Engine configured from a TOML file (defaults if it is missing) plus
    /// the environment override.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or the override is
    /// invalid.
    pub fn from_config_file(provider: P, path: &Path) -> AnyResult<Self> {
        Ok(Self::with_config(provider, resolve_config(path)?))
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Discover the direct edges reachable from `seeds`.
    ///
    /// With `cycle_check` enabled the expanded map is checked for cycles
    /// before it is returned.
    ///
    /// # Errors
    ///
    /// [`GraphError::LookupFailure`] under the propagate policy, or
    /// [`GraphError::CycleDetected`].
    #[instrument(skip_all)]
    pub async fn expand<I>(&self, seeds: I) -> Result<DirectEdgeMap>
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        let edges = frontier::expand(
            seeds.into_iter().map(Into::into),
            &self.provider,
            self.config.lookup_policy,
        )
        .await?;
        if self.config.cycle_check {
            ensure_acyclic(&edges)?;
        }
        debug!(nodes = edges.len(), edges = edges.edge_count(), "frontier ready");
        Ok(edges)
    }

    /// Closures of every node reachable from `seeds`, seeds included.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::expand`].
    pub async fn closures<I>(&self, seeds: I, inclusivity: Inclusivity) -> Result<ClosureListing>
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        let edges = self.expand(seeds).await?;
        let closures = closure::build_closures(&edges)?;
        Ok(closures.to_sorted(inclusivity))
    }

    /// Every node reachable from any seed.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::expand`].
    pub async fn all_reachable<I>(&self, seeds: I, inclusivity: Inclusivity) -> Result<Vec<Node>>
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        let seeds: BTreeSet<Node> = seeds.into_iter().map(Into::into).collect();
        let edges = self.expand(seeds.iter().cloned()).await?;
        let mut cache = ClosureMap::new();
        let reachable = closure::all_reachable(
            seeds.iter().map(String::as_str),
            &edges,
            &mut cache,
            inclusivity,
        )?;
        Ok(reachable.into_iter().collect())
    }

    /// Nodes under `seeds` that directly reference `node`.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownNode`] if `node` is not reachable from the
    /// seeds, plus the errors of [`Engine::expand`].
    pub async fn referencers<I>(&self, seeds: I, node: &str) -> Result<Vec<Node>>
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        let edges = self.expand(seeds).await?;
        let reverse = invert(&edges);
        let mut found = chains::referencers(node, &reverse)?.to_vec();
        if self.config.sort_output {
            found.sort_unstable();
        }
        Ok(found)
    }

    /// Every chain from `target` up to `root`, target first.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownNode`] if `target` is not reachable from
    /// `root`'s frontier, plus the errors of [`Engine::expand`].
    #[instrument(skip(self))]
    pub async fn chains(&self, root: &str, target: &str) -> Result<Vec<Chain>> {
        let edges = self.expand([root]).await?;
        let reverse = invert(&edges);
        let mut found = chains::chains(root, target, &reverse)?;
        if self.config.sort_output {
            found.sort();
        }
        Ok(found)
    }

    /// Extraneous direct edges of every node reachable from `seeds`.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::expand`].
    pub async fn extraneous<I>(&self, seeds: I) -> Result<ReductionResult>
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        let edges = self.expand(seeds).await?;
        let mut cache = ClosureMap::new();
        let mut result = reduce::extraneous(&edges, &mut cache)?;
        if self.config.sort_output {
            for redundant in result.values_mut() {
                redundant.sort_unstable();
            }
        }
        Ok(result)
    }

    /// Find and remove extraneous edges under `seeds` through `editor`.
    /// Returns what was removed.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::extraneous`], plus [`GraphError::EditFailure`].
    pub async fn remove_extraneous<I, E>(&self, seeds: I, editor: &mut E) -> Result<ReductionResult>
    where
        I: IntoIterator,
        I::Item: Into<Node>,
        E: EdgeEditor + ?Sized,
    {
        let result = self.extraneous(seeds).await?;
        reduce::apply_removals(&result, editor)
    }

    /// Which `candidates` `node` needs as new direct successors to reach
    /// all of them.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::expand`].
    pub async fn edges_to_add<I>(&self, node: &str, candidates: I) -> Result<Vec<Node>>
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        let candidates: BTreeSet<Node> = candidates.into_iter().map(Into::into).collect();
        let seeds = std::iter::once(node.to_string()).chain(candidates.iter().cloned());
        let edges = self.expand(seeds).await?;
        let mut cache = ClosureMap::new();
        reduce::edges_to_add(
            node,
            candidates.iter().map(String::as_str),
            &edges,
            &mut cache,
        )
    }

    /// Make every candidate reachable from `node`, adding only the edges
    /// [`Engine::edges_to_add`] reports. Returns the added targets.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::edges_to_add`], plus [`GraphError::EditFailure`].
    pub async fn ensure_edges<I, E>(&self, node: &str, candidates: I, editor: &mut E) -> Result<Vec<Node>>
    where
        I: IntoIterator,
        I::Item: Into<Node>,
        E: EdgeEditor + ?Sized,
    {
        let to_add = self.edges_to_add(node, candidates).await?;
        reduce::apply_additions(node, &to_add, editor)?;
        Ok(to_add)
    }

    /// Whether `predicate` holds for `node` or anything it reaches.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::expand`]. Predicate failures are never errors.
    pub async fn any_matches<F>(&self, node: &str, predicate: F) -> Result<bool>
    where
        F: FnMut(&str) -> AnyResult<bool>,
    {
        let edges = self.expand([node]).await?;
        let mut cache = ClosureMap::new();
        let inclusive = closure::closure_of(node, &edges, &mut cache, Inclusivity::Inclusive)?;
        Ok(scan::any_matches(node, &inclusive, predicate))
    }

    /// Add the closures of `seeds` to `cache` through this engine's
    /// provider. Returns the nodes newly cached.
    ///
    /// # Errors
    ///
    /// See [`add_seeds`].
    pub async fn merge_seeds<I>(&self, cache: &mut GraphCache, seeds: I) -> Result<BTreeSet<Node>>
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        add_seeds(
            cache,
            EdgeSource::Fetch(&self.provider),
            seeds.into_iter().map(Into::into),
            self.config.lookup_policy,
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
