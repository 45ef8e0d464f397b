use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Environment variable overriding [`EngineConfig::lookup_policy`].
pub const LOOKUP_POLICY_ENV: &str = "DEPTRACE_LOOKUP_POLICY";

/// What frontier expansion does when the edge provider fails for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Record the node with no successors and keep going.
    #[default]
    Absorb,
    /// Abort the whole operation with `GraphError::LookupFailure`.
    Propagate,
}

impl LookupPolicy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "absorb" => Some(Self::Absorb),
            "propagate" => Some(Self::Propagate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub lookup_policy: LookupPolicy,
    #[serde(default = "default_true")]
    pub cycle_check: bool,
    #[serde(default = "default_true")]
    pub sort_output: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookup_policy: LookupPolicy::default(),
            cycle_check: default_true(),
            sort_output: default_true(),
        }
    }
}

impl EngineConfig {
    /// Same defaults, with the given lookup policy.
    #[must_use]
    pub fn with_policy(lookup_policy: LookupPolicy) -> Self {
        Self {
            lookup_policy,
            ..Self::default()
        }
    }

    /// Parse a config from TOML text; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Fails if `content` is not valid TOML or a field has an unknown value.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content).context("Failed to parse engine config")
    }
}

/// Load `path`, or the defaults when it does not exist.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed; the error names
/// the path.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<EngineConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `path` and apply the `DEPTRACE_LOOKUP_POLICY` override.
///
/// # Errors
///
/// Same as [`load_config`], plus an invalid `DEPTRACE_LOOKUP_POLICY` value.
pub fn resolve_config(path: &Path) -> Result<EngineConfig> {
    let config = load_config(path)?;
    apply_env_override(config, env::var(LOOKUP_POLICY_ENV).ok())
}

fn apply_env_override(mut config: EngineConfig, env_policy: Option<String>) -> Result<EngineConfig> {
    if let Some(raw) = env_policy {
        let Some(policy) = LookupPolicy::parse(&raw) else {
            bail!("invalid {LOOKUP_POLICY_ENV} value '{raw}': expected 'absorb' or 'propagate'");
        };
        config.lookup_policy = policy;
    }
    Ok(config)
}

const fn default_true() -> bool {
    true
}
