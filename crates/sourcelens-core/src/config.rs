//! Enrichment configuration.
//!
//! Loaded from TOML, then overridden by `SOURCELENS_*` environment variables:
//!
//! ```toml
//! build_prefix = "/build"
//! github_prefix = "/src"
//! ignore_patterns = [".*/node_modules/.*", ".*/go/pkg/mod/.*"]
//! revision_policy = "service_version"
//! max_concurrency = 8
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::commit::RevisionPolicy;
use crate::error::{EnrichmentError, Result};
use crate::path::PathPrefixConfig;

pub const BUILD_PREFIX_ENV: &str = "SOURCELENS_BUILD_PREFIX";
pub const GITHUB_PREFIX_ENV: &str = "SOURCELENS_GITHUB_PREFIX";

fn default_ignore_patterns() -> Vec<String> {
    vec![".*/node_modules/.*".to_string(), ".*/go/pkg/mod/.*".to_string()]
}

fn default_max_concurrency() -> usize {
    8
}

/// Settings for a [`crate::TraceEnhancer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Prefix the build machine adds to recorded paths
    #[serde(default)]
    pub build_prefix: Option<String>,
    /// Prefix of the sources inside the repository
    #[serde(default)]
    pub github_prefix: Option<String>,
    /// Regular expressions for paths that are never enriched
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub revision_policy: RevisionPolicy,
    /// Frames enriched in parallel by `enhance_trace`
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        EnrichmentConfig {
            build_prefix: None,
            github_prefix: None,
            ignore_patterns: default_ignore_patterns(),
            revision_policy: RevisionPolicy::default(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl EnrichmentConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EnrichmentConfig =
            toml::from_str(s).map_err(|e| EnrichmentError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EnrichmentError::Config(format!("cannot read {path:?}: {e}")))?;
        Ok(Self::from_toml_str(&raw)?.apply_env())
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Override prefixes from `SOURCELENS_BUILD_PREFIX` / `SOURCELENS_GITHUB_PREFIX`.
    pub fn apply_env(self) -> Self {
        self.apply_overrides(
            std::env::var(BUILD_PREFIX_ENV).ok(),
            std::env::var(GITHUB_PREFIX_ENV).ok(),
        )
    }

    fn apply_overrides(mut self, build: Option<String>, github: Option<String>) -> Self {
        if let Some(build) = build.filter(|v| !v.is_empty()) {
            self.build_prefix = Some(build);
        }
        if let Some(github) = github.filter(|v| !v.is_empty()) {
            self.github_prefix = Some(github);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(EnrichmentError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn prefixes(&self) -> PathPrefixConfig {
        PathPrefixConfig::new(self.build_prefix.as_deref(), self.github_prefix.as_deref())
    }

    pub fn with_prefixes(
        mut self,
        build_prefix: Option<&str>,
        github_prefix: Option<&str>,
    ) -> Self {
        self.build_prefix = build_prefix.map(str::to_string);
        self.github_prefix = github_prefix.map(str::to_string);
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: &[&str]) -> Self {
        self.ignore_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_revision_policy(mut self, policy: RevisionPolicy) -> Self {
        self.revision_policy = policy;
        self
    }
}
