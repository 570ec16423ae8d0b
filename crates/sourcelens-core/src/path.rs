//! Build-path to repository-path rewriting.

use serde::{Deserialize, Serialize};

/// Prefixes used to map a path recorded at build time onto the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPrefixConfig {
    /// Prefix the build machine adds (e.g. `/build`)
    #[serde(default)]
    pub build_prefix: Option<String>,
    /// Prefix of the sources inside the repository (e.g. `/src`)
    #[serde(default)]
    pub github_prefix: Option<String>,
}

impl PathPrefixConfig {
    pub fn new(build_prefix: Option<&str>, github_prefix: Option<&str>) -> Self {
        PathPrefixConfig {
            build_prefix: build_prefix.map(str::to_string),
            github_prefix: github_prefix.map(str::to_string),
        }
    }

    pub fn rewrite(&self, file_path: &str) -> String {
        rewrite_path(
            file_path,
            self.build_prefix.as_deref(),
            self.github_prefix.as_deref(),
        )
    }
}

/// Rewrite a stack-trace file path into a repository path.
///
/// - build prefix set and matching: strip it, then prepend the GitHub prefix (if any)
/// - build prefix set but not matching: path unchanged
/// - only GitHub prefix set: prepend it
/// - neither set: path unchanged
pub fn rewrite_path(
    file_path: &str,
    build_prefix: Option<&str>,
    github_prefix: Option<&str>,
) -> String {
    match (build_prefix, github_prefix) {
        (Some(build), github) => match file_path.strip_prefix(build) {
            Some(rest) => format!("{}{}", github.unwrap_or_default(), rest),
            None => file_path.to_string(),
        },
        (None, Some(github)) => format!("{github}{file_path}"),
        (None, None) => file_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "/build/backend/util/tracer.go";

    #[test]
    fn test_build_and_github_prefix() {
        assert_eq!(
            rewrite_path(FILE, Some("/build"), Some("/src")),
            "/src/backend/util/tracer.go"
        );
    }

    #[test]
    fn test_build_prefix_only() {
        assert_eq!(
            rewrite_path(FILE, Some("/build"), None),
            "/backend/util/tracer.go"
        );
    }

    #[test]
    fn test_github_prefix_only() {
        assert_eq!(
            rewrite_path(FILE, None, Some("/src")),
            "/src/build/backend/util/tracer.go"
        );
    }

    #[test]
    fn test_no_prefixes() {
        assert_eq!(rewrite_path(FILE, None, None), FILE);
    }

    #[test]
    fn test_mismatched_build_prefix_passes_through() {
        assert_eq!(rewrite_path(FILE, Some("/foo"), Some("/bar")), FILE);
        assert_eq!(rewrite_path(FILE, Some("/foo"), None), FILE);
    }

    #[test]
    fn test_config_rewrite() {
        let config = PathPrefixConfig::new(Some("/build"), Some("/src"));
        assert_eq!(config.rewrite("/build/a/b.go"), "/src/a/b.go");
        assert_eq!(PathPrefixConfig::default().rewrite("/a/b.go"), "/a/b.go");
    }
}
