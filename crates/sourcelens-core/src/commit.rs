//! Service version to commit resolution.

use github_api::GitHubApi;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EnrichmentError, Result};

/// How a service version is turned into a revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionPolicy {
    /// Use the service version when it looks like a commit, else the latest commit.
    #[default]
    ServiceVersion,
    /// Always use the latest commit on the default branch.
    Latest,
}

/// Where a resolved revision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionSource {
    ServiceVersion,
    LatestCommit,
}

/// A concrete revision to read files at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revision {
    pub sha: String,
    pub source: RevisionSource,
}

/// Whether `version` can be passed to the hosting API as a commit as-is:
/// an abbreviated or full hex SHA (7 to 40 digits).
pub fn looks_like_commit(version: &str) -> bool {
    (7..=40).contains(&version.len()) && version.chars().all(|c| c.is_ascii_hexdigit())
}

/// Resolve `service_version` on `repo` to a revision.
pub async fn resolve_revision(
    client: &dyn GitHubApi,
    repo: &str,
    service_version: &str,
    policy: RevisionPolicy,
) -> Result<Revision> {
    if policy == RevisionPolicy::ServiceVersion && looks_like_commit(service_version) {
        return Ok(Revision {
            sha: service_version.to_string(),
            source: RevisionSource::ServiceVersion,
        });
    }

    debug!(repo = %repo, service_version = %service_version, "resolving latest commit");
    latest_revision(client, repo).await
}

/// Latest commit on `repo`'s default branch. An empty hash is an error.
pub async fn latest_revision(client: &dyn GitHubApi, repo: &str) -> Result<Revision> {
    let sha = client
        .get_latest_commit_hash(repo)
        .await
        .map_err(|source| EnrichmentError::CommitResolution {
            repo: repo.to_string(),
            source,
        })?;

    if sha.trim().is_empty() {
        return Err(EnrichmentError::EmptyCommit {
            repo: repo.to_string(),
        });
    }

    Ok(Revision {
        sha,
        source: RevisionSource::LatestCommit,
    })
}
