//! GitHub REST client
//!
//! [`GitHubApi`] is the capability SourceLens needs from a repository host.
//! [`GitHubClient`] is the production adapter backed by `reqwest`; tests use
//! [`crate::fakes::MemoryGitHub`] instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GitHubError;
use crate::types::{
    ApiErrorBody, Blob, CommitSummary, InstallationRepositories, Issue, IssueRequest, Label,
    RepoContents, Repository,
};
use crate::Result;

const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

/// Repository-hosting operations.
///
/// Content, blob and commit reads serve stack-trace enrichment. Issue, label,
/// repository and installation operations serve sibling features and are part
/// of the same capability.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Read `path` at `revision`. Returns a file or a directory listing.
    async fn get_repo_content(&self, repo: &str, path: &str, revision: &str)
        -> Result<RepoContents>;

    /// Read a git blob by SHA.
    async fn get_repo_blob(&self, repo: &str, sha: &str) -> Result<Blob>;

    /// SHA of the newest commit on the default branch.
    async fn get_latest_commit_hash(&self, repo: &str) -> Result<String>;

    /// Open an issue.
    async fn create_issue(&self, repo: &str, request: &IssueRequest) -> Result<Issue>;

    /// List the labels defined on a repository.
    async fn list_labels(&self, repo: &str) -> Result<Vec<Label>>;

    /// List repositories accessible to the installation.
    async fn list_repos(&self) -> Result<Vec<Repository>>;

    /// Uninstall the app from an installation.
    async fn delete_installation(&self, installation_id: &str) -> Result<()>;
}

/// GitHub client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL
    pub api_url: String,
    /// Bearer token (installation or personal access token)
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// User-Agent header; GitHub rejects requests without one
    pub user_agent: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            user_agent: format!("sourcelens/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
        }
    }
}

impl GitHubConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific API endpoint (e.g. GitHub Enterprise)
    pub fn new(api_url: &str) -> Self {
        GitHubConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: None,
            ..Self::default()
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

/// `reqwest`-backed [`GitHubApi`] implementation.
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GitHubError::Config(e.to_string()))?;

        Ok(GitHubClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GitHubConfig::from_env())
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// Contents endpoint for `path`; each path segment is percent-encoded.
    fn contents_url(&self, repo: &str, path: &str) -> Result<Url> {
        let base = format!("{}/repos/{}/contents", self.config.api_url, repo);
        let mut url = Url::parse(&base)
            .map_err(|e| GitHubError::Config(format!("invalid API URL {base:?}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| GitHubError::Config(format!("API URL {base:?} cannot take a path")))?
            .extend(path.trim_start_matches('/').split('/'));
        Ok(url)
    }

    fn blob_url(&self, repo: &str, sha: &str) -> String {
        format!("{}/repos/{}/git/blobs/{}", self.config.api_url, repo, sha)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http_client
            .request(method, url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url = %url, "GitHub GET");
        let response = self.request(Method::GET, url).send().await?;
        let response = check_status(response, url, None).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Map a non-success response onto [`GitHubError`].
async fn check_status(response: Response, url: &str, revision: Option<&str>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ApiErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_default();

    Err(classify_status(status, message, url, revision))
}

fn classify_status(
    status: StatusCode,
    message: String,
    url: &str,
    revision: Option<&str>,
) -> GitHubError {
    // GitHub answers an unresolvable `ref` with 404 or 422 and this message.
    if let Some(revision) = revision {
        if message.starts_with("No commit found for the ref")
            || status == StatusCode::UNPROCESSABLE_ENTITY
        {
            return GitHubError::UnknownRef {
                revision: revision.to_string(),
            };
        }
    }

    match status {
        StatusCode::NOT_FOUND => GitHubError::NotFound {
            resource: url.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GitHubError::Unauthorized(message),
        _ => GitHubError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn get_repo_content(
        &self,
        repo: &str,
        path: &str,
        revision: &str,
    ) -> Result<RepoContents> {
        let url = self.contents_url(repo, path)?;
        debug!(url = %url, revision = %revision, "GitHub GET contents");
        let response = self
            .request(Method::GET, url.as_str())
            .query(&[("ref", revision)])
            .send()
            .await?;
        let response = check_status(response, url.as_str(), Some(revision)).await?;
        Ok(response.json::<RepoContents>().await?)
    }

    async fn get_repo_blob(&self, repo: &str, sha: &str) -> Result<Blob> {
        self.get_json(&self.blob_url(repo, sha)).await
    }

    async fn get_latest_commit_hash(&self, repo: &str) -> Result<String> {
        let url = format!("{}/repos/{}/commits?per_page=1", self.config.api_url, repo);
        let commits: Vec<CommitSummary> = self.get_json(&url).await?;
        commits
            .into_iter()
            .next()
            .map(|c| c.sha)
            .ok_or_else(|| GitHubError::NotFound {
                resource: format!("{repo}: no commits"),
            })
    }

    async fn create_issue(&self, repo: &str, request: &IssueRequest) -> Result<Issue> {
        let url = format!("{}/repos/{}/issues", self.config.api_url, repo);
        let response = self.request(Method::POST, &url).json(request).send().await?;
        let response = check_status(response, &url, None).await?;
        Ok(response.json::<Issue>().await?)
    }

    async fn list_labels(&self, repo: &str) -> Result<Vec<Label>> {
        let url = format!("{}/repos/{}/labels?per_page=100", self.config.api_url, repo);
        self.get_json(&url).await
    }

    async fn list_repos(&self) -> Result<Vec<Repository>> {
        let url = format!(
            "{}/installation/repositories?per_page=100",
            self.config.api_url
        );
        let envelope: InstallationRepositories = self.get_json(&url).await?;
        Ok(envelope.repositories)
    }

    async fn delete_installation(&self, installation_id: &str) -> Result<()> {
        let url = format!(
            "{}/app/installations/{}",
            self.config.api_url, installation_id
        );
        let response = self.request(Method::DELETE, &url).send().await?;
        check_status(response, &url, None).await?;
        Ok(())
    }
}
