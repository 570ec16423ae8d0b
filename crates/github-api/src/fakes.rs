//! In-memory fake for [`GitHubApi`] (testing only)
//!
//! `MemoryGitHub` serves canned contents, blobs and commit hashes, and records
//! every call so tests can assert on the exact request sequence.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::GitHubApi;
use crate::error::GitHubError;
use crate::types::{Blob, Issue, IssueRequest, Label, RepoContent, RepoContents, Repository};
use crate::Result;

/// A call observed by [`MemoryGitHub`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    RepoContent {
        repo: String,
        path: String,
        revision: String,
    },
    RepoBlob {
        repo: String,
        sha: String,
    },
    LatestCommitHash {
        repo: String,
    },
    CreateIssue {
        repo: String,
        title: String,
    },
    ListLabels {
        repo: String,
    },
    ListRepos,
    DeleteInstallation {
        installation_id: String,
    },
}

#[derive(Debug, Default)]
struct FakeState {
    contents: HashMap<String, Result<RepoContents>>,
    blobs: HashMap<String, Result<Blob>>,
    latest_commits: HashMap<String, Result<String>>,
    unknown_refs: HashSet<String>,
    labels: HashMap<String, Vec<Label>>,
    repos: Vec<Repository>,
    issues_created: u64,
    calls: Vec<ApiCall>,
}

/// In-memory GitHub keyed by file path, blob SHA and repository.
///
/// Content lookups ignore the repository and revision unless the revision was
/// registered with [`MemoryGitHub::with_unknown_ref`].
#[derive(Debug, Default)]
pub struct MemoryGitHub {
    state: Mutex<FakeState>,
}

impl MemoryGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` (base64) inline for `path`.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.with_contents(path, Ok(RepoContents::File(RepoContent::file(path, content))))
    }

    /// Serve an empty-content stub for `path` pointing at blob `sha`.
    pub fn with_blob_stub(self, path: &str, sha: &str) -> Self {
        self.with_contents(
            path,
            Ok(RepoContents::File(RepoContent::blob_stub(path, sha))),
        )
    }

    /// Serve a directory listing for `path`.
    pub fn with_directory(self, path: &str, entries: Vec<RepoContent>) -> Self {
        self.with_contents(path, Ok(RepoContents::Directory(entries)))
    }

    /// Fail content reads of `path` with `err`.
    pub fn with_content_error(self, path: &str, err: GitHubError) -> Self {
        self.with_contents(path, Err(err))
    }

    fn with_contents(self, path: &str, response: Result<RepoContents>) -> Self {
        self.lock().contents.insert(path.to_string(), response);
        self
    }

    /// Serve blob `sha` with base64 `content`.
    pub fn with_blob(self, sha: &str, content: &str) -> Self {
        let blob = Blob {
            sha: sha.to_string(),
            content: content.to_string(),
            encoding: "base64".to_string(),
            size: content.len() as u64,
        };
        self.lock().blobs.insert(sha.to_string(), Ok(blob));
        self
    }

    /// Fail reads of blob `sha` with `err`.
    pub fn with_blob_error(self, sha: &str, err: GitHubError) -> Self {
        self.lock().blobs.insert(sha.to_string(), Err(err));
        self
    }

    /// Latest commit on `repo`'s default branch.
    pub fn with_latest_commit(self, repo: &str, sha: &str) -> Self {
        self.lock()
            .latest_commits
            .insert(repo.to_string(), Ok(sha.to_string()));
        self
    }

    /// Fail latest-commit lookups on `repo` with `err`.
    pub fn with_latest_commit_error(self, repo: &str, err: GitHubError) -> Self {
        self.lock().latest_commits.insert(repo.to_string(), Err(err));
        self
    }

    /// Reject content reads at `revision` with [`GitHubError::UnknownRef`].
    pub fn with_unknown_ref(self, revision: &str) -> Self {
        self.lock().unknown_refs.insert(revision.to_string());
        self
    }

    pub fn with_labels(self, repo: &str, labels: Vec<Label>) -> Self {
        self.lock().labels.insert(repo.to_string(), labels);
        self
    }

    pub fn with_repos(self, repos: Vec<Repository>) -> Self {
        self.lock().repos = repos;
        self
    }

    /// All calls observed so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Number of blob reads observed so far.
    pub fn blob_reads(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, ApiCall::RepoBlob { .. }))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl GitHubApi for MemoryGitHub {
    async fn get_repo_content(
        &self,
        repo: &str,
        path: &str,
        revision: &str,
    ) -> Result<RepoContents> {
        let mut state = self.lock();
        state.calls.push(ApiCall::RepoContent {
            repo: repo.to_string(),
            path: path.to_string(),
            revision: revision.to_string(),
        });

        if state.unknown_refs.contains(revision) {
            return Err(GitHubError::UnknownRef {
                revision: revision.to_string(),
            });
        }

        state
            .contents
            .get(path)
            .cloned()
            .unwrap_or_else(|| {
                Err(GitHubError::NotFound {
                    resource: format!("{repo}/{path}"),
                })
            })
    }

    async fn get_repo_blob(&self, repo: &str, sha: &str) -> Result<Blob> {
        let mut state = self.lock();
        state.calls.push(ApiCall::RepoBlob {
            repo: repo.to_string(),
            sha: sha.to_string(),
        });

        state.blobs.get(sha).cloned().unwrap_or_else(|| {
            Err(GitHubError::NotFound {
                resource: format!("{repo}/git/blobs/{sha}"),
            })
        })
    }

    async fn get_latest_commit_hash(&self, repo: &str) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(ApiCall::LatestCommitHash {
            repo: repo.to_string(),
        });

        state
            .latest_commits
            .get(repo)
            .cloned()
            .unwrap_or_else(|| {
                Err(GitHubError::NotFound {
                    resource: repo.to_string(),
                })
            })
    }

    async fn create_issue(&self, repo: &str, request: &IssueRequest) -> Result<Issue> {
        let mut state = self.lock();
        state.calls.push(ApiCall::CreateIssue {
            repo: repo.to_string(),
            title: request.title.clone(),
        });
        state.issues_created += 1;

        let number = state.issues_created;
        Ok(Issue {
            number,
            title: request.title.clone(),
            html_url: format!("https://github.com/{repo}/issues/{number}"),
            state: "open".to_string(),
        })
    }

    async fn list_labels(&self, repo: &str) -> Result<Vec<Label>> {
        let mut state = self.lock();
        state.calls.push(ApiCall::ListLabels {
            repo: repo.to_string(),
        });
        Ok(state.labels.get(repo).cloned().unwrap_or_default())
    }

    async fn list_repos(&self) -> Result<Vec<Repository>> {
        let mut state = self.lock();
        state.calls.push(ApiCall::ListRepos);
        Ok(state.repos.clone())
    }

    async fn delete_installation(&self, installation_id: &str) -> Result<()> {
        self.lock().calls.push(ApiCall::DeleteInstallation {
            installation_id: installation_id.to_string(),
        });
        Ok(())
    }
}
