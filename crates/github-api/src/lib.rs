//! GitHub-API: repository-hosting capability for SourceLens
//!
//! This crate exposes the operations SourceLens needs from GitHub as the
//! async [`GitHubApi`] trait, with a `reqwest` production adapter
//! ([`GitHubClient`]) and an in-memory fake ([`fakes::MemoryGitHub`]).
//!
//! ## Key Components
//!
//! - `GitHubApi`: content, blob, commit, issue, label, repo and installation operations
//! - `GitHubClient`: REST adapter configured by `GitHubConfig`
//! - `RepoContents`: a contents read, either a file or a directory listing

mod client;
mod error;
pub mod fakes;
mod types;

pub use client::{GitHubApi, GitHubClient, GitHubConfig};
pub use error::GitHubError;
pub use types::{Blob, Issue, IssueRequest, Label, RepoContent, RepoContents, Repository};

/// Result type for github-api operations
pub type Result<T> = std::result::Result<T, GitHubError>;
