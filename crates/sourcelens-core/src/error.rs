//! Enrichment error taxonomy.
//!
//! Every variant is terminal for the frame it was raised on; none are retried
//! here. Ignore-pattern matches are not errors.

use github_api::GitHubError;
use serde::Serialize;

/// Errors produced while enriching a single stack frame.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("stack frame has no {field}")]
    MissingLocation { field: &'static str },

    #[error("service has no GitHub repository configured")]
    MissingRepo,

    #[error("cannot resolve commit for {repo}: {source}")]
    CommitResolution {
        repo: String,
        #[source]
        source: GitHubError,
    },

    #[error("latest commit lookup for {repo} returned an empty hash")]
    EmptyCommit { repo: String },

    #[error("cannot fetch {path} from {repo} at {revision}: {source}")]
    FileFetch {
        repo: String,
        path: String,
        revision: String,
        #[source]
        source: GitHubError,
    },

    #[error("cannot fetch blob {sha} from {repo}: {source}")]
    BlobFetch {
        repo: String,
        sha: String,
        #[source]
        source: GitHubError,
    },

    #[error("cannot decode content of {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("line {line} is outside the file ({len} lines)")]
    LineOutOfRange { line: i64, len: usize },

    #[error("invalid ignore pattern {pattern:?}: {source}")]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("enrichment task failed: {0}")]
    Task(String),
}

/// Stable tag for each [`EnrichmentError`] variant, used in logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingLocation,
    MissingRepo,
    CommitResolution,
    FileFetch,
    BlobFetch,
    Decode,
    LineOutOfRange,
    Config,
    Internal,
}

impl EnrichmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnrichmentError::MissingLocation { .. } => ErrorKind::MissingLocation,
            EnrichmentError::MissingRepo => ErrorKind::MissingRepo,
            EnrichmentError::CommitResolution { .. } | EnrichmentError::EmptyCommit { .. } => {
                ErrorKind::CommitResolution
            }
            EnrichmentError::FileFetch { .. } => ErrorKind::FileFetch,
            EnrichmentError::BlobFetch { .. } => ErrorKind::BlobFetch,
            EnrichmentError::Decode { .. } => ErrorKind::Decode,
            EnrichmentError::LineOutOfRange { .. } => ErrorKind::LineOutOfRange,
            EnrichmentError::InvalidIgnorePattern { .. } | EnrichmentError::Config(_) => {
                ErrorKind::Config
            }
            EnrichmentError::Task(_) => ErrorKind::Internal,
        }
    }

    /// Content read failed because the hosting API could not resolve the revision.
    pub fn is_unknown_ref(&self) -> bool {
        matches!(self, EnrichmentError::FileFetch { source, .. } if source.is_unknown_ref())
    }
}

/// Result type for enrichment operations.
pub type Result<T> = std::result::Result<T, EnrichmentError>;
