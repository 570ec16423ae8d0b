//! Error types for github-api

use thiserror::Error;

/// Errors that can occur talking to the GitHub REST API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GitHubError {
    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Repository, path, blob or installation does not exist
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// The revision could not be resolved to a commit
    #[error("Unknown revision: {revision}")]
    UnknownRef { revision: String },

    /// Missing or rejected credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status
    #[error("GitHub returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Client could not be configured
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl GitHubError {
    /// Whether the failure is attributable to an unresolvable revision.
    pub fn is_unknown_ref(&self) -> bool {
        matches!(self, GitHubError::UnknownRef { .. })
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GitHubError::Decode(err.to_string())
        } else {
            GitHubError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_ref_classification() {
        let err = GitHubError::UnknownRef {
            revision: "v1.2.3".to_string(),
        };
        assert!(err.is_unknown_ref());
        assert!(err.to_string().contains("v1.2.3"));

        let err = GitHubError::NotFound {
            resource: "highlight/highlight/file.js".to_string(),
        };
        assert!(!err.is_unknown_ref());
    }

    #[test]
    fn test_status_error_display() {
        let err = GitHubError::Status {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "GitHub returned 502: Bad Gateway");
    }
}
