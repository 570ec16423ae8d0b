//! Wire types for the subset of the GitHub REST API used by SourceLens.

use serde::{Deserialize, Serialize};

/// A single entry returned by the contents endpoint.
///
/// For files, `content` holds base64 text. Files above the inline size limit
/// come back with an empty `content` and must be read through the blob API
/// using `sha`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoContent {
    /// Entry type: `file`, `dir`, `symlink` or `submodule`
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Path relative to the repository root
    #[serde(default)]
    pub path: String,
    /// Base64 file content (absent for directory entries)
    #[serde(default)]
    pub content: Option<String>,
    /// Content encoding, normally `base64`
    #[serde(default)]
    pub encoding: Option<String>,
    /// Git blob SHA of the entry
    #[serde(default)]
    pub sha: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
}

impl RepoContent {
    /// File entry with inline base64 content.
    pub fn file(path: &str, content: &str) -> Self {
        RepoContent {
            kind: "file".to_string(),
            path: path.to_string(),
            content: Some(content.to_string()),
            encoding: Some("base64".to_string()),
            sha: None,
            size: content.len() as u64,
        }
    }

    /// File entry whose content was withheld; the blob `sha` must be read instead.
    pub fn blob_stub(path: &str, sha: &str) -> Self {
        RepoContent {
            kind: "file".to_string(),
            path: path.to_string(),
            content: Some(String::new()),
            encoding: Some("none".to_string()),
            sha: Some(sha.to_string()),
            size: 0,
        }
    }
}

/// Result of a contents read: a single file or a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepoContents {
    // Listed first: a derived struct also accepts a JSON sequence.
    Directory(Vec<RepoContent>),
    File(RepoContent),
}

/// Git blob as returned by `GET /repos/{repo}/git/blobs/{sha}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    #[serde(default)]
    pub sha: String,
    /// Base64 content
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
    #[serde(default)]
    pub size: u64,
}

/// Minimal commit entry from `GET /repos/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommitSummary {
    pub sha: String,
}

/// Request body for issue creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

/// Created issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub state: String,
}

/// Repository label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Repository visible to the installation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    /// `owner/repo`
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Envelope of `GET /installation/repositories`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InstallationRepositories {
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

/// Error body GitHub returns alongside non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_file_deserializes() {
        let json = r#"{
            "type": "file",
            "path": "src/index.js",
            "content": "Y29uc29sZS5sb2co\nJ2hlbGxvIHdvcmxkJyk=\n",
            "encoding": "base64",
            "sha": "3d21ec53a331a6f037a91c368710b99387d012c1",
            "size": 26
        }"#;
        let contents: RepoContents = serde_json::from_str(json).unwrap();
        match contents {
            RepoContents::File(file) => {
                assert_eq!(file.kind, "file");
                assert_eq!(file.path, "src/index.js");
                assert!(file.content.unwrap().starts_with("Y29uc29sZS5sb2co"));
            }
            RepoContents::Directory(_) => panic!("expected a file"),
        }
    }

    #[test]
    fn test_contents_directory_deserializes() {
        let json = r#"[
            {"type": "file", "path": "src/a.js", "sha": "aaa", "size": 10},
            {"type": "dir", "path": "src/lib", "sha": "bbb", "size": 0}
        ]"#;
        let contents: RepoContents = serde_json::from_str(json).unwrap();
        match contents {
            RepoContents::Directory(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[1].kind, "dir");
                assert!(entries[0].content.is_none());
            }
            RepoContents::File(_) => panic!("expected a directory"),
        }
    }

    #[test]
    fn test_issue_request_skips_empty_fields() {
        let request = IssueRequest {
            title: "TypeError in checkout".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"title": "TypeError in checkout"}));
    }

    #[test]
    fn test_blob_stub_has_empty_content() {
        let stub = RepoContent::blob_stub("big.js", "abc123");
        assert_eq!(stub.content.as_deref(), Some(""));
        assert_eq!(stub.sha.as_deref(), Some("abc123"));
    }
}
