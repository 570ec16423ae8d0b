//! Contract tests for the in-memory GitHub fake.
//!
//! The enrichment tests lean on `MemoryGitHub` reporting calls faithfully, so
//! its behaviour is pinned down here.

use github_api::fakes::{ApiCall, MemoryGitHub};
use github_api::{GitHubApi, GitHubError, IssueRequest, Label, RepoContents, Repository};

#[tokio::test]
async fn content_read_returns_registered_file() {
    let github = MemoryGitHub::new().with_file("/file.js", "Y29uc29sZS5sb2coJ2hlbGxvIHdvcmxkJyk=");

    let contents = github
        .get_repo_content("highlight/highlight", "/file.js", "1234567890")
        .await
        .unwrap();

    match contents {
        RepoContents::File(file) => {
            assert_eq!(
                file.content.as_deref(),
                Some("Y29uc29sZS5sb2coJ2hlbGxvIHdvcmxkJyk=")
            );
        }
        RepoContents::Directory(_) => panic!("expected a file"),
    }
}

#[tokio::test]
async fn content_read_of_unknown_path_is_not_found() {
    let github = MemoryGitHub::new();
    let err = github
        .get_repo_content("highlight/highlight", "/missing.js", "1234567890")
        .await
        .unwrap_err();

    assert!(matches!(err, GitHubError::NotFound { .. }));
}

#[tokio::test]
async fn unknown_ref_takes_precedence_over_registered_file() {
    let github = MemoryGitHub::new()
        .with_file("/file.js", "aGk=")
        .with_unknown_ref("v2.0.0");

    let err = github
        .get_repo_content("highlight/highlight", "/file.js", "v2.0.0")
        .await
        .unwrap_err();
    assert!(err.is_unknown_ref());

    assert!(github
        .get_repo_content("highlight/highlight", "/file.js", "abcdef1")
        .await
        .is_ok());
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let github = MemoryGitHub::new()
        .with_blob_stub("/big.js", "blob-file")
        .with_blob("blob-file", "aGk=")
        .with_latest_commit("highlight/highlight", "0987654321");

    github
        .get_latest_commit_hash("highlight/highlight")
        .await
        .unwrap();
    github
        .get_repo_content("highlight/highlight", "/big.js", "0987654321")
        .await
        .unwrap();
    github
        .get_repo_blob("highlight/highlight", "blob-file")
        .await
        .unwrap();

    assert_eq!(
        github.calls(),
        vec![
            ApiCall::LatestCommitHash {
                repo: "highlight/highlight".to_string()
            },
            ApiCall::RepoContent {
                repo: "highlight/highlight".to_string(),
                path: "/big.js".to_string(),
                revision: "0987654321".to_string(),
            },
            ApiCall::RepoBlob {
                repo: "highlight/highlight".to_string(),
                sha: "blob-file".to_string(),
            },
        ]
    );
    assert_eq!(github.blob_reads(), 1);
}

#[tokio::test]
async fn latest_commit_error_is_returned() {
    let github = MemoryGitHub::new().with_latest_commit_error(
        "highlight/error",
        GitHubError::Unauthorized("Bad credentials".to_string()),
    );

    let err = github
        .get_latest_commit_hash("highlight/error")
        .await
        .unwrap_err();
    assert_eq!(err, GitHubError::Unauthorized("Bad credentials".to_string()));
}

#[tokio::test]
async fn auxiliary_operations_are_served() {
    let github = MemoryGitHub::new()
        .with_labels(
            "highlight/highlight",
            vec![Label {
                name: "bug".to_string(),
                color: "d73a4a".to_string(),
                description: None,
            }],
        )
        .with_repos(vec![Repository {
            name: "highlight".to_string(),
            full_name: "highlight/highlight".to_string(),
            private: false,
            default_branch: Some("main".to_string()),
        }]);

    let issue = github
        .create_issue(
            "highlight/highlight",
            &IssueRequest {
                title: "TypeError: x is undefined".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(issue.number, 1);
    assert_eq!(issue.state, "open");

    let labels = github.list_labels("highlight/highlight").await.unwrap();
    assert_eq!(labels[0].name, "bug");

    let repos = github.list_repos().await.unwrap();
    assert_eq!(repos[0].full_name, "highlight/highlight");

    github.delete_installation("42").await.unwrap();
    assert_eq!(
        github.calls().last(),
        Some(&ApiCall::DeleteInstallation {
            installation_id: "42".to_string()
        })
    );
}
