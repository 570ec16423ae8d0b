//! File content retrieval with the blob fallback for large files.
//!
//! GitHub's contents endpoint withholds the body of large files and returns
//! an empty `content` with the blob SHA. Those files are read in a second
//! step through the blob endpoint. At most two reads are made per file.

use github_api::{GitHubApi, GitHubError, RepoContents};

use crate::error::{EnrichmentError, Result};
use crate::obs;

/// Fetch `path` at `revision` and return its base64 content as supplied by
/// the hosting API.
pub async fn fetch_file(
    client: &dyn GitHubApi,
    repo: &str,
    path: &str,
    revision: &str,
) -> Result<String> {
    let file_fetch_error = |source: GitHubError| EnrichmentError::FileFetch {
        repo: repo.to_string(),
        path: path.to_string(),
        revision: revision.to_string(),
        source,
    };

    let file = match client
        .get_repo_content(repo, path, revision)
        .await
        .map_err(file_fetch_error)?
    {
        RepoContents::File(file) => file,
        RepoContents::Directory(_) => {
            return Err(file_fetch_error(GitHubError::NotFound {
                resource: format!("{repo}/{path} is a directory"),
            }))
        }
    };

    let content = file.content.unwrap_or_default();
    let sha = match file.sha {
        Some(sha) if content.is_empty() && !sha.is_empty() => sha,
        _ => return Ok(content),
    };

    obs::emit_blob_fallback(repo, path, &sha);
    let blob = client
        .get_repo_blob(repo, &sha)
        .await
        .map_err(|source| EnrichmentError::BlobFetch {
            repo: repo.to_string(),
            sha: sha.clone(),
            source,
        })?;

    Ok(blob.content)
}
