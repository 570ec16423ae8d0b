//! Per-frame and whole-trace enrichment.
//!
//! For each frame: ignore check, path rewrite, commit resolution, file fetch,
//! decode, then line expansion. Frames are independent, so a whole trace is
//! enriched concurrently and a failing frame falls back to its original.

use std::sync::Arc;

use github_api::GitHubApi;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::commit::{latest_revision, resolve_revision, RevisionPolicy, RevisionSource};
use crate::config::EnrichmentConfig;
use crate::error::{EnrichmentError, ErrorKind, Result};
use crate::expand::{decode_content, expand_lines};
use crate::fetch::fetch_file;
use crate::frame::{ServiceRef, StackFrame};
use crate::ignore::IgnoreMatcher;
use crate::obs;
use crate::path::PathPrefixConfig;

/// Outcome of a successful [`TraceEnhancer::enhance`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enhancement {
    /// A copy of the frame with source context attached.
    Enriched(StackFrame),
    /// The frame matched an ignore pattern and is returned unchanged.
    Ignored(StackFrame),
}

impl Enhancement {
    pub fn frame(&self) -> &StackFrame {
        match self {
            Enhancement::Enriched(frame) | Enhancement::Ignored(frame) => frame,
        }
    }

    pub fn into_frame(self) -> StackFrame {
        match self {
            Enhancement::Enriched(frame) | Enhancement::Ignored(frame) => frame,
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self, Enhancement::Enriched(_))
    }
}

/// Error from [`TraceEnhancer::enhance`]: the frame as it was passed in,
/// with its recorded `file_path`, plus the reason enrichment stopped.
#[derive(Debug, Clone, thiserror::Error, Serialize)]
#[error("{error}")]
pub struct FrameFailure {
    pub frame: StackFrame,
    #[source]
    #[serde(serialize_with = "serialize_error")]
    pub error: EnrichmentError,
}

impl FrameFailure {
    pub fn new(frame: StackFrame, error: EnrichmentError) -> Self {
        FrameFailure { frame, error }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn file_path(&self) -> Option<&str> {
        self.frame.file_path.as_deref()
    }

    pub fn into_frame(self) -> StackFrame {
        self.frame
    }
}

fn serialize_error<S>(error: &EnrichmentError, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut state = serializer.serialize_struct("EnrichmentError", 2)?;
    state.serialize_field("kind", &error.kind())?;
    state.serialize_field("message", &error.to_string())?;
    state.end()
}

/// A failed frame and its position in the trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceFailure {
    pub index: usize,
    #[serde(flatten)]
    pub failure: FrameFailure,
}

/// Result of enriching every frame of a trace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraceReport {
    /// Frames in input order; failed frames are returned unchanged
    pub frames: Vec<StackFrame>,
    pub enriched: usize,
    pub ignored: usize,
    pub failures: Vec<TraceFailure>,
}

/// Enriches stack frames with source lines read from GitHub.
#[derive(Clone)]
pub struct TraceEnhancer {
    client: Arc<dyn GitHubApi>,
    prefixes: PathPrefixConfig,
    ignore: IgnoreMatcher,
    policy: RevisionPolicy,
    max_concurrency: usize,
}

impl TraceEnhancer {
    /// Build an enhancer. Fails if an ignore pattern does not compile or the
    /// config is otherwise invalid.
    pub fn new(client: Arc<dyn GitHubApi>, config: &EnrichmentConfig) -> Result<Self> {
        config.validate()?;
        Ok(TraceEnhancer {
            client,
            prefixes: config.prefixes(),
            ignore: IgnoreMatcher::new(&config.ignore_patterns)?,
            policy: config.revision_policy,
            max_concurrency: config.max_concurrency,
        })
    }

    pub fn is_ignored(&self, file_path: &str) -> bool {
        self.ignore.is_ignored(file_path)
    }

    /// Repository path for a recorded file path.
    pub fn repo_path_for(&self, file_path: &str) -> String {
        self.prefixes.rewrite(file_path)
    }

    /// Enrich a single frame.
    ///
    /// A frame without a file path or line number is an error. A frame whose
    /// path matches an ignore pattern comes back unchanged as
    /// [`Enhancement::Ignored`]. On error the original frame is handed back
    /// inside the [`FrameFailure`].
    pub async fn enhance(
        &self,
        frame: &StackFrame,
        service: &ServiceRef,
        service_version: &str,
    ) -> std::result::Result<Enhancement, FrameFailure> {
        self.try_enhance(frame, service, service_version)
            .await
            .map_err(|error| FrameFailure::new(frame.clone(), error))
    }

    async fn try_enhance(
        &self,
        frame: &StackFrame,
        service: &ServiceRef,
        service_version: &str,
    ) -> Result<Enhancement> {
        let file_path = frame
            .file_path
            .as_deref()
            .ok_or(EnrichmentError::MissingLocation { field: "file path" })?;
        let line_number = frame.line_number.ok_or(EnrichmentError::MissingLocation {
            field: "line number",
        })?;

        if self.ignore.is_ignored(file_path) {
            obs::emit_frame_ignored(file_path);
            return Ok(Enhancement::Ignored(frame.clone()));
        }

        let repo = service
            .repo_path
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or(EnrichmentError::MissingRepo)?;

        let span = obs::frame_span(repo, file_path, Some(line_number));
        self.enrich(frame, repo, file_path, line_number, service_version)
            .instrument(span)
            .await
            .map(Enhancement::Enriched)
    }

    async fn enrich(
        &self,
        frame: &StackFrame,
        repo: &str,
        file_path: &str,
        line_number: i64,
        service_version: &str,
    ) -> Result<StackFrame> {
        let client = self.client.as_ref();
        let path = self.prefixes.rewrite(file_path);

        let mut revision = resolve_revision(client, repo, service_version, self.policy).await?;
        let encoded = match fetch_file(client, repo, &path, &revision.sha).await {
            Err(err) if err.is_unknown_ref() && revision.source == RevisionSource::ServiceVersion => {
                obs::emit_revision_fallback(repo, service_version);
                revision = latest_revision(client, repo).await?;
                fetch_file(client, repo, &path, &revision.sha).await?
            }
            other => other?,
        };

        let text = decode_content(&path, &encoded)?;
        let lines: Vec<&str> = text.lines().collect();
        let expanded = expand_lines(&lines, line_number)?;

        obs::emit_frame_enriched(repo, &path, &revision.sha, line_number);
        Ok(StackFrame {
            line_content: Some(expanded.content),
            lines_before: Some(expanded.before),
            lines_after: Some(expanded.after),
            ..frame.clone()
        })
    }

    /// Enrich every frame of a trace concurrently.
    ///
    /// Never fails as a whole: each frame that cannot be enriched is kept as
    /// it was and recorded in [`TraceReport::failures`].
    pub async fn enhance_trace(
        &self,
        frames: Vec<StackFrame>,
        service: &ServiceRef,
        service_version: &str,
    ) -> TraceReport {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();

        for (idx, frame) in frames.iter().cloned().enumerate() {
            let enhancer = self.clone();
            let service = service.clone();
            let service_version = service_version.to_string();
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = enhancer.enhance(&frame, &service, &service_version).await;
                (idx, result)
            });
        }

        let mut results: Vec<Option<std::result::Result<Enhancement, FrameFailure>>> =
            frames.iter().map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, result)) => results[idx] = Some(result),
                Err(e) => tracing::error!(event = "frame.task_failed", error = %e),
            }
        }

        let mut report = TraceReport::default();
        for (index, (frame, result)) in frames.into_iter().zip(results).enumerate() {
            let result = result.unwrap_or_else(|| {
                Err(FrameFailure::new(
                    frame,
                    EnrichmentError::Task(format!("no result for frame {index}")),
                ))
            });

            match result {
                Ok(Enhancement::Enriched(enriched)) => {
                    report.enriched += 1;
                    report.frames.push(enriched);
                }
                Ok(Enhancement::Ignored(original)) => {
                    report.ignored += 1;
                    report.frames.push(original);
                }
                Err(failure) => {
                    obs::emit_frame_failed(failure.file_path().unwrap_or_default(), &failure.error);
                    report.frames.push(failure.frame.clone());
                    report.failures.push(TraceFailure { index, failure });
                }
            }
        }

        obs::emit_trace_enriched(
            service.repo_path.as_deref().unwrap_or_default(),
            report.frames.len(),
            report.enriched,
            report.failures.len(),
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use github_api::fakes::MemoryGitHub;

    fn enhancer(github: MemoryGitHub) -> TraceEnhancer {
        TraceEnhancer::new(Arc::new(github), &EnrichmentConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_ignore_pattern_rejected_at_build() {
        let config = EnrichmentConfig::default().with_ignore_patterns(&["[unterminated"]);
        let result = TraceEnhancer::new(Arc::new(MemoryGitHub::new()), &config);
        assert!(matches!(
            result,
            Err(EnrichmentError::InvalidIgnorePattern { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file_path() {
        let frame = StackFrame {
            line_number: Some(1),
            ..Default::default()
        };
        let err = enhancer(MemoryGitHub::new())
            .enhance(&frame, &ServiceRef::new("highlight/highlight"), "1234567890")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingLocation);
    }

    #[tokio::test]
    async fn test_missing_repo() {
        let frame = StackFrame::new("/file.js", 1);
        let err = enhancer(MemoryGitHub::new())
            .enhance(&frame, &ServiceRef::default(), "1234567890")
            .await
            .unwrap_err();
        assert!(matches!(err.error, EnrichmentError::MissingRepo));
        assert_eq!(err.frame, frame);
    }

    #[tokio::test]
    async fn test_ignored_frame_makes_no_calls() {
        let github = Arc::new(MemoryGitHub::new());
        let enhancer = TraceEnhancer::new(github.clone(), &EnrichmentConfig::default()).unwrap();
        let frame = StackFrame::new("/app/node_modules/react/index.js", 10);

        let outcome = enhancer
            .enhance(&frame, &ServiceRef::new("highlight/highlight"), "1234567890")
            .await
            .unwrap();

        assert_eq!(outcome, Enhancement::Ignored(frame));
        assert!(github.calls().is_empty());
    }

    #[test]
    fn test_trace_failure_json_carries_frame_and_kind() {
        let failure = TraceFailure {
            index: 2,
            failure: FrameFailure::new(
                StackFrame::new("/build/file.js", 634),
                EnrichmentError::LineOutOfRange { line: 634, len: 1 },
            ),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["index"], 2);
        assert_eq!(json["frame"]["filePath"], "/build/file.js");
        assert_eq!(json["error"]["kind"], "line_out_of_range");
        assert_eq!(
            json["error"]["message"],
            "line 634 is outside the file (1 lines)"
        );
    }

    #[test]
    fn test_enhancement_accessors() {
        let frame = StackFrame::new("/file.js", 1);
        let outcome = Enhancement::Ignored(frame.clone());
        assert!(!outcome.is_enriched());
        assert_eq!(outcome.frame(), &frame);
        assert_eq!(outcome.into_frame(), frame);
    }
}
