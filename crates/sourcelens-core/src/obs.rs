//! Structured log events for frame enrichment.
//!
//! Every event carries an `event` field so log pipelines can filter on it.
//! Outcomes are emitted at `info!`, per-frame failures and revision
//! fallbacks at `warn!`, and blob fallbacks at `debug!`.

use tracing::{debug, info, warn, Span};

use crate::error::EnrichmentError;

/// Span covering the enrichment of one frame.
///
/// Attach it with `tracing::Instrument` rather than entering it, since the
/// enrichment future crosses await points.
pub fn frame_span(repo: &str, file_path: &str, line_number: Option<i64>) -> Span {
    tracing::info_span!(
        "sourcelens.frame",
        repo = %repo,
        file_path = %file_path,
        line_number = ?line_number,
    )
}

pub fn emit_frame_enriched(repo: &str, path: &str, revision: &str, line_number: i64) {
    info!(
        event = "frame.enriched",
        repo = %repo,
        path = %path,
        revision = %revision,
        line_number = line_number,
    );
}

pub fn emit_frame_ignored(file_path: &str) {
    info!(event = "frame.ignored", file_path = %file_path);
}

pub fn emit_frame_failed(file_path: &str, error: &EnrichmentError) {
    warn!(
        event = "frame.failed",
        file_path = %file_path,
        kind = ?error.kind(),
        error = %error,
    );
}

pub fn emit_revision_fallback(repo: &str, service_version: &str) {
    warn!(
        event = "revision.fallback",
        repo = %repo,
        service_version = %service_version,
        "service version is not a known revision, retrying at latest commit"
    );
}

pub fn emit_blob_fallback(repo: &str, path: &str, sha: &str) {
    debug!(event = "content.blob_fallback", repo = %repo, path = %path, sha = %sha);
}

pub fn emit_trace_enriched(repo: &str, frames: usize, enriched: usize, failed: usize) {
    info!(
        event = "trace.enriched",
        repo = %repo,
        frames = frames,
        enriched = enriched,
        failed = failed,
    );
}
