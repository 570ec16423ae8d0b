//! SourceLens Core: GitHub-backed stack-trace enrichment
//!
//! Given a stack frame and the deployed service's repository and version,
//! this crate resolves the commit that produced the error, reads the file at
//! that commit and attaches the offending line plus surrounding context.
//!
//! ## Key Components
//!
//! - `rewrite_path`: maps build-machine paths onto repository paths
//! - `IgnoreMatcher`: regex deny-list for vendored paths
//! - `resolve_revision`: service version to commit
//! - `fetch_file`: contents read with the blob fallback for large files
//! - `expand_lines`: target line plus five lines of context each side
//! - `TraceEnhancer`: runs the pipeline per frame and across whole traces

pub mod commit;
pub mod config;
mod error;
pub mod expand;
pub mod fetch;
mod frame;
pub mod ignore;
pub mod obs;
pub mod path;
pub mod telemetry;

mod enhancer;

pub use commit::{looks_like_commit, resolve_revision, Revision, RevisionPolicy, RevisionSource};
pub use config::EnrichmentConfig;
pub use enhancer::{Enhancement, FrameFailure, TraceEnhancer, TraceFailure, TraceReport};
pub use error::{EnrichmentError, ErrorKind, Result};
pub use expand::{decode_content, expand_lines, ExpandedLine, CONTEXT_LINES};
pub use fetch::fetch_file;
pub use frame::{ServiceRef, StackFrame};
pub use ignore::IgnoreMatcher;
pub use path::{rewrite_path, PathPrefixConfig};
pub use telemetry::{init_tracing, LogFormat};

pub use github_api::{GitHubApi, GitHubClient, GitHubConfig, GitHubError};
