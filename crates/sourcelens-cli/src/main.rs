//! SourceLens CLI
//!
//! The `sourcelens` command attaches source lines from GitHub to stack frames.
//!
//! ## Commands
//!
//! - `enhance`: enrich a single frame
//! - `trace`: enrich every frame of a trace read from a JSON file
//! - `rewrite-path`: show the repository path for a recorded file path
//! - `check-ignore`: show whether a file path matches an ignore pattern

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use github_api::{GitHubClient, GitHubConfig};
use serde::Serialize;
use sourcelens_core::{
    EnrichmentConfig, Enhancement, LogFormat, RevisionPolicy, ServiceRef, StackFrame,
    TraceEnhancer,
};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "sourcelens")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Attach source context from GitHub to stack traces", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Enrichment config file (TOML); defaults plus SOURCELENS_* env when omitted
    #[arg(short, long, global = true, env = "SOURCELENS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich a single stack frame and print it as JSON
    Enhance {
        /// Repository in owner/repo form
        #[arg(short, long)]
        repo: String,

        /// Deployed service version (commit SHA or release name)
        #[arg(long = "service-version")]
        service_version: String,

        /// File path as recorded in the stack trace
        #[arg(short, long)]
        file: String,

        /// 1-based line number
        #[arg(short, long)]
        line: i64,

        #[arg(long)]
        column: Option<i64>,

        #[arg(long)]
        function: Option<String>,

        /// Read files at the latest commit regardless of the service version
        #[arg(long)]
        latest: bool,
    },

    /// Enrich all frames of a trace (JSON array of frames) and print the report
    Trace {
        /// Repository in owner/repo form
        #[arg(short, long)]
        repo: String,

        /// Deployed service version (commit SHA or release name)
        #[arg(long = "service-version")]
        service_version: String,

        /// JSON file holding the frames
        #[arg(short, long)]
        input: PathBuf,

        /// Read files at the latest commit regardless of the service version
        #[arg(long)]
        latest: bool,
    },

    /// Print the repository path for a recorded file path
    RewritePath {
        path: String,
    },

    /// Report whether a file path matches an ignore pattern
    CheckIgnore {
        path: String,
    },
}

#[derive(Serialize)]
struct EnhanceOutput {
    ignored: bool,
    frame: StackFrame,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    sourcelens_core::init_tracing(format, level);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Enhance {
            repo,
            service_version,
            file,
            line,
            column,
            function,
            latest,
        } => {
            let frame = StackFrame {
                column_number: column,
                function_name: function,
                ..StackFrame::new(&file, line)
            };
            cmd_enhance(config, &repo, &service_version, frame, latest).await
        }
        Commands::Trace {
            repo,
            service_version,
            input,
            latest,
        } => cmd_trace(config, &repo, &service_version, &input, latest).await,
        Commands::RewritePath { path } => {
            println!("{}", config.prefixes().rewrite(&path));
            Ok(())
        }
        Commands::CheckIgnore { path } => cmd_check_ignore(config, &path),
    }
}

fn load_config(path: Option<&Path>) -> Result<EnrichmentConfig> {
    match path {
        Some(path) => EnrichmentConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => Ok(EnrichmentConfig::from_env()),
    }
}

fn build_enhancer(config: EnrichmentConfig, latest: bool) -> Result<TraceEnhancer> {
    let config = if latest {
        config.with_revision_policy(RevisionPolicy::Latest)
    } else {
        config
    };

    let github_config = GitHubConfig::from_env();
    if github_config.token.is_none() {
        tracing::warn!("GITHUB_TOKEN is not set; requests are unauthenticated and heavily rate limited");
    }
    let client = GitHubClient::new(github_config).context("Failed to create GitHub client")?;

    TraceEnhancer::new(Arc::new(client), &config).context("Invalid enrichment config")
}

async fn cmd_enhance(
    config: EnrichmentConfig,
    repo: &str,
    service_version: &str,
    frame: StackFrame,
    latest: bool,
) -> Result<()> {
    let enhancer = build_enhancer(config, latest)?;
    let outcome = enhancer
        .enhance(&frame, &ServiceRef::new(repo), service_version)
        .await
        .with_context(|| format!("Failed to enhance frame {:?}", frame.file_path))?;

    let output = EnhanceOutput {
        ignored: matches!(outcome, Enhancement::Ignored(_)),
        frame: outcome.into_frame(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn cmd_trace(
    config: EnrichmentConfig,
    repo: &str,
    service_version: &str,
    input: &Path,
    latest: bool,
) -> Result<()> {
    let frames = read_frames(input)?;
    let enhancer = build_enhancer(config, latest)?;

    info!("Enriching {} frames from {}", frames.len(), repo);
    let report = enhancer
        .enhance_trace(frames, &ServiceRef::new(repo), service_version)
        .await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_check_ignore(config: EnrichmentConfig, path: &str) -> Result<()> {
    let matcher = sourcelens_core::IgnoreMatcher::new(&config.ignore_patterns)
        .context("Invalid ignore pattern")?;
    let ignored = matcher.is_ignored(path);
    println!("{}", if ignored { "ignored" } else { "not ignored" });
    Ok(())
}

fn read_frames(path: &Path) -> Result<Vec<StackFrame>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}
