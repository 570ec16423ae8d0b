//! Log subscriber setup for the `sourcelens` binary.
//!
//! The requested verbosity applies to SourceLens targets only. HTTP and TLS
//! dependencies stay at `warn` so a debug run shows enrichment decisions
//! rather than connection-pool chatter. `SOURCELENS_LOG` replaces the whole
//! filter when set.

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV: &str = "SOURCELENS_LOG";

/// Targets that follow the requested level.
const SOURCELENS_TARGETS: [&str; 3] = ["sourcelens", "sourcelens_core", "github_api"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event, fields flattened, current frame span attached
    Json,
}

/// Filter used when `SOURCELENS_LOG` is unset: `warn` globally, `level` for
/// SourceLens targets.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    std::iter::once("warn".to_string())
        .chain(SOURCELENS_TARGETS.iter().map(|t| format!("{t}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Install the global subscriber, writing to stderr so stdout stays
/// machine-readable. Returns `false` if a subscriber was already installed.
pub fn init_tracing(format: LogFormat, level: Level) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter(level));
    let layer = fmt::layer().with_writer(std::io::stderr);

    match format {
        LogFormat::Text => registry.with(layer).try_init().is_ok(),
        LogFormat::Json => registry
            .with(
                layer
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
            .is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_scope_level_to_sourcelens_targets() {
        assert_eq!(
            default_directives(Level::DEBUG),
            "warn,sourcelens=debug,sourcelens_core=debug,github_api=debug"
        );
    }

    #[test]
    fn test_default_directives_parse() {
        for level in [Level::ERROR, Level::INFO, Level::TRACE] {
            assert!(EnvFilter::try_new(default_directives(level)).is_ok());
        }
    }

    #[test]
    fn test_log_format_from_config_value() {
        #[derive(Deserialize)]
        struct Logging {
            format: LogFormat,
        }
        let logging: Logging = toml::from_str(r#"format = "json""#).unwrap();
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }
}
