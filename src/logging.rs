//! Tracing subscriber setup
//!
//! Human-readable logs go to stderr. When a log directory is configured, a
//! daily-rolling JSON log is written there as well.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const DEFAULT_DIRECTIVE: &str = "info";
const LOG_FILE_PREFIX: &str = "session-viewer.log";

/// Where and how much to log
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset
    pub default_directive: Option<String>,
    /// Directory for rolling JSON log files
    pub log_dir: Option<PathBuf>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.log_dir = dir;
        self
    }

    pub fn with_default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = Some(directive.into());
        self
    }

    fn env_filter(&self) -> EnvFilter {
        let fallback = self.default_directive.as_deref().unwrap_or(DEFAULT_DIRECTIVE);
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the program.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(config.env_filter());

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(config.env_filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new()
            .with_log_dir(Some(PathBuf::from("/tmp/logs")))
            .with_default_directive("debug");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(config.default_directive.as_deref(), Some("debug"));
    }

    #[test]
    fn test_file_logging_creates_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("logs");
        let config = LogConfig::new().with_log_dir(Some(dir.clone()));

        // Another test may already own the global subscriber; the directory is
        // created either way.
        let _ = init_logging(&config);
        assert!(dir.is_dir());
    }
}
