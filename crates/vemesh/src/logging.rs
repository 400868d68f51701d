//! # Logging
//!
//! Structured logging built on `tracing`.
//!
//! Output goes to stderr so that command results on stdout stay
//! machine-readable. An optional file sink rolls daily.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vemesh::logging::{init_logging, LogConfig};
//!
//! let _guard = init_logging(&LogConfig::default()).expect("logging init");
//! tracing::info!("adapter started");
//! ```

use std::io;
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Error type for logging initialization failures.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Failed to create the log file or its directory.
    #[error("Failed to create log file: {0}")]
    FileCreation(String),

    /// A global subscriber is already installed, or installation failed.
    #[error("Failed to initialize logging: {0}")]
    SubscriberInit(String),

    /// Invalid configuration.
    #[error("Invalid log configuration: {0}")]
    InvalidConfig(String),
}

/// Minimum severity that is logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// trace and above
    Trace,
    /// debug and above
    Debug,
    /// info and above
    #[default]
    Info,
    /// warn and above
    Warn,
    /// error only
    Error,
}

impl LogLevel {
    /// Convert to a `tracing` level.
    #[must_use]
    pub const fn as_tracing_level(self) -> Level {
        match self {
            Self::Trace => Level::TRACE,
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warn => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }

    /// Directive string for [`EnvFilter`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
    /// Single-line, human-readable.
    Compact,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
            Self::Compact => f.write_str("compact"),
        }
    }
}

/// Configuration for [`init_logging`].
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Minimum level. `RUST_LOG` directives are appended to it.
    pub level: LogLevel,

    /// Line format for both sinks.
    pub format: LogFormat,

    /// Optional daily-rolling log file. Its directory is created if missing.
    pub file_path: Option<PathBuf>,
}

/// Keeps the file writer alive; logs are flushed when it is dropped.
pub struct LogGuard {
    guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl LogGuard {
    /// Whether a file sink is attached.
    #[must_use]
    pub const fn has_file_sink(&self) -> bool {
        self.guard.is_some()
    }
}

impl std::fmt::Debug for LogGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGuard")
            .field("has_file_guard", &self.guard.is_some())
            .finish()
    }
}

/// Build the level filter, honoring extra `RUST_LOG` directives.
///
/// # Errors
///
/// Returns [`LogError::InvalidConfig`] if the directives do not parse.
pub fn build_filter(level: LogLevel) -> Result<EnvFilter, LogError> {
    let mut directives = level.as_str().to_string();
    if let Ok(extra) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !extra.trim().is_empty() {
            directives.push(',');
            directives.push_str(&extra);
        }
    }
    EnvFilter::try_new(&directives).map_err(|e| LogError::InvalidConfig(e.to_string()))
}

fn file_writer(
    path: &Path,
) -> Result<
    (
        tracing_appender::non_blocking::NonBlocking,
        tracing_appender::non_blocking::WorkerGuard,
    ),
    LogError,
> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .map_err(|e| LogError::FileCreation(format!("{}: {e}", dir.display())))?;

    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| LogError::InvalidConfig("invalid log file name".to_string()))?;

    let appender = tracing_appender::rolling::daily(dir, filename);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for as long as logging is needed.
///
/// # Errors
///
/// Returns [`LogError`] if the file sink cannot be created or a subscriber
/// is already installed.
pub fn init_logging(config: &LogConfig) -> Result<LogGuard, LogError> {
    let filter = build_filter(config.level)?;

    let (writer, guard) = match &config.file_path {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let init = match config.format {
        LogFormat::Pretty => {
            let stderr = fmt::layer().pretty().with_writer(io::stderr).with_target(true);
            let file = writer.map(|w| fmt::layer().with_writer(w).with_ansi(false));
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(file)
                .try_init()
        }
        LogFormat::Json => {
            let stderr = fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true);
            let file = writer.map(|w| fmt::layer().json().with_writer(w));
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(file)
                .try_init()
        }
        LogFormat::Compact => {
            let stderr = fmt::layer().compact().with_writer(io::stderr);
            let file = writer.map(|w| fmt::layer().compact().with_writer(w).with_ansi(false));
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(file)
                .try_init()
        }
    };
    init.map_err(|e| LogError::SubscriberInit(e.to_string()))?;

    Ok(LogGuard { guard })
}

/// Map a `-v` count to a level.
///
/// ```
/// use vemesh::logging::{verbosity_to_level, LogLevel};
///
/// assert_eq!(verbosity_to_level(0), LogLevel::Warn);
/// assert_eq!(verbosity_to_level(2), LogLevel::Debug);
/// ```
#[must_use]
pub const fn verbosity_to_level(verbosity: u8) -> LogLevel {
    match verbosity {
        0 => LogLevel::Warn,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_verbosity_to_level() {
        assert_eq!(verbosity_to_level(0), LogLevel::Warn);
        assert_eq!(verbosity_to_level(1), LogLevel::Info);
        assert_eq!(verbosity_to_level(2), LogLevel::Debug);
        assert_eq!(verbosity_to_level(3), LogLevel::Trace);
        assert_eq!(verbosity_to_level(255), LogLevel::Trace);
    }

    #[test]
    fn test_level_strings() {
        for (level, name) in [
            (LogLevel::Trace, "trace"),
            (LogLevel::Debug, "debug"),
            (LogLevel::Info, "info"),
            (LogLevel::Warn, "warn"),
            (LogLevel::Error, "error"),
        ] {
            assert_eq!(level.as_str(), name);
            assert_eq!(level.to_string(), name);
        }
        assert_eq!(LogLevel::Debug.as_tracing_level(), Level::DEBUG);
    }

    #[test]
    fn test_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file_path.is_none());
        assert_eq!(LogFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_build_filter_accepts_every_level() {
        for level in [LogLevel::Trace, LogLevel::Warn, LogLevel::Error] {
            assert!(build_filter(level).is_ok());
        }
    }

    #[test]
    fn test_file_writer_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vemesh.log");
        let (_writer, _guard) = file_writer(&path).unwrap();
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_file_writer_rejects_missing_name() {
        let result = file_writer(Path::new("/"));
        assert!(matches!(result, Err(LogError::InvalidConfig(_))));
    }
}
