// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.
//!
//! Installs a global `tracing` subscriber from a [`LoggingConfig`]. The
//! `RUST_LOG` environment variable, when set, takes precedence over the
//! configured level.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogFormat, LogLevel, LoggingConfig};

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the logging subsystem.
///
/// Fails if a global subscriber is already installed or the log file cannot
/// be opened.
///
/// # Example
///
/// ```no_run
/// use uanode_config::logging::init_logging;
/// use uanode_config::LoggingConfig;
///
/// init_logging(&LoggingConfig::default())?;
/// # Ok::<(), uanode_config::ConfigError>(())
/// ```
pub fn init_logging(config: &LoggingConfig) -> ConfigResult<()> {
    let filter = build_filter(config.level)?;
    let (writer, ansi) = make_writer(config)?;

    match config.format {
        LogFormat::Text => init_text_logging(filter, writer, ansi, config.with_target),
        LogFormat::Json => init_json_logging(filter, writer, config.with_target),
        LogFormat::Compact => init_compact_logging(filter, writer, ansi),
    }
}

/// Builds the event filter: `RUST_LOG` if set, else the configured level.
pub fn build_filter(level: LogLevel) -> ConfigResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level.as_str())
            .map_err(|e| ConfigError::logging(format!("invalid filter '{}': {}", level.as_str(), e))),
    }
}

fn make_writer(config: &LoggingConfig) -> ConfigResult<(BoxMakeWriter, bool)> {
    match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ConfigError::io(path, e))?;
            Ok((BoxMakeWriter::new(Mutex::new(file)), false))
        }
        None => Ok((
            BoxMakeWriter::new(std::io::stdout),
            std::io::stdout().is_terminal(),
        )),
    }
}

fn init_text_logging(
    filter: EnvFilter,
    writer: BoxMakeWriter,
    ansi: bool,
    with_target: bool,
) -> ConfigResult<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(with_target)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .try_init()
        .map_err(|e| ConfigError::logging(e.to_string()))
}

fn init_json_logging(filter: EnvFilter, writer: BoxMakeWriter, with_target: bool) -> ConfigResult<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_target(with_target)
                .with_file(true)
                .with_line_number(true)
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(writer),
        )
        .try_init()
        .map_err(|e| ConfigError::logging(e.to_string()))
}

fn init_compact_logging(filter: EnvFilter, writer: BoxMakeWriter, ansi: bool) -> ConfigResult<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .try_init()
        .map_err(|e| ConfigError::logging(e.to_string()))
}

// =============================================================================
// Log Level Parsing
// =============================================================================

/// Parses a log level string into a `Level`, defaulting to `INFO`.
pub fn parse_level(level: &str) -> Level {
    match LogLevel::parse(level) {
        Some(level) => to_level(level),
        None => Level::INFO,
    }
}

/// Converts a configured level to a `tracing` level.
pub fn to_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("Info"), Level::INFO);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("invalid"), Level::INFO);
    }

    #[test]
    fn test_build_filter() {
        assert!(build_filter(LogLevel::Debug).is_ok());
    }

    #[test]
    fn test_log_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            file: Some(dir.path().join("uanode.log")),
            ..Default::default()
        };

        let (_, ansi) = make_writer(&config).unwrap();
        assert!(!ansi);
        assert!(dir.path().join("uanode.log").exists());
    }

    #[test]
    fn test_unwritable_log_file() {
        let config = LoggingConfig {
            file: Some("/nonexistent/dir/uanode.log".into()),
            ..Default::default()
        };
        assert!(matches!(make_writer(&config), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_second_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            format: LogFormat::Json,
            file: Some(dir.path().join("uanode.log")),
            ..Default::default()
        };

        let first = init_logging(&config);
        let second = init_logging(&config);
        assert!(first.is_ok() || second.is_err());
        assert!(matches!(second, Err(ConfigError::Logging { .. })));
    }
}
