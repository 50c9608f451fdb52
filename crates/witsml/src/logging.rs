// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.
//!
//! The crate itself only emits `tracing` events. Applications that have no
//! subscriber of their own can install one here.

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ConfigurationError, WitsmlResult};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON lines.
    Json,
    /// Compact single-line text.
    Compact,
}

// =============================================================================
// Logging Initialization
// =============================================================================

/// Installs a global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Fails if a global subscriber
/// is already set or a directive does not parse.
///
/// ```no_run
/// use witsml::logging::{init_logging, LogFormat};
///
/// init_logging("info,witsml=debug", LogFormat::Text).unwrap();
/// ```
pub fn init_logging(level: &str, format: LogFormat) -> WitsmlResult<()> {
    let filter = build_filter(level)?;
    let result = match format {
        LogFormat::Text => {
            let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_ansi(is_terminal))
                .try_init()
        }
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
    };
    result.map_err(|e| ConfigurationError::invalid_value("logging", e.to_string()).into())
}

fn build_filter(level: &str) -> WitsmlResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let mut filter = EnvFilter::try_new(level)
        .map_err(|e| ConfigurationError::invalid_value("logging.level", e.to_string()))?;
    for directive in ["hyper=warn", "reqwest=info", "rustls=warn"] {
        let directive: Directive = directive
            .parse()
            .map_err(|e: ParseError| ConfigurationError::invalid_value("logging.level", e.to_string()))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

/// Parses a log level string, defaulting to `INFO`.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
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
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("invalid"), Level::INFO);
    }

    #[test]
    fn test_format_serde() {
        let format: LogFormat = serde_json::from_str("\"compact\"").unwrap();
        assert_eq!(format, LogFormat::Compact);
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), "\"json\"");
    }
}
