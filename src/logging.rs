// src/logging.rs

//! Optional `tracing` subscriber for applications embedding `dagrun`.
//!
//! The library only emits events; nothing is printed unless a subscriber is
//! installed. [`init_logging`] installs a stderr `fmt` subscriber filtered by,
//! in order of precedence:
//! 1. the level passed in, applied to every target;
//! 2. the `DAGRUN_LOG` environment variable, which accepts full `EnvFilter`
//!    directives such as `dagrun::engine=debug,info`;
//! 3. `info`.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "DAGRUN_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(level, std::env::var(LOG_ENV).ok().as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)
        .context("failed to install tracing subscriber")
}

/// Invalid `DAGRUN_LOG` directives fall back to the default.
fn build_filter(level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(level) = level {
        return EnvFilter::new(level.directive());
    }
    env_value
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_wins_over_environment() {
        let filter = build_filter(Some(LogLevel::Trace), Some("error"));
        assert!(filter.to_string().contains("trace"));
        assert!(!filter.to_string().contains("error"));
    }

    #[test]
    fn environment_accepts_target_directives() {
        let filter = build_filter(None, Some(" dagrun::engine=debug "));
        assert!(filter.to_string().contains("dagrun::engine=debug"));
    }

    #[test]
    fn missing_or_invalid_environment_uses_default() {
        assert_eq!(build_filter(None, None).to_string(), "info");
        assert_eq!(build_filter(None, Some("dagrun=loud")).to_string(), "info");
    }

    #[test]
    fn log_level_reads_lowercase_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: LogLevel,
        }
        let parsed: Wrapper = toml::from_str("level = \"warn\"").unwrap();
        assert_eq!(parsed.level, LogLevel::Warn);
    }

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        let _ = init_logging(Some(LogLevel::Warn));
        assert!(init_logging(Some(LogLevel::Warn)).is_err());
    }
}
