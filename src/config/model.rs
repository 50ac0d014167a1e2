// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Run-wide deadline used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Options for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Run-wide deadline. Anything below one millisecond counts as unset and
    /// falls back to [`DEFAULT_TIMEOUT`].
    pub timeout: Duration,
}

impl RunOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The deadline actually applied to a run.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout < Duration::from_millis(1) {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Run options as read from TOML, before validation.
///
/// ```toml
/// [run]
/// timeout = "30s"
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,
}

/// `[run]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSection {
    /// Duration string with a `ms`, `s`, `m` or `h` suffix.
    #[serde(default)]
    pub timeout: Option<String>,
}
