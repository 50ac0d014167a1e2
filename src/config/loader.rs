// src/config/loader.rs

use crate::config::model::{RawConfigFile, RunOptions};
use crate::config::validate::parse_timeout;
use crate::errors::Result;

/// Environment variable overriding the run timeout, e.g. `DAGRUN_TIMEOUT=30s`.
pub const TIMEOUT_ENV: &str = "DAGRUN_TIMEOUT";

/// Parse TOML text into a raw config without validation.
pub fn parse_raw(contents: &str) -> Result<RawConfigFile> {
    let raw: RawConfigFile = toml::from_str(contents)?;
    Ok(raw)
}

/// Parse and validate run options from TOML text.
///
/// - Reads TOML.
/// - Applies defaults for missing sections.
/// - Rejects malformed or zero timeouts.
pub fn from_toml_str(contents: &str) -> Result<RunOptions> {
    let raw = parse_raw(contents)?;
    RunOptions::try_from(raw)
}

/// Run options from [`TIMEOUT_ENV`] if it is set, defaults otherwise.
pub fn from_env_or_default() -> Result<RunOptions> {
    match std::env::var(TIMEOUT_ENV) {
        Ok(value) => Ok(RunOptions::with_timeout(parse_timeout(&value)?)),
        Err(_) => Ok(RunOptions::default()),
    }
}
