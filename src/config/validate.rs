// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{RawConfigFile, RunOptions};
use crate::errors::{DagrunError, Result};

impl TryFrom<RawConfigFile> for RunOptions {
    type Error = DagrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let mut options = RunOptions::default();
        if let Some(ref timeout) = raw.run.timeout {
            options.timeout = parse_timeout(timeout)?;
        }
        Ok(options)
    }
}

pub(crate) fn parse_timeout(s: &str) -> Result<Duration> {
    let timeout = parse_duration(s)
        .map_err(|e| DagrunError::Config(format!("invalid run timeout '{s}': {e}")))?;

    if timeout.is_zero() {
        return Err(DagrunError::Config(
            "run timeout must be greater than zero".to_string(),
        ));
    }
    Ok(timeout)
}

/// Parse a duration like `500ms`, `30s`, `10m` or `1h`.
fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;
    let (digits, unit) = s.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|e| format!("invalid duration number '{digits}': {e}"))?;

    let secs_per_unit = match unit.trim().to_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        other => {
            return Err(format!(
                "unsupported duration unit '{other}'; expected ms, s, m, or h"
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
