//! Client configuration.
//!
//! Loads and validates the swap client settings from YAML. Only the three
//! options below are recognized; anything else in the file is rejected.
//!
//! ```yaml
//! gas_limit_buffer: 50000
//! swap_gas_limit: 1000000
//! deadline_duration: 15m
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings read once at client construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwapConfig {
    /// Gas units added on top of every node estimate.
    #[serde(default = "default_gas_limit_buffer")]
    pub gas_limit_buffer: u64,
    /// Fixed gas ceiling for swaps, used instead of estimation.
    #[serde(default = "default_swap_gas_limit")]
    pub swap_gas_limit: u64,
    /// Window after which a submitted swap must no longer execute.
    #[serde(
        default = "default_deadline_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub deadline_duration: Duration,
}

fn default_gas_limit_buffer() -> u64 {
    50_000
}

fn default_swap_gas_limit() -> u64 {
    1_000_000
}

fn default_deadline_duration() -> Duration {
    Duration::from_secs(15 * 60)
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            gas_limit_buffer: default_gas_limit_buffer(),
            swap_gas_limit: default_swap_gas_limit(),
            deadline_duration: default_deadline_duration(),
        }
    }
}

impl SwapConfig {
    /// Parse and validate config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Reject settings that would make every swap fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.swap_gas_limit == 0 {
            return Err(ConfigError::Invalid("swap_gas_limit must be non-zero".into()));
        }
        if self.deadline_duration.is_zero() {
            return Err(ConfigError::Invalid(
                "deadline_duration must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Parse a duration string like "90", "90s", "15m" or "1h".
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim().to_lowercase();
    let invalid = || ConfigError::Invalid(format!("invalid duration: {s:?}"));

    let (digits, multiplier) = if let Some(h) = s.strip_suffix('h') {
        (h, 3600)
    } else if let Some(m) = s.strip_suffix('m') {
        (m, 60)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, 1)
    } else {
        (s.as_str(), 1)
    };

    let value: u64 = digits.trim().parse().map_err(|_| invalid())?;
    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(u64),
    Text(String),
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match RawDuration::deserialize(deserializer)? {
        RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
        RawDuration::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}
