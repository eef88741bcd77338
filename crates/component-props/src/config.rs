//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{EngineError, Result};

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Host call settings
    pub host: HostConfig,
    /// Read-back verification settings
    pub verify: VerifyConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(ms) = env_var("PROPS_HOST_TIMEOUT_MS")? {
            config.host.call_timeout_ms = ms;
        }
        if let Some(ms) = env_var("PROPS_SETTLE_DELAY_MS")? {
            config.verify.settle_delay_ms = ms;
        }
        if let Some(retries) = env_var("PROPS_VERIFY_RETRIES")? {
            config.verify.max_retries = retries;
        }
        if let Some(ms) = env_var("PROPS_VERIFY_BACKOFF_MS")? {
            config.verify.initial_backoff_ms = ms;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::invalid_request(format!("Failed to read config: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| EngineError::invalid_request(format!("Failed to parse config: {}", e)))
    }

    /// Configuration with no settle delay and no polling, for hosts that
    /// commit synchronously
    pub fn immediate() -> Self {
        Self {
            host: HostConfig::default(),
            verify: VerifyConfig {
                settle_delay_ms: 0,
                max_retries: 0,
                ..VerifyConfig::default()
            },
        }
    }
}

fn env_var<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => parse_setting(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

/// Parse a numeric setting, rejecting values out of range for its type
fn parse_setting<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        EngineError::invalid_request(format!("{} must be an integer in range, got '{}'", key, raw))
    })
}

/// Host call configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Upper bound on a single host call
    pub call_timeout_ms: u64,
}

impl HostConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 10_000,
        }
    }
}

/// Read-back verification configuration
///
/// The host commits mutations asynchronously relative to its query channel.
/// The verifier always waits `settle_delay_ms` before the first read-back,
/// then re-reads up to `max_retries` more times on an exponential schedule
/// while the value still differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Fixed wait before the first read-back
    pub settle_delay_ms: u64,
    /// Extra read-backs after a mismatch
    pub max_retries: u32,
    /// Delay before the first extra read-back
    pub initial_backoff_ms: u64,
    /// Cap on any single backoff delay
    pub max_backoff_ms: u64,
    /// Backoff growth factor
    pub multiplier: f64,
}

impl VerifyConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 150,
            max_retries: 2,
            initial_backoff_ms: 100,
            max_backoff_ms: 1_000,
            multiplier: 2.0,
        }
    }
}
