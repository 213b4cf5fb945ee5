//! Collaboration configuration module
//!
//! Tunables shared by the coordinator, the typing sweeper and the payload
//! validators. Values come from the TOML config file and environment
//! overrides; see `backend::server::config`.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Collaboration tunables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollabSettings {
    /// Seconds a `typing-start` stays active without a refresh
    pub typing_timeout_secs: u64,
    /// How often the sweeper looks for expired typing entries
    pub typing_sweep_interval_ms: u64,
    /// Maximum message length in characters, after trimming
    pub max_message_len: usize,
    /// Maximum reaction emoji length in characters
    pub max_emoji_len: usize,
}

impl Default for CollabSettings {
    fn default() -> Self {
        Self {
            typing_timeout_secs: 8,
            typing_sweep_interval_ms: 1_000,
            max_message_len: 4_000,
            max_emoji_len: 32,
        }
    }
}

impl CollabSettings {
    /// Create a new CollabSettingsBuilder
    pub fn builder() -> CollabSettingsBuilder {
        CollabSettingsBuilder::default()
    }

    pub fn typing_timeout(&self) -> Duration {
        Duration::from_secs(self.typing_timeout_secs)
    }

    pub fn typing_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.typing_sweep_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.typing_sweep_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "typing_sweep_interval_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_message_len == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_message_len",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_emoji_len == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_emoji_len",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for CollabSettings
#[derive(Debug, Default)]
pub struct CollabSettingsBuilder {
    typing_timeout_secs: Option<u64>,
    typing_sweep_interval_ms: Option<u64>,
    max_message_len: Option<usize>,
    max_emoji_len: Option<usize>,
}

impl CollabSettingsBuilder {
    pub fn typing_timeout_secs(mut self, secs: u64) -> Self {
        self.typing_timeout_secs = Some(secs);
        self
    }

    pub fn typing_sweep_interval_ms(mut self, millis: u64) -> Self {
        self.typing_sweep_interval_ms = Some(millis);
        self
    }

    pub fn max_message_len(mut self, len: usize) -> Self {
        self.max_message_len = Some(len);
        self
    }

    pub fn max_emoji_len(mut self, len: usize) -> Self {
        self.max_emoji_len = Some(len);
        self
    }

    /// Build and validate the settings
    pub fn build(self) -> Result<CollabSettings, ConfigError> {
        let defaults = CollabSettings::default();
        let settings = CollabSettings {
            typing_timeout_secs: self.typing_timeout_secs.unwrap_or(defaults.typing_timeout_secs),
            typing_sweep_interval_ms: self
                .typing_sweep_interval_ms
                .unwrap_or(defaults.typing_sweep_interval_ms),
            max_message_len: self.max_message_len.unwrap_or(defaults.max_message_len),
            max_emoji_len: self.max_emoji_len.unwrap_or(defaults.max_emoji_len),
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(String),
}
