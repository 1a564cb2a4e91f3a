//! Ledger configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Runtime configuration for a [`FeedbackLedger`](crate::FeedbackLedger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Buffer size of the live event channel; slow subscribers lag past it
    pub event_channel_capacity: usize,

    /// Keep a hash-linked journal of published events
    pub journal_events: bool,

    /// Maximum journal length, oldest entries dropped first
    pub journal_limit: Option<usize>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: 1024,
            journal_events: true,
            journal_limit: None,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a TOML file, falling back to defaults when it is missing
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_channel_capacity must be greater than zero".to_string(),
            ));
        }
        if self.journal_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "journal_limit must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
