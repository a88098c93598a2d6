//! # Router Configuration
//!
//! Deployment-time settings. The return-data cap set here is only the initial
//! value; `set_max_return_data_size` adjusts it at runtime.

use crate::domain::invariants::limits::{
    DEFAULT_MAX_RETURN_DATA_SIZE, DEFAULT_TIMELOCK_DELAY_SECS, MAX_FACET_CODE_SIZE,
    MAX_MANIFEST_SIZE, MAX_RETURN_DATA_LIMIT, MIN_RETURN_DATA_LIMIT, MANIFEST_RECORD_SIZE,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    /// A setting is outside its accepted range.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: u64 },
}

/// Router configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Seconds between commit and the earliest activation.
    pub timelock_delay_secs: u64,

    /// Initial cap on facet return data, in bytes.
    pub max_return_data_size: usize,

    /// Largest facet code accepted at apply time, in bytes.
    pub max_facet_code_size: usize,

    /// Largest emergency manifest payload, in bytes.
    pub max_manifest_size: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            timelock_delay_secs: DEFAULT_TIMELOCK_DELAY_SECS,
            max_return_data_size: DEFAULT_MAX_RETURN_DATA_SIZE,
            max_facet_code_size: MAX_FACET_CODE_SIZE,
            max_manifest_size: MAX_MANIFEST_SIZE,
        }
    }
}

impl RouterConfig {
    /// Create a config for testing (no timelock).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timelock_delay_secs: 0,
            ..Self::default()
        }
    }

    /// Builder-style timelock override.
    #[must_use]
    pub fn with_timelock(mut self, secs: u64) -> Self {
        self.timelock_delay_secs = secs;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FR_TIMELOCK_DELAY_SECS` (default: 3600)
    /// - `FR_MAX_RETURN_DATA_SIZE` (default: 32768)
    /// - `FR_MAX_FACET_CODE_SIZE` (default: 24576)
    /// - `FR_MAX_MANIFEST_SIZE` (default: 24576)
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if a variable fails to parse or the result is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            timelock_delay_secs: env_or("FR_TIMELOCK_DELAY_SECS", defaults.timelock_delay_secs)?,
            max_return_data_size: env_or("FR_MAX_RETURN_DATA_SIZE", defaults.max_return_data_size)?,
            max_facet_code_size: env_or("FR_MAX_FACET_CODE_SIZE", defaults.max_facet_code_size)?,
            max_manifest_size: env_or("FR_MAX_MANIFEST_SIZE", defaults.max_manifest_size)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every setting against its accepted range.
    ///
    /// # Errors
    ///
    /// [`ConfigError::OutOfRange`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_RETURN_DATA_LIMIT..=MAX_RETURN_DATA_LIMIT).contains(&self.max_return_data_size) {
            return Err(ConfigError::OutOfRange {
                field: "max_return_data_size",
                value: self.max_return_data_size as u64,
            });
        }
        if self.max_facet_code_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_facet_code_size",
                value: 0,
            });
        }
        if self.max_manifest_size < MANIFEST_RECORD_SIZE {
            return Err(ConfigError::OutOfRange {
                field: "max_manifest_size",
                value: self.max_manifest_size as u64,
            });
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { var, value: raw }),
        Err(_) => Ok(default),
    }
}
