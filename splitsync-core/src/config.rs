//! Link configuration
//!
//! Timing values are in coarse timer ticks (milliseconds on the firmware).

use serde::{Deserialize, Serialize};

/// Default wait for a response before a transaction times out
pub const DEFAULT_RESPONSE_TIMEOUT: u32 = 20;

/// Default consecutive failures before the link counts as disconnected
pub const DEFAULT_MAX_CONNECTION_ERRORS: u8 = 10;

/// Default interval between reconnection attempts while disconnected
pub const DEFAULT_CONNECTION_CHECK_TIMEOUT: u32 = 500;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Timeout is zero or not below half the tick range
    TimeoutOutOfRange,
}

/// Transaction timing and link health settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct SyncConfig {
    /// Ticks to wait for a response
    pub response_timeout: u32,
    /// Consecutive failures before the link is marked disconnected (0 = never)
    pub max_connection_errors: u8,
    /// Ticks between attempts while disconnected
    pub connection_check_timeout: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncConfig {
    /// Configuration with default values
    pub const fn new() -> Self {
        Self {
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            max_connection_errors: DEFAULT_MAX_CONNECTION_ERRORS,
            connection_check_timeout: DEFAULT_CONNECTION_CHECK_TIMEOUT,
        }
    }

    /// Override the response timeout
    pub const fn with_response_timeout(self, response_timeout: u32) -> Self {
        Self {
            response_timeout,
            ..self
        }
    }

    /// Override the link health thresholds
    pub const fn with_connection_check(self, max_errors: u8, check_timeout: u32) -> Self {
        Self {
            max_connection_errors: max_errors,
            connection_check_timeout: check_timeout,
            ..self
        }
    }

    /// Check the values against the deadline arithmetic
    ///
    /// Deadlines only resolve correctly when they lie less than half the
    /// tick range ahead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.response_timeout == 0 || self.response_timeout >= u32::MAX / 2 {
            return Err(ConfigError::TimeoutOutOfRange);
        }
        if self.connection_check_timeout >= u32::MAX / 2 {
            return Err(ConfigError::TimeoutOutOfRange);
        }
        Ok(())
    }
}
