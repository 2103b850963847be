//! Link health tracking
//!
//! Counts consecutive failed transactions. Once the count reaches the
//! configured limit the link is treated as disconnected and the master
//! only retries it once per check interval instead of stalling every scan
//! on a timeout.

use crate::config::SyncConfig;
use crate::timer::Ticks;

/// Connection state of the inter-half link
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkHealth {
    /// Consecutive failures
    errors: u8,
    /// Failures before disconnect (0 = never disconnect)
    max_errors: u8,
    /// Ticks between retries while disconnected
    check_interval: u32,
    /// Tick of the last retry while disconnected
    last_retry: u32,
}

impl LinkHealth {
    /// Create a tracker from the link configuration
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            errors: 0,
            max_errors: config.max_connection_errors,
            check_interval: config.connection_check_timeout,
            last_retry: 0,
        }
    }

    /// Check if the link is considered up
    pub fn is_connected(&self) -> bool {
        self.max_errors == 0 || self.errors < self.max_errors
    }

    /// Number of consecutive failures so far
    pub fn error_count(&self) -> u8 {
        self.errors
    }

    /// Whether a transaction should go on the wire at `now`
    ///
    /// Always true while connected. While disconnected, true once per
    /// check interval.
    pub fn should_attempt(&mut self, now: u32) -> bool {
        if self.is_connected() {
            return true;
        }
        if now.diff(self.last_retry) >= self.check_interval {
            self.last_retry = now;
            return true;
        }
        false
    }

    /// Record a completed transaction
    pub fn record_success(&mut self) {
        if !self.is_connected() {
            debug!("split link reconnected");
        }
        self.errors = 0;
    }

    /// Record a failed transaction at `now`
    pub fn record_failure(&mut self, now: u32) {
        let was_connected = self.is_connected();
        self.errors = self.errors.saturating_add(1);
        if self.max_errors != 0 {
            self.errors = self.errors.min(self.max_errors);
        }
        if was_connected && !self.is_connected() {
            warn!("split link disconnected after {} errors", self.errors);
            self.last_retry = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(max_errors: u8, check: u32) -> LinkHealth {
        LinkHealth::new(&SyncConfig::new().with_connection_check(max_errors, check))
    }

    #[test]
    fn test_disconnects_after_max_errors() {
        let mut health = health(3, 100);
        health.record_failure(0);
        health.record_failure(1);
        assert!(health.is_connected());
        health.record_failure(2);
        assert!(!health.is_connected());
    }

    #[test]
    fn test_success_resets_count() {
        let mut health = health(3, 100);
        health.record_failure(0);
        health.record_failure(1);
        health.record_success();
        health.record_failure(2);
        assert!(health.is_connected());
        assert_eq!(health.error_count(), 1);
    }

    #[test]
    fn test_retry_once_per_interval_while_disconnected() {
        let mut health = health(1, 100);
        health.record_failure(1000);
        assert!(!health.is_connected());

        assert!(!health.should_attempt(1050));
        assert!(health.should_attempt(1100));
        // Next retry waits a full interval again
        assert!(!health.should_attempt(1150));
        assert!(health.should_attempt(1200));
    }

    #[test]
    fn test_retry_interval_across_wrap() {
        let mut health = health(1, 100);
        health.record_failure(u32::MAX - 10);
        assert!(!health.should_attempt(20));
        assert!(health.should_attempt(90));
    }

    #[test]
    fn test_zero_limit_never_disconnects() {
        let mut health = health(0, 100);
        for now in 0..300 {
            health.record_failure(now);
        }
        assert!(health.is_connected());
        assert!(health.should_attempt(300));
    }

    #[test]
    fn test_reconnect_on_success() {
        let mut health = health(2, 100);
        health.record_failure(0);
        health.record_failure(0);
        assert!(!health.is_connected());
        health.record_success();
        assert!(health.is_connected());
    }
}
