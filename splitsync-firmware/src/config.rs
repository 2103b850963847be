//! Link settings from split.toml
//!
//! build.rs validates split.toml and generates the constants included here.

use splitsync_core::SyncConfig;
use splitsync_hal::UartConfig;

include!(concat!(env!("OUT_DIR"), "/split_config.rs"));

/// Executor settings, in coarse ticks (milliseconds)
pub const fn sync_config() -> SyncConfig {
    SyncConfig::new()
        .with_response_timeout(RESPONSE_TIMEOUT_MS)
        .with_connection_check(MAX_CONNECTION_ERRORS, CONNECTION_CHECK_MS)
}

/// Serial framing for the inter-half UART
pub const fn uart_config() -> UartConfig {
    UartConfig::new().with_baudrate(BAUD_RATE)
}
