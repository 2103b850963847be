//! Board-agnostic synchronization logic for split keyboard halves
//!
//! This crate contains everything that does not depend on a specific
//! microcontroller:
//!
//! - Wraparound-safe tick timer (coarse and fast resolutions)
//! - Transaction registry, sealed after boot
//! - Transaction executor (master initiator, slave responder)
//! - Link health tracking
//! - UART-backed link adapter
//! - HID report forwarding and postcard-typed transactions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod executor;
pub mod health;
pub mod hid_sync;
pub mod link;
pub mod registry;
pub mod timer;
pub mod typed;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, SyncConfig};
pub use executor::{Initiator, Responder, SharedInitiator, TransactionError};
pub use registry::{Handler, Registry, RegistryBuilder, RegistryError};
pub use timer::{expired, expired32, Clocks, FastTick, Ticks, Timer};

pub use splitsync_protocol::{Payload, TransactionId, MAX_PAYLOAD_SIZE};
