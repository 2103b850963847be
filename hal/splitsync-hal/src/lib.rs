//! splitsync Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the synchronization core depends
//! on. Chip-specific code (the RP2040 firmware, host test fakes) implements
//! these traits so the timer arithmetic and transaction protocol can run
//! unchanged on either side.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  splitsync-firmware (master / slave)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  splitsync-core (timer, transactions)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  splitsync-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`clock::TickSource`] - Free-running tick counter
//! - [`link::Link`] - Frame transport between halves
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod link;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::{AtomicTicks, TickSource};
pub use link::{Link, LinkError};
pub use uart::{DataBits, Parity, StopBits, Uart, UartConfig, UartRx, UartTx};
