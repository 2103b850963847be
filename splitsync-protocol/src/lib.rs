//! Split Link Transaction Protocol
//!
//! This crate defines the frames exchanged between the master and slave
//! halves of a split keyboard. Every exchange is one request from the
//! master answered by one response from the slave, identified by a
//! transaction id.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌───────┬────────┬──────┬────┬─────┬─────────────┬──────────┐
//! │ START │ LENGTH │ KIND │ ID │ SEQ │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 1B │ 1B  │ 0–250B      │ 1B       │
//! └───────┴────────┴──────┴────┴─────┴─────────────┴──────────┘
//! ```
//!
//! The responder echoes `ID` and `SEQ`, so the master can tell the answer
//! to its current request apart from a late answer to one it gave up on.
//! There is no negative acknowledgement: a request the slave cannot serve
//! is simply never answered.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod transaction;

pub use frame::{
    Frame, FrameError, FrameParser, Payload, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
};
pub use transaction::{FrameKind, TransactionId};
