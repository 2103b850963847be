//! Master-side transaction driver
//!
//! ```text
//!           begin()                    matching response
//!   Idle ──────────▶ AwaitingResponse ───────────────────▶ Idle  (Ok(len))
//!                          │
//!                          │ deadline expired
//!                          └─────────────────────────────▶ Idle  (Err(Timeout))
//! ```
//!
//! [`Initiator::poll`] never blocks, so the state machine can be driven
//! from a scan loop or an async task. [`Initiator::send`] is the blocking
//! form.

use core::task::Poll;

use splitsync_hal::{Link, TickSource};
use splitsync_protocol::{Frame, FrameParser, TransactionId, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};

use super::{TransactionError, RX_CHUNK_SIZE};
use crate::config::{ConfigError, SyncConfig};
use crate::health::LinkHealth;
use crate::timer::{Ticks, Timer};

/// Initiator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// No transaction in flight
    Idle,
    /// Request sent, waiting for its response
    AwaitingResponse {
        /// Transaction id of the request
        id: TransactionId,
        /// Sequence number the response must echo
        seq: u8,
        /// Tick at which the wait gives up
        deadline: u32,
    },
}

/// Master-side transaction driver for one link
#[derive(Debug)]
pub struct Initiator<L, S> {
    link: L,
    timer: Timer<S>,
    config: SyncConfig,
    health: LinkHealth,
    parser: FrameParser,
    state: State,
    next_seq: u8,
}

impl<L: Link, S: TickSource> Initiator<L, S> {
    /// Create an initiator
    ///
    /// Rejects configurations whose timeouts cannot be represented as a
    /// deadline less than half the tick range ahead.
    pub fn new(link: L, timer: Timer<S>, config: SyncConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            link,
            timer,
            health: LinkHealth::new(&config),
            config,
            parser: FrameParser::new(),
            state: State::Idle,
            next_seq: 0,
        })
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Check if a transaction is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self.state, State::AwaitingResponse { .. })
    }

    /// Check if the link is considered up
    pub fn is_connected(&self) -> bool {
        self.health.is_connected()
    }

    /// Active configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Timer used for deadlines
    pub fn timer(&self) -> &Timer<S> {
        &self.timer
    }

    /// Underlying link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Release the link and timer
    pub fn into_parts(self) -> (L, Timer<S>) {
        (self.link, self.timer)
    }

    /// Transmit a request and start waiting for its response
    ///
    /// Oversized requests are rejected before anything reaches the link.
    pub fn begin(&mut self, id: TransactionId, request: &[u8]) -> Result<(), TransactionError> {
        if self.is_busy() {
            return Err(TransactionError::Busy);
        }
        if request.len() > MAX_PAYLOAD_SIZE {
            error!(
                "request for transaction {} is {} bytes, max {}",
                id,
                request.len(),
                MAX_PAYLOAD_SIZE
            );
            return Err(TransactionError::PayloadTooLarge);
        }

        let now = self.timer.read32();
        if !self.health.should_attempt(now) {
            return Err(TransactionError::Disconnected);
        }

        let seq = self.next_seq;
        self.next_seq = seq.wrapping_add(1);

        let frame =
            Frame::request(id, seq, request).map_err(|_| TransactionError::PayloadTooLarge)?;
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = frame
            .encode(&mut buf)
            .map_err(|_| TransactionError::PayloadTooLarge)?;

        // Drop any half-parsed leftovers of an earlier exchange
        self.parser.reset();

        if self.link.write(&buf[..len]).is_err() {
            warn!("link write failed for transaction {}", id);
            self.health.record_failure(now);
            return Err(TransactionError::Link);
        }

        trace!("sent transaction {} seq {}", id, seq);
        self.state = State::AwaitingResponse {
            id,
            seq,
            deadline: now.offset(self.config.response_timeout),
        };
        Ok(())
    }

    /// Advance the in-flight transaction without blocking
    ///
    /// On `Ready(Ok(len))` the first `len` bytes of `response` hold the
    /// response payload. On any error `response` is left untouched.
    pub fn poll(&mut self, response: &mut [u8]) -> Poll<Result<usize, TransactionError>> {
        let State::AwaitingResponse { id, seq, deadline } = self.state else {
            return Poll::Ready(Err(TransactionError::Idle));
        };

        let mut chunk = [0u8; RX_CHUNK_SIZE];
        loop {
            let n = match self.link.read(&mut chunk) {
                Ok(n) => n,
                Err(_) => {
                    debug!("link read failed");
                    0
                }
            };
            if n == 0 {
                break;
            }

            for &byte in &chunk[..n] {
                match self.parser.feed(byte) {
                    Ok(Some(frame)) if frame.answers(id, seq) => {
                        return Poll::Ready(self.complete(&frame, response));
                    }
                    Ok(Some(frame)) => {
                        trace!("ignoring frame {} seq {}", frame.id, frame.seq);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!("frame parse error: {}", e);
                    }
                }
            }
        }

        let now = self.timer.read32();
        if now.expired(deadline) {
            warn!("transaction {} timed out", id);
            self.state = State::Idle;
            self.parser.reset();
            self.health.record_failure(now);
            return Poll::Ready(Err(TransactionError::Timeout));
        }

        Poll::Pending
    }

    /// Send a request and block until its response or the timeout
    ///
    /// A transaction left in flight by [`Initiator::begin`] is driven to
    /// completion first; its response is discarded.
    pub fn send(
        &mut self,
        id: TransactionId,
        request: &[u8],
        response: &mut [u8],
    ) -> Result<usize, TransactionError> {
        if self.is_busy() {
            debug!("waiting for in-flight transaction");
            let mut scratch = [0u8; MAX_PAYLOAD_SIZE];
            let _ = self.wait(&mut scratch);
        }
        self.begin(id, request)?;
        self.wait(response)
    }

    /// Send a request and wait for the acknowledgement, ignoring its payload
    pub fn notify(&mut self, id: TransactionId, request: &[u8]) -> Result<(), TransactionError> {
        let mut scratch = [0u8; MAX_PAYLOAD_SIZE];
        self.send(id, request, &mut scratch).map(|_| ())
    }

    /// Forget the in-flight transaction
    ///
    /// A late response to it carries a stale sequence number and is ignored.
    pub fn abandon(&mut self) {
        if let State::AwaitingResponse { id, .. } = self.state {
            debug!("abandoning transaction {}", id);
        }
        self.state = State::Idle;
        self.parser.reset();
    }

    fn wait(&mut self, response: &mut [u8]) -> Result<usize, TransactionError> {
        loop {
            if let Poll::Ready(result) = self.poll(response) {
                return result;
            }
        }
    }

    fn complete(&mut self, frame: &Frame, response: &mut [u8]) -> Result<usize, TransactionError> {
        self.state = State::Idle;
        self.health.record_success();

        let len = frame.payload.len();
        if len > response.len() {
            warn!(
                "response to {} is {} bytes, buffer holds {}",
                frame.id,
                len,
                response.len()
            );
            return Err(TransactionError::ResponseTooLarge);
        }
        response[..len].copy_from_slice(&frame.payload);
        Ok(len)
    }
}
