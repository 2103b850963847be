//! Frame encoding and decoding for the split link.
//!
//! Frame format:
//! - START (1 byte): 0xAA synchronization byte
//! - LENGTH (1 byte): payload length (0-250)
//! - KIND (1 byte): request or response
//! - ID (1 byte): transaction identifier
//! - SEQ (1 byte): sequence number, echoed by the responder
//! - PAYLOAD (0-250 bytes): transaction-specific data
//! - CHECKSUM (1 byte): XOR of LENGTH, KIND, ID, SEQ and all PAYLOAD bytes

use heapless::Vec;

use crate::transaction::{FrameKind, TransactionId};

/// Frame synchronization byte
pub const FRAME_START: u8 = 0xAA;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Bytes surrounding the payload (START + LENGTH + KIND + ID + SEQ + CHECKSUM)
pub const FRAME_OVERHEAD: usize = 6;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = FRAME_OVERHEAD + MAX_PAYLOAD_SIZE;

/// Fixed-capacity payload buffer
pub type Payload = Vec<u8, MAX_PAYLOAD_SIZE>;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Invalid frame structure
    InvalidFrame,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Direction
    pub kind: FrameKind,
    /// Transaction identifier
    pub id: TransactionId,
    /// Sequence number of the request this frame belongs to
    pub seq: u8,
    /// Payload data
    pub payload: Payload,
}

impl Frame {
    /// Create a new frame
    ///
    /// Fails if `payload` is longer than [`MAX_PAYLOAD_SIZE`]; nothing is
    /// truncated.
    pub fn new(
        kind: FrameKind,
        id: TransactionId,
        seq: u8,
        payload: &[u8],
    ) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            kind,
            id,
            seq,
            payload: payload_vec,
        })
    }

    /// Create a request frame
    pub fn request(id: TransactionId, seq: u8, payload: &[u8]) -> Result<Self, FrameError> {
        Self::new(FrameKind::Request, id, seq, payload)
    }

    /// Create a response frame from an already bounded payload
    pub fn response(id: TransactionId, seq: u8, payload: Payload) -> Self {
        Self {
            kind: FrameKind::Response,
            id,
            seq,
            payload,
        }
    }

    /// Whether this frame answers the request `(id, seq)`
    pub fn answers(&self, id: TransactionId, seq: u8) -> bool {
        self.kind == FrameKind::Response && self.id == id && self.seq == seq
    }

    /// Number of bytes this frame occupies on the wire
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Calculate checksum for frame data
    fn calculate_checksum(length: u8, kind: u8, id: u8, seq: u8, payload: &[u8]) -> u8 {
        let mut checksum = length ^ kind ^ id ^ seq;
        for &byte in payload {
            checksum ^= byte;
        }
        checksum
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let length = self.payload.len() as u8;
        let kind = self.kind.to_byte();
        let id = self.id.as_u8();
        let checksum = Self::calculate_checksum(length, kind, id, self.seq, &self.payload);

        buffer[0] = FRAME_START;
        buffer[1] = length;
        buffer[2] = kind;
        buffer[3] = id;
        buffer[4] = self.seq;
        buffer[5..5 + self.payload.len()].copy_from_slice(&self.payload);
        buffer[frame_len - 1] = checksum;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Bytes of a frame after its START byte
type RawFrame = Vec<u8, MAX_FRAME_SIZE>;

/// State machine for parsing incoming frames
///
/// Bytes of the frame in progress are kept so that, when it turns out to
/// be corrupt, they can be rescanned for a later START byte. A single lost
/// byte then costs one frame instead of two.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    raw: RawFrame,
    buffer: Payload,
    expected_length: u8,
    kind: FrameKind,
    id: u8,
    seq: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for START byte
    WaitingForStart,
    /// Got START, waiting for LENGTH
    WaitingForLength,
    /// Got LENGTH, waiting for KIND
    WaitingForKind,
    /// Got KIND, waiting for ID
    WaitingForId,
    /// Got ID, waiting for SEQ
    WaitingForSeq,
    /// Reading payload bytes
    ReadingPayload,
    /// Waiting for CHECKSUM
    WaitingForChecksum,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForStart,
            raw: Vec::new(),
            buffer: Vec::new(),
            expected_length: 0,
            kind: FrameKind::Request,
            id: 0,
            seq: 0,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.raw.clear();
        self.restart();
    }

    /// True while no partial frame is buffered
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::WaitingForStart
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    /// After an error the bytes of the rejected frame are rescanned; if
    /// they contain a complete frame, that frame is returned instead.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.step(byte) {
            Err(e) => match self.rescan() {
                Some(frame) => Ok(Some(frame)),
                None => Err(e),
            },
            result => result,
        }
    }

    fn restart(&mut self) {
        self.state = ParseState::WaitingForStart;
        self.buffer.clear();
        self.expected_length = 0;
        self.kind = FrameKind::Request;
        self.id = 0;
        self.seq = 0;
    }

    /// Replay the bytes of a rejected frame from the next START byte
    ///
    /// Each pass starts one START later, so this terminates.
    fn rescan(&mut self) -> Option<Frame> {
        let mut pending = core::mem::take(&mut self.raw);
        let mut found = None;

        loop {
            self.reset();
            let Some(start) = pending.iter().position(|&b| b == FRAME_START) else {
                return found;
            };

            let mut failed_at = None;
            for (i, &byte) in pending.iter().enumerate().skip(start) {
                match self.step(byte) {
                    Ok(Some(frame)) => {
                        found.get_or_insert(frame);
                    }
                    Ok(None) => {}
                    Err(_) => {
                        failed_at = Some(i);
                        break;
                    }
                }
            }

            let Some(i) = failed_at else {
                return found;
            };
            let mut next = core::mem::take(&mut self.raw);
            // No larger than `pending`, which has the same capacity
            let _ = next.extend_from_slice(&pending[i + 1..]);
            pending = next;
        }
    }

    fn step(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        if self.state == ParseState::WaitingForStart {
            if byte == FRAME_START {
                self.raw.clear();
                self.state = ParseState::WaitingForLength;
            }
            // Silently ignore non-START bytes while waiting
            return Ok(None);
        }

        // A frame after START never exceeds MAX_FRAME_SIZE - 1 bytes
        let _ = self.raw.push(byte);

        match self.state {
            ParseState::WaitingForStart => Ok(None),
            ParseState::WaitingForLength => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.restart();
                    return Err(FrameError::InvalidFrame);
                }
                self.expected_length = byte;
                self.state = ParseState::WaitingForKind;
                Ok(None)
            }
            ParseState::WaitingForKind => match FrameKind::from_byte(byte) {
                Some(kind) => {
                    self.kind = kind;
                    self.state = ParseState::WaitingForId;
                    Ok(None)
                }
                None => {
                    self.restart();
                    Err(FrameError::InvalidFrame)
                }
            },
            ParseState::WaitingForId => {
                self.id = byte;
                self.state = ParseState::WaitingForSeq;
                Ok(None)
            }
            ParseState::WaitingForSeq => {
                self.seq = byte;
                self.buffer.clear();
                self.state = if self.expected_length == 0 {
                    ParseState::WaitingForChecksum
                } else {
                    ParseState::ReadingPayload
                };
                Ok(None)
            }
            ParseState::ReadingPayload => {
                // Cannot overflow, expected_length was bounded above
                let _ = self.buffer.push(byte);
                if self.buffer.len() == self.expected_length as usize {
                    self.state = ParseState::WaitingForChecksum;
                }
                Ok(None)
            }
            ParseState::WaitingForChecksum => {
                let expected_checksum = Frame::calculate_checksum(
                    self.expected_length,
                    self.kind.to_byte(),
                    self.id,
                    self.seq,
                    &self.buffer,
                );

                if byte != expected_checksum {
                    self.restart();
                    return Err(FrameError::InvalidChecksum);
                }

                let frame = Frame {
                    kind: self.kind,
                    id: TransactionId(self.id),
                    seq: self.seq,
                    payload: self.buffer.clone(),
                };

                self.reset();
                Ok(Some(frame))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
