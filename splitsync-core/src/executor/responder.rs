//! Slave-side request dispatch

use splitsync_hal::Link;
use splitsync_protocol::{Frame, FrameKind, FrameParser, Payload, MAX_FRAME_SIZE};

use super::RX_CHUNK_SIZE;
use crate::registry::Registry;

/// Serve one request frame
///
/// Returns the response to send back, or `None` when the frame is not a
/// request or no handler is registered for its id. Unknown ids get no
/// answer at all; the master sees a timeout.
pub fn respond(registry: &Registry<'_>, request: &Frame) -> Option<Frame> {
    if request.kind != FrameKind::Request {
        return None;
    }

    let Some(handler) = registry.lookup(request.id) else {
        trace!("no handler for transaction {}, dropping", request.id);
        return None;
    };

    let mut response = Payload::new();
    handler.handle(&request.payload, &mut response);
    Some(Frame::response(request.id, request.seq, response))
}

/// Slave-side transaction server for one link
pub struct Responder<'r, L> {
    link: L,
    registry: &'r Registry<'r>,
    parser: FrameParser,
}

impl<'r, L: Link> Responder<'r, L> {
    /// Create a responder over a sealed registry
    pub fn new(link: L, registry: &'r Registry<'r>) -> Self {
        Self {
            link,
            registry,
            parser: FrameParser::new(),
        }
    }

    /// Underlying link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Handle everything that has arrived on the link
    ///
    /// Never blocks waiting for bytes. Returns the number of requests
    /// answered.
    pub fn poll(&mut self) -> usize {
        let mut chunk = [0u8; RX_CHUNK_SIZE];
        let mut answered = 0;

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
                    Ok(Some(frame)) => {
                        if self.answer(&frame) {
                            answered += 1;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!("frame parse error: {}", e);
                    }
                }
            }
        }

        answered
    }

    fn answer(&mut self, request: &Frame) -> bool {
        let Some(response) = respond(self.registry, request) else {
            return false;
        };

        let mut buf = [0u8; MAX_FRAME_SIZE];
        let Ok(len) = response.encode(&mut buf) else {
            return false;
        };

        if self.link.write(&buf[..len]).is_err() {
            warn!("failed to answer transaction {}", request.id);
            return false;
        }

        trace!("answered transaction {} seq {}", request.id, request.seq);
        true
    }
}
