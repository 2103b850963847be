//! Host-side test doubles for the executor

use core::convert::Infallible;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use splitsync_hal::{AtomicTicks, Link};
use splitsync_protocol::{Frame, FrameParser, Payload};

use crate::executor::respond;
use crate::registry::Registry;

/// Handler that answers with its request
pub(crate) fn echo(request: &[u8], response: &mut Payload) {
    response.extend_from_slice(request).unwrap();
}

/// What crossed the simulated wire, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkEvent {
    /// Master wrote a request with this seq
    Sent(u8),
    /// Response with this seq became readable by the master
    Delivered(u8),
}

struct Queued {
    delay: usize,
    seq: u8,
    bytes: Vec<u8>,
}

/// Master-side link whose far end is a registry
///
/// Every `read` advances the shared clock by one tick. Responses become
/// readable `delay` reads after the request was written.
pub(crate) struct PeerLink<'a> {
    registry: &'a Registry<'a>,
    clock: &'a AtomicTicks,
    parser: FrameParser,
    delay: usize,
    queued: VecDeque<Queued>,
    inbound: VecDeque<u8>,
    sent: Vec<Frame>,
    events: Option<Rc<RefCell<Vec<LinkEvent>>>>,
}

impl<'a> PeerLink<'a> {
    pub(crate) fn new(registry: &'a Registry<'a>, clock: &'a AtomicTicks) -> Self {
        Self {
            registry,
            clock,
            parser: FrameParser::new(),
            delay: 0,
            queued: VecDeque::new(),
            inbound: VecDeque::new(),
            sent: Vec::new(),
            events: None,
        }
    }

    pub(crate) fn with_delay(mut self, delay: usize) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn with_events(mut self, events: Rc<RefCell<Vec<LinkEvent>>>) -> Self {
        self.events = Some(events);
        self
    }

    /// Requests received so far
    pub(crate) fn sent(&self) -> &[Frame] {
        &self.sent
    }

    /// Queue an unsolicited frame for the master
    pub(crate) fn inject(&mut self, frame: &Frame) {
        self.queued.push_back(Queued {
            delay: 0,
            seq: frame.seq,
            bytes: frame.encode_to_vec().unwrap().to_vec(),
        });
    }

    fn log(&self, event: LinkEvent) {
        if let Some(events) = &self.events {
            events.borrow_mut().push(event);
        }
    }
}

impl Link for PeerLink<'_> {
    type Error = Infallible;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
        for &byte in bytes {
            if let Ok(Some(frame)) = self.parser.feed(byte) {
                self.log(LinkEvent::Sent(frame.seq));
                if let Some(response) = respond(self.registry, &frame) {
                    self.queued.push_back(Queued {
                        delay: self.delay,
                        seq: response.seq,
                        bytes: response.encode_to_vec().unwrap().to_vec(),
                    });
                }
                self.sent.push(frame);
            }
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        self.clock.tick();

        let mut released = None;
        if let Some(front) = self.queued.front_mut() {
            if front.delay > 0 {
                front.delay -= 1;
            }
            if front.delay == 0 {
                released = self.queued.pop_front();
            }
        }
        if let Some(queued) = released {
            self.log(LinkEvent::Delivered(queued.seq));
            self.inbound.extend(queued.bytes);
        }

        let n = buf.len().min(self.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

/// Pair of in-memory byte pipes joining two links
#[derive(Clone, Default)]
pub(crate) struct Wire {
    bytes: Rc<RefCell<VecDeque<u8>>>,
}

/// One end of a [`Wire`] pair
pub(crate) struct WireLink {
    tx: Wire,
    rx: Wire,
    pub(crate) writes: usize,
}

/// Two connected link ends, master first
pub(crate) fn wire_pair() -> (WireLink, WireLink) {
    let a = Wire::default();
    let b = Wire::default();
    (
        WireLink {
            tx: a.clone(),
            rx: b.clone(),
            writes: 0,
        },
        WireLink {
            tx: b,
            rx: a,
            writes: 0,
        },
    )
}

impl Link for WireLink {
    type Error = Infallible;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
        self.writes += 1;
        self.tx.bytes.borrow_mut().extend(bytes.iter().copied());
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        let mut rx = self.rx.bytes.borrow_mut();
        let n = buf.len().min(rx.len());
        for (slot, byte) in buf.iter_mut().zip(rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
