//! UART-backed link
//!
//! Adapts a serial transmitter/receiver pair to the [`Link`] trait. Frames
//! are self-delimiting, so the link just moves bytes. On a single-wire
//! half-duplex line each half also hears its own transmissions; the
//! executor discards frames of its own direction.

use splitsync_hal::{Link, LinkError, UartRx, UartTx};
use splitsync_protocol::MAX_FRAME_SIZE;

/// Link over a UART
#[derive(Debug)]
pub struct UartLink<T, R> {
    tx: T,
    rx: R,
}

impl<T: UartTx, R: UartRx> UartLink<T, R> {
    /// Create a link from the two UART halves
    pub fn new(tx: T, rx: R) -> Self {
        Self { tx, rx }
    }

    /// Release the UART halves
    pub fn into_parts(self) -> (T, R) {
        (self.tx, self.rx)
    }
}

impl<T: UartTx, R: UartRx> Link for UartLink<T, R> {
    type Error = LinkError;

    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        if bytes.len() > MAX_FRAME_SIZE {
            return Err(LinkError::Oversized);
        }
        self.tx.write_blocking(bytes).map_err(|_| LinkError::Bus)?;
        self.tx.flush().map_err(|_| LinkError::Bus)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        self.rx.try_read(buf).map_err(|_| LinkError::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::vec::Vec;

    type Wire = Rc<RefCell<VecDeque<u8>>>;

    struct FakeTx {
        wire: Wire,
        flushed: usize,
    }

    impl UartTx for FakeTx {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            self.wire.borrow_mut().extend(data.iter().copied());
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            self.flushed += 1;
            Ok(())
        }
    }

    struct FakeRx {
        wire: Wire,
    }

    impl UartRx for FakeRx {
        type Error = ();

        fn read_ready(&mut self) -> Result<bool, ()> {
            Ok(!self.wire.borrow().is_empty())
        }

        fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            let mut wire = self.wire.borrow_mut();
            let n = buf.len().min(wire.len());
            for (slot, byte) in buf.iter_mut().zip(wire.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        }
    }

    struct BrokenTx;

    impl UartTx for BrokenTx {
        type Error = ();

        fn write_blocking(&mut self, _data: &[u8]) -> Result<(), ()> {
            Err(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    fn loopback() -> UartLink<FakeTx, FakeRx> {
        let wire: Wire = Rc::default();
        UartLink::new(
            FakeTx {
                wire: wire.clone(),
                flushed: 0,
            },
            FakeRx { wire },
        )
    }

    #[test]
    fn test_write_then_read_in_chunks() {
        let mut link = loopback();
        link.write(&[1, 2, 3, 4, 5]).unwrap();

        let mut buf = [0u8; 3];
        assert_eq!(link.read(&mut buf), Ok(3));
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(link.read(&mut buf), Ok(2));
        assert_eq!(&buf[..2], &[4, 5]);
        assert_eq!(link.read(&mut buf), Ok(0));

        let (tx, _rx) = link.into_parts();
        assert_eq!(tx.flushed, 1);
    }

    #[test]
    fn test_oversized_write_rejected_before_transmit() {
        let mut link = loopback();
        let big = Vec::from([0u8; MAX_FRAME_SIZE + 1]);
        assert_eq!(link.write(&big), Err(LinkError::Oversized));

        let mut buf = [0u8; 8];
        assert_eq!(link.read(&mut buf), Ok(0));
    }

    #[test]
    fn test_uart_failure_maps_to_bus_error() {
        let wire: Wire = Rc::default();
        let mut link = UartLink::new(BrokenTx, FakeRx { wire });
        assert_eq!(link.write(&[1]), Err(LinkError::Bus));
    }
}
