//! Inter-half link abstraction
//!
//! A link carries encoded frames between the two halves. Implementations
//! may be message oriented (one frame per read) or byte streams (a read
//! returns whatever bytes have arrived); the protocol frames are
//! self-delimiting so the layer above handles both.
//!
//! Guarantees expected from an implementation:
//! - bytes written in one `write` are delivered in order
//! - nothing is duplicated
//! - delivery itself is not guaranteed

/// Errors from link operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Underlying peripheral reported a failure
    Bus,
    /// Write larger than the link can carry
    Oversized,
}

/// Frame transport between halves
pub trait Link {
    /// Error type for link operations
    type Error: core::fmt::Debug;

    /// Transmit one encoded frame to the other half
    ///
    /// Blocks until the bytes are handed to the peripheral.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read whatever has arrived into `buf`
    ///
    /// Never blocks. Returns the number of bytes written to `buf`;
    /// `Ok(0)` means nothing is available yet.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<L: Link + ?Sized> Link for &mut L {
    type Error = L::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }
}
