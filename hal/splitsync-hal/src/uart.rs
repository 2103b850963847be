//! UART serial communication abstractions
//!
//! Split halves are usually joined by a serial line. These traits cover
//! the two things the link layer needs: a blocking write and a
//! non-blocking drain of whatever has been received.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Check whether at least one byte is waiting
    fn read_ready(&mut self) -> Result<bool, Self::Error>;

    /// Read the bytes that are already buffered
    ///
    /// Must not block when [`UartRx::read_ready`] returned true. Returns the
    /// number of bytes copied into `buf`.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read without blocking, returning 0 when nothing is waiting
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.read_ready()? {
            return Ok(0);
        }
        self.read_available(buf)
    }
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl UartConfig {
    /// 8N1 at the split serial default rate
    pub const fn new() -> Self {
        Self {
            // Fast enough for a 1 kHz scan rate
            baudrate: 57_600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    /// Same framing with a different baud rate
    pub const fn with_baudrate(self, baudrate: u32) -> Self {
        Self { baudrate, ..self }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Idle;

    impl UartRx for Idle {
        type Error = ();

        fn read_ready(&mut self) -> Result<bool, ()> {
            Ok(false)
        }

        fn read_available(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
            panic!("must not read when nothing is ready");
        }
    }

    #[test]
    fn test_try_read_does_not_block_when_idle() {
        let mut rx = Idle;
        let mut buf = [0u8; 4];
        assert_eq!(rx.try_read(&mut buf), Ok(0));
    }

    #[test]
    fn test_default_config() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 57_600);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.with_baudrate(115_200).baudrate, 115_200);
    }
}
