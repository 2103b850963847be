//! RP2040 UART adapters for the link layer

use embassy_rp::uart::{self, BufferedUartRx, BufferedUartTx};
use embedded_io::{Read, ReadReady, Write};
use splitsync_core::link::UartLink;
use splitsync_hal::{DataBits, Parity, StopBits, UartConfig, UartRx, UartTx};

/// Transmit half of the inter-half UART
pub struct SplitTx(pub BufferedUartTx);

/// Receive half of the inter-half UART
pub struct SplitRx(pub BufferedUartRx);

impl UartTx for SplitTx {
    type Error = uart::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), uart::Error> {
        self.0.write_all(data)
    }

    fn flush(&mut self) -> Result<(), uart::Error> {
        Write::flush(&mut self.0)
    }
}

impl UartRx for SplitRx {
    type Error = uart::Error;

    fn read_ready(&mut self) -> Result<bool, uart::Error> {
        ReadReady::read_ready(&mut self.0)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, uart::Error> {
        Read::read(&mut self.0, buf)
    }
}

/// Convert link framing to the embassy-rp UART configuration
pub fn rp_config(config: &UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    rp.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    rp
}

/// Link over the inter-half UART
pub type SplitLink = UartLink<SplitTx, SplitRx>;
