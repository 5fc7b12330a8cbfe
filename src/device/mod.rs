//! The serial device interface and its host implementation.
//!
//! The codecs and the [`Context`](crate::Context) never touch a platform
//! API: everything goes through the [`SerialDevice`] trait. The crate ships
//! [`SerialPortDevice`](crate::SerialPortDevice) for hosts with a serial
//! port; embedded targets implement the trait on top of their UART driver.

pub mod serial2;

use crate::Error;
use std::time::Duration;

/// Line speeds a device can be configured to.
///
/// The classic rates up to 115200 are supported everywhere; the higher rates
/// are only available where the transport supports them and
/// [`SerialDevice::set_config`] fails with
/// [`Error::NotSupported`] otherwise.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Baudrate {
	B1200,
	B2400,
	B4800,
	B9600,
	B19200,
	B38400,
	B57600,
	B115200,
	B125000,
	B230400,
	B460800,
	B921600,
	B1000000,
	B2000000,
	B4000000,
}

impl Baudrate {
	/// The rate in bits per second.
	pub fn bits_per_second(self) -> u32 {
		match self {
			Baudrate::B1200 => 1200,
			Baudrate::B2400 => 2400,
			Baudrate::B4800 => 4800,
			Baudrate::B9600 => 9600,
			Baudrate::B19200 => 19200,
			Baudrate::B38400 => 38400,
			Baudrate::B57600 => 57600,
			Baudrate::B115200 => 115200,
			Baudrate::B125000 => 125000,
			Baudrate::B230400 => 230400,
			Baudrate::B460800 => 460800,
			Baudrate::B921600 => 921600,
			Baudrate::B1000000 => 1000000,
			Baudrate::B2000000 => 2000000,
			Baudrate::B4000000 => 4000000,
		}
	}
}

impl Default for Baudrate {
	fn default() -> Self {
		Baudrate::B115200
	}
}

/// Parity of the serial line.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Parity {
	None,
	Odd,
	Even,
}

impl Default for Parity {
	fn default() -> Self {
		Parity::None
	}
}

/// A byte-oriented serial link.
///
/// Implementations open in raw mode at 115200 8-N-1 without flow control and
/// report failures with the crate [`Error`] taxonomy. Disconnects surface as
/// [`Error::Pipe`].
pub trait SerialDevice {
	/// Open the named device.
	fn open(&mut self, path: &str) -> Result<(), Error>;

	/// Close the device. Closing a closed device is a no-op.
	fn close(&mut self);

	/// Change the line parameters.
	///
	/// Flow control means XON/XOFF. May fail with [`Error::NotSupported`]
	/// where the transport has fixed line parameters.
	fn set_config(&mut self, baudrate: Baudrate, parity: Parity, flow_control: bool) -> Result<(), Error>;

	/// Read pending bytes without blocking.
	///
	/// Returns the number of bytes stored in `buf`; zero (or
	/// [`Error::WouldBlock`]) when nothing is pending.
	fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

	/// Write bytes, returning the number actually written.
	fn write(&mut self, buf: &[u8]) -> Result<usize, Error>;

	/// Block until the device is readable.
	///
	/// `None` waits without a deadline; otherwise [`Error::TimedOut`] is
	/// returned when the timeout elapses with no data.
	fn wait(&mut self, timeout: Option<Duration>) -> Result<(), Error>;
}
