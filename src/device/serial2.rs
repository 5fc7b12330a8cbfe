//! [`SerialDevice`] implementation using the `serial2` crate.

use std::time::Duration;

use super::{Baudrate, Parity, SerialDevice};
use crate::Error;

/// How long to sleep per poll round when waiting without a deadline.
const WAIT_FOREVER_CHUNK: Duration = Duration::from_secs(3600);

/// A host serial port, POSIX or Win32.
///
/// The port is opened in raw mode at 115200 8-N-1 without flow control;
/// use [`SerialDevice::set_config`] to change the line parameters.
#[derive(Debug, Default)]
pub struct SerialPortDevice {
	port: Option<serial2::SerialPort>,

	// One byte read ahead by wait() and handed back by the next read().
	pending: Option<u8>,
}

impl SerialPortDevice {
	/// Create a device with no port attached yet.
	pub fn new() -> Self {
		Self::default()
	}

	/// The underlying port, when open.
	///
	/// Reading or writing through it directly bypasses the codecs and may
	/// corrupt frames in transit.
	pub fn port(&self) -> Option<&serial2::SerialPort> {
		self.port.as_ref()
	}

	fn port_mut(&mut self) -> Result<&mut serial2::SerialPort, Error> {
		self.port.as_mut().ok_or(Error::BadFd)
	}
}

impl SerialDevice for SerialPortDevice {
	fn open(&mut self, path: &str) -> Result<(), Error> {
		if self.port.is_some() {
			return Err(Error::Busy);
		}

		let port = serial2::SerialPort::open(path, 115200)?;
		self.port = Some(port);
		self.pending = None;
		Ok(())
	}

	fn close(&mut self) {
		self.port = None;
		self.pending = None;
	}

	fn set_config(&mut self, baudrate: Baudrate, parity: Parity, flow_control: bool) -> Result<(), Error> {
		let port = self.port_mut()?;

		let mut settings = port.get_configuration()?;
		settings
			.set_baud_rate(baudrate.bits_per_second())
			.map_err(|_| Error::NotSupported)?;
		settings.set_parity(match parity {
			Parity::None => serial2::Parity::None,
			Parity::Odd => serial2::Parity::Odd,
			Parity::Even => serial2::Parity::Even,
		});
		settings.set_flow_control(if flow_control {
			serial2::FlowControl::XonXoff
		} else {
			serial2::FlowControl::None
		});
		port.set_configuration(&settings)?;
		Ok(())
	}

	fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
		if buf.is_empty() {
			return Ok(0);
		}

		if let Some(byte) = self.pending.take() {
			buf[0] = byte;
			return Ok(1);
		}

		let port = self.port_mut()?;
		port.set_read_timeout(Duration::from_millis(0))?;
		match port.read(buf) {
			Ok(read) => Ok(read),
			Err(error) => match Error::from(error) {
				// No pending data is not an error for a non-blocking read.
				Error::WouldBlock | Error::TimedOut => Ok(0),
				error => Err(error),
			},
		}
	}

	fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
		let port = self.port_mut()?;
		Ok(port.write(buf)?)
	}

	fn wait(&mut self, timeout: Option<Duration>) -> Result<(), Error> {
		if self.pending.is_some() {
			return Ok(());
		}

		// serial2 has no readability poll, so read one byte with the
		// requested timeout and hand it back from the next read().
		let port = self.port_mut()?;
		let mut byte = [0u8; 1];
		match timeout {
			Some(timeout) => {
				port.set_read_timeout(timeout)?;
				match port.read(&mut byte) {
					// A read of zero bytes means the window elapsed.
					Ok(0) => Err(Error::TimedOut),
					Ok(_) => {
						self.pending = Some(byte[0]);
						Ok(())
					}
					Err(error) => match Error::from(error) {
						Error::WouldBlock => Err(Error::TimedOut),
						error => Err(error),
					},
				}
			}
			None => loop {
				port.set_read_timeout(WAIT_FOREVER_CHUNK)?;
				match port.read(&mut byte) {
					Ok(0) => continue,
					Ok(_) => {
						self.pending = Some(byte[0]);
						return Ok(());
					}
					Err(error) => match Error::from(error) {
						Error::WouldBlock | Error::TimedOut => continue,
						error => return Err(error),
					},
				}
			},
		}
	}
}
