//! Bind a serial device to the frame and message codecs.

use std::time::Duration;

use crate::buffer::Storage;
use crate::frame::{self, Decoder};
use crate::message::{Message, Value, MESSAGE_MAX_VALUES};
use crate::{Baudrate, Error, Parity, SerialDevice};

/// A message decoded on the receive path.
///
/// Its argument slots live on the stack of the receive loop and its string
/// and raw arguments borrow the decoder buffer, so it is only valid inside
/// the callback.
pub type RxMessage<'a> = Message<[Value<'a>; MESSAGE_MAX_VALUES]>;

/// Receives decoded messages and receive-path errors.
///
/// Callbacks run synchronously inside [`Context::process_fd`]. They must not
/// send on the context being driven; sending on another context is fine.
pub trait EventHandler {
	/// A complete message arrived.
	fn on_message(&mut self, message: &RxMessage<'_>);

	/// A frame or message on the receive path could not be decoded.
	///
	/// [`Error::BadMessage`] and [`Error::TooBig`] are recoverable: the
	/// offending frame is dropped and the stream continues.
	fn on_error(&mut self, error: Error);
}

/// A messaging session over one serial device.
///
/// Owns the device, the frame decoder and the TX scratch storage. With the
/// default `Vec<u8>` storage all buffers grow on demand;
/// [`Context::with_buffers`] runs entirely on caller-supplied storage and
/// never allocates.
pub struct Context<Device, Handler, Buffer: Storage = Vec<u8>> {
	device: Device,
	decoder: Decoder<Buffer>,
	handler: Handler,
	serial_tx: Buffer,
	msg_tx: Buffer,
	opened: bool,
}

impl<Device, Handler> Context<Device, Handler, Vec<u8>>
where
	Device: SerialDevice,
	Handler: EventHandler,
{
	/// Create a context with growable buffers.
	pub fn new(device: Device, handler: Handler) -> Self {
		Self::with_buffers(device, handler, Decoder::new(), Vec::new(), Vec::new())
	}
}

impl<Device, Handler, Buffer> Context<Device, Handler, Buffer>
where
	Device: SerialDevice,
	Handler: EventHandler,
	Buffer: Storage,
{
	/// Create a context on caller-supplied storage.
	///
	/// `serial_tx` must hold a full frame and `msg_tx` a full encoded
	/// message; sends that do not fit fail with [`Error::Overflow`].
	pub fn with_buffers(device: Device, handler: Handler, decoder: Decoder<Buffer>, serial_tx: Buffer, msg_tx: Buffer) -> Self {
		Context {
			device,
			decoder,
			handler,
			serial_tx,
			msg_tx,
			opened: false,
		}
	}

	/// Open the named serial device.
	///
	/// Fails with [`Error::Busy`] when the context is already open.
	pub fn open(&mut self, path: &str) -> Result<(), Error> {
		if self.opened {
			return Err(Error::Busy);
		}

		self.device.open(path)?;
		self.opened = true;
		Ok(())
	}

	/// Close the context, releasing the serial device. Closing a closed
	/// context is a no-op.
	pub fn close(&mut self) {
		if !self.opened {
			return;
		}

		self.device.close();
		self.opened = false;
	}

	/// Whether the context is open.
	pub fn is_open(&self) -> bool {
		self.opened
	}

	/// Change the line parameters of the device.
	pub fn set_config(&mut self, baudrate: Baudrate, parity: Parity, flow_control: bool) -> Result<(), Error> {
		self.device.set_config(baudrate, parity, flow_control)
	}

	/// Set the growth ceiling of the receive decoder.
	pub fn set_decoder_maximum_capacity(&mut self, max: usize) -> Result<(), Error> {
		self.decoder.set_maximum_capacity(max)
	}

	/// The device driven by this context.
	///
	/// Reading or writing through it directly bypasses the codecs.
	pub fn device(&self) -> &Device {
		&self.device
	}

	/// The device driven by this context, mutably.
	pub fn device_mut(&mut self) -> &mut Device {
		&mut self.device
	}

	/// The event handler.
	pub fn handler(&self) -> &Handler {
		&self.handler
	}

	/// The event handler, mutably.
	pub fn handler_mut(&mut self) -> &mut Handler {
		&mut self.handler
	}

	/// Consume the context to get ownership of the device.
	pub fn into_device(self) -> Device {
		self.device
	}

	/// Encode and send one message.
	///
	/// The message is encoded into the TX scratch, framed, and written to the
	/// device in one synchronous call. A short device write fails with
	/// [`Error::Io`].
	pub fn send_message<'v, V>(&mut self, message: &Message<V>) -> Result<(), Error>
	where
		V: AsRef<[Value<'v>]>,
	{
		if !self.opened {
			return Err(Error::BadFd);
		}

		let message_size = message.encoded_size()?;
		if !self.msg_tx.ensure_capacity(message_size) {
			return Err(Error::Overflow);
		}
		let message_len = message.encode_into(self.msg_tx.bytes_mut())?;

		let frame_size = frame::encoded_size(&self.msg_tx.bytes()[..message_len]);
		if !self.serial_tx.ensure_capacity(frame_size) {
			return Err(Error::Overflow);
		}
		let frame_len = frame::encode_into(&self.msg_tx.bytes()[..message_len], self.serial_tx.bytes_mut())?;

		trace!("sending frame: {:02X?}", &self.serial_tx.bytes()[..frame_len]);
		let written = self.device.write(&self.serial_tx.bytes()[..frame_len])?;
		if written != frame_len {
			return Err(Error::Io);
		}
		Ok(())
	}

	/// Drain and decode everything the device has pending.
	///
	/// Returns once the device has no more data. Decoded messages and
	/// recoverable decode errors go to the [`EventHandler`]; device failures
	/// abort the call and are returned.
	pub fn process_fd(&mut self) -> Result<(), Error> {
		if !self.opened {
			return Err(Error::BadFd);
		}

		loop {
			let mut byte = [0u8; 1];
			match self.device.read(&mut byte) {
				Ok(0) | Err(Error::WouldBlock) => return Ok(()),
				Ok(_) => {}
				Err(error) => return Err(error),
			}

			match self.decoder.process_byte(byte[0]) {
				Ok(None) => {}
				Ok(Some(frame)) => {
					trace!("received frame: {:02X?}", frame);
					let mut message = Message::with_values(0, [Value::None; MESSAGE_MAX_VALUES]);
					match message.parse(frame) {
						Ok(()) => self.handler.on_message(&message),
						Err(error) => self.handler.on_error(error),
					}
				}
				Err(error) => {
					debug!("dropping corrupted frame: {}", error);
					self.handler.on_error(error);
				}
			}
		}
	}

	/// Wait for data on the device and process it.
	///
	/// `None` waits without a deadline; otherwise [`Error::TimedOut`] is
	/// returned when the timeout elapses with nothing received.
	pub fn wait_and_process(&mut self, timeout: Option<Duration>) -> Result<(), Error> {
		if !self.opened {
			return Err(Error::BadFd);
		}

		self.device.wait(timeout)?;
		self.process_fd()
	}
}
