#![allow(dead_code)]

use serimsg::{Baudrate, Error, EventHandler, Parity, RxMessage, SerialDevice, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An in-memory serial device.
///
/// Cloning shares the underlying buffers, so a clone taken before moving the
/// device into a context can inject received bytes and inspect written ones.
/// [`MockSerialDevice::peer`] gives the other end of the link.
#[derive(Default, Clone)]
pub struct MockSerialDevice {
	pub rx: Arc<Mutex<VecDeque<u8>>>,
	pub tx: Arc<Mutex<VecDeque<u8>>>,
	pub open: bool,
	pub write_limit: Option<usize>,
	pub read_error: Option<Error>,
	pub config: Option<(Baudrate, Parity, bool)>,
}

impl MockSerialDevice {
	pub fn new() -> Self {
		Self::default()
	}

	/// The same link, seen from the other end.
	pub fn peer(&self) -> Self {
		MockSerialDevice {
			rx: self.tx.clone(),
			tx: self.rx.clone(),
			open: false,
			write_limit: None,
			read_error: None,
			config: None,
		}
	}

	pub fn push_rx(&self, bytes: &[u8]) {
		let mut rx = self.rx.lock().unwrap();
		for &byte in bytes {
			rx.push_back(byte);
		}
	}

	pub fn take_tx(&self) -> Vec<u8> {
		self.tx.lock().unwrap().drain(..).collect()
	}
}

impl SerialDevice for MockSerialDevice {
	fn open(&mut self, path: &str) -> Result<(), Error> {
		if path == "missing" {
			return Err(Error::NoDevice);
		}
		self.open = true;
		Ok(())
	}

	fn close(&mut self) {
		self.open = false;
	}

	fn set_config(&mut self, baudrate: Baudrate, parity: Parity, flow_control: bool) -> Result<(), Error> {
		self.config = Some((baudrate, parity, flow_control));
		Ok(())
	}

	fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
		if let Some(error) = self.read_error {
			return Err(error);
		}

		let mut rx = self.rx.lock().unwrap();
		let len = buf.len().min(rx.len());
		for slot in buf[..len].iter_mut() {
			*slot = rx.pop_front().unwrap();
		}
		Ok(len)
	}

	fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
		let len = match self.write_limit {
			Some(limit) => buf.len().min(limit),
			None => buf.len(),
		};
		let mut tx = self.tx.lock().unwrap();
		for &byte in &buf[..len] {
			tx.push_back(byte);
		}
		Ok(len)
	}

	fn wait(&mut self, _timeout: Option<Duration>) -> Result<(), Error> {
		if self.rx.lock().unwrap().is_empty() {
			return Err(Error::TimedOut);
		}
		Ok(())
	}
}

/// An owned copy of a received argument.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedValue {
	None,
	U8(u8),
	I8(i8),
	U16(u16),
	I16(i16),
	U32(u32),
	I32(i32),
	U64(u64),
	I64(i64),
	String(String),
	F32(f32),
	F64(f64),
	Raw(Vec<u8>),
}

impl From<Value<'_>> for OwnedValue {
	fn from(value: Value<'_>) -> Self {
		match value {
			Value::None => OwnedValue::None,
			Value::U8(value) => OwnedValue::U8(value),
			Value::I8(value) => OwnedValue::I8(value),
			Value::U16(value) => OwnedValue::U16(value),
			Value::I16(value) => OwnedValue::I16(value),
			Value::U32(value) => OwnedValue::U32(value),
			Value::I32(value) => OwnedValue::I32(value),
			Value::U64(value) => OwnedValue::U64(value),
			Value::I64(value) => OwnedValue::I64(value),
			Value::String(value) => OwnedValue::String(value.to_owned()),
			Value::F32(value) => OwnedValue::F32(value),
			Value::F64(value) => OwnedValue::F64(value),
			Value::Raw(value) => OwnedValue::Raw(value.to_owned()),
		}
	}
}

/// Collects everything a context reports.
#[derive(Default)]
pub struct Recorder {
	pub messages: Vec<(u32, Vec<OwnedValue>)>,
	pub errors: Vec<Error>,
}

impl EventHandler for Recorder {
	fn on_message(&mut self, message: &RxMessage<'_>) {
		let values = (0..message.n_args())
			.map(|i| message.value(i).map(OwnedValue::from).unwrap_or(OwnedValue::None))
			.collect();
		self.messages.push((message.msgid(), values));
	}

	fn on_error(&mut self, error: Error) {
		self.errors.push(error);
	}
}
