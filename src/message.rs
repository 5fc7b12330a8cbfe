//! Typed-argument records identified by a 32-bit message ID.
//!
//! On the wire a message is `msgid:u32le | payload_len:u32le` followed by one
//! record per argument, each `type:u8 | value`. Scalars are little-endian
//! with their natural width, floats travel as their IEEE-754 bit patterns,
//! strings as `len:u16le | bytes… | 0x00` (the terminator is counted in
//! `len`) and raw buffers as `len:u16le | bytes…`.
//!
//! Argument slots are sparse: a [`Value::None`] slot is omitted on the wire
//! and terminates the logical argument list as reported by
//! [`Message::n_args`]. Strings and raw payloads are non-owning borrows, so
//! a decoded message is bound to the buffer it was parsed from.

use crate::endian::{
	read_f32_le, read_f64_le, read_u16_le, read_u32_le, read_u64_le, write_f32_le, write_f64_le, write_u16_le,
	write_u32_le, write_u64_le,
};
use crate::Error;

/// The default and minimum number of argument slots in a message.
pub const MESSAGE_MAX_VALUES: usize = 16;

const HEADER_SIZE: usize = 8;

/// The wire tags of the argument types.
pub mod type_id {
	pub const NONE: u8 = 0x00;
	pub const U8: u8 = 0x01;
	pub const I8: u8 = 0x02;
	pub const U16: u8 = 0x03;
	pub const I16: u8 = 0x04;
	pub const U32: u8 = 0x05;
	pub const I32: u8 = 0x06;
	pub const U64: u8 = 0x07;
	pub const I64: u8 = 0x08;
	pub const STRING: u8 = 0x09;
	pub const F32: u8 = 0x0A;
	pub const F64: u8 = 0x0B;
	pub const RAW: u8 = 0x10;
}

/// One typed argument slot.
///
/// `None` marks an empty slot. String and raw values borrow their backing
/// bytes, which must outlive the message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
	None,
	U8(u8),
	I8(i8),
	U16(u16),
	I16(i16),
	U32(u32),
	I32(i32),
	U64(u64),
	I64(i64),
	String(&'a str),
	F32(f32),
	F64(f64),
	Raw(&'a [u8]),
}

impl<'a> Value<'a> {
	/// The wire tag of this value.
	pub fn tag(&self) -> u8 {
		match self {
			Value::None => type_id::NONE,
			Value::U8(_) => type_id::U8,
			Value::I8(_) => type_id::I8,
			Value::U16(_) => type_id::U16,
			Value::I16(_) => type_id::I16,
			Value::U32(_) => type_id::U32,
			Value::I32(_) => type_id::I32,
			Value::U64(_) => type_id::U64,
			Value::I64(_) => type_id::I64,
			Value::String(_) => type_id::STRING,
			Value::F32(_) => type_id::F32,
			Value::F64(_) => type_id::F64,
			Value::Raw(_) => type_id::RAW,
		}
	}

	/// The encoded size of the value, excluding its tag byte.
	///
	/// Strings longer than 65534 bytes and raw payloads longer than 65535
	/// bytes cannot be expressed in the 16-bit length field and fail with
	/// [`Error::TooBig`].
	fn wire_size(&self) -> Result<usize, Error> {
		match self {
			Value::None => Ok(0),
			Value::U8(_) | Value::I8(_) => Ok(1),
			Value::U16(_) | Value::I16(_) => Ok(2),
			Value::U32(_) | Value::I32(_) | Value::F32(_) => Ok(4),
			Value::U64(_) | Value::I64(_) | Value::F64(_) => Ok(8),
			Value::String(value) => {
				if value.len() + 1 > u16::MAX as usize {
					return Err(Error::TooBig);
				}
				Ok(2 + value.len() + 1)
			}
			Value::Raw(value) => {
				if value.len() > u16::MAX as usize {
					return Err(Error::TooBig);
				}
				Ok(2 + value.len())
			}
		}
	}
}

fn encode_value(value: &Value<'_>, out: &mut [u8]) -> usize {
	out[0] = value.tag();
	let out = &mut out[1..];
	let used = match *value {
		Value::None => 0,
		Value::U8(value) => {
			out[0] = value;
			1
		}
		Value::I8(value) => {
			out[0] = value as u8;
			1
		}
		Value::U16(value) => {
			write_u16_le(out, value);
			2
		}
		Value::I16(value) => {
			write_u16_le(out, value as u16);
			2
		}
		Value::U32(value) => {
			write_u32_le(out, value);
			4
		}
		Value::I32(value) => {
			write_u32_le(out, value as u32);
			4
		}
		Value::U64(value) => {
			write_u64_le(out, value);
			8
		}
		Value::I64(value) => {
			write_u64_le(out, value as u64);
			8
		}
		Value::F32(value) => {
			write_f32_le(out, value);
			4
		}
		Value::F64(value) => {
			write_f64_le(out, value);
			8
		}
		Value::String(value) => {
			write_u16_le(out, value.len() as u16 + 1);
			out[2..2 + value.len()].copy_from_slice(value.as_bytes());
			out[2 + value.len()] = 0;
			2 + value.len() + 1
		}
		Value::Raw(value) => {
			write_u16_le(out, value.len() as u16);
			out[2..2 + value.len()].copy_from_slice(value);
			2 + value.len()
		}
	};
	1 + used
}

fn decode_string(buffer: &[u8]) -> Result<(&str, usize), Error> {
	if buffer.len() < 2 {
		return Err(Error::BadMessage);
	}

	let size = read_u16_le(buffer) as usize;
	if size == 0 || buffer.len() < 2 + size {
		return Err(Error::BadMessage);
	}

	// The declared size counts the terminator.
	let bytes = &buffer[2..2 + size];
	if bytes[size - 1] != 0 {
		return Err(Error::BadMessage);
	}

	let string = std::str::from_utf8(&bytes[..size - 1]).map_err(|_| Error::BadMessage)?;
	Ok((string, 2 + size))
}

fn decode_value(buffer: &[u8]) -> Result<(Value<'_>, usize), Error> {
	// Tag plus at least one byte of value data.
	if buffer.len() < 2 {
		return Err(Error::BadMessage);
	}

	let tag = buffer[0];
	let data = &buffer[1..];
	let check = |len| if data.len() < len { Err(Error::BadMessage) } else { Ok(()) };

	let (value, used) = match tag {
		type_id::U8 => (Value::U8(data[0]), 1),
		type_id::I8 => (Value::I8(data[0] as i8), 1),
		type_id::U16 => {
			check(2)?;
			(Value::U16(read_u16_le(data)), 2)
		}
		type_id::I16 => {
			check(2)?;
			(Value::I16(read_u16_le(data) as i16), 2)
		}
		type_id::U32 => {
			check(4)?;
			(Value::U32(read_u32_le(data)), 4)
		}
		type_id::I32 => {
			check(4)?;
			(Value::I32(read_u32_le(data) as i32), 4)
		}
		type_id::U64 => {
			check(8)?;
			(Value::U64(read_u64_le(data)), 8)
		}
		type_id::I64 => {
			check(8)?;
			(Value::I64(read_u64_le(data) as i64), 8)
		}
		type_id::F32 => {
			check(4)?;
			(Value::F32(read_f32_le(data)), 4)
		}
		type_id::F64 => {
			check(8)?;
			(Value::F64(read_f64_le(data)), 8)
		}
		type_id::STRING => {
			let (string, used) = decode_string(data)?;
			(Value::String(string), used)
		}
		type_id::RAW => {
			check(2)?;
			let size = read_u16_le(data) as usize;
			check(2 + size)?;
			(Value::Raw(&data[2..2 + size]), 2 + size)
		}
		_ => return Err(Error::BadMessage),
	};

	Ok((value, 1 + used))
}

/// A message: a 32-bit ID plus a bounded, indexed sequence of typed
/// arguments.
///
/// The slot container is generic so callers choose where the slots live:
/// [`Message::new`] owns a `Vec`, [`Message::with_values`] borrows or embeds
/// caller storage and never allocates. Capacity is fixed at construction.
#[derive(Debug, Clone)]
pub struct Message<V> {
	msgid: u32,
	values: V,
}

impl<'a> Message<Vec<Value<'a>>> {
	/// Create an empty message with [`MESSAGE_MAX_VALUES`] argument slots.
	pub fn new(msgid: u32) -> Self {
		Self::with_capacity(msgid, MESSAGE_MAX_VALUES)
	}

	/// Create an empty message with at least [`MESSAGE_MAX_VALUES`] slots.
	pub fn with_capacity(msgid: u32, capacity: usize) -> Self {
		Message {
			msgid,
			values: vec![Value::None; capacity.max(MESSAGE_MAX_VALUES)],
		}
	}

	/// Decode a message from its wire form.
	///
	/// String and raw arguments borrow `buffer`, which must outlive the
	/// message.
	pub fn from_buffer(buffer: &'a [u8]) -> Result<Self, Error> {
		let mut message = Self::new(0);
		message.parse(buffer)?;
		Ok(message)
	}
}

impl<'a, V> Message<V>
where
	V: AsRef<[Value<'a>]>,
{
	/// Create an empty message on caller-supplied slots.
	pub fn with_values(msgid: u32, values: V) -> Self {
		Message { msgid, values }
	}

	/// The message ID.
	pub fn msgid(&self) -> u32 {
		self.msgid
	}

	/// Replace the message ID.
	pub fn set_msgid(&mut self, msgid: u32) {
		self.msgid = msgid;
	}

	/// The number of argument slots.
	pub fn capacity(&self) -> usize {
		self.values.as_ref().len()
	}

	/// The number of arguments up to the first empty slot.
	pub fn n_args(&self) -> usize {
		self.values
			.as_ref()
			.iter()
			.position(|value| *value == Value::None)
			.unwrap_or_else(|| self.capacity())
	}

	/// Iterate over the arguments up to the first empty slot.
	pub fn args<'s>(&'s self) -> impl Iterator<Item = Value<'a>> + 's
	where
		'a: 's,
	{
		self.values
			.as_ref()
			.iter()
			.copied()
			.take_while(|value| *value != Value::None)
	}

	/// Get the value at `index`.
	///
	/// Fails with [`Error::NotFound`] when the index is out of bounds or the
	/// slot is empty.
	pub fn value(&self, index: usize) -> Result<Value<'a>, Error> {
		match self.values.as_ref().get(index) {
			None | Some(Value::None) => Err(Error::NotFound),
			Some(&value) => Ok(value),
		}
	}

	fn get(&self, index: usize) -> Result<Value<'a>, Error> {
		match self.values.as_ref().get(index) {
			None => Err(Error::NotFound),
			Some(&value) => Ok(value),
		}
	}

	/// Get the string at `index`. The slice is valid as long as the backing
	/// buffer.
	pub fn get_string(&self, index: usize) -> Result<&'a str, Error> {
		match self.get(index)? {
			Value::String(value) => Ok(value),
			_ => Err(Error::BadType),
		}
	}

	/// Get the raw payload at `index`. The slice is valid as long as the
	/// backing buffer.
	pub fn get_raw(&self, index: usize) -> Result<&'a [u8], Error> {
		match self.get(index)? {
			Value::Raw(value) => Ok(value),
			_ => Err(Error::BadType),
		}
	}

	/// The exact number of bytes [`Message::encode_into`] will write.
	pub fn encoded_size(&self) -> Result<usize, Error> {
		let mut size = HEADER_SIZE;
		for value in self.values.as_ref() {
			if *value != Value::None {
				size += 1 + value.wire_size()?;
			}
		}
		if size - HEADER_SIZE > u32::MAX as usize {
			return Err(Error::Overflow);
		}
		Ok(size)
	}

	/// Encode the message into `out`, returning the number of bytes written.
	///
	/// Arguments are written in index order, empty slots are skipped. Fails
	/// with [`Error::NoMem`] when `out` is too small.
	pub fn encode_into(&self, out: &mut [u8]) -> Result<usize, Error> {
		let size = self.encoded_size()?;
		if out.len() < size {
			return Err(Error::NoMem);
		}

		write_u32_le(&mut out[0..4], self.msgid);
		let mut offset = HEADER_SIZE;
		for value in self.values.as_ref() {
			if *value != Value::None {
				offset += encode_value(value, &mut out[offset..]);
			}
		}
		write_u32_le(&mut out[4..8], (offset - HEADER_SIZE) as u32);
		Ok(offset)
	}

	/// Encode the message into a new buffer.
	pub fn encode(&self) -> Result<Vec<u8>, Error> {
		let mut out = vec![0; self.encoded_size()?];
		self.encode_into(&mut out)?;
		Ok(out)
	}
}

impl<'a, V> Message<V>
where
	V: AsRef<[Value<'a>]> + AsMut<[Value<'a>]>,
{
	/// Reset the message: the ID becomes zero and every slot empty.
	pub fn clear(&mut self) {
		self.msgid = 0;
		for slot in self.values.as_mut() {
			*slot = Value::None;
		}
	}

	/// Store `value` at `index`. Storing [`Value::None`] clears the slot.
	pub fn set_value(&mut self, index: usize, value: Value<'a>) -> Result<(), Error> {
		match self.values.as_mut().get_mut(index) {
			None => Err(Error::NotFound),
			Some(slot) => {
				*slot = value;
				Ok(())
			}
		}
	}

	/// Store a string at `index`. The string is not copied and must outlive
	/// the message.
	pub fn set_string(&mut self, index: usize, value: &'a str) -> Result<(), Error> {
		self.set_value(index, Value::String(value))
	}

	/// Store a raw payload at `index`. The bytes are not copied and must
	/// outlive the message.
	pub fn set_raw(&mut self, index: usize, value: &'a [u8]) -> Result<(), Error> {
		self.set_value(index, Value::Raw(value))
	}

	/// Decode a message from its wire form into this message, replacing its
	/// ID and all slots.
	///
	/// Arguments are assigned to slots in wire order. String and raw
	/// arguments borrow `buffer`. Fails with [`Error::BadMessage`] on
	/// malformed input and with [`Error::TooBig`] when the payload holds
	/// more arguments than there are slots.
	pub fn parse(&mut self, buffer: &'a [u8]) -> Result<(), Error> {
		if buffer.len() < HEADER_SIZE {
			return Err(Error::BadMessage);
		}

		let payload_len = read_u32_le(&buffer[4..8]) as usize;
		if buffer.len() < HEADER_SIZE + payload_len {
			return Err(Error::BadMessage);
		}

		self.clear();
		self.msgid = read_u32_le(&buffer[0..4]);

		let payload = &buffer[HEADER_SIZE..HEADER_SIZE + payload_len];
		let mut offset = 0;
		let mut index = 0;
		while offset < payload.len() {
			if index >= self.capacity() {
				return Err(Error::TooBig);
			}

			let (value, used) = decode_value(&payload[offset..])?;
			self.values.as_mut()[index] = value;
			index += 1;
			offset += used;
		}

		Ok(())
	}
}

macro_rules! impl_scalar_get {
	($($(#[$doc:meta])* fn $get:ident -> $ty:ty, $variant:ident;)*) => {
		impl<'a, V> Message<V>
		where
			V: AsRef<[Value<'a>]>,
		{
			$(
				$(#[$doc])*
				pub fn $get(&self, index: usize) -> Result<$ty, Error> {
					match self.get(index)? {
						Value::$variant(value) => Ok(value),
						_ => Err(Error::BadType),
					}
				}
			)*
		}
	};
}

macro_rules! impl_scalar_set {
	($($(#[$doc:meta])* fn $set:ident($ty:ty), $variant:ident;)*) => {
		impl<'a, V> Message<V>
		where
			V: AsRef<[Value<'a>]> + AsMut<[Value<'a>]>,
		{
			$(
				$(#[$doc])*
				pub fn $set(&mut self, index: usize, value: $ty) -> Result<(), Error> {
					self.set_value(index, Value::$variant(value))
				}
			)*
		}
	};
}

impl_scalar_get! {
	/// Get the u8 at `index`.
	fn get_u8 -> u8, U8;
	/// Get the i8 at `index`.
	fn get_i8 -> i8, I8;
	/// Get the u16 at `index`.
	fn get_u16 -> u16, U16;
	/// Get the i16 at `index`.
	fn get_i16 -> i16, I16;
	/// Get the u32 at `index`.
	fn get_u32 -> u32, U32;
	/// Get the i32 at `index`.
	fn get_i32 -> i32, I32;
	/// Get the u64 at `index`.
	fn get_u64 -> u64, U64;
	/// Get the i64 at `index`.
	fn get_i64 -> i64, I64;
	/// Get the f32 at `index`.
	fn get_f32 -> f32, F32;
	/// Get the f64 at `index`.
	fn get_f64 -> f64, F64;
}

impl_scalar_set! {
	/// Store a u8 at `index`.
	fn set_u8(u8), U8;
	/// Store an i8 at `index`.
	fn set_i8(i8), I8;
	/// Store a u16 at `index`.
	fn set_u16(u16), U16;
	/// Store an i16 at `index`.
	fn set_i16(i16), I16;
	/// Store a u32 at `index`.
	fn set_u32(u32), U32;
	/// Store an i32 at `index`.
	fn set_i32(i32), I32;
	/// Store a u64 at `index`.
	fn set_u64(u64), U64;
	/// Store an i64 at `index`.
	fn set_i64(i64), I64;
	/// Store an f32 at `index`.
	fn set_f32(f32), F32;
	/// Store an f64 at `index`.
	fn set_f64(f64), F64;
}
