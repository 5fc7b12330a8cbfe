//! Delimited frames with byte-stuffing and an XOR-8 checksum.
//!
//! A frame is `START | stuffed(payload) | stuffed(checksum) | END`, where any
//! occurrence of [`START`], [`END`] or [`ESC`] inside the payload or the
//! checksum is replaced by `ESC, byte`. The checksum is the XOR of the
//! unstuffed payload bytes with a zero seed. The triple keeps the code
//! footprint small on embedded targets while still catching single-bit errors
//! on short serial runs.

use crate::buffer::Storage;
use crate::Error;

/// Marks the beginning of a frame.
pub const START: u8 = 0x10;
/// Marks the end of a frame.
pub const END: u8 = 0xFF;
/// Escapes a magic byte inside the payload or checksum.
pub const ESC: u8 = 0x1B;

/// Initial and incremental size of a growable decoder buffer.
const GROW_STEP: usize = 1024;

/// Default ceiling for a growable decoder buffer.
const DEFAULT_MAX_CAPACITY: usize = 1024 * 1024;

/// Smallest accepted decoder capacity ceiling.
const MIN_MAX_CAPACITY: usize = 16;

fn is_magic_byte(byte: u8) -> bool {
	byte == START || byte == END || byte == ESC
}

/// The XOR-8 checksum of a payload, seeded at zero.
pub fn checksum(payload: &[u8]) -> u8 {
	payload.iter().fold(0, |checksum, &byte| checksum ^ byte)
}

/// The exact size of the frame produced by [`encode_into`] for `payload`.
///
/// Delimiters and the checksum add three bytes, each magic byte in the
/// payload adds one, and a magic checksum adds one more.
pub fn encoded_size(payload: &[u8]) -> usize {
	let stuffing = payload.iter().filter(|&&byte| is_magic_byte(byte)).count();
	payload.len() + 3 + stuffing + is_magic_byte(checksum(payload)) as usize
}

fn put_stuffed(out: &mut [u8], offset: usize, byte: u8) -> usize {
	let mut offset = offset;
	if is_magic_byte(byte) {
		out[offset] = ESC;
		offset += 1;
	}
	out[offset] = byte;
	offset + 1
}

/// Encode `payload` as a frame into `out`.
///
/// Returns the number of bytes written, or [`Error::Overflow`] when `out` is
/// smaller than [`encoded_size`] of the payload.
pub fn encode_into(payload: &[u8], out: &mut [u8]) -> Result<usize, Error> {
	if out.len() < encoded_size(payload) {
		return Err(Error::Overflow);
	}

	out[0] = START;
	let mut offset = 1;
	for &byte in payload {
		offset = put_stuffed(out, offset, byte);
	}
	offset = put_stuffed(out, offset, checksum(payload));
	out[offset] = END;
	Ok(offset + 1)
}

/// Encode `payload` as a frame in a new buffer.
pub fn encode(payload: &[u8]) -> Vec<u8> {
	let mut out = vec![0; encoded_size(payload)];
	// The buffer is sized exactly, encoding cannot fail.
	encode_into(payload, &mut out).unwrap();
	out
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum State {
	WaitHeader,
	InFrame,
	InFrameEsc,
}

/// Byte-at-a-time frame decoder.
///
/// Feed every received byte to [`Decoder::process_byte`]. Bytes outside a
/// frame are discarded silently, so any amount of garbage between frames is
/// tolerated. A stray [`START`] inside a frame resyncs the decoder on a new
/// frame and reports the aborted one as [`Error::BadMessage`].
///
/// The buffer is generic over [`Storage`]: `Vec<u8>` grows in steps of 1024
/// bytes up to a configurable ceiling, fixed storage rejects frames beyond
/// its size with [`Error::TooBig`].
#[derive(Debug)]
pub struct Decoder<S = Vec<u8>> {
	state: State,
	buf: S,
	offset: usize,
	max_capacity: usize,
}

impl Decoder<Vec<u8>> {
	/// Create a decoder with a growable buffer.
	pub fn new() -> Self {
		Self::with_initial_capacity(GROW_STEP)
	}

	/// Create a decoder with a growable buffer of a chosen initial size.
	pub fn with_initial_capacity(capacity: usize) -> Self {
		let capacity = if capacity == 0 { GROW_STEP } else { capacity };
		Decoder {
			state: State::WaitHeader,
			buf: vec![0; capacity],
			offset: 0,
			max_capacity: DEFAULT_MAX_CAPACITY,
		}
	}
}

impl Default for Decoder<Vec<u8>> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S: Storage> Decoder<S> {
	/// Create a decoder on caller-supplied storage.
	///
	/// With fixed storage the decoder never allocates and frames larger than
	/// the storage fail with [`Error::TooBig`].
	pub fn with_storage(buf: S) -> Self {
		let max_capacity = if buf.is_fixed() {
			buf.bytes().len()
		} else {
			DEFAULT_MAX_CAPACITY
		};
		Decoder {
			state: State::WaitHeader,
			buf,
			offset: 0,
			max_capacity,
		}
	}

	/// Set the ceiling for buffer growth.
	///
	/// The buffer is never shrunk; a ceiling below the current capacity only
	/// prevents further growth. Fails with [`Error::TooBig`] on fixed storage
	/// and [`Error::InvalidParam`] for ceilings of 16 bytes or less.
	pub fn set_maximum_capacity(&mut self, max: usize) -> Result<(), Error> {
		if self.buf.is_fixed() {
			return Err(Error::TooBig);
		}
		if max <= MIN_MAX_CAPACITY {
			return Err(Error::InvalidParam);
		}
		self.max_capacity = max;
		Ok(())
	}

	/// The current ceiling for buffer growth.
	pub fn maximum_capacity(&self) -> usize {
		self.max_capacity
	}

	fn put_byte(&mut self, byte: u8) -> Result<(), Error> {
		if self.offset >= self.buf.bytes().len() {
			let grown = (self.buf.bytes().len() + GROW_STEP).min(self.max_capacity);
			if grown <= self.offset || !self.buf.ensure_capacity(grown) {
				return Err(Error::TooBig);
			}
		}

		self.buf.bytes_mut()[self.offset] = byte;
		self.offset += 1;
		Ok(())
	}

	fn process_byte_in_frame(&mut self, byte: u8) -> Result<Option<usize>, Error> {
		match byte {
			START => {
				// In a frame without an end byte, resync on the current byte.
				self.offset = 0;
				Err(Error::BadMessage)
			}
			ESC => {
				self.state = State::InFrameEsc;
				Ok(None)
			}
			END => {
				self.state = State::WaitHeader;

				// The frame must at least hold its checksum.
				if self.offset < 1 {
					return Err(Error::BadMessage);
				}

				let framesize = self.offset - 1;
				let frame = &self.buf.bytes()[..framesize];
				if checksum(frame) != self.buf.bytes()[framesize] {
					return Err(Error::BadMessage);
				}
				Ok(Some(framesize))
			}
			byte => self.put_byte(byte).map(|_| None),
		}
	}

	/// Feed one received byte to the decoder.
	///
	/// Returns the payload of a completed frame, without its checksum, or
	/// `None` while a frame is still in progress. The returned slice borrows
	/// the decoder buffer and is only valid until the next call.
	///
	/// Corrupted frames are reported as [`Error::BadMessage`] and frames
	/// beyond the buffer capacity as [`Error::TooBig`]; both leave the
	/// decoder ready for the next frame.
	pub fn process_byte(&mut self, byte: u8) -> Result<Option<&[u8]>, Error> {
		let result = match self.state {
			State::WaitHeader => {
				if byte == START {
					self.state = State::InFrame;
					self.offset = 0;
				}
				Ok(None)
			}
			State::InFrame => self.process_byte_in_frame(byte),
			State::InFrameEsc => self.put_byte(byte).map(|_| {
				self.state = State::InFrame;
				None
			}),
		};

		match result {
			Ok(Some(framesize)) => Ok(Some(&self.buf.bytes()[..framesize])),
			Ok(None) => Ok(None),
			Err(error) => {
				// Reset on error, unless the byte is a start byte: then a new
				// frame is already in progress.
				if byte != START {
					self.state = State::WaitHeader;
				}
				Err(error)
			}
		}
	}
}
