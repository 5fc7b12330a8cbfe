//! Typed message passing over byte-stuffed serial framing.
//!
//! Messages are records of typed arguments identified by a 32-bit message ID.
//! On the wire each message is wrapped in a delimited frame with byte-stuffing
//! and an XOR-8 checksum, so arbitrary payload bytes survive the serial link.
//!
//! The three layers can be used independently:
//! * [`message`]: encode and decode the typed-argument record.
//! * [`frame`]: wrap opaque payloads in checksummed frames and recover them
//!   from a byte stream, tolerating garbage between frames.
//! * [`Context`]: bind a [`SerialDevice`] to both codecs and drive the send
//!   and receive pipelines through event callbacks.
//!
//! All mutable state can live in caller-supplied storage, so the crate also
//! works without an allocator on the hot paths. See [`buffer::Storage`].

#[macro_use]
mod log;

pub mod buffer;
pub mod frame;
pub mod message;

mod context;
mod device;
mod endian;
mod error;

pub use context::{Context, EventHandler, RxMessage};
pub use device::serial2::SerialPortDevice;
pub use device::{Baudrate, Parity, SerialDevice};
pub use error::Error;
pub use message::{Message, Value, MESSAGE_MAX_VALUES};
