/// All errors reported by this crate.
///
/// The variants map one-to-one to the stable integer codes carried on
/// diagnostic channels (see [`Error::code`]), so peers written against the
/// same protocol can exchange them regardless of implementation language.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error {
	/// An argument is missing or out of its valid domain.
	InvalidParam,
	/// A target buffer is too small for the encoded output.
	NoMem,
	/// The named device does not exist.
	NoDevice,
	/// No value at the requested index.
	NotFound,
	/// The resource is already in use, e.g. opening an opened context.
	Busy,
	/// Access to the device was denied.
	Perm,
	/// The operation needs an open device.
	BadFd,
	/// The device does not implement the operation.
	NotSupported,
	/// The device has no data pending.
	WouldBlock,
	/// An input/output failure, including short writes.
	Io,
	/// The resource already exists.
	Exist,
	/// Decoded data exceeds the configured capacity.
	TooBig,
	/// The wait deadline expired with no data.
	TimedOut,
	/// A producer-side size limit was exceeded.
	Overflow,
	/// The wire data is corrupted or malformed.
	BadMessage,
	/// The value at the requested index has a different type.
	BadType,
	/// The peer closed the connection.
	Pipe,
	/// An unclassified failure.
	Other,
}

impl Error {
	/// The stable integer code of this error. Success is `0` and has no
	/// [`Error`] variant.
	pub fn code(self) -> i32 {
		match self {
			Error::InvalidParam => -1,
			Error::NoMem => -2,
			Error::NoDevice => -3,
			Error::NotFound => -4,
			Error::Busy => -5,
			Error::Perm => -6,
			Error::BadFd => -7,
			Error::NotSupported => -8,
			Error::WouldBlock => -9,
			Error::Io => -10,
			Error::Exist => -11,
			Error::TooBig => -12,
			Error::TimedOut => -13,
			Error::Overflow => -14,
			Error::BadMessage => -15,
			Error::BadType => -16,
			Error::Pipe => -17,
			Error::Other => -100,
		}
	}

	/// Map an integer code back to an error. Unknown codes become
	/// [`Error::Other`].
	pub fn from_code(code: i32) -> Option<Self> {
		match code {
			0 => None,
			-1 => Some(Error::InvalidParam),
			-2 => Some(Error::NoMem),
			-3 => Some(Error::NoDevice),
			-4 => Some(Error::NotFound),
			-5 => Some(Error::Busy),
			-6 => Some(Error::Perm),
			-7 => Some(Error::BadFd),
			-8 => Some(Error::NotSupported),
			-9 => Some(Error::WouldBlock),
			-10 => Some(Error::Io),
			-11 => Some(Error::Exist),
			-12 => Some(Error::TooBig),
			-13 => Some(Error::TimedOut),
			-14 => Some(Error::Overflow),
			-15 => Some(Error::BadMessage),
			-16 => Some(Error::BadType),
			-17 => Some(Error::Pipe),
			_ => Some(Error::Other),
		}
	}

	/// A short label for the error.
	pub fn as_str(self) -> &'static str {
		match self {
			Error::InvalidParam => "invalid parameter",
			Error::NoMem => "not enough memory",
			Error::NoDevice => "no such device",
			Error::NotFound => "not found",
			Error::Busy => "device or resource busy",
			Error::Perm => "operation not permitted",
			Error::BadFd => "bad file descriptor",
			Error::NotSupported => "operation not supported",
			Error::WouldBlock => "operation would block",
			Error::Io => "input/output error",
			Error::Exist => "already exists",
			Error::TooBig => "argument list too long",
			Error::TimedOut => "operation timed out",
			Error::Overflow => "value too large",
			Error::BadMessage => "bad message",
			Error::BadType => "bad argument type",
			Error::Pipe => "broken pipe",
			Error::Other => "unknown error",
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
	fn from(other: std::io::Error) -> Self {
		use std::io::ErrorKind;

		match other.kind() {
			ErrorKind::NotFound => Error::NoDevice,
			ErrorKind::PermissionDenied => Error::Perm,
			ErrorKind::AlreadyExists => Error::Exist,
			ErrorKind::WouldBlock => Error::WouldBlock,
			ErrorKind::TimedOut => Error::TimedOut,
			ErrorKind::BrokenPipe => Error::Pipe,
			ErrorKind::InvalidInput => Error::InvalidParam,
			_ => Error::Io,
		}
	}
}
