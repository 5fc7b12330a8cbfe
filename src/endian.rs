//! Explicit little-endian reads and writes.
//!
//! The wire format is little-endian regardless of the host, and the helpers
//! below never rely on aligned access.

/// Write a u16 to a buffer in little endian format.
pub fn write_u16_le(buffer: &mut [u8], value: u16) {
	buffer[0] = (value & 0xFF) as u8;
	buffer[1] = (value >> 8 & 0xFF) as u8;
}

/// Read a u16 in little endian format from a buffer.
pub fn read_u16_le(buffer: &[u8]) -> u16 {
	let low = buffer[0] as u16;
	let high = buffer[1] as u16;
	low | high << 8
}

/// Write a u32 to a buffer in little endian format.
pub fn write_u32_le(buffer: &mut [u8], value: u32) {
	write_u16_le(&mut buffer[0..2], (value & 0xFFFF) as u16);
	write_u16_le(&mut buffer[2..4], (value >> 16 & 0xFFFF) as u16);
}

/// Read a u32 in little endian format from a buffer.
pub fn read_u32_le(buffer: &[u8]) -> u32 {
	let low = read_u16_le(&buffer[0..2]) as u32;
	let high = read_u16_le(&buffer[2..4]) as u32;
	low | high << 16
}

/// Write a u64 to a buffer in little endian format.
pub fn write_u64_le(buffer: &mut [u8], value: u64) {
	write_u32_le(&mut buffer[0..4], (value & 0xFFFF_FFFF) as u32);
	write_u32_le(&mut buffer[4..8], (value >> 32 & 0xFFFF_FFFF) as u32);
}

/// Read a u64 in little endian format from a buffer.
pub fn read_u64_le(buffer: &[u8]) -> u64 {
	let low = read_u32_le(&buffer[0..4]) as u64;
	let high = read_u32_le(&buffer[4..8]) as u64;
	low | high << 32
}

/// Write an IEEE-754 binary32 as its u32 bit pattern, little endian.
pub fn write_f32_le(buffer: &mut [u8], value: f32) {
	write_u32_le(buffer, value.to_bits());
}

/// Read an IEEE-754 binary32 from its little endian u32 bit pattern.
pub fn read_f32_le(buffer: &[u8]) -> f32 {
	f32::from_bits(read_u32_le(buffer))
}

/// Write an IEEE-754 binary64 as its u64 bit pattern, little endian.
pub fn write_f64_le(buffer: &mut [u8], value: f64) {
	write_u64_le(buffer, value.to_bits());
}

/// Read an IEEE-754 binary64 from its little endian u64 bit pattern.
pub fn read_f64_le(buffer: &[u8]) -> f64 {
	f64::from_bits(read_u64_le(buffer))
}
