//! Wire constants and fixed-width primitives of the compact encoding.

/// First byte of every message header.
pub const PROTOCOL_ID: u8 = 0x82;
/// Protocol version carried in the low five bits of the second header byte.
pub const VERSION: u8 = 1;
pub const VERSION_MASK: u8 = 0x1f;
pub const TYPE_MASK: u8 = 0xe0;
pub const TYPE_SHIFT_AMOUNT: u8 = 5;

/// Size of an encoded double.
pub const SIZEOF_DOUBLE: usize = 8;

/// Combine two 4-bit values into one byte, `high` in the upper nibble.
#[inline]
pub fn pack_nibbles(high: u8, low: u8) -> u8 {
    (high << 4) | (low & 0x0f)
}

/// Split a byte into `(high, low)` nibbles.
#[inline]
pub fn split_nibbles(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0x0f)
}

/// Append a double as 8 little-endian bytes.
#[inline]
pub fn write_f64_le(out: &mut Vec<u8>, val: f64) {
    out.extend_from_slice(&val.to_bits().to_le_bytes());
}

/// Read a double from 8 little-endian bytes.
#[inline]
pub fn read_f64_le(buf: [u8; SIZEOF_DOUBLE]) -> f64 {
    f64::from_bits(u64::from_le_bytes(buf))
}

/// Second byte of a message header.
#[inline]
pub fn version_and_type(message_type: u8) -> u8 {
    (VERSION & VERSION_MASK) | ((message_type << TYPE_SHIFT_AMOUNT) & TYPE_MASK)
}
