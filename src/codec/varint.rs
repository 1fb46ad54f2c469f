//! Unsigned LEB-128 style varints and the zig-zag mapping for signed values.

use crate::error::ProtocolError;
use crate::transport::Transport;

/// Longest encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Append `v` using 7 bits per byte, low groups first.
pub fn write_varint(out: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        out.push((v as u8) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

/// Number of bytes `write_varint` emits for `v`.
pub fn varint_len(v: u64) -> usize {
    let bits = 64 - v.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Read one varint from the transport.
///
/// An empty transport surfaces the transport's own end-of-stream error; a
/// stream that ends after the first byte, an encoding longer than
/// [`MAX_VARINT_LEN`], or one whose value does not fit in 64 bits is a
/// `MalformedVarint`.
pub fn read_varint<R: Transport + ?Sized>(src: &mut R) -> Result<u64, ProtocolError> {
    let mut result = 0u64;
    for i in 0..MAX_VARINT_LEN {
        let byte = match src.read_byte() {
            Ok(b) => b,
            Err(e) if i > 0 && e.is_eof() => {
                return Err(ProtocolError::MalformedVarint("stream ended mid-sequence"))
            }
            Err(e) => return Err(e.into()),
        };
        // The last byte has room for only the top bit of a u64.
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(ProtocolError::MalformedVarint("exceeds 64 bits"));
        }
        result |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(ProtocolError::MalformedVarint("exceeds 10 bytes"))
}

/// Read a varint that must fit in 32 bits.
pub fn read_varint_u32<R: Transport + ?Sized>(src: &mut R) -> Result<u32, ProtocolError> {
    let v = read_varint(src)?;
    u32::try_from(v).map_err(|_| ProtocolError::MalformedVarint("value exceeds 32 bits"))
}

/// Read a varint that must fit in 16 bits.
pub fn read_varint_u16<R: Transport + ?Sized>(src: &mut R) -> Result<u16, ProtocolError> {
    let v = read_varint(src)?;
    u16::try_from(v).map_err(|_| ProtocolError::MalformedVarint("value exceeds 16 bits"))
}

/// Zig-zag mapping between a signed integer and an unsigned one of the same
/// width: `0, -1, 1, -2, 2, ...` map to `0, 1, 2, 3, 4, ...`.
pub trait ZigZag: Sized {
    type Unsigned;

    fn zigzag_encode(self) -> Self::Unsigned;

    fn zigzag_decode(u: Self::Unsigned) -> Self;
}

macro_rules! impl_zigzag {
    ($($signed:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl ZigZag for $signed {
                type Unsigned = $unsigned;

                #[inline]
                fn zigzag_encode(self) -> $unsigned {
                    ((self << 1) ^ (self >> (<$signed>::BITS - 1))) as $unsigned
                }

                #[inline]
                fn zigzag_decode(u: $unsigned) -> $signed {
                    ((u >> 1) as $signed) ^ -((u & 1) as $signed)
                }
            }
        )*
    };
}

impl_zigzag!(i16 => u16, i32 => u32, i64 => u64);

/// Shorthand for [`ZigZag::zigzag_encode`].
#[inline]
pub fn zigzag_encode<T: ZigZag>(n: T) -> T::Unsigned {
    n.zigzag_encode()
}

/// Shorthand for [`ZigZag::zigzag_decode`].
#[inline]
pub fn zigzag_decode<T: ZigZag>(u: T::Unsigned) -> T {
    T::zigzag_decode(u)
}
