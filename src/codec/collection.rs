//! List, set and map headers.

use crate::error::ProtocolError;
use crate::transport::Transport;
use crate::types::CompactType;

use super::varint::{read_varint, write_varint};
use super::wire::{pack_nibbles, split_nibbles};

/// Largest list/set size stored inline in the header byte.
pub const MAX_INLINE_SIZE: usize = 14;
/// Size nibble meaning "a varint size follows".
pub const SIZE_ESCAPE: u8 = 0x0f;

/// Append a list or set header.
pub fn write_collection_header(out: &mut Vec<u8>, elem: CompactType, size: usize) {
    if size <= MAX_INLINE_SIZE {
        out.push(pack_nibbles(size as u8, elem as u8));
    } else {
        out.push(pack_nibbles(SIZE_ESCAPE, elem as u8));
        write_varint(out, size as u64);
    }
}

/// Read a list or set header, returning the element type and raw size.
pub fn read_collection_header<R: Transport + ?Sized>(
    src: &mut R,
) -> Result<(CompactType, u64), ProtocolError> {
    let byte = src.read_byte()?;
    let (size_nibble, type_nibble) = split_nibbles(byte);
    let elem = CompactType::try_from(type_nibble)?;
    let size = if size_nibble == SIZE_ESCAPE {
        read_varint(src)?
    } else {
        u64::from(size_nibble)
    };
    Ok((elem, size))
}

/// Append a map header. The key/value type byte is omitted for an empty map.
pub fn write_map_header(out: &mut Vec<u8>, key: CompactType, value: CompactType, size: usize) {
    write_varint(out, size as u64);
    if size > 0 {
        out.push(pack_nibbles(key as u8, value as u8));
    }
}

/// Read a map header. Types are `None` when the map is empty.
pub fn read_map_header<R: Transport + ?Sized>(
    src: &mut R,
) -> Result<(Option<(CompactType, CompactType)>, u64), ProtocolError> {
    let size = read_varint(src)?;
    if size == 0 {
        return Ok((None, 0));
    }
    let (key, value) = split_nibbles(src.read_byte()?);
    let types = (CompactType::try_from(key)?, CompactType::try_from(value)?);
    Ok((Some(types), size))
}
