//! Field headers: a type nibble plus the field id, delta-compressed against
//! the previous field of the same struct when the gap is small.

use crate::error::ProtocolError;
use crate::transport::Transport;
use crate::types::CompactType;

use super::varint::{read_varint_u16, write_varint, zigzag_decode, zigzag_encode};
use super::wire::{pack_nibbles, split_nibbles};

/// Largest id delta that fits in the header's high nibble.
pub const MAX_FIELD_DELTA: i32 = 15;

/// A decoded field header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedField {
    Stop,
    Field { ctype: CompactType, id: i16 },
}

/// Append the header for field `field_id` and return the new last field id.
pub fn write_field_header(
    out: &mut Vec<u8>,
    ctype: CompactType,
    field_id: i16,
    last_field_id: i16,
) -> i16 {
    let delta = i32::from(field_id) - i32::from(last_field_id);
    if (1..=MAX_FIELD_DELTA).contains(&delta) {
        out.push(pack_nibbles(delta as u8, ctype as u8));
    } else {
        out.push(ctype as u8);
        write_varint(out, u64::from(zigzag_encode(field_id)));
    }
    field_id
}

/// Append the end-of-struct marker.
pub fn write_field_stop(out: &mut Vec<u8>) {
    out.push(CompactType::Stop as u8);
}

/// Read one field header. A STOP byte is recognized by its type nibble alone,
/// so field id 0 stays usable.
pub fn read_field_header<R: Transport + ?Sized>(
    src: &mut R,
    last_field_id: i16,
) -> Result<DecodedField, ProtocolError> {
    let byte = src.read_byte()?;
    let (delta, nibble) = split_nibbles(byte);
    if nibble == CompactType::Stop as u8 {
        return Ok(DecodedField::Stop);
    }
    let ctype = CompactType::try_from(nibble)?;

    let id = if delta == 0 {
        zigzag_decode::<i16>(read_varint_u16(src)?)
    } else {
        last_field_id.checked_add(i16::from(delta)).ok_or_else(|| {
            ProtocolError::InvalidData(format!(
                "field id overflow: {} + {}",
                last_field_id, delta
            ))
        })?
    };

    Ok(DecodedField::Field { ctype, id })
}
