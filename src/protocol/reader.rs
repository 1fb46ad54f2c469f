use crate::codec::collection::{read_collection_header, read_map_header};
use crate::codec::field::{read_field_header, DecodedField};
use crate::codec::varint::{read_varint, read_varint_u16, read_varint_u32, zigzag_decode};
use crate::codec::wire::{read_f64_le, PROTOCOL_ID, SIZEOF_DOUBLE, TYPE_MASK, TYPE_SHIFT_AMOUNT, VERSION, VERSION_MASK};
use crate::error::ProtocolError;
use crate::transport::Transport;
use crate::types::{CollectionHeader, CompactType, FieldHeader, MapHeader, MessageHeader, MessageType, TType};

use super::state::{PendingBool, State};
use super::CompactProtocol;

/// States in which a plain value may be read.
const VALUE_STATES: &[State] = &[State::ValueRead, State::ContainerRead];

/// Largest single read issued for a string or binary payload.
const READ_CHUNK: usize = 64 * 1024;

const MAX_WIRE_SIZE: u64 = i32::MAX as u64;

impl<T: Transport> CompactProtocol<T> {
    /// Read and validate a message header.
    pub fn read_message_begin(&mut self) -> Result<MessageHeader, ProtocolError> {
        self.session.expect("read_message_begin", &[State::Clear])?;

        let protocol_id = self.transport.read_byte()?;
        if protocol_id != PROTOCOL_ID {
            tracing::debug!(protocol_id, "unexpected protocol id");
            return Err(ProtocolError::BadVersion(format!(
                "expected protocol id {:#x}, got {:#x}",
                PROTOCOL_ID, protocol_id
            )));
        }

        let version_and_type = self.transport.read_byte()?;
        let version = version_and_type & VERSION_MASK;
        if version != VERSION {
            tracing::debug!(version, "unsupported protocol version");
            return Err(ProtocolError::BadVersion(format!(
                "expected version {}, got {}",
                VERSION, version
            )));
        }
        let message_type =
            MessageType::try_from((version_and_type & TYPE_MASK) >> TYPE_SHIFT_AMOUNT)?;
        let sequence_id = read_varint_u32(&mut self.transport)? as i32;
        let name = String::from_utf8(self.read_binary_raw()?)?;

        self.session.transition(State::ValueRead);
        Ok(MessageHeader {
            name,
            message_type,
            sequence_id,
        })
    }

    pub fn read_message_end(&mut self) -> Result<(), ProtocolError> {
        self.session.expect("read_message_end", &[State::ValueRead])?;
        self.session.transition(State::Clear);
        Ok(())
    }

    pub fn read_struct_begin(&mut self) -> Result<(), ProtocolError> {
        self.session.expect(
            "read_struct_begin",
            &[State::Clear, State::ContainerRead, State::ValueRead],
        )?;
        self.check_depth()?;
        self.session.push_struct(State::FieldRead);
        Ok(())
    }

    pub fn read_struct_end(&mut self) -> Result<(), ProtocolError> {
        self.session.expect("read_struct_end", &[State::FieldRead])?;
        self.session.pop_struct("read_struct_end")
    }

    /// Read the next field header. At the end of the struct this returns the
    /// STOP sentinel ([`FieldHeader::is_stop`]) and leaves the state alone, so
    /// the caller goes straight to [`read_struct_end`](Self::read_struct_end).
    pub fn read_field_begin(&mut self) -> Result<FieldHeader, ProtocolError> {
        self.session.expect("read_field_begin", &[State::FieldRead])?;
        match read_field_header(&mut self.transport, self.session.last_field_id())? {
            DecodedField::Stop => Ok(FieldHeader::stop()),
            DecodedField::Field { ctype, id } => {
                self.session.set_last_field_id(id);
                match ctype {
                    CompactType::True | CompactType::False => self.session.begin_bool(
                        State::BoolRead,
                        PendingBool {
                            field_id: id,
                            value: Some(ctype == CompactType::True),
                        },
                    ),
                    _ => self.session.transition(State::ValueRead),
                }
                Ok(FieldHeader::new(ctype.ttype(), id))
            }
        }
    }

    pub fn read_field_end(&mut self) -> Result<(), ProtocolError> {
        self.session
            .expect("read_field_end", &[State::ValueRead, State::BoolRead])?;
        self.session.end_field(State::FieldRead);
        Ok(())
    }

    pub fn read_list_begin(&mut self) -> Result<CollectionHeader, ProtocolError> {
        self.read_collection_begin("read_list_begin")
    }

    pub fn read_list_end(&mut self) -> Result<(), ProtocolError> {
        self.read_collection_end("read_list_end")
    }

    pub fn read_set_begin(&mut self) -> Result<CollectionHeader, ProtocolError> {
        self.read_collection_begin("read_set_begin")
    }

    pub fn read_set_end(&mut self) -> Result<(), ProtocolError> {
        self.read_collection_end("read_set_end")
    }

    pub fn read_map_begin(&mut self) -> Result<MapHeader, ProtocolError> {
        self.session.expect("read_map_begin", VALUE_STATES)?;
        self.check_depth()?;
        let (types, size) = read_map_header(&mut self.transport)?;
        let size = self.check_container_size("map", size)?;
        let (key_type, value_type) = match types {
            Some((key, value)) => (key.ttype(), value.ttype()),
            None => (TType::Stop, TType::Stop),
        };
        self.session.push_container(State::ContainerRead);
        Ok(MapHeader {
            key_type,
            value_type,
            size,
        })
    }

    pub fn read_map_end(&mut self) -> Result<(), ProtocolError> {
        self.read_collection_end("read_map_end")
    }

    /// Read a bool: the value carried by the field header in a struct, or a
    /// standalone byte inside a container.
    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        match self.session.state() {
            State::BoolRead => self.session.take_pending_bool("read_bool"),
            State::ContainerRead => match self.transport.read_byte()? {
                0 => Ok(false),
                1 => Ok(true),
                // Some writers emit the compact FALSE tag here.
                2 => Ok(false),
                other => Err(ProtocolError::InvalidData(format!(
                    "invalid bool byte {:#x}",
                    other
                ))),
            },
            _ => Err(self.session.violation("read_bool")),
        }
    }

    pub fn read_byte(&mut self) -> Result<i8, ProtocolError> {
        self.session.expect("read_byte", VALUE_STATES)?;
        Ok(self.transport.read_byte()? as i8)
    }

    pub fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        self.session.expect("read_i16", VALUE_STATES)?;
        Ok(zigzag_decode(read_varint_u16(&mut self.transport)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        self.session.expect("read_i32", VALUE_STATES)?;
        Ok(zigzag_decode(read_varint_u32(&mut self.transport)?))
    }

    pub fn read_i64(&mut self) -> Result<i64, ProtocolError> {
        self.session.expect("read_i64", VALUE_STATES)?;
        Ok(zigzag_decode(read_varint(&mut self.transport)?))
    }

    pub fn read_double(&mut self) -> Result<f64, ProtocolError> {
        self.session.expect("read_double", VALUE_STATES)?;
        let mut buf = [0u8; SIZEOF_DOUBLE];
        self.transport.read_exact(&mut buf)?;
        Ok(read_f64_le(buf))
    }

    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        self.session.expect("read_string", VALUE_STATES)?;
        Ok(String::from_utf8(self.read_binary_raw()?)?)
    }

    pub fn read_binary(&mut self) -> Result<Vec<u8>, ProtocolError> {
        self.session.expect("read_binary", VALUE_STATES)?;
        self.read_binary_raw()
    }

    /// Length-prefixed bytes, without a state check.
    fn read_binary_raw(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let len = read_varint(&mut self.transport)?;
        let limit = self
            .config
            .string_size_limit
            .map_or(MAX_WIRE_SIZE, |l| (l as u64).min(MAX_WIRE_SIZE));
        let len = check_size("string", len, limit)?;
        // Grow with the bytes that actually arrive rather than trusting the
        // declared length up front.
        let mut buf = Vec::with_capacity(len.min(READ_CHUNK));
        while buf.len() < len {
            let start = buf.len();
            let end = start + (len - start).min(READ_CHUNK);
            buf.resize(end, 0);
            self.transport.read_exact(&mut buf[start..end])?;
        }
        Ok(buf)
    }

    fn read_collection_begin(
        &mut self,
        operation: &'static str,
    ) -> Result<CollectionHeader, ProtocolError> {
        self.session.expect(operation, VALUE_STATES)?;
        self.check_depth()?;
        let (elem, size) = read_collection_header(&mut self.transport)?;
        let size = self.check_container_size("collection", size)?;
        self.session.push_container(State::ContainerRead);
        Ok(CollectionHeader {
            element_type: elem.ttype(),
            size,
        })
    }

    fn read_collection_end(&mut self, operation: &'static str) -> Result<(), ProtocolError> {
        self.session.expect(operation, &[State::ContainerRead])?;
        self.session.pop_container(operation)
    }

    fn check_container_size(&self, what: &'static str, size: u64) -> Result<usize, ProtocolError> {
        let limit = self
            .config
            .container_size_limit
            .map_or(MAX_WIRE_SIZE, |l| (l as u64).min(MAX_WIRE_SIZE));
        check_size(what, size, limit)
    }

    fn check_depth(&self) -> Result<(), ProtocolError> {
        if self.session.depth() >= self.config.max_depth {
            tracing::debug!(depth = self.session.depth(), "nesting limit reached");
            return Err(ProtocolError::InvalidData(format!(
                "nesting deeper than {}",
                self.config.max_depth
            )));
        }
        Ok(())
    }
}

fn check_size(what: &'static str, size: u64, limit: u64) -> Result<usize, ProtocolError> {
    if size > limit {
        tracing::debug!(what, size, limit, "declared size rejected");
        return Err(ProtocolError::InvalidSize { what, size, limit });
    }
    usize::try_from(size).map_err(|_| ProtocolError::InvalidSize { what, size, limit })
}
