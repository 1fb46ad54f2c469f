use crate::codec::collection::{write_collection_header, write_map_header};
use crate::codec::field::{write_field_header, write_field_stop};
use crate::codec::varint::{write_varint, zigzag_encode};
use crate::codec::wire::{version_and_type, write_f64_le, PROTOCOL_ID};
use crate::error::ProtocolError;
use crate::transport::Transport;
use crate::types::{CompactType, MessageHeader, TType};

use super::state::{PendingBool, State};
use super::CompactProtocol;

/// States in which a plain value may be written.
const VALUE_STATES: &[State] = &[State::ValueWrite, State::ContainerWrite];

/// Sizes are carried as non-negative 32-bit integers by every implementation
/// of the encoding.
const MAX_WIRE_SIZE: usize = i32::MAX as usize;

impl<T: Transport> CompactProtocol<T> {
    pub fn write_message_begin(&mut self, header: &MessageHeader) -> Result<(), ProtocolError> {
        self.session.expect("write_message_begin", &[State::Clear])?;
        self.buf.push(PROTOCOL_ID);
        self.buf.push(version_and_type(header.message_type as u8));
        write_varint(&mut self.buf, u64::from(header.sequence_id as u32));
        self.emit()?;
        self.write_binary_raw(header.name.as_bytes())?;
        self.session.transition(State::ValueWrite);
        Ok(())
    }

    pub fn write_message_end(&mut self) -> Result<(), ProtocolError> {
        self.session.expect("write_message_end", &[State::ValueWrite])?;
        self.session.transition(State::Clear);
        Ok(())
    }

    pub fn write_struct_begin(&mut self) -> Result<(), ProtocolError> {
        self.session.expect(
            "write_struct_begin",
            &[State::Clear, State::ContainerWrite, State::ValueWrite],
        )?;
        self.session.push_struct(State::FieldWrite);
        Ok(())
    }

    pub fn write_struct_end(&mut self) -> Result<(), ProtocolError> {
        self.session.expect("write_struct_end", &[State::FieldWrite])?;
        self.session.pop_struct("write_struct_end")
    }

    /// Begin field `id`. The header of a bool field is held back until
    /// [`write_bool`](Self::write_bool) supplies the value, which is folded
    /// into the header's type nibble.
    pub fn write_field_begin(&mut self, field_type: TType, id: i16) -> Result<(), ProtocolError> {
        self.session.expect("write_field_begin", &[State::FieldWrite])?;
        if field_type == TType::Bool {
            self.session.begin_bool(
                State::BoolWrite,
                PendingBool {
                    field_id: id,
                    value: None,
                },
            );
            return Ok(());
        }
        let ctype = field_type.to_compact()?;
        let last = write_field_header(&mut self.buf, ctype, id, self.session.last_field_id());
        self.emit()?;
        self.session.set_last_field_id(last);
        self.session.transition(State::ValueWrite);
        Ok(())
    }

    pub fn write_field_end(&mut self) -> Result<(), ProtocolError> {
        match self.session.state() {
            State::ValueWrite => {}
            // The deferred header must have gone out, or the field is lost.
            State::BoolWrite
                if self
                    .session
                    .pending_bool()
                    .is_some_and(|pending| pending.value.is_some()) => {}
            _ => return Err(self.session.violation("write_field_end")),
        }
        self.session.end_field(State::FieldWrite);
        Ok(())
    }

    pub fn write_field_stop(&mut self) -> Result<(), ProtocolError> {
        self.session.expect("write_field_stop", &[State::FieldWrite])?;
        write_field_stop(&mut self.buf);
        self.emit()
    }

    pub fn write_list_begin(&mut self, element_type: TType, size: usize) -> Result<(), ProtocolError> {
        self.write_collection_begin("write_list_begin", element_type, size)
    }

    pub fn write_list_end(&mut self) -> Result<(), ProtocolError> {
        self.write_collection_end("write_list_end")
    }

    pub fn write_set_begin(&mut self, element_type: TType, size: usize) -> Result<(), ProtocolError> {
        self.write_collection_begin("write_set_begin", element_type, size)
    }

    pub fn write_set_end(&mut self) -> Result<(), ProtocolError> {
        self.write_collection_end("write_set_end")
    }

    pub fn write_map_begin(
        &mut self,
        key_type: TType,
        value_type: TType,
        size: usize,
    ) -> Result<(), ProtocolError> {
        self.session.expect("write_map_begin", VALUE_STATES)?;
        check_write_size("map", size)?;
        // An empty map header has no type byte, so its types are not checked.
        let (key, value) = if size > 0 {
            (key_type.to_compact()?, value_type.to_compact()?)
        } else {
            (CompactType::Stop, CompactType::Stop)
        };
        write_map_header(&mut self.buf, key, value, size);
        self.emit()?;
        self.session.push_container(State::ContainerWrite);
        Ok(())
    }

    pub fn write_map_end(&mut self) -> Result<(), ProtocolError> {
        self.write_collection_end("write_map_end")
    }

    /// Write a bool. As a struct field value it completes the deferred field
    /// header; inside a container it is a single 0/1 byte.
    pub fn write_bool(&mut self, value: bool) -> Result<(), ProtocolError> {
        match self.session.state() {
            State::BoolWrite => {
                let id = self.session.fill_pending_bool("write_bool", value)?;
                let last = write_field_header(
                    &mut self.buf,
                    CompactType::from_bool(value),
                    id,
                    self.session.last_field_id(),
                );
                self.emit()?;
                self.session.set_last_field_id(last);
                Ok(())
            }
            State::ContainerWrite => {
                self.buf.push(u8::from(value));
                self.emit()
            }
            _ => Err(self.session.violation("write_bool")),
        }
    }

    pub fn write_byte(&mut self, value: i8) -> Result<(), ProtocolError> {
        self.session.expect("write_byte", VALUE_STATES)?;
        self.buf.push(value as u8);
        self.emit()
    }

    pub fn write_i16(&mut self, value: i16) -> Result<(), ProtocolError> {
        self.session.expect("write_i16", VALUE_STATES)?;
        write_varint(&mut self.buf, u64::from(zigzag_encode(value)));
        self.emit()
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), ProtocolError> {
        self.session.expect("write_i32", VALUE_STATES)?;
        write_varint(&mut self.buf, u64::from(zigzag_encode(value)));
        self.emit()
    }

    pub fn write_i64(&mut self, value: i64) -> Result<(), ProtocolError> {
        self.session.expect("write_i64", VALUE_STATES)?;
        write_varint(&mut self.buf, zigzag_encode(value));
        self.emit()
    }

    pub fn write_double(&mut self, value: f64) -> Result<(), ProtocolError> {
        self.session.expect("write_double", VALUE_STATES)?;
        write_f64_le(&mut self.buf, value);
        self.emit()
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), ProtocolError> {
        self.session.expect("write_string", VALUE_STATES)?;
        self.write_binary_raw(value.as_bytes())
    }

    pub fn write_binary(&mut self, value: &[u8]) -> Result<(), ProtocolError> {
        self.session.expect("write_binary", VALUE_STATES)?;
        self.write_binary_raw(value)
    }

    /// Length-prefixed bytes, without a state check. The message name goes
    /// through here before the session enters a value state.
    fn write_binary_raw(&mut self, value: &[u8]) -> Result<(), ProtocolError> {
        check_write_size("string", value.len())?;
        write_varint(&mut self.buf, value.len() as u64);
        self.emit()?;
        self.transport.write_all(value)?;
        Ok(())
    }

    fn write_collection_begin(
        &mut self,
        operation: &'static str,
        element_type: TType,
        size: usize,
    ) -> Result<(), ProtocolError> {
        self.session.expect(operation, VALUE_STATES)?;
        check_write_size("collection", size)?;
        let elem = element_type.to_compact()?;
        write_collection_header(&mut self.buf, elem, size);
        self.emit()?;
        self.session.push_container(State::ContainerWrite);
        Ok(())
    }

    fn write_collection_end(&mut self, operation: &'static str) -> Result<(), ProtocolError> {
        self.session.expect(operation, &[State::ContainerWrite])?;
        self.session.pop_container(operation)
    }
}

fn check_write_size(what: &'static str, size: usize) -> Result<(), ProtocolError> {
    if size > MAX_WIRE_SIZE {
        return Err(ProtocolError::InvalidSize {
            what,
            size: size as u64,
            limit: MAX_WIRE_SIZE as u64,
        });
    }
    Ok(())
}
