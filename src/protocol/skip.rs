use crate::error::ProtocolError;
use crate::transport::Transport;
use crate::types::TType;

use super::CompactProtocol;

impl<T: Transport> CompactProtocol<T> {
    /// Consume one value of type `ttype` without materializing it.
    ///
    /// Goes through the regular read calls, so it consumes exactly the bytes a
    /// real read would and keeps the grammar state in step. Readers use this
    /// to drop fields they do not know about.
    pub fn skip(&mut self, ttype: TType) -> Result<(), ProtocolError> {
        match ttype {
            TType::Bool => {
                self.read_bool()?;
            }
            TType::Byte => {
                self.read_byte()?;
            }
            TType::I16 => {
                self.read_i16()?;
            }
            TType::I32 => {
                self.read_i32()?;
            }
            TType::I64 => {
                self.read_i64()?;
            }
            TType::Double => {
                self.read_double()?;
            }
            TType::String => {
                self.read_binary()?;
            }
            TType::Struct => {
                self.read_struct_begin()?;
                loop {
                    let field = self.read_field_begin()?;
                    if field.is_stop() {
                        break;
                    }
                    tracing::trace!(id = field.id, field_type = %field.field_type, "skipping field");
                    self.skip(field.field_type)?;
                    self.read_field_end()?;
                }
                self.read_struct_end()?;
            }
            TType::Map => {
                let map = self.read_map_begin()?;
                for _ in 0..map.size {
                    self.skip(map.key_type)?;
                    self.skip(map.value_type)?;
                }
                self.read_map_end()?;
            }
            TType::Set => {
                let set = self.read_set_begin()?;
                for _ in 0..set.size {
                    self.skip(set.element_type)?;
                }
                self.read_set_end()?;
            }
            TType::List => {
                let list = self.read_list_begin()?;
                for _ in 0..list.size {
                    self.skip(list.element_type)?;
                }
                self.read_list_end()?;
            }
            TType::Stop | TType::Void => {
                return Err(ProtocolError::InvalidData(format!("cannot skip {}", ttype)));
            }
        }
        Ok(())
    }
}
