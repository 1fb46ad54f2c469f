use std::fmt;

use crate::error::ProtocolError;

/// Logical value type, as seen by struct serializers.
///
/// These are the shared type codes used across protocols; the compact
/// encoding maps them onto its own 4-bit [`CompactType`] nibbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TType {
    Stop = 0,
    Void = 1,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl TType {
    /// The compact nibble used on the wire for this type.
    ///
    /// `Stop` and `Void` carry no value and have no compact form.
    pub fn compact(self) -> Option<CompactType> {
        let ctype = match self {
            TType::Stop | TType::Void => return None,
            TType::Bool => CompactType::True,
            TType::Byte => CompactType::Byte,
            TType::Double => CompactType::Double,
            TType::I16 => CompactType::I16,
            TType::I32 => CompactType::I32,
            TType::I64 => CompactType::I64,
            TType::String => CompactType::Binary,
            TType::Struct => CompactType::Struct,
            TType::Map => CompactType::Map,
            TType::Set => CompactType::Set,
            TType::List => CompactType::List,
        };
        Some(ctype)
    }

    /// Like [`TType::compact`], but reports a missing mapping as an error.
    pub(crate) fn to_compact(self) -> Result<CompactType, ProtocolError> {
        self.compact()
            .ok_or_else(|| ProtocolError::InvalidData(format!("type {} has no wire form", self)))
    }
}

impl TryFrom<u8> for TType {
    type Error = ProtocolError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        let ttype = match v {
            0 => TType::Stop,
            1 => TType::Void,
            2 => TType::Bool,
            3 => TType::Byte,
            4 => TType::Double,
            6 => TType::I16,
            8 => TType::I32,
            10 => TType::I64,
            11 => TType::String,
            12 => TType::Struct,
            13 => TType::Map,
            14 => TType::Set,
            15 => TType::List,
            _ => return Err(ProtocolError::InvalidData(format!("unknown type code {}", v))),
        };
        Ok(ttype)
    }
}

impl fmt::Display for TType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TType::Stop => "stop",
            TType::Void => "void",
            TType::Bool => "bool",
            TType::Byte => "byte",
            TType::Double => "double",
            TType::I16 => "i16",
            TType::I32 => "i32",
            TType::I64 => "i64",
            TType::String => "string",
            TType::Struct => "struct",
            TType::Map => "map",
            TType::Set => "set",
            TType::List => "list",
        };
        f.write_str(name)
    }
}

/// 4-bit type tag of the compact wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompactType {
    Stop = 0,
    True = 1,
    False = 2,
    Byte = 3,
    I16 = 4,
    I32 = 5,
    I64 = 6,
    Double = 7,
    Binary = 8,
    List = 9,
    Set = 10,
    Map = 11,
    Struct = 12,
}

impl CompactType {
    /// The logical type carried by this tag. `True` and `False` both map to
    /// `Bool`; `Binary` maps to `String`.
    pub fn ttype(self) -> TType {
        match self {
            CompactType::Stop => TType::Stop,
            CompactType::True | CompactType::False => TType::Bool,
            CompactType::Byte => TType::Byte,
            CompactType::I16 => TType::I16,
            CompactType::I32 => TType::I32,
            CompactType::I64 => TType::I64,
            CompactType::Double => TType::Double,
            CompactType::Binary => TType::String,
            CompactType::List => TType::List,
            CompactType::Set => TType::Set,
            CompactType::Map => TType::Map,
            CompactType::Struct => TType::Struct,
        }
    }

    /// The field-header tag for a bool field holding `value`.
    pub fn from_bool(value: bool) -> Self {
        if value {
            CompactType::True
        } else {
            CompactType::False
        }
    }
}

impl TryFrom<u8> for CompactType {
    type Error = ProtocolError;

    fn try_from(nibble: u8) -> Result<Self, Self::Error> {
        let ctype = match nibble {
            0 => CompactType::Stop,
            1 => CompactType::True,
            2 => CompactType::False,
            3 => CompactType::Byte,
            4 => CompactType::I16,
            5 => CompactType::I32,
            6 => CompactType::I64,
            7 => CompactType::Double,
            8 => CompactType::Binary,
            9 => CompactType::List,
            10 => CompactType::Set,
            11 => CompactType::Map,
            12 => CompactType::Struct,
            _ => {
                return Err(ProtocolError::InvalidData(format!(
                    "unknown compact type nibble {:#x}",
                    nibble
                )))
            }
        };
        Ok(ctype)
    }
}

/// Kind of a top-level message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MessageType {
    Call = 1,
    Reply = 2,
    Exception = 3,
    Oneway = 4,
}

impl TryFrom<u8> for MessageType {
    type Error = ProtocolError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(MessageType::Call),
            2 => Ok(MessageType::Reply),
            3 => Ok(MessageType::Exception),
            4 => Ok(MessageType::Oneway),
            _ => Err(ProtocolError::InvalidData(format!("unknown message type {}", v))),
        }
    }
}

/// Header of a top-level message exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub name: String,
    pub message_type: MessageType,
    pub sequence_id: i32,
}

impl MessageHeader {
    pub fn new(name: impl Into<String>, message_type: MessageType, sequence_id: i32) -> Self {
        MessageHeader {
            name: name.into(),
            message_type,
            sequence_id,
        }
    }
}

/// A field header as returned by `read_field_begin`.
///
/// A header whose `field_type` is [`TType::Stop`] is the end-of-struct
/// sentinel; its `id` is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHeader {
    pub field_type: TType,
    pub id: i16,
}

impl FieldHeader {
    pub fn new(field_type: TType, id: i16) -> Self {
        FieldHeader { field_type, id }
    }

    /// The end-of-struct sentinel.
    pub fn stop() -> Self {
        FieldHeader {
            field_type: TType::Stop,
            id: 0,
        }
    }

    pub fn is_stop(&self) -> bool {
        self.field_type == TType::Stop
    }
}

/// Header of a list or set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionHeader {
    pub element_type: TType,
    pub size: usize,
}

/// Header of a map. An empty map read from the wire carries no type byte, so
/// both types come back as [`TType::Stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHeader {
    pub key_type: TType,
    pub value_type: TType,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttype_to_compact() {
        assert_eq!(TType::Bool.compact(), Some(CompactType::True));
        assert_eq!(TType::String.compact(), Some(CompactType::Binary));
        assert_eq!(TType::List.compact(), Some(CompactType::List));
        assert_eq!(TType::Stop.compact(), None);
        assert_eq!(TType::Void.compact(), None);
    }

    #[test]
    fn test_compact_to_ttype() {
        assert_eq!(CompactType::True.ttype(), TType::Bool);
        assert_eq!(CompactType::False.ttype(), TType::Bool);
        assert_eq!(CompactType::Binary.ttype(), TType::String);
        assert_eq!(CompactType::Map.ttype(), TType::Map);
    }

    #[test]
    fn test_compact_nibble_bounds() {
        assert_eq!(CompactType::try_from(12).unwrap(), CompactType::Struct);
        assert!(CompactType::try_from(13).is_err());
        assert!(CompactType::try_from(15).is_err());
    }

    #[test]
    fn test_ttype_codes() {
        for code in [0u8, 1, 2, 3, 4, 6, 8, 10, 11, 12, 13, 14, 15] {
            assert_eq!(TType::try_from(code).unwrap() as u8, code);
        }
        assert!(TType::try_from(5).is_err());
        assert!(TType::try_from(16).is_err());
    }

    #[test]
    fn test_message_type() {
        assert_eq!(MessageType::try_from(4).unwrap(), MessageType::Oneway);
        assert!(MessageType::try_from(0).is_err());
        assert!(MessageType::try_from(5).is_err());
    }

    #[test]
    fn test_stop_header() {
        assert!(FieldHeader::stop().is_stop());
        assert!(!FieldHeader::new(TType::I32, 0).is_stop());
    }
}
