//! Typed serialization on top of the protocol calls.
//!
//! These traits are implemented by the `#[derive(CompactEncode)]` and
//! `#[derive(CompactDecode)]` macros from the `tcompact-derive` crate, and by
//! hand here for the scalar and collection types a struct field can hold.
//!
//! # Example
//!
//! ```rust
//! use tcompact::{from_slice, to_vec, CompactDecode, CompactEncode};
//!
//! #[derive(Debug, PartialEq, CompactEncode, CompactDecode)]
//! struct Person {
//!     #[compact(id = 1)]
//!     name: String,
//!     #[compact(id = 2)]
//!     age: i32,
//!     #[compact(id = 3)]
//!     email: Option<String>,
//! }
//!
//! let person = Person { name: "Alice".into(), age: 30, email: None };
//! let bytes = to_vec(&person).unwrap();
//! let decoded: Person = from_slice(&bytes).unwrap();
//! assert_eq!(person, decoded);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use crate::config::ProtocolConfig;
use crate::error::ProtocolError;
use crate::protocol::CompactProtocol;
use crate::transport::{MemoryTransport, Transport};
use crate::types::TType;

/// Types that can be written through a [`CompactProtocol`].
pub trait CompactEncode {
    /// Logical wire type, used for field and element headers.
    const TTYPE: TType;

    fn encode<T: Transport>(&self, protocol: &mut CompactProtocol<T>) -> Result<(), ProtocolError>;
}

/// Types that can be read from a [`CompactProtocol`].
pub trait CompactDecode: Sized {
    /// Logical wire type this decoder expects.
    const TTYPE: TType;

    fn decode<T: Transport>(protocol: &mut CompactProtocol<T>) -> Result<Self, ProtocolError>;
}

/// Encode a struct into a fresh buffer.
pub fn to_vec<V: CompactEncode + ?Sized>(value: &V) -> Result<Vec<u8>, ProtocolError> {
    let mut protocol = CompactProtocol::new(MemoryTransport::new());
    value.encode(&mut protocol)?;
    Ok(protocol.into_inner().into_inner())
}

/// Decode a struct from `bytes` with the default config.
pub fn from_slice<V: CompactDecode>(bytes: &[u8]) -> Result<V, ProtocolError> {
    from_slice_with_config(bytes, ProtocolConfig::default())
}

/// Decode a struct from `bytes`. Bytes left over after the struct are an error.
pub fn from_slice_with_config<V: CompactDecode>(
    bytes: &[u8],
    config: ProtocolConfig,
) -> Result<V, ProtocolError> {
    let mut protocol = CompactProtocol::with_config(MemoryTransport::from(bytes), config);
    let value = V::decode(&mut protocol)?;
    let trailing = protocol.transport().remaining().len();
    if trailing > 0 {
        return Err(ProtocolError::InvalidData(format!(
            "{} trailing bytes after value",
            trailing
        )));
    }
    Ok(value)
}

/// Upper bound on capacity reserved from a declared size before any element
/// has been read.
pub(crate) const MAX_PREALLOC: usize = 4096;

fn check_element_type(what: &str, expected: TType, actual: TType) -> Result<(), ProtocolError> {
    if expected != actual {
        return Err(ProtocolError::InvalidData(format!(
            "{} of {} where {} was expected",
            what, actual, expected
        )));
    }
    Ok(())
}

macro_rules! impl_scalar {
    ($ty:ty, $ttype:expr, $write:ident, $read:ident) => {
        impl CompactEncode for $ty {
            const TTYPE: TType = $ttype;

            fn encode<T: Transport>(
                &self,
                protocol: &mut CompactProtocol<T>,
            ) -> Result<(), ProtocolError> {
                protocol.$write(*self)
            }
        }

        impl CompactDecode for $ty {
            const TTYPE: TType = $ttype;

            fn decode<T: Transport>(protocol: &mut CompactProtocol<T>) -> Result<Self, ProtocolError> {
                protocol.$read()
            }
        }
    };
}

impl_scalar!(bool, TType::Bool, write_bool, read_bool);
impl_scalar!(i8, TType::Byte, write_byte, read_byte);
impl_scalar!(i16, TType::I16, write_i16, read_i16);
impl_scalar!(i32, TType::I32, write_i32, read_i32);
impl_scalar!(i64, TType::I64, write_i64, read_i64);
impl_scalar!(f64, TType::Double, write_double, read_double);

impl CompactEncode for String {
    const TTYPE: TType = TType::String;

    fn encode<T: Transport>(&self, protocol: &mut CompactProtocol<T>) -> Result<(), ProtocolError> {
        protocol.write_string(self)
    }
}

impl CompactEncode for str {
    const TTYPE: TType = TType::String;

    fn encode<T: Transport>(&self, protocol: &mut CompactProtocol<T>) -> Result<(), ProtocolError> {
        protocol.write_string(self)
    }
}

impl CompactDecode for String {
    const TTYPE: TType = TType::String;

    fn decode<T: Transport>(protocol: &mut CompactProtocol<T>) -> Result<Self, ProtocolError> {
        protocol.read_string()
    }
}

impl<V: CompactEncode + ?Sized> CompactEncode for Box<V> {
    const TTYPE: TType = V::TTYPE;

    fn encode<T: Transport>(&self, protocol: &mut CompactProtocol<T>) -> Result<(), ProtocolError> {
        (**self).encode(protocol)
    }
}

impl<V: CompactDecode> CompactDecode for Box<V> {
    const TTYPE: TType = V::TTYPE;

    fn decode<T: Transport>(protocol: &mut CompactProtocol<T>) -> Result<Self, ProtocolError> {
        V::decode(protocol).map(Box::new)
    }
}

impl<V: CompactEncode> CompactEncode for Vec<V> {
    const TTYPE: TType = TType::List;

    fn encode<T: Transport>(&self, protocol: &mut CompactProtocol<T>) -> Result<(), ProtocolError> {
        protocol.write_list_begin(V::TTYPE, self.len())?;
        for item in self {
            item.encode(protocol)?;
        }
        protocol.write_list_end()
    }
}

impl<V: CompactDecode> CompactDecode for Vec<V> {
    const TTYPE: TType = TType::List;

    fn decode<T: Transport>(protocol: &mut CompactProtocol<T>) -> Result<Self, ProtocolError> {
        let header = protocol.read_list_begin()?;
        check_element_type("list", V::TTYPE, header.element_type)?;
        let mut items = Vec::with_capacity(header.size.min(MAX_PREALLOC));
        for _ in 0..header.size {
            items.push(V::decode(protocol)?);
        }
        protocol.read_list_end()?;
        Ok(items)
    }
}

macro_rules! impl_set {
    ($set:ident, $($bound:path),+) => {
        impl<V: CompactEncode> CompactEncode for $set<V> {
            const TTYPE: TType = TType::Set;

            fn encode<T: Transport>(
                &self,
                protocol: &mut CompactProtocol<T>,
            ) -> Result<(), ProtocolError> {
                protocol.write_set_begin(V::TTYPE, self.len())?;
                for item in self {
                    item.encode(protocol)?;
                }
                protocol.write_set_end()
            }
        }

        impl<V: CompactDecode $(+ $bound)+> CompactDecode for $set<V> {
            const TTYPE: TType = TType::Set;

            fn decode<T: Transport>(protocol: &mut CompactProtocol<T>) -> Result<Self, ProtocolError> {
                let header = protocol.read_set_begin()?;
                check_element_type("set", V::TTYPE, header.element_type)?;
                let mut items = $set::new();
                for _ in 0..header.size {
                    items.insert(V::decode(protocol)?);
                }
                protocol.read_set_end()?;
                Ok(items)
            }
        }
    };
}

impl_set!(HashSet, Eq, Hash);
impl_set!(BTreeSet, Ord);

macro_rules! impl_map {
    ($map:ident, $($bound:path),+) => {
        impl<K: CompactEncode, V: CompactEncode> CompactEncode for $map<K, V> {
            const TTYPE: TType = TType::Map;

            fn encode<T: Transport>(
                &self,
                protocol: &mut CompactProtocol<T>,
            ) -> Result<(), ProtocolError> {
                protocol.write_map_begin(K::TTYPE, V::TTYPE, self.len())?;
                for (k, v) in self {
                    k.encode(protocol)?;
                    v.encode(protocol)?;
                }
                protocol.write_map_end()
            }
        }

        impl<K: CompactDecode $(+ $bound)+, V: CompactDecode> CompactDecode for $map<K, V> {
            const TTYPE: TType = TType::Map;

            fn decode<T: Transport>(protocol: &mut CompactProtocol<T>) -> Result<Self, ProtocolError> {
                let header = protocol.read_map_begin()?;
                // An empty map carries no type byte.
                if header.size > 0 {
                    check_element_type("map key", K::TTYPE, header.key_type)?;
                    check_element_type("map value", V::TTYPE, header.value_type)?;
                }
                let mut entries = $map::new();
                for _ in 0..header.size {
                    let k = K::decode(protocol)?;
                    let v = V::decode(protocol)?;
                    entries.insert(k, v);
                }
                protocol.read_map_end()?;
                Ok(entries)
            }
        }
    };
}

impl_map!(HashMap, Eq, Hash);
impl_map!(BTreeMap, Ord);

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-written struct, the shape the derive macro generates.
    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        tags: Vec<String>,
    }

    impl CompactEncode for Point {
        const TTYPE: TType = TType::Struct;

        fn encode<T: Transport>(&self, p: &mut CompactProtocol<T>) -> Result<(), ProtocolError> {
            p.write_struct_begin()?;
            p.write_field_begin(<i32 as CompactEncode>::TTYPE, 1)?;
            self.x.encode(p)?;
            p.write_field_end()?;
            p.write_field_begin(<Vec<String> as CompactEncode>::TTYPE, 2)?;
            self.tags.encode(p)?;
            p.write_field_end()?;
            p.write_field_stop()?;
            p.write_struct_end()
        }
    }

    impl CompactDecode for Point {
        const TTYPE: TType = TType::Struct;

        fn decode<T: Transport>(p: &mut CompactProtocol<T>) -> Result<Self, ProtocolError> {
            let mut x = None;
            let mut tags = None;
            p.read_struct_begin()?;
            loop {
                let field = p.read_field_begin()?;
                if field.is_stop() {
                    break;
                }
                match field.id {
                    1 => x = Some(i32::decode(p)?),
                    2 => tags = Some(<Vec<String>>::decode(p)?),
                    _ => p.skip(field.field_type)?,
                }
                p.read_field_end()?;
            }
            p.read_struct_end()?;
            Ok(Point {
                x: x.ok_or_else(|| ProtocolError::InvalidData("missing x".into()))?,
                tags: tags.ok_or_else(|| ProtocolError::InvalidData("missing tags".into()))?,
            })
        }
    }

    #[test]
    fn test_struct_roundtrip() {
        let point = Point {
            x: -3,
            tags: vec!["a".into(), "bc".into()],
        };
        let bytes = to_vec(&point).unwrap();
        assert_eq!(
            bytes,
            vec![0x15, 5, 0x19, 0x28, 1, b'a', 2, b'b', b'c', 0x00]
        );
        assert_eq!(from_slice::<Point>(&bytes).unwrap(), point);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let bytes = vec![0x15, 5, 0x19, 0x08, 0x00, 0xAA];
        let err = from_slice::<Point>(&bytes).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidData(_)));
    }

    #[test]
    fn test_list_element_type_mismatch() {
        // field 2 is a list<i32> instead of list<string>
        let bytes = vec![0x15, 5, 0x19, 0x15, 2, 0x00];
        let err = from_slice::<Point>(&bytes).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidData(_)));
    }

    #[test]
    fn test_missing_field() {
        let bytes = vec![0x15, 5, 0x00];
        let err = from_slice::<Point>(&bytes).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidData(_)));
    }

    #[test]
    fn test_ttype_constants() {
        assert_eq!(<bool as CompactEncode>::TTYPE, TType::Bool);
        assert_eq!(<Vec<i8> as CompactEncode>::TTYPE, TType::List);
        assert_eq!(<BTreeSet<i64> as CompactDecode>::TTYPE, TType::Set);
        assert_eq!(<HashMap<String, f64> as CompactEncode>::TTYPE, TType::Map);
        assert_eq!(<Box<i16> as CompactDecode>::TTYPE, TType::I16);
    }
}
