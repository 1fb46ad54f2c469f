use std::collections::BTreeMap;
use std::fmt;

use crate::error::ProtocolError;
use crate::protocol::CompactProtocol;
use crate::serialize::MAX_PREALLOC;
use crate::transport::Transport;
use crate::types::TType;

/// Dynamic value of any wire type, keyed by field id for structs.
///
/// Useful for inspecting payloads whose layout is not known at compile time.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    /// String or binary; the wire does not distinguish them.
    Binary(Vec<u8>),
    Struct(BTreeMap<i16, Value>),
    List {
        element_type: TType,
        elements: Vec<Value>,
    },
    Set {
        element_type: TType,
        elements: Vec<Value>,
    },
    Map {
        key_type: TType,
        value_type: TType,
        entries: Vec<(Value, Value)>,
    },
}

impl Value {
    /// Create a new empty struct value.
    pub fn new_struct() -> Self {
        Value::Struct(BTreeMap::new())
    }

    /// Helper to build a struct from `(field id, value)` pairs.
    pub fn from_fields(fields: Vec<(i16, Value)>) -> Self {
        Value::Struct(fields.into_iter().collect())
    }

    /// Get a field from a struct value, returns None if not a struct or field missing.
    pub fn get(&self, id: i16) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.get(&id),
            _ => None,
        }
    }

    /// The logical wire type of this value.
    pub fn ttype(&self) -> TType {
        match self {
            Value::Bool(_) => TType::Bool,
            Value::Byte(_) => TType::Byte,
            Value::I16(_) => TType::I16,
            Value::I32(_) => TType::I32,
            Value::I64(_) => TType::I64,
            Value::Double(_) => TType::Double,
            Value::Binary(_) => TType::String,
            Value::Struct(_) => TType::Struct,
            Value::List { .. } => TType::List,
            Value::Set { .. } => TType::Set,
            Value::Map { .. } => TType::Map,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer variant, widened to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::I16(v) => Some(i64::from(*v)),
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// The bytes as UTF-8, if they are valid.
    pub fn as_str(&self) -> Option<&str> {
        self.as_binary().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_struct(&self) -> Option<&BTreeMap<i16, Value>> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Elements of a list or set.
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Value::List { elements, .. } | Value::Set { elements, .. } => Some(elements),
            _ => None,
        }
    }

    pub fn as_entries(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map { entries, .. } => Some(entries),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (
                Value::List {
                    element_type: ta,
                    elements: a,
                },
                Value::List {
                    element_type: tb,
                    elements: b,
                },
            )
            | (
                Value::Set {
                    element_type: ta,
                    elements: a,
                },
                Value::Set {
                    element_type: tb,
                    elements: b,
                },
            ) => ta == tb && a == b,
            (
                Value::Map {
                    key_type: ka,
                    value_type: va,
                    entries: a,
                },
                Value::Map {
                    key_type: kb,
                    value_type: vb,
                    entries: b,
                },
            ) => ka == kb && va == vb && a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Binary(v) => match std::str::from_utf8(v) {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "<binary {} bytes>", v.len()),
            },
            Value::Struct(fields) => {
                write!(f, "{{ ")?;
                for (i, (id, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", id, v)?;
                }
                write!(f, " }}")
            }
            Value::List { elements, .. } => {
                write!(f, "[")?;
                write_joined(f, elements)?;
                write!(f, "]")
            }
            Value::Set { elements, .. } => {
                write!(f, "{{")?;
                write_joined(f, elements)?;
                write!(f, "}}")
            }
            Value::Map { entries, .. } => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", v)?;
    }
    Ok(())
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Binary(v.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Binary(v.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<BTreeMap<i16, Value>> for Value {
    fn from(v: BTreeMap<i16, Value>) -> Self {
        Value::Struct(v)
    }
}

impl<T: Transport> CompactProtocol<T> {
    /// Read one value of type `ttype` into a [`Value`].
    pub fn read_value(&mut self, ttype: TType) -> Result<Value, ProtocolError> {
        let value = match ttype {
            TType::Bool => Value::Bool(self.read_bool()?),
            TType::Byte => Value::Byte(self.read_byte()?),
            TType::I16 => Value::I16(self.read_i16()?),
            TType::I32 => Value::I32(self.read_i32()?),
            TType::I64 => Value::I64(self.read_i64()?),
            TType::Double => Value::Double(self.read_double()?),
            TType::String => Value::Binary(self.read_binary()?),
            TType::Struct => {
                let mut fields = BTreeMap::new();
                self.read_struct_begin()?;
                loop {
                    let field = self.read_field_begin()?;
                    if field.is_stop() {
                        break;
                    }
                    let v = self.read_value(field.field_type)?;
                    fields.insert(field.id, v);
                    self.read_field_end()?;
                }
                self.read_struct_end()?;
                Value::Struct(fields)
            }
            TType::List | TType::Set => {
                let header = if ttype == TType::List {
                    self.read_list_begin()?
                } else {
                    self.read_set_begin()?
                };
                let mut elements = Vec::with_capacity(header.size.min(MAX_PREALLOC));
                for _ in 0..header.size {
                    elements.push(self.read_value(header.element_type)?);
                }
                if ttype == TType::List {
                    self.read_list_end()?;
                    Value::List {
                        element_type: header.element_type,
                        elements,
                    }
                } else {
                    self.read_set_end()?;
                    Value::Set {
                        element_type: header.element_type,
                        elements,
                    }
                }
            }
            TType::Map => {
                let header = self.read_map_begin()?;
                let mut entries = Vec::with_capacity(header.size.min(MAX_PREALLOC));
                for _ in 0..header.size {
                    let k = self.read_value(header.key_type)?;
                    let v = self.read_value(header.value_type)?;
                    entries.push((k, v));
                }
                self.read_map_end()?;
                Value::Map {
                    key_type: header.key_type,
                    value_type: header.value_type,
                    entries,
                }
            }
            TType::Stop | TType::Void => {
                return Err(ProtocolError::InvalidData(format!("cannot read {}", ttype)))
            }
        };
        Ok(value)
    }

    /// Write a [`Value`]. Struct fields go out in ascending id order.
    pub fn write_value(&mut self, value: &Value) -> Result<(), ProtocolError> {
        match value {
            Value::Bool(v) => self.write_bool(*v),
            Value::Byte(v) => self.write_byte(*v),
            Value::I16(v) => self.write_i16(*v),
            Value::I32(v) => self.write_i32(*v),
            Value::I64(v) => self.write_i64(*v),
            Value::Double(v) => self.write_double(*v),
            Value::Binary(v) => self.write_binary(v),
            Value::Struct(fields) => {
                self.write_struct_begin()?;
                for (id, v) in fields {
                    self.write_field_begin(v.ttype(), *id)?;
                    self.write_value(v)?;
                    self.write_field_end()?;
                }
                self.write_field_stop()?;
                self.write_struct_end()
            }
            Value::List {
                element_type,
                elements,
            } => {
                self.write_list_begin(*element_type, elements.len())?;
                self.write_elements(*element_type, elements)?;
                self.write_list_end()
            }
            Value::Set {
                element_type,
                elements,
            } => {
                self.write_set_begin(*element_type, elements.len())?;
                self.write_elements(*element_type, elements)?;
                self.write_set_end()
            }
            Value::Map {
                key_type,
                value_type,
                entries,
            } => {
                self.write_map_begin(*key_type, *value_type, entries.len())?;
                for (k, v) in entries {
                    check_element(*key_type, k)?;
                    check_element(*value_type, v)?;
                    self.write_value(k)?;
                    self.write_value(v)?;
                }
                self.write_map_end()
            }
        }
    }

    fn write_elements(&mut self, element_type: TType, elements: &[Value]) -> Result<(), ProtocolError> {
        for v in elements {
            check_element(element_type, v)?;
            self.write_value(v)?;
        }
        Ok(())
    }
}

fn check_element(expected: TType, value: &Value) -> Result<(), ProtocolError> {
    if value.ttype() != expected {
        return Err(ProtocolError::InvalidData(format!(
            "element of type {} in container of {}",
            value.ttype(),
            expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(42i32), Value::I32(42));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("hi"), Value::Binary(b"hi".to_vec()));
        assert_eq!(Value::from(2.5f64), Value::Double(2.5));
    }

    #[test]
    fn test_struct_builder() {
        let val = Value::from_fields(vec![(1, "Alice".into()), (2, 13i32.into())]);
        assert_eq!(val.get(1).and_then(Value::as_str), Some("Alice"));
        assert_eq!(val.get(2).and_then(Value::as_i64), Some(13));
        assert_eq!(val.get(3), None);
    }

    #[test]
    fn test_equality() {
        assert_eq!(Value::Double(0.1), Value::Double(0.1));
        assert_ne!(Value::I32(1), Value::I64(1));
        assert_ne!(
            Value::List {
                element_type: TType::I32,
                elements: vec![]
            },
            Value::Set {
                element_type: TType::I32,
                elements: vec![]
            }
        );
    }

    #[test]
    fn test_display() {
        let val = Value::from_fields(vec![
            (1, "x".into()),
            (
                2,
                Value::List {
                    element_type: TType::I16,
                    elements: vec![Value::I16(1), Value::I16(2)],
                },
            ),
        ]);
        assert_eq!(val.to_string(), "{ 1: \"x\", 2: [1, 2] }");
    }
}
