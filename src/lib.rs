//! tcompact: a Rust implementation of the Thrift compact binary protocol.
//!
//! The compact protocol encodes typed, id-tagged structs with varints,
//! zig-zag integers, delta-encoded field headers and bools folded into
//! those headers. Messages written here are byte-compatible with other
//! compact protocol implementations.
//!
//! # Quick Start
//!
//! ```rust
//! use tcompact::{CompactProtocol, MemoryTransport, MessageHeader, MessageType, TType};
//!
//! let mut out = CompactProtocol::new(MemoryTransport::new());
//! out.write_message_begin(&MessageHeader::new("ping", MessageType::Call, 1)).unwrap();
//! out.write_struct_begin().unwrap();
//! out.write_field_begin(TType::Bool, 1).unwrap();
//! out.write_bool(true).unwrap();
//! out.write_field_end().unwrap();
//! out.write_field_stop().unwrap();
//! out.write_struct_end().unwrap();
//! out.write_message_end().unwrap();
//!
//! let mut input = CompactProtocol::new(out.into_inner());
//! let header = input.read_message_begin().unwrap();
//! assert_eq!(header.name, "ping");
//! input.read_struct_begin().unwrap();
//! let field = input.read_field_begin().unwrap();
//! assert_eq!((field.field_type, field.id), (TType::Bool, 1));
//! assert!(input.read_bool().unwrap());
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod serialize;
pub mod transport;
pub mod types;
pub mod value;

pub use config::ProtocolConfig;
pub use error::{ProtocolError, TransportError};
pub use protocol::{CompactProtocol, State};
pub use serialize::{from_slice, from_slice_with_config, to_vec, CompactDecode, CompactEncode};
pub use transport::{MemoryTransport, StreamTransport, Transport};
pub use types::{CollectionHeader, CompactType, FieldHeader, MapHeader, MessageHeader, MessageType, TType};
pub use value::Value;

// Re-export derive macros when the feature is enabled
#[cfg(feature = "derive")]
pub use tcompact_derive::{CompactDecode, CompactEncode};
