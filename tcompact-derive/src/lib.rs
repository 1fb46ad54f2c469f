//! Derive macros for tcompact serialization.
//!
//! This crate provides `#[derive(CompactEncode)]` and `#[derive(CompactDecode)]`
//! for structs with named fields. The generated code drives a
//! `tcompact::CompactProtocol` directly, one field header per field.
//!
//! # Example
//!
//! ```rust,ignore
//! use tcompact::{CompactDecode, CompactEncode};
//!
//! #[derive(CompactEncode, CompactDecode)]
//! struct Person {
//!     #[compact(id = 1)]
//!     name: String,
//!     #[compact(id = 2)]
//!     age: i64,
//! }
//!
//! let person = Person { name: "Alice".into(), age: 30 };
//! let bytes = tcompact::to_vec(&person).unwrap();
//! let decoded: Person = tcompact::from_slice(&bytes).unwrap();
//! ```

mod attr;
mod decode;
mod encode;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for generating `CompactEncode` implementation.
///
/// # Attributes
///
/// - `#[compact(id = N)]` - Required on each field, specifies the field id (i16).
/// - `#[compact(skip)]` - Optional, never write this field.
/// - `#[compact(binary)]` - Optional, write a `Vec<u8>` as binary. `Vec<u8>` is
///   detected automatically; the attribute makes it explicit.
///
/// `Option<T>` fields are left off the wire when `None`. Fields are written in
/// ascending id order.
#[proc_macro_derive(CompactEncode, attributes(compact))]
pub fn derive_compact_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    encode::derive_encode(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive macro for generating `CompactDecode` implementation.
///
/// # Attributes
///
/// - `#[compact(id = N)]` - Required on each field, specifies the field id (i16).
/// - `#[compact(skip)]` - Optional, the field is filled with `Default::default()`.
/// - `#[compact(default)]` - Optional, use `Default::default()` if the field is missing.
/// - `#[compact(binary)]` - Optional, read a `Vec<u8>` from binary.
///
/// Fields with an unknown id, or whose wire type differs from the declared
/// one, are skipped. A missing field that is neither `Option<T>` nor
/// `default` fails with `ProtocolError::InvalidData`.
#[proc_macro_derive(CompactDecode, attributes(compact))]
pub fn derive_compact_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    decode::derive_decode(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
