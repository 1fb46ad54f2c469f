//! Byte-level building blocks of the compact encoding.
//!
//! Everything here is stateless: encoders append to a `Vec<u8>` and decoders
//! pull from a [`Transport`](crate::transport::Transport). The grammar that
//! strings them together lives in [`crate::protocol`].

pub mod collection;
pub mod field;
pub mod varint;
pub mod wire;

pub use varint::{zigzag_decode, zigzag_encode, ZigZag};
