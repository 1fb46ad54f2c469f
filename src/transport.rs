//! Byte-stream transports consumed by the protocol.

use std::io::{Read, Write};

use crate::error::TransportError;

/// A blocking byte stream.
///
/// Retry, timeout and cancellation policy belong to implementations; the
/// protocol issues calls in sequence and propagates whatever they return.
pub trait Transport {
    /// Fill `buf` completely, or fail. A short read is an error.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;

    /// Write all of `buf`.
    fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError>;

    /// Push buffered bytes to the underlying sink.
    fn flush(&mut self) -> Result<(), TransportError>;

    /// Read a single byte.
    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read_exact(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        (**self).write_all(buf)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        (**self).read_byte()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read_exact(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        (**self).write_all(buf)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        (**self).read_byte()
    }
}

/// In-memory transport: writes append to a buffer, reads consume it from a
/// cursor. Written bytes can be read back from the same instance.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    buf: Vec<u8>,
    pos: usize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All bytes in the buffer, including those already read.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Bytes not yet consumed by reads.
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Number of bytes consumed by reads so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl From<Vec<u8>> for MemoryTransport {
    fn from(buf: Vec<u8>) -> Self {
        MemoryTransport { buf, pos: 0 }
    }
}

impl From<&[u8]> for MemoryTransport {
    fn from(buf: &[u8]) -> Self {
        MemoryTransport::from(buf.to_vec())
    }
}

impl Transport for MemoryTransport {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let have = self.buf.len() - self.pos;
        if have < buf.len() {
            return Err(TransportError::UnexpectedEof {
                need: buf.len(),
                have,
            });
        }
        buf.copy_from_slice(&self.buf[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.buf.extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        match self.buf.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(TransportError::UnexpectedEof { need: 1, have: 0 }),
        }
    }
}

/// Adapter over any `std::io` stream, such as a `TcpStream` or a file.
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
}

impl<S: Read + Write> StreamTransport<S> {
    pub fn new(stream: S) -> Self {
        StreamTransport { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        Ok(self.stream.read_exact(buf)?)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        Ok(self.stream.write_all(buf)?)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(self.stream.flush()?)
    }
}
