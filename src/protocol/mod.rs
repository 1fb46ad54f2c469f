//! The compact protocol: a checked call grammar over the byte-level codec.
//!
//! Struct serializers drive a [`CompactProtocol`] through begin/value/end
//! triples. Each call is checked against the session's grammar state before
//! any byte is produced or consumed, so a missing `*_end` or a value written
//! outside a field is reported as a [`StateViolation`] instead of silently
//! corrupting the stream.
//!
//! ```rust
//! use tcompact::{CompactProtocol, MemoryTransport, TType};
//!
//! let mut out = CompactProtocol::new(MemoryTransport::new());
//! out.write_struct_begin().unwrap();
//! out.write_field_begin(TType::I32, 1).unwrap();
//! out.write_i32(42).unwrap();
//! out.write_field_end().unwrap();
//! out.write_field_stop().unwrap();
//! out.write_struct_end().unwrap();
//!
//! let bytes = out.into_inner().into_inner();
//! assert_eq!(bytes, vec![0x15, 84, 0x00]);
//! ```
//!
//! [`StateViolation`]: crate::ProtocolError::StateViolation

mod reader;
mod skip;
pub mod state;
mod writer;

pub use state::{PendingBool, Session, State};

use crate::config::ProtocolConfig;
use crate::error::ProtocolError;
use crate::transport::Transport;

/// Compact protocol session bound to one transport.
///
/// A session lives for one message exchange (or one standalone struct). After
/// any error its state can no longer be trusted; drop it and, if the transport
/// is still wanted, recover it with [`CompactProtocol::into_inner`].
#[derive(Debug)]
pub struct CompactProtocol<T> {
    transport: T,
    session: Session,
    config: ProtocolConfig,
    buf: Vec<u8>,
}

impl<T: Transport> CompactProtocol<T> {
    /// Create a session with the default config.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ProtocolConfig::default())
    }

    pub fn with_config(transport: T, config: ProtocolConfig) -> Self {
        CompactProtocol {
            transport,
            session: Session::new(),
            config,
            buf: Vec::with_capacity(16),
        }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Current grammar state.
    pub fn state(&self) -> State {
        self.session.state()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Flush the underlying transport.
    pub fn flush(&mut self) -> Result<(), ProtocolError> {
        self.transport.flush()?;
        Ok(())
    }

    /// Write the scratch buffer to the transport and clear it.
    fn emit(&mut self) -> Result<(), ProtocolError> {
        let result = self.transport.write_all(&self.buf);
        self.buf.clear();
        result?;
        Ok(())
    }
}
