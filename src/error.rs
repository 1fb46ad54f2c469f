use crate::protocol::State;

/// Errors reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("unexpected end of stream: need {need} bytes, have {have}")]
    UnexpectedEof { need: usize, have: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether the transport ran out of bytes, as opposed to failing outright.
    pub fn is_eof(&self) -> bool {
        match self {
            TransportError::UnexpectedEof { .. } => true,
            TransportError::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
        }
    }
}

/// Errors from the compact protocol codec.
///
/// Every variant is terminal for the session that produced it: the protocol's
/// grammar state and nesting stacks can no longer be trusted, so the caller
/// must drop the [`CompactProtocol`](crate::CompactProtocol) and abandon the
/// message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed varint: {0}")]
    MalformedVarint(&'static str),

    #[error("bad protocol version: {0}")]
    BadVersion(String),

    #[error("invalid {what} size {size}: limit is {limit}")]
    InvalidSize {
        what: &'static str,
        size: u64,
        limit: u64,
    },

    #[error("{operation} is not allowed in state {state}")]
    StateViolation {
        operation: &'static str,
        state: State,
    },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid utf-8 string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ProtocolError {
    /// Returns true when the error is a defect in the calling code (unmatched
    /// begin/end calls and the like) rather than bad bytes from the peer.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, ProtocolError::StateViolation { .. })
    }

    /// Returns true when the error was caused by malformed input bytes.
    pub fn is_wire_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::MalformedVarint(_)
                | ProtocolError::BadVersion(_)
                | ProtocolError::InvalidSize { .. }
                | ProtocolError::InvalidData(_)
                | ProtocolError::InvalidUtf8(_)
        )
    }
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
