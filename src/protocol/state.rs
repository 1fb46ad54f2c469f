//! Call-grammar state and nesting stacks of one protocol session.

use std::fmt;

use crate::error::ProtocolError;

/// Position in the call grammar.
///
/// `Clear` is shared by both directions; the remaining states come in a
/// write set and a mirrored read set with identical transition shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Clear,
    FieldWrite,
    ValueWrite,
    ContainerWrite,
    BoolWrite,
    FieldRead,
    ValueRead,
    ContainerRead,
    BoolRead,
}

impl State {
    pub fn is_write(self) -> bool {
        matches!(
            self,
            State::FieldWrite | State::ValueWrite | State::ContainerWrite | State::BoolWrite
        )
    }

    pub fn is_read(self) -> bool {
        matches!(
            self,
            State::FieldRead | State::ValueRead | State::ContainerRead | State::BoolRead
        )
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Clear => "CLEAR",
            State::FieldWrite => "FIELD_WRITE",
            State::ValueWrite => "VALUE_WRITE",
            State::ContainerWrite => "CONTAINER_WRITE",
            State::BoolWrite => "BOOL_WRITE",
            State::FieldRead => "FIELD_READ",
            State::ValueRead => "VALUE_READ",
            State::ContainerRead => "CONTAINER_READ",
            State::BoolRead => "BOOL_READ",
        };
        f.write_str(name)
    }
}

/// A bool field whose header is deferred until its value is known.
///
/// On the write path `value` starts empty and is filled by `write_bool`; on
/// the read path it holds the value decoded from the header until `read_bool`
/// takes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingBool {
    pub field_id: i16,
    pub value: Option<bool>,
}

/// Saved context of an enclosing struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StructFrame {
    state: State,
    last_field_id: i16,
}

/// Grammar state of one in-flight message.
///
/// Every transition is checked; a call in the wrong state yields a
/// `StateViolation` and leaves the session unusable.
///
/// Only [`CompactProtocol`](crate::CompactProtocol) drives the session;
/// callers can inspect it through [`session`](crate::CompactProtocol::session).
#[derive(Debug, Clone)]
pub struct Session {
    state: State,
    last_field_id: i16,
    struct_stack: Vec<StructFrame>,
    container_stack: Vec<State>,
    pending_bool: Option<PendingBool>,
}

impl Session {
    pub(crate) fn new() -> Self {
        Session {
            state: State::Clear,
            last_field_id: 0,
            struct_stack: Vec::new(),
            container_stack: Vec::new(),
            pending_bool: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn last_field_id(&self) -> i16 {
        self.last_field_id
    }

    pub(crate) fn set_last_field_id(&mut self, id: i16) {
        self.last_field_id = id;
    }

    pub fn struct_depth(&self) -> usize {
        self.struct_stack.len()
    }

    pub fn container_depth(&self) -> usize {
        self.container_stack.len()
    }

    /// Combined nesting of structs and containers.
    pub fn depth(&self) -> usize {
        self.struct_stack.len() + self.container_stack.len()
    }

    pub fn pending_bool(&self) -> Option<PendingBool> {
        self.pending_bool
    }

    /// Fail unless the session is in one of `allowed`.
    pub(crate) fn expect(&self, operation: &'static str, allowed: &[State]) -> Result<(), ProtocolError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.violation(operation))
        }
    }

    /// Build the error for `operation` being called in the current state.
    pub(crate) fn violation(&self, operation: &'static str) -> ProtocolError {
        tracing::error!(operation, state = %self.state, "protocol usage violation");
        ProtocolError::StateViolation {
            operation,
            state: self.state,
        }
    }

    pub(crate) fn transition(&mut self, to: State) {
        self.state = to;
    }

    /// Enter a struct: save the current state and field id, start a fresh
    /// field sequence.
    pub(crate) fn push_struct(&mut self, to: State) {
        self.struct_stack.push(StructFrame {
            state: self.state,
            last_field_id: self.last_field_id,
        });
        self.last_field_id = 0;
        self.state = to;
    }

    /// Leave a struct, restoring the enclosing state and field id.
    pub(crate) fn pop_struct(&mut self, operation: &'static str) -> Result<(), ProtocolError> {
        let frame = self
            .struct_stack
            .pop()
            .ok_or_else(|| self.violation(operation))?;
        self.state = frame.state;
        self.last_field_id = frame.last_field_id;
        Ok(())
    }

    pub(crate) fn push_container(&mut self, to: State) {
        self.container_stack.push(self.state);
        self.state = to;
    }

    pub(crate) fn pop_container(&mut self, operation: &'static str) -> Result<(), ProtocolError> {
        let state = self
            .container_stack
            .pop()
            .ok_or_else(|| self.violation(operation))?;
        self.state = state;
        Ok(())
    }

    /// Defer a bool field header (write path) or hold a decoded bool (read
    /// path), moving to the matching bool state.
    pub(crate) fn begin_bool(&mut self, to: State, pending: PendingBool) {
        debug_assert!(matches!(to, State::BoolWrite | State::BoolRead));
        self.pending_bool = Some(pending);
        self.state = to;
    }

    /// Record the value of the pending bool on the write path. Fails if the
    /// value was already written.
    pub(crate) fn fill_pending_bool(
        &mut self,
        operation: &'static str,
        value: bool,
    ) -> Result<i16, ProtocolError> {
        if let Some(pending) = self.pending_bool.as_mut() {
            if pending.value.is_none() {
                pending.value = Some(value);
                return Ok(pending.field_id);
            }
        }
        Err(self.violation(operation))
    }

    /// Take the decoded value of the pending bool on the read path. Fails if
    /// it was already taken.
    pub(crate) fn take_pending_bool(&mut self, operation: &'static str) -> Result<bool, ProtocolError> {
        match self.pending_bool.as_mut().and_then(|p| p.value.take()) {
            Some(value) => Ok(value),
            None => Err(self.violation(operation)),
        }
    }

    /// Finish a field, returning to the field state of the enclosing struct.
    pub(crate) fn end_field(&mut self, to: State) {
        self.pending_bool = None;
        self.state = to;
    }
}
