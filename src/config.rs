//! Read-side limits for a protocol session.

/// Default bound on combined struct/container nesting when reading.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits applied while decoding untrusted input.
///
/// Sizes larger than `i32::MAX` are rejected regardless of these settings,
/// since no conforming writer can produce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ProtocolConfig {
    /// Maximum byte length of a string or binary value. `None` means no limit.
    pub string_size_limit: Option<usize>,
    /// Maximum element count of a list, set or map. `None` means no limit.
    pub container_size_limit: Option<usize>,
    /// Maximum number of nested structs and containers.
    pub max_depth: usize,
}

impl ProtocolConfig {
    /// Create a config with no size limits and the default depth bound.
    #[must_use]
    pub fn new() -> Self {
        ProtocolConfig {
            string_size_limit: None,
            container_size_limit: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_string_size_limit(mut self, limit: usize) -> Self {
        self.string_size_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_container_size_limit(mut self, limit: usize) -> Self {
        self.container_size_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::new()
    }
}
