//! Stable per-device node identity.

use crate::error::{ClockError, ClockResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A stable, process-wide-unique node identity.
///
/// A `NodeId` is minted once per device installation and reused for
/// every timestamp that device ever produces. It participates in
/// timestamp ordering as the final tie-break, so two devices stamping
/// the same physical millisecond with the same counter still compare
/// deterministically.
///
/// # Invariants
///
/// - Non-empty
/// - Never contains `:` (the timestamp separator)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node id from a string, validating the invariants.
    ///
    /// # Errors
    ///
    /// Returns `ClockError::InvalidNodeId` if the string is empty or
    /// contains the `:` separator.
    pub fn new(id: impl Into<String>) -> ClockResult<Self> {
        let id = id.into();
        if id.is_empty() || id.contains(':') {
            return Err(ClockError::InvalidNodeId(id));
        }
        Ok(Self(id))
    }

    /// Mints a fresh random node id.
    ///
    /// Callers persist the result; identity is never regenerated for
    /// the lifetime of a device installation.
    #[must_use]
    pub fn mint() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NodeId {
    type Error = ClockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}
