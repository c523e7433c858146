//! Scope identifier for request-scoped resources

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies the resources (temp files, uploaded assets) of one webhook call
///
/// Usually taken from the HTTP request id so that log lines and temp paths
/// of the same request share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(Uuid);

impl ScopeId {
    /// Create a new time-ordered scope ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a scope ID from an existing UUID
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Short form used in file and asset names
    pub fn short(&self) -> String {
        self.0.simple().to_string()
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ScopeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
