use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier shared by tasks and schedules.
///
/// Ids are minted by the remote service; slate never generates them locally
/// and treats them as plain strings. The newtype keeps them from being mixed
/// up with titles, folder names, and other stringly data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
