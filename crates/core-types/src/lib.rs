use serde::{Deserialize, Serialize};
use std::fmt;

pub mod profile;
pub mod transport;

pub use profile::{DeviceProfile, FlowControl, ParityMode};
pub use transport::{PortEnumerator, TransportBinding, TransportError};

/// Stable token identifying a physical resource across polls (e.g. a port path).
///
/// Only equality and hashing matter; no ordering is implied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
