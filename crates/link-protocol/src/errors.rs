//! Error Handling Guidelines
//!
//! Every message names the operation that failed and the resource it failed
//! on; the transport-level cause stays reachable through
//! [`std::error::Error::source`] so callers can inspect it rather than parse
//! text.
//!
//! Examples:
//! - ✅ "Failed to open /dev/ttyUSB0: Device not found: No such file or directory"
//! - ❌ "Open failed" (no resource, no cause)

use core_types::{ResourceId, TransportError};
use thiserror::Error;

/// Transport handed to a connector was already open.
///
/// A setup bug, not a runtime condition: it is reported before any connect
/// logic runs and is never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Precondition violated for {resource}: {reason}")]
pub struct PreconditionViolation {
    pub resource: ResourceId,
    pub reason: String,
}

impl PreconditionViolation {
    pub fn already_open(resource: ResourceId) -> Self {
        Self {
            resource,
            reason: "transport must be closed when handed to a connector".into(),
        }
    }
}

/// Uniform error for transport failures during a connector operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("Failed to open {resource}: {source}")]
    Open {
        resource: ResourceId,
        #[source]
        source: TransportError,
    },

    #[error("Failed to close {resource}: {source}")]
    Close {
        resource: ResourceId,
        #[source]
        source: TransportError,
    },

    /// Link opened but protocol detection failed; the link was closed again
    #[error("Protocol detection failed on {resource}: {source}")]
    Sniff {
        resource: ResourceId,
        #[source]
        source: TransportError,
    },
}

impl ConnectorError {
    pub fn resource(&self) -> &ResourceId {
        match self {
            Self::Open { resource, .. }
            | Self::Close { resource, .. }
            | Self::Sniff { resource, .. } => resource,
        }
    }

    /// The transport error this was raised from
    pub fn cause(&self) -> &TransportError {
        match self {
            Self::Open { source, .. } | Self::Close { source, .. } | Self::Sniff { source, .. } => {
                source
            }
        }
    }
}

/// Anything that can go wrong while a factory hands out a live connector
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),

    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

impl LinkError {
    pub fn resource(&self) -> &ResourceId {
        match self {
            Self::Precondition(e) => &e.resource,
            Self::Connector(e) => e.resource(),
        }
    }
}

/// Errors that end a watchdog poll early
///
/// Runtime connect failures are not in here: they are retried on the next
/// poll and reported alongside the poll's results instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// Enumeration failed; nothing was changed
    #[error("Resource enumeration failed: {0}")]
    Enumeration(#[from] TransportError),

    /// The factory built a connector around an already-open transport.
    /// Not retried: the factory has to be fixed.
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),
}

impl PollError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

/// Error returned by an event listener. Contained by the dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Listener failed: {0}")]
pub struct ListenerError(pub String);

impl From<String> for ListenerError {
    fn from(s: String) -> Self {
        ListenerError(s)
    }
}

impl From<&str> for ListenerError {
    fn from(s: &str) -> Self {
        ListenerError(s.to_string())
    }
}
