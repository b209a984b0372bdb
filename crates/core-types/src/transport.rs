use crate::ResourceId;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Device not found: {0}")]
    NoDevice(String),
    #[error("Enumeration failed: {0}")]
    Enumeration(String),
    #[error("Not connected")]
    NotConnected,
    #[error("Other: {0}")]
    Other(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e.to_string())
    }
}

/// Capability a connector needs from a concrete link (serial port, socket, mock).
///
/// The binding owns the OS handle. Implementations must keep `is_open()`
/// truthful after every call, including failed ones: a failed `attempt_open`
/// leaves the binding closed, and `attempt_close` leaves it closed even when
/// the platform reports an error.
pub trait TransportBinding {
    /// Read/write handle produced once the link is open.
    type Conduit;

    /// Resource this binding is configured for.
    fn resource(&self) -> &ResourceId;

    /// Pure query, no side effects.
    fn is_open(&self) -> bool;

    /// Open the link and hand out a conduit over it.
    fn attempt_open(&mut self) -> Result<Self::Conduit, TransportError>;

    /// Close the link. Not retried by callers.
    fn attempt_close(&mut self) -> Result<(), TransportError>;

    /// Best-effort presence probe that works while closed. Never fails.
    fn is_available(&self) -> bool;
}

/// Lists the resources currently present on the platform.
pub trait PortEnumerator {
    fn enumerate_present(&self) -> Result<HashSet<ResourceId>, TransportError>;
}

impl<F> PortEnumerator for F
where
    F: Fn() -> Result<HashSet<ResourceId>, TransportError>,
{
    fn enumerate_present(&self) -> Result<HashSet<ResourceId>, TransportError> {
        self()
    }
}
