//! # Native Transport
//!
//! Serial port access for Linux, macOS and Windows through the `serialport`
//! crate:
//! - [`SerialBinding`]: a configured-but-closed port a connector can open
//! - [`SerialConduit`]: the blocking read/write handle of an open port
//! - [`SystemPorts`]: enumeration of the ports the OS currently exposes

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod ports;
pub mod serial;

pub use ports::{port_summary, SystemPorts};
pub use serial::{SerialBinding, SerialConduit};

use core_types::TransportError;

pub(crate) fn map_serial_error(e: serialport::Error) -> TransportError {
    match e.kind {
        serialport::ErrorKind::NoDevice => TransportError::NoDevice(e.description),
        serialport::ErrorKind::Io(_) => TransportError::Io(e.description),
        _ => TransportError::ConnectionFailed(e.description),
    }
}
