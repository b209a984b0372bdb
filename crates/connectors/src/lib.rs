//! # Connectors
//!
//! Connection lifecycle for devices on intermittently-present links.
//!
//! ## Components
//!
//! - **Connector**: two-state machine (Disconnected/Connected) over any
//!   [`TransportBinding`](core_types::TransportBinding)
//! - **ConnectorFactory**: builds configured connectors, scoped acquisition
//!   with guaranteed release
//! - **Watchdog**: diffs enumerated vs. known resources once per `poll()` and
//!   emits [`ResourceEvent`]s to its listeners
//! - **serial**: the same pieces specialised for native serial ports
//!
//! Everything here is synchronous and single-threaded. Nothing sleeps or
//! spawns; the owner decides when to poll.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod connector;
pub mod constants;
pub mod events;
pub mod factory;
#[cfg(test)]
mod mock;
#[cfg(feature = "serial")]
pub mod serial;
pub mod watchdog;

pub use connector::{Connector, ProtocolSniffer};
pub use events::{ResourceEvent, SharedConnector};
pub use factory::{ConnectorFactory, ScopedConnector};
#[cfg(feature = "serial")]
pub use serial::{log_connection_events, SerialConnector, SerialConnectorFactory, SerialWatchdog};
pub use watchdog::{PollReport, Watchdog};
