//! # Link Protocol
//!
//! Shared vocabulary of the connector system: the connector state machine and
//! the error taxonomy every layer reports through.
//!
//! Kept free of any transport or platform dependency so that every crate in
//! the workspace, tests included, can depend on it.
//!
//! ## Error taxonomy
//!
//! - **PreconditionViolation**: setup/programmer error, never retried
//! - **ConnectorError**: transport failure while opening, closing or sniffing,
//!   with the transport cause attached
//! - **LinkError**: union of the two, returned by factory acquisition
//! - **ListenerError**: a listener rejected an event; isolated by the registry

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod errors;
pub mod state;

pub use errors::{ConnectorError, LinkError, ListenerError, PollError, PreconditionViolation};
pub use state::ConnectorState;
