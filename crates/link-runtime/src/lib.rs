//! # Link Runtime
//!
//! Runtime plumbing shared by the connector and the watchdog.
//!
//! This crate defines:
//! - **ListenerRegistry**: ordered, synchronous event fan-out with per-listener
//!   failure isolation
//! - **Logging spans**: the `tracing` spans each component is constructed with
//!
//! ## Principles
//!
//! - **No hidden scheduling**: dispatch happens inside the call that produced
//!   the event, nothing is queued or deferred
//! - **Failure isolation**: a listener that errors or panics is logged and
//!   skipped; the others still see the event
//! - **Injected observability**: components log into the span they were built
//!   with, never into a process-wide logger
//!
//! ## Example
//!
//! ```
//! use link_runtime::ListenerRegistry;
//!
//! let mut registry: ListenerRegistry<String> = ListenerRegistry::new();
//! let handle = registry.subscribe(|event: &String| {
//!     println!("got {event}");
//!     Ok(())
//! });
//!
//! let report = registry.dispatch(&"hello".to_string());
//! assert_eq!(report.delivered, 1);
//! assert!(registry.unsubscribe(handle));
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod listeners;
pub mod logging;

pub use listeners::{DispatchReport, Listener, ListenerHandle, ListenerRegistry};
