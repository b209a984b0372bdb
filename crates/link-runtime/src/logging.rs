//! Component spans.
//!
//! Every component takes a [`Span`] at construction and emits its records
//! inside it. The helpers below build the default spans; callers that want a
//! different target, level or parent pass their own through `with_span`.

use core_types::ResourceId;
use tracing::Span;

/// Default span for a connector bound to `resource`
pub fn connector_span(resource: &ResourceId) -> Span {
    tracing::info_span!("connector", resource = %resource)
}

/// Default span for a connector factory
pub fn factory_span(kind: &'static str) -> Span {
    tracing::info_span!("factory", kind)
}

/// Default span for a presence watchdog
pub fn watchdog_span() -> Span {
    tracing::info_span!("watchdog")
}

/// Default span for a listener registry
pub fn listeners_span() -> Span {
    tracing::debug_span!("listeners")
}

/// Best-effort text of a caught panic payload
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
