use crate::logging::{listeners_span, panic_message};
use link_protocol::ListenerError;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::Span;

/// Boxed event handler
pub type Listener<E> = Box<dyn FnMut(&E) -> Result<(), ListenerError>>;

/// Opaque token returned by [`ListenerRegistry::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

/// Outcome of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners that returned Ok
    pub delivered: usize,
    /// Listeners that returned Err or panicked
    pub failed: usize,
}

impl DispatchReport {
    pub fn merge(&mut self, other: DispatchReport) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// Ordered collection of event handlers
///
/// Responsibilities:
/// - Append on subscribe, remove on unsubscribe
/// - Invoke every handler synchronously, in registration order
/// - Contain handler failures (errors and panics) so the remaining handlers
///   still receive the event
///
/// Mutation requires `&mut self`, so subscribing from inside a dispatch is
/// rejected by the borrow checker.
pub struct ListenerRegistry<E> {
    listeners: Vec<(ListenerHandle, Listener<E>)>,
    next_id: u64,
    span: Span,
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ListenerRegistry<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
            span: listeners_span(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn subscribe<F>(&mut self, handler: F) -> ListenerHandle
    where
        F: FnMut(&E) -> Result<(), ListenerError> + 'static,
    {
        let handle = ListenerHandle(self.next_id);
        self.next_id += 1;
        self.listeners.push((handle, Box::new(handler)));
        handle
    }

    /// Returns false if the handle was unknown (already removed).
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn dispatch(&mut self, event: &E) -> DispatchReport {
        let _enter = self.span.enter();
        let mut report = DispatchReport::default();

        for (handle, listener) in self.listeners.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    tracing::warn!(listener = handle.0, error = %e, "Listener returned an error");
                    report.failed += 1;
                }
                Err(payload) => {
                    tracing::error!(
                        listener = handle.0,
                        panic = %panic_message(payload.as_ref()),
                        "Listener panicked during dispatch"
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }
}
