use crate::events::{ResourceEvent, SharedConnector};
use crate::factory::ConnectorFactory;
use core_types::{PortEnumerator, ResourceId};
use link_protocol::{LinkError, ListenerError, PollError};
use link_runtime::logging::{listeners_span, watchdog_span};
use link_runtime::{DispatchReport, ListenerHandle, ListenerRegistry};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::Span;

/// What one `poll()` did
#[derive(Debug, Default)]
pub struct PollReport {
    /// Resources that became known (an Available event was dispatched)
    pub added: Vec<ResourceId>,
    /// Resources that were dropped (an Unavailable event was dispatched)
    pub removed: Vec<ResourceId>,
    /// Newcomers whose connector could not be opened; retried next poll
    pub failed: Vec<LinkError>,
    /// Listener outcomes summed over every event of this poll
    pub dispatch: DispatchReport,
}

impl PollReport {
    pub fn is_quiet(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.failed.is_empty()
    }
}

/// Presence-transition detector
///
/// Responsibilities:
/// - Track which resources are believed present (`known`)
/// - On each `poll()`, diff the enumerated resources against `known`
/// - Open a connector for every newcomer through the factory
/// - Emit exactly one event per transition to every listener, in order
///
/// ## Poll order
///
/// Additions are processed before removals. Within each group the order
/// follows set iteration and carries no meaning.
///
/// ## Failure policy
///
/// - Enumeration error: the poll returns it and `known` is left untouched
/// - Precondition violation from the factory: the poll stops and returns it.
///   Additions already made in this poll stay; nothing is retried for it
/// - Connector open error: the resource stays unknown, the error goes into
///   [`PollReport::failed`], the next poll tries again
/// - Listener error or panic: logged and counted, never propagated
pub struct Watchdog<F: ConnectorFactory, E: PortEnumerator> {
    factory: F,
    enumerator: E,
    known: HashMap<ResourceId, SharedConnector<F::Binding>>,
    listeners: ListenerRegistry<ResourceEvent<F::Binding>>,
    span: Span,
}

impl<F: ConnectorFactory, E: PortEnumerator> Watchdog<F, E> {
    pub fn new(factory: F, enumerator: E) -> Self {
        let span = watchdog_span();
        let listeners = ListenerRegistry::new().with_span(span.in_scope(listeners_span));
        Self {
            factory,
            enumerator,
            known: HashMap::new(),
            listeners,
            span,
        }
    }

    /// Log into `span`; listener failures go to a child of it.
    pub fn with_span(mut self, span: Span) -> Self {
        self.listeners = std::mem::take(&mut self.listeners)
            .with_span(span.in_scope(listeners_span));
        self.span = span;
        self
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn subscribe<H>(&mut self, handler: H) -> ListenerHandle
    where
        H: FnMut(&ResourceEvent<F::Binding>) -> Result<(), ListenerError> + 'static,
    {
        self.listeners.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.unsubscribe(handle)
    }

    pub fn is_known(&self, resource: &ResourceId) -> bool {
        self.known.contains_key(resource)
    }

    pub fn known(&self) -> impl Iterator<Item = &ResourceId> {
        self.known.keys()
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    /// Live connector of a known resource
    pub fn connector(&self, resource: &ResourceId) -> Option<SharedConnector<F::Binding>> {
        self.known.get(resource).cloned()
    }

    /// Run one detection cycle.
    pub fn poll(&mut self) -> Result<PollReport, PollError> {
        let span = self.span.clone();
        let _enter = span.enter();

        let present = self.enumerator.enumerate_present().map_err(|e| {
            tracing::warn!(error = %e, "Resource enumeration failed; known set unchanged");
            e
        })?;

        let mut report = PollReport::default();

        // Additions
        for resource in present.iter() {
            if self.known.contains_key(resource) {
                continue;
            }

            let connector = match self.factory.open(resource) {
                Ok(connector) => connector,
                Err(LinkError::Precondition(e)) => {
                    tracing::error!(resource = %resource, error = %e, "Factory misconfigured");
                    return Err(PollError::Precondition(e));
                }
                Err(e) => {
                    tracing::debug!(resource = %resource, "Open failed; retrying next poll");
                    report.failed.push(e);
                    continue;
                }
            };

            let shared = Rc::new(RefCell::new(connector));
            let event = ResourceEvent::Available {
                source: resource.clone(),
                resource: shared.clone(),
            };
            self.known.insert(resource.clone(), shared);
            tracing::debug!(resource = %resource, "Resource available");

            report.dispatch.merge(self.listeners.dispatch(&event));
            report.added.push(resource.clone());
        }

        // Removals
        let gone: Vec<ResourceId> = self
            .known
            .keys()
            .filter(|resource| !present.contains(*resource))
            .cloned()
            .collect();

        for resource in gone {
            let event = ResourceEvent::Unavailable {
                source: resource.clone(),
            };
            if let Some(connector) = self.known.remove(&resource) {
                Self::discard(&resource, &connector);
            }
            tracing::debug!(resource = %resource, "Resource unavailable");

            report.dispatch.merge(self.listeners.dispatch(&event));
            report.removed.push(resource);
        }

        Ok(report)
    }

    /// Close the handle of a connector whose device is gone.
    ///
    /// Listeners may still hold the connector; they will see it Disconnected.
    fn discard(resource: &ResourceId, connector: &SharedConnector<F::Binding>) {
        match connector.try_borrow_mut() {
            Ok(mut connector) => {
                if let Err(e) = connector.disconnect() {
                    tracing::debug!(
                        resource = %resource,
                        error = %e,
                        "Close of vanished resource reported an error"
                    );
                }
            }
            Err(_) => {
                tracing::warn!(
                    resource = %resource,
                    "Connector borrowed elsewhere; left for its holder to close"
                );
            }
        }
    }
}
