//! Serial-port specialisations of the connector pieces.

use crate::events::ResourceEvent;
use crate::factory::ConnectorFactory;
use crate::watchdog::Watchdog;
use crate::{Connector, ProtocolSniffer};
use core_types::{DeviceProfile, ResourceId, TransportBinding};
use link_protocol::{ListenerError, PreconditionViolation};
use link_runtime::logging::{connector_span, factory_span};
use std::rc::Rc;
use tracing::Span;
use transport_native::{SerialBinding, SerialConduit, SystemPorts};

pub type SerialConnector = Connector<SerialBinding>;

pub type SerialWatchdog = Watchdog<SerialConnectorFactory, SystemPorts>;

type SnifferBuilder = Rc<dyn Fn() -> Box<dyn ProtocolSniffer<SerialConduit>>>;

/// Builds serial connectors configured with one device profile.
///
/// The profile is applied to the port before it is ever opened.
pub struct SerialConnectorFactory {
    profile: DeviceProfile,
    sniffer: Option<SnifferBuilder>,
    span: Span,
}

impl SerialConnectorFactory {
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            sniffer: None,
            span: factory_span("serial"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Run a fresh sniffer on every connector this factory builds.
    pub fn with_sniffer<S, M>(mut self, make: M) -> Self
    where
        S: ProtocolSniffer<SerialConduit> + 'static,
        M: Fn() -> S + 'static,
    {
        self.sniffer = Some(Rc::new(move || {
            Box::new(make()) as Box<dyn ProtocolSniffer<SerialConduit>>
        }));
        self
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }
}

impl ConnectorFactory for SerialConnectorFactory {
    type Binding = SerialBinding;

    fn build(&self, resource: &ResourceId) -> Result<SerialConnector, PreconditionViolation> {
        let binding = SerialBinding::new(resource.clone(), self.profile.clone());
        let span = self.span.in_scope(|| connector_span(resource));
        let connector = Connector::new(binding)?.with_span(span);

        Ok(match &self.sniffer {
            Some(make) => connector.with_sniffer(BoxedSniffer(make())),
            None => connector,
        })
    }

    fn span(&self) -> Span {
        self.span.clone()
    }
}

struct BoxedSniffer(Box<dyn ProtocolSniffer<SerialConduit>>);

impl ProtocolSniffer<SerialConduit> for BoxedSniffer {
    fn sniff(&mut self, conduit: &mut SerialConduit) -> Result<String, core_types::TransportError> {
        self.0.sniff(conduit)
    }
}

impl Watchdog<SerialConnectorFactory, SystemPorts> {
    /// Watchdog over the OS serial ports, connecting with `profile`
    pub fn serial(profile: DeviceProfile) -> Self {
        Watchdog::new(SerialConnectorFactory::new(profile), SystemPorts)
    }
}

/// Listener that logs every transition at info level.
pub fn log_connection_events<B: TransportBinding>(
    event: &ResourceEvent<B>,
) -> Result<(), ListenerError> {
    match event {
        ResourceEvent::Available { source, resource } => {
            tracing::info!(resource = %source, "Detected device");
            let protocol = resource
                .try_borrow()
                .ok()
                .and_then(|c| c.protocol().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string());
            tracing::info!(resource = %source, protocol = %protocol, "Connected device");
        }
        ResourceEvent::Unavailable { source } => {
            tracing::info!(resource = %source, "Disconnected device");
        }
    }
    Ok(())
}
