use core_types::{ResourceId, TransportBinding, TransportError};
use link_protocol::{ConnectorError, ConnectorState, PreconditionViolation};
use link_runtime::logging::connector_span;
use tracing::Span;

/// Identifies what a freshly opened link speaks.
///
/// Runs once per successful open, before the connector reports Connected.
/// An error aborts the connect: the link is closed again and the caller gets
/// [`ConnectorError::Sniff`].
pub trait ProtocolSniffer<C> {
    fn sniff(&mut self, conduit: &mut C) -> Result<String, TransportError>;
}

impl<C, F> ProtocolSniffer<C> for F
where
    F: FnMut(&mut C) -> Result<String, TransportError>,
{
    fn sniff(&mut self, conduit: &mut C) -> Result<String, TransportError> {
        self(conduit)
    }
}

/// Connection state machine over a transport binding
///
/// Responsibilities:
/// - Own the binding exclusively, from construction until drop
/// - Open on `connect()`, close on `disconnect()`, both idempotent
/// - Translate transport failures into [`ConnectorError`] with the cause kept
/// - Record the detected protocol while connected
///
/// ## State Machine
///
/// See [`ConnectorState`]. The state is never stored: it is read from the
/// binding, which makes `Connected ⇔ transport open` hold by construction.
pub struct Connector<B: TransportBinding> {
    binding: B,
    conduit: Option<B::Conduit>,
    protocol: Option<String>,
    sniffer: Option<Box<dyn ProtocolSniffer<B::Conduit>>>,
    span: Span,
}

impl<B: TransportBinding> Connector<B> {
    /// Wrap a closed binding.
    ///
    /// An already-open binding is a setup error and is refused before any
    /// connect logic runs.
    pub fn new(binding: B) -> Result<Self, PreconditionViolation> {
        if binding.is_open() {
            return Err(PreconditionViolation::already_open(binding.resource().clone()));
        }

        let span = connector_span(binding.resource());
        Ok(Self {
            binding,
            conduit: None,
            protocol: None,
            sniffer: None,
            span,
        })
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_sniffer<S>(mut self, sniffer: S) -> Self
    where
        S: ProtocolSniffer<B::Conduit> + 'static,
    {
        self.sniffer = Some(Box::new(sniffer));
        self
    }

    pub fn resource(&self) -> &ResourceId {
        self.binding.resource()
    }

    pub fn state(&self) -> ConnectorState {
        ConnectorState::from_open(self.binding.is_open())
    }

    pub fn is_connected(&self) -> bool {
        self.binding.is_open()
    }

    /// Presence probe that works without an open link. Never fails.
    pub fn is_available(&self) -> bool {
        self.binding.is_available()
    }

    /// Protocol reported by the sniffer, while connected
    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    /// Conduit of the current connection, if any
    pub fn conduit(&mut self) -> Option<&mut B::Conduit> {
        self.conduit.as_mut()
    }

    /// Open the link, or return the live conduit if already connected.
    pub fn connect(&mut self) -> Result<&mut B::Conduit, ConnectorError> {
        let span = self.span.clone();
        let _enter = span.enter();

        if self.conduit.is_none() || !self.binding.is_open() {
            self.open()?;
        }

        self.conduit.as_mut().ok_or_else(|| ConnectorError::Open {
            resource: self.binding.resource().clone(),
            source: TransportError::NotConnected,
        })
    }

    /// Close the link if open. No-op when already disconnected.
    ///
    /// The connector is Disconnected afterwards even if the close itself
    /// reported an error; that error is returned for diagnostics only.
    pub fn disconnect(&mut self) -> Result<(), ConnectorError> {
        let span = self.span.clone();
        let _enter = span.enter();

        if !self.binding.is_open() {
            return Ok(());
        }

        // Conduit first so no handle outlives the binding's
        self.conduit = None;
        self.protocol = None;

        match self.binding.attempt_close() {
            Ok(()) => {
                tracing::info!("Disconnected");
                Ok(())
            }
            Err(source) => {
                tracing::warn!(error = %source, "Error while closing transport");
                Err(ConnectorError::Close {
                    resource: self.binding.resource().clone(),
                    source,
                })
            }
        }
    }

    fn open(&mut self) -> Result<(), ConnectorError> {
        let resource = self.binding.resource().clone();

        let mut conduit = self.binding.attempt_open().map_err(|source| {
            tracing::debug!(error = %source, "Unable to open transport");
            ConnectorError::Open {
                resource: resource.clone(),
                source,
            }
        })?;

        let protocol = match self.sniffer.as_mut() {
            Some(sniffer) => match sniffer.sniff(&mut conduit) {
                Ok(protocol) => Some(protocol),
                Err(source) => {
                    drop(conduit);
                    if let Err(e) = self.binding.attempt_close() {
                        tracing::warn!(error = %e, "Close after failed protocol detection");
                    }
                    tracing::warn!(error = %source, "Protocol detection failed");
                    return Err(ConnectorError::Sniff { resource, source });
                }
            },
            None => None,
        };

        tracing::info!(protocol = protocol.as_deref().unwrap_or("-"), "Connected");
        self.conduit = Some(conduit);
        self.protocol = protocol;
        Ok(())
    }
}

impl<B: TransportBinding> Drop for Connector<B> {
    fn drop(&mut self) {
        if self.binding.is_open() {
            let _ = self.disconnect();
        }
    }
}

impl<B: TransportBinding> std::fmt::Debug for Connector<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("resource", self.resource())
            .field("state", &self.state())
            .field("protocol", &self.protocol)
            .finish()
    }
}
