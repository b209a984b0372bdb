use crate::Connector;
use core_types::{ResourceId, TransportBinding};
use link_protocol::{ConnectorError, LinkError, PreconditionViolation};
use std::ops::{Deref, DerefMut};
use tracing::Span;

/// Builds fully configured connectors for resource identifiers.
///
/// Implementors supply `build`; the enter/release hooks and the scoped
/// acquisition come with defaults that log the way the monitor expects.
///
/// # Lifecycle of one use
///
/// 1. **build()** - configure the transport, wrap it in a closed connector
/// 2. **enter()** - exactly one connect attempt
/// 3. **release()** - exactly one disconnect, on every exit path
pub trait ConnectorFactory {
    type Binding: TransportBinding;

    /// Configure a transport for `resource` and wrap it, without opening it.
    fn build(&self, resource: &ResourceId)
        -> Result<Connector<Self::Binding>, PreconditionViolation>;

    /// Span the default hooks log into
    fn span(&self) -> Span {
        Span::current()
    }

    /// Connect a freshly built connector. Errors are logged and returned.
    fn enter(&self, connector: &mut Connector<Self::Binding>) -> Result<(), ConnectorError> {
        let span = self.span();
        let _enter = span.enter();

        tracing::debug!(resource = %connector.resource(), "Detected device");
        match connector.connect().map(|_| ()) {
            Ok(()) => {
                tracing::debug!(
                    resource = %connector.resource(),
                    protocol = connector.protocol().unwrap_or("-"),
                    "Connected device"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    resource = %connector.resource(),
                    error = %e,
                    "Unable to connect to device"
                );
                Err(e)
            }
        }
    }

    /// Disconnect unconditionally. Close errors are logged, not returned.
    fn release(&self, connector: &mut Connector<Self::Binding>) {
        let span = self.span();
        let _enter = span.enter();

        tracing::debug!(resource = %connector.resource(), "Disconnected device");
        if let Err(e) = connector.disconnect() {
            tracing::warn!(
                resource = %connector.resource(),
                error = %e,
                "Release failed to close cleanly"
            );
        }
    }

    /// Build and connect, handing the live connector to the caller.
    ///
    /// If the connect fails the connector is released before the error is
    /// returned, so nothing half-open escapes.
    fn open(&self, resource: &ResourceId) -> Result<Connector<Self::Binding>, LinkError> {
        let mut connector = self.build(resource)?;
        if let Err(e) = self.enter(&mut connector) {
            self.release(&mut connector);
            return Err(e.into());
        }
        Ok(connector)
    }

    /// Build and connect inside a guard that releases on drop.
    ///
    /// ```ignore
    /// let mut link = factory.acquire(&"/dev/ttyUSB0".into())?;
    /// link.connect()?.write_all(b"ping\r")?;
    /// // released here, also on early return or panic
    /// ```
    fn acquire(&self, resource: &ResourceId) -> Result<ScopedConnector<'_, Self>, LinkError>
    where
        Self: Sized,
    {
        let connector = self.build(resource)?;
        let mut scoped = ScopedConnector {
            factory: self,
            connector,
        };
        // On failure `scoped` drops here and releases
        self.enter(&mut scoped.connector)?;
        Ok(scoped)
    }
}

/// Connector on loan from a factory; released exactly once when dropped
pub struct ScopedConnector<'f, F: ConnectorFactory> {
    factory: &'f F,
    connector: Connector<F::Binding>,
}

impl<F: ConnectorFactory> Deref for ScopedConnector<'_, F> {
    type Target = Connector<F::Binding>;

    fn deref(&self) -> &Self::Target {
        &self.connector
    }
}

impl<F: ConnectorFactory> DerefMut for ScopedConnector<'_, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.connector
    }
}

impl<F: ConnectorFactory> Drop for ScopedConnector<'_, F> {
    fn drop(&mut self) {
        self.factory.release(&mut self.connector);
    }
}
