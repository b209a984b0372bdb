use crate::Connector;
use core_types::{ResourceId, TransportBinding};
use std::cell::RefCell;
use std::rc::Rc;

/// Connector handed out with an availability event.
///
/// Listeners may keep a clone. Single-threaded by construction (`Rc`), which
/// is what keeps concurrent polling out.
pub type SharedConnector<B> = Rc<RefCell<Connector<B>>>;

/// Presence transition observed by a watchdog poll
///
/// Created fresh for every transition and only ever lent to listeners.
pub enum ResourceEvent<B: TransportBinding> {
    /// A resource appeared and a connector was opened for it
    Available {
        source: ResourceId,
        resource: SharedConnector<B>,
    },

    /// A previously known resource is gone; its connector has been discarded
    Unavailable { source: ResourceId },
}

impl<B: TransportBinding> ResourceEvent<B> {
    pub fn source(&self) -> &ResourceId {
        match self {
            Self::Available { source, .. } | Self::Unavailable { source } => source,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    pub fn connector(&self) -> Option<&SharedConnector<B>> {
        match self {
            Self::Available { resource, .. } => Some(resource),
            Self::Unavailable { .. } => None,
        }
    }
}

// Manual Debug: the connector may be mutably borrowed by a listener
impl<B: TransportBinding> std::fmt::Debug for ResourceEvent<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available { source, .. } => f
                .debug_struct("Available")
                .field("source", source)
                .field("resource", &"<Connector>")
                .finish(),
            Self::Unavailable { source } => f
                .debug_struct("Unavailable")
                .field("source", source)
                .finish(),
        }
    }
}
