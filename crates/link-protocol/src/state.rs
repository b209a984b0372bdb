/// # Connector State Machine
///
/// ```text
///            connect() ok
///   ┌──────────────┐ ─────────────► ┌───────────┐
///   │ Disconnected │                │ Connected │
///   └──────────────┘ ◄───────────── └───────────┘
///      ▲       │        disconnect()    │    ▲
///      └───────┘                        └────┘
///   connect() err /               connect() (returns existing conduit)
///   disconnect() no-op
/// ```
///
/// There is no `Connecting` state: opening is synchronous and either succeeds
/// or fails atomically from the caller's view.
///
/// ## Invariant
///
/// `Connected` holds exactly when the underlying transport reports open. The
/// connector derives its state from the binding instead of storing it, so the
/// two can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ConnectorState {
    /// Transport closed, no conduit, no protocol
    Disconnected,

    /// Transport open, conduit handed out
    Connected,
}

impl ConnectorState {
    pub fn from_open(is_open: bool) -> Self {
        if is_open {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// User-facing status text
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connected => "Connected",
        }
    }
}

impl std::fmt::Display for ConnectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status_text())
    }
}
