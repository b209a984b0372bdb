//! In-memory transport used by the unit tests.

use crate::factory::ConnectorFactory;
use crate::Connector;
use core_types::{PortEnumerator, ResourceId, TransportBinding, TransportError};
use link_protocol::PreconditionViolation;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Shared counters and switches behind a [`MockBinding`]
#[derive(Default)]
pub struct Probe {
    opens: Cell<usize>,
    closes: Cell<usize>,
    fail_open: RefCell<Option<TransportError>>,
    fail_close: RefCell<Option<TransportError>>,
    present: Cell<bool>,
    enumeration_fails: Cell<bool>,
}

impl Probe {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn opens(&self) -> usize {
        self.opens.get()
    }

    pub fn closes(&self) -> usize {
        self.closes.get()
    }

    pub fn fail_next_open(&self, e: TransportError) {
        *self.fail_open.borrow_mut() = Some(e);
    }

    pub fn fail_next_close(&self, e: TransportError) {
        *self.fail_close.borrow_mut() = Some(e);
    }

    pub fn set_present(&self, present: bool) {
        self.present.set(present);
    }

    pub fn set_enumeration_fails(&self, fails: bool) {
        self.enumeration_fails.set(fails);
    }
}

#[derive(Debug)]
pub struct MockConduit {
    pub id: usize,
}

pub struct MockBinding {
    resource: ResourceId,
    open: bool,
    probe: Rc<Probe>,
}

impl MockBinding {
    pub fn new(resource: &str, probe: Rc<Probe>) -> Self {
        Self {
            resource: ResourceId::from(resource),
            open: false,
            probe,
        }
    }

    pub fn already_open(mut self) -> Self {
        self.open = true;
        self
    }
}

impl TransportBinding for MockBinding {
    type Conduit = MockConduit;

    fn resource(&self) -> &ResourceId {
        &self.resource
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn attempt_open(&mut self) -> Result<MockConduit, TransportError> {
        self.probe.opens.set(self.probe.opens.get() + 1);
        if let Some(e) = self.probe.fail_open.borrow_mut().take() {
            return Err(e);
        }
        self.open = true;
        Ok(MockConduit {
            id: self.probe.opens.get(),
        })
    }

    fn attempt_close(&mut self) -> Result<(), TransportError> {
        self.probe.closes.set(self.probe.closes.get() + 1);
        self.open = false;
        match self.probe.fail_close.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn is_available(&self) -> bool {
        !self.probe.enumeration_fails.get() && self.probe.present.get()
    }
}

/// Factory handing out mock connectors, one [`Probe`] per resource
#[derive(Default)]
pub struct MockFactory {
    pub probes: RefCell<HashMap<ResourceId, Rc<Probe>>>,
    pub releases: Cell<usize>,
    open_bindings: RefCell<HashSet<ResourceId>>,
}

impl MockFactory {
    /// Build `resource` around a binding that is already open
    pub fn hand_out_open(&self, resource: &str) {
        self.open_bindings.borrow_mut().insert(ResourceId::from(resource));
    }

    pub fn probe(&self, resource: &str) -> Rc<Probe> {
        self.probes
            .borrow_mut()
            .entry(ResourceId::from(resource))
            .or_insert_with(Probe::new)
            .clone()
    }
}

impl ConnectorFactory for MockFactory {
    type Binding = MockBinding;

    fn build(
        &self,
        resource: &ResourceId,
    ) -> Result<Connector<MockBinding>, PreconditionViolation> {
        let binding = MockBinding::new(resource.as_str(), self.probe(resource.as_str()));
        if self.open_bindings.borrow().contains(resource) {
            Connector::new(binding.already_open())
        } else {
            Connector::new(binding)
        }
    }

    fn release(&self, connector: &mut Connector<MockBinding>) {
        self.releases.set(self.releases.get() + 1);
        let _ = connector.disconnect();
    }
}

/// Enumerator whose snapshot the test rewrites between polls
#[derive(Clone)]
pub struct MockPorts {
    pub present: Rc<RefCell<Result<HashSet<ResourceId>, TransportError>>>,
}

impl Default for MockPorts {
    fn default() -> Self {
        Self {
            present: Rc::new(RefCell::new(Ok(HashSet::new()))),
        }
    }
}

impl MockPorts {
    pub fn set(&self, ids: &[&str]) {
        *self.present.borrow_mut() = Ok(ids.iter().copied().map(ResourceId::from).collect());
    }

    pub fn fail(&self, e: TransportError) {
        *self.present.borrow_mut() = Err(e);
    }
}

impl PortEnumerator for MockPorts {
    fn enumerate_present(&self) -> Result<HashSet<ResourceId>, TransportError> {
        self.present.borrow().clone()
    }
}
