//! Integration tests for the connector system
//!
//! These drive a watchdog end-to-end over an in-memory transport: snapshot
//! sequences in, events and known sets out.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use connectors::{Connector, ConnectorFactory, ResourceEvent, Watchdog};
use core_types::{PortEnumerator, ResourceId, TransportBinding, TransportError};
use link_protocol::{LinkError, ListenerError, PollError, PreconditionViolation};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

// --- in-memory transport -------------------------------------------------

#[derive(Default)]
struct Bench {
    opens: Cell<usize>,
    closes: Cell<usize>,
    releases: Cell<usize>,
    refuse: RefCell<HashSet<String>>,
    present: RefCell<HashSet<ResourceId>>,
}

struct FakeLink {
    resource: ResourceId,
    open: bool,
    bench: Rc<Bench>,
}

impl TransportBinding for FakeLink {
    type Conduit = Vec<u8>;

    fn resource(&self) -> &ResourceId {
        &self.resource
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn attempt_open(&mut self) -> Result<Vec<u8>, TransportError> {
        self.bench.opens.set(self.bench.opens.get() + 1);
        if self.bench.refuse.borrow().contains(self.resource.as_str()) {
            return Err(TransportError::ConnectionFailed(format!(
                "{} refused",
                self.resource
            )));
        }
        self.open = true;
        Ok(Vec::new())
    }

    fn attempt_close(&mut self) -> Result<(), TransportError> {
        self.bench.closes.set(self.bench.closes.get() + 1);
        self.open = false;
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.bench.present.borrow().contains(&self.resource)
    }
}

struct FakeFactory(Rc<Bench>);

impl ConnectorFactory for FakeFactory {
    type Binding = FakeLink;

    fn build(
        &self,
        resource: &ResourceId,
    ) -> Result<Connector<FakeLink>, PreconditionViolation> {
        Connector::new(FakeLink {
            resource: resource.clone(),
            open: false,
            bench: self.0.clone(),
        })
    }

    fn release(&self, connector: &mut Connector<FakeLink>) {
        self.0.releases.set(self.0.releases.get() + 1);
        let _ = connector.disconnect();
    }
}

/// Misconfigured factory: hands the connector a link that is already open
struct LeakyFactory(Rc<Bench>);

impl ConnectorFactory for LeakyFactory {
    type Binding = FakeLink;

    fn build(
        &self,
        resource: &ResourceId,
    ) -> Result<Connector<FakeLink>, PreconditionViolation> {
        Connector::new(FakeLink {
            resource: resource.clone(),
            open: true,
            bench: self.0.clone(),
        })
    }
}

struct FakePorts(Rc<Bench>);

impl PortEnumerator for FakePorts {
    fn enumerate_present(&self) -> Result<HashSet<ResourceId>, TransportError> {
        Ok(self.0.present.borrow().clone())
    }
}

type Events = Rc<RefCell<Vec<(bool, ResourceId)>>>;

fn rig() -> (Watchdog<FakeFactory, FakePorts>, Rc<Bench>, Events) {
    let bench = Rc::new(Bench::default());
    let mut watchdog = Watchdog::new(FakeFactory(bench.clone()), FakePorts(bench.clone()));
    let events: Events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    watchdog.subscribe(move |event: &ResourceEvent<FakeLink>| {
        sink.borrow_mut().push((event.is_available(), event.source().clone()));
        Ok(())
    });
    (watchdog, bench, events)
}

fn snapshot(ids: &[&str]) -> HashSet<ResourceId> {
    ids.iter().copied().map(ResourceId::from).collect()
}

// --- scenarios ------------------------------------------------------------

#[test]
fn test_device_plugged_in() {
    let (mut watchdog, bench, events) = rig();
    *bench.present.borrow_mut() = snapshot(&["/dev/ttyUSB0"]);

    watchdog.poll().unwrap();

    assert_eq!(
        *events.borrow(),
        vec![(true, ResourceId::from("/dev/ttyUSB0"))]
    );
    let known: HashSet<ResourceId> = watchdog.known().cloned().collect();
    assert_eq!(known, snapshot(&["/dev/ttyUSB0"]));
}

#[test]
fn test_device_unplugged() {
    let (mut watchdog, bench, events) = rig();
    *bench.present.borrow_mut() = snapshot(&["/dev/ttyUSB0"]);
    watchdog.poll().unwrap();
    events.borrow_mut().clear();

    bench.present.borrow_mut().clear();
    watchdog.poll().unwrap();

    assert_eq!(
        *events.borrow(),
        vec![(false, ResourceId::from("/dev/ttyUSB0"))]
    );
    assert_eq!(watchdog.known_count(), 0);
    assert_eq!(bench.closes.get(), 1);
}

#[test]
fn test_transitions_over_snapshot_sequence() {
    let (mut watchdog, bench, events) = rig();
    let sequence: Vec<HashSet<ResourceId>> = vec![
        snapshot(&[]),
        snapshot(&["a"]),
        snapshot(&["a", "b", "c"]),
        snapshot(&["c"]),
        snapshot(&["c", "d"]),
        snapshot(&["a", "b"]),
        snapshot(&["a", "b"]),
        snapshot(&[]),
        snapshot(&["d"]),
    ];

    let mut previous = HashSet::new();
    for current in sequence {
        events.borrow_mut().clear();
        *bench.present.borrow_mut() = current.clone();

        watchdog.poll().unwrap();

        let emitted = events.borrow();
        let appeared: HashSet<ResourceId> = emitted
            .iter()
            .filter(|(available, _)| *available)
            .map(|(_, id)| id.clone())
            .collect();
        let vanished: HashSet<ResourceId> = emitted
            .iter()
            .filter(|(available, _)| !*available)
            .map(|(_, id)| id.clone())
            .collect();

        // Exactly one event per transition, nothing else
        assert_eq!(emitted.len(), appeared.len() + vanished.len());
        assert_eq!(appeared, current.difference(&previous).cloned().collect());
        assert_eq!(vanished, previous.difference(&current).cloned().collect());

        let known: HashSet<ResourceId> = watchdog.known().cloned().collect();
        assert_eq!(known, current);
        previous = current;
    }
}

#[test]
fn test_known_excludes_failed_connectors() {
    let (mut watchdog, bench, events) = rig();
    bench.refuse.borrow_mut().insert("b".to_string());
    *bench.present.borrow_mut() = snapshot(&["a", "b"]);

    let report = watchdog.poll().unwrap();

    let known: HashSet<ResourceId> = watchdog.known().cloned().collect();
    assert_eq!(known, snapshot(&["a"]));
    assert_eq!(*events.borrow(), vec![(true, ResourceId::from("a"))]);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(
        &report.failed[0],
        LinkError::Connector(e) if e.resource().as_str() == "b"
    ));

    // Device recovers: picked up on the next poll
    bench.refuse.borrow_mut().clear();
    watchdog.poll().unwrap();
    let known: HashSet<ResourceId> = watchdog.known().cloned().collect();
    assert_eq!(known, snapshot(&["a", "b"]));
}

#[test]
fn test_listener_isolation_across_poll() {
    let (mut watchdog, bench, _events) = rig();
    watchdog.subscribe(|_: &ResourceEvent<FakeLink>| -> Result<(), ListenerError> {
        panic!("listener bug")
    });
    let late = Rc::new(Cell::new(0));
    let counter = late.clone();
    watchdog.subscribe(move |_: &ResourceEvent<FakeLink>| {
        counter.set(counter.get() + 1);
        Ok(())
    });

    *bench.present.borrow_mut() = snapshot(&["a", "b"]);
    let report = watchdog.poll().unwrap();

    assert_eq!(late.get(), 2);
    assert_eq!(report.dispatch.failed, 2);
    assert_eq!(watchdog.known_count(), 2);
}

#[test]
fn test_scoped_acquire_failure_releases_and_reraises() {
    let bench = Rc::new(Bench::default());
    bench.refuse.borrow_mut().insert("/dev/ttyUSB0".to_string());
    let factory = FakeFactory(bench.clone());

    let result = factory.acquire(&"/dev/ttyUSB0".into());

    let err = match result {
        Err(e) => e,
        Ok(_) => panic!("acquire should fail"),
    };
    assert_eq!(bench.opens.get(), 1, "exactly one connect attempt");
    assert_eq!(bench.releases.get(), 1, "exactly one release");
    match err {
        LinkError::Connector(e) => {
            assert_eq!(
                e.cause(),
                &TransportError::ConnectionFailed("/dev/ttyUSB0 refused".into())
            );
        }
        other => panic!("Wrong variant: {:?}", other),
    }
}

#[test]
fn test_scoped_acquire_pairs_connect_and_release() {
    let bench = Rc::new(Bench::default());
    let factory = FakeFactory(bench.clone());

    {
        let mut link = factory.acquire(&"/dev/ttyACM0".into()).unwrap();
        link.connect().unwrap().extend_from_slice(b"ping");
        assert_eq!(link.conduit().unwrap().as_slice(), b"ping");
    }

    assert_eq!(bench.opens.get(), 1);
    assert_eq!(bench.releases.get(), 1);
    assert_eq!(bench.closes.get(), 1);
}

#[test]
fn test_dropping_watchdog_closes_live_connectors() {
    let (mut watchdog, bench, _events) = rig();
    *bench.present.borrow_mut() = snapshot(&["a", "b"]);
    watchdog.poll().unwrap();
    assert_eq!(bench.closes.get(), 0);

    drop(watchdog);
    assert_eq!(bench.closes.get(), 2);
}

#[test]
fn test_connector_availability_reflects_enumeration() {
    let (mut watchdog, bench, _events) = rig();
    *bench.present.borrow_mut() = snapshot(&["a"]);
    watchdog.poll().unwrap();

    let connector = watchdog.connector(&"a".into()).unwrap();
    assert!(connector.borrow().is_available());

    bench.present.borrow_mut().clear();
    assert!(!connector.borrow().is_available());
}

#[test]
fn test_precondition_violation_is_fatal_not_retried() {
    let bench = Rc::new(Bench::default());
    let mut watchdog = Watchdog::new(LeakyFactory(bench.clone()), FakePorts(bench.clone()));
    let events = Rc::new(Cell::new(0));
    let counter = events.clone();
    watchdog.subscribe(move |_: &ResourceEvent<FakeLink>| {
        counter.set(counter.get() + 1);
        Ok(())
    });
    *bench.present.borrow_mut() = snapshot(&["a"]);

    for _ in 0..3 {
        match watchdog.poll() {
            Err(PollError::Precondition(e)) => assert_eq!(e.resource.as_str(), "a"),
            Err(other) => panic!("Wrong variant: {:?}", other),
            Ok(report) => panic!("poll should stop, got {:?}", report),
        }
    }

    assert_eq!(watchdog.known_count(), 0);
    assert_eq!(events.get(), 0);
    assert_eq!(bench.opens.get(), 0, "no connect attempt on a rejected binding");
}
