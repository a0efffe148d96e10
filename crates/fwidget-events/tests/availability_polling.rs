//! Deferred binding through availability polling, driven by a deterministic
//! clock.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use fwidget_dom::{DeterministicClock, Document, EventType, NodeId, RawEvent, Tag, share};
use fwidget_events::{AvailabilityState, ContextOverride, EventBus, EventBusConfig, Listener};

const TICK: Duration = Duration::from_millis(40);

fn bus_with(config: EventBusConfig) -> (EventBus, Rc<DeterministicClock>) {
    let clock = Rc::new(DeterministicClock::new());
    let bus = EventBus::new(share(Document::new()), clock.clone(), config);
    (bus, clock)
}

fn insert(bus: &EventBus, id: &str) -> NodeId {
    let mut doc = bus.document().borrow_mut();
    let node = doc.create_element(Tag::Div);
    doc.set_id_attr(node, id).expect("id");
    let body = doc.body();
    doc.append_child(body, node).expect("append");
    node
}

#[test]
fn subscription_to_missing_id_attaches_after_insertion() {
    let (bus, clock) = bus_with(EventBusConfig::default());
    let hits = Rc::new(RefCell::new(0));
    let listener = {
        let hits = Rc::clone(&hits);
        Listener::new(move |_, _| *hits.borrow_mut() += 1)
    };
    assert!(bus.subscribe("later", EventType::Click, &listener));
    assert_eq!(bus.pending_count(), 1);

    clock.advance(TICK);
    assert_eq!(bus.pump(), 1);
    assert_eq!(bus.pending_count(), 1);

    let node = insert(&bus, "later");
    clock.advance(TICK);
    bus.pump();
    assert_eq!(bus.pending_count(), 0);

    bus.dispatch(RawEvent::new(EventType::Click, Some(node)));
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn pump_runs_nothing_before_the_interval() {
    let (bus, clock) = bus_with(EventBusConfig::default());
    let handle = bus.on_available("x", |_| {});
    clock.advance(Duration::from_millis(39));
    assert_eq!(bus.pump(), 0);
    clock.advance(Duration::from_millis(1));
    assert_eq!(bus.pump(), 1);
    assert_eq!(handle.state(), AvailabilityState::Pending);
}

#[test]
fn callbacks_receive_element_context_and_payload() {
    let (bus, clock) = bus_with(EventBusConfig::default());
    let seen: Rc<RefCell<Vec<(NodeId, Option<NodeId>, Option<u8>)>>> = Rc::default();
    let log = Rc::clone(&seen);
    let handles = bus.wait_for_element(
        ["a", "b"],
        move |ready| {
            let payload = ready.payload.and_then(|p| p.downcast_ref::<u8>()).copied();
            log.borrow_mut()
                .push((ready.node, ready.context.element(), payload));
        },
        Some(Rc::new(3_u8)),
        ContextOverride::None,
        false,
    );
    let a = insert(&bus, "a");
    let b = insert(&bus, "b");
    clock.advance(TICK);
    bus.pump();
    assert_eq!(
        *seen.borrow(),
        vec![(a, Some(a), Some(3)), (b, Some(b), Some(3))]
    );
    let states: Vec<_> = handles.iter().map(|h| h.state()).collect();
    assert_eq!(
        states,
        vec![AvailabilityState::Resolved(a), AvailabilityState::Resolved(b)]
    );
}

#[test]
fn content_ready_waits_for_a_sibling_or_load() {
    let (bus, clock) = bus_with(EventBusConfig::default());
    let node = insert(&bus, "list");
    let handle = bus.on_content_ready("list", |_| {});
    clock.advance(TICK);
    bus.pump();
    assert_eq!(handle.state(), AvailabilityState::Pending);

    insert(&bus, "after");
    clock.advance(TICK);
    bus.pump();
    assert_eq!(handle.state(), AvailabilityState::Resolved(node));

    let (bus, _clock) = bus_with(EventBusConfig::default());
    let node = insert(&bus, "last");
    let handle = bus.on_content_ready("last", |_| {});
    bus.document_loaded();
    assert_eq!(handle.state(), AvailabilityState::Resolved(node));
}

#[test]
fn budget_spent_before_load_expires_on_load() {
    let config = EventBusConfig {
        poll_retries: 3,
        ..EventBusConfig::default()
    };
    let (bus, clock) = bus_with(config);
    let handle = bus.on_available("never", |_| {});

    // Polling outlives the budget until the document loads.
    for _ in 0..10 {
        clock.advance(TICK);
        bus.pump();
    }
    assert_eq!(handle.state(), AvailabilityState::Pending);

    bus.document_loaded();
    assert_eq!(handle.state(), AvailabilityState::Expired);
    assert_eq!(bus.pending_count(), 0);
    clock.advance(TICK);
    assert_eq!(bus.pump(), 0);
}

#[test]
fn budget_left_at_load_keeps_polling() {
    let config = EventBusConfig {
        poll_retries: 5,
        ..EventBusConfig::default()
    };
    let (bus, clock) = bus_with(config);
    let handle = bus.on_available("late", |_| {});
    for _ in 0..2 {
        clock.advance(TICK);
        bus.pump();
    }

    // Two retries spent before load, one on the flush tick.
    bus.document_loaded();
    assert_eq!(handle.state(), AvailabilityState::Pending);
    for _ in 0..2 {
        clock.advance(TICK);
        bus.pump();
        assert_eq!(handle.state(), AvailabilityState::Pending);
    }
    clock.advance(TICK);
    bus.pump();
    assert_eq!(handle.state(), AvailabilityState::Expired);
}

#[test]
fn new_requests_refill_the_budget() {
    let config = EventBusConfig {
        poll_retries: 2,
        ..EventBusConfig::default()
    };
    let (bus, clock) = bus_with(config);
    bus.document_loaded();
    let first = bus.on_available("slow", |_| {});
    clock.advance(TICK);
    bus.pump();
    let second = bus.on_available("other", |_| {});
    clock.advance(TICK);
    bus.pump();
    let node = insert(&bus, "slow");
    clock.advance(TICK);
    bus.pump();
    assert_eq!(first.state(), AvailabilityState::Resolved(node));
    assert_eq!(second.state(), AvailabilityState::Pending);
    clock.advance(TICK);
    bus.pump();
    assert_eq!(second.state(), AvailabilityState::Expired);
}

#[test]
fn cancelled_requests_never_run() {
    let (bus, clock) = bus_with(EventBusConfig::default());
    let ran = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&ran);
    let handle = bus.on_available("soon", move |_| *flag.borrow_mut() = true);
    assert!(handle.cancel());
    insert(&bus, "soon");
    clock.advance(TICK);
    bus.pump();
    assert!(!*ran.borrow());
    assert_eq!(handle.state(), AvailabilityState::Cancelled);
}

#[test]
fn handle_is_a_future() {
    let (bus, clock) = bus_with(EventBusConfig::default());
    let mut handle = bus.on_available("f", |_| {});
    let mut cx = Context::from_waker(Waker::noop());
    assert_eq!(Pin::new(&mut handle).poll(&mut cx), Poll::Pending);
    let node = insert(&bus, "f");
    clock.advance(TICK);
    bus.pump();
    assert_eq!(
        Pin::new(&mut handle).poll(&mut cx),
        Poll::Ready(AvailabilityState::Resolved(node))
    );
}

#[test]
fn dom_ready_callbacks_fire_once_and_late_ones_run_immediately() {
    let (bus, _clock) = bus_with(EventBusConfig::default());
    let count = Rc::new(RefCell::new(0));
    let early = Rc::clone(&count);
    bus.on_dom_ready(move || *early.borrow_mut() += 1);
    bus.dom_ready();
    bus.dom_ready();
    assert_eq!(*count.borrow(), 1);
    let late = Rc::clone(&count);
    bus.on_dom_ready(move || *late.borrow_mut() += 10);
    assert_eq!(*count.borrow(), 11);
    assert!(bus.is_dom_ready());
    assert!(!bus.is_loaded());
}
