#![forbid(unsafe_code)]

//! Deferred work waiting for an element id to appear.
//!
//! Every request produces an [`AvailabilityHandle`]: a cancellable,
//! single-threaded future that settles when the bus finds the element,
//! when the retry budget runs out, or when the caller cancels it.
//!
//! The bus drives polling from its clock (see `EventBus::pump`). Each tick
//! consumes one retry from the budget. Before the document has loaded,
//! polling continues even with the budget spent; afterwards an empty budget
//! expires whatever is still waiting. A request made while polling refills
//! the budget.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use fwidget_dom::{EventType, NodeId};

use crate::listener::{ContextOverride, ExecutionContext, Listener, Payload};

/// Settled or pending state of an availability request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityState {
    Pending,
    /// The element appeared and the callback ran.
    Resolved(NodeId),
    /// Polling stopped before the element appeared.
    Expired,
    Cancelled,
}

impl AvailabilityState {
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[derive(Debug)]
struct HandleShared {
    state: AvailabilityState,
    waker: Option<Waker>,
}

/// Future-like handle for one availability request.
#[derive(Clone)]
pub struct AvailabilityHandle {
    shared: Rc<RefCell<HandleShared>>,
}

impl fmt::Debug for AvailabilityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AvailabilityHandle")
            .field(&self.state())
            .finish()
    }
}

impl AvailabilityHandle {
    pub(crate) fn pending() -> Self {
        Self {
            shared: Rc::new(RefCell::new(HandleShared {
                state: AvailabilityState::Pending,
                waker: None,
            })),
        }
    }

    #[must_use]
    pub fn state(&self) -> AvailabilityState {
        self.shared.borrow().state
    }

    /// Cancel a pending request. Returns false if it had already settled.
    pub fn cancel(&self) -> bool {
        self.settle(AvailabilityState::Cancelled)
    }

    pub(crate) fn settle(&self, state: AvailabilityState) -> bool {
        let waker = {
            let mut shared = self.shared.borrow_mut();
            if !shared.state.is_pending() {
                return false;
            }
            shared.state = state;
            shared.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
        true
    }
}

impl Future for AvailabilityHandle {
    type Output = AvailabilityState;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut shared = self.shared.borrow_mut();
        if shared.state.is_pending() {
            shared.waker = Some(cx.waker().clone());
            Poll::Pending
        } else {
            Poll::Ready(shared.state)
        }
    }
}

/// What an availability callback receives.
pub struct Available<'a> {
    pub node: NodeId,
    pub context: &'a ExecutionContext,
    pub payload: Option<&'a Payload>,
}

pub(crate) type AvailableCallback = Rc<dyn Fn(&Available<'_>)>;

pub(crate) enum PendingAction {
    Callback {
        callback: AvailableCallback,
        payload: Option<Payload>,
        context_override: ContextOverride,
    },
    /// A subscription made before its element existed.
    Subscribe {
        event_type: EventType,
        listener: Listener,
        payload: Option<Payload>,
        context_override: ContextOverride,
        capture: bool,
    },
}

pub(crate) struct PendingEntry {
    pub id: String,
    pub action: PendingAction,
    pub require_sibling_ready: bool,
    pub handle: AvailabilityHandle,
}

/// Polling bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct PollState {
    pub retries: u32,
    pub next_tick: Option<Duration>,
    pub load_complete: bool,
    pub dom_ready: bool,
    pub locked: bool,
}
