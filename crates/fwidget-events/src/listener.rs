#![forbid(unsafe_code)]

//! Listener callbacks, execution contexts, and descriptors.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use fwidget_dom::{EventType, NodeId};

use crate::normalize::DomEvent;

/// Opaque user data handed back to a callback.
pub type Payload = Rc<dyn Any>;

/// Propagation phase a listener is invoked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Capture,
    Target,
    Bubble,
}

/// How the callback's execution context is chosen.
#[derive(Clone, Default)]
pub enum ContextOverride {
    /// The element the listener is bound to.
    #[default]
    None,
    /// The payload passed at subscription.
    Payload,
    /// An explicit object.
    Explicit(Payload),
}

impl fmt::Debug for ContextOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Payload => f.write_str("Payload"),
            Self::Explicit(_) => f.write_str("Explicit(..)"),
        }
    }
}

/// Resolved `this` for a callback.
#[derive(Clone)]
pub enum ExecutionContext {
    Element(NodeId),
    /// Document-wide context used by unload listeners.
    Global,
    Object(Payload),
}

impl ExecutionContext {
    #[must_use]
    pub fn element(&self) -> Option<NodeId> {
        match self {
            Self::Element(node) => Some(*node),
            _ => None,
        }
    }

    /// Downcast an object context.
    #[must_use]
    pub fn object<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Object(obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(node) => write!(f, "Element({node})"),
            Self::Global => f.write_str("Global"),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

/// Pick the execution context: the override wins, otherwise `default`.
///
/// A `Payload` override with no payload keeps the default.
#[must_use]
pub fn resolve_context(
    default: ExecutionContext,
    payload: Option<&Payload>,
    context_override: &ContextOverride,
) -> ExecutionContext {
    match context_override {
        ContextOverride::None => default,
        ContextOverride::Payload => payload.map_or(default, |p| ExecutionContext::Object(Rc::clone(p))),
        ContextOverride::Explicit(obj) => ExecutionContext::Object(Rc::clone(obj)),
    }
}

/// Per-call information passed next to the event.
pub struct Invocation<'a> {
    pub context: &'a ExecutionContext,
    pub payload: Option<&'a Payload>,
    /// Element the listener is registered on.
    pub current_target: NodeId,
    pub phase: Phase,
    /// Type requested at subscription (before focus-within translation).
    pub subscribed_type: &'a EventType,
}

impl Invocation<'_> {
    #[must_use]
    pub fn payload_as<T: 'static>(&self) -> Option<&T> {
        self.payload.and_then(|p| p.downcast_ref::<T>())
    }
}

type Callback = dyn Fn(&DomEvent, &Invocation<'_>);

/// A subscribable callback.
///
/// Identity is the allocation: clones of one `Listener` are the same callback
/// for registration and removal, two `Listener::new` calls never are.
#[derive(Clone)]
pub struct Listener {
    callback: Rc<Callback>,
}

impl Listener {
    pub fn new(callback: impl Fn(&DomEvent, &Invocation<'_>) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    #[must_use]
    pub fn id(&self) -> CallbackId {
        CallbackId(Rc::as_ptr(&self.callback).cast::<()>() as usize)
    }

    pub(crate) fn call(&self, event: &DomEvent, invocation: &Invocation<'_>) {
        (self.callback)(event, invocation);
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id()).finish()
    }
}

/// Identity of a [`Listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(usize);

/// Snapshot of one registration, as returned by `EventBus::get_listeners`.
#[derive(Debug, Clone)]
pub struct ListenerDescriptor {
    pub event_type: EventType,
    pub callback: CallbackId,
    pub payload: Option<Payload>,
    pub context_override: ContextOverride,
    pub context: ExecutionContext,
    pub capture: bool,
    /// Registration order within its list (regular or unload).
    pub index: u64,
}
