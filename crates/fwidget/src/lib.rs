#![forbid(unsafe_code)]

//! FrankenWidget public facade crate.
//!
//! Re-exports the common types of the document, event and resize crates and
//! adds [`Page`], which ties one event bus to the resize instance registry so
//! an element can be made resizable in one call.

use std::rc::Rc;

use rustc_hash::FxHashMap;

// --- Document re-exports ---------------------------------------------------

pub use fwidget_dom::{
    Clock, DeterministicClock, Document, DomError, EventType, Modifiers, MonotonicClock,
    MouseButton, NodeId, PagePoint, Position, RawEvent, Rect, SharedDocument, Style, Tag, share,
};

// --- Event re-exports ------------------------------------------------------

pub use fwidget_events::{
    DispatchOutcome, DomEvent, EventBus, EventBusConfig, EventBusError, Listener,
    SubscribeOptions, Target,
};

// --- Resize re-exports -----------------------------------------------------

pub use fwidget_resize::{
    BeforeResizeVerdict, ConfigError, Geometry, HandleSpec, ResizeBinding, ResizeConfig,
    ResizeDispatch, ResizeEdge, ResizeEffect, ResizeEngine, ResizeError, ResizeEvent,
    ResizeRegistry, ResizeState, SharedEngine,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for FrankenWidget hosts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Events(#[from] EventBusError),
    #[error(transparent)]
    Resize(#[from] ResizeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Standard result type for FrankenWidget APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Page -----------------------------------------------------------------

/// One document, its event bus and the resizable elements bound to it.
pub struct Page {
    bus: Rc<EventBus>,
    resizers: ResizeRegistry,
    bindings: FxHashMap<String, ResizeBinding>,
}

impl Page {
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus: Rc::new(bus),
            resizers: ResizeRegistry::new(),
            bindings: FxHashMap::default(),
        }
    }

    /// Page over `document` with the wall clock and default bus settings.
    #[must_use]
    pub fn with_document(document: Document) -> Self {
        Self::new(EventBus::with_defaults(share(document)))
    }

    #[must_use]
    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    #[must_use]
    pub fn document(&self) -> &SharedDocument {
        self.bus.document()
    }

    /// Make `element` resizable and bind it to the bus. An element that is
    /// already resizable keeps its engine and `config` is ignored.
    pub fn resizable(&mut self, element: NodeId, config: ResizeConfig) -> Result<SharedEngine> {
        let (engine, created) = {
            let mut doc = self.bus.document().borrow_mut();
            self.resizers.get_or_create(&mut doc, element, config)?
        };
        if !created {
            return Ok(engine);
        }
        let id = engine.borrow().id().to_owned();
        match ResizeBinding::bind(&self.bus, Rc::clone(&engine)) {
            Ok(binding) => {
                self.bindings.insert(id, binding);
                Ok(engine)
            }
            Err(error) => {
                let mut doc = self.bus.document().borrow_mut();
                self.resizers.destroy(&mut doc, &id);
                Err(error.into())
            }
        }
    }

    #[must_use]
    pub fn resizer(&self, id: &str) -> Option<SharedEngine> {
        self.resizers.get(id)
    }

    /// Unbind and tear down the engine registered under `id`.
    pub fn destroy_resizable(&mut self, id: &str) -> bool {
        if let Some(binding) = self.bindings.remove(id) {
            binding.unbind();
        }
        let mut doc = self.bus.document().borrow_mut();
        let destroyed = self.resizers.destroy(&mut doc, id);
        if destroyed {
            tracing::debug!(engine = id, "resizable removed from page");
        }
        destroyed
    }

    /// Feed host input to the bus.
    pub fn dispatch(&self, raw: RawEvent) -> DispatchOutcome {
        self.bus.dispatch(raw)
    }

    /// Advance every running commit animation by `dt`.
    pub fn advance_animations(&self, dt: std::time::Duration) -> Vec<ResizeEvent> {
        let mut events = Vec::new();
        for id in self.resizers.ids() {
            let Some(engine) = self.resizers.get(&id) else {
                continue;
            };
            let mut doc = self.bus.document().borrow_mut();
            events.extend(engine.borrow_mut().advance_animations(&mut doc, dt));
        }
        events
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Document, DomEvent, Error, EventBus, EventType, Geometry, Listener, Modifiers, NodeId,
        Page, PagePoint, RawEvent, ResizeConfig, ResizeEdge, ResizeEngine, ResizeEvent, Result,
        Tag,
    };

    pub use crate::{dom, events, resize};
}

pub use fwidget_dom as dom;
pub use fwidget_events as events;
pub use fwidget_resize as resize;
