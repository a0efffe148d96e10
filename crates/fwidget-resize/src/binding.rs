#![forbid(unsafe_code)]

//! Wiring between a [`ResizeEngine`] and an [`EventBus`].
//!
//! Handles get `mousedown`, `mouseover` and `mouseout` listeners for the
//! lifetime of the binding. Page-level `mousemove`/`mouseup` listeners exist
//! only between a mouse-down and the matching mouse-up. While auto-ratio is
//! configured, `selectstart` on the body is also intercepted for the session
//! and default-prevented whenever shift has locked the ratio.
//!
//! Listener closures hold the bus weakly, so dropping the bus releases
//! everything.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use fwidget_dom::{EventType, NodeId};
use fwidget_events::{DomEvent, EventBus, EventBusError, Listener};

use crate::engine::ResizeEngine;
use crate::error::ResizeError;
use crate::outcome::{ResizeDispatch, ResizeEffect};
use crate::registry::SharedEngine;

struct SessionListeners {
    pointer_move: Listener,
    mouse_up: Listener,
    select_start: Listener,
}

struct BindingState {
    bus: Weak<EventBus>,
    engine: SharedEngine,
    handle_down: Listener,
    element_down: Listener,
    hover_over: Listener,
    hover_out: Listener,
    session: SessionListeners,
    session_attached: RefCell<bool>,
    last_dispatch: RefCell<Option<ResizeDispatch>>,
}

impl BindingState {
    fn attach_session(&self, bus: &EventBus, auto_ratio: bool) {
        if self.session_attached.replace(true) {
            return;
        }
        let (root, body) = {
            let doc = bus.document().borrow();
            (doc.root(), doc.body())
        };
        let mut ok = bus.subscribe(root, EventType::MouseMove, &self.session.pointer_move);
        ok &= bus.subscribe(root, EventType::MouseUp, &self.session.mouse_up);
        if auto_ratio {
            ok &= bus.subscribe(body, EventType::SelectStart, &self.session.select_start);
        }
        if ok {
            tracing::trace!("session listeners attached");
        } else {
            tracing::warn!(error = ?bus.last_error(), "session listeners could not be attached");
        }
    }

    fn detach_session(&self, bus: &EventBus) {
        if !self.session_attached.replace(false) {
            return;
        }
        let (root, body) = {
            let doc = bus.document().borrow();
            (doc.root(), doc.body())
        };
        bus.unsubscribe(root, &EventType::MouseMove, Some(&self.session.pointer_move));
        bus.unsubscribe(root, &EventType::MouseUp, Some(&self.session.mouse_up));
        bus.unsubscribe(body, &EventType::SelectStart, Some(&self.session.select_start));
        tracing::trace!("session listeners detached");
    }

    fn record(&self, dispatch: ResizeDispatch) {
        *self.last_dispatch.borrow_mut() = Some(dispatch);
    }
}

/// Live listeners connecting one engine to one bus.
pub struct ResizeBinding {
    bus: Rc<EventBus>,
    state: Rc<BindingState>,
    handles: Vec<NodeId>,
    wrap: Option<NodeId>,
}

impl ResizeBinding {
    /// Subscribe the engine's handles (and its wrapper, when draggable).
    ///
    /// On failure every listener that did attach is removed again.
    pub fn bind(bus: &Rc<EventBus>, engine: SharedEngine) -> Result<Self, ResizeError> {
        let state = Rc::new_cyclic(|weak: &Weak<BindingState>| BindingState {
            bus: Rc::downgrade(bus),
            engine: Rc::clone(&engine),
            handle_down: on_mouse_down(weak.clone(), true),
            element_down: on_mouse_down(weak.clone(), false),
            hover_over: on_hover(weak.clone(), true),
            hover_out: on_hover(weak.clone(), false),
            session: SessionListeners {
                pointer_move: on_pointer_move(weak.clone()),
                mouse_up: on_mouse_up(weak.clone()),
                select_start: on_select_start(weak.clone()),
            },
            session_attached: RefCell::new(false),
            last_dispatch: RefCell::new(None),
        });

        let (handles, wrap) = {
            let engine = engine.borrow();
            let handles: Vec<NodeId> = engine.handle_nodes().into_iter().map(|(_, n)| n).collect();
            let wrap = engine.is_draggable().then(|| engine.wrap_node());
            (handles, wrap)
        };
        let binding = Self {
            bus: Rc::clone(bus),
            state,
            handles,
            wrap,
        };

        let mut ok = true;
        for &node in &binding.handles {
            ok &= bus.subscribe(node, EventType::MouseDown, &binding.state.handle_down);
            ok &= bus.subscribe(node, EventType::MouseOver, &binding.state.hover_over);
            ok &= bus.subscribe(node, EventType::MouseOut, &binding.state.hover_out);
        }
        if let Some(wrap) = binding.wrap {
            ok &= bus.subscribe(wrap, EventType::MouseDown, &binding.state.element_down);
        }
        if !ok {
            let error = bus.last_error();
            binding.unbind();
            return Err(ResizeError::Bind(error.unwrap_or(EventBusError::Unloaded)));
        }
        tracing::debug!(
            engine = %engine.borrow().id(),
            handles = binding.handles.len(),
            draggable = binding.wrap.is_some(),
            "resize engine bound"
        );
        Ok(binding)
    }

    #[must_use]
    pub fn engine(&self) -> &SharedEngine {
        &self.state.engine
    }

    /// Record of the most recent engine step driven by this binding.
    #[must_use]
    pub fn last_dispatch(&self) -> Option<ResizeDispatch> {
        self.state.last_dispatch.borrow().clone()
    }

    /// Whether page-level session listeners are currently attached.
    #[must_use]
    pub fn session_attached(&self) -> bool {
        *self.state.session_attached.borrow()
    }

    /// Remove every listener this binding added.
    pub fn unbind(&self) {
        self.state.detach_session(&self.bus);
        for &node in &self.handles {
            self.bus.purge_element(node, false, Some(&EventType::MouseDown));
            self.bus.purge_element(node, false, Some(&EventType::MouseOver));
            self.bus.purge_element(node, false, Some(&EventType::MouseOut));
        }
        if let Some(wrap) = self.wrap {
            self.bus
                .unsubscribe(wrap, &EventType::MouseDown, Some(&self.state.element_down));
        }
    }

    /// Unbind, then tear the engine down.
    pub fn destroy(self) {
        self.unbind();
        let document = Rc::clone(self.bus.document());
        let mut doc = document.borrow_mut();
        self.state.engine.borrow_mut().destroy(&mut doc);
    }
}

fn upgrade(weak: &Weak<BindingState>) -> Option<(Rc<BindingState>, Rc<EventBus>)> {
    let state = weak.upgrade()?;
    let bus = state.bus.upgrade()?;
    Some((state, bus))
}

fn on_mouse_down(weak: Weak<BindingState>, on_handle: bool) -> Listener {
    Listener::new(move |event: &DomEvent, _| {
        let Some((state, bus)) = upgrade(&weak) else {
            return;
        };
        let target = if on_handle {
            event.current_target().or(event.target())
        } else {
            event.target()
        };
        let Some(target) = target else {
            return;
        };
        let (dispatch, auto_ratio) = {
            let doc = bus.document().borrow();
            let mut engine = state.engine.borrow_mut();
            let dispatch =
                engine.handle_mouse_down(&doc, target, event.page(), event.modifiers());
            (dispatch, engine.config().auto_ratio)
        };
        if matches!(
            dispatch.effect,
            ResizeEffect::Primed { .. } | ResizeEffect::MoveArmed
        ) {
            event.prevent_default();
            if on_handle {
                event.stop_propagation();
            }
            state.attach_session(&bus, auto_ratio);
        }
        state.record(dispatch);
    })
}

fn on_pointer_move(weak: Weak<BindingState>) -> Listener {
    Listener::new(move |event: &DomEvent, _| {
        let Some((state, bus)) = upgrade(&weak) else {
            return;
        };
        let dispatch = {
            let mut doc = bus.document().borrow_mut();
            state
                .engine
                .borrow_mut()
                .handle_pointer_move(&mut doc, event.page(), event.modifiers())
        };
        state.record(dispatch);
    })
}

fn on_mouse_up(weak: Weak<BindingState>) -> Listener {
    Listener::new(move |event: &DomEvent, _| {
        let Some((state, bus)) = upgrade(&weak) else {
            return;
        };
        let dispatch = {
            let mut doc = bus.document().borrow_mut();
            state
                .engine
                .borrow_mut()
                .handle_mouse_up(&mut doc, event.page())
        };
        state.detach_session(&bus);
        state.record(dispatch);
    })
}

fn on_select_start(weak: Weak<BindingState>) -> Listener {
    Listener::new(move |event: &DomEvent, _| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        if state.engine.borrow().is_ratio_locked() {
            event.prevent_default();
        }
    })
}

fn on_hover(weak: Weak<BindingState>, entering: bool) -> Listener {
    Listener::new(move |event: &DomEvent, _| {
        let Some((state, bus)) = upgrade(&weak) else {
            return;
        };
        let Some(node) = event.current_target().or(event.target()) else {
            return;
        };
        let mut doc = bus.document().borrow_mut();
        let mut engine = state.engine.borrow_mut();
        if entering {
            engine.handle_mouse_over(&mut doc, node);
        } else {
            engine.handle_mouse_out(&mut doc, node);
        }
    })
}

impl ResizeEngine {
    /// Bind this engine to `bus`, sharing it behind `Rc<RefCell<_>>`.
    pub fn bind(self, bus: &Rc<EventBus>) -> Result<ResizeBinding, ResizeError> {
        ResizeBinding::bind(bus, Rc::new(RefCell::new(self)))
    }
}
