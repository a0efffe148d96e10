#![forbid(unsafe_code)]

//! The event bus.
//!
//! # Invariants
//!
//! 1. At most one record exists per (element, subscribed type, callback).
//! 2. A record exists only while its native registration exists; a failed
//!    native attach leaves no record behind.
//! 3. No `RefCell` borrow of bus or document state is held while a user
//!    callback runs, so callbacks may subscribe, unsubscribe, dispatch or
//!    mutate the document.
//! 4. Unload listeners live outside the registry and run exactly once, in
//!    registration order, before every other listener is removed.
//!
//! # Failure modes
//!
//! Subscription and removal return `bool`. The reason for the most recent
//! `false` is kept in [`EventBus::last_error`]. Nothing panics and nothing is
//! propagated.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fwidget_dom::{
    Clock, DomError, EventType, MonotonicClock, NodeId, RawEvent, ReadyState, SharedDocument,
};

use crate::availability::{
    Available, AvailabilityHandle, AvailabilityState, PendingAction, PendingEntry, PollState,
};
use crate::config::EventBusConfig;
use crate::error::EventBusError;
use crate::listener::{
    ContextOverride, ExecutionContext, Invocation, Listener, ListenerDescriptor, Payload, Phase,
    resolve_context,
};
use crate::normalize::DomEvent;
use crate::registry::{ListenerKey, ListenerRecord, ListenerRegistry, Wrapped};
use crate::target::Target;

/// Optional subscription parameters.
#[derive(Debug, Clone, Default)]
pub struct SubscribeOptions {
    pub payload: Option<Payload>,
    pub context_override: ContextOverride,
    /// Register for the capture phase.
    pub capture: bool,
}

impl SubscribeOptions {
    #[must_use]
    pub fn with_payload(payload: Payload) -> Self {
        Self {
            payload: Some(payload),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn context(mut self, context_override: ContextOverride) -> Self {
        self.context_override = context_override;
        self
    }

    #[must_use]
    pub fn capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Listeners that ran.
    pub invoked: usize,
    pub propagation_stopped: bool,
    pub default_prevented: bool,
}

struct UnloadRecord {
    element: NodeId,
    listener: Listener,
    payload: Option<Payload>,
    context_override: ContextOverride,
}

/// Subscription registry and dispatcher for one document.
pub struct EventBus {
    document: SharedDocument,
    clock: Rc<dyn Clock>,
    config: EventBusConfig,
    registry: RefCell<ListenerRegistry>,
    unload_listeners: RefCell<Vec<UnloadRecord>>,
    pending: RefCell<Vec<PendingEntry>>,
    poll: RefCell<PollState>,
    ready_callbacks: RefCell<Vec<Box<dyn FnOnce()>>>,
    last_error: RefCell<Option<EventBusError>>,
    auto_id: Cell<u64>,
    unloaded: Cell<bool>,
}

impl EventBus {
    #[must_use]
    pub fn new(document: SharedDocument, clock: Rc<dyn Clock>, config: EventBusConfig) -> Self {
        let config = config.validated();
        tracing::debug!(
            poll_interval_ms = config.poll_interval_ms,
            poll_retries = config.poll_retries,
            "event bus created"
        );
        Self {
            document,
            clock,
            config,
            registry: RefCell::new(ListenerRegistry::default()),
            unload_listeners: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
            poll: RefCell::new(PollState::default()),
            ready_callbacks: RefCell::new(Vec::new()),
            last_error: RefCell::new(None),
            auto_id: Cell::new(0),
            unloaded: Cell::new(false),
        }
    }

    /// Bus on the wall clock with default configuration.
    #[must_use]
    pub fn with_defaults(document: SharedDocument) -> Self {
        Self::new(document, Rc::new(MonotonicClock::new()), EventBusConfig::default())
    }

    #[must_use]
    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    #[must_use]
    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    #[must_use]
    pub const fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Reason for the most recent failed operation.
    #[must_use]
    pub fn last_error(&self) -> Option<EventBusError> {
        self.last_error.borrow().clone()
    }

    pub fn clear_last_error(&self) {
        self.last_error.borrow_mut().take();
    }

    /// Registered listeners, unload listeners included.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().len() + self.unload_listeners.borrow().len()
    }

    #[must_use]
    pub fn is_unloaded(&self) -> bool {
        self.unloaded.get()
    }

    // -----------------------------------------------------------------------
    // Subscription
    // -----------------------------------------------------------------------

    /// Subscribe with the element as context and no payload.
    pub fn subscribe(
        &self,
        target: impl Into<Target>,
        event_type: EventType,
        listener: &Listener,
    ) -> bool {
        self.subscribe_with(target, event_type, listener, SubscribeOptions::default())
    }

    /// Subscribe `listener` to `event_type` on `target`.
    ///
    /// An id not yet in the document defers the subscription until the element
    /// appears and still reports success. For collections every member is
    /// attempted and the result is true only if all succeeded.
    pub fn subscribe_with(
        &self,
        target: impl Into<Target>,
        event_type: EventType,
        listener: &Listener,
        options: SubscribeOptions,
    ) -> bool {
        if self.unloaded.get() {
            return self.fail(EventBusError::Unloaded);
        }
        match target.into() {
            Target::Node(node) => self.subscribe_node(node, event_type, listener, options),
            Target::Id(id) => {
                let found = self.document.borrow().get_element_by_id(&id);
                if let Some(node) = found {
                    return self.subscribe_node(node, event_type, listener, options);
                }
                tracing::debug!(
                    id = %id,
                    event_type = event_type.name(),
                    "element not available yet; deferring subscription"
                );
                self.enqueue(PendingEntry {
                    id,
                    action: PendingAction::Subscribe {
                        event_type,
                        listener: listener.clone(),
                        payload: options.payload,
                        context_override: options.context_override,
                        capture: options.capture,
                    },
                    require_sibling_ready: false,
                    handle: AvailabilityHandle::pending(),
                });
                true
            }
            collection @ (Target::Nodes(_) | Target::Ids(_)) => {
                collection.into_singles().into_iter().fold(true, |ok, single| {
                    self.subscribe_with(single, event_type.clone(), listener, options.clone()) && ok
                })
            }
        }
    }

    fn subscribe_node(
        &self,
        node: NodeId,
        event_type: EventType,
        listener: &Listener,
        options: SubscribeOptions,
    ) -> bool {
        match self.try_subscribe_node(node, event_type, listener, options) {
            Ok(()) => true,
            Err(err) => self.fail(err),
        }
    }

    fn try_subscribe_node(
        &self,
        node: NodeId,
        event_type: EventType,
        listener: &Listener,
        options: SubscribeOptions,
    ) -> Result<(), EventBusError> {
        if !self.document.borrow().exists(node) {
            return Err(DomError::NodeNotFound(node).into());
        }

        if event_type == EventType::Unload {
            self.unload_listeners.borrow_mut().push(UnloadRecord {
                element: node,
                listener: listener.clone(),
                payload: options.payload,
                context_override: options.context_override,
            });
            tracing::debug!(node = %node, "unload listener queued");
            return Ok(());
        }

        let (native_type, capture) = self.translate(&event_type, options.capture);
        let key = ListenerKey {
            element: node,
            event_type: event_type.clone(),
            callback: listener.id(),
        };
        {
            let mut registry = self.registry.borrow_mut();
            if registry.contains(&key) {
                return Err(EventBusError::DuplicateListener {
                    node,
                    event_type: event_type.name().to_owned(),
                });
            }
            let context = resolve_context(
                ExecutionContext::Element(node),
                options.payload.as_ref(),
                &options.context_override,
            );
            let wrapped = wrap(listener, context.clone(), options.payload.clone(), event_type.clone());
            let seq = registry.next_seq();
            registry.insert(ListenerRecord {
                key: key.clone(),
                native_type: native_type.clone(),
                listener: listener.clone(),
                wrapped,
                context,
                payload: options.payload,
                context_override: options.context_override,
                capture,
                seq,
                native: None,
            });
        }

        let attached = self
            .document
            .borrow_mut()
            .add_native_listener(node, &native_type, capture);
        match attached {
            Ok(native) => {
                if let Some(record) = self.registry.borrow_mut().get_mut(&key) {
                    record.native = Some(native);
                }
                tracing::debug!(
                    node = %node,
                    event_type = event_type.name(),
                    native_type = native_type.name(),
                    capture,
                    "listener attached"
                );
                Ok(())
            }
            Err(err) => {
                self.registry.borrow_mut().remove(&key);
                Err(err.into())
            }
        }
    }

    /// Map a subscribed type to the native type and phase that deliver it.
    fn translate(&self, event_type: &EventType, capture: bool) -> (EventType, bool) {
        let bubbling = self.config.platform.bubbling_focus_events;
        match event_type {
            EventType::FocusWithin if bubbling => (EventType::FocusIn, false),
            EventType::FocusWithin => (EventType::Focus, true),
            EventType::BlurWithin if bubbling => (EventType::FocusOut, false),
            EventType::BlurWithin => (EventType::Blur, true),
            other => (other.clone(), capture),
        }
    }

    /// Remove a registration. With `listener` omitted, every listener of
    /// `event_type` on the target is removed.
    ///
    /// Returns false when nothing matched.
    pub fn unsubscribe(
        &self,
        target: impl Into<Target>,
        event_type: &EventType,
        listener: Option<&Listener>,
    ) -> bool {
        match target.into() {
            Target::Node(node) => self.unsubscribe_node(node, event_type, listener),
            Target::Id(id) => {
                let found = self.document.borrow().get_element_by_id(&id);
                found.is_some_and(|node| self.unsubscribe_node(node, event_type, listener))
            }
            collection @ (Target::Nodes(_) | Target::Ids(_)) => collection
                .into_singles()
                .into_iter()
                .rev()
                .fold(true, |ok, single| {
                    self.unsubscribe(single, event_type, listener) && ok
                }),
        }
    }

    fn unsubscribe_node(
        &self,
        node: NodeId,
        event_type: &EventType,
        listener: Option<&Listener>,
    ) -> bool {
        let Some(listener) = listener else {
            return self.purge_node(node, Some(event_type)) > 0;
        };
        if *event_type == EventType::Unload {
            let mut queue = self.unload_listeners.borrow_mut();
            let position = queue
                .iter()
                .rposition(|r| r.element == node && r.listener.id() == listener.id());
            return position.map(|index| queue.remove(index)).is_some();
        }
        self.remove_key(&ListenerKey {
            element: node,
            event_type: event_type.clone(),
            callback: listener.id(),
        })
    }

    fn remove_key(&self, key: &ListenerKey) -> bool {
        let native = match self.registry.borrow().get(key) {
            Some(record) => record.native,
            None => return false,
        };
        if let Some(native) = native {
            let removed = self.document.borrow_mut().remove_native_listener(native);
            if let Err(err) = removed {
                // A destroyed element takes its native registrations with it.
                if self.document.borrow().exists(key.element) {
                    return self.fail(err.into());
                }
            }
        }
        self.registry.borrow_mut().remove(key);
        tracing::debug!(
            node = %key.element,
            event_type = key.event_type.name(),
            "listener removed"
        );
        true
    }

    /// Remove listeners from an element, optionally from all its descendants
    /// and optionally only of one type. Returns the number removed.
    pub fn purge_element(
        &self,
        target: impl Into<Target>,
        recurse: bool,
        event_type: Option<&EventType>,
    ) -> usize {
        let mut removed = 0;
        for node in self.resolve_nodes(target.into()) {
            let scope = if recurse {
                self.document.borrow().subtree(node)
            } else {
                vec![node]
            };
            for member in scope.into_iter().rev() {
                removed += self.purge_node(member, event_type);
            }
        }
        removed
    }

    fn purge_node(&self, node: NodeId, event_type: Option<&EventType>) -> usize {
        let keys = self.registry.borrow().keys_for(node, event_type);
        let mut removed = 0;
        for key in keys.iter().rev() {
            if self.remove_key(key) {
                removed += 1;
            }
        }
        if event_type.is_none_or(|ty| *ty == EventType::Unload) {
            let mut queue = self.unload_listeners.borrow_mut();
            let before = queue.len();
            queue.retain(|r| r.element != node);
            removed += before - queue.len();
        }
        removed
    }

    /// Describe the listeners registered on a single element, or `None` if
    /// there are none.
    #[must_use]
    pub fn get_listeners(
        &self,
        target: impl Into<Target>,
        event_type: Option<&EventType>,
    ) -> Option<Vec<ListenerDescriptor>> {
        let node = match target.into() {
            Target::Node(node) => node,
            Target::Id(id) => self.document.borrow().get_element_by_id(&id)?,
            Target::Nodes(_) | Target::Ids(_) => return None,
        };
        let mut found = Vec::new();
        if event_type != Some(&EventType::Unload) {
            let registry = self.registry.borrow();
            found.extend(
                registry
                    .keys_for(node, event_type)
                    .iter()
                    .filter_map(|key| registry.get(key))
                    .map(ListenerRecord::descriptor),
            );
        }
        if event_type.is_none_or(|ty| *ty == EventType::Unload) {
            let queue = self.unload_listeners.borrow();
            found.extend(
                queue
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.element == node)
                    .map(|(index, r)| ListenerDescriptor {
                        event_type: EventType::Unload,
                        callback: r.listener.id(),
                        payload: r.payload.clone(),
                        context_override: r.context_override.clone(),
                        context: resolve_context(
                            ExecutionContext::Global,
                            r.payload.as_ref(),
                            &r.context_override,
                        ),
                        capture: false,
                        index: index as u64,
                    }),
            );
        }
        (!found.is_empty()).then_some(found)
    }

    fn resolve_nodes(&self, target: Target) -> Vec<NodeId> {
        let document = self.document.borrow();
        target
            .into_singles()
            .into_iter()
            .filter_map(|single| match single {
                Target::Node(node) => Some(node),
                Target::Id(id) => document.get_element_by_id(&id),
                Target::Nodes(_) | Target::Ids(_) => None,
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Normalize a raw event. `bound` is the element it is being handled for.
    #[must_use]
    pub fn normalize(&self, raw: RawEvent, bound: Option<NodeId>) -> DomEvent {
        DomEvent::normalize(raw, &self.document.borrow(), Rc::clone(&self.clock), bound)
    }

    /// Normalize and deliver a host event: capture listeners from the root
    /// down, every listener on the target, then non-capture listeners back up
    /// to the root for bubbling types.
    pub fn dispatch(&self, raw: RawEvent) -> DispatchOutcome {
        if self.unloaded.get() {
            return DispatchOutcome::default();
        }
        let event = self.normalize(raw, None);
        self.dispatch_event(&event)
    }

    /// Deliver an already normalized event.
    pub fn dispatch_event(&self, event: &DomEvent) -> DispatchOutcome {
        let mut path = {
            let document = self.document.borrow();
            let target = event.target().unwrap_or_else(|| document.root());
            document.path_to_root(target)
        };
        let Some(&target) = path.first() else {
            tracing::trace!(event_type = event.event_type().name(), "dispatch to a destroyed node");
            return DispatchOutcome::default();
        };
        path.reverse();
        let ancestors = &path[..path.len() - 1];
        let event_type = event.event_type();

        let plan: Vec<(Phase, NodeId, Vec<ListenerKey>)> = {
            let registry = self.registry.borrow();
            let mut plan = Vec::with_capacity(path.len() * 2);
            for &node in ancestors {
                plan.push((Phase::Capture, node, registry.dispatch_keys(node, event_type, Some(true))));
            }
            plan.push((Phase::Target, target, registry.dispatch_keys(target, event_type, None)));
            if event_type.bubbles() {
                for &node in ancestors.iter().rev() {
                    plan.push((Phase::Bubble, node, registry.dispatch_keys(node, event_type, Some(false))));
                }
            }
            plan
        };

        let mut outcome = DispatchOutcome::default();
        'walk: for (phase, node, keys) in plan {
            if keys.is_empty() {
                continue;
            }
            event.set_current_target(node);
            for key in keys {
                // Skip listeners removed by an earlier callback of this dispatch.
                let wrapped = self
                    .registry
                    .borrow()
                    .get(&key)
                    .map(|record| Rc::clone(&record.wrapped));
                let Some(wrapped) = wrapped else {
                    continue;
                };
                (wrapped)(event, node, phase);
                outcome.invoked += 1;
                if event.immediate_propagation_stopped() {
                    break 'walk;
                }
            }
            if event.propagation_stopped() {
                break;
            }
        }
        outcome.propagation_stopped = event.propagation_stopped();
        outcome.default_prevented = event.default_prevented();
        tracing::trace!(
            event_type = event_type.name(),
            target = %target,
            invoked = outcome.invoked,
            "event dispatched"
        );
        outcome
    }

    // -----------------------------------------------------------------------
    // Availability
    // -----------------------------------------------------------------------

    /// Run `callback` for each id once its element exists.
    ///
    /// With `require_sibling_ready` the element must also have a following
    /// sibling (or the document must have loaded) before the callback runs.
    /// The callback's context is the element unless overridden.
    pub fn wait_for_element<I, S>(
        &self,
        ids: I,
        callback: impl Fn(&Available<'_>) + 'static,
        payload: Option<Payload>,
        context_override: ContextOverride,
        require_sibling_ready: bool,
    ) -> Vec<AvailabilityHandle>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let callback: Rc<dyn Fn(&Available<'_>)> = Rc::new(callback);
        ids.into_iter()
            .map(|id| {
                let handle = AvailabilityHandle::pending();
                self.enqueue(PendingEntry {
                    id: id.into(),
                    action: PendingAction::Callback {
                        callback: Rc::clone(&callback),
                        payload: payload.clone(),
                        context_override: context_override.clone(),
                    },
                    require_sibling_ready,
                    handle: handle.clone(),
                });
                handle
            })
            .collect()
    }

    /// Run `callback` once the element with `id` exists.
    pub fn on_available(
        &self,
        id: &str,
        callback: impl Fn(&Available<'_>) + 'static,
    ) -> AvailabilityHandle {
        self.wait_single(id, callback, false)
    }

    /// Like [`on_available`](Self::on_available), but also waits until the
    /// element's content is safe to modify.
    pub fn on_content_ready(
        &self,
        id: &str,
        callback: impl Fn(&Available<'_>) + 'static,
    ) -> AvailabilityHandle {
        self.wait_single(id, callback, true)
    }

    fn wait_single(
        &self,
        id: &str,
        callback: impl Fn(&Available<'_>) + 'static,
        require_sibling_ready: bool,
    ) -> AvailabilityHandle {
        let handle = AvailabilityHandle::pending();
        self.enqueue(PendingEntry {
            id: id.to_owned(),
            action: PendingAction::Callback {
                callback: Rc::new(callback),
                payload: None,
                context_override: ContextOverride::None,
            },
            require_sibling_ready,
            handle: handle.clone(),
        });
        handle
    }

    fn enqueue(&self, entry: PendingEntry) {
        self.pending.borrow_mut().push(entry);
        let mut poll = self.poll.borrow_mut();
        poll.retries = self.config.poll_retries;
        if poll.next_tick.is_none() {
            poll.next_tick = Some(self.clock.now() + self.config.poll_interval());
        }
    }

    /// Number of availability requests still waiting.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Run every poll tick that is due according to the clock. Returns the
    /// number of ticks run.
    pub fn pump(&self) -> usize {
        let mut ticks = 0;
        loop {
            let due = match self.poll.borrow().next_tick {
                Some(due) if due <= self.clock.now() => due,
                _ => break,
            };
            self.poll_tick(Some(due));
            ticks += 1;
        }
        ticks
    }

    fn poll_tick(&self, due: Option<std::time::Duration>) {
        let (load_complete, retries) = {
            let mut poll = self.poll.borrow_mut();
            if poll.locked {
                return;
            }
            if self.pending.borrow().is_empty() {
                poll.retries = 0;
                poll.next_tick = None;
                return;
            }
            poll.locked = true;
            (poll.load_complete, poll.retries)
        };
        // Every tick spends one retry; the budget only ends polling after load.
        let try_again = !load_complete || retries > 0;

        let entries = std::mem::take(&mut *self.pending.borrow_mut());
        let mut waiting = Vec::new();
        let mut ready = Vec::new();
        for entry in entries {
            if !entry.handle.state().is_pending() {
                continue;
            }
            let (found, has_sibling) = {
                let document = self.document.borrow();
                let found = document.get_element_by_id(&entry.id);
                let has_sibling = found.and_then(|n| document.next_sibling(n)).is_some();
                (found, has_sibling)
            };
            match found {
                Some(node) if entry.require_sibling_ready => {
                    if load_complete || has_sibling || !try_again {
                        ready.push((node, entry));
                    } else {
                        waiting.push(entry);
                    }
                }
                Some(node) => self.run_entry(node, entry),
                None => waiting.push(entry),
            }
        }
        // Content-ready callbacks run after plain availability callbacks.
        for (node, entry) in ready {
            self.run_entry(node, entry);
        }

        let expired = {
            let mut pending = self.pending.borrow_mut();
            let expired = if try_again {
                let added = std::mem::take(&mut *pending);
                *pending = waiting;
                pending.extend(added);
                Vec::new()
            } else {
                waiting
            };
            let mut poll = self.poll.borrow_mut();
            poll.retries = poll.retries.saturating_sub(1);
            poll.next_tick = if pending.is_empty() {
                None
            } else {
                let base = due.unwrap_or_else(|| self.clock.now());
                Some(base + self.config.poll_interval())
            };
            poll.locked = false;
            expired
        };
        for entry in expired {
            tracing::warn!(id = %entry.id, "element never appeared; availability polling exhausted");
            entry.handle.settle(AvailabilityState::Expired);
        }
    }

    fn run_entry(&self, node: NodeId, entry: PendingEntry) {
        match entry.action {
            PendingAction::Callback {
                callback,
                payload,
                context_override,
            } => {
                let context = resolve_context(
                    ExecutionContext::Element(node),
                    payload.as_ref(),
                    &context_override,
                );
                callback(&Available {
                    node,
                    context: &context,
                    payload: payload.as_ref(),
                });
            }
            PendingAction::Subscribe {
                event_type,
                listener,
                payload,
                context_override,
                capture,
            } => {
                tracing::debug!(id = %entry.id, node = %node, "deferred subscription attaching");
                self.subscribe_node(
                    node,
                    event_type,
                    &listener,
                    SubscribeOptions {
                        payload,
                        context_override,
                        capture,
                    },
                );
            }
        }
        entry.handle.settle(AvailabilityState::Resolved(node));
    }

    // -----------------------------------------------------------------------
    // Document lifecycle
    // -----------------------------------------------------------------------

    /// Run `callback` when the DOM is ready, or now if it already is.
    pub fn on_dom_ready(&self, callback: impl FnOnce() + 'static) {
        if self.poll.borrow().dom_ready {
            callback();
        } else {
            self.ready_callbacks.borrow_mut().push(Box::new(callback));
        }
    }

    #[must_use]
    pub fn is_dom_ready(&self) -> bool {
        self.poll.borrow().dom_ready
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.poll.borrow().load_complete
    }

    /// Host signal: the document structure is parsed. Fires DOM-ready
    /// callbacks once and attempts pending availability requests.
    pub fn dom_ready(&self) {
        {
            let mut poll = self.poll.borrow_mut();
            if poll.dom_ready {
                return;
            }
            poll.dom_ready = true;
        }
        {
            let mut document = self.document.borrow_mut();
            if document.ready_state() == ReadyState::Loading {
                document.set_ready_state(ReadyState::Interactive);
            }
        }
        tracing::debug!("dom ready");
        let callbacks = std::mem::take(&mut *self.ready_callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
        self.poll_tick(None);
    }

    /// Host signal: the document finished loading. From now on an exhausted
    /// retry budget ends polling, so requests whose budget ran out while the
    /// document loaded expire on the flush tick run here.
    pub fn document_loaded(&self) {
        {
            let mut poll = self.poll.borrow_mut();
            if poll.load_complete {
                return;
            }
            poll.load_complete = true;
        }
        self.dom_ready();
        self.document
            .borrow_mut()
            .set_ready_state(ReadyState::Complete);
        tracing::debug!("document loaded");
        self.poll_tick(None);
    }

    /// Page teardown: run unload listeners in registration order, then remove
    /// every remaining listener and cancel pending availability requests.
    /// Returns the number of unload listeners run.
    pub fn unload(&self) -> usize {
        if self.unloaded.replace(true) {
            return 0;
        }
        let queue = std::mem::take(&mut *self.unload_listeners.borrow_mut());
        let count = queue.len();
        for record in queue {
            let context = resolve_context(
                ExecutionContext::Global,
                record.payload.as_ref(),
                &record.context_override,
            );
            let event = self.normalize(
                RawEvent::new(EventType::Unload, Some(record.element)),
                Some(record.element),
            );
            record.listener.call(
                &event,
                &Invocation {
                    context: &context,
                    payload: record.payload.as_ref(),
                    current_target: record.element,
                    phase: Phase::Target,
                    subscribed_type: &EventType::Unload,
                },
            );
        }

        let keys = self.registry.borrow().all_keys();
        for key in keys.iter().rev() {
            self.remove_key(key);
        }
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for entry in pending {
            entry.handle.settle(AvailabilityState::Cancelled);
        }
        {
            let mut poll = self.poll.borrow_mut();
            poll.next_tick = None;
            poll.retries = 0;
        }
        tracing::debug!(unload_listeners = count, "event bus torn down");
        count
    }

    // -----------------------------------------------------------------------
    // Misc
    // -----------------------------------------------------------------------

    /// Id of `node`, assigning a generated `fwevt-auto-<n>` id if it has none.
    pub fn generate_id(&self, node: NodeId) -> Option<String> {
        let mut document = self.document.borrow_mut();
        if let Some(id) = document.id_attr(node) {
            return Some(id.to_owned());
        }
        if !document.exists(node) {
            return None;
        }
        loop {
            let n = self.auto_id.get();
            self.auto_id.set(n + 1);
            let id = format!("fwevt-auto-{n}");
            if document.get_element_by_id(&id).is_none() {
                document.set_id_attr(node, &id).ok()?;
                return Some(id);
            }
        }
    }

    fn fail(&self, err: EventBusError) -> bool {
        tracing::warn!(error = %err, "event bus operation failed");
        *self.last_error.borrow_mut() = Some(err);
        false
    }
}

fn wrap(
    listener: &Listener,
    context: ExecutionContext,
    payload: Option<Payload>,
    subscribed_type: EventType,
) -> Wrapped {
    let listener = listener.clone();
    Rc::new(move |event: &DomEvent, current_target: NodeId, phase: Phase| {
        listener.call(
            event,
            &Invocation {
                context: &context,
                payload: payload.as_ref(),
                current_target,
                phase,
                subscribed_type: &subscribed_type,
            },
        );
    })
}
