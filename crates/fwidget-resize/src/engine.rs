#![forbid(unsafe_code)]

//! The resize engine.
//!
//! One [`ResizeEngine`] owns one element, the handles around it, an optional
//! wrapper and proxy, and the status readout. The host (or
//! [`ResizeBinding`](crate::ResizeBinding)) feeds it pointer input; every
//! input returns a [`ResizeDispatch`] describing what happened.
//!
//! # Invariants
//!
//! 1. At most one session exists at a time. Mouse-down on any handle while
//!    primed or resizing is ignored and the state does not change.
//! 2. [`GeometryCache`] is recaptured at every session start; `start` is
//!    never modified during a session.
//! 3. A vetoed frame mutates nothing: no style, no cache, no status.
//! 4. During a proxy session only the proxy is resized. The element and
//!    wrapper change on release (commit pass) or on [`ResizeEngine::reset`].
//! 5. Mouse-up always returns the engine to `Idle`, even if a commit
//!    animation is still running.
//!
//! # Failure Modes
//!
//! Input on a destroyed engine, on a node that is not a handle, or out of
//! lifecycle order is reported as [`ResizeEffect::Ignored`]. A document
//! mutation that fails because a node vanished underneath the engine is
//! logged at `warn` and the step continues.

use std::fmt;
use std::time::Duration;

use fwidget_dom::{
    DomError, Document, Modifiers, NodeId, PagePoint, Position, Rect, Tag,
};

use crate::animation::{AnimationDriver, AnimationId, AnimationRequest, TweenDriver, TweenValues};
use crate::config::ResizeConfig;
use crate::css;
use crate::drag::{Axis, AxisConstraint, DragController, DragEffect, DragInput, ThresholdDrag};
use crate::edge::ResizeEdge;
use crate::error::ResizeError;
use crate::geometry::{
    Geometry, GeometryCache, PositionBounds, Size, SizeLimits, apply_ratio, clamp_position,
    edge_geometry,
};
use crate::outcome::{
    BeforeResizeVerdict, ResizeDispatch, ResizeEffect, ResizeEvent, ResizeNoopReason, ResizeState,
};
use crate::proxy::Proxy;
use crate::status::{StatusOverlay, StatusReadout};

/// What a drag controller is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragRole {
    Handle(ResizeEdge),
    /// Whole-element drag of the wrapper.
    Element,
}

type BeforeResizeHook = Box<dyn FnMut(&Geometry) -> BeforeResizeVerdict>;
type EventObserver = Box<dyn FnMut(&ResizeEvent)>;

struct HandleSlot {
    edge: ResizeEdge,
    node: NodeId,
    drag: Box<dyn DragController>,
}

struct ElementDrag {
    controller: Box<dyn DragController>,
    /// Wrapper position when the gesture armed.
    origin_xy: Option<PagePoint>,
}

/// Handle-driven resizing of one element.
pub struct ResizeEngine {
    id: String,
    config: ResizeConfig,
    limits: SizeLimits,
    bounds: PositionBounds,
    ratio_locked: bool,
    element: NodeId,
    wrap: NodeId,
    positioned: bool,
    proxy: Option<Proxy>,
    status: StatusOverlay,
    handles: Vec<HandleSlot>,
    element_drag: Option<ElementDrag>,
    animation: Option<Box<dyn AnimationDriver>>,
    pending_commit: Option<(AnimationId, Geometry)>,
    state: ResizeState,
    cache: GeometryCache,
    committed: Size,
    before_resize: Vec<BeforeResizeHook>,
    observers: Vec<EventObserver>,
    transition_counter: u64,
    destroyed: bool,
}

impl fmt::Debug for ResizeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeEngine")
            .field("id", &self.id)
            .field("element", &self.element)
            .field("wrap", &self.wrap)
            .field("state", &self.state)
            .field("cache", &self.cache)
            .field("committed", &self.committed)
            .field("handles", &self.handles.len())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl ResizeEngine {
    /// Engine with threshold drag controllers and the tween driver.
    pub fn new(
        doc: &mut Document,
        element: NodeId,
        config: ResizeConfig,
    ) -> Result<Self, ResizeError> {
        Self::with_capabilities(
            doc,
            element,
            config,
            |_| Box::new(ThresholdDrag::default()),
            Some(Box::new(TweenDriver::new())),
        )
    }

    /// Engine with caller-supplied capabilities. Without an animation driver
    /// the `animate` option is switched off.
    pub fn with_capabilities(
        doc: &mut Document,
        element: NodeId,
        config: ResizeConfig,
        mut drag_factory: impl FnMut(DragRole) -> Box<dyn DragController>,
        animation: Option<Box<dyn AnimationDriver>>,
    ) -> Result<Self, ResizeError> {
        if !doc.exists(element) {
            return Err(ResizeError::ElementNotFound(element));
        }
        let mut config = config.validated_with(animation.is_some());
        let id = ensure_id(doc, element)?;

        if let Some(style) = doc.style_mut(element) {
            if let Some(width) = config.width {
                style.width = Some(width);
            }
            if let Some(height) = config.height {
                style.height = Some(height);
            }
        }
        let committed = Size {
            height: doc.client_height(element),
            width: doc.client_width(element),
        };

        if !config.wrap && doc.tag(element).is_some_and(|t| !t.accepts_children()) {
            tracing::warn!(
                element = %element,
                tag = doc.tag(element).map(Tag::name).unwrap_or_default(),
                "element cannot hold handles, wrap forced"
            );
            config.wrap = true;
        }

        let (wrap, positioned) = if config.wrap {
            create_wrap(doc, element, &id, committed)?
        } else {
            let absolute = doc
                .style(element)
                .is_some_and(|s| s.position == Position::Absolute);
            (element, absolute)
        };

        let element_drag = if config.draggable {
            doc.add_class(wrap, css::DRAGGABLE);
            Some(ElementDrag {
                controller: drag_factory(DragRole::Element),
                origin_xy: None,
            })
        } else {
            None
        };
        if config.hover {
            doc.add_class(wrap, css::HOVER);
        }
        if config.knob_handles {
            doc.add_class(wrap, css::KNOB);
        }
        if config.hidden_handles {
            doc.add_class(wrap, css::HIDDEN);
        }
        doc.add_class(wrap, css::RESIZE);

        let proxy = if config.proxy {
            Some(Proxy::create(doc, element, css::PROXY)?)
        } else {
            None
        };

        let mut handles = Vec::with_capacity(config.handles.len());
        for &edge in config.handles.edges() {
            let node = doc.create_element(Tag::Div);
            doc.set_id_attr(node, &format!("{id}-handle-{edge}"))?;
            doc.add_class(node, css::HANDLE);
            doc.add_class(node, &css::handle(edge));
            doc.append_child(wrap, node)?;
            tracing::debug!(engine = %id, edge = %edge, handle = %node, "handle created");
            handles.push(HandleSlot {
                edge,
                node,
                drag: drag_factory(DragRole::Handle(edge)),
            });
        }

        let status = StatusOverlay::create(doc, css::STATUS)?;
        let origin = doc.xy(wrap).unwrap_or_default();
        let cache = GeometryCache::capture(Geometry::new(
            committed.height,
            committed.width,
            Some(origin.y),
            Some(origin.x),
        ));

        tracing::debug!(
            engine = %id,
            element = %element,
            wrapped = wrap != element,
            positioned,
            proxy = proxy.is_some(),
            handles = handles.len(),
            "resize engine created"
        );

        Ok(Self {
            id,
            limits: SizeLimits::from_config(&config),
            bounds: PositionBounds::from_config(&config),
            ratio_locked: config.ratio,
            config,
            element,
            wrap,
            positioned,
            proxy,
            status,
            handles,
            element_drag,
            animation,
            pending_commit: None,
            state: ResizeState::Idle,
            cache,
            committed,
            before_resize: Vec::new(),
            observers: Vec::new(),
            transition_counter: 0,
            destroyed: false,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Registry key: the element's id attribute.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn config(&self) -> &ResizeConfig {
        &self.config
    }

    #[must_use]
    pub const fn element(&self) -> NodeId {
        self.element
    }

    /// The node carrying the handles: the wrapper, or the element itself.
    #[must_use]
    pub const fn wrap_node(&self) -> NodeId {
        self.wrap
    }

    #[must_use]
    pub fn is_wrapped(&self) -> bool {
        self.wrap != self.element
    }

    #[must_use]
    pub fn proxy_node(&self) -> Option<NodeId> {
        self.proxy.map(|p| p.node())
    }

    #[must_use]
    pub const fn status_node(&self) -> NodeId {
        self.status.node()
    }

    #[must_use]
    pub fn handle_node(&self, edge: ResizeEdge) -> Option<NodeId> {
        self.handles.iter().find(|h| h.edge == edge).map(|h| h.node)
    }

    /// `(edge, node)` for every handle, in creation order.
    #[must_use]
    pub fn handle_nodes(&self) -> Vec<(ResizeEdge, NodeId)> {
        self.handles.iter().map(|h| (h.edge, h.node)).collect()
    }

    /// Handle of the running session.
    #[must_use]
    pub fn active_handle_node(&self) -> Option<NodeId> {
        match self.state {
            ResizeState::Resizing { edge } => self.handle_node(edge),
            _ => None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ResizeState {
        self.state
    }

    /// Whether a resize session is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, ResizeState::Resizing { .. })
    }

    #[must_use]
    pub const fn geometry_cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// Size last committed to the element.
    #[must_use]
    pub const fn committed_size(&self) -> Size {
        self.committed
    }

    #[must_use]
    pub const fn is_positioned(&self) -> bool {
        self.positioned
    }

    #[must_use]
    pub const fn is_ratio_locked(&self) -> bool {
        self.ratio_locked
    }

    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[must_use]
    pub const fn is_draggable(&self) -> bool {
        self.element_drag.is_some()
    }

    /// Whether a commit animation is still running.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.pending_commit.is_some()
    }

    // -----------------------------------------------------------------------
    // Hooks
    // -----------------------------------------------------------------------

    /// Register a veto hook consulted with the fully computed geometry before
    /// anything is applied. The first `Cancel` drops the frame.
    ///
    /// Hooks run while the engine is borrowed and must not call back into it.
    pub fn on_before_resize(
        &mut self,
        hook: impl FnMut(&Geometry) -> BeforeResizeVerdict + 'static,
    ) {
        self.before_resize.push(Box::new(hook));
    }

    /// Register an observer for every emitted [`ResizeEvent`]. The same
    /// events are also returned in each [`ResizeDispatch`].
    pub fn on_event(&mut self, observer: impl FnMut(&ResizeEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // -----------------------------------------------------------------------
    // Pointer input
    // -----------------------------------------------------------------------

    /// Mouse-down on `target`: primes a handle, or arms a whole-element drag.
    pub fn handle_mouse_down(
        &mut self,
        doc: &Document,
        target: NodeId,
        page: PagePoint,
        modifiers: Modifiers,
    ) -> ResizeDispatch {
        let from = self.state;
        if self.destroyed {
            return self.ignore(from, ResizeNoopReason::Destroyed);
        }
        if let Some(index) = self.handle_index(target) {
            if self.state != ResizeState::Idle || self.is_moving() {
                return self.ignore(from, ResizeNoopReason::ActiveDragAlreadyInProgress);
            }
            let edge = self.handles[index].edge;
            let effect = self.handles[index]
                .drag
                .process(DragInput::MouseDown { page });
            if let DragEffect::Noop { reason } = effect {
                return self.ignore(from, reason.into());
            }
            self.refresh_positioned(doc);
            self.apply_auto_ratio(modifiers);
            self.state = ResizeState::Primed { edge };
            tracing::debug!(engine = %self.id, edge = %edge, "handle primed");
            return self.record(from, ResizeEffect::Primed { edge }, Vec::new());
        }
        if self.state == ResizeState::Idle
            && doc.contains(self.wrap, target)
            && let Some(drag) = self.element_drag.as_mut()
        {
            if let DragEffect::Noop { reason } = drag.controller.process(DragInput::MouseDown { page }) {
                return self.ignore(from, reason.into());
            }
            drag.origin_xy = doc.xy(self.wrap);
            return self.record(from, ResizeEffect::MoveArmed, Vec::new());
        }
        if self.state == ResizeState::Idle {
            self.ignore(from, ResizeNoopReason::NotAHandle)
        } else {
            self.ignore(from, ResizeNoopReason::ActiveDragAlreadyInProgress)
        }
    }

    /// Pointer movement anywhere on the page.
    pub fn handle_pointer_move(
        &mut self,
        doc: &mut Document,
        page: PagePoint,
        modifiers: Modifiers,
    ) -> ResizeDispatch {
        let from = self.state;
        if self.destroyed {
            return self.ignore(from, ResizeNoopReason::Destroyed);
        }
        match self.state {
            ResizeState::Idle => {
                if self.is_moving() {
                    self.move_element(doc, page)
                } else {
                    self.ignore(from, ResizeNoopReason::IdleWithoutActiveDrag)
                }
            }
            ResizeState::Primed { edge } | ResizeState::Resizing { edge } => {
                let Some(index) = self.handles.iter().position(|h| h.edge == edge) else {
                    return self.ignore(from, ResizeNoopReason::HandleUnregistered);
                };
                let mut events = Vec::new();
                match self.handles[index].drag.process(DragInput::Move { page }) {
                    DragEffect::StartDrag { origin, current } => {
                        self.start_session(doc, edge, &mut events);
                        let effect = self.frame(doc, edge, origin, current, modifiers, &mut events);
                        self.record(from, effect, events)
                    }
                    DragEffect::Drag {
                        origin, current, ..
                    } => {
                        let effect = self.frame(doc, edge, origin, current, modifiers, &mut events);
                        self.record(from, effect, events)
                    }
                    DragEffect::Noop { reason } => self.ignore(from, reason.into()),
                    DragEffect::MouseDown { .. } | DragEffect::MouseUp { .. } => {
                        self.ignore(from, ResizeNoopReason::IdleWithoutActiveDrag)
                    }
                }
            }
        }
    }

    /// Mouse-up anywhere on the page: ends the session, if any.
    pub fn handle_mouse_up(&mut self, doc: &mut Document, page: PagePoint) -> ResizeDispatch {
        let from = self.state;
        if self.destroyed {
            return self.ignore(from, ResizeNoopReason::Destroyed);
        }
        match self.state {
            ResizeState::Idle => {
                if let Some(drag) = self.element_drag.as_mut()
                    && !drag.controller.process(DragInput::MouseUp { page }).is_noop()
                {
                    drag.origin_xy = None;
                    return self.record(from, ResizeEffect::MoveEnded, Vec::new());
                }
                self.ignore(from, ResizeNoopReason::IdleWithoutActiveDrag)
            }
            ResizeState::Primed { edge } => {
                if let Some(slot) = self.handles.iter_mut().find(|h| h.edge == edge) {
                    slot.drag.process(DragInput::MouseUp { page });
                }
                self.state = ResizeState::Idle;
                self.ratio_locked = self.config.ratio;
                self.record(from, ResizeEffect::Released { edge }, Vec::new())
            }
            ResizeState::Resizing { edge } => {
                if let Some(slot) = self.handles.iter_mut().find(|h| h.edge == edge) {
                    slot.drag.process(DragInput::MouseUp { page });
                }
                let mut events = Vec::new();
                let effect = self.end_session(doc, edge, &mut events);
                self.record(from, effect, events)
            }
        }
    }

    /// Pointer entered `target`. Returns whether `target` is a handle that
    /// was highlighted.
    pub fn handle_mouse_over(&mut self, doc: &mut Document, target: NodeId) -> bool {
        if self.destroyed {
            return false;
        }
        if self.config.hover {
            doc.remove_class(self.wrap, css::HOVER);
        }
        let Some(index) = self.handle_index(target) else {
            return false;
        };
        if self.state != ResizeState::Idle {
            return false;
        }
        let edge = self.handles[index].edge;
        doc.add_class(target, css::HANDLE_ACTIVE);
        doc.add_class(target, &css::handle_active(edge));
        true
    }

    /// Pointer left `target`. Returns whether a handle highlight was removed.
    pub fn handle_mouse_out(&mut self, doc: &mut Document, target: NodeId) -> bool {
        if self.destroyed {
            return false;
        }
        let idle = self.state == ResizeState::Idle;
        if self.config.hover && idle {
            doc.add_class(self.wrap, css::HOVER);
        }
        let Some(index) = self.handle_index(target) else {
            return false;
        };
        if !idle {
            return false;
        }
        let edge = self.handles[index].edge;
        doc.remove_class(target, css::HANDLE_ACTIVE);
        doc.remove_class(target, &css::handle_active(edge));
        true
    }

    // -----------------------------------------------------------------------
    // Commit, reset, animation
    // -----------------------------------------------------------------------

    /// Restore the geometry captured at the start of the latest session
    /// (or at construction when no session ran yet).
    pub fn reset(&mut self, doc: &mut Document) -> ResizeDispatch {
        let from = self.state;
        if self.destroyed {
            return self.ignore(from, ResizeNoopReason::Destroyed);
        }
        tracing::debug!(engine = %self.id, start = ?self.cache.start, "reset to session start");
        let mut events = Vec::new();
        let start = self.cache.start;
        let effect = self.commit(doc, start, &mut events);
        self.record(from, effect, events)
    }

    /// Drive the commit animation. Returns the notifications it produced.
    pub fn advance_animations(&mut self, doc: &mut Document, dt: Duration) -> Vec<ResizeEvent> {
        let Some(driver) = self.animation.as_mut() else {
            return Vec::new();
        };
        let frames = driver.tick(dt);
        let mut events = Vec::new();
        for frame in frames {
            apply_tween(doc, frame.node, &frame.values);
            if frame.node == self.wrap && self.is_wrapped() {
                let (height, width) = (doc.client_height(self.wrap), doc.client_width(self.wrap));
                set_size(doc, self.element, height, width);
            }
            if frame.complete
                && let Some((id, geometry)) = self.pending_commit
                && id == frame.id
            {
                self.pending_commit = None;
                self.committed = geometry.size();
                set_size(doc, self.element, geometry.height, geometry.width);
                tracing::debug!(engine = %self.id, ?geometry, "animated commit complete");
                self.emit(ResizeEvent::Resize { geometry }, &mut events);
            }
        }
        events
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Remove handles, proxy and status; unwrap the element and drop its
    /// resize classes. Listener cleanup on the event bus is the binding's
    /// job. Calling it twice is a no-op.
    pub fn destroy(&mut self, doc: &mut Document) {
        if self.destroyed {
            return;
        }
        if let Some((id, _)) = self.pending_commit.take()
            && let Some(driver) = self.animation.as_mut()
        {
            driver.cancel(id);
        }
        self.state = ResizeState::Idle;
        for slot in &mut self.handles {
            slot.drag.unregister();
            warn_on_err(doc.destroy(slot.node), "handle removal failed");
        }
        self.handles.clear();
        if let Some(proxy) = self.proxy.take() {
            warn_on_err(doc.destroy(proxy.node()), "proxy removal failed");
        }
        warn_on_err(doc.destroy(self.status.node()), "status removal failed");
        if let Some(mut drag) = self.element_drag.take() {
            drag.controller.unregister();
            doc.remove_class(self.wrap, css::DRAGGABLE);
        }
        if self.is_wrapped() {
            warn_on_err(unwrap(doc, self.element, self.wrap), "unwrap failed");
        } else {
            for class in [css::HOVER, css::KNOB, css::HIDDEN, css::RESIZING] {
                doc.remove_class(self.wrap, class);
            }
        }
        doc.remove_class(self.element, css::RESIZE);
        doc.remove_class(self.element, css::GHOST);
        self.wrap = self.element;
        self.destroyed = true;
        tracing::debug!(engine = %self.id, "resize engine destroyed");
    }

    // -----------------------------------------------------------------------
    // Session internals
    // -----------------------------------------------------------------------

    fn start_session(&mut self, doc: &mut Document, edge: ResizeEdge, events: &mut Vec<ResizeEvent>) {
        self.refresh_positioned(doc);
        let xy = doc.xy(self.wrap).unwrap_or_default();
        let height = doc.client_height(self.element);
        let width = doc.client_width(self.element);
        self.cache = GeometryCache::capture(Geometry::new(height, width, Some(xy.y), Some(xy.x)));

        if let Some(proxy) = self.proxy {
            let origin = doc.xy(self.element).unwrap_or(xy);
            warn_on_err(
                proxy.show(doc, Rect::new(origin.x, origin.y, width, height)),
                "proxy could not be shown",
            );
            if self.config.ghost {
                doc.add_class(self.element, css::GHOST);
            }
        }
        if let Some(slot) = self.handles.iter_mut().find(|h| h.edge == edge) {
            doc.add_class(slot.node, &css::handle_active(edge));
            doc.add_class(slot.node, css::HANDLE_ACTIVE);
            match edge {
                ResizeEdge::Left | ResizeEdge::Right => {
                    slot.drag.set_axis_constraint(Axis::Y, AxisConstraint::LOCKED);
                }
                ResizeEdge::Top | ResizeEdge::Bottom => {
                    slot.drag.set_axis_constraint(Axis::X, AxisConstraint::LOCKED);
                }
                _ => {}
            }
        }
        doc.add_class(self.wrap, css::RESIZING);
        self.state = ResizeState::Resizing { edge };
        tracing::debug!(engine = %self.id, edge = %edge, start = ?self.cache.start, "resize session started");
        let geometry = self.cache.start;
        self.emit(ResizeEvent::StartResize { edge, geometry }, events);
    }

    /// Compute and apply one pointer-move frame.
    fn frame(
        &mut self,
        doc: &mut Document,
        edge: ResizeEdge,
        origin: PagePoint,
        pointer: PagePoint,
        modifiers: Modifiers,
        events: &mut Vec<ResizeEvent>,
    ) -> ResizeEffect {
        self.apply_auto_ratio(modifiers);
        let delta = pointer.delta_from(origin);
        let mut geometry = edge_geometry(edge, &self.cache.start, delta, &self.limits);
        if self.ratio_locked {
            geometry = apply_ratio(edge, geometry, self.committed, &self.cache.start, &self.limits);
        }
        let target = self.proxy.map_or(self.wrap, |p| p.node());
        let here = doc.xy(target).unwrap_or_default();
        geometry.top = Some(geometry.top.unwrap_or(here.y));
        geometry.left = Some(geometry.left.unwrap_or(here.x));
        if self.positioned {
            geometry = clamp_position(geometry, &self.bounds);
        }
        tracing::trace!(engine = %self.id, edge = %edge, ?delta, ?geometry, "frame computed");

        if self.vetoed(&geometry) {
            tracing::debug!(engine = %self.id, ?geometry, "frame cancelled by before-resize");
            return ResizeEffect::Cancelled { geometry };
        }

        if self.proxy.is_some() || self.positioned {
            if let (Some(top), Some(left)) = (geometry.top, geometry.left) {
                warn_on_err(doc.set_xy(target, PagePoint::new(left, top)), "move failed");
            }
            self.cache.current.top = geometry.top;
            self.cache.current.left = geometry.left;
        }
        self.cache.current.height = geometry.height;
        self.cache.current.width = geometry.width;
        set_size(doc, target, geometry.height, geometry.width);
        if self.proxy.is_none() && self.is_wrapped() {
            set_size(doc, self.element, geometry.height, geometry.width);
        }

        let readout = StatusReadout::new(geometry.size(), self.committed);
        warn_on_err(
            self.status.update(doc, &readout, pointer, self.config.status),
            "status update failed",
        );

        if self.proxy.is_some() {
            self.emit(ResizeEvent::ProxyResize { geometry }, events);
        } else {
            self.emit(ResizeEvent::Resize { geometry }, events);
        }
        ResizeEffect::Applied { geometry }
    }

    fn end_session(
        &mut self,
        doc: &mut Document,
        edge: ResizeEdge,
        events: &mut Vec<ResizeEvent>,
    ) -> ResizeEffect {
        self.state = ResizeState::Idle;
        if let Some(slot) = self.handles.iter_mut().find(|h| h.edge == edge) {
            doc.remove_class(slot.node, &css::handle_active(edge));
            slot.drag.clear_constraints();
        }
        for slot in &self.handles {
            doc.remove_class(slot.node, css::HANDLE_ACTIVE);
        }

        let geometry = self.cache.current;
        let mut effect = ResizeEffect::Ended { edge, geometry };
        if !self.config.animate {
            self.committed = geometry.size();
            if self.config.set_size {
                set_size(doc, self.element, geometry.height, geometry.width);
            }
        }
        if let Some(proxy) = self.proxy {
            proxy.hide(doc);
            if self.config.set_size {
                effect = match self.commit(doc, geometry, events) {
                    ResizeEffect::Animating { animation, geometry } => {
                        ResizeEffect::Animating { animation, geometry }
                    }
                    _ => ResizeEffect::Ended { edge, geometry: self.cache.current },
                };
            } else {
                self.emit(ResizeEvent::Resize { geometry }, events);
            }
            if self.config.ghost {
                doc.remove_class(self.element, css::GHOST);
            }
        }

        doc.remove_class(self.wrap, css::RESIZING);
        if self.config.hover {
            doc.add_class(self.wrap, css::HOVER);
        }
        self.status.hide(doc);
        self.ratio_locked = self.config.ratio;
        let geometry = self.cache.current;
        tracing::debug!(engine = %self.id, edge = %edge, ?geometry, "resize session ended");
        self.emit(ResizeEvent::EndResize { edge, geometry }, events);
        effect
    }

    /// Apply `geometry` to the wrapper and element directly, or start the
    /// commit animation.
    fn commit(
        &mut self,
        doc: &mut Document,
        mut geometry: Geometry,
        events: &mut Vec<ResizeEvent>,
    ) -> ResizeEffect {
        let here = doc.xy(self.wrap).unwrap_or_default();
        geometry.top = Some(geometry.top.unwrap_or(here.y));
        geometry.left = Some(geometry.left.unwrap_or(here.x));

        if self.vetoed(&geometry) {
            tracing::debug!(engine = %self.id, ?geometry, "commit cancelled by before-resize");
            return ResizeEffect::Cancelled { geometry };
        }
        self.cache.current = geometry;

        if self.config.animate && self.proxy.is_some()
            && let Some(driver) = self.animation.as_mut()
        {
            let from = TweenValues {
                height: Some(doc.client_height(self.wrap)),
                width: Some(doc.client_width(self.wrap)),
                top: Some(here.y),
                left: Some(here.x),
            };
            let to = TweenValues {
                height: Some(geometry.height),
                width: Some(geometry.width),
                top: if self.positioned { geometry.top } else { None },
                left: if self.positioned { geometry.left } else { None },
            };
            if let Some((previous, _)) = self.pending_commit.take() {
                driver.cancel(previous);
            }
            let animation = driver.start(AnimationRequest {
                node: self.wrap,
                from,
                to,
                duration: self.config.animate_duration(),
                easing: self.config.animate_easing.curve(),
            });
            self.pending_commit = Some((animation, geometry));
            return ResizeEffect::Animating {
                animation,
                geometry,
            };
        }

        if self.positioned
            && let (Some(top), Some(left)) = (geometry.top, geometry.left)
        {
            warn_on_err(doc.set_xy(self.wrap, PagePoint::new(left, top)), "move failed");
        }
        set_size(doc, self.wrap, geometry.height, geometry.width);
        if self.is_wrapped() {
            set_size(doc, self.element, geometry.height, geometry.width);
        }
        self.committed = geometry.size();
        self.emit(ResizeEvent::Resize { geometry }, events);
        ResizeEffect::Applied { geometry }
    }

    fn move_element(&mut self, doc: &mut Document, page: PagePoint) -> ResizeDispatch {
        let from = self.state;
        let wrap = self.wrap;
        let Some(drag) = self.element_drag.as_mut() else {
            return self.ignore(from, ResizeNoopReason::IdleWithoutActiveDrag);
        };
        let (origin, current) = match drag.controller.process(DragInput::Move { page }) {
            DragEffect::StartDrag { origin, current } | DragEffect::Drag { origin, current, .. } => {
                (origin, current)
            }
            DragEffect::Noop { reason } => return self.ignore(from, reason.into()),
            DragEffect::MouseDown { .. } | DragEffect::MouseUp { .. } => {
                return self.ignore(from, ResizeNoopReason::IdleWithoutActiveDrag);
            }
        };
        let start = drag.origin_xy.unwrap_or_default();
        let (dx, dy) = current.delta_from(origin);
        let position = start.offset(dx, dy);
        warn_on_err(doc.set_xy(wrap, position), "element drag failed");
        let mut events = Vec::new();
        self.emit(ResizeEvent::Drag { position }, &mut events);
        self.record(from, ResizeEffect::Moved { position }, events)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn handle_index(&self, node: NodeId) -> Option<usize> {
        self.handles.iter().position(|h| h.node == node)
    }

    fn is_moving(&self) -> bool {
        self.element_drag
            .as_ref()
            .is_some_and(|d| d.origin_xy.is_some())
    }

    fn refresh_positioned(&mut self, doc: &Document) {
        if doc
            .style(self.wrap)
            .is_some_and(|s| s.position == Position::Absolute)
        {
            self.positioned = true;
        }
    }

    fn apply_auto_ratio(&mut self, modifiers: Modifiers) {
        if self.config.auto_ratio {
            self.ratio_locked = modifiers.contains(Modifiers::SHIFT) || self.config.ratio;
        }
    }

    fn vetoed(&mut self, geometry: &Geometry) -> bool {
        self.before_resize
            .iter_mut()
            .any(|hook| hook(geometry) == BeforeResizeVerdict::Cancel)
    }

    fn emit(&mut self, event: ResizeEvent, events: &mut Vec<ResizeEvent>) {
        for observer in &mut self.observers {
            observer(&event);
        }
        events.push(event);
    }

    fn ignore(&mut self, from: ResizeState, reason: ResizeNoopReason) -> ResizeDispatch {
        tracing::trace!(engine = %self.id, ?reason, "input ignored");
        self.record(from, ResizeEffect::Ignored { reason }, Vec::new())
    }

    fn record(
        &mut self,
        from: ResizeState,
        effect: ResizeEffect,
        events: Vec<ResizeEvent>,
    ) -> ResizeDispatch {
        self.transition_counter = self.transition_counter.saturating_add(1);
        ResizeDispatch {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect,
            events,
        }
    }
}

fn ensure_id(doc: &mut Document, element: NodeId) -> Result<String, DomError> {
    if let Some(id) = doc.id_attr(element)
        && !id.is_empty()
    {
        return Ok(id.to_owned());
    }
    let id = format!("fw-resize-{}", element.get());
    doc.set_id_attr(element, &id)?;
    Ok(id)
}

/// Insert a wrapper in place of `element` and move the element into it.
/// Returns the wrapper and whether it is absolutely positioned.
fn create_wrap(
    doc: &mut Document,
    element: NodeId,
    id: &str,
    size: Size,
) -> Result<(NodeId, bool), ResizeError> {
    let parent = doc
        .parent(element)
        .ok_or(ResizeError::NoParentForWrap(element))?;
    let element_style = doc.style(element).copied().unwrap_or_default();
    let element_offset = doc.offset(element).unwrap_or_default();

    let wrap = doc.create_element(Tag::Div);
    doc.set_id_attr(wrap, &format!("{id}_wrap"))?;
    doc.add_class(wrap, css::WRAP);
    if let Some(style) = doc.style_mut(wrap) {
        style.width = Some(size.width);
        style.height = Some(size.height);
        style.position = match element_style.position {
            Position::Static => Position::Relative,
            other => other,
        };
        style.top = element_style.top;
        style.left = element_style.left;
    }
    let positioned = element_style.position == Position::Absolute;
    if positioned && let Some(style) = doc.style_mut(element) {
        style.position = Position::Relative;
        style.top = Some(0);
        style.left = Some(0);
    }
    doc.replace_child(parent, wrap, element)?;
    doc.append_child(wrap, element)?;
    doc.set_offset(wrap, element_offset)?;
    doc.set_offset(element, PagePoint::default())?;
    tracing::debug!(element = %element, wrap = %wrap, positioned, "element wrapped");
    Ok((wrap, positioned))
}

/// Put `element` back where `wrap` is and drop the wrapper.
fn unwrap(doc: &mut Document, element: NodeId, wrap: NodeId) -> Result<(), DomError> {
    let offset = doc.offset(wrap).unwrap_or_default();
    if let Some(style) = doc.style_mut(element) {
        style.position = Position::Static;
        style.top = None;
        style.left = None;
    }
    if let Some(parent) = doc.parent(wrap) {
        doc.detach(element)?;
        doc.replace_child(parent, element, wrap)?;
        doc.set_offset(element, offset)?;
    }
    doc.destroy(wrap)?;
    tracing::debug!(element = %element, wrap = %wrap, "element unwrapped");
    Ok(())
}

fn set_size(doc: &mut Document, node: NodeId, height: i32, width: i32) {
    if let Some(style) = doc.style_mut(node) {
        style.height = Some(height);
        style.width = Some(width);
    }
}

fn apply_tween(doc: &mut Document, node: NodeId, values: &TweenValues) {
    if let Some(style) = doc.style_mut(node) {
        if let Some(height) = values.height {
            style.height = Some(height);
        }
        if let Some(width) = values.width {
            style.width = Some(width);
        }
    }
    if let Some(top) = values.top {
        warn_on_err(doc.set_y(node, top), "tween move failed");
    }
    if let Some(left) = values.left {
        warn_on_err(doc.set_x(node, left), "tween move failed");
    }
}

fn warn_on_err(result: Result<(), DomError>, what: &'static str) {
    if let Err(error) = result {
        tracing::warn!(%error, "{what}");
    }
}
