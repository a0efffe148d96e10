#![forbid(unsafe_code)]

//! Event normalization.
//!
//! Hosts report whatever their platform gives them. Before any listener runs,
//! a [`RawEvent`] is turned into a [`DomEvent`]:
//!
//! - a text-node target is retargeted to its parent element,
//! - missing page coordinates are derived from client coordinates plus the
//!   document scroll offset,
//! - the related target falls back to the legacy `to_element`/`from_element`
//!   fields,
//! - legacy WebKit private-use key codes are mapped to their standard codes.
//!
//! The timestamp is taken from the bus clock the first time it is requested
//! and never changes afterwards.

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use fwidget_dom::{
    Clock, Document, EventType, Modifiers, MouseButton, NodeId, PagePoint, RawEvent, Tag,
};

/// WebKit private-use key codes and their standard equivalents.
const WEBKIT_KEYMAP: [(u32, u32); 7] = [
    (63232, 38), // up
    (63233, 40), // down
    (63234, 37), // left
    (63235, 39), // right
    (63276, 33), // page up
    (63277, 34), // page down
    (25, 9),     // shift-tab
];

/// A normalized event shared by every listener of one dispatch.
pub struct DomEvent {
    raw: RawEvent,
    target: Option<NodeId>,
    current_target: Cell<Option<NodeId>>,
    page: PagePoint,
    related_target: Option<NodeId>,
    char_code: u32,
    timestamp: OnceCell<Duration>,
    clock: Rc<dyn Clock>,
    propagation_stopped: Cell<bool>,
    immediate_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
}

impl fmt::Debug for DomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomEvent")
            .field("type", &self.raw.event_type)
            .field("target", &self.target)
            .field("page", &self.page)
            .field("related_target", &self.related_target)
            .finish_non_exhaustive()
    }
}

impl DomEvent {
    /// Normalize `raw` against `document`. `bound` is the element the caller
    /// is handling the event for, if any.
    pub fn normalize(
        raw: RawEvent,
        document: &Document,
        clock: Rc<dyn Clock>,
        bound: Option<NodeId>,
    ) -> Self {
        let target = raw.target.map(|node| resolve_text_node(document, node));
        let page = page_point(document, &raw);
        let related_target = related_target(&raw).map(|node| resolve_text_node(document, node));
        let char_code = char_code(&raw);
        Self {
            raw,
            target,
            current_target: Cell::new(bound),
            page,
            related_target,
            char_code,
            timestamp: OnceCell::new(),
            clock,
            propagation_stopped: Cell::new(false),
            immediate_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
        }
    }

    #[must_use]
    pub fn event_type(&self) -> &EventType {
        &self.raw.event_type
    }

    /// Target element, with text nodes resolved to their parent.
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Element whose listener is currently running.
    #[must_use]
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }

    pub(crate) fn set_current_target(&self, node: NodeId) {
        self.current_target.set(Some(node));
    }

    #[must_use]
    pub fn page(&self) -> PagePoint {
        self.page
    }

    #[must_use]
    pub fn page_x(&self) -> i32 {
        self.page.x
    }

    #[must_use]
    pub fn page_y(&self) -> i32 {
        self.page.y
    }

    #[must_use]
    pub fn related_target(&self) -> Option<NodeId> {
        self.related_target
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.raw.modifiers
    }

    #[must_use]
    pub fn button(&self) -> MouseButton {
        self.raw.button
    }

    /// Key or character code with legacy codes mapped.
    #[must_use]
    pub fn char_code(&self) -> u32 {
        self.char_code
    }

    /// Timestamp of this event. The first call reads the clock; later calls
    /// return the same value.
    pub fn time(&self) -> Duration {
        *self.timestamp.get_or_init(|| self.clock.now())
    }

    #[must_use]
    pub fn raw(&self) -> &RawEvent {
        &self.raw
    }

    /// Stop after the listeners of the current element.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Stop before the next listener.
    pub fn stop_immediate_propagation(&self) {
        self.propagation_stopped.set(true);
        self.immediate_stopped.set(true);
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// `stop_propagation` plus `prevent_default`.
    pub fn stop_event(&self) {
        self.stop_propagation();
        self.prevent_default();
    }

    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    #[must_use]
    pub fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_stopped.get()
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// Text nodes are retargeted to their parent element.
#[must_use]
pub fn resolve_text_node(document: &Document, node: NodeId) -> NodeId {
    match document.tag(node) {
        Some(Tag::Text) => document.parent(node).unwrap_or(node),
        _ => node,
    }
}

/// Page coordinates, derived from client coordinates and the scroll offset
/// when the platform did not report them.
#[must_use]
pub fn page_point(document: &Document, raw: &RawEvent) -> PagePoint {
    raw.page.unwrap_or_else(|| {
        let scroll = document.scroll_offset();
        raw.client.offset(scroll.x, scroll.y)
    })
}

/// Related target with the legacy fallback: `mouseout` reports it in
/// `to_element`, `mouseover` in `from_element`.
#[must_use]
pub fn related_target(raw: &RawEvent) -> Option<NodeId> {
    raw.related_target.or(match raw.event_type {
        EventType::MouseOut => raw.to_element,
        EventType::MouseOver => raw.from_element,
        _ => None,
    })
}

/// `key_code`, else `char_code`, with WebKit private-use codes mapped.
#[must_use]
pub fn char_code(raw: &RawEvent) -> u32 {
    let code = if raw.key_code != 0 {
        raw.key_code
    } else {
        raw.char_code
    };
    WEBKIT_KEYMAP
        .iter()
        .find(|(legacy, _)| *legacy == code)
        .map_or(code, |(_, standard)| *standard)
}
