#![forbid(unsafe_code)]

//! Host-driven document model for FrankenWidget.
//!
//! # Role in FrankenWidget
//! `fwidget-dom` stands in for the browser DOM. The embedding host (JS glue,
//! a test harness, or a native shell) owns layout and pushes raw input; this
//! crate records the node tree, inline style, page geometry, and the native
//! listener bookkeeping that the event layer attaches to.
//!
//! # Primary responsibilities
//! - **Document**: node arena with parent/child links, ids, classes, style.
//! - **Geometry**: page-space positions derived from per-node offsets.
//! - **RawEvent**: unnormalized input records exactly as a host reports them.
//! - **Clock**: monotonic time, deterministic in tests.
//!
//! # How it fits in the system
//! `fwidget-events` normalizes [`RawEvent`]s against a [`Document`] and routes
//! them to listeners; `fwidget-resize` mutates node style and geometry in
//! response. Nothing here blocks or spawns threads.

pub mod clock;
pub mod document;
pub mod error;
pub mod event;
pub mod geometry;
pub mod node;

use std::cell::RefCell;
use std::rc::Rc;

pub use clock::{Clock, DeterministicClock, MonotonicClock};
pub use document::{Document, NativeListenerId, ReadyState};
pub use error::DomError;
pub use event::{EventType, Modifiers, MouseButton, RawEvent};
pub use geometry::{PagePoint, Rect};
pub use node::{Display, NodeId, Position, Style, Tag, Visibility};

/// Document handle shared between the event layer and widgets.
///
/// Everything runs on one thread; borrows must not be held across listener
/// invocations.
pub type SharedDocument = Rc<RefCell<Document>>;

/// Wrap a document for sharing.
#[must_use]
pub fn share(document: Document) -> SharedDocument {
    Rc::new(RefCell::new(document))
}
